//! Chart Theme Module
//! Named colors and the categorical palette applied to chart specs.
//!
//! A theme only affects visual attributes of the generated specs, never
//! their data content.

use serde::{Deserialize, Serialize};

/// Categorical palette cycled across multi-series charts.
pub const PALETTE: [&str; 10] = [
    "#e74c3c", // Red
    "#2ecc71", // Green
    "#9b59b6", // Purple
    "#f39c12", // Orange
    "#1abc9c", // Teal
    "#e91e63", // Pink
    "#00bcd4", // Cyan
    "#ff5722", // Deep Orange
    "#795548", // Brown
    "#607d8b", // Blue Grey
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: String,
    pub text: String,
    pub accent: String,
    pub card: String,
    pub dark_accent: String,
    pub palette: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "#03120e".to_string(),  // night
            text: "#8ab0ab".to_string(),        // cambridge blue
            accent: "#3e505b".to_string(),      // charcoal
            card: "#1a1d1a".to_string(),        // eerie black
            dark_accent: "#26413c".to_string(), // dark slate gray
            palette: PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Theme {
    /// Palette color for the n-th series, cycling past the end.
    pub fn series_color(&self, index: usize) -> String {
        if self.palette.is_empty() {
            self.accent.clone()
        } else {
            self.palette[index % self.palette.len()].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        let theme = Theme::default();
        assert_eq!(theme.series_color(0), theme.series_color(PALETTE.len()));
    }

    #[test]
    fn empty_palette_falls_back_to_accent() {
        let theme = Theme {
            palette: Vec::new(),
            ..Theme::default()
        };
        assert_eq!(theme.series_color(3), theme.accent);
    }
}
