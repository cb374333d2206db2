//! Theme: named color lookup and the classic series palette
//!
//! Thresholds, mappings and fixed colors store color *names* ("green",
//! "semi-dark-red") or literal CSS colors. The theme resolves names to
//! concrete hex values; it is read-only during resolution.

use crate::color::Color;
use std::collections::HashMap;

const HUES: [(&str, [&str; 5]); 6] = [
    ("red", ["#FFA6B0", "#FF7383", "#F2495C", "#E02F44", "#C4162A"]),
    ("orange", ["#FFCB7D", "#FFB357", "#FF9830", "#FF780A", "#FA6400"]),
    ("yellow", ["#FFF899", "#FFEE52", "#FADE2A", "#F2CC0C", "#E0B400"]),
    ("green", ["#C8F2C2", "#96D98D", "#73BF69", "#56A64B", "#37872D"]),
    ("blue", ["#C0D8FF", "#8AB8FF", "#5794F2", "#3274D9", "#1F60C4"]),
    ("purple", ["#DEB6F2", "#CA95E5", "#B877D9", "#A352CC", "#8F3BB8"]),
];

const SHADES: [&str; 5] = ["super-light-", "light-", "", "semi-dark-", "dark-"];

const CLASSIC_PALETTE: [&str; 16] = [
    "#7EB26D", "#EAB839", "#6ED0E0", "#EF843C", "#E24D42", "#1F78C1", "#BA43A9", "#705DA0",
    "#508642", "#CCA300", "#447EBC", "#C15C17", "#890F02", "#0A437C", "#6D1F62", "#584477",
];

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub is_dark: bool,
    /// Color used for plain text, also resolvable as the name "text"
    pub text_color: String,
    named: HashMap<String, String>,
    classic_palette: Vec<String>,
}

impl Theme {
    fn build(name: &str, is_dark: bool, text_color: &str) -> Self {
        let mut named = HashMap::new();
        for (hue, shades) in HUES {
            for (prefix, hex) in SHADES.iter().zip(shades) {
                named.insert(format!("{}{}", prefix, hue), hex.to_string());
            }
        }
        named.insert("transparent".to_string(), "rgba(0, 0, 0, 0)".to_string());
        named.insert("text".to_string(), text_color.to_string());

        Self {
            name: name.to_string(),
            is_dark,
            text_color: text_color.to_string(),
            named,
            classic_palette: CLASSIC_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn dark() -> Self {
        Self::build("dark", true, "#CCCCDC")
    }

    pub fn light() -> Self {
        Self::build("light", false, "#24292E")
    }

    /// Look up a built-in theme by name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    /// Resolve a color name to a concrete color
    ///
    /// Literal CSS colors pass through untouched, as do unknown names.
    pub fn get_color_by_name(&self, name: &str) -> String {
        if Color::parse(name).is_some() {
            return name.to_string();
        }
        self.named
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Palette color for the n-th series, wrapping around
    pub fn classic_palette_color(&self, index: usize) -> String {
        if self.classic_palette.is_empty() {
            return self.text_color.clone();
        }
        self.classic_palette[index % self.classic_palette.len()].clone()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        let theme = Theme::dark();
        assert_eq!(theme.get_color_by_name("green"), "#73BF69");
        assert_eq!(theme.get_color_by_name("semi-dark-red"), "#E02F44");
        assert_eq!(theme.get_color_by_name("text"), "#CCCCDC");
        assert_eq!(theme.get_color_by_name("#123456"), "#123456");
        assert_eq!(theme.get_color_by_name("unknown"), "unknown");
    }

    #[test]
    fn test_classic_palette_wraps() {
        let theme = Theme::light();
        assert_eq!(theme.classic_palette_color(0), "#7EB26D");
        assert_eq!(theme.classic_palette_color(16), "#7EB26D");
        assert_eq!(theme.classic_palette_color(1), "#EAB839");
    }

    #[test]
    fn test_by_name() {
        assert!(Theme::by_name("Light").map(|t| !t.is_dark).unwrap_or(false));
        assert!(Theme::by_name("neon").is_none());
    }
}
