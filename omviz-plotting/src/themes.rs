//! Color themes for omics plots

use indexmap::IndexMap;
use omviz_core::OmvizError;
use plotters::style::RGBColor;

/// Color theme for plots
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub background: RGBColor,
    /// Text color
    pub text: RGBColor,
    /// Axis color
    pub axis: RGBColor,
    /// Threshold/reference line color
    pub reference_line: RGBColor,
    /// Volcano classification colors
    pub class_colors: ClassPalette,
    /// Ordered colors for Venn circles and UpSet bars
    pub set_colors: Vec<RGBColor>,
}

/// Colors for the three volcano classifications.
#[derive(Debug, Clone, Copy)]
pub struct ClassPalette {
    pub up: RGBColor,
    pub down: RGBColor,
    pub not_significant: RGBColor,
}

impl ClassPalette {
    /// Build a palette from a `{category: color}` mapping. Exactly the keys
    /// `up`, `down` and `ns` must be present; anything missing or
    /// unrecognized fails fast.
    pub fn from_map(map: &IndexMap<String, String>) -> Result<Self, OmvizError> {
        for key in map.keys() {
            if !matches!(key.as_str(), "up" | "down" | "ns") {
                return Err(OmvizError::Config(format!(
                    "unrecognized palette key '{key}' (expected up, down, ns)"
                )));
            }
        }
        let get = |key: &str| -> Result<RGBColor, OmvizError> {
            let spec = map
                .get(key)
                .ok_or_else(|| OmvizError::Config(format!("palette key '{key}' is missing")))?;
            parse_color(spec)
        };
        Ok(Self {
            up: get("up")?,
            down: get("down")?,
            not_significant: get("ns")?,
        })
    }
}

/// Parse `#RRGGBB` hex or a small list of named colors.
pub fn parse_color(spec: &str) -> Result<RGBColor, OmvizError> {
    let spec = spec.trim();
    if let Some(hex) = spec.strip_prefix('#') {
        if hex.len() == 6 {
            let r = u8::from_str_radix(&hex[0..2], 16);
            let g = u8::from_str_radix(&hex[2..4], 16);
            let b = u8::from_str_radix(&hex[4..6], 16);
            if let (Ok(r), Ok(g), Ok(b)) = (r, g, b) {
                return Ok(RGBColor(r, g, b));
            }
        }
        return Err(OmvizError::Config(format!("invalid hex color '{spec}'")));
    }
    match spec.to_lowercase().as_str() {
        "red" => Ok(RGBColor(214, 39, 40)),
        "blue" => Ok(RGBColor(31, 119, 180)),
        "green" => Ok(RGBColor(44, 160, 44)),
        "orange" => Ok(RGBColor(255, 127, 14)),
        "purple" => Ok(RGBColor(148, 103, 189)),
        "grey" | "gray" => Ok(RGBColor(150, 150, 150)),
        "black" => Ok(RGBColor(0, 0, 0)),
        other => Err(OmvizError::Config(format!("unknown color '{other}'"))),
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Look up a theme by name (for the CLI `--theme` flag).
    pub fn from_name(name: &str) -> Result<Self, OmvizError> {
        match name.to_lowercase().as_str() {
            "classic" => Ok(Self::classic()),
            "nature" => Ok(Self::nature()),
            "dark" => Ok(Self::dark()),
            "high-contrast" | "high_contrast" => Ok(Self::high_contrast()),
            other => Err(OmvizError::Config(format!("unknown theme '{other}'"))),
        }
    }

    /// Classic theme: red/blue significance colors on white
    pub fn classic() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(0, 0, 0),
            axis: RGBColor(100, 100, 100),
            reference_line: RGBColor(120, 120, 120),
            class_colors: ClassPalette {
                up: RGBColor(178, 24, 43),            // Firebrick red
                down: RGBColor(33, 102, 172),         // Steel blue
                not_significant: RGBColor(180, 180, 180),
            },
            set_colors: vec![
                RGBColor(31, 119, 180),   // Blue
                RGBColor(255, 127, 14),   // Orange
                RGBColor(44, 160, 44),    // Green
                RGBColor(148, 103, 189),  // Purple
            ],
        }
    }

    /// Nature-style theme with muted colors
    pub fn nature() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(50, 50, 50),
            axis: RGBColor(80, 80, 80),
            reference_line: RGBColor(100, 100, 100),
            class_colors: ClassPalette {
                up: RGBColor(202, 0, 32),
                down: RGBColor(5, 113, 176),
                not_significant: RGBColor(190, 190, 190),
            },
            set_colors: vec![
                RGBColor(77, 77, 77),      // Dark gray
                RGBColor(153, 153, 153),   // Light gray
                RGBColor(217, 95, 2),      // Burnt orange
            ],
        }
    }

    /// Dark theme for presentations
    pub fn dark() -> Self {
        Self {
            background: RGBColor(30, 30, 30),
            text: RGBColor(220, 220, 220),
            axis: RGBColor(150, 150, 150),
            reference_line: RGBColor(150, 150, 150),
            class_colors: ClassPalette {
                up: RGBColor(252, 141, 98),           // Coral
                down: RGBColor(102, 194, 165),        // Teal
                not_significant: RGBColor(90, 90, 90),
            },
            set_colors: vec![
                RGBColor(102, 194, 165),
                RGBColor(252, 141, 98),
                RGBColor(141, 160, 203),
            ],
        }
    }

    /// High contrast theme for accessibility
    pub fn high_contrast() -> Self {
        Self {
            background: RGBColor(255, 255, 255),
            text: RGBColor(0, 0, 0),
            axis: RGBColor(0, 0, 0),
            reference_line: RGBColor(0, 0, 0),
            class_colors: ClassPalette {
                up: RGBColor(0, 0, 0),
                down: RGBColor(80, 80, 80),
                not_significant: RGBColor(200, 200, 200),
            },
            set_colors: vec![
                RGBColor(0, 0, 0),
                RGBColor(120, 120, 120),
                RGBColor(200, 200, 200),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_named_colors() {
        assert_eq!(parse_color("#ff0080").unwrap(), RGBColor(255, 0, 128));
        assert_eq!(parse_color("black").unwrap(), RGBColor(0, 0, 0));
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("chartreuse-ish").is_err());
    }

    #[test]
    fn class_palette_requires_exact_keys() {
        let mut map = IndexMap::new();
        map.insert("up".to_string(), "red".to_string());
        map.insert("down".to_string(), "blue".to_string());
        assert!(ClassPalette::from_map(&map).is_err()); // ns missing

        map.insert("ns".to_string(), "grey".to_string());
        assert!(ClassPalette::from_map(&map).is_ok());

        map.insert("extra".to_string(), "green".to_string());
        assert!(ClassPalette::from_map(&map).is_err());
    }

    #[test]
    fn theme_lookup_by_name() {
        assert!(Theme::from_name("dark").is_ok());
        assert!(Theme::from_name("neon").is_err());
    }
}
