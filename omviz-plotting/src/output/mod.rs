//! Output format handling for plots
//!
//! Plot entry points dispatch on the output path's extension; the actual
//! rendering lives in the individual plot modules (volcano, venn, upset).

use anyhow::Result;
use std::path::Path;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Scalable Vector Graphics (default)
    Svg,
    /// Portable Network Graphics (requires `png` feature)
    Png,
}

impl OutputFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Detect format from an output path, defaulting to SVG when the path
    /// has no extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("svg");
        Self::from_extension(ext)
            .ok_or_else(|| anyhow::anyhow!("unsupported output format: {}", ext))
    }

    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("plot.SVG")).unwrap(),
            OutputFormat::Svg
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("plot.png")).unwrap(),
            OutputFormat::Png
        );
        // No extension defaults to SVG
        assert_eq!(
            OutputFormat::from_path(Path::new("plot")).unwrap(),
            OutputFormat::Svg
        );
        assert!(OutputFormat::from_path(Path::new("plot.pdf")).is_err());
        assert_eq!(OutputFormat::Png.extension(), "png");
    }
}
