//! omviz-plotting: publication plots for omics result tables.
//!
//! This crate provides plotting functionality for common omics summaries:
//! - Volcano plots for differential-expression tables
//! - Venn diagrams with custom legends for named gene sets
//! - UpSet plots for genomic annotation overlap (ChIPseeker-style tables)
//!
//! ## Features
//! - Thresholding, top-N gene labeling and symmetric axis scaling
//! - Customizable themes
//! - SVG output (default)
//! - PNG output (optional, requires `png` feature)
//!
//! ## Example
//! ```ignore
//! use omviz_plotting::{volcano_plot, VolcanoConfig};
//!
//! let records = omviz_core::load_de_table("deseq2_results.csv")?;
//! volcano_plot(&records, "volcano.svg", VolcanoConfig::default())?;
//! ```

pub mod output;
pub mod themes;
pub mod upset;
pub mod venn;
pub mod volcano;

/// Configuration shared by every plot type.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Plot width in pixels
    pub width: u32,
    /// Plot height in pixels
    pub height: u32,
    /// Plot title
    pub title: Option<String>,
    /// Color theme
    pub theme: themes::Theme,
    /// Point size
    pub point_size: u32,
    /// Font size for on-plot text labels
    pub label_font_size: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 700,
            title: None,
            theme: themes::Theme::default(),
            point_size: 3,
            label_font_size: 13,
        }
    }
}

// Re-export main functions
pub use upset::{prepare_upset, upset_plot, UpsetConfig};
pub use venn::{prepare_venn, venn_plot, VennConfig};
pub use volcano::{prepare_volcano, volcano_plot, VolcanoConfig};
