//! UpSet plots for genomic annotation overlap
//!
//! Takes a ChIPseeker-style peak annotation table, buckets each detailed
//! annotation string into a simplified category by substring match, and
//! counts how often each combination of categories co-occurs on a peak.
//! The combination matrix and bars are laid out directly in chart
//! coordinates.

use crate::output::OutputFormat;
use crate::PlotConfig;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use omviz_core::{OmvizError, PeakAnnotation};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// Simplified annotation buckets, in display priority order. Substring
/// matching follows ChIPseeker's detailed annotation strings, e.g.
/// "Promoter (<=1kb)" or "Intron (ENST..., intron 2 of 10)".
pub const ANNOTATION_BUCKETS: [&str; 7] = [
    "Promoter",
    "5' UTR",
    "3' UTR",
    "Exon",
    "Intron",
    "Downstream",
    "Distal Intergenic",
];

/// Bucket a detailed annotation string; first matching bucket wins,
/// anything unmatched becomes "Other".
pub fn simplify_annotation(detail: &str) -> &'static str {
    for bucket in ANNOTATION_BUCKETS {
        if detail.contains(bucket) {
            return bucket;
        }
    }
    "Other"
}

/// One combination of categories and the number of peaks carrying exactly
/// that combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsetCombo {
    /// Member categories, in bucket priority order
    pub members: Vec<&'static str>,
    pub count: usize,
}

/// Prepared UpSet data: categories present, combinations sorted by
/// descending count, and the total number of distinct peaks.
#[derive(Debug, Clone)]
pub struct UpsetData {
    pub categories: Vec<&'static str>,
    pub combos: Vec<UpsetCombo>,
    pub total_peaks: usize,
}

/// Configuration specific to UpSet plots
#[derive(Debug, Clone)]
pub struct UpsetConfig {
    /// Keep only the most frequent combinations (default: 20)
    pub max_combos: usize,
    /// Base plot config
    pub plot_config: PlotConfig,
}

impl Default for UpsetConfig {
    fn default() -> Self {
        Self {
            max_combos: 20,
            plot_config: PlotConfig::default(),
        }
    }
}

/// Group annotation rows by peak, simplify categories and count identical
/// category combinations.
///
/// Combination order is descending by count; ties keep first-seen peak
/// order (the sort is stable). The result is truncated to `max_combos`.
pub fn prepare_upset(
    records: &[PeakAnnotation],
    max_combos: usize,
) -> std::result::Result<UpsetData, OmvizError> {
    if records.is_empty() {
        return Err(OmvizError::EmptyInput("no annotation rows".to_string()));
    }

    let bucket_rank = |bucket: &'static str| -> usize {
        ANNOTATION_BUCKETS
            .iter()
            .position(|b| *b == bucket)
            .unwrap_or(ANNOTATION_BUCKETS.len())
    };

    // Per-peak category sets, peaks in first-seen order
    let mut per_peak: IndexMap<&str, Vec<&'static str>> = IndexMap::new();
    for record in records {
        let bucket = simplify_annotation(&record.annotation);
        let categories = per_peak.entry(record.peak_id.as_str()).or_default();
        if !categories.contains(&bucket) {
            categories.push(bucket);
        }
    }
    let total_peaks = per_peak.len();

    // Count identical combinations, preserving first-seen order for ties
    let mut combo_counts: IndexMap<Vec<&'static str>, usize> = IndexMap::new();
    for (_, mut categories) in per_peak {
        categories.sort_by_key(|c| bucket_rank(c));
        *combo_counts.entry(categories).or_insert(0) += 1;
    }

    let mut combos: Vec<UpsetCombo> = combo_counts
        .into_iter()
        .map(|(members, count)| UpsetCombo { members, count })
        .collect();
    combos.sort_by(|a, b| b.count.cmp(&a.count));
    combos.truncate(max_combos);

    let mut categories: Vec<&'static str> = combos
        .iter()
        .flat_map(|c| c.members.iter().copied())
        .unique()
        .collect();
    categories.sort_by_key(|c| bucket_rank(c));

    Ok(UpsetData {
        categories,
        combos,
        total_peaks,
    })
}

/// Generate an UpSet plot from a peak annotation table
///
/// # Arguments
/// * `records` - Annotation rows (one peak may span several rows)
/// * `output_path` - Path for output file (SVG or PNG based on extension)
/// * `config` - UpSet configuration
pub fn upset_plot<P: AsRef<Path>>(
    records: &[PeakAnnotation],
    output_path: P,
    config: UpsetConfig,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let data = prepare_upset(records, config.max_combos)?;
    log::info!(
        "upset: {} peaks, {} combinations over {} categories",
        data.total_peaks,
        data.combos.len(),
        data.categories.len()
    );

    match OutputFormat::from_path(output_path)? {
        OutputFormat::Svg => draw_upset_svg(output_path, &data, &config),
        #[cfg(feature = "png")]
        OutputFormat::Png => draw_upset_png(output_path, &data, &config),
        #[cfg(not(feature = "png"))]
        OutputFormat::Png => anyhow::bail!("PNG output requires the `png` feature"),
    }
}

fn draw_upset_svg(output_path: &Path, data: &UpsetData, config: &UpsetConfig) -> Result<()> {
    let (width, height) = (config.plot_config.width, config.plot_config.height);
    let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();

    draw_upset_impl(&root, data, config).context("Failed to draw UpSet plot")?;

    root.present().context("Failed to write SVG")?;
    Ok(())
}

#[cfg(feature = "png")]
fn draw_upset_png(output_path: &Path, data: &UpsetData, config: &UpsetConfig) -> Result<()> {
    let (width, height) = (config.plot_config.width, config.plot_config.height);
    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();

    draw_upset_impl(&root, data, config).context("Failed to draw UpSet plot")?;

    root.present().context("Failed to write PNG")?;
    Ok(())
}

fn draw_upset_impl<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    data: &UpsetData,
    config: &UpsetConfig,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let theme = &config.plot_config.theme;
    root.fill(&theme.background)?;

    let title = config
        .plot_config
        .title
        .as_deref()
        .unwrap_or("Annotation Overlap");

    let n_combos = data.combos.len();
    let n_cats = data.categories.len();
    let max_count = data.combos.iter().map(|c| c.count).max().unwrap_or(1);

    // Bars live above y = 0; the membership matrix occupies one negative
    // unit of y per category.
    let y_top = max_count as f64 * 1.15;
    let y_bottom = -(n_cats as f64) - 0.5;
    // Left margin sized to fit category labels drawn inside the plot area
    let x_left = -(n_combos as f64).max(4.0) * 0.35;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24).into_font().color(&theme.text))
        .margin(10)
        .y_label_area_size(50)
        .build_cartesian_2d(x_left..n_combos as f64, y_bottom..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc("Peaks")
        .y_label_style(("sans-serif", 14).into_font().color(&theme.text))
        .y_label_formatter(&|y: &f64| {
            if *y >= 0.0 {
                format!("{}", *y as i64)
            } else {
                String::new()
            }
        })
        .axis_style(&theme.axis)
        .draw()?;

    let bar_color = theme.set_colors[0];
    let dot_on = theme.text;
    let dot_off = theme.class_colors.not_significant;

    let count_font = ("sans-serif", config.plot_config.label_font_size)
        .into_font()
        .color(&theme.text)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    let cat_font = ("sans-serif", config.plot_config.label_font_size)
        .into_font()
        .color(&theme.text)
        .pos(Pos::new(HPos::Right, VPos::Center));

    for (i, combo) in data.combos.iter().enumerate() {
        let x0 = i as f64 + 0.15;
        let x1 = i as f64 + 0.85;
        let x_mid = i as f64 + 0.5;

        // Combination size bar with its count above
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x0, 0.0), (x1, combo.count as f64)],
            bar_color.filled(),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            combo.count.to_string(),
            (x_mid, combo.count as f64 + y_top * 0.01),
            count_font.clone(),
        )))?;

        // Membership dots under the bar
        for (row, category) in data.categories.iter().enumerate() {
            let y = -(row as f64) - 1.0;
            let color = if combo.members.contains(category) {
                dot_on
            } else {
                dot_off
            };
            chart.draw_series(std::iter::once(Circle::new(
                (x_mid, y),
                config.plot_config.point_size + 2,
                color.filled(),
            )))?;
        }
    }

    // Category labels to the left of the matrix
    for (row, category) in data.categories.iter().enumerate() {
        chart.draw_series(std::iter::once(Text::new(
            category.to_string(),
            (-0.2, -(row as f64) - 1.0),
            cat_font.clone(),
        )))?;
    }

    Ok(())
}
