//! Volcano plot generation for differential-expression results
//!
//! The preparation step classifies each gene as up- or down-regulated by
//! comparing `padj` and `log2FoldChange` against two cutoffs, selects the
//! top-N most significant genes per direction for labeling, and derives
//! symmetric axis ranges with outlier guards.

use crate::output::OutputFormat;
use crate::PlotConfig;
use anyhow::{Context, Result};
use omviz_core::{DeRecord, OmvizError};
use plotters::prelude::*;
use std::path::Path;

// Axis-scaling constants tuned on real DE tables. Kept as fixed
// configuration rather than re-derived per dataset.
/// Above this -log10(padj), the Y axis is capped hard.
pub const Y_OUTLIER_TRIGGER: f64 = 300.0;
/// Hard Y cap applied past the trigger.
pub const Y_HARD_LIMIT: f64 = 250.0;
/// Ratio of the two largest Y values past which the top value is treated
/// as a lone outlier and clipped.
pub const Y_LONE_OUTLIER_RATIO: f64 = 1.4;
/// Default Y limit when no finite values exist.
pub const Y_DEFAULT_LIMIT: f64 = 10.0;
/// Visual margin factor for the Y axis.
pub const Y_MARGIN: f64 = 1.1;
/// Absolute log2 fold changes are clamped here before scaling.
pub const X_CLAMP: f64 = 7.5;
/// Visual margin factor for the X axis.
pub const X_MARGIN: f64 = 1.7;
/// Minimum half-width of the X range.
pub const X_FLOOR: f64 = 3.0;

/// Classification of a gene relative to the significance cutoffs.
///
/// Cutoffs are strict: a gene exactly at a threshold is not significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regulation {
    UpRegulated,
    DownRegulated,
    NotSignificant,
}

impl Regulation {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UpRegulated => "Upregulated",
            Self::DownRegulated => "Downregulated",
            Self::NotSignificant => "NS",
        }
    }
}

/// Classify one gene. Pure function of the record and the two cutoffs.
pub fn classify(padj: f64, log2_fold_change: f64, pval_cutoff: f64, lfc_cutoff: f64) -> Regulation {
    if padj < pval_cutoff && log2_fold_change > lfc_cutoff {
        Regulation::UpRegulated
    } else if padj < pval_cutoff && log2_fold_change < -lfc_cutoff {
        Regulation::DownRegulated
    } else {
        Regulation::NotSignificant
    }
}

/// A cleaned, classified gene ready for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct VolcanoPoint {
    pub symbol: String,
    pub log2_fold_change: f64,
    pub pvalue: f64,
    pub padj: f64,
    pub neg_log10_padj: f64,
    pub regulation: Regulation,
}

/// Prepared volcano data: classified points, label subsets and axis limits.
#[derive(Debug, Clone)]
pub struct VolcanoData {
    pub points: Vec<VolcanoPoint>,
    /// Top-N upregulated genes, ascending by padj.
    pub top_up: Vec<VolcanoPoint>,
    /// Top-N downregulated genes, ascending by padj.
    pub top_down: Vec<VolcanoPoint>,
    /// Half-width of the symmetric X range `[-x_limit, x_limit]`.
    pub x_limit: f64,
    pub y_limit: f64,
}

/// Configuration specific to volcano plots
#[derive(Debug, Clone)]
pub struct VolcanoConfig {
    /// Adjusted p-value cutoff (strict)
    pub pval_cutoff: f64,
    /// Absolute log2 fold-change cutoff (strict)
    pub lfc_cutoff: f64,
    /// Number of labeled genes per direction
    pub top_n: usize,
    /// Override the computed X half-range
    pub x_limit: Option<f64>,
    /// Override the computed Y limit
    pub y_limit: Option<f64>,
    /// Base plot config
    pub plot_config: PlotConfig,
}

impl Default for VolcanoConfig {
    fn default() -> Self {
        Self {
            pval_cutoff: 0.05,
            lfc_cutoff: 1.0,
            top_n: 15,
            x_limit: None,
            y_limit: None,
            plot_config: PlotConfig::default(),
        }
    }
}

/// If the smallest p-value is exactly zero, replace every zero with the
/// smallest representable positive float. Numerical-stability placeholder,
/// not a statistical adjustment.
fn substitute_zero_pvalues(pvalues: &mut [f64]) {
    let min = pvalues.iter().copied().fold(f64::INFINITY, f64::min);
    if min == 0.0 {
        for p in pvalues.iter_mut() {
            if *p == 0.0 {
                *p = f64::MIN_POSITIVE;
            }
        }
    }
}

/// If the smallest padj is exactly zero, replace every zero with one tenth
/// of the smallest positive padj observed (falling back to the smallest
/// representable positive float when every padj is zero).
fn substitute_zero_padj(padjs: &mut [f64]) {
    let min = padjs.iter().copied().fold(f64::INFINITY, f64::min);
    if min == 0.0 {
        let smallest_positive = padjs
            .iter()
            .copied()
            .filter(|v| *v > 0.0)
            .fold(f64::INFINITY, f64::min);
        let replacement = if smallest_positive.is_finite() {
            smallest_positive / 10.0
        } else {
            f64::MIN_POSITIVE
        };
        for q in padjs.iter_mut() {
            if *q == 0.0 {
                *q = replacement;
            }
        }
    }
}

/// Derive the Y-axis limit from finite -log10(padj) values.
///
/// Guards against a single extreme gene dominating the scale: past 300 the
/// limit is pinned at 250, and a lone outlier (top value more than 1.4x the
/// runner-up) is clipped to the average of the two instead of stretching
/// the whole plot.
fn y_axis_limit(values: &[f64]) -> f64 {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Y_DEFAULT_LIMIT;
    }
    finite.sort_by(|a, b| b.total_cmp(a));
    let y1 = finite[0];
    if y1 > Y_OUTLIER_TRIGGER {
        return Y_HARD_LIMIT;
    }
    match finite.get(1) {
        None => y1 * Y_MARGIN,
        Some(&y2) if y1 / y2 > Y_LONE_OUTLIER_RATIO => (y1 + y2) / 2.0,
        Some(_) => y1 * Y_MARGIN,
    }
}

/// Derive the half-width of the symmetric X range from finite log2 fold
/// changes: clamp the extreme to 7.5, scale by 1.7 for margin, floor at 3.
fn x_axis_limit(log2_fold_changes: &[f64]) -> f64 {
    let m = log2_fold_changes
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .map(f64::abs)
        .fold(0.0_f64, f64::max);
    (m.min(X_CLAMP) * X_MARGIN).max(X_FLOOR)
}

/// Clean, classify and scale a differential-expression table.
///
/// Rows missing `pvalue` or `padj` are dropped; zero p-values get the
/// deterministic substitutions described on the helpers above. The result
/// is a pure function of the inputs (stable top-N ordering included), so
/// repeated calls are bit-identical.
pub fn prepare_volcano(
    records: &[DeRecord],
    pval_cutoff: f64,
    lfc_cutoff: f64,
    top_n: usize,
) -> std::result::Result<VolcanoData, OmvizError> {
    let kept: Vec<(&DeRecord, f64, f64)> = records
        .iter()
        .filter_map(|r| match (r.pvalue, r.padj) {
            (Some(p), Some(q)) => Some((r, p, q)),
            _ => None,
        })
        .collect();
    if kept.is_empty() {
        return Err(OmvizError::EmptyInput(
            "every row is missing pvalue or padj".to_string(),
        ));
    }

    let mut pvalues: Vec<f64> = kept.iter().map(|(_, p, _)| *p).collect();
    let mut padjs: Vec<f64> = kept.iter().map(|(_, _, q)| *q).collect();
    substitute_zero_pvalues(&mut pvalues);
    substitute_zero_padj(&mut padjs);

    let points: Vec<VolcanoPoint> = kept
        .iter()
        .zip(pvalues.iter().zip(padjs.iter()))
        .map(|((record, _, _), (&pvalue, &padj))| VolcanoPoint {
            symbol: record.symbol.clone(),
            log2_fold_change: record.log2_fold_change,
            pvalue,
            padj,
            neg_log10_padj: -padj.log10(),
            regulation: classify(padj, record.log2_fold_change, pval_cutoff, lfc_cutoff),
        })
        .collect();

    // Stable sort keeps original row order on padj ties, so label sets are
    // reproducible.
    let top_by_padj = |regulation: Regulation| -> Vec<VolcanoPoint> {
        let mut subset: Vec<VolcanoPoint> = points
            .iter()
            .filter(|p| p.regulation == regulation)
            .cloned()
            .collect();
        subset.sort_by(|a, b| a.padj.total_cmp(&b.padj));
        subset.truncate(top_n);
        subset
    };
    let top_up = top_by_padj(Regulation::UpRegulated);
    let top_down = top_by_padj(Regulation::DownRegulated);

    let neg_log10: Vec<f64> = points.iter().map(|p| p.neg_log10_padj).collect();
    let lfcs: Vec<f64> = points.iter().map(|p| p.log2_fold_change).collect();
    let y_limit = y_axis_limit(&neg_log10);
    let x_limit = x_axis_limit(&lfcs);

    Ok(VolcanoData {
        points,
        top_up,
        top_down,
        x_limit,
        y_limit,
    })
}

/// Generate a volcano plot from a differential-expression table
///
/// # Arguments
/// * `records` - DE records to plot
/// * `output_path` - Path for output file (SVG or PNG based on extension)
/// * `config` - Volcano configuration
///
/// # Example
/// ```ignore
/// use omviz_plotting::{volcano_plot, VolcanoConfig};
///
/// let records = omviz_core::load_de_table("deseq2_results.csv")?;
/// volcano_plot(&records, "volcano.svg", VolcanoConfig::default())?;
/// ```
pub fn volcano_plot<P: AsRef<Path>>(
    records: &[DeRecord],
    output_path: P,
    config: VolcanoConfig,
) -> Result<()> {
    let output_path = output_path.as_ref();

    if records.is_empty() {
        anyhow::bail!("No DE records to plot");
    }

    let mut data = prepare_volcano(records, config.pval_cutoff, config.lfc_cutoff, config.top_n)?;
    if let Some(x) = config.x_limit {
        data.x_limit = x;
    }
    if let Some(y) = config.y_limit {
        data.y_limit = y;
    }
    log::info!(
        "volcano: {} points ({} up, {} down labeled), x ±{:.2}, y {:.2}",
        data.points.len(),
        data.top_up.len(),
        data.top_down.len(),
        data.x_limit,
        data.y_limit
    );

    match OutputFormat::from_path(output_path)? {
        OutputFormat::Svg => draw_volcano_svg(output_path, &data, &config),
        #[cfg(feature = "png")]
        OutputFormat::Png => draw_volcano_png(output_path, &data, &config),
        #[cfg(not(feature = "png"))]
        OutputFormat::Png => anyhow::bail!("PNG output requires the `png` feature"),
    }
}

fn draw_volcano_svg(output_path: &Path, data: &VolcanoData, config: &VolcanoConfig) -> Result<()> {
    let (width, height) = (config.plot_config.width, config.plot_config.height);
    let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();

    draw_volcano_impl(&root, data, config).context("Failed to draw volcano plot")?;

    root.present().context("Failed to write SVG")?;
    Ok(())
}

#[cfg(feature = "png")]
fn draw_volcano_png(output_path: &Path, data: &VolcanoData, config: &VolcanoConfig) -> Result<()> {
    let (width, height) = (config.plot_config.width, config.plot_config.height);
    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();

    draw_volcano_impl(&root, data, config).context("Failed to draw volcano plot")?;

    root.present().context("Failed to write PNG")?;
    Ok(())
}

fn draw_volcano_impl<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    data: &VolcanoData,
    config: &VolcanoConfig,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let theme = &config.plot_config.theme;
    root.fill(&theme.background)?;

    let title = config.plot_config.title.as_deref().unwrap_or("Volcano Plot");
    let y_max = data.y_limit.max(1.0);
    let x_max = data.x_limit;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24).into_font().color(&theme.text))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-x_max..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("log₂ fold change")
        .y_desc("-log₁₀(padj)")
        .x_label_style(("sans-serif", 14).into_font().color(&theme.text))
        .y_label_style(("sans-serif", 14).into_font().color(&theme.text))
        .axis_style(&theme.axis)
        .draw()?;

    // Threshold reference lines
    let h = -config.pval_cutoff.log10();
    if h.is_finite() && h < y_max {
        chart.draw_series(LineSeries::new(
            vec![(-x_max, h), (x_max, h)],
            theme.reference_line.stroke_width(1),
        ))?;
    }
    for v in [-config.lfc_cutoff, config.lfc_cutoff] {
        if v.abs() < x_max {
            chart.draw_series(LineSeries::new(
                vec![(v, 0.0), (v, y_max)],
                theme.reference_line.stroke_width(1),
            ))?;
        }
    }

    // Points beyond the axis limits are clipped to the border rather than
    // allowed to stretch the scale.
    let clip = |p: &VolcanoPoint| -> (f64, f64) {
        (
            p.log2_fold_change.clamp(-x_max, x_max),
            p.neg_log10_padj.min(y_max),
        )
    };

    let point_size = config.plot_config.point_size;
    for regulation in [
        Regulation::NotSignificant,
        Regulation::UpRegulated,
        Regulation::DownRegulated,
    ] {
        let color = match regulation {
            Regulation::UpRegulated => theme.class_colors.up,
            Regulation::DownRegulated => theme.class_colors.down,
            Regulation::NotSignificant => theme.class_colors.not_significant,
        };
        let subset: Vec<(f64, f64)> = data
            .points
            .iter()
            .filter(|p| p.regulation == regulation && p.log2_fold_change.is_finite())
            .map(&clip)
            .collect();
        let n = subset.len();
        chart
            .draw_series(
                subset
                    .into_iter()
                    .map(|xy| Circle::new(xy, point_size, color.filled())),
            )?
            .label(format!("{} ({})", regulation.label(), n))
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }

    // Gene labels for the top-N subsets, fixed offset above each point.
    let label_font = ("sans-serif", config.plot_config.label_font_size)
        .into_font()
        .color(&theme.text);
    for p in data.top_up.iter().chain(data.top_down.iter()) {
        if !p.log2_fold_change.is_finite() {
            continue;
        }
        let (x, y) = clip(p);
        chart.draw_series(std::iter::once(Text::new(
            p.symbol.clone(),
            (x, (y + y_max * 0.015).min(y_max)),
            label_font.clone(),
        )))?;
    }

    chart
        .configure_series_labels()
        .background_style(theme.background.mix(0.8))
        .border_style(theme.axis)
        .label_font(("sans-serif", 13).into_font().color(&theme.text))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    Ok(())
}
