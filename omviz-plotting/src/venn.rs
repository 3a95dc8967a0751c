//! Venn diagrams for named gene sets
//!
//! The preparation step is pure set counting: every gene in the union is
//! assigned a membership bitmask and the exclusive region cardinalities are
//! tallied from those masks. Circle placement uses a fixed two- or
//! three-circle layout; no geometry is computed from the data.

use crate::output::OutputFormat;
use crate::PlotConfig;
use anyhow::{Context, Result};
use omviz_core::{GeneSets, OmvizError};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::HashSet;
use std::path::Path;

/// Configuration specific to Venn diagrams
#[derive(Debug, Clone)]
pub struct VennConfig {
    /// Append each region's share of the union, e.g. "12 (24.0%)"
    pub show_percentages: bool,
    /// Base plot config
    pub plot_config: PlotConfig,
}

impl Default for VennConfig {
    fn default() -> Self {
        Self {
            show_percentages: false,
            plot_config: PlotConfig::default(),
        }
    }
}

/// Exclusive region cardinalities for 2 or 3 gene sets.
///
/// `region_counts[mask]` is the number of genes belonging to exactly the
/// sets whose bits are on in `mask` (bit i = i-th set, insertion order).
/// Index 0 is unused.
#[derive(Debug, Clone)]
pub struct VennData {
    pub set_names: Vec<String>,
    /// Deduplicated size of each set
    pub set_sizes: Vec<usize>,
    pub region_counts: Vec<usize>,
    /// Size of the union of all sets
    pub total: usize,
}

impl VennData {
    pub fn n_sets(&self) -> usize {
        self.set_names.len()
    }
}

/// Count exclusive region sizes from named gene sets.
///
/// Duplicate symbols within a set are ignored. Accepts 2 or 3 sets; the
/// legend and color order follow set insertion order.
pub fn prepare_venn(sets: &GeneSets) -> std::result::Result<VennData, OmvizError> {
    if sets.is_empty() {
        return Err(OmvizError::EmptyInput("no gene sets supplied".to_string()));
    }
    if sets.len() < 2 || sets.len() > 3 {
        return Err(OmvizError::Config(format!(
            "venn diagrams support 2 or 3 sets, got {}",
            sets.len()
        )));
    }

    let members: Vec<HashSet<&str>> = sets
        .values()
        .map(|genes| genes.iter().map(String::as_str).collect())
        .collect();
    let union: HashSet<&str> = members.iter().flatten().copied().collect();

    let mut region_counts = vec![0usize; 1 << members.len()];
    for gene in &union {
        let mut mask = 0usize;
        for (i, set) in members.iter().enumerate() {
            if set.contains(gene) {
                mask |= 1 << i;
            }
        }
        region_counts[mask] += 1;
    }

    Ok(VennData {
        set_names: sets.keys().cloned().collect(),
        set_sizes: members.iter().map(HashSet::len).collect(),
        region_counts,
        total: union.len(),
    })
}

// Fixed unit-square layout. Circle centers and per-region label anchors,
// indexed by membership mask.
const TWO_SET_CENTERS: [(f64, f64); 2] = [(-0.3, 0.0), (0.3, 0.0)];
const TWO_SET_LABELS: [(f64, f64); 4] = [
    (0.0, 0.0),   // mask 0, unused
    (-0.6, 0.0),  // only A
    (0.6, 0.0),   // only B
    (0.0, 0.0),   // A ∩ B
];
const THREE_SET_CENTERS: [(f64, f64); 3] = [(-0.3, 0.25), (0.3, 0.25), (0.0, -0.3)];
const THREE_SET_LABELS: [(f64, f64); 8] = [
    (0.0, 0.0),     // mask 0, unused
    (-0.6, 0.45),   // only A
    (0.6, 0.45),    // only B
    (0.0, 0.55),    // A ∩ B
    (0.0, -0.7),    // only C
    (-0.4, -0.2),   // A ∩ C
    (0.4, -0.2),    // B ∩ C
    (0.0, 0.1),     // A ∩ B ∩ C
];
const CIRCLE_RADIUS: f64 = 0.55;

/// Generate a Venn diagram from named gene sets
///
/// # Arguments
/// * `sets` - 2 or 3 named gene sets (insertion order = legend order)
/// * `output_path` - Path for output file (SVG or PNG based on extension)
/// * `config` - Venn configuration
pub fn venn_plot<P: AsRef<Path>>(
    sets: &GeneSets,
    output_path: P,
    config: VennConfig,
) -> Result<()> {
    let output_path = output_path.as_ref();
    let data = prepare_venn(sets)?;

    let theme = &config.plot_config.theme;
    if theme.set_colors.len() < data.n_sets() {
        return Err(OmvizError::Config(format!(
            "theme provides {} set colors but {} sets were given",
            theme.set_colors.len(),
            data.n_sets()
        ))
        .into());
    }
    log::info!(
        "venn: {} sets, union of {} genes",
        data.n_sets(),
        data.total
    );

    match OutputFormat::from_path(output_path)? {
        OutputFormat::Svg => draw_venn_svg(output_path, &data, &config),
        #[cfg(feature = "png")]
        OutputFormat::Png => draw_venn_png(output_path, &data, &config),
        #[cfg(not(feature = "png"))]
        OutputFormat::Png => anyhow::bail!("PNG output requires the `png` feature"),
    }
}

fn draw_venn_svg(output_path: &Path, data: &VennData, config: &VennConfig) -> Result<()> {
    let (width, height) = (config.plot_config.width, config.plot_config.height);
    let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();

    draw_venn_impl(&root, data, config).context("Failed to draw Venn diagram")?;

    root.present().context("Failed to write SVG")?;
    Ok(())
}

#[cfg(feature = "png")]
fn draw_venn_png(output_path: &Path, data: &VennData, config: &VennConfig) -> Result<()> {
    let (width, height) = (config.plot_config.width, config.plot_config.height);
    let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();

    draw_venn_impl(&root, data, config).context("Failed to draw Venn diagram")?;

    root.present().context("Failed to write PNG")?;
    Ok(())
}

/// Points of a circle outline, for polygon fills and line outlines.
fn circle_points(center: (f64, f64), radius: f64) -> Vec<(f64, f64)> {
    (0..=128)
        .map(|i| {
            let angle = 2.0 * std::f64::consts::PI * (i as f64) / 128.0;
            (center.0 + radius * angle.cos(), center.1 + radius * angle.sin())
        })
        .collect()
}

fn draw_venn_impl<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    data: &VennData,
    config: &VennConfig,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let theme = &config.plot_config.theme;
    root.fill(&theme.background)?;

    let title = config.plot_config.title.as_deref().unwrap_or("Venn Diagram");

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24).into_font().color(&theme.text))
        .margin(10)
        .build_cartesian_2d(-1.2..1.2, -1.2..1.2)?;

    let centers: &[(f64, f64)] = if data.n_sets() == 2 {
        &TWO_SET_CENTERS
    } else {
        &THREE_SET_CENTERS
    };
    let labels: &[(f64, f64)] = if data.n_sets() == 2 {
        &TWO_SET_LABELS
    } else {
        &THREE_SET_LABELS
    };

    // Translucent circle fills with a solid outline; legend entry carries
    // the set name and its deduplicated size.
    for (i, &center) in centers.iter().enumerate() {
        let color = theme.set_colors[i];
        let outline = circle_points(center, CIRCLE_RADIUS);
        chart
            .draw_series(std::iter::once(Polygon::new(
                outline.clone(),
                color.mix(0.3).filled(),
            )))?
            .label(format!("{} (n={})", data.set_names[i], data.set_sizes[i]))
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
        chart.draw_series(LineSeries::new(outline, color.stroke_width(2)))?;
    }

    // Region counts at fixed anchors
    let count_font = ("sans-serif", config.plot_config.label_font_size + 3)
        .into_font()
        .color(&theme.text)
        .pos(Pos::new(HPos::Center, VPos::Center));
    for mask in 1..data.region_counts.len() {
        let count = data.region_counts[mask];
        let text = if config.show_percentages && data.total > 0 {
            format!("{} ({:.1}%)", count, 100.0 * count as f64 / data.total as f64)
        } else {
            count.to_string()
        };
        chart.draw_series(std::iter::once(Text::new(
            text,
            labels[mask],
            count_font.clone(),
        )))?;
    }

    chart
        .configure_series_labels()
        .background_style(theme.background.mix(0.8))
        .border_style(theme.axis)
        .label_font(("sans-serif", 14).into_font().color(&theme.text))
        .position(SeriesLabelPosition::LowerRight)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets_of(pairs: &[(&str, &[&str])]) -> GeneSets {
        pairs
            .iter()
            .map(|(name, genes)| {
                (
                    name.to_string(),
                    genes.iter().map(|g| g.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn two_set_regions() {
        let sets = sets_of(&[
            ("treated", &["A", "B", "C"]),
            ("control", &["B", "C", "D", "E"]),
        ]);
        let data = prepare_venn(&sets).unwrap();
        assert_eq!(data.set_names, ["treated", "control"]);
        assert_eq!(data.set_sizes, [3, 4]);
        assert_eq!(data.region_counts[0b01], 1); // only treated: A
        assert_eq!(data.region_counts[0b10], 2); // only control: D, E
        assert_eq!(data.region_counts[0b11], 2); // shared: B, C
        assert_eq!(data.total, 5);
    }

    #[test]
    fn three_set_regions() {
        let sets = sets_of(&[
            ("a", &["x", "y", "z"]),
            ("b", &["y", "z", "w"]),
            ("c", &["z", "v"]),
        ]);
        let data = prepare_venn(&sets).unwrap();
        assert_eq!(data.region_counts[0b001], 1); // x
        assert_eq!(data.region_counts[0b010], 1); // w
        assert_eq!(data.region_counts[0b100], 1); // v
        assert_eq!(data.region_counts[0b011], 1); // y
        assert_eq!(data.region_counts[0b111], 1); // z
        assert_eq!(data.region_counts[0b101], 0);
        assert_eq!(data.region_counts[0b110], 0);
        assert_eq!(data.total, 6);
    }

    #[test]
    fn duplicates_within_a_set_are_ignored() {
        let sets = sets_of(&[("a", &["x", "x", "y"]), ("b", &["y"])]);
        let data = prepare_venn(&sets).unwrap();
        assert_eq!(data.set_sizes, [2, 1]);
        assert_eq!(data.region_counts[0b01], 1);
        assert_eq!(data.region_counts[0b11], 1);
    }

    #[test]
    fn set_count_is_validated() {
        assert!(matches!(
            prepare_venn(&GeneSets::new()),
            Err(OmvizError::EmptyInput(_))
        ));
        let one = sets_of(&[("a", &["x"])]);
        assert!(matches!(prepare_venn(&one), Err(OmvizError::Config(_))));
        let four = sets_of(&[
            ("a", &["x"]),
            ("b", &["x"]),
            ("c", &["x"]),
            ("d", &["x"]),
        ]);
        assert!(matches!(prepare_venn(&four), Err(OmvizError::Config(_))));
    }

    #[test]
    fn renders_svg_file() {
        let sets = sets_of(&[
            ("treated", &["A", "B", "C"]),
            ("control", &["B", "C", "D"]),
            ("input", &["C", "E"]),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("venn.svg");
        venn_plot(&sets, &path, VennConfig::default()).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("<svg"));
    }
}
