use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use omviz_plotting::themes::{ClassPalette, Theme};
use omviz_plotting::{
    upset_plot, venn_plot, volcano_plot, PlotConfig, UpsetConfig, VennConfig, VolcanoConfig,
};

/// omviz: publication plots for omics result tables
#[derive(Parser)]
#[command(
    name = "omviz",
    version,
    about = "omviz: publication plots for omics results (volcano, venn, upset)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct CommonArgs {
    /// Output image path (.svg, or .png with the png feature)
    #[arg(long)]
    out: String,

    /// Color theme (classic, nature, dark, high-contrast)
    #[arg(long, default_value = "classic")]
    theme: String,

    /// Plot title
    #[arg(long)]
    title: Option<String>,

    /// Plot width in pixels
    #[arg(long, default_value_t = 900)]
    width: u32,

    /// Plot height in pixels
    #[arg(long, default_value_t = 700)]
    height: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Volcano plot from a differential-expression table (CSV/TSV)
    Volcano {
        /// DE result table with symbol, log2FoldChange, pvalue, padj columns
        #[arg(long)]
        input: String,

        /// Adjusted p-value cutoff (strict)
        #[arg(long, default_value_t = 0.05)]
        pval_cutoff: f64,

        /// Absolute log2 fold-change cutoff (strict)
        #[arg(long, default_value_t = 1.0)]
        lfc_cutoff: f64,

        /// Number of labeled genes per direction
        #[arg(long, default_value_t = 15)]
        top_n: usize,

        /// Override the computed Y-axis limit
        #[arg(long)]
        y_limit: Option<f64>,

        /// Override the computed symmetric X half-range
        #[arg(long)]
        x_limit: Option<f64>,

        /// Classification colors, e.g. "up=red,down=blue,ns=grey"
        #[arg(long)]
        colors: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Venn diagram from 2 or 3 gene-set files (one symbol per line)
    Venn {
        /// Gene-set file; repeat for each set (name taken from file stem)
        #[arg(long = "set")]
        sets: Vec<String>,

        /// Alternative: a single two-column set,gene table
        #[arg(long, conflicts_with = "sets")]
        table: Option<String>,

        /// Show each region's share of the union
        #[arg(long, default_value_t = false)]
        percentages: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// UpSet plot from a peak annotation table (ChIPseeker-style)
    Upset {
        /// Annotation table with peak_id and annotation columns
        #[arg(long)]
        input: String,

        /// Keep only the most frequent combinations
        #[arg(long, default_value_t = 20)]
        max_combos: usize,

        #[command(flatten)]
        common: CommonArgs,
    },
}

fn plot_config(common: &CommonArgs) -> Result<PlotConfig> {
    Ok(PlotConfig {
        width: common.width,
        height: common.height,
        title: common.title.clone(),
        theme: Theme::from_name(&common.theme)?,
        ..PlotConfig::default()
    })
}

/// Parse "up=red,down=#2166ac,ns=grey" into a palette.
fn parse_palette(spec: &str) -> Result<ClassPalette> {
    let mut map = IndexMap::new();
    for pair in spec.split(',') {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("bad color entry '{pair}' (expected key=color)"))?;
        map.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(ClassPalette::from_map(&map)?)
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Volcano {
            input,
            pval_cutoff,
            lfc_cutoff,
            top_n,
            y_limit,
            x_limit,
            colors,
            common,
        } => {
            let records = omviz_core::load_de_table(&input)?;
            let mut config = VolcanoConfig {
                pval_cutoff,
                lfc_cutoff,
                top_n,
                x_limit,
                y_limit,
                plot_config: plot_config(&common)?,
            };
            if let Some(spec) = colors {
                config.plot_config.theme.class_colors = parse_palette(&spec)?;
            }
            volcano_plot(&records, &common.out, config)?;
            log::info!("wrote {}", common.out);
        }

        Commands::Venn {
            sets,
            table,
            percentages,
            common,
        } => {
            let gene_sets = match table {
                Some(path) => omviz_core::load_gene_sets_table(&path)?,
                None => omviz_core::load_gene_set_files(&sets)?,
            };
            let config = VennConfig {
                show_percentages: percentages,
                plot_config: plot_config(&common)?,
            };
            venn_plot(&gene_sets, &common.out, config)?;
            log::info!("wrote {}", common.out);
        }

        Commands::Upset {
            input,
            max_combos,
            common,
        } => {
            let records = omviz_core::load_peak_annotations(&input)?;
            let config = UpsetConfig {
                max_combos,
                plot_config: plot_config(&common)?,
            };
            upset_plot(&records, &common.out, config)?;
            log::info!("wrote {}", common.out);
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
