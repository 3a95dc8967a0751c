//! omviz-core: shared record types and table I/O for the omviz toolkit.
//!
//! This crate provides the data structures consumed by omviz-plotting:
//! - Differential-expression result tables (DESeq2-style columns)
//! - Named gene sets for Venn diagrams
//! - Peak annotation tables (ChIPseeker-style) for UpSet plots
//!
//! All loaders treat `NA`, `NaN` and empty cells as missing values and
//! validate required columns before any numeric logic runs.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

pub type GeneSymbol = String;

/// Named gene sets, in insertion order (legend order follows it).
pub type GeneSets = IndexMap<String, Vec<GeneSymbol>>;

/// Errors produced by table ingestion and plot configuration.
#[derive(Debug, Error)]
pub enum OmvizError {
    /// A required column is absent from the input table.
    #[error("required column missing: expected one of [{expected}] in {path}")]
    Schema { expected: String, path: String },

    /// No usable rows remain after filtering.
    #[error("no usable rows: {0}")]
    EmptyInput(String),

    /// Invalid plot configuration (palette, set count, theme name).
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OmvizError>;

/// One row of a differential-expression result table.
///
/// `pvalue` and `padj` are optional at this stage; rows with missing
/// values are dropped by the volcano preparation step, not at load time.
/// A missing `log2FoldChange` is carried as NaN and excluded from every
/// statistic by explicit finite-value filtering downstream.
#[derive(Debug, Clone)]
pub struct DeRecord {
    pub symbol: GeneSymbol,
    pub log2_fold_change: f64,
    pub pvalue: Option<f64>,
    pub padj: Option<f64>,
}

/// One row of a peak annotation table (one peak may span several rows).
#[derive(Debug, Clone, Deserialize)]
pub struct PeakAnnotation {
    #[serde(alias = "peak", alias = "name", alias = "peak_name", alias = "id")]
    pub peak_id: String,
    #[serde(alias = "anno", alias = "Annotation")]
    pub annotation: String,
}

/// Parse a numeric cell, treating "NA", "NaN" and empty strings as missing.
pub fn parse_f64_opt(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("nan")
    {
        None
    } else {
        trimmed.parse::<f64>().ok()
    }
}

/// Pick the delimiter from the file extension: tab for `.tsv`/`.txt`,
/// comma otherwise.
fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("txt") => b'\t',
        _ => b',',
    }
}

/// Find a column index by any of its accepted header names (case-insensitive).
fn find_col(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

fn require_col(
    headers: &csv::StringRecord,
    names: &[&str],
    path: &Path,
) -> Result<usize> {
    find_col(headers, names).ok_or_else(|| OmvizError::Schema {
        expected: names.join(", "),
        path: path.display().to_string(),
    })
}

const SYMBOL_NAMES: &[&str] = &["symbol", "gene", "gene_name", "gene_id"];
const LFC_NAMES: &[&str] = &["log2FoldChange", "log2fc", "logfc", "lfc"];
const PVALUE_NAMES: &[&str] = &["pvalue", "p_value", "pval", "p"];
const PADJ_NAMES: &[&str] = &["padj", "p_adjusted", "fdr", "qvalue", "adj.p.val"];

/// Load a differential-expression result table from CSV or TSV.
///
/// Required columns (aliases accepted, case-insensitive): `symbol`,
/// `log2FoldChange`, `pvalue`, `padj`. A missing column is a
/// [`OmvizError::Schema`] before any row is parsed.
pub fn load_de_table<P: AsRef<Path>>(path: P) -> Result<Vec<DeRecord>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .from_path(path)?;
    let headers = rdr.headers()?.clone();

    let symbol_idx = require_col(&headers, SYMBOL_NAMES, path)?;
    let lfc_idx = require_col(&headers, LFC_NAMES, path)?;
    let pvalue_idx = require_col(&headers, PVALUE_NAMES, path)?;
    let padj_idx = require_col(&headers, PADJ_NAMES, path)?;

    let mut records = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let symbol = rec.get(symbol_idx).unwrap_or("").trim().to_string();
        if symbol.is_empty() {
            continue;
        }
        let log2_fold_change = rec
            .get(lfc_idx)
            .and_then(parse_f64_opt)
            .unwrap_or(f64::NAN);
        let pvalue = rec.get(pvalue_idx).and_then(parse_f64_opt);
        let padj = rec.get(padj_idx).and_then(parse_f64_opt);
        records.push(DeRecord {
            symbol,
            log2_fold_change,
            pvalue,
            padj,
        });
    }

    log::info!(
        "loaded {} DE records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Load one gene set per plain-text file (one symbol per line, `#` comments
/// skipped). The set name is the file stem; duplicates within a set are
/// removed, keeping first occurrence.
pub fn load_gene_set_files<P: AsRef<Path>>(paths: &[P]) -> Result<GeneSets> {
    let mut sets = GeneSets::new();
    for path in paths {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("set")
            .to_string();
        let contents = fs::read_to_string(path)?;
        let mut seen = HashSet::new();
        let genes: Vec<GeneSymbol> = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter(|l| seen.insert(l.to_string()))
            .map(str::to_string)
            .collect();
        log::info!("set '{}': {} genes from {}", name, genes.len(), path.display());
        sets.insert(name, genes);
    }
    Ok(sets)
}

/// Load gene sets from a two-column `set,gene` table (CSV or TSV).
/// Set order follows first appearance in the file.
pub fn load_gene_sets_table<P: AsRef<Path>>(path: P) -> Result<GeneSets> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .from_path(path)?;
    let headers = rdr.headers()?.clone();
    let set_idx = require_col(&headers, &["set", "set_name", "group"], path)?;
    let gene_idx = require_col(&headers, &["gene", "symbol", "gene_name"], path)?;

    let mut sets = GeneSets::new();
    for rec in rdr.records() {
        let rec = rec?;
        let set = rec.get(set_idx).unwrap_or("").trim();
        let gene = rec.get(gene_idx).unwrap_or("").trim();
        if set.is_empty() || gene.is_empty() {
            continue;
        }
        let genes = sets.entry(set.to_string()).or_default();
        if !genes.iter().any(|g| g == gene) {
            genes.push(gene.to_string());
        }
    }
    if sets.is_empty() {
        return Err(OmvizError::EmptyInput(format!(
            "no gene-set rows in {}",
            path.display()
        )));
    }
    Ok(sets)
}

/// Load a peak annotation table from CSV or TSV. Required columns:
/// `peak_id` and `annotation` (aliases accepted).
pub fn load_peak_annotations<P: AsRef<Path>>(path: P) -> Result<Vec<PeakAnnotation>> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter_for(path))
        .from_path(path)?;
    let headers = rdr.headers()?.clone();
    require_col(&headers, &["peak_id", "peak", "name", "peak_name", "id"], path)?;
    require_col(&headers, &["annotation", "anno"], path)?;

    let mut records = Vec::new();
    for rec in rdr.deserialize() {
        let ann: PeakAnnotation = rec?;
        if ann.peak_id.trim().is_empty() {
            continue;
        }
        records.push(ann);
    }
    log::info!(
        "loaded {} annotation rows from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_csv(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_deseq2_style_table() {
        let file = temp_csv(
            "symbol,log2FoldChange,pvalue,padj\n\
             G1,4.0,0.001,0.001\n\
             G2,-4.0,0.001,0.001\n",
        );
        let records = load_de_table(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].symbol, "G1");
        assert_eq!(records[1].log2_fold_change, -4.0);
        assert_eq!(records[0].padj, Some(0.001));
    }

    #[test]
    fn na_cells_become_missing() {
        let file = temp_csv(
            "gene,log2FC,pval,FDR\n\
             G1,2.0,NA,0.01\n\
             G2,NaN,0.5,\n",
        );
        let records = load_de_table(file.path()).unwrap();
        assert_eq!(records[0].pvalue, None);
        assert!(records[1].log2_fold_change.is_nan());
        assert_eq!(records[1].padj, None);
    }

    #[test]
    fn missing_column_is_schema_error() {
        let file = temp_csv("symbol,log2FoldChange,pvalue\nG1,2.0,0.01\n");
        let err = load_de_table(file.path()).unwrap_err();
        match err {
            OmvizError::Schema { expected, .. } => assert!(expected.contains("padj")),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn header_aliases_are_case_insensitive() {
        let file = temp_csv("Gene,Log2FoldChange,PValue,Padj\nG1,1.0,0.1,0.2\n");
        assert_eq!(load_de_table(file.path()).unwrap().len(), 1);
    }

    #[test]
    fn tsv_extension_switches_delimiter() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        file.write_all(b"symbol\tlog2FoldChange\tpvalue\tpadj\nG1\t1.5\t0.2\t0.3\n")
            .unwrap();
        let records = load_de_table(file.path()).unwrap();
        assert_eq!(records[0].log2_fold_change, 1.5);
    }

    #[test]
    fn gene_set_files_dedup_and_skip_comments() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"# header comment\nTP53\nBRCA1\nTP53\n\nMYC\n")
            .unwrap();
        let sets = load_gene_set_files(&[file.path()]).unwrap();
        let (_, genes) = sets.first().unwrap();
        assert_eq!(genes, &vec!["TP53", "BRCA1", "MYC"]);
    }

    #[test]
    fn gene_sets_table_preserves_order() {
        let file = temp_csv(
            "set,gene\n\
             treated,TP53\n\
             control,MYC\n\
             treated,BRCA1\n",
        );
        let sets = load_gene_sets_table(file.path()).unwrap();
        let names: Vec<&String> = sets.keys().collect();
        assert_eq!(names, ["treated", "control"]);
        assert_eq!(sets["treated"], vec!["TP53", "BRCA1"]);
    }

    #[test]
    fn peak_annotations_load_with_aliases() {
        let file = temp_csv(
            "peak,anno\n\
             peak_1,Promoter (<=1kb)\n\
             peak_1,Intron (ENST0001, intron 2 of 10)\n\
             peak_2,Distal Intergenic\n",
        );
        let records = load_peak_annotations(file.path()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].peak_id, "peak_1");
        assert!(records[1].annotation.starts_with("Intron"));
    }

    #[test]
    fn peak_annotations_missing_column() {
        let file = temp_csv("peak\npeak_1\n");
        assert!(matches!(
            load_peak_annotations(file.path()),
            Err(OmvizError::Schema { .. })
        ));
    }
}
