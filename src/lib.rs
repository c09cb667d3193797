//! # review_insights
//!
//! Exploratory analysis of product-review dumps in the colon-delimited
//! `key: value` record format.
//!
//! The crate computes summary statistics, finds the word pairs that set positive
//! reviews apart from negative ones and ranks products that users review together.
//!
//! ```
//! use std::collections::HashSet;
//! use review_insights::bigrams::{BigramConfig, compare_bigram_sets};
//!
//! let pos = vec!["fast shipping works perfectly"; 10];
//! let neg = vec!["waste money stopped working"; 10];
//! let (pos_only, neg_only) =
//!     compare_bigram_sets(&pos, &neg, &HashSet::new(), &BigramConfig::default());
//! assert!(pos_only.is_disjoint(&neg_only));
//! ```

pub mod bigrams;
pub mod charts;
pub mod copurchase;
pub mod entry;
pub mod error;
pub mod report;
pub mod stopwords;
pub mod summary;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{info, warn};

pub use bigrams::{Bigram, BigramConfig, BigramSet, compare_bigram_sets, extract_top_bigrams};
pub use copurchase::ProductGraph;
pub use entry::{ReviewEntry, load_entries, parse_entries};
pub use error::{AnalysisError, Result};
pub use report::{ExportFormat, Table, csv_safe_cell};
pub use summary::Summary;

/// Product analysed individually when none is given.
pub const DEFAULT_PRODUCT: &str = "B0009B0IX4";

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub bigrams: BigramConfig,
    /// Product whose yearly reviews and co-purchases are reported.
    pub product_id: String,
    pub top_products: usize,
    pub related_products: usize,
    /// Reviews scoring at least this are positive.
    pub positive_threshold: f64,
    pub export_format: ExportFormat,
    /// Target directory for file exports and charts.
    pub out_dir: PathBuf,
    /// Also draw PNG charts of the distribution tables.
    pub charts: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            bigrams: BigramConfig::default(),
            product_id: DEFAULT_PRODUCT.to_string(),
            top_products: 20,
            related_products: 10,
            positive_threshold: 3.0,
            export_format: ExportFormat::Txt,
            out_dir: PathBuf::from("."),
            charts: false,
        }
    }
}

/// Tables derived from one dataset.
///
/// The related-products table is kept apart: it fails when the analysed product
/// has no co-purchase data, which must not suppress the remaining tables.
#[derive(Debug)]
pub struct Analysis {
    pub tables: Vec<Table>,
    pub related: Result<Table>,
}

/// Outcome of [`analyze_file`]. `related_error` carries the co-purchase lookup failure,
/// if any, after every other table has been emitted.
#[derive(Debug)]
pub struct AnalysisReport {
    /// Rendered tables (txt/LaTeX) or a listing of written files, followed by the charts.
    pub result: String,
    pub written: Vec<PathBuf>,
    pub related_error: Option<AnalysisError>,
}

/// Runs every analysis over in-memory entries.
pub fn analyze_entries(
    entries: &[ReviewEntry],
    stopwords: &HashSet<String>,
    options: &AnalysisOptions,
) -> Result<Analysis> {
    let summary = Summary::from_entries(entries, &options.product_id, options.positive_threshold)?;
    info!(
        "{} reviews: {} positive, {} negative",
        summary.total_reviews, summary.positive_count, summary.negative_count
    );
    if summary.analysed_product_by_year.is_empty() {
        warn!("product {} does not occur in the dataset", options.product_id);
    }

    let mut tables = vec![
        report::summary_table(&summary),
        report::popular_products_table(&summary, options.top_products),
        report::year_table(
            "reviews_by_year",
            "Number of reviews in the following years",
            &summary.ratings_by_year,
        ),
        report::year_table(
            "product_reviews_by_year",
            format!(
                "Number of reviews for {} in the following years",
                options.product_id
            ),
            &summary.analysed_product_by_year,
        ),
        report::score_table(&summary),
        report::review_types_table(&summary),
    ];

    let (positive, negative) = compare_bigram_sets(
        &summary.positive_texts,
        &summary.negative_texts,
        stopwords,
        &options.bigrams,
    );
    info!(
        "{} positive and {} negative exclusive bigrams",
        positive.len(),
        negative.len()
    );
    tables.push(report::bigram_table(
        "positive_bigrams",
        "Positive bigrams",
        &positive,
    ));
    tables.push(report::bigram_table(
        "negative_bigrams",
        "Negative bigrams",
        &negative,
    ));

    let graph = ProductGraph::build(entries)?;
    info!("co-purchase graph links {} products", graph.len());
    let related = graph
        .top_related(&options.product_id, options.related_products)
        .map(|related| report::related_products_table(&summary, &related));

    Ok(Analysis { tables, related })
}

/// File stem used for exports: `Cell_Phones.txt.gz` becomes `Cell_Phones`.
pub fn dataset_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "reviews".to_string());
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

fn listing(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("Wrote {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Loads a dump and emits all report tables in `options.export_format`.
pub fn analyze_file(
    path: &Path,
    stopwords: &HashSet<String>,
    options: &AnalysisOptions,
) -> Result<AnalysisReport> {
    let entries = load_entries(path)?;
    let Analysis { mut tables, related } = analyze_entries(&entries, stopwords, options)?;

    let related_error = match related {
        Ok(table) => {
            tables.push(table);
            None
        }
        Err(e) => Some(e),
    };

    let format = options.export_format;
    let stem = dataset_stem(path);
    let (mut result, mut written) = if format.writes_files() {
        let written = report::export_tables(&tables, &stem, format, &options.out_dir)?;
        (listing(&written), written)
    } else {
        (report::render_tables(&tables, format), Vec::new())
    };

    if options.charts {
        let drawn = charts::write_charts(&tables, &stem, &options.out_dir)?;
        if !drawn.is_empty() {
            if !result.is_empty() {
                result.push('\n');
            }
            result.push_str(&listing(&drawn));
        }
        written.extend(drawn);
    }

    Ok(AnalysisReport {
        result,
        written,
        related_error,
    })
}
