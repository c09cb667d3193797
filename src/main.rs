#![forbid(unsafe_code)]
//! # Review Insights CLI
//!
//! Command-line interface for the `review_insights` crate. Reads a review dump
//! (plain or `.gz`) and prints or exports the report tables.
//!
//! ## Features
//! - Summary statistics, popularity and yearly/score distributions.
//! - Bigrams exclusive to positive or negative reviews.
//! - Products most often reviewed together with a chosen product.
//! - Output as text or LaTeX on stdout, or CSV/TSV/JSON files.
//! - Optional PNG bar and pie charts of the distributions (`--charts`).
//!
//! ## Example
//! ```bash
//! cargo run --release -- Cell_Phones_&_Accessories.txt.gz --product B0009B0IX4 --export-format csv
//! ```
//!
//! See `--help` for all available options.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::error;
use review_insights::{
    AnalysisOptions, BigramConfig, DEFAULT_PRODUCT, ExportFormat, analyze_file, stopwords,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Review dump to analyze (.txt or .txt.gz)
    path: String,

    /// Optional path to additional stopword file (.txt, one word per line)
    #[arg(long)]
    stopwords: Option<String>,

    /// Product analysed individually (yearly reviews, co-purchases)
    #[arg(long, default_value = DEFAULT_PRODUCT)]
    product: String,

    /// Token window for bigram collocations
    #[arg(long, default_value_t = 6)]
    window: usize,

    /// Minimum occurrences of a bigram before it is scored
    #[arg(long, default_value_t = 6)]
    min_freq: u32,

    /// Number of best bigrams kept per polarity
    #[arg(long, default_value_t = 40)]
    top_bigrams: usize,

    /// Number of most reviewed products listed
    #[arg(long, default_value_t = 20)]
    top_products: usize,

    /// Number of related products listed
    #[arg(long, default_value_t = 10)]
    related: usize,

    /// Reviews scoring at least this are positive
    #[arg(long, default_value_t = 3.0)]
    positive_threshold: f64,

    /// Output format (txt, latex, csv, tsv, json)
    #[arg(long, default_value = "txt")]
    export_format: ExportFormat,

    /// Directory for csv/tsv/json exports and charts
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also draw PNG charts of the rating distributions
    #[arg(long)]
    charts: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut stop = stopwords::english();
    if let Some(extra) = &cli.stopwords {
        if let Err(e) = stopwords::extend_from_file(&mut stop, Path::new(extra)) {
            error!("Error reading stopwords {}: {}", extra, e);
            process::exit(1);
        }
    }

    let options = AnalysisOptions {
        bigrams: BigramConfig {
            window_size: cli.window,
            min_freq: cli.min_freq,
            top_n: cli.top_bigrams,
        },
        product_id: cli.product,
        top_products: cli.top_products,
        related_products: cli.related,
        positive_threshold: cli.positive_threshold,
        export_format: cli.export_format,
        out_dir: cli.out_dir,
        charts: cli.charts,
    };

    match analyze_file(Path::new(&cli.path), &stop, &options) {
        Ok(report) => {
            println!("{}", report.result);
            if let Some(e) = report.related_error {
                error!("Error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Error analyzing {}: {}", cli.path, e);
            eprintln!("Error analyzing {}: {}", cli.path, e);
            process::exit(1);
        }
    }
}
