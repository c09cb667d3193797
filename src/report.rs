//! Report tables and their renderings (plain text, LaTeX, CSV, TSV, JSON).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use csv::WriterBuilder;
use log::info;
use serde::Serialize;

use crate::bigrams::BigramSet;
use crate::error::Result;
use crate::summary::Summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
    Latex,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
            ExportFormat::Latex => "tex",
        }
    }

    /// Txt and LaTeX go to stdout, the others are written to files.
    pub fn writes_files(self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Tsv | ExportFormat::Json)
    }
}

/// A titled table of string cells. `name` is the file-name suffix used on export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(name: &str, title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.rows.push(cells.into_iter().map(|c| c.to_string()).collect());
    }
}

// ------------------------- table builders -------------------------

pub fn summary_table(s: &Summary) -> Table {
    let mut t = Table::new("summary", "Summary", &["Metric", "Value"]);
    t.push_row(["Total number of reviews".to_string(), s.total_reviews.to_string()]);
    t.push_row(["Unique products".to_string(), s.unique_products.to_string()]);
    t.push_row(["Unique reviewers".to_string(), s.unique_reviewers.to_string()]);
    t.push_row(["Average rating".to_string(), format!("{:.2}", s.average_rating)]);
    let helpfulness = s
        .average_helpfulness
        .map(|h| format!("{h:.2}"))
        .unwrap_or_else(|| "n/a".to_string());
    t.push_row(["Average helpfulness".to_string(), helpfulness]);
    t
}

pub fn popular_products_table(s: &Summary, n: usize) -> Table {
    let top = s.top_products(n);
    let mut t = Table::new(
        "popular_products",
        format!("Number of ratings for {} most popular products", top.len()),
        &["Number of ratings", "ProductId", "Product"],
    );
    for (id, count) in top {
        t.push_row([count.to_string(), id.to_string(), s.title(id).to_string()]);
    }
    t
}

pub fn year_table(name: &str, title: impl Into<String>, by_year: &BTreeMap<i32, usize>) -> Table {
    let mut t = Table::new(name, title, &["Year", "Number of ratings"]);
    for (year, count) in by_year {
        t.push_row([year.to_string(), count.to_string()]);
    }
    t
}

pub fn score_table(s: &Summary) -> Table {
    let mut t = Table::new(
        "score_distribution",
        "Score reviews distribution",
        &["Score", "Number of ratings"],
    );
    for (score, count) in &s.score_distribution {
        t.push_row([format!("{:.1}", score.value()), count.to_string()]);
    }
    t
}

pub fn review_types_table(s: &Summary) -> Table {
    let mut t = Table::new(
        "review_types",
        "Review distribution by type",
        &["Type", "Number of ratings"],
    );
    t.push_row(["Positive".to_string(), s.positive_count.to_string()]);
    t.push_row(["Negative".to_string(), s.negative_count.to_string()]);
    t
}

pub fn bigram_table(name: &str, header: &str, bigrams: &BigramSet) -> Table {
    let mut t = Table::new(name, header, &[header]);
    for b in bigrams {
        t.push_row([b.to_string()]);
    }
    t
}

pub fn related_products_table(s: &Summary, related: &[(String, u32)]) -> Table {
    let mut t = Table::new(
        "related_products",
        format!("Products bought together with {}", s.analysed_product),
        &["Product title", "Number of purchases"],
    );
    for (id, purchases) in related {
        t.push_row([s.title(id).to_string(), purchases.to_string()]);
    }
    t
}

// ------------------------- rendering -------------------------

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}

fn numeric_column(table: &Table, col: usize) -> bool {
    !table.rows.is_empty()
        && table
            .rows
            .iter()
            .all(|r| r.get(col).is_some_and(|c| is_numeric(c)))
}

/// Plain-text rendering with padded columns; numeric columns are right-aligned.
pub fn render_txt(table: &Table) -> String {
    let cols = table.headers.len();
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let numeric: Vec<bool> = (0..cols).map(|c| numeric_column(table, c)).collect();

    let line = |cells: &[String]| -> String {
        let mut out = String::new();
        for (i, cell) in cells.iter().enumerate().take(cols) {
            if i > 0 {
                out.push_str("  ");
            }
            let pad = widths[i] - cell.chars().count();
            if numeric[i] {
                out.push_str(&" ".repeat(pad));
                out.push_str(cell);
            } else {
                out.push_str(cell);
                out.push_str(&" ".repeat(pad));
            }
        }
        out.trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&table.title);
    out.push('\n');
    out.push_str(&line(&table.headers));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

pub fn latex_escape(cell: &str) -> String {
    let mut out = String::with_capacity(cell.len());
    for c in cell.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

/// LaTeX `tabular` rendering; numeric columns are right-aligned.
pub fn render_latex(table: &Table) -> String {
    let cols = table.headers.len();
    let spec: String = (0..cols)
        .map(|c| if numeric_column(table, c) { 'r' } else { 'l' })
        .collect();
    let row = |cells: &[String]| -> String {
        let escaped: Vec<String> = cells.iter().take(cols).map(|c| latex_escape(c)).collect();
        format!(" {} \\\\\n", escaped.join(" & "))
    };

    let mut out = format!("% {}\n\\begin{{tabular}}{{{spec}}}\n\\hline\n", table.title);
    out.push_str(&row(&table.headers));
    out.push_str("\\hline\n");
    for r in &table.rows {
        out.push_str(&row(r));
    }
    out.push_str("\\hline\n\\end{tabular}\n");
    out
}

/// Neutralizes spreadsheet formula injection by prefixing a single quote to cells
/// starting with `=`, `+`, `-`, `@`, tab or carriage return.
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonCell<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl<'a> JsonCell<'a> {
    fn from_cell(cell: &'a str) -> Self {
        if let Ok(i) = cell.parse::<i64>() {
            JsonCell::Int(i)
        } else if let Some(f) = cell.parse::<f64>().ok().filter(|f| f.is_finite()) {
            JsonCell::Float(f)
        } else {
            JsonCell::Text(cell)
        }
    }
}

fn write_delimited(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|c| csv_safe_cell(c.clone())))?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json(table: &Table, path: &Path) -> Result<()> {
    let records: Vec<BTreeMap<&str, JsonCell<'_>>> = table
        .rows
        .iter()
        .map(|row| {
            table
                .headers
                .iter()
                .zip(row)
                .map(|(h, c)| (h.as_str(), JsonCell::from_cell(c)))
                .collect()
        })
        .collect();
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, &records)?;
    w.flush()?;
    Ok(())
}

/// Local time stamp embedded in exported file names.
pub fn export_stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Writes one file per table into `dir`, named `<stem>_<YYYYMMDD_HHMMSS>_<table>.<ext>`.
pub fn export_tables(
    tables: &[Table],
    stem: &str,
    format: ExportFormat,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let stamp = export_stamp();
    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = dir.join(format!(
            "{stem}_{stamp}_{}.{}",
            table.name,
            format.extension()
        ));
        match format {
            ExportFormat::Csv => write_delimited(table, &path, b',')?,
            ExportFormat::Tsv => write_delimited(table, &path, b'\t')?,
            ExportFormat::Json => write_json(table, &path)?,
            ExportFormat::Txt => std::fs::write(&path, render_txt(table))?,
            ExportFormat::Latex => std::fs::write(&path, render_latex(table))?,
        }
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Renders tables for stdout in a text format (`Txt` or `Latex`).
pub fn render_tables(tables: &[Table], format: ExportFormat) -> String {
    tables
        .iter()
        .map(|t| match format {
            ExportFormat::Latex => render_latex(t),
            _ => render_txt(t),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigrams::Bigram;

    fn sample() -> Table {
        let mut t = Table::new("years", "Reviews per year", &["Year", "Number of ratings"]);
        t.push_row(["2008", "7"]);
        t.push_row(["2009", "12"]);
        t
    }

    #[test]
    fn txt_aligns_numeric_columns_right() {
        let out = render_txt(&sample());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Reviews per year");
        assert_eq!(lines[1], "Year  Number of ratings");
        assert_eq!(lines[2], format!("{}  {}", "-".repeat(4), "-".repeat(17)));
        assert_eq!(lines[3], format!("2008{}7", " ".repeat(18)));
        assert_eq!(lines[4], format!("2009{}12", " ".repeat(17)));
    }

    #[test]
    fn latex_has_tabular_and_escapes() {
        let mut t = Table::new("p", "Products", &["Product", "n"]);
        t.push_row(["Cell_Phones & 50% off", "3"]);
        let out = render_latex(&t);
        assert!(out.contains("\\begin{tabular}{lr}"));
        assert!(out.contains(" Cell\\_Phones \\& 50\\% off & 3 \\\\"));
        assert!(out.trim_end().ends_with("\\end{tabular}"));
    }

    #[test]
    fn csv_safe_cell_prefixes_formulas_once() {
        assert_eq!(csv_safe_cell("=SUM(A1)".into()), "'=SUM(A1)");
        assert_eq!(csv_safe_cell("@cmd".into()), "'@cmd");
        assert_eq!(csv_safe_cell("'@SAFE".into()), "'@SAFE");
        assert_eq!(csv_safe_cell("plain".into()), "plain");
    }

    #[test]
    fn bigram_table_lists_pairs_as_phrases() {
        let set: BigramSet = [Bigram::new("waste", "money"), Bigram::new("battery", "died")]
            .into_iter()
            .collect();
        let t = bigram_table("negative_bigrams", "Negative bigrams", &set);
        assert_eq!(t.headers, vec!["Negative bigrams".to_string()]);
        assert_eq!(
            t.rows,
            vec![vec!["battery died".to_string()], vec!["waste money".to_string()]]
        );
    }

    #[test]
    fn export_writes_one_file_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let tables = vec![sample()];
        let written = export_tables(&tables, "data", ExportFormat::Json, dir.path()).unwrap();
        assert_eq!(written.len(), 1);
        let name = written[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("data_") && name.ends_with("_years.json"), "{name}");

        let v: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(v[1]["Year"], 2009);
        assert_eq!(v[1]["Number of ratings"], 12);

        let written = export_tables(&tables, "data", ExportFormat::Tsv, dir.path()).unwrap();
        let content = std::fs::read_to_string(&written[0]).unwrap();
        assert!(content.starts_with("Year\tNumber of ratings\n2008\t7\n"));
    }
}
