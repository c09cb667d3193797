//! Reader for the colon-delimited review dump.
//!
//! Each record is a block of `key: value` lines; a line without a colon (usually a
//! blank one) ends the block.
//!
//! ```text
//! product/productId: B000JVER7W
//! product/title: Mobile Action MA730 Handset Manager
//! review/userId: A1RXYH9ROBAKEZ
//! review/score: 1.0
//!
//! product/productId: ...
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use chrono::{DateTime, Datelike};
use flate2::read::GzDecoder;
use log::{debug, info};

use crate::error::{AnalysisError, Result};

pub const PRODUCT_ID: &str = "product/productId";
pub const PRODUCT_TITLE: &str = "product/title";
pub const USER_ID: &str = "review/userId";
pub const SCORE: &str = "review/score";
pub const HELPFULNESS: &str = "review/helpfulness";
pub const TIME: &str = "review/time";
pub const SUMMARY: &str = "review/summary";
pub const TEXT: &str = "review/text";

/// User id the dump uses for anonymous or invalid reviewers.
pub const UNKNOWN_USER: &str = "unknown";

/// One review record: field name to raw string value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewEntry {
    fields: HashMap<String, String>,
}

impl ReviewEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of a required field.
    pub fn field(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| AnalysisError::MissingField {
            field: key.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn product_id(&self) -> Result<&str> {
        self.field(PRODUCT_ID)
    }

    pub fn user_id(&self) -> Result<&str> {
        self.field(USER_ID)
    }

    /// Summary and body joined by a space.
    pub fn analysis_text(&self) -> Result<String> {
        Ok(format!("{} {}", self.field(SUMMARY)?, self.field(TEXT)?))
    }

    pub fn score(&self) -> Result<f64> {
        let raw = self.field(SCORE)?;
        raw.trim().parse().map_err(|_| invalid(SCORE, raw))
    }

    /// Helpful votes and total votes from a `"a/b"` value.
    pub fn helpfulness(&self) -> Result<(u64, u64)> {
        let raw = self.field(HELPFULNESS)?;
        let (helpful, total) = raw.split_once('/').ok_or_else(|| invalid(HELPFULNESS, raw))?;
        let helpful = helpful.trim().parse().map_err(|_| invalid(HELPFULNESS, raw))?;
        let total = total.trim().parse().map_err(|_| invalid(HELPFULNESS, raw))?;
        Ok((helpful, total))
    }

    /// UTC year of the review timestamp.
    pub fn year(&self) -> Result<i32> {
        let raw = self.field(TIME)?;
        let secs: i64 = raw.trim().parse().map_err(|_| invalid(TIME, raw))?;
        DateTime::from_timestamp(secs, 0)
            .map(|dt| dt.year())
            .ok_or_else(|| invalid(TIME, raw))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ReviewEntry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entry = ReviewEntry::new();
        for (k, v) in iter {
            entry.insert(k, v);
        }
        entry
    }
}

fn invalid(field: &str, value: &str) -> AnalysisError {
    AnalysisError::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Parses records from `reader`. Records without any field are dropped.
///
/// The value starts two characters after the colon, skipping the separator space.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn parse_entries<R: BufRead>(mut reader: R) -> Result<Vec<ReviewEntry>> {
    let mut entries = Vec::new();
    let mut current = ReviewEntry::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        match line.find(':') {
            Some(pos) => {
                let mut rest = line[pos + 1..].chars();
                rest.next();
                current.insert(&line[..pos], rest.as_str());
            }
            None => {
                if !current.is_empty() {
                    entries.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        entries.push(current);
    }
    Ok(entries)
}

/// Opens a plain or gzip-compressed (`.gz`) dump.
pub fn open_dataset(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let gz = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);
    let inner: Box<dyn Read> = if gz {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(inner)))
}

/// Reads all entries of a dump and drops those without a product title.
pub fn load_entries(path: &Path) -> Result<Vec<ReviewEntry>> {
    let parsed = parse_entries(open_dataset(path)?)?;
    let total = parsed.len();
    let entries: Vec<ReviewEntry> = parsed
        .into_iter()
        .filter(|e| {
            let keep = e.get(PRODUCT_TITLE).is_some_and(|t| !t.is_empty());
            if !keep {
                debug!("dropping entry without product title: {:?}", e.get(PRODUCT_ID));
            }
            keep
        })
        .collect();
    info!(
        "loaded {} entries from {} ({} without title dropped)",
        entries.len(),
        path.display(),
        total - entries.len()
    );
    Ok(entries)
}
