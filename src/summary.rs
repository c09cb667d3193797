//! Dataset-wide counts and averages for the report.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::entry::{PRODUCT_TITLE, ReviewEntry};
use crate::error::{AnalysisError, Result};

/// Score values as map keys. Scores in the dump are decimals like `4.0`; tenths suffice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScoreKey(i64);

impl ScoreKey {
    pub fn from_score(score: f64) -> Self {
        ScoreKey((score * 10.0).round() as i64)
    }

    pub fn value(self) -> f64 {
        self.0 as f64 / 10.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub total_reviews: usize,
    pub unique_products: usize,
    pub unique_reviewers: usize,
    pub average_rating: f64,
    /// `None` when no review received a helpfulness vote.
    pub average_helpfulness: Option<f64>,
    pub ratings_by_product: HashMap<String, usize>,
    pub ratings_by_year: BTreeMap<i32, usize>,
    pub analysed_product: String,
    pub analysed_product_by_year: BTreeMap<i32, usize>,
    pub score_distribution: BTreeMap<ScoreKey, usize>,
    pub positive_count: usize,
    pub negative_count: usize,
    pub positive_texts: Vec<String>,
    pub negative_texts: Vec<String>,
    pub titles: HashMap<String, String>,
}

impl Summary {
    /// Single pass over `entries`. Reviews scoring at least `positive_threshold` are positive.
    pub fn from_entries(
        entries: &[ReviewEntry],
        analysed_product: &str,
        positive_threshold: f64,
    ) -> Result<Self> {
        if entries.is_empty() {
            return Err(AnalysisError::EmptyDataset);
        }
        let mut s = Summary {
            total_reviews: entries.len(),
            analysed_product: analysed_product.to_string(),
            ..Summary::default()
        };
        let mut reviewers: HashSet<&str> = HashSet::new();
        let mut total_rating = 0.0;
        let mut helpful_votes = 0u64;
        let mut total_votes = 0u64;

        for entry in entries {
            let product = entry.product_id()?;
            s.titles
                .insert(product.to_string(), entry.field(PRODUCT_TITLE)?.to_string());
            reviewers.insert(entry.user_id()?);
            *s.ratings_by_product.entry(product.to_string()).or_insert(0) += 1;

            let score = entry.score()?;
            total_rating += score;
            *s.score_distribution
                .entry(ScoreKey::from_score(score))
                .or_insert(0) += 1;
            let text = entry.analysis_text()?;
            if score >= positive_threshold {
                s.positive_count += 1;
                s.positive_texts.push(text);
            } else {
                s.negative_count += 1;
                s.negative_texts.push(text);
            }

            let (helpful, total) = entry.helpfulness()?;
            helpful_votes += helpful;
            total_votes += total;

            let year = entry.year()?;
            *s.ratings_by_year.entry(year).or_insert(0) += 1;
            if product == analysed_product {
                *s.analysed_product_by_year.entry(year).or_insert(0) += 1;
            }
        }

        s.unique_products = s.ratings_by_product.len();
        s.unique_reviewers = reviewers.len();
        s.average_rating = total_rating / entries.len() as f64;
        s.average_helpfulness =
            (total_votes > 0).then(|| helpful_votes as f64 / total_votes as f64);
        Ok(s)
    }

    /// The `n` most reviewed products, count descending, ties by product id.
    pub fn top_products(&self, n: usize) -> Vec<(&str, usize)> {
        let mut products: Vec<(&str, usize)> = self
            .ratings_by_product
            .iter()
            .map(|(id, count)| (id.as_str(), *count))
            .collect();
        products.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        products.truncate(n);
        products
    }

    /// Product title, falling back to the id for products never seen.
    pub fn title<'a>(&'a self, product: &'a str) -> &'a str {
        self.titles.get(product).map(String::as_str).unwrap_or(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::*;

    fn review(product: &str, user: &str, score: &str, votes: &str, time: &str) -> ReviewEntry {
        [
            (PRODUCT_ID, product),
            (PRODUCT_TITLE, "Title of product"),
            (USER_ID, user),
            (SCORE, score),
            (HELPFULNESS, votes),
            (TIME, time),
            (SUMMARY, "summary"),
            (TEXT, "text"),
        ]
        .into_iter()
        .collect()
    }

    fn dataset() -> Vec<ReviewEntry> {
        vec![
            // 2008-05-01
            review("P1", "u1", "5.0", "1/2", "1209600000"),
            // 2009-01-31
            review("P1", "u2", "2.0", "0/2", "1233360000"),
            review("P2", "u1", "3.0", "3/4", "1233360000"),
            review("P3", "unknown", "1.0", "0/0", "1233360000"),
        ]
    }

    #[test]
    fn counts_and_averages() {
        let s = Summary::from_entries(&dataset(), "P1", 3.0).unwrap();
        assert_eq!(s.total_reviews, 4);
        assert_eq!(s.unique_products, 3);
        assert_eq!(s.unique_reviewers, 3);
        assert!((s.average_rating - 2.75).abs() < 1e-9);
        assert!((s.average_helpfulness.unwrap() - 0.5).abs() < 1e-9);
        assert_eq!(s.positive_count, 2);
        assert_eq!(s.negative_count, 2);
        assert_eq!(s.positive_texts[0], "summary text");
    }

    #[test]
    fn distributions() {
        let s = Summary::from_entries(&dataset(), "P1", 3.0).unwrap();
        assert_eq!(s.ratings_by_year.get(&2008), Some(&1));
        assert_eq!(s.ratings_by_year.get(&2009), Some(&3));
        assert_eq!(s.analysed_product_by_year.get(&2008), Some(&1));
        assert_eq!(s.analysed_product_by_year.get(&2009), Some(&1));
        assert_eq!(s.score_distribution.get(&ScoreKey::from_score(5.0)), Some(&1));
        assert_eq!(s.score_distribution.len(), 4);
        assert_eq!(s.top_products(2), vec![("P1", 2), ("P2", 1)]);
    }

    #[test]
    fn no_votes_gives_no_helpfulness() {
        let entries = vec![review("P1", "u1", "4.0", "0/0", "1233360000")];
        let s = Summary::from_entries(&entries, "P1", 3.0).unwrap();
        assert_eq!(s.average_helpfulness, None);
    }

    #[test]
    fn empty_dataset_is_an_error() {
        assert!(matches!(
            Summary::from_entries(&[], "P1", 3.0),
            Err(AnalysisError::EmptyDataset)
        ));
    }

    #[test]
    fn title_falls_back_to_id() {
        let s = Summary::from_entries(&dataset(), "P1", 3.0).unwrap();
        assert_eq!(s.title("P1"), "Title of product");
        assert_eq!(s.title("nope"), "nope");
    }
}
