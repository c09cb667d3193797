//! Co-purchase graph: products reviewed by the same user are linked, and the edge
//! weight counts how many distinct users reviewed both.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::entry::{ReviewEntry, UNKNOWN_USER};
use crate::error::{AnalysisError, Result};

/// Undirected weighted adjacency map. Only products with at least one edge are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductGraph {
    adjacency: HashMap<String, HashMap<String, u32>>,
}

/// Product ids reviewed by each known user, in review order.
pub fn purchase_histories(entries: &[ReviewEntry]) -> Result<HashMap<String, Vec<String>>> {
    let mut histories: HashMap<String, Vec<String>> = HashMap::new();
    for entry in entries {
        let product = entry.product_id()?;
        let user = entry.user_id()?;
        if user == UNKNOWN_USER {
            continue;
        }
        histories
            .entry(user.to_string())
            .or_default()
            .push(product.to_string());
    }
    Ok(histories)
}

impl ProductGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from review entries.
    ///
    /// Reviews by the `unknown` user are ignored. A user's repeated reviews of one
    /// product count once, so users need two distinct products to add an edge.
    pub fn build(entries: &[ReviewEntry]) -> Result<Self> {
        let histories = purchase_histories(entries)?;
        let mut graph = ProductGraph::new();
        let mut contributing = 0usize;

        for products in histories.values() {
            if products.len() < 2 {
                continue;
            }
            let mut seen = HashSet::new();
            let distinct: Vec<&str> = products
                .iter()
                .map(String::as_str)
                .filter(|p| seen.insert(*p))
                .collect();
            if distinct.len() < 2 {
                continue;
            }
            contributing += 1;
            for (i, p1) in distinct.iter().enumerate() {
                for p2 in &distinct[i + 1..] {
                    graph.add_edge(p1, p2);
                }
            }
        }
        debug!(
            "{} users, {} with co-purchases, {} linked products",
            histories.len(),
            contributing,
            graph.len()
        );
        Ok(graph)
    }

    /// Increments the weight between two distinct products in both directions.
    /// Self-loops are ignored.
    pub fn add_edge(&mut self, p1: &str, p2: &str) {
        if p1 == p2 {
            return;
        }
        *self
            .adjacency
            .entry(p1.to_string())
            .or_default()
            .entry(p2.to_string())
            .or_insert(0) += 1;
        *self
            .adjacency
            .entry(p2.to_string())
            .or_default()
            .entry(p1.to_string())
            .or_insert(0) += 1;
    }

    /// Edge weight, 0 when the products are not linked.
    pub fn weight(&self, p1: &str, p2: &str) -> u32 {
        self.adjacency
            .get(p1)
            .and_then(|n| n.get(p2))
            .copied()
            .unwrap_or(0)
    }

    pub fn contains(&self, product: &str) -> bool {
        self.adjacency.contains_key(product)
    }

    /// Linked product ids, sorted.
    pub fn products(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.adjacency.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Up to `n` neighbors of `product`, weight descending, ties by product id.
    pub fn top_related(&self, product: &str, n: usize) -> Result<Vec<(String, u32)>> {
        let neighbors = self
            .adjacency
            .get(product)
            .ok_or_else(|| AnalysisError::UnknownProduct(product.to_string()))?;
        let mut related: Vec<(String, u32)> = neighbors
            .iter()
            .map(|(id, w)| (id.clone(), *w))
            .collect();
        related.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        related.truncate(n);
        Ok(related)
    }
}
