//! Collocation extraction over review texts.
//!
//! Texts are normalized into one long word sequence, word pairs are counted inside a
//! sliding window and ranked by Dunning's log-likelihood ratio. Comparing the top pairs
//! of positive and negative reviews yields the phrases characteristic of each polarity.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use log::{debug, warn};

/// Keeps `0 * ln(0)` terms and empty expected cells finite.
const SMALL: f64 = 1e-20;

/// Tunables for [`extract_top_bigrams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigramConfig {
    /// Number of tokens in the sliding window; a word pairs with the next `window_size - 1` words.
    pub window_size: usize,
    /// Pairs seen fewer times than this are not scored.
    pub min_freq: u32,
    /// Number of best-scoring pairs kept before self-pairs are removed.
    pub top_n: usize,
}

impl Default for BigramConfig {
    fn default() -> Self {
        Self {
            window_size: 6,
            min_freq: 6,
            top_n: 40,
        }
    }
}

/// Ordered word pair. Equality and ordering are pairwise on (`first`, `second`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bigram {
    pub first: String,
    pub second: String,
}

impl Bigram {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for Bigram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.second)
    }
}

pub type BigramSet = BTreeSet<Bigram>;

/// Strips ASCII punctuation, lowercases and splits on whitespace. Any other character that
/// is neither alphanumeric nor whitespace (curly quotes, ellipsis, dashes) separates words.
/// Tokens that are not purely alphabetic and stop words are dropped.
///
/// # Example
/// ```
/// use std::collections::HashSet;
/// use review_insights::bigrams::trim_to_words;
/// let stop: HashSet<String> = ["the".to_string()].into_iter().collect();
/// let words = trim_to_words("The screen's GREAT, 10/10!", &stop);
/// assert_eq!(words, vec!["screens".to_string(), "great".to_string()]);
/// ```
pub fn trim_to_words(text: &str, stopwords: &HashSet<String>) -> Vec<String> {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().all(char::is_alphabetic))
        .filter(|w| !stopwords.contains(*w))
        .map(String::from)
        .collect()
}

/// Unigram and windowed pair frequencies of one word sequence.
struct Collocations<'a> {
    words: HashMap<&'a str, u32>,
    pairs: HashMap<(&'a str, &'a str), u32>,
    total: usize,
}

fn count_collocations(words: &[String], window_size: usize) -> Collocations<'_> {
    let mut unigrams: HashMap<&str, u32> = HashMap::new();
    let mut pairs: HashMap<(&str, &str), u32> = HashMap::new();
    for (i, w1) in words.iter().enumerate() {
        *unigrams.entry(w1.as_str()).or_insert(0) += 1;
        let end = i.saturating_add(window_size).min(words.len());
        for w2 in &words[i + 1..end] {
            *pairs.entry((w1.as_str(), w2.as_str())).or_insert(0) += 1;
        }
    }
    Collocations {
        words: unigrams,
        pairs,
        total: words.len(),
    }
}

/// Dunning's log-likelihood ratio for a 2x2 contingency table.
///
/// `n_ii` is the joint count, `n_ix`/`n_xi` the marginal counts of the first/second word
/// and `n_xx` the corpus size.
pub fn likelihood_ratio(n_ii: f64, n_ix: f64, n_xi: f64, n_xx: f64) -> f64 {
    let n_oi = n_xi - n_ii;
    let n_io = n_ix - n_ii;
    let n_oo = n_xx - n_ii - n_oi - n_io;
    let cont = [n_ii, n_oi, n_io, n_oo];

    let mut sum = 0.0;
    for i in 0..4 {
        let observed = cont[i];
        if observed <= 0.0 {
            continue;
        }
        let expected = (cont[i] + cont[i ^ 1]) * (cont[i] + cont[i ^ 2]) / n_xx;
        sum += observed * (observed / (expected + SMALL) + SMALL).ln();
    }
    2.0 * sum
}

/// Scores every pair of `words` that passes the frequency floor and returns the best
/// `config.top_n`, score descending, ties by pair ascending. Self-pairs are still included.
pub fn rank_bigrams(words: &[String], config: &BigramConfig) -> Vec<(Bigram, f64)> {
    if config.window_size < 2 {
        warn!(
            "window size {} cannot hold a pair, no bigrams extracted",
            config.window_size
        );
        return Vec::new();
    }
    let counts = count_collocations(words, config.window_size);
    let n_xx = counts.total as f64;
    // pairs are counted at every offset inside the window
    let spread = (config.window_size - 1) as f64;

    let mut scored: Vec<((&str, &str), f64)> = counts
        .pairs
        .iter()
        .filter(|(_, freq)| **freq >= config.min_freq)
        .map(|(&(w1, w2), &freq)| {
            let n_ii = f64::from(freq) / spread;
            let n_ix = f64::from(counts.words[w1]);
            let n_xi = f64::from(counts.words[w2]);
            ((w1, w2), likelihood_ratio(n_ii, n_ix, n_xi, n_xx))
        })
        .collect();
    debug!(
        "{} of {} word pairs pass frequency floor {}",
        scored.len(),
        counts.pairs.len(),
        config.min_freq
    );

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(config.top_n);
    scored
        .into_iter()
        .map(|((w1, w2), score)| (Bigram::new(w1, w2), score))
        .collect()
}

/// Most significant word pairs across all `texts`, without self-pairs.
///
/// Tokens of consecutive texts are concatenated, so a pair may straddle two texts.
pub fn extract_top_bigrams<S: AsRef<str>>(
    texts: &[S],
    stopwords: &HashSet<String>,
    config: &BigramConfig,
) -> BigramSet {
    let words: Vec<String> = texts
        .iter()
        .flat_map(|t| trim_to_words(t.as_ref(), stopwords))
        .collect();
    rank_bigrams(&words, config)
        .into_iter()
        .map(|(bigram, _)| bigram)
        .filter(|bigram| !bigram.is_self_pair())
        .collect()
}

/// Bigrams exclusive to the positive and to the negative texts.
///
/// Pairs that make the top list on both sides are removed from both.
pub fn compare_bigram_sets<S: AsRef<str> + Sync>(
    positive: &[S],
    negative: &[S],
    stopwords: &HashSet<String>,
    config: &BigramConfig,
) -> (BigramSet, BigramSet) {
    let (pos, neg) = rayon::join(
        || extract_top_bigrams(positive, stopwords, config),
        || extract_top_bigrams(negative, stopwords, config),
    );
    let shared: BigramSet = pos.intersection(&neg).cloned().collect();
    debug!(
        "{} positive, {} negative, {} shared bigrams",
        pos.len(),
        neg.len(),
        shared.len()
    );
    (
        pos.difference(&shared).cloned().collect(),
        neg.difference(&shared).cloned().collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stopwords;

    fn no_stop() -> HashSet<String> {
        HashSet::new()
    }

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    // distinct alphabetic token for index k
    fn token(k: usize) -> String {
        let a = (b'a' + (k % 26) as u8) as char;
        let b = (b'a' + (k / 26 % 26) as u8) as char;
        format!("q{b}{a}")
    }

    #[test]
    fn trim_drops_punctuation_digits_and_stopwords() {
        let stop = stopwords::english();
        let out = trim_to_words("Don't buy it!!! Battery died in 2 days... café-style", &stop);
        assert_eq!(out, words("buy battery died days caféstyle"));
    }

    #[test]
    fn unicode_punctuation_separates_words() {
        let out = trim_to_words("\u{201c}Great\u{201d} battery\u{2026} life", &no_stop());
        assert_eq!(out, words("great battery life"));
        let out = trim_to_words("screen\u{2019}s fine\u{2014}really", &no_stop());
        assert_eq!(out, words("screen s fine really"));
    }

    #[test]
    fn window_limits_pair_distance() {
        let seq = words("a b c d e");
        let counts = count_collocations(&seq, 3);
        assert_eq!(counts.pairs.get(&("a", "b")), Some(&1));
        assert_eq!(counts.pairs.get(&("a", "c")), Some(&1));
        assert_eq!(counts.pairs.get(&("a", "d")), None);
        assert_eq!(counts.pairs.get(&("b", "a")), None);
        assert_eq!(counts.total, 5);
    }

    #[test]
    fn huge_window_covers_the_whole_sequence() {
        let seq = words("a b c");
        let counts = count_collocations(&seq, usize::MAX);
        assert_eq!(counts.pairs.len(), 3);
        assert_eq!(counts.pairs.get(&("a", "c")), Some(&1));
        let wide = BigramConfig {
            window_size: usize::MAX,
            min_freq: 1,
            top_n: 10,
        };
        assert_eq!(rank_bigrams(&seq, &wide).len(), 3);
    }

    #[test]
    fn likelihood_ratio_rewards_association() {
        // independent: joint count equals expectation
        let independent = likelihood_ratio(10.0, 100.0, 100.0, 1000.0);
        let associated = likelihood_ratio(90.0, 100.0, 100.0, 1000.0);
        assert!(independent.abs() < 1e-9, "got {independent}");
        assert!(associated > 100.0, "got {associated}");
    }

    #[test]
    fn likelihood_ratio_known_values() {
        let strong = likelihood_ratio(90.0, 100.0, 100.0, 1000.0);
        assert!((strong - 475.264_683_633_338_56).abs() < 1e-9, "got {strong}");
        // swapping the marginals leaves the score unchanged
        let a = likelihood_ratio(5.0, 20.0, 10.0, 200.0);
        let b = likelihood_ratio(5.0, 10.0, 20.0, 200.0);
        assert!((a - 11.217_695_230_691_875).abs() < 1e-9, "got {a}");
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn ranked_scores_divide_joint_counts_by_window_span() {
        // x:3 y:3 z:1 over 7 tokens; within window 3, (x, y) occurs 3 times and (y, x) twice
        let config = BigramConfig {
            window_size: 3,
            min_freq: 2,
            top_n: 10,
        };
        let ranked = rank_bigrams(&words("x y x y z x y"), &config);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, Bigram::new("y", "x"));
        assert!((ranked[0].1 - 0.196_451_011_558_163_9).abs() < 1e-12, "got {}", ranked[0].1);
        assert_eq!(ranked[1].0, Bigram::new("x", "y"));
        assert!((ranked[1].1 - 0.109_324_477_183_074_42).abs() < 1e-12, "got {}", ranked[1].1);
        assert_eq!(ranked[0].1, likelihood_ratio(1.0, 3.0, 3.0, 7.0));
        assert_eq!(ranked[1].1, likelihood_ratio(1.5, 3.0, 3.0, 7.0));
    }

    #[test]
    fn frequency_floor_filters_rare_pairs() {
        let text = vec!["alpha beta gamma delta"; 5];
        let adjacent = BigramConfig {
            window_size: 2,
            ..BigramConfig::default()
        };
        let out = extract_top_bigrams(&text, &no_stop(), &adjacent);
        // every adjacent pair occurs at most 5 times
        assert!(out.is_empty());
        let loose = BigramConfig {
            min_freq: 5,
            ..adjacent
        };
        let out = extract_top_bigrams(&text, &no_stop(), &loose);
        assert!(out.contains(&Bigram::new("alpha", "beta")));
    }

    #[test]
    fn empty_input_yields_empty_set() {
        let texts: Vec<String> = Vec::new();
        assert!(extract_top_bigrams(&texts, &no_stop(), &BigramConfig::default()).is_empty());
        let degenerate = BigramConfig {
            window_size: 1,
            ..BigramConfig::default()
        };
        assert!(extract_top_bigrams(&["a b a b"; 20], &no_stop(), &degenerate).is_empty());
    }

    #[test]
    fn battery_camera_scenario() {
        let mut texts = Vec::new();
        for _ in 0..6 {
            texts.push("great battery life and great camera");
            texts.push("great camera and great battery life");
        }
        let out = extract_top_bigrams(&texts, &stopwords::english(), &BigramConfig::default());
        assert!(out.contains(&Bigram::new("great", "battery")));
        assert!(out.contains(&Bigram::new("battery", "life")));
        assert!(out.contains(&Bigram::new("great", "camera")));
        assert!(!out.iter().any(|b| b.first == "and" || b.second == "and"));
    }

    #[test]
    fn self_pairs_are_ranked_but_never_returned() {
        let texts = vec!["great great great phone"; 10];
        let ranked = rank_bigrams(
            &texts.iter().flat_map(|t| words(t)).collect::<Vec<_>>(),
            &BigramConfig::default(),
        );
        assert!(ranked.iter().any(|(b, _)| b.is_self_pair()));
        let out = extract_top_bigrams(&texts, &no_stop(), &BigramConfig::default());
        assert!(!out.is_empty());
        assert!(out.iter().all(|b| !b.is_self_pair()));
    }

    #[test]
    fn output_is_bounded_by_top_n() {
        let text = (0..120).map(token).collect::<Vec<_>>().join(" ");
        let texts = vec![text; 10];
        let out = extract_top_bigrams(&texts, &no_stop(), &BigramConfig::default());
        assert!(!out.is_empty());
        assert!(out.len() <= 40);

        let small = BigramConfig {
            top_n: 5,
            ..BigramConfig::default()
        };
        assert!(extract_top_bigrams(&texts, &no_stop(), &small).len() <= 5);
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = (0..80).map(token).collect::<Vec<_>>().join(" ");
        let texts = vec![text; 8];
        let a = extract_top_bigrams(&texts, &no_stop(), &BigramConfig::default());
        let b = extract_top_bigrams(&texts, &no_stop(), &BigramConfig::default());
        assert_eq!(a, b);
        let ra = rank_bigrams(&words(&texts.join(" ")), &BigramConfig::default());
        let rb = rank_bigrams(&words(&texts.join(" ")), &BigramConfig::default());
        assert_eq!(ra, rb);
    }

    #[test]
    fn ties_are_broken_alphabetically() {
        let text = (0..120).map(token).collect::<Vec<_>>().join(" ");
        let seq = words(&vec![text; 10].join(" "));
        let ranked = rank_bigrams(&seq, &BigramConfig::default());
        for pair in ranked.windows(2) {
            let ((a, sa), (b, sb)) = (&pair[0], &pair[1]);
            assert!(sa >= sb);
            if sa == sb {
                assert!(a < b);
            }
        }
    }

    #[test]
    fn comparison_removes_shared_pairs() {
        let mut pos = Vec::new();
        let mut neg = Vec::new();
        for _ in 0..8 {
            pos.push("works perfectly fast shipping battery life");
            neg.push("stopped working waste money battery life");
        }
        let stop = stopwords::english();
        let config = BigramConfig::default();
        let all_pos = extract_top_bigrams(&pos, &stop, &config);
        let all_neg = extract_top_bigrams(&neg, &stop, &config);
        assert!(all_pos.contains(&Bigram::new("battery", "life")));
        assert!(all_neg.contains(&Bigram::new("battery", "life")));

        let (pos_only, neg_only) = compare_bigram_sets(&pos, &neg, &stop, &config);
        assert!(pos_only.is_disjoint(&neg_only));
        assert!(!pos_only.contains(&Bigram::new("battery", "life")));
        assert!(!neg_only.contains(&Bigram::new("battery", "life")));
        assert!(pos_only.contains(&Bigram::new("works", "perfectly")));
        assert!(neg_only.contains(&Bigram::new("waste", "money")));
    }
}
