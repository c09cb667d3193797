//! English stop words excluded from bigram extraction.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Common English function words (articles, pronouns, prepositions, auxiliaries).
/// Contracted forms appear without apostrophes because punctuation is stripped
/// before the stop-word check.
pub const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "youre", "youve",
    "youll", "youd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "shes", "her", "hers", "herself", "it", "its", "itself", "they", "them", "their",
    "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "thatll", "these",
    "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "dont", "should", "shouldve", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "arent", "couldn", "couldnt", "didn",
    "didnt", "doesn", "doesnt", "hadn", "hadnt", "hasn", "hasnt", "haven", "havent", "isn",
    "isnt", "ma", "mightn", "mightnt", "mustn", "mustnt", "needn", "neednt", "shan", "shant",
    "shouldn", "shouldnt", "wasn", "wasnt", "weren", "werent", "won", "wont", "wouldn",
    "wouldnt",
];

/// Built-in English stop words as an owned set.
pub fn english() -> HashSet<String> {
    ENGLISH.iter().map(|w| (*w).to_string()).collect()
}

/// Reads an additional stop-word file (one word per line, `#` starts a comment line)
/// and merges it into `base`. Words are lowercased.
pub fn extend_from_file(base: &mut HashSet<String>, path: &Path) -> std::io::Result<usize> {
    let content = fs::read_to_string(path)?;
    let before = base.len();
    for line in content.lines() {
        let word = line.trim();
        if word.is_empty() || word.starts_with('#') {
            continue;
        }
        base.insert(word.to_lowercase());
    }
    Ok(base.len() - before)
}
