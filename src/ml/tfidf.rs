//! TF-IDF text vectorization with a fixed English stop-word policy.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Sparse feature row: `(feature index, weight)` pairs sorted by index.
pub type SparseRow = Vec<(u32, f32)>;

/// English stop words removed before term counting.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are", "around",
    "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming", "been",
    "before", "beforehand", "behind", "being", "below", "beside", "besides", "between", "beyond",
    "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down",
    "during", "each", "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every",
    "everyone", "everything", "everywhere", "except", "few", "for", "former", "formerly", "from",
    "further", "had", "has", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
    "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "i", "ie", "if",
    "in", "indeed", "into", "is", "it", "its", "itself", "last", "latter", "latterly", "least",
    "less", "many", "may", "me", "meanwhile", "might", "more", "moreover", "most", "mostly",
    "much", "must", "my", "myself", "namely", "neither", "never", "nevertheless", "next", "no",
    "nobody", "none", "noone", "nor", "not", "nothing", "now", "nowhere", "of", "off", "often",
    "on", "once", "one", "only", "onto", "or", "other", "others", "otherwise", "our", "ours",
    "ourselves", "out", "over", "own", "per", "perhaps", "rather", "same", "seem", "seemed",
    "seeming", "seems", "several", "she", "should", "since", "so", "some", "somehow", "someone",
    "something", "sometime", "sometimes", "somewhere", "still", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "this", "those", "though", "through",
    "throughout", "thru", "thus", "to", "together", "too", "toward", "towards", "under", "until",
    "up", "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Fitted TF-IDF vectorizer.
///
/// Vocabulary indices are assigned in sorted token order; rows carry
/// smoothed-IDF term weights and are L2-normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfModel {
    /// Token to feature-index mapping.
    vocabulary: BTreeMap<String, u32>,
    /// Smoothed inverse document frequency per feature index.
    idf: Vec<f32>,
    /// Number of documents seen while fitting.
    n_documents: usize,
}

impl TfidfModel {
    /// Fit a vectorizer over the given documents.
    pub fn fit(documents: &[String]) -> Self {
        let mut document_frequency: BTreeMap<String, u32> = BTreeMap::new();
        for document in documents {
            let unique: BTreeSet<String> = tokenize(document).into_iter().collect();
            for token in unique {
                *document_frequency.entry(token).or_insert(0) += 1;
            }
        }

        let n_documents = documents.len();
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (token, frequency)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(token, index as u32);
            idf.push(((1.0 + n_documents as f32) / (1.0 + frequency as f32)).ln() + 1.0);
        }

        Self {
            vocabulary,
            idf,
            n_documents,
        }
    }

    /// Number of features produced per row.
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    /// Transform one document into an L2-normalized sparse row.
    ///
    /// Tokens outside the fitted vocabulary are ignored.
    pub fn transform(&self, document: &str) -> SparseRow {
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
        for token in tokenize(document) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index as usize]))
            .collect();
        let norm = row
            .iter()
            .map(|&(_, value)| value * value)
            .sum::<f32>()
            .sqrt();
        if norm > 0.0 {
            for (_, value) in &mut row {
                *value /= norm;
            }
        }
        row
    }

    /// Transform a batch of documents.
    pub fn transform_all(&self, documents: &[String]) -> Vec<SparseRow> {
        documents
            .iter()
            .map(|document| self.transform(document))
            .collect()
    }

    /// Validate structural invariants of the fitted vectorizer.
    pub fn validate(&self) -> Result<(), String> {
        if self.vocabulary.len() != self.idf.len() {
            return Err("vocabulary and idf length mismatch".to_string());
        }
        for &index in self.vocabulary.values() {
            if index as usize >= self.idf.len() {
                return Err("vocabulary index out of range".to_string());
            }
        }
        Ok(())
    }
}

/// Lowercase word tokens of two or more alphanumeric characters, with
/// English stop words removed.
fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !ENGLISH_STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_filters_stop_words_and_short_tokens() {
        let documents = vec![
            "the cat sat on the mat".to_string(),
            "a cat ate fish".to_string(),
        ];
        let model = TfidfModel::fit(&documents);
        // "the", "on" and single-letter "a" never reach the vocabulary.
        assert_eq!(model.n_features(), 5);
        model.validate().unwrap();
    }

    #[test]
    fn shared_tokens_get_lower_idf_than_rare_ones() {
        let documents = vec![
            "cat mat".to_string(),
            "cat fish".to_string(),
        ];
        let model = TfidfModel::fit(&documents);
        let shared = model.transform("cat");
        let rare = model.transform("fish");
        // Single-token rows normalize to 1.0 regardless of idf.
        assert_eq!(shared.len(), 1);
        assert_eq!(rare.len(), 1);
        let both = model.transform("cat fish");
        let cat_weight = both.iter().find(|&&(index, _)| index == shared[0].0);
        let fish_weight = both.iter().find(|&&(index, _)| index == rare[0].0);
        assert!(cat_weight.unwrap().1 < fish_weight.unwrap().1);
    }

    #[test]
    fn rows_are_l2_normalized_and_sorted() {
        let documents = vec![
            "premise about welfare funding".to_string(),
            "premise about market growth".to_string(),
        ];
        let model = TfidfModel::fit(&documents);
        let row = model.transform("welfare growth premise");
        let norm = row
            .iter()
            .map(|&(_, value)| value * value)
            .sum::<f32>()
            .sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(row.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn unknown_tokens_produce_an_empty_row() {
        let documents = vec!["cat mat".to_string()];
        let model = TfidfModel::fit(&documents);
        assert!(model.transform("zebra quagga").is_empty());
    }
}
