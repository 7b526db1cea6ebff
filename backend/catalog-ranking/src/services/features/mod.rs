/// Text Feature Module
///
/// Builds the TF-IDF index over every item's `combined_features` text.
///
/// # Contract
/// - Vocabulary is fixed at build time from the whole corpus and never extended
/// - Row `i` of the index belongs to `ItemId(i)`
/// - Any change to the catalog's item set requires a full rebuild
///
/// The index is read-only after construction; share it by reference or `Arc`.
pub mod stop_words;

use crate::error::{DataError, Result};
use crate::models::{Catalog, ItemId};
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

pub use stop_words::ENGLISH_STOP_WORDS;

const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Sparse L2-normalized row. Indices are strictly increasing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    fn from_sorted(entries: Vec<(usize, f64)>) -> Self {
        let (indices, values) = entries.into_iter().unzip();
        Self { indices, values }
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity; 0.0 when either side is the zero vector
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            0.0
        } else {
            self.dot(other) / denom
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
}

/// Build the index over the full catalog's `combined_features`.
pub fn build_feature_index(catalog: &Catalog) -> Result<FeatureIndex> {
    let corpus: Vec<&str> = catalog
        .items()
        .iter()
        .map(|item| item.combined_features.as_str())
        .collect();
    FeatureIndex::build(&corpus)
}

impl FeatureIndex {
    pub fn build<S: AsRef<str>>(corpus: &[S]) -> Result<Self> {
        if corpus.is_empty() {
            return Err(DataError::EmptyCorpus.into());
        }

        let tokenizer = Tokenizer::new();
        let documents: Vec<Vec<String>> =
            corpus.iter().map(|doc| tokenizer.tokenize(doc.as_ref())).collect();

        // Sorted term order gives each term its dimension
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &documents {
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if doc_freq.is_empty() {
            return Err(DataError::EmptyVocabulary.into());
        }

        let n_docs = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(doc_freq.len());
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (dim, (term, df)) in doc_freq.iter().enumerate() {
            vocabulary.insert((*term).to_string(), dim);
            idf.push(((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0);
        }

        let rows: Vec<SparseVector> = documents
            .iter()
            .map(|tokens| weigh(tokens, &vocabulary, &idf))
            .collect();

        info!(
            documents = rows.len(),
            vocabulary_size = vocabulary.len(),
            "Feature index built"
        );

        Ok(Self {
            vocabulary,
            idf,
            rows,
        })
    }

    /// Number of rows; equals the catalog size it was built from
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    pub fn dimensions(&self) -> usize {
        self.idf.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&dim| self.idf[dim])
    }

    pub fn row(&self, id: ItemId) -> Option<&SparseVector> {
        self.rows.get(id.index())
    }

    /// Fails when the index was built for a different catalog version.
    pub fn ensure_matches(&self, catalog: &Catalog) -> Result<()> {
        if self.rows.len() != catalog.len() {
            return Err(DataError::StaleIndex {
                rows: self.rows.len(),
                items: catalog.len(),
            }
            .into());
        }
        Ok(())
    }
}

fn weigh(tokens: &[String], vocabulary: &HashMap<String, usize>, idf: &[f64]) -> SparseVector {
    let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
    for token in tokens {
        if let Some(&dim) = vocabulary.get(token) {
            *counts.entry(dim).or_insert(0.0) += 1.0;
        }
    }

    let mut entries: Vec<(usize, f64)> = counts
        .into_iter()
        .map(|(dim, tf)| (dim, tf * idf[dim]))
        .collect();

    let norm = entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, v) in entries.iter_mut() {
            *v /= norm;
        }
    } else {
        debug!(tokens = tokens.len(), "Document has no indexable terms");
    }

    SparseVector::from_sorted(entries)
}

struct Tokenizer {
    pattern: Regex,
    stop_words: HashSet<&'static str>,
}

impl Tokenizer {
    fn new() -> Self {
        Self {
            pattern: Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"),
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }
}
