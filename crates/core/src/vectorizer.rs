//! Character n-gram TF-IDF vectorizer for file names.
//!
//! N-grams are taken inside word boundaries: the lowercased name is split on
//! whitespace and each word is padded with one space on both sides before
//! slicing, so `"a.txt"` yields `" a"`, `"a."`, ... `"xt "`. Words shorter than
//! `n` contribute their padded form once.

use crate::config::VectorizerConfig;
use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::iter;

/// Sparse feature vector: (feature index, value), sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramVectorizer {
    min_n: usize,
    max_n: usize,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl NgramVectorizer {
    /// Learns the vocabulary and smoothed IDF weights from `docs`.
    pub fn fit<S: AsRef<str>>(docs: &[S], cfg: &VectorizerConfig) -> Result<Self, ModelError> {
        if cfg.min_n == 0 || cfg.min_n > cfg.max_n {
            return Err(ModelError::InvalidNgramRange {
                min: cfg.min_n,
                max: cfg.max_n,
            });
        }

        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in docs {
            let unique: BTreeSet<String> = char_wb_ngrams(doc.as_ref(), cfg.min_n, cfg.max_n)
                .into_iter()
                .collect();
            for gram in unique {
                *doc_freq.entry(gram).or_default() += 1;
            }
        }
        if doc_freq.is_empty() {
            return Err(ModelError::EmptyVocabulary);
        }

        // idf = ln((1 + n) / (1 + df)) + 1
        let n_docs = docs.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (index, (gram, df)) in doc_freq.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(gram, index);
        }

        Ok(Self {
            min_n: cfg.min_n,
            max_n: cfg.max_n,
            vocabulary,
            idf,
        })
    }

    /// L2-normalised TF-IDF vector. Unknown n-grams are ignored.
    pub fn transform(&self, doc: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for gram in char_wb_ngrams(doc, self.min_n, self.max_n) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_default() += 1.0;
            }
        }
        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        let norm = vector.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in vector.iter_mut() {
                *v /= norm;
            }
        }
        vector
    }

    pub fn transform_all<S: AsRef<str>>(&self, docs: &[S]) -> Vec<SparseVector> {
        docs.iter().map(|d| self.transform(d.as_ref())).collect()
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }
}

pub fn char_wb_ngrams(text: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut grams = Vec::new();
    for word in lowered.split_whitespace() {
        let padded: Vec<char> = iter::once(' ')
            .chain(word.chars())
            .chain(iter::once(' '))
            .collect();
        let len = padded.len();
        for n in min_n..=max_n {
            let mut offset = 0;
            grams.push(padded[offset..(offset + n).min(len)].iter().collect());
            while offset + n < len {
                offset += 1;
                grams.push(padded[offset..offset + n].iter().collect());
            }
            if offset == 0 {
                // word shorter than n: larger n repeats the same gram
                break;
            }
        }
    }
    grams
}
