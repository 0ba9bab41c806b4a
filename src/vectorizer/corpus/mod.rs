use std::sync::atomic::{AtomicU64, Ordering};

use ahash::RandomState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::TermFrequency;

/// keep document count and term counts in a thread-safe way
///
/// Counts only ever grow. Each term is updated under its shard lock,
/// so concurrent merges never lose an increment.
#[derive(Debug, Default)]
pub struct Corpus {
    /// number of merged documents
    pub doc_num: AtomicU64,
    /// number of merged term occurrences
    pub token_total: AtomicU64,
    // term counts in corpus
    pub term_counts: DashMap<Box<str>, u64, RandomState>,
}

impl Clone for Corpus {
    fn clone(&self) -> Self {
        Self {
            doc_num: AtomicU64::new(self.doc_num.load(Ordering::Acquire)),
            token_total: AtomicU64::new(self.token_total.load(Ordering::Acquire)),
            term_counts: self.term_counts.clone(),
        }
    }
}

impl Corpus {
    /// Create a new instance
    pub fn new() -> Self {
        Self {
            doc_num: AtomicU64::new(0),
            token_total: AtomicU64::new(0),
            term_counts: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Merge one document's term counts into the corpus.
    /// An empty document is ignored and does not count as a document.
    pub fn merge_term_freq(&self, doc: &TermFrequency) {
        if doc.is_empty() {
            return;
        }
        for (term, count) in doc.iter() {
            // known terms are bumped in place without allocating a key
            if let Some(mut slot) = self.term_counts.get_mut(term) {
                *slot += count;
                continue;
            }
            self.term_counts
                .entry(term.into())
                .and_modify(|slot| *slot += count)
                .or_insert(count);
        }
        self.token_total.fetch_add(doc.term_sum(), Ordering::Relaxed);
        self.doc_num.fetch_add(1, Ordering::Relaxed);
        trace!(terms = doc.term_num(), tokens = doc.term_sum(), "merged document into corpus");
    }

    /// Merge another corpus into self.
    /// `other` is copied out before any lock on `self` is taken, so merging a
    /// corpus into itself doubles its counts, and `a <- b` racing `b <- a`
    /// cannot deadlock.
    pub fn merge_corpus(&self, other: &Corpus) {
        let doc_num = other.get_doc_num();
        let token_total = other.get_token_total();
        let entries: Vec<(Box<str>, u64)> = other
            .term_counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();

        for (term, count_other) in entries {
            self.term_counts
                .entry(term)
                .and_modify(|count| *count += count_other)
                .or_insert(count_other);
        }
        self.doc_num.fetch_add(doc_num, Ordering::Relaxed);
        self.token_total.fetch_add(token_total, Ordering::Relaxed);
    }

    /// Get the number of merged documents
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num.load(Ordering::Relaxed)
    }

    /// Get the number of merged term occurrences
    pub fn get_token_total(&self) -> u64 {
        self.token_total.load(Ordering::Relaxed)
    }

    /// Get the term count in the corpus
    pub fn get_term_count(&self, term: &str) -> u64 {
        self.term_counts.get(term).map_or(0, |count| *count)
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_counts.len()
    }
}

/// for analyze usage
impl Corpus {
    /// Get all terms in the corpus
    pub fn get_all_terms(&self) -> Vec<String> {
        self.term_counts
            .iter()
            .map(|entry| entry.key().to_string())
            .collect()
    }

    /// Copy the current state into an immutable snapshot.
    /// Terms are visited shard by shard, so merges running concurrently
    /// may be partially visible.
    pub fn snapshot(&self) -> VocabularySnapshot {
        let mut terms: Vec<(String, u64)> = self
            .term_counts
            .iter()
            .map(|entry| (entry.key().to_string(), *entry.value()))
            .collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        VocabularySnapshot {
            doc_num: self.get_doc_num(),
            token_total: self.get_token_total(),
            terms,
        }
    }
}

impl From<&Corpus> for TermFrequency {
    fn from(corpus: &Corpus) -> Self {
        let mut tf = TermFrequency::new();
        for (term, count) in corpus.snapshot().terms {
            tf.add_term_n(&term, count);
        }
        tf
    }
}

/// Read-only copy of a [`Corpus`] for reporting.
/// Terms are ordered by descending count, ties by dictionary order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularySnapshot {
    pub doc_num: u64,
    pub token_total: u64,
    pub terms: Vec<(String, u64)>,
}

impl VocabularySnapshot {
    pub fn get(&self, term: &str) -> u64 {
        self.terms
            .iter()
            .find(|(t, _)| t == term)
            .map_or(0, |(_, count)| *count)
    }

    /// the `n` most frequent terms
    pub fn top(&self, n: usize) -> &[(String, u64)] {
        &self.terms[..n.min(self.terms.len())]
    }

    /// number of unique terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_cbor(&self) -> serde_cbor::Result<Vec<u8>> {
        serde_cbor::to_vec(self)
    }

    pub fn from_cbor(bytes: &[u8]) -> serde_cbor::Result<Self> {
        serde_cbor::from_slice(bytes)
    }
}
