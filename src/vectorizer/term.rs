use ahash::RandomState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// TermFrequency struct
/// Counts the occurrences of each term in one document.
///
/// Terms iterate in the order they were first added, so anything folded
/// over `iter()` sees the same sequence for the same input text.
///
/// # Examples
/// ```
/// use hashing_vectorizer::TermFrequency;
/// let mut term_freq = TermFrequency::new();
/// term_freq.add_term("good");
/// term_freq.add_term("bad");
/// term_freq.add_term("good");
///
/// assert_eq!(term_freq.term_count("good"), 2);
/// assert_eq!(term_freq.term_sum(), 3);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TermFrequency {
    term_count: IndexMap<String, u64, RandomState>,
    total_term_count: u64,
}

/// Implementation for adding terms
impl TermFrequency {
    /// Create a new TermFrequency
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::with_hasher(RandomState::new()),
            total_term_count: 0,
        }
    }

    /// Add a term
    ///
    /// # Arguments
    /// * `term` - term to add
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        self.add_term_n(term, 1)
    }

    /// Add `n` occurrences of a term
    #[inline]
    pub fn add_term_n(&mut self, term: &str, n: u64) -> &mut Self {
        if n == 0 {
            return self;
        }
        match self.term_count.get_mut(term) {
            Some(count) => *count += n,
            None => {
                self.term_count.insert(term.to_string(), n);
            }
        }
        self.total_term_count += n;
        self
    }

    /// Add multiple terms
    ///
    /// # Arguments
    /// * `terms` - Slice of terms to add
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    /// Merge with another TermFrequency
    /// # Arguments
    /// * `other` - Another TermFrequency to merge with
    pub fn add_terms_from_freq(&mut self, other: &TermFrequency) -> &mut Self {
        for (term, count) in other.iter() {
            self.add_term_n(term, count);
        }
        self
    }

    /// Count a fallible token sequence.
    /// Stops at the first error and discards the partial counts.
    pub fn try_from_tokens<I, T, E>(tokens: I) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<T, E>>,
        T: AsRef<str>,
    {
        let mut tf = TermFrequency::new();
        for token in tokens {
            tf.add_term(token?.as_ref());
        }
        Ok(tf)
    }
}

impl<T> From<&[T]> for TermFrequency
where
    T: AsRef<str>,
{
    fn from(terms: &[T]) -> Self {
        let mut tf = TermFrequency::new();
        tf.add_terms(terms);
        tf
    }
}

/// Implementation for retrieving information from TermFrequency
impl TermFrequency {
    /// Get iterator over all terms and their counts, in first-seen order
    ///
    /// # Returns
    /// * `impl Iterator<Item=(&str, u64)>` - Iterator over terms and their counts
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.term_count.iter().map(|(term, &count)| (term.as_str(), count))
    }

    /// Get the total count of all terms
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    /// Get the occurrence count for a specific term
    ///
    /// # Returns
    /// * `u64` - Occurrence count for the term, 0 if absent
    #[inline]
    pub fn term_count(&self, term: &str) -> u64 {
        *self.term_count.get(term).unwrap_or(&0)
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.term_count.contains_key(term)
    }

    /// term_set_iter
    ///
    /// # Returns
    /// * `impl Iterator<Item=&str>` - Iterator over the set of terms
    #[inline]
    pub fn term_set_iter(&self) -> impl Iterator<Item = &str> {
        self.term_count.keys().map(|s| s.as_str())
    }

    /// Get the number of unique terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    /// Get a vector of terms sorted by frequency (descending),
    /// ties broken by dictionary order
    ///
    /// # Returns
    /// * `Vec<(String, u64)>` - Vector of terms sorted by frequency
    #[inline]
    pub fn sorted_frequency_vector(&self) -> Vec<(String, u64)> {
        let mut term_list: Vec<(String, u64)> = self
            .term_count
            .iter()
            .map(|(term, &count)| (term.clone(), count))
            .collect();

        term_list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        term_list
    }
}
