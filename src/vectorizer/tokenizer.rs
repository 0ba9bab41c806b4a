use std::collections::{HashSet, VecDeque};
use std::io::{self, BufRead};
use std::iter::FusedIterator;

use ahash::RandomState;
use unicode_segmentation::UnicodeSegmentation;

use crate::vectorizer::config::{VectorizerConfig, ENGLISH_STOP_WORDS};

/// Word tokenizer.
///
/// Splits on Unicode (UAX #29) word boundaries, lower-cases, and drops
/// stop words and over-long tokens.
///
/// # Examples
/// ```
/// use hashing_vectorizer::Tokenizer;
/// let tokenizer = Tokenizer::english();
/// assert_eq!(tokenizer.tokenize_str("The movie was GOOD, really good!"), vec!["movie", "good", "really", "good"]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    lowercase: bool,
    max_token_length: usize,
    stop_words: HashSet<String, RandomState>,
}

impl Tokenizer {
    pub fn new<I, S>(lowercase: bool, max_token_length: usize, stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lowercase,
            max_token_length,
            stop_words: stop_words.into_iter().map(Into::into).collect(),
        }
    }

    /// lower-casing, 255 character limit, English stop words
    pub fn english() -> Self {
        Self::new(true, 255, ENGLISH_STOP_WORDS.iter().copied())
    }

    pub fn from_config(config: &VectorizerConfig) -> Self {
        Self::new(config.lowercase, config.max_token_length, config.stop_words.iter().cloned())
    }

    #[inline]
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    #[inline]
    fn normalize(&self, word: &str) -> Option<String> {
        let token = if self.lowercase {
            word.to_lowercase()
        } else {
            word.to_string()
        };
        // length of the token as emitted, lower-casing may add characters
        if token.chars().count() > self.max_token_length || self.is_stop_word(&token) {
            None
        } else {
            Some(token)
        }
    }

    fn push_tokens(&self, text: &str, out: &mut VecDeque<String>) {
        out.extend(text.unicode_words().filter_map(|word| self.normalize(word)));
    }

    /// Lazily tokenize a reader, one line at a time.
    pub fn token_stream<R: BufRead>(&self, reader: R) -> TokenStream<'_, R> {
        TokenStream {
            tokenizer: self,
            reader,
            line: String::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Tokenize text already in memory
    pub fn tokenize_str(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .filter_map(|word| self.normalize(word))
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::english()
    }
}

/// Token iterator over a [`BufRead`].
///
/// Yields `Err` at most once, on the first failed read (invalid UTF-8
/// included), and ends right after it.
pub struct TokenStream<'a, R> {
    tokenizer: &'a Tokenizer,
    reader: R,
    line: String,
    pending: VecDeque<String>,
    finished: bool,
}

impl<R: BufRead> Iterator for TokenStream<'_, R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => self.finished = true,
                Ok(_) => self.tokenizer.push_tokens(&self.line, &mut self.pending),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<R: BufRead> FusedIterator for TokenStream<'_, R> {}
