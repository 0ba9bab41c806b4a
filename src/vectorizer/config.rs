use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VectorizerError};

/// Stop words of the classic English analyzer.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

/// Vectorizer configuration.
/// Frozen once handed to [`crate::HashingVectorizer::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// output vector dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// namespace mixed into every word hash
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// name of the constant intercept feature
    #[serde(default = "default_bias_name")]
    pub bias_name: String,
    /// hash probes per feature
    #[serde(default = "default_probes")]
    pub probes: usize,
    /// seed for sampling and shuffling, never used by the hashes
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    /// tokens longer than this many characters are dropped
    #[serde(default = "default_max_token_length")]
    pub max_token_length: usize,
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
}

// Default value functions
fn default_dimension() -> usize {
    10_000
}

fn default_namespace() -> String {
    "body".to_string()
}

fn default_bias_name() -> String {
    "Intercept".to_string()
}

fn default_probes() -> usize {
    1
}

fn default_seed() -> u64 {
    42
}

fn default_lowercase() -> bool {
    true
}

fn default_max_token_length() -> usize {
    255
}

fn default_stop_words() -> Vec<String> {
    ENGLISH_STOP_WORDS.iter().map(|s| s.to_string()).collect()
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            namespace: default_namespace(),
            bias_name: default_bias_name(),
            probes: default_probes(),
            seed: default_seed(),
            lowercase: default_lowercase(),
            max_token_length: default_max_token_length(),
            stop_words: default_stop_words(),
        }
    }
}

impl VectorizerConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)
            .map_err(|e| VectorizerError::Configuration(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VectorizerError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_bias_name(mut self, bias_name: impl Into<String>) -> Self {
        self.bias_name = bias_name.into();
        self
    }

    pub fn with_probes(mut self, probes: usize) -> Self {
        self.probes = probes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_max_token_length(mut self, max_token_length: usize) -> Self {
        self.max_token_length = max_token_length;
        self
    }

    pub fn with_stop_words<I, S>(mut self, stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = stop_words.into_iter().map(Into::into).collect();
        self
    }

    /// Check the invariants every encoder relies on
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(VectorizerError::Configuration("dimension must be positive".into()));
        }
        if self.probes == 0 {
            return Err(VectorizerError::Configuration("probes must be at least 1".into()));
        }
        if self.max_token_length == 0 {
            return Err(VectorizerError::Configuration("max_token_length must be positive".into()));
        }
        if self.namespace.is_empty() {
            return Err(VectorizerError::Configuration("namespace must not be empty".into()));
        }
        if self.bias_name.is_empty() {
            return Err(VectorizerError::Configuration("bias_name must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults() {
        let config = VectorizerConfig::default();
        assert_eq!(config.dimension, 10_000);
        assert_eq!(config.namespace, "body");
        assert_eq!(config.bias_name, "Intercept");
        assert_eq!(config.probes, 1);
        assert!(config.stop_words.iter().any(|w| w == "the"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_partial_uses_defaults() {
        let config = VectorizerConfig::from_toml_str("dimension = 16\nprobes = 3\nstop_words = []\n").unwrap();
        assert_eq!(config.dimension, 16);
        assert_eq!(config.probes, 3);
        assert!(config.stop_words.is_empty());
        assert_eq!(config.namespace, "body");
    }

    #[test]
    fn rejects_zero_dimension_and_probes() {
        let err = VectorizerConfig::default().with_dimension(0).validate().unwrap_err();
        assert!(matches!(err, VectorizerError::Configuration(_)));

        let err = VectorizerConfig::default().with_probes(0).validate().unwrap_err();
        assert!(matches!(err, VectorizerError::Configuration(_)));

        assert!(VectorizerConfig::from_toml_str("dimension = 0").is_err());
    }

    #[test]
    fn rejects_negative_dimension_in_toml() {
        let err = VectorizerConfig::from_toml_str("dimension = -5").unwrap_err();
        assert!(matches!(err, VectorizerError::Configuration(_)));
    }

    #[test]
    fn rejects_empty_names() {
        assert!(VectorizerConfig::default().with_namespace("").validate().is_err());
        assert!(VectorizerConfig::default().with_bias_name("").validate().is_err());
        assert!(VectorizerConfig::default().with_max_token_length(0).validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "namespace = \"title\"\nseed = 7").unwrap();
        let config = VectorizerConfig::from_path(file.path()).unwrap();
        assert_eq!(config.namespace, "title");
        assert_eq!(config.seed, 7);

        assert!(VectorizerConfig::from_path(file.path().with_extension("missing")).is_err());
    }
}
