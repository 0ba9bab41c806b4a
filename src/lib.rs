/// This crate turns free text into fixed-dimension feature vectors with the hashing trick.
pub mod vectorizer;
pub mod utils;
pub mod error;

/// Hashing Vectorizer
/// The top-level struct of this crate.
/// It tokenizes a document, counts its words and writes them into a
/// fixed-size sparse vector through hashed feature encoders, together with
/// a constant intercept feature.
///
/// Internally, it holds:
/// - The frozen configuration
/// - A tokenizer
/// - A word encoder and a bias (intercept) encoder
/// - A reference to the shared corpus vocabulary
///
/// When creating an instance, you must pass a corpus reference as `Arc<Corpus>`.
/// Every encoded document is merged into that corpus.
///
/// # Determinism
/// The same text with the same configuration always yields bit-identical vectors.
/// The hashes depend on the feature names only, never on the random seed.
///
/// # Thread Safety
/// `HashingVectorizer` is `Send + Sync`; encode from as many threads as you like.
pub use vectorizer::HashingVectorizer;

/// Feature Vector
/// `ZeroSpVec<f64>` of the configured dimension, storing non-zero coordinates only.
///
/// # Serialization
/// Supported, as `{ len, nnz, entries }`.
pub use vectorizer::FeatureVector;

/// Vectorizer Configuration
/// Dimension, namespace, intercept name, probe count, seed and tokenizer settings.
/// Loadable from TOML; missing keys take their defaults.
pub use vectorizer::config::VectorizerConfig;

/// Corpus for Hashing Vectorizer
/// Accumulates term counts over every document encoded so far.
/// It manages:
/// - The number of merged documents
/// - The number of occurrences of each term across the corpus
///
/// Counts never decrease.
///
/// # Thread Safety
/// This struct is thread-safe and can be accessed concurrently from multiple threads.
/// Implemented using DashMap and atomics.
pub use vectorizer::corpus::Corpus;

/// Vocabulary Snapshot
/// Immutable copy of a `Corpus`, sorted by descending count, for reporting.
pub use vectorizer::corpus::VocabularySnapshot;

/// Term Frequency structure
/// Word counts of a single document, in first-occurrence order.
pub use vectorizer::term::TermFrequency;

/// Tokenizer
/// Unicode word segmentation, lower-casing and stop-word removal,
/// streaming over any `BufRead`.
pub use vectorizer::tokenizer::{TokenStream, Tokenizer};

/// Feature Encoder Trait
/// Maps a named feature with a weight onto one or more hashed coordinates.
///
/// Two encoders are provided:
/// - `WordEncoder`: signed, namespaced word features
/// - `ConstantEncoder`: the intercept, identical for every document
pub use vectorizer::encoder::{word_weight, ConstantEncoder, FeatureEncoder, HashedLocation, WordEncoder};

/// Error type
/// - `StreamRead`: the document could not be read
/// - `Configuration`: invalid configuration
pub use error::{Result, VectorizerError};
