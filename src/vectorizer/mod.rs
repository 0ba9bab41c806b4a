pub mod config;
pub mod corpus;
pub mod encoder;
pub mod term;
pub mod tokenizer;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::utils::math::vector::ZeroSpVec;
use crate::vectorizer::{
    config::VectorizerConfig,
    corpus::{Corpus, VocabularySnapshot},
    encoder::{word_weight, ConstantEncoder, FeatureEncoder, HashedLocation, WordEncoder},
    term::TermFrequency,
    tokenizer::Tokenizer,
};

/// Fixed-dimension sparse feature vector
pub type FeatureVector = ZeroSpVec<f64>;

#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    config: VectorizerConfig,
    tokenizer: Tokenizer,
    /// word features
    encoder: WordEncoder,
    /// intercept feature
    bias: ConstantEncoder,
    /// Corpus reference
    pub corpus_ref: Arc<Corpus>,
}

impl HashingVectorizer {
    /// Create a new HashingVectorizer.
    /// Fails with `Configuration` if the config does not validate.
    pub fn new(config: VectorizerConfig, corpus_ref: Arc<Corpus>) -> Result<Self> {
        config.validate()?;
        let tokenizer = Tokenizer::from_config(&config);
        let encoder = WordEncoder::new(config.namespace.clone(), config.probes)?;
        let bias = ConstantEncoder::new(config.bias_name.clone(), config.probes)?;
        Ok(Self {
            config,
            tokenizer,
            encoder,
            bias,
            corpus_ref,
        })
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn encoder(&self) -> &WordEncoder {
        &self.encoder
    }

    pub fn bias(&self) -> &ConstantEncoder {
        &self.bias
    }

    /// Random generator seeded from `config.seed`, for shuffling or sampling a corpus.
    /// Every call starts the same sequence.
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.config.seed)
    }
}

impl HashingVectorizer {
    /// Encode one document.
    ///
    /// The whole stream is counted before the corpus is touched, so a read
    /// error leaves the corpus exactly as it was.
    pub fn encode_document<R: Read>(&self, reader: R) -> Result<FeatureVector> {
        let counts = self.count_words(reader)?;
        Ok(self.encode_counts(&counts))
    }

    /// Encode text already in memory
    pub fn encode_str(&self, text: &str) -> FeatureVector {
        let mut counts = TermFrequency::new();
        for token in self.tokenizer.tokenize_str(text) {
            counts.add_term(&token);
        }
        self.encode_counts(&counts)
    }

    /// Encode a UTF-8 file. A file that cannot be opened is a `StreamRead` error.
    pub fn encode_file<P: AsRef<Path>>(&self, path: P) -> Result<FeatureVector> {
        let file = File::open(path)?;
        self.encode_document(file)
    }

    /// Encode documents on the rayon pool.
    /// Results come back in input order, one per reader.
    pub fn encode_batch<R>(&self, readers: Vec<R>) -> Vec<Result<FeatureVector>>
    where
        R: Read + Send,
    {
        readers
            .into_par_iter()
            .map(|reader| self.encode_document(reader))
            .collect()
    }

    /// Count the words of one document without touching the corpus
    pub fn count_words<R: Read>(&self, reader: R) -> Result<TermFrequency> {
        let stream = self.tokenizer.token_stream(BufReader::new(reader));
        Ok(TermFrequency::try_from_tokens(stream)?)
    }

    /// Build the vector for already counted words: bias once, then every
    /// distinct word with weight `log1p(count)`.
    /// Does not touch the corpus.
    pub fn assemble(&self, counts: &TermFrequency) -> FeatureVector {
        let mut vector = FeatureVector::with_capacity(
            self.config.dimension,
            (counts.term_num() + 1) * self.config.probes,
        );
        self.bias.add_constant(&mut vector);
        for (term, count) in counts.iter() {
            self.encoder.add_to_vector(term, word_weight(count), &mut vector);
        }
        vector
    }

    /// The vector of an empty document
    pub fn bias_vector(&self) -> FeatureVector {
        self.assemble(&TermFrequency::new())
    }

    /// Where `word` lands in every vector this vectorizer produces
    pub fn trace_word(&self, word: &str) -> Vec<HashedLocation> {
        self.encoder.locations(word, self.config.dimension)
    }

    /// Copy of the corpus counts
    pub fn vocabulary_snapshot(&self) -> VocabularySnapshot {
        self.corpus_ref.snapshot()
    }

    fn encode_counts(&self, counts: &TermFrequency) -> FeatureVector {
        self.corpus_ref.merge_term_freq(counts);
        let vector = self.assemble(counts);
        debug!(
            terms = counts.term_num(),
            tokens = counts.term_sum(),
            nnz = vector.nnz(),
            "encoded document"
        );
        vector
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use rand::Rng;

    use super::*;
    use crate::error::VectorizerError;

    fn vectorizer(config: VectorizerConfig) -> HashingVectorizer {
        HashingVectorizer::new(config, Arc::new(Corpus::new())).unwrap()
    }

    /// fails after serving its bytes
    struct BrokenReader(Cursor<Vec<u8>>);

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "stream reset")),
                n => Ok(n),
            }
        }
    }

    fn bias_indices(v: &HashingVectorizer) -> Vec<usize> {
        v.bias().locations("", v.dimension()).iter().map(|l| l.index).collect()
    }

    #[test]
    fn good_good_bad_example() {
        let v = vectorizer(VectorizerConfig::default());
        let vec = v.encode_document(Cursor::new("good good bad")).unwrap();
        assert_eq!(vec.len(), 10_000);

        let good = v.trace_word("good")[0];
        let bad = v.trace_word("bad")[0];
        let bias = bias_indices(&v)[0];

        let mut expected = FeatureVector::new(10_000);
        expected.add_at(bias, 1.0);
        expected.add_at(good.index, good.sign * word_weight(2));
        expected.add_at(bad.index, bad.sign * word_weight(1));
        assert_eq!(vec, expected);

        // no stray coordinates
        for (idx, _) in vec.raw_iter() {
            assert!(idx == bias || idx == good.index || idx == bad.index);
        }
        assert!((word_weight(2) - 1.0986).abs() < 1e-4);
        assert!((word_weight(1) - 0.6931).abs() < 1e-4);
        assert_eq!(v.count_words(Cursor::new("good good bad")).unwrap().term_count("good"), 2);
    }

    #[test]
    fn identical_content_gives_identical_vectors() {
        let v = vectorizer(VectorizerConfig::default().with_probes(3));
        let text = "An absolutely wonderful film. Wonderful cast, wonderful score; dreadful ending.";
        let a = v.encode_document(Cursor::new(text)).unwrap();
        let b = v.encode_document(Cursor::new(text)).unwrap();
        assert_eq!(a.as_ind_slice(), b.as_ind_slice());
        let bits_a: Vec<u64> = a.as_val_slice().iter().map(|x| x.to_bits()).collect();
        let bits_b: Vec<u64> = b.as_val_slice().iter().map(|x| x.to_bits()).collect();
        assert_eq!(bits_a, bits_b);

        // a fresh vectorizer with its own corpus agrees too
        let other = vectorizer(VectorizerConfig::default().with_probes(3));
        assert_eq!(other.encode_str(text), a);
    }

    #[test]
    fn dimension_is_always_configured_dimension() {
        for dim in [1usize, 16, 10_000] {
            let v = vectorizer(VectorizerConfig::default().with_dimension(dim));
            assert_eq!(v.encode_str("").len(), dim);
            assert_eq!(v.encode_str("plenty of words in this one").len(), dim);
        }
    }

    #[test]
    fn empty_document_is_bias_only() {
        let v = vectorizer(VectorizerConfig::default().with_probes(2));
        let empty = v.encode_document(Cursor::new("")).unwrap();
        assert_eq!(empty, v.bias_vector());

        let bias = bias_indices(&v);
        for (idx, val) in empty.raw_iter() {
            assert!(bias.contains(&idx));
            assert!(*val > 0.0);
        }
        // stop words and punctuation only
        assert_eq!(v.encode_str("the, and... of!"), v.bias_vector());
        assert_eq!(v.corpus_ref.get_doc_num(), 0);
    }

    #[test]
    fn global_counts_add_up_over_documents() {
        let v = vectorizer(VectorizerConfig::default());
        v.encode_document(Cursor::new("good movie, good")).unwrap();
        v.encode_document(Cursor::new("good grief, good")).unwrap();

        assert_eq!(v.corpus_ref.get_term_count("good"), 4);
        assert_eq!(v.corpus_ref.get_doc_num(), 2);
        assert_eq!(v.vocabulary_snapshot().get("good"), 4);
    }

    #[test]
    fn read_failure_leaves_corpus_untouched() {
        let v = vectorizer(VectorizerConfig::default());
        v.encode_str("good");

        let reader = BrokenReader(Cursor::new(b"good good\nbad".to_vec()));
        let err = v.encode_document(reader).unwrap_err();
        assert!(matches!(err, VectorizerError::StreamRead(_)));

        assert_eq!(v.corpus_ref.get_term_count("good"), 1);
        assert_eq!(v.corpus_ref.get_term_count("bad"), 0);
        assert_eq!(v.corpus_ref.get_doc_num(), 1);
    }

    #[test]
    fn missing_file_is_stream_error() {
        let v = vectorizer(VectorizerConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let err = v.encode_file(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, VectorizerError::StreamRead(_)));
    }

    #[test]
    fn encode_file_matches_encode_str() {
        let v = vectorizer(VectorizerConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "Loved it.\nWould watch again!").unwrap();

        assert_eq!(v.encode_file(&path).unwrap(), v.encode_str("Loved it.\nWould watch again!"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let corpus = Arc::new(Corpus::new());
        let err = HashingVectorizer::new(VectorizerConfig::default().with_dimension(0), corpus.clone()).unwrap_err();
        assert!(matches!(err, VectorizerError::Configuration(_)));
        let err = HashingVectorizer::new(VectorizerConfig::default().with_probes(0), corpus).unwrap_err();
        assert!(matches!(err, VectorizerError::Configuration(_)));
    }

    #[test]
    fn more_occurrences_never_weigh_less() {
        let v = vectorizer(VectorizerConfig::default().with_stop_words(Vec::<String>::new()));
        let loc = v.trace_word("great")[0];
        let mut prev = 0.0;
        for n in 1..20 {
            let text = vec!["great"; n].join(" ");
            let vec = v.encode_str(&text);
            let contribution = vec[loc.index] * loc.sign;
            let bias_part: f64 = bias_indices(&v)
                .iter()
                .filter(|&&i| i == loc.index)
                .count() as f64
                * loc.sign;
            let word_part = contribution - bias_part;
            assert!(word_part >= prev);
            assert!((word_part - word_weight(n as u64)).abs() < 1e-12);
            prev = word_part;
        }
    }

    #[test]
    fn batch_preserves_order_and_counts() {
        let v = vectorizer(VectorizerConfig::default());
        let docs: Vec<String> = (0..64).map(|i| format!("good doc{i} good")).collect();
        let readers: Vec<Cursor<Vec<u8>>> = docs.iter().map(|d| Cursor::new(d.clone().into_bytes())).collect();

        let results = v.encode_batch(readers);
        assert_eq!(results.len(), 64);

        let reference = vectorizer(VectorizerConfig::default());
        for (doc, res) in docs.iter().zip(results) {
            assert_eq!(res.unwrap(), reference.encode_str(doc));
        }
        assert_eq!(v.corpus_ref.get_term_count("good"), 128);
        assert_eq!(v.corpus_ref.get_doc_num(), 64);
    }

    #[test]
    fn shared_corpus_across_vectorizers() {
        let corpus = Arc::new(Corpus::new());
        let a = HashingVectorizer::new(VectorizerConfig::default(), corpus.clone()).unwrap();
        let b = HashingVectorizer::new(VectorizerConfig::default().with_namespace("title"), corpus.clone()).unwrap();
        a.encode_str("good good");
        b.encode_str("good good");
        assert_eq!(corpus.get_term_count("good"), 4);
    }

    #[test]
    fn rng_is_reproducible() {
        let v = vectorizer(VectorizerConfig::default().with_seed(7));
        let a: Vec<u32> = v.rng().sample_iter(rand::distributions::Standard).take(5).collect();
        let b: Vec<u32> = v.rng().sample_iter(rand::distributions::Standard).take(5).collect();
        assert_eq!(a, b);

        // hashing does not depend on the seed
        let w = vectorizer(VectorizerConfig::default().with_seed(8));
        assert_eq!(v.encode_str("seed independent"), w.encode_str("seed independent"));
    }
}
