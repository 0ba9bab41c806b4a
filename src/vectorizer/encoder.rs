use xxhash_rust::xxh64::xxh64;

use crate::error::{Result, VectorizerError};
use crate::vectorizer::FeatureVector;

const WORD_SEED: u64 = 0x9e37_79b9_7f4a_7c15;
const SIGN_SEED: u64 = 0xc2b2_ae3d_27d4_eb4f;
const CONSTANT_SEED: u64 = 0x1656_67b1_9e37_79f9;

/// Weight of a word seen `count` times in a document: `ln(1 + count)`
#[inline]
pub fn word_weight(count: u64) -> f64 {
    (count as f64).ln_1p()
}

/// One probe of a hashed feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashedLocation {
    pub index: usize,
    /// +1.0 or -1.0
    pub sign: f64,
}

/// Maps a named feature onto coordinates of a fixed-size vector.
///
/// Implementations must be pure: the same `(original_form, probe, dimension)`
/// always gives the same location.
pub trait FeatureEncoder: Send + Sync {
    /// namespace of the features this encoder writes
    fn name(&self) -> &str;

    fn probes(&self) -> usize;

    /// Location of `original_form` for one probe.
    ///
    /// # Panics
    /// if `dimension == 0` or `probe >= self.probes()`
    fn location(&self, original_form: &str, probe: usize, dimension: usize) -> HashedLocation;

    /// Add `sign * weight` at every probe location.
    /// A zero-length vector has no coordinates and is left as is.
    fn add_to_vector(&self, original_form: &str, weight: f64, vector: &mut FeatureVector) {
        let dimension = vector.len();
        if dimension == 0 {
            return;
        }
        for probe in 0..self.probes() {
            let loc = self.location(original_form, probe, dimension);
            vector.add_at(loc.index, loc.sign * weight);
        }
    }

    /// All probe locations, for tracing where a feature lands
    ///
    /// # Panics
    /// if `dimension == 0`
    fn locations(&self, original_form: &str, dimension: usize) -> Vec<HashedLocation> {
        (0..self.probes())
            .map(|probe| self.location(original_form, probe, dimension))
            .collect()
    }

    /// Readable feature name, e.g. `body:good`
    fn as_string(&self, original_form: &str) -> String {
        format!("{}:{}", self.name(), original_form)
    }
}

fn check_probes(probes: usize) -> Result<()> {
    if probes == 0 {
        return Err(VectorizerError::Configuration("probes must be at least 1".into()));
    }
    Ok(())
}

/// Hashed word encoder.
///
/// The coordinate of probe `p` is `xxh64(word, xxh64(name, WORD_SEED + p)) % dimension`.
/// Its sign comes from the top bit of a second hash chained from `SIGN_SEED + p`,
/// so colliding words cancel out on average instead of piling up.
/// Both namespace hashes are computed once per probe at construction.
#[derive(Debug, Clone)]
pub struct WordEncoder {
    name: String,
    /// (index seed, sign seed) per probe
    probe_seeds: Vec<(u64, u64)>,
}

impl WordEncoder {
    pub fn new(name: impl Into<String>, probes: usize) -> Result<Self> {
        check_probes(probes)?;
        let name = name.into();
        let probe_seeds = (0..probes as u64)
            .map(|p| {
                (
                    xxh64(name.as_bytes(), WORD_SEED.wrapping_add(p)),
                    xxh64(name.as_bytes(), SIGN_SEED.wrapping_add(p)),
                )
            })
            .collect();
        Ok(Self { name, probe_seeds })
    }
}

impl FeatureEncoder for WordEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn probes(&self) -> usize {
        self.probe_seeds.len()
    }

    #[inline]
    fn location(&self, original_form: &str, probe: usize, dimension: usize) -> HashedLocation {
        let (index_seed, sign_seed) = self.probe_seeds[probe];
        let bytes = original_form.as_bytes();
        let h = xxh64(bytes, index_seed);
        let g = xxh64(bytes, sign_seed);
        HashedLocation {
            index: (h % dimension as u64) as usize,
            sign: if g >> 63 == 0 { 1.0 } else { -1.0 },
        }
    }
}

/// Constant-valued feature (the intercept).
/// Lands on the same coordinates whatever the input, always with sign +1.
#[derive(Debug, Clone)]
pub struct ConstantEncoder {
    name: String,
    probe_hashes: Vec<u64>,
}

impl ConstantEncoder {
    pub fn new(name: impl Into<String>, probes: usize) -> Result<Self> {
        check_probes(probes)?;
        let name = name.into();
        let probe_hashes = (0..probes as u64)
            .map(|p| xxh64(name.as_bytes(), CONSTANT_SEED.wrapping_add(p)))
            .collect();
        Ok(Self { name, probe_hashes })
    }

    /// Add the constant feature with weight 1
    #[inline]
    pub fn add_constant(&self, vector: &mut FeatureVector) {
        self.add_to_vector("", 1.0, vector);
    }
}

impl FeatureEncoder for ConstantEncoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn probes(&self) -> usize {
        self.probe_hashes.len()
    }

    #[inline]
    fn location(&self, _original_form: &str, probe: usize, dimension: usize) -> HashedLocation {
        HashedLocation {
            index: (self.probe_hashes[probe] % dimension as u64) as usize,
            sign: 1.0,
        }
    }

    fn as_string(&self, _original_form: &str) -> String {
        self.name.clone()
    }
}
