use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::Parser;
use hashing_vectorizer::{Corpus, FeatureVector, HashingVectorizer, VectorizerConfig, VocabularySnapshot};
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hashing-vectorizer")]
#[command(version, about = "Encode a directory of documents into hashed feature vectors", long_about = None)]
struct Cli {
    /// Directory of UTF-8 documents (regular files directly inside it)
    #[arg(short, long)]
    docs: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the vector dimension
    #[arg(long)]
    dimension: Option<usize>,

    /// Override the number of hash probes
    #[arg(long)]
    probes: Option<usize>,

    /// Override the shuffle seed
    #[arg(long)]
    seed: Option<u64>,

    /// Encode at most this many documents
    #[arg(long)]
    limit: Option<usize>,

    /// Number of most frequent terms to report
    #[arg(long, default_value = "20")]
    top: usize,

    /// Write vectors as JSON lines
    #[arg(long)]
    vectors_out: Option<PathBuf>,

    /// Write the vocabulary (`.cbor` for CBOR, JSON otherwise)
    #[arg(long)]
    vocab_out: Option<PathBuf>,
}

#[derive(Serialize)]
struct EncodedDoc<'a> {
    doc: &'a str,
    vector: &'a FeatureVector,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let program_start = Instant::now();

    let config = load_config(&cli)?;
    let corpus = Arc::new(Corpus::new());
    let vectorizer = HashingVectorizer::new(config, Arc::clone(&corpus)).context("failed to build vectorizer")?;

    let files = collect_files(&cli.docs, &vectorizer, cli.limit)?;
    if files.is_empty() {
        warn!(dir = %cli.docs.display(), "no files found in directory");
        return Ok(());
    }
    info!(
        files = files.len(),
        threads = rayon::current_num_threads(),
        dimension = vectorizer.dimension(),
        probes = vectorizer.config().probes,
        "encoding documents"
    );

    let load_start = Instant::now();
    let results: Vec<_> = files
        .par_iter()
        .map(|path| (path, vectorizer.encode_file(path)))
        .collect();

    let mut encoded = Vec::with_capacity(results.len());
    let mut failed = 0usize;
    for (path, res) in results {
        match res {
            Ok(vector) => encoded.push((doc_key(path), vector)),
            Err(e) => {
                failed += 1;
                warn!(path = %path.display(), error = %e, "skipped document");
            }
        }
    }
    info!(
        encoded = encoded.len(),
        failed,
        elapsed_ms = load_start.elapsed().as_secs_f64() * 1000.0,
        "encoding done"
    );

    if let Some(out) = &cli.vectors_out {
        write_vectors(out, &encoded)?;
        info!(path = %out.display(), "wrote vectors");
    }

    let snapshot = vectorizer.vocabulary_snapshot();
    print_report(&snapshot, encoded.len(), failed, cli.top);

    if let Some(out) = &cli.vocab_out {
        write_vocabulary(out, &snapshot)?;
        info!(path = %out.display(), "wrote vocabulary");
    }

    info!(total_ms = program_start.elapsed().as_secs_f64() * 1000.0, "done");
    Ok(())
}

/// Config file first, then command-line overrides
fn load_config(cli: &Cli) -> Result<VectorizerConfig> {
    let mut config = match &cli.config {
        Some(path) => VectorizerConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => VectorizerConfig::default(),
    };
    if let Some(dimension) = cli.dimension {
        config = config.with_dimension(dimension);
    }
    if let Some(probes) = cli.probes {
        config = config.with_probes(probes);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    Ok(config)
}

/// Regular files directly under `dir`, in a seeded shuffled order
fn collect_files(dir: &Path, vectorizer: &HashingVectorizer, limit: Option<usize>) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    // sort first so the shuffle only depends on the seed
    files.sort();
    files.shuffle(&mut vectorizer.rng());
    if let Some(limit) = limit {
        files.truncate(limit);
    }
    Ok(files)
}

fn doc_key(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn write_vectors(out: &Path, encoded: &[(String, FeatureVector)]) -> Result<()> {
    let file = File::create(out).with_context(|| format!("failed to create {}", out.display()))?;
    let mut writer = BufWriter::new(file);
    for (doc, vector) in encoded {
        let line = serde_json::to_string(&EncodedDoc { doc, vector })?;
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

fn write_vocabulary(out: &Path, snapshot: &VocabularySnapshot) -> Result<()> {
    let bytes = if out.extension().is_some_and(|ext| ext == "cbor") {
        snapshot.to_cbor().context("failed to encode vocabulary as CBOR")?
    } else {
        snapshot.to_json().context("failed to encode vocabulary as JSON")?.into_bytes()
    };
    fs::write(out, bytes).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}

fn print_report(snapshot: &VocabularySnapshot, encoded: usize, failed: usize, top: usize) {
    println!("documents\t{encoded}");
    println!("failed\t{failed}");
    println!("vocabulary\t{}", snapshot.len());
    println!("tokens\t{}", snapshot.token_total);
    for (term, count) in snapshot.top(top) {
        println!("{count}\t{term}");
    }
}
