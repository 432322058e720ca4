//! Filters a JSON-lines message dump.
//!
//! Reads one raw message per line, runs each through the normalization
//! pipeline, and writes accepted records as JSON lines.
//!
//! ## Usage
//!
//! ```bash
//! # stdin to stdout
//! geosift < messages.jsonl > records.jsonl
//!
//! # custom stopword list, stricter minimum length
//! geosift --input messages.jsonl --output records.jsonl \
//!     --stopwords stopwords/generated.txt --min-token-chars 5
//!
//! # show each rejection
//! RUST_LOG=geosift_core=debug geosift -i messages.jsonl
//! ```
//!
//! ## Input
//!
//! ```text
//! {"text": "...", "geolocation": {"latitude": 40.44, "longitude": -79.99}, "author_language_code": "en"}
//! ```
//!
//! Blank lines are skipped. Lines that do not parse are logged and skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use geosift_core::{Ingestor, JsonLinesSink, NormalizationPipeline, StandardAnalyzer};
use geosift_types::{PipelineConfig, DEFAULT_LANGUAGE, DEFAULT_MIN_TOKEN_CHARS};

#[derive(Parser, Debug)]
#[command(author, version, about = "Filter and normalize geotagged messages")]
struct Args {
    /// JSON-lines message file (stdin if omitted)
    #[arg(short, long, env = "GEOSIFT_INPUT")]
    input: Option<PathBuf>,

    /// Where to write accepted records (stdout if omitted)
    #[arg(short, long, env = "GEOSIFT_OUTPUT")]
    output: Option<PathBuf>,

    /// Stopword list, one word per line (built-in English list if omitted)
    #[arg(long, env = "GEOSIFT_STOPWORDS")]
    stopwords: Option<PathBuf>,

    /// Minimum characters a token needs to be kept
    #[arg(long, env = "GEOSIFT_MIN_TOKEN_CHARS", default_value_t = DEFAULT_MIN_TOKEN_CHARS)]
    min_token_chars: usize,

    /// Author language code a message must declare
    #[arg(long, env = "GEOSIFT_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    language: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let analyzer = match &args.stopwords {
        Some(path) => StandardAnalyzer::from_path(path)?,
        None => StandardAnalyzer::default(),
    };
    info!(stopwords = analyzer.stopword_count(), "analyzer ready");

    let config = PipelineConfig {
        min_token_chars: args.min_token_chars,
        language: args.language.clone(),
    };
    let pipeline = NormalizationPipeline::new(config, analyzer)?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut ingestor = Ingestor::new(pipeline, JsonLinesSink::new(writer));

    ingestor
        .ingest_json_lines(reader)
        .context("reading input messages")?;
    ingestor.flush().context("flushing output")?;
    info!("{}", ingestor.stats());

    Ok(())
}
