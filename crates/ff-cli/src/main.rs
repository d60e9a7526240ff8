//! feedfilter CLI
//!
//! CLI tool for checking elements against the filters and inspecting keyword lists.

mod bench;
mod config;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ff_core::{parse_keyword_phrases, ElementDescriptor, FilterDispatcher, PatternIndex, SettingsStore};

use crate::config::SettingsConfig;

#[derive(Parser)]
#[command(name = "ff-cli")]
#[command(about = "feedfilter element checker and tools")]
struct Cli {
    /// Log filter decisions and index rebuilds
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide whether one element would be filtered
    Check {
        /// JSON settings file
        #[arg(short, long)]
        config: Option<String>,

        /// Component path
        #[arg(short, long)]
        path: String,

        /// Component identifier
        #[arg(long)]
        identifier: Option<String>,

        /// Conversion-context string
        #[arg(long, default_value = "")]
        context: String,

        /// Payload given inline as text
        #[arg(long, conflicts_with = "payload_file")]
        payload: Option<String>,

        /// Payload read from a file as raw bytes
        #[arg(long)]
        payload_file: Option<String>,
    },

    /// Parse a keyword phrase list and show what would be indexed
    Keywords {
        /// Phrase list file, one phrase per line
        #[arg(short, long)]
        input: String,
    },

    /// Time the dispatcher on synthetic elements
    Bench {
        /// JSON settings file (defaults to every toggle enabled)
        #[arg(short, long)]
        config: Option<String>,

        /// Decisions per thread
        #[arg(short, long, default_value_t = 200_000)]
        iterations: usize,

        /// Worker threads
        #[arg(short, long, default_value_t = 1)]
        threads: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            config,
            path,
            identifier,
            context,
            payload,
            payload_file,
        } => cmd_check(
            config.as_deref(),
            &path,
            identifier.as_deref(),
            &context,
            payload.as_deref(),
            payload_file.as_deref(),
        ),
        Commands::Keywords { input } => cmd_keywords(&input),
        Commands::Bench {
            config,
            iterations,
            threads,
        } => bench::run(config.as_deref(), iterations, threads),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub(crate) fn load_settings(config: Option<&str>) -> Result<SettingsStore, String> {
    match config {
        Some(path) => SettingsConfig::load(Path::new(path))
            .and_then(SettingsConfig::into_store)
            .map_err(|e| e.to_string()),
        None => Ok(SettingsStore::default()),
    }
}

fn cmd_check(
    config: Option<&str>,
    path: &str,
    identifier: Option<&str>,
    context: &str,
    payload: Option<&str>,
    payload_file: Option<&str>,
) -> Result<(), String> {
    let settings = load_settings(config)?;

    let payload = match (payload, payload_file) {
        (Some(text), _) => text.as_bytes().to_vec(),
        (None, Some(file)) => {
            fs::read(file).map_err(|e| format!("Failed to read '{}': {}", file, e))?
        }
        (None, None) => Vec::new(),
    };

    let dispatcher = FilterDispatcher::with_default_policies(Arc::new(settings));
    let element = ElementDescriptor {
        path,
        identifier,
        context,
        payload: &payload,
    };

    let filtered = dispatcher.is_filtered(&element);
    println!("{}", if filtered { "FILTER" } else { "ALLOW" });

    Ok(())
}

fn cmd_keywords(input: &str) -> Result<(), String> {
    let raw = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input, e))?;

    let parsed = parse_keyword_phrases(&raw);
    let index = PatternIndex::build(&parsed.keywords);

    println!("Keywords from '{}'", input);
    println!("  Variants:    {}", parsed.keywords.len());
    println!("  Rejected:    {}", parsed.rejected.len());
    println!(
        "  Index size:  {} bytes ({:.1} KB)",
        index.estimated_memory_size(),
        index.estimated_memory_size() as f64 / 1024.0
    );
    println!();

    for keyword in &parsed.keywords {
        println!("  + {keyword}");
    }
    for rejected in &parsed.rejected {
        println!("  - {rejected}");
    }

    Ok(())
}
