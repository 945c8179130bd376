//! Shipyard block-packing CLI.
//!
//! Loads a carrier + block-batch TOML config, runs the packing search, and
//! reports (and caches) the resulting placement record.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blockpack::{persistence, CarrierConfig};

/// Packs blocks onto a carrier deck and reports the resulting placement.
#[derive(Parser)]
#[command(name = "blockpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the packing search and print (and cache) a placement record.
    Pack {
        /// Path to a carrier config TOML file.
        config: PathBuf,
        /// Directory to read/write the placement-record cache.
        #[arg(long, default_value = ".blockpack-cache")]
        cache_dir: PathBuf,
        /// Print the record as JSON instead of a text report.
        #[arg(long)]
        json: bool,
        /// Skip the cache entirely: always re-run the search and re-save.
        #[arg(long)]
        no_cache: bool,
    },
    /// Reprint a previously cached placement record without re-running the search.
    Report {
        /// Path to a carrier config TOML file.
        config: PathBuf,
        /// Directory the placement-record cache lives in.
        #[arg(long, default_value = ".blockpack-cache")]
        cache_dir: PathBuf,
    },
    /// Parse and validate a config file without running the engine.
    Validate {
        /// Path to a carrier config TOML file.
        config: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Pack {
            config,
            cache_dir,
            json,
            no_cache,
        } => run_pack(&config, &cache_dir, json, no_cache),
        Command::Report { config, cache_dir } => run_report(&config, &cache_dir),
        Command::Validate { config } => run_validate(&config),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_pack(config_path: &PathBuf, cache_dir: &Path, json: bool, no_cache: bool) -> blockpack::Result<()> {
    let config = CarrierConfig::load(config_path)?;
    let key = persistence::cache_key(&config)?;

    let record = if !no_cache {
        match persistence::load(cache_dir, &key)? {
            Some(record) => {
                tracing::info!(key, "cache hit");
                record
            }
            None => {
                tracing::info!(key, "cache miss, running search");
                let record = blockpack::run(&config)?;
                persistence::save(cache_dir, &key, &record)?;
                record
            }
        }
    } else {
        let record = blockpack::run(&config)?;
        persistence::save(cache_dir, &key, &record)?;
        record
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record).unwrap());
    } else {
        print!("{}", record.to_report());
    }
    Ok(())
}

fn run_report(config_path: &PathBuf, cache_dir: &Path) -> blockpack::Result<()> {
    let config = CarrierConfig::load(config_path)?;
    let key = persistence::cache_key(&config)?;
    match persistence::load(cache_dir, &key)? {
        Some(record) => {
            print!("{}", record.to_report());
            Ok(())
        }
        None => {
            eprintln!("no cached placement record for this config; run 'blockpack pack' first");
            std::process::exit(1);
        }
    }
}

fn run_validate(config_path: &PathBuf) -> blockpack::Result<()> {
    CarrierConfig::load(config_path)?;
    println!("ok");
    Ok(())
}
