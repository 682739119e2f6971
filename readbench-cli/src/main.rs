// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! readbench CLI
//!
//! Command-line driver for the readbench read strategy benchmarks.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use readbench_core::{SizeProbe, StrategyKind};
use tracing_subscriber::EnvFilter;

mod commands;
mod cpu_affinity;

/// readbench - Compare ways of reading a file into memory
#[derive(Parser)]
#[command(name = "readbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Benchmark read strategies against a file
    Run {
        /// File to read
        file: PathBuf,

        /// Number of chunks for the shuffled chunked read
        #[arg(short = 'n', long)]
        chunks: Option<usize>,

        /// Strategies to run, comma separated (buffer, mmap, stream, raw)
        #[arg(short, long, value_delimiter = ',')]
        strategy: Vec<StrategyKind>,

        /// How the raw descriptor strategy sizes the file (stat, seek_end)
        #[arg(long)]
        size_probe: Option<SizeProbe>,

        /// Buffer capacity of the stream strategy in bytes
        #[arg(long)]
        stream_buffer_size: Option<usize>,

        /// Drop the file's cached pages before each strategy
        #[arg(long)]
        evict: bool,

        /// Pin the benchmark thread to this CPU
        #[arg(long)]
        pin_cpu: Option<usize>,

        /// Print results as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Write a file of random printable ASCII
    Generate {
        /// Output path
        #[arg(default_value = commands::generate::DEFAULT_FILE_NAME)]
        output: PathBuf,

        /// Size in MiB
        #[arg(short, long, default_value_t = commands::generate::DEFAULT_SIZE_MIB)]
        size_mib: usize,
    },

    /// Copy a file into a working directory for benchmarking
    Stage {
        /// File to copy
        source: PathBuf,

        /// Destination directory
        dir: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging on stderr so stdout stays machine readable
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Run {
            file,
            chunks,
            strategy,
            size_probe,
            stream_buffer_size,
            evict,
            pin_cpu,
            json,
        } => commands::run::execute(
            cli.config.as_deref(),
            &file,
            commands::run::Overrides {
                chunk_count: chunks,
                strategies: strategy,
                size_probe,
                stream_buffer_size,
                evict_page_cache: evict,
            },
            pin_cpu,
            json,
        ),
        Commands::Generate { output, size_mib } => commands::generate::execute(&output, size_mib),
        Commands::Stage { source, dir } => commands::stage::execute(&source, &dir),
        Commands::Validate { file } => commands::validate::execute(&file),
    }
}
