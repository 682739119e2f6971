// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `readbench run` command - Benchmark read strategies against one file.

use std::path::Path;

use readbench_core::timing::format_duration;
use readbench_core::{
    run_suite, BenchConfig, BenchOutcome, ConfigLoader, ResourceTracker, SizeProbe, StrategyKind,
    SuiteEntry, TracingSink,
};
use serde::Serialize;

use crate::cpu_affinity;

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub chunk_count: Option<usize>,
    pub strategies: Vec<StrategyKind>,
    pub size_probe: Option<SizeProbe>,
    pub stream_buffer_size: Option<usize>,
    pub evict_page_cache: bool,
}

impl Overrides {
    fn apply(self, config: BenchConfig) -> BenchConfig {
        BenchConfig {
            chunk_count: self.chunk_count.unwrap_or(config.chunk_count),
            strategies: if self.strategies.is_empty() {
                config.strategies
            } else {
                self.strategies
            },
            size_probe: self.size_probe.unwrap_or(config.size_probe),
            stream_buffer_size: self.stream_buffer_size.unwrap_or(config.stream_buffer_size),
            evict_page_cache: self.evict_page_cache || config.evict_page_cache,
        }
    }
}

/// One strategy's line in the JSON report.
#[derive(Debug, Serialize)]
struct ReportEntry<'a> {
    strategy: StrategyKind,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<&'a BenchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a SuiteEntry> for ReportEntry<'a> {
    fn from(entry: &'a SuiteEntry) -> Self {
        let (outcome, error) = match &entry.result {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            strategy: entry.strategy,
            passed: entry.passed(),
            outcome,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    file: String,
    chunk_count: usize,
    results: Vec<ReportEntry<'a>>,
}

pub fn execute(
    config_path: Option<&Path>,
    file: &Path,
    overrides: Overrides,
    pin_cpu: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = match config_path {
        Some(path) => ConfigLoader::load_file(path)?,
        None => BenchConfig::default(),
    };
    let config = overrides.apply(base).validate()?;

    if let Some(cpu) = pin_cpu {
        cpu_affinity::pin_current_thread(cpu)?;
    }

    tracing::info!(
        file = %file.display(),
        chunk_count = config.chunk_count,
        evict_page_cache = config.evict_page_cache,
        "Running benchmarks"
    );

    let tracker = ResourceTracker::new();
    let entries = run_suite(file, &config, &tracker, &TracingSink);

    if json {
        let report = Report {
            file: file.display().to_string(),
            chunk_count: config.chunk_count,
            results: entries.iter().map(ReportEntry::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(file, config.chunk_count, &entries);
    }

    if !tracker.is_idle() {
        tracing::error!(
            open_handles = tracker.open_handles(),
            live_mappings = tracker.live_mappings(),
            "Resources still held after suite"
        );
    }

    let failed = entries.iter().filter(|e| !e.passed()).count();
    if failed > 0 {
        tracing::error!(failed = failed, total = entries.len(), "Benchmark suite failed");
        std::process::exit(1);
    }

    Ok(())
}

fn print_table(file: &Path, chunk_count: usize, entries: &[SuiteEntry]) {
    println!("File:   {}", file.display());
    println!("Chunks: {}", chunk_count);
    println!();
    println!(
        "{:<28} {:>12} {:>12}  {}",
        "STRATEGY", "CHUNKED", "WHOLE", "RESULT"
    );
    println!("{}", "-".repeat(66));

    for entry in entries {
        match &entry.result {
            Ok(outcome) => {
                let verdict = if outcome.identical() {
                    "✓ identical".to_string()
                } else {
                    match outcome.equivalence.first_mismatch {
                        Some(offset) => format!("✗ differ at {}", offset),
                        None => "✗ length differs".to_string(),
                    }
                };
                println!(
                    "{:<28} {:>12} {:>12}  {}",
                    outcome.label,
                    format_duration(outcome.chunked_elapsed),
                    format_duration(outcome.whole_elapsed),
                    verdict
                );
            }
            Err(e) => {
                println!("{:<28} {:>12} {:>12}  ✗ {}", entry.strategy, "-", "-", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = Overrides {
            chunk_count: Some(7),
            strategies: vec![StrategyKind::RawDescriptor],
            size_probe: Some(SizeProbe::SeekEnd),
            stream_buffer_size: None,
            evict_page_cache: true,
        };

        let config = overrides.apply(BenchConfig::default());
        assert_eq!(config.chunk_count, 7);
        assert_eq!(config.strategies, vec![StrategyKind::RawDescriptor]);
        assert_eq!(config.size_probe, SizeProbe::SeekEnd);
        assert_eq!(
            config.stream_buffer_size,
            BenchConfig::default().stream_buffer_size
        );
        assert!(config.evict_page_cache);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let base = BenchConfig {
            chunk_count: 42,
            evict_page_cache: true,
            ..BenchConfig::default()
        };
        let config = Overrides::default().apply(base.clone());
        assert_eq!(config, base);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = Overrides {
            chunk_count: Some(0),
            ..Overrides::default()
        };
        assert!(overrides.apply(BenchConfig::default()).validate().is_err());
    }

    #[test]
    fn test_report_entry_from_failure() {
        let entry = SuiteEntry {
            strategy: StrategyKind::MemoryMap,
            result: Err(readbench_core::ReadError::InvalidChunkCount {
                chunk_count: 5,
                total_size: 2,
            }
            .into()),
        };
        let report = ReportEntry::from(&entry);
        assert!(!report.passed);
        assert!(report.outcome.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["strategy"], "memory_map");
        assert!(json.get("outcome").is_none());
        assert!(json["error"].as_str().is_some());
    }
}
