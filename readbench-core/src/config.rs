// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict validation.
//!
//! The whole file is optional: every field has a default, and the CLI can
//! override any of them. Any invalid field results in a `ConfigError` before
//! a single byte is read.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{BenchError, BenchResult, ConfigError};
use crate::strategy::{SizeProbe, StrategyKind, DEFAULT_STREAM_BUFFER_SIZE};

/// Upper bound on the chunk count.
pub const MAX_CHUNK_COUNT: usize = 1_000_000;
/// Smallest accepted stream buffer.
pub const MIN_STREAM_BUFFER_SIZE: usize = 512;
/// Largest accepted stream buffer (64 MB).
pub const MAX_STREAM_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Raw benchmark section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBenchmarkConfig {
    #[serde(default = "default_chunk_count")]
    chunk_count: usize,
    #[serde(default = "default_strategies")]
    strategies: Vec<String>,
    #[serde(default = "default_size_probe")]
    size_probe: String,
    #[serde(default = "default_stream_buffer_size")]
    stream_buffer_size: usize,
    #[serde(default)]
    evict_page_cache: bool,
}

fn default_chunk_count() -> usize {
    100
}

fn default_strategies() -> Vec<String> {
    StrategyKind::ALL.iter().map(|k| k.to_string()).collect()
}

fn default_size_probe() -> String {
    SizeProbe::Stat.to_string()
}

fn default_stream_buffer_size() -> usize {
    DEFAULT_STREAM_BUFFER_SIZE
}

impl Default for RawBenchmarkConfig {
    fn default() -> Self {
        Self {
            chunk_count: default_chunk_count(),
            strategies: default_strategies(),
            size_probe: default_size_probe(),
            stream_buffer_size: default_stream_buffer_size(),
            evict_page_cache: false,
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    benchmark: RawBenchmarkConfig,
}

/// Validated benchmark configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Number of chunks the source is split into.
    pub chunk_count: usize,
    /// Strategies to run, in order, without duplicates.
    pub strategies: Vec<StrategyKind>,
    /// How the raw descriptor strategy determines the file size.
    pub size_probe: SizeProbe,
    /// Capacity of the stream strategy's buffer.
    pub stream_buffer_size: usize,
    /// Drop the file's cached pages before each strategy runs.
    pub evict_page_cache: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            chunk_count: default_chunk_count(),
            strategies: StrategyKind::ALL.to_vec(),
            size_probe: SizeProbe::Stat,
            stream_buffer_size: DEFAULT_STREAM_BUFFER_SIZE,
            evict_page_cache: false,
        }
    }
}

impl BenchConfig {
    /// Re-check invariants after CLI overrides were applied.
    pub fn validate(self) -> BenchResult<Self> {
        validate_chunk_count(self.chunk_count)?;
        validate_stream_buffer_size(self.stream_buffer_size)?;
        let strategies = validate_strategies(self.strategies)?;
        Ok(Self { strategies, ..self })
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> BenchResult<BenchConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| BenchError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> BenchResult<BenchConfig> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Self::validate(raw.benchmark)
    }

    fn validate(raw: RawBenchmarkConfig) -> BenchResult<BenchConfig> {
        validate_chunk_count(raw.chunk_count)?;
        validate_stream_buffer_size(raw.stream_buffer_size)?;

        let strategies = raw
            .strategies
            .iter()
            .map(|name| name.parse::<StrategyKind>())
            .collect::<Result<Vec<_>, _>>()?;
        let strategies = validate_strategies(strategies)?;

        let size_probe = raw.size_probe.parse::<SizeProbe>()?;

        Ok(BenchConfig {
            chunk_count: raw.chunk_count,
            strategies,
            size_probe,
            stream_buffer_size: raw.stream_buffer_size,
            evict_page_cache: raw.evict_page_cache,
        })
    }
}

fn validate_chunk_count(chunk_count: usize) -> Result<(), ConfigError> {
    if chunk_count == 0 || chunk_count > MAX_CHUNK_COUNT {
        return Err(ConfigError::InvalidFieldValue {
            field: "chunk_count",
            value: chunk_count.to_string(),
            reason: format!("Must be between 1 and {}", MAX_CHUNK_COUNT),
        });
    }
    Ok(())
}

fn validate_stream_buffer_size(size: usize) -> Result<(), ConfigError> {
    if !(MIN_STREAM_BUFFER_SIZE..=MAX_STREAM_BUFFER_SIZE).contains(&size) {
        return Err(ConfigError::InvalidFieldValue {
            field: "stream_buffer_size",
            value: size.to_string(),
            reason: format!(
                "Must be between {} and {} bytes",
                MIN_STREAM_BUFFER_SIZE, MAX_STREAM_BUFFER_SIZE
            ),
        });
    }
    Ok(())
}

fn validate_strategies(strategies: Vec<StrategyKind>) -> Result<Vec<StrategyKind>, ConfigError> {
    if strategies.is_empty() {
        return Err(ConfigError::InvalidFieldValue {
            field: "strategies",
            value: "[]".to_string(),
            reason: "At least one strategy must be selected".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for kind in &strategies {
        if !seen.insert(*kind) {
            return Err(ConfigError::InvalidFieldValue {
                field: "strategies",
                value: kind.to_string(),
                reason: "Strategy listed more than once".to_string(),
            });
        }
    }
    Ok(strategies)
}
