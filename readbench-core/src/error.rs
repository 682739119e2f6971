// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for readbench.
//!
//! Explicit enum error types, no `Box<dyn Error>` and no `anyhow::Result`
//! in the library. A failed read invalidates the whole benchmark run: there
//! is no variant that carries partial data.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the readbench library.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // =========================================================================
    // Read Errors - Reported, Never Retried
    // =========================================================================
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of a single read strategy invocation.
///
/// Local I/O failures are treated as non-transient: every variant aborts the
/// invocation and is surfaced to the caller as-is.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to determine size of {path}: {source}")]
    StatFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Short read at offset {offset}: expected {expected} bytes, got {delivered}")]
    ShortRead {
        offset: usize,
        expected: usize,
        delivered: usize,
    },

    #[error("Read failed at offset {offset}: {source}")]
    ReadFailed {
        offset: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid chunk count {chunk_count} for {total_size} bytes: must be between 1 and the total size")]
    InvalidChunkCount {
        chunk_count: usize,
        total_size: usize,
    },

    #[error("Visit order has {actual} entries but the plan has {expected} chunks")]
    OrderMismatch { expected: usize, actual: usize },

    #[error("Invalid permutation: {reason}")]
    InvalidPermutation { reason: String },
}

/// Configuration errors prevent a benchmark from starting at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("Unknown size probe: {name}")]
    UnknownSizeProbe { name: String },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;
