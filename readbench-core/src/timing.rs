// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Timed execution of a single read.
//!
//! The clock starts once the source is ready to be read and stops as soon as
//! the destination buffer is fully populated. Releasing the source happens
//! after the stop timestamp, for every strategy alike.
//!
//! [`timed`] only measures. [`Benchmark`](crate::suite::Benchmark) wraps it
//! and reports each measurement to the run's sink.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::ReadError;

/// Bytes produced by one read together with how long it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResult {
    pub buffer: Vec<u8>,
    pub elapsed: Duration,
}

impl ReadResult {
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Elapsed time in fractional milliseconds.
    pub fn millis(&self) -> f64 {
        as_millis_f64(self.elapsed)
    }
}

/// Whether a read covered the source in one go or chunk by chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ReadMode {
    Whole,
    Chunked { chunk_count: usize },
}

impl std::fmt::Display for ReadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadMode::Whole => write!(f, "whole"),
            ReadMode::Chunked { chunk_count } => write!(f, "chunked/{}", chunk_count),
        }
    }
}

/// Run `op` between two monotonic clock readings.
///
/// Elapsed time is only produced on success; a failed read has no timing.
pub fn timed<F>(op: F) -> Result<ReadResult, ReadError>
where
    F: FnOnce() -> Result<Vec<u8>, ReadError>,
{
    let start = Instant::now();
    let buffer = op()?;
    let elapsed = start.elapsed();
    Ok(ReadResult { buffer, elapsed })
}

/// Convert a duration to fractional milliseconds.
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

/// Format a duration in human-readable form (auto-selects ns/μs/ms/s).
pub fn format_duration(duration: Duration) -> String {
    let ns = duration.as_nanos();
    if ns < 1_000 {
        format!("{}ns", ns)
    } else if ns < 1_000_000 {
        format!("{:.2}μs", ns as f64 / 1_000.0)
    } else if ns < 1_000_000_000 {
        format!("{:.3}ms", ns as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", ns as f64 / 1_000_000_000.0)
    }
}
