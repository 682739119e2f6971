// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Observability collaborator for benchmark runs.
//!
//! The suite reports timings and verdicts through a [`BenchSink`] instead of
//! logging directly, so hosts can route results wherever they need them.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::strategy::StrategyKind;
use crate::timing::{format_duration, ReadMode};
use crate::verify::Equivalence;

/// A completed timed read.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingEvent {
    pub strategy: StrategyKind,
    pub label: String,
    pub mode: ReadMode,
    pub bytes: usize,
    pub elapsed: Duration,
}

/// Outcome of comparing a chunked read against the whole read.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyEvent {
    pub strategy: StrategyKind,
    pub label: String,
    pub chunk_count: usize,
    pub equivalence: Equivalence,
}

/// Receiver of benchmark events.
pub trait BenchSink {
    fn on_timed(&self, event: &TimingEvent);
    fn on_verified(&self, event: &VerifyEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl BenchSink for TracingSink {
    fn on_timed(&self, event: &TimingEvent) {
        tracing::info!(
            strategy = %event.label,
            mode = %event.mode,
            bytes = event.bytes,
            elapsed = %format_duration(event.elapsed),
            "Time taken to copy buffer"
        );
    }

    fn on_verified(&self, event: &VerifyEvent) {
        let eq = &event.equivalence;
        if eq.identical {
            tracing::info!(
                strategy = %event.label,
                chunks = event.chunk_count,
                "Buffers are identical"
            );
        } else {
            tracing::error!(
                strategy = %event.label,
                chunks = event.chunk_count,
                chunked_len = eq.chunked_len,
                whole_len = eq.whole_len,
                chunked_crc = %format!("{:#010x}", eq.chunked_checksum),
                whole_crc = %format!("{:#010x}", eq.whole_checksum),
                first_mismatch = ?eq.first_mismatch,
                "Buffers differ"
            );
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl BenchSink for NullSink {
    fn on_timed(&self, _event: &TimingEvent) {}
    fn on_verified(&self, _event: &VerifyEvent) {}
}

/// Event captured by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Timed(TimingEvent),
    Verified(VerifyEvent),
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: SinkEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl BenchSink for RecordingSink {
    fn on_timed(&self, event: &TimingEvent) {
        self.push(SinkEvent::Timed(event.clone()));
    }

    fn on_verified(&self, event: &VerifyEvent) {
        self.push(SinkEvent::Verified(event.clone()));
    }
}
