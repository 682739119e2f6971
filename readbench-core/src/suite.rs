// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark runs.
//!
//! A run is one independent transaction: open the source, choose the plan
//! and visit order, time the reads, verify, then release. Strategies in a
//! suite run strictly one after another; overlapping them would let page
//! cache, read-ahead and descriptor contention leak between measurements.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::cache::evict_page_cache;
use crate::config::BenchConfig;
use crate::error::{BenchError, ReadError};
use crate::permutation::Permutation;
use crate::plan::ChunkPlan;
use crate::resources::ResourceTracker;
use crate::sink::{BenchSink, TimingEvent, VerifyEvent};
use crate::strategy::{
    BufferStrategy, ByteSource, MemoryMapStrategy, RawDescriptorStrategy, ReadStrategy,
    StrategyKind, StreamSeekStrategy,
};
use crate::timing::{as_millis_f64, timed, ReadMode, ReadResult};
use crate::verify::{compare, Equivalence};

/// Result of one chunked-vs-whole run of a strategy.
#[derive(Debug, Clone, Serialize)]
pub struct BenchOutcome {
    pub strategy: StrategyKind,
    pub label: String,
    pub total_size: usize,
    pub chunk_count: usize,
    #[serde(skip)]
    pub chunked_elapsed: Duration,
    #[serde(skip)]
    pub whole_elapsed: Duration,
    pub chunked_ms: f64,
    pub whole_ms: f64,
    pub equivalence: Equivalence,
}

impl BenchOutcome {
    /// The equivalence verdict.
    pub fn identical(&self) -> bool {
        self.equivalence.identical
    }
}

/// Drives one strategy and reports to a sink.
///
/// This is the timed execution wrapper: [`timed`] and [`compare`] are pure,
/// and every timing and verdict reaches the [`BenchSink`] through here.
pub struct Benchmark<'a> {
    strategy: &'a dyn ReadStrategy,
    sink: &'a dyn BenchSink,
    evict: Option<&'a Path>,
}

impl<'a> Benchmark<'a> {
    pub fn new(strategy: &'a dyn ReadStrategy, sink: &'a dyn BenchSink) -> Self {
        Self {
            strategy,
            sink,
            evict: None,
        }
    }

    /// Drop the cached pages of `path` before each timed invocation.
    pub fn evict_page_cache(mut self, path: &'a Path) -> Self {
        self.evict = Some(path);
        self
    }

    /// Time a whole-file read.
    pub fn read_whole(&self) -> Result<ReadResult, ReadError> {
        let mut source = self.strategy.open()?;
        let result = self.timed_whole(source.as_mut());
        drop(source);
        result
    }

    /// Time a chunked read in a freshly drawn random order.
    pub fn read_chunked(&self, chunk_count: usize) -> Result<ReadResult, ReadError> {
        let mut source = self.strategy.open()?;
        let plan = ChunkPlan::new(source.size()?, chunk_count)?;
        let order = Permutation::random(chunk_count);
        self.timed_chunked(source.as_mut(), &plan, &order)
    }

    /// Time a chunked read in the given order.
    pub fn read_chunked_in(&self, order: &Permutation) -> Result<ReadResult, ReadError> {
        let mut source = self.strategy.open()?;
        let plan = ChunkPlan::new(source.size()?, order.len())?;
        self.timed_chunked(source.as_mut(), &plan, order)
    }

    /// Full run: random-order chunked read, canonical whole read, verdict.
    ///
    /// The reported whole-read timing comes from its own invocation on a
    /// freshly opened source. The whole read used for the verdict shares the
    /// chunked read's source and is not timed.
    pub fn run(&self, chunk_count: usize) -> Result<BenchOutcome, ReadError> {
        self.evict();
        let mut source = self.strategy.open()?;
        let total_size = source.size()?;
        let plan = ChunkPlan::new(total_size, chunk_count)?;
        let order = Permutation::random(chunk_count);

        tracing::debug!(
            strategy = %self.strategy.label(),
            total_size = total_size,
            chunk_count = chunk_count,
            piece_size = plan.piece_size(),
            last_piece_size = plan.last_piece_size(),
            "Split into pieces"
        );

        let chunked = self.timed_chunked(source.as_mut(), &plan, &order)?;
        let canonical = timed(|| source.read_whole())?;
        drop(source);

        self.evict();
        let whole = self.read_whole()?;

        let equivalence = compare(&chunked, &canonical);
        self.sink.on_verified(&VerifyEvent {
            strategy: self.strategy.kind(),
            label: self.strategy.label(),
            chunk_count,
            equivalence,
        });

        Ok(BenchOutcome {
            strategy: self.strategy.kind(),
            label: self.strategy.label(),
            total_size,
            chunk_count,
            chunked_elapsed: chunked.elapsed,
            whole_elapsed: whole.elapsed,
            chunked_ms: as_millis_f64(chunked.elapsed),
            whole_ms: as_millis_f64(whole.elapsed),
            equivalence,
        })
    }

    fn timed_whole(&self, source: &mut dyn ByteSource) -> Result<ReadResult, ReadError> {
        let result = timed(|| source.read_whole())?;
        self.report(ReadMode::Whole, &result);
        Ok(result)
    }

    fn timed_chunked(
        &self,
        source: &mut dyn ByteSource,
        plan: &ChunkPlan,
        order: &Permutation,
    ) -> Result<ReadResult, ReadError> {
        let result = timed(|| source.read_chunked(plan, order))?;
        self.report(
            ReadMode::Chunked {
                chunk_count: plan.chunk_count(),
            },
            &result,
        );
        Ok(result)
    }

    fn evict(&self) {
        if let Some(path) = self.evict {
            if let Err(e) = evict_page_cache(path) {
                tracing::warn!(path = %path.display(), error = %e, "Failed to evict page cache");
            }
        }
    }

    fn report(&self, mode: ReadMode, result: &ReadResult) {
        self.sink.on_timed(&TimingEvent {
            strategy: self.strategy.kind(),
            label: self.strategy.label(),
            mode,
            bytes: result.len(),
            elapsed: result.elapsed,
        });
    }
}

/// Construct the strategy `kind` over `path` as configured.
///
/// The buffer strategy loads the file here, outside any timed region.
pub fn build_strategy(
    kind: StrategyKind,
    path: &Path,
    config: &BenchConfig,
    tracker: &ResourceTracker,
) -> Result<Box<dyn ReadStrategy>, ReadError> {
    let strategy: Box<dyn ReadStrategy> = match kind {
        StrategyKind::Buffer => Box::new(BufferStrategy::load(path)?.with_tracker(tracker.clone())),
        StrategyKind::MemoryMap => Box::new(MemoryMapStrategy::new(path).with_tracker(tracker.clone())),
        StrategyKind::StreamSeek => Box::new(
            StreamSeekStrategy::new(path)
                .buffer_size(config.stream_buffer_size)
                .with_tracker(tracker.clone()),
        ),
        StrategyKind::RawDescriptor => Box::new(
            RawDescriptorStrategy::new(path)
                .size_probe(config.size_probe)
                .with_tracker(tracker.clone()),
        ),
    };
    Ok(strategy)
}

/// One strategy's entry in a suite.
#[derive(Debug)]
pub struct SuiteEntry {
    pub strategy: StrategyKind,
    pub result: Result<BenchOutcome, BenchError>,
}

impl SuiteEntry {
    /// Completed and verified identical.
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.identical())
    }
}

/// Run every configured strategy against `path`, one after another.
///
/// A failing strategy is recorded and the suite moves on to the next.
pub fn run_suite(
    path: &Path,
    config: &BenchConfig,
    tracker: &ResourceTracker,
    sink: &dyn BenchSink,
) -> Vec<SuiteEntry> {
    tracing::info!(
        path = %path.display(),
        chunk_count = config.chunk_count,
        strategies = config.strategies.len(),
        "Starting benchmark suite"
    );

    config
        .strategies
        .iter()
        .map(|&kind| SuiteEntry {
            strategy: kind,
            result: run_one(kind, path, config, tracker, sink),
        })
        .collect()
}

fn run_one(
    kind: StrategyKind,
    path: &Path,
    config: &BenchConfig,
    tracker: &ResourceTracker,
    sink: &dyn BenchSink,
) -> Result<BenchOutcome, BenchError> {
    let strategy = build_strategy(kind, path, config, tracker)?;

    let mut bench = Benchmark::new(strategy.as_ref(), sink);
    if config.evict_page_cache {
        bench = bench.evict_page_cache(path);
    }

    let outcome = bench
        .run(config.chunk_count)
        .inspect_err(|e| tracing::error!(strategy = %kind, error = %e, "Benchmark run failed"))?;
    Ok(outcome)
}
