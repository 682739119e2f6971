// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! readbench Core Library
//!
//! Measures and cross-validates techniques for getting a file's bytes into
//! memory: a resident buffer, a memory map, a buffered seekable stream and a
//! raw descriptor. Each is timed reading the whole file and reading it in
//! randomly ordered chunks, and the chunked result is verified byte for byte
//! against the whole read.
//!
//! Everything runs synchronously on the calling thread. Each run owns its
//! handle and destination buffer and releases them before returning.

pub mod cache;
pub mod config;
pub mod error;
pub mod permutation;
pub mod plan;
pub mod resources;
pub mod sink;
pub mod strategy;
pub mod suite;
pub mod timing;
pub mod verify;

// Re-export commonly used types
pub use config::{BenchConfig, ConfigLoader};
pub use error::{BenchError, BenchResult, ConfigError, ReadError};
pub use permutation::Permutation;
pub use plan::{ByteSpan, ChunkPlan};
pub use resources::ResourceTracker;
pub use sink::{BenchSink, NullSink, RecordingSink, TracingSink};
pub use strategy::{
    BufferStrategy, ByteSource, MemoryMapStrategy, RawDescriptorStrategy, ReadStrategy, SizeProbe,
    StrategyKind, StreamSeekStrategy,
};
pub use suite::{build_strategy, run_suite, BenchOutcome, Benchmark, SuiteEntry};
pub use timing::{timed, ReadMode, ReadResult};
pub use verify::{compare, verify, Equivalence};
