// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end tests for readbench.
//!
//! These tests run every strategy against real files on disk and check the
//! results against each other.

use std::io::Write;
use std::path::Path;

use readbench_core::{
    build_strategy, run_suite, verify, BenchConfig, BenchError, Benchmark, BufferStrategy,
    MemoryMapStrategy, NullSink, Permutation, RawDescriptorStrategy, ReadError, ReadStrategy,
    RecordingSink, ResourceTracker, SizeProbe, StrategyKind, StreamSeekStrategy,
};
use tempfile::NamedTempFile;

/// Write `len` bytes of non-repeating content so misplaced chunks show up.
fn fixture(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    let bytes: Vec<u8> = (0..len)
        .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
        .collect();
    file.write_all(&bytes).expect("Failed to write fixture");
    file.flush().expect("Failed to flush fixture");
    file
}

/// All four strategies over `path`, sharing one tracker.
fn all_strategies(path: &Path, tracker: &ResourceTracker) -> Vec<Box<dyn ReadStrategy>> {
    vec![
        Box::new(
            BufferStrategy::load(path)
                .expect("Failed to load buffer")
                .with_tracker(tracker.clone()),
        ),
        Box::new(MemoryMapStrategy::new(path).with_tracker(tracker.clone())),
        Box::new(StreamSeekStrategy::new(path).with_tracker(tracker.clone())),
        Box::new(RawDescriptorStrategy::new(path).with_tracker(tracker.clone())),
        Box::new(
            RawDescriptorStrategy::new(path)
                .size_probe(SizeProbe::SeekEnd)
                .with_tracker(tracker.clone()),
        ),
    ]
}

/// 10 000 bytes, 100 shuffled chunks, every strategy verifies against one
/// canonical whole read.
#[test]
fn test_all_strategies_verify_against_canonical_read() {
    let file = fixture(10_000);
    let tracker = ResourceTracker::new();
    let canonical = Benchmark::new(&MemoryMapStrategy::new(file.path()), &NullSink)
        .read_whole()
        .expect("Failed to read canonical copy");
    assert_eq!(canonical.len(), 10_000);

    for strategy in all_strategies(file.path(), &tracker) {
        let bench = Benchmark::new(strategy.as_ref(), &NullSink);
        let chunked = bench
            .read_chunked(100)
            .unwrap_or_else(|e| panic!("{} failed: {}", strategy.label(), e));

        assert!(
            verify(&chunked, &canonical),
            "{} chunked read differs from canonical read",
            strategy.label()
        );

        let outcome = bench.run(100).expect("Run failed");
        assert!(outcome.identical(), "{} run not identical", strategy.label());
        assert_eq!(outcome.total_size, 10_000);
    }

    assert!(tracker.is_idle(), "resources leaked");
}

/// Different visit orders produce the same bytes.
#[test]
fn test_order_independence() {
    let file = fixture(1000);
    let tracker = ResourceTracker::new();
    let forward = Permutation::identity(7);
    let backward = Permutation::from_indices((0..7).rev().collect()).unwrap();
    let shuffled = Permutation::random(7);

    for strategy in all_strategies(file.path(), &tracker) {
        let bench = Benchmark::new(strategy.as_ref(), &NullSink);
        let whole = bench.read_whole().unwrap();
        let a = bench.read_chunked_in(&forward).unwrap();
        let b = bench.read_chunked_in(&backward).unwrap();
        let c = bench.read_chunked_in(&shuffled).unwrap();

        assert!(verify(&a, &whole), "{}", strategy.label());
        assert!(verify(&b, &whole), "{}", strategy.label());
        assert!(verify(&c, &whole), "{}", strategy.label());
    }
}

/// Repeated whole reads of an unmodified file are identical.
#[test]
fn test_whole_read_idempotent() {
    let file = fixture(4096 + 17);
    let tracker = ResourceTracker::new();

    for strategy in all_strategies(file.path(), &tracker) {
        let bench = Benchmark::new(strategy.as_ref(), &NullSink);
        let first = bench.read_whole().unwrap();
        let second = bench.read_whole().unwrap();
        assert_eq!(first.buffer, second.buffer, "{}", strategy.label());
    }
}

/// One chunk goes through the chunked path and still equals the whole read.
#[test]
fn test_single_chunk_matches_whole() {
    let file = fixture(2500);
    let tracker = ResourceTracker::new();

    for strategy in all_strategies(file.path(), &tracker) {
        let outcome = Benchmark::new(strategy.as_ref(), &NullSink).run(1).unwrap();
        assert!(outcome.identical(), "{}", strategy.label());
        assert_eq!(outcome.chunk_count, 1);
    }
}

/// The remainder-absorbing last chunk lands at the right offset.
#[test]
fn test_uneven_split_reassembles() {
    let file = fixture(1000);
    let tracker = ResourceTracker::new();

    for strategy in all_strategies(file.path(), &tracker) {
        let outcome = Benchmark::new(strategy.as_ref(), &NullSink).run(7).unwrap();
        assert!(outcome.identical(), "{}", strategy.label());
    }
}

/// A missing file fails to open and leaves nothing behind.
#[test]
fn test_missing_path_open_failed_without_leak() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.bin");
    let tracker = ResourceTracker::new();

    let strategies: Vec<Box<dyn ReadStrategy>> = vec![
        Box::new(MemoryMapStrategy::new(&missing).with_tracker(tracker.clone())),
        Box::new(StreamSeekStrategy::new(&missing).with_tracker(tracker.clone())),
        Box::new(RawDescriptorStrategy::new(&missing).with_tracker(tracker.clone())),
    ];

    for strategy in &strategies {
        let result = Benchmark::new(strategy.as_ref(), &NullSink).run(10);
        assert!(
            matches!(result, Err(ReadError::OpenFailed { .. })),
            "{} returned {:?}",
            strategy.label(),
            result
        );
        assert_eq!(tracker.open_handles(), 0);
        assert_eq!(tracker.live_mappings(), 0);
    }

    assert!(matches!(
        BufferStrategy::load(&missing),
        Err(ReadError::OpenFailed { .. })
    ));
}

/// Failures after acquisition release the handle and mapping too.
#[test]
fn test_failure_after_open_releases_resources() {
    let file = fixture(50);
    let tracker = ResourceTracker::new();

    for strategy in all_strategies(file.path(), &tracker) {
        let result = Benchmark::new(strategy.as_ref(), &NullSink).run(51);
        assert!(matches!(result, Err(ReadError::InvalidChunkCount { .. })));
        assert!(tracker.is_idle(), "{} leaked", strategy.label());
    }
}

/// More chunks than bytes is rejected instead of producing empty pieces.
#[test]
fn test_degenerate_chunk_count_rejected() {
    let file = fixture(3);
    let strategy = RawDescriptorStrategy::new(file.path());

    let result = Benchmark::new(&strategy, &NullSink).read_chunked(4);
    assert!(matches!(
        result,
        Err(ReadError::InvalidChunkCount {
            chunk_count: 4,
            total_size: 3
        })
    ));
}

/// The suite runs every configured strategy and keeps going past failures.
#[test]
fn test_suite_runs_each_strategy() {
    let file = fixture(10_000);
    let tracker = ResourceTracker::new();
    let sink = RecordingSink::new();
    let config = BenchConfig {
        chunk_count: 100,
        evict_page_cache: true,
        ..BenchConfig::default()
    };

    let entries = run_suite(file.path(), &config, &tracker, &sink);
    assert_eq!(entries.len(), 4);
    for (entry, kind) in entries.iter().zip(StrategyKind::ALL) {
        assert_eq!(entry.strategy, kind);
        assert!(entry.passed(), "{} did not pass: {:?}", kind, entry.result);
    }

    // chunked + whole timing and one verdict per strategy
    assert_eq!(sink.events().len(), 12);
    assert!(tracker.is_idle());
}

#[test]
fn test_suite_reports_failures_per_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.bin");
    let tracker = ResourceTracker::new();

    let entries = run_suite(&missing, &BenchConfig::default(), &tracker, &NullSink);
    assert_eq!(entries.len(), 4);
    for entry in &entries {
        assert!(matches!(
            entry.result,
            Err(BenchError::Read(ReadError::OpenFailed { .. }))
        ));
    }
    assert!(tracker.is_idle());
}

#[test]
fn test_build_strategy_applies_config() {
    let file = fixture(128);
    let tracker = ResourceTracker::new();
    let config = BenchConfig {
        size_probe: SizeProbe::SeekEnd,
        ..BenchConfig::default()
    };

    let strategy =
        build_strategy(StrategyKind::RawDescriptor, file.path(), &config, &tracker).unwrap();
    assert_eq!(strategy.kind(), StrategyKind::RawDescriptor);
    assert_eq!(strategy.label(), "raw_descriptor(seek_end)");
}
