// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Accounting of OS resources held by open sources.
//!
//! Every descriptor and mapping a strategy acquires is paired with a
//! [`ResourceGuard`]; dropping the guard releases the count. Callers share a
//! [`ResourceTracker`] across strategies to assert nothing outlives a run.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Kind of resource being accounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// An open file handle or descriptor.
    Handle,
    /// A live memory mapping.
    Mapping,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Handle => write!(f, "handle"),
            ResourceKind::Mapping => write!(f, "mapping"),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    handles: AtomicUsize,
    mappings: AtomicUsize,
}

impl Counters {
    fn counter(&self, kind: ResourceKind) -> &AtomicUsize {
        match kind {
            ResourceKind::Handle => &self.handles,
            ResourceKind::Mapping => &self.mappings,
        }
    }
}

/// Shared counters of open handles and live mappings.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    counters: Arc<Counters>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an acquisition; the count drops again when the guard drops.
    pub fn acquire(&self, kind: ResourceKind) -> ResourceGuard {
        let live = self.counters.counter(kind).fetch_add(1, Ordering::AcqRel) + 1;
        tracing::trace!(kind = %kind, live = live, "Resource acquired");
        ResourceGuard {
            tracker: self.clone(),
            kind,
        }
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.counters.handles.load(Ordering::Acquire)
    }

    /// Number of mappings currently live.
    pub fn live_mappings(&self) -> usize {
        self.counters.mappings.load(Ordering::Acquire)
    }

    /// True when nothing tracked is still held.
    pub fn is_idle(&self) -> bool {
        self.open_handles() == 0 && self.live_mappings() == 0
    }
}

/// Releases one unit of a tracked resource on drop.
#[derive(Debug)]
pub struct ResourceGuard {
    tracker: ResourceTracker,
    kind: ResourceKind,
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        let live = self
            .tracker
            .counters
            .counter(self.kind)
            .fetch_sub(1, Ordering::AcqRel)
            - 1;
        tracing::trace!(kind = %self.kind, live = live, "Resource released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards_balance_counts() {
        let tracker = ResourceTracker::new();
        let handle = tracker.acquire(ResourceKind::Handle);
        let mapping = tracker.acquire(ResourceKind::Mapping);
        assert_eq!(tracker.open_handles(), 1);
        assert_eq!(tracker.live_mappings(), 1);

        drop(mapping);
        assert_eq!(tracker.live_mappings(), 0);
        assert!(!tracker.is_idle());

        drop(handle);
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_clones_share_counters() {
        let tracker = ResourceTracker::new();
        let other = tracker.clone();
        let _guard = other.acquire(ResourceKind::Handle);
        assert_eq!(tracker.open_handles(), 1);
    }
}
