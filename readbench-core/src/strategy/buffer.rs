// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! In-memory buffer strategy.
//!
//! Models a packaged resource that the platform has already made resident:
//! loading happens once, up front, and every read is a plain memory copy.

use std::path::Path;
use std::sync::Arc;

use crate::error::ReadError;
use crate::resources::{ResourceGuard, ResourceKind, ResourceTracker};

use super::{copy_from_region, ByteSource, ReadStrategy, StrategyKind};

/// Strategy over a resident, contiguous region.
#[derive(Debug, Clone)]
pub struct BufferStrategy {
    region: Arc<[u8]>,
    tracker: ResourceTracker,
}

impl BufferStrategy {
    /// Wrap bytes that are already in memory.
    pub fn new(region: impl Into<Arc<[u8]>>) -> Self {
        Self {
            region: region.into(),
            tracker: ResourceTracker::new(),
        }
    }

    /// Load a file into memory. The load itself is never part of a timed run.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ReadError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Loaded resident buffer");
        Ok(Self::new(bytes))
    }

    pub fn with_tracker(mut self, tracker: ResourceTracker) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }
}

impl ReadStrategy for BufferStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Buffer
    }

    fn open(&self) -> Result<Box<dyn ByteSource>, ReadError> {
        Ok(Box::new(BufferSource {
            region: Arc::clone(&self.region),
            _handle: self.tracker.acquire(ResourceKind::Handle),
        }))
    }
}

/// An opened view of a resident region.
#[derive(Debug)]
pub struct BufferSource {
    region: Arc<[u8]>,
    _handle: ResourceGuard,
}

impl ByteSource for BufferSource {
    fn size(&mut self) -> Result<usize, ReadError> {
        Ok(self.region.len())
    }

    fn read_exact_at(&mut self, offset: usize, dst: &mut [u8]) -> Result<(), ReadError> {
        copy_from_region(&self.region, offset, dst)
    }
}
