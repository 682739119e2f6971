// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Buffered stream strategy: reposition, then read.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::ReadError;
use crate::resources::{ResourceGuard, ResourceKind, ResourceTracker};

use super::{fill_exact, size_to_usize, ByteSource, ReadStrategy, StrategyKind};

/// Default capacity of the stream buffer (matches `std::io::BufReader`).
pub const DEFAULT_STREAM_BUFFER_SIZE: usize = 8 * 1024;

/// Strategy over a buffered, seekable file stream.
#[derive(Debug, Clone)]
pub struct StreamSeekStrategy {
    path: PathBuf,
    buffer_size: usize,
    tracker: ResourceTracker,
}

impl StreamSeekStrategy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buffer_size: DEFAULT_STREAM_BUFFER_SIZE,
            tracker: ResourceTracker::new(),
        }
    }

    /// Set the capacity of the stream's internal buffer.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_tracker(mut self, tracker: ResourceTracker) -> Self {
        self.tracker = tracker;
        self
    }
}

impl ReadStrategy for StreamSeekStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StreamSeek
    }

    fn open(&self) -> Result<Box<dyn ByteSource>, ReadError> {
        Ok(Box::new(StreamSeekSource::open(
            &self.path,
            self.buffer_size,
            &self.tracker,
        )?))
    }
}

/// An open buffered stream.
#[derive(Debug)]
pub struct StreamSeekSource {
    path: PathBuf,
    reader: BufReader<File>,
    _handle: ResourceGuard,
}

impl StreamSeekSource {
    pub fn open(
        path: &Path,
        buffer_size: usize,
        tracker: &ResourceTracker,
    ) -> Result<Self, ReadError> {
        let file = File::open(path).map_err(|source| ReadError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), buffer_size = buffer_size, "Opened stream");

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::with_capacity(buffer_size, file),
            _handle: tracker.acquire(ResourceKind::Handle),
        })
    }
}

impl ByteSource for StreamSeekSource {
    /// Seek to the end to learn the size, then rewind.
    fn size(&mut self) -> Result<usize, ReadError> {
        let stat_failed = |source| ReadError::StatFailed {
            path: self.path.clone(),
            source,
        };

        let end = self.reader.seek(SeekFrom::End(0)).map_err(stat_failed)?;
        self.reader.seek(SeekFrom::Start(0)).map_err(stat_failed)?;
        size_to_usize(end).map_err(stat_failed)
    }

    fn read_exact_at(&mut self, offset: usize, dst: &mut [u8]) -> Result<(), ReadError> {
        self.reader
            .seek(SeekFrom::Start(offset as u64))
            .map_err(|source| ReadError::ReadFailed { offset, source })?;
        fill_exact(&mut self.reader, offset, dst)
    }
}
