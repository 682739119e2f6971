// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Chunk planning.
//!
//! Splits a source of `total_size` bytes into `chunk_count` pieces. Every
//! piece has `floor(total_size / chunk_count)` bytes except the one with
//! logical index `chunk_count - 1`, which absorbs the remainder.

use std::ops::Range;

use serde::Serialize;

use crate::error::ReadError;

/// Byte range `[offset, offset + len)` of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteSpan {
    pub offset: usize,
    pub len: usize,
}

impl ByteSpan {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// One past the last byte covered by this span.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Validated split of a source into chunks.
///
/// Constructed only through [`ChunkPlan::new`], so `1 <= chunk_count <=
/// total_size` always holds and no non-final piece is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkPlan {
    total_size: usize,
    chunk_count: usize,
    piece_size: usize,
    last_piece_size: usize,
}

impl ChunkPlan {
    /// Build a plan for `total_size` bytes split into `chunk_count` pieces.
    ///
    /// # Errors
    /// Returns `InvalidChunkCount` if `chunk_count` is zero or exceeds
    /// `total_size` (which would truncate the piece size to zero).
    pub fn new(total_size: usize, chunk_count: usize) -> Result<Self, ReadError> {
        if chunk_count == 0 || chunk_count > total_size {
            return Err(ReadError::InvalidChunkCount {
                chunk_count,
                total_size,
            });
        }

        let piece_size = total_size / chunk_count;
        let last_piece_size = total_size - piece_size * (chunk_count - 1);

        Ok(Self {
            total_size,
            chunk_count,
            piece_size,
            last_piece_size,
        })
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn piece_size(&self) -> usize {
        self.piece_size
    }

    pub fn last_piece_size(&self) -> usize {
        self.last_piece_size
    }

    /// Span of the chunk with logical index `index`.
    ///
    /// The remainder belongs to `chunk_count - 1` regardless of the order in
    /// which chunks are visited.
    ///
    /// # Panics
    /// Panics if `index >= chunk_count`.
    pub fn span(&self, index: usize) -> ByteSpan {
        assert!(
            index < self.chunk_count,
            "chunk index {} out of range for {} chunks",
            index,
            self.chunk_count
        );

        let len = if index == self.chunk_count - 1 {
            self.last_piece_size
        } else {
            self.piece_size
        };
        ByteSpan::new(index * self.piece_size, len)
    }

    /// All spans in logical order.
    pub fn spans(&self) -> impl Iterator<Item = ByteSpan> + '_ {
        (0..self.chunk_count).map(move |index| self.span(index))
    }
}
