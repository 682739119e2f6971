// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Chunk visit order.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::ReadError;

/// An ordering of the chunk indices `0..len`, each appearing exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation(Vec<usize>);

impl Permutation {
    /// Draw a uniformly random permutation of `0..chunk_count`.
    ///
    /// Uses the OS-seeded thread RNG; no ordering is reproducible.
    pub fn random(chunk_count: usize) -> Self {
        Self::shuffled(chunk_count, &mut rand::rng())
    }

    /// Shuffle `0..chunk_count` with the given generator.
    pub fn shuffled<R: Rng + ?Sized>(chunk_count: usize, rng: &mut R) -> Self {
        let mut indices: Vec<usize> = (0..chunk_count).collect();
        indices.shuffle(rng);
        Self(indices)
    }

    /// `0, 1, ..., chunk_count - 1`.
    pub fn identity(chunk_count: usize) -> Self {
        Self((0..chunk_count).collect())
    }

    /// Wrap an explicit ordering after checking it is a permutation.
    pub fn from_indices(indices: Vec<usize>) -> Result<Self, ReadError> {
        let mut seen = vec![false; indices.len()];
        for &index in &indices {
            if index >= indices.len() {
                return Err(ReadError::InvalidPermutation {
                    reason: format!("index {} out of range for {} chunks", index, indices.len()),
                });
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(ReadError::InvalidPermutation {
                    reason: format!("index {} appears more than once", index),
                });
            }
        }
        Ok(Self(indices))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }
}
