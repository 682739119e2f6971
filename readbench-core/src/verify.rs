// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Byte-for-byte equivalence of a chunked read against a whole read.
//!
//! Catches offset and length arithmetic bugs in chunk reassembly, the
//! remainder-absorbing final chunk being the usual suspect. Says nothing
//! about performance.
//!
//! Verdicts are reported to the run's sink by
//! [`Benchmark`](crate::suite::Benchmark), not from here.

use serde::Serialize;

use crate::timing::ReadResult;

/// True iff both reads produced the same bytes.
pub fn verify(chunked: &ReadResult, whole: &ReadResult) -> bool {
    chunked.buffer == whole.buffer
}

/// Detailed comparison of two read buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Equivalence {
    pub identical: bool,
    pub chunked_len: usize,
    pub whole_len: usize,
    /// CRC32 of the chunked buffer.
    pub chunked_checksum: u32,
    /// CRC32 of the whole buffer.
    pub whole_checksum: u32,
    /// First offset at which the buffers differ, if any.
    pub first_mismatch: Option<usize>,
}

/// Compare two reads and describe where they diverge.
pub fn compare(chunked: &ReadResult, whole: &ReadResult) -> Equivalence {
    let a = &chunked.buffer;
    let b = &whole.buffer;

    let first_mismatch = a
        .iter()
        .zip(b.iter())
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())));

    Equivalence {
        identical: first_mismatch.is_none(),
        chunked_len: a.len(),
        whole_len: b.len(),
        chunked_checksum: crc32fast::hash(a),
        whole_checksum: crc32fast::hash(b),
        first_mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(bytes: &[u8]) -> ReadResult {
        ReadResult {
            buffer: bytes.to_vec(),
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_identical() {
        let a = result(b"identical bytes");
        let b = result(b"identical bytes");
        assert!(verify(&a, &b));

        let eq = compare(&a, &b);
        assert!(eq.identical);
        assert_eq!(eq.first_mismatch, None);
        assert_eq!(eq.chunked_checksum, eq.whole_checksum);
    }

    #[test]
    fn test_content_differs() {
        let a = result(b"abcdXfgh");
        let b = result(b"abcdefgh");
        assert!(!verify(&a, &b));

        let eq = compare(&a, &b);
        assert!(!eq.identical);
        assert_eq!(eq.first_mismatch, Some(4));
        assert_ne!(eq.chunked_checksum, eq.whole_checksum);
    }

    #[test]
    fn test_length_differs() {
        let a = result(b"abc");
        let b = result(b"abcdef");
        assert!(!verify(&a, &b));
        assert_eq!(compare(&a, &b).first_mismatch, Some(3));
    }

    #[test]
    fn test_elapsed_is_ignored() {
        let a = ReadResult {
            buffer: vec![1, 2, 3],
            elapsed: Duration::from_millis(3),
        };
        let b = ReadResult {
            buffer: vec![1, 2, 3],
            elapsed: Duration::from_millis(9),
        };
        assert!(verify(&a, &b));
    }
}
