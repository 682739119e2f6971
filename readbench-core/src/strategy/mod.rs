// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Read strategies.
//!
//! A strategy knows how to open a source; the opened [`ByteSource`] knows how
//! to report its size and satisfy a positioned read. Whole-file and chunked
//! reads are written once on top of those two capabilities, so the four
//! backends only differ in how bytes get from the source into memory:
//!
//! - [`BufferStrategy`]: a fully resident region, copied with `memcpy`
//! - [`MemoryMapStrategy`]: a private read-only `mmap` of the file
//! - [`StreamSeekStrategy`]: a buffered stream with `seek` + `read`
//! - [`RawDescriptorStrategy`]: an unbuffered descriptor with `pread`
//!
//! Closing is `Drop`: handles and mappings are released when the source goes
//! out of scope, on success and error paths alike.

mod buffer;
mod mmap;
mod raw;
mod stream;

use std::fmt;
use std::io::{self, ErrorKind, Read};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ReadError};
use crate::permutation::Permutation;
use crate::plan::ChunkPlan;

pub use buffer::{BufferSource, BufferStrategy};
pub use mmap::{MappedFile, MemoryMapStrategy};
pub use raw::{RawDescriptor, RawDescriptorStrategy};
pub use stream::{StreamSeekSource, StreamSeekStrategy, DEFAULT_STREAM_BUFFER_SIZE};

/// The available read strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// In-memory region already loaded.
    Buffer,
    /// Memory-mapped file.
    MemoryMap,
    /// Buffered seekable stream.
    StreamSeek,
    /// Unbuffered file descriptor.
    RawDescriptor,
}

impl StrategyKind {
    /// Every strategy, in the order a suite runs them by default.
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Buffer,
        StrategyKind::MemoryMap,
        StrategyKind::StreamSeek,
        StrategyKind::RawDescriptor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Buffer => "buffer",
            StrategyKind::MemoryMap => "memory_map",
            StrategyKind::StreamSeek => "stream_seek",
            StrategyKind::RawDescriptor => "raw_descriptor",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "buffer" => Ok(StrategyKind::Buffer),
            "memory_map" | "mmap" => Ok(StrategyKind::MemoryMap),
            "stream_seek" | "stream" => Ok(StrategyKind::StreamSeek),
            "raw_descriptor" | "raw" => Ok(StrategyKind::RawDescriptor),
            _ => Err(ConfigError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

/// How the raw descriptor strategy learns the file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeProbe {
    /// `fstat` on the descriptor.
    #[default]
    Stat,
    /// `lseek` to the end, then rewind. No status call.
    SeekEnd,
}

impl fmt::Display for SizeProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeProbe::Stat => write!(f, "stat"),
            SizeProbe::SeekEnd => write!(f, "seek_end"),
        }
    }
}

impl FromStr for SizeProbe {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "stat" | "fstat" => Ok(SizeProbe::Stat),
            "seek_end" | "seek" => Ok(SizeProbe::SeekEnd),
            _ => Err(ConfigError::UnknownSizeProbe {
                name: s.to_string(),
            }),
        }
    }
}

/// An opened source of bytes.
///
/// Implementors provide size and positioned-read; the whole and chunked
/// reads are shared.
pub trait ByteSource {
    /// Total number of bytes in the source.
    fn size(&mut self) -> Result<usize, ReadError>;

    /// Fill `dst` with the bytes at `offset..offset + dst.len()`.
    ///
    /// Fails with `ShortRead` if the source ends before `dst` is full.
    fn read_exact_at(&mut self, offset: usize, dst: &mut [u8]) -> Result<(), ReadError>;

    /// Read the whole source into a freshly allocated buffer.
    fn read_whole(&mut self) -> Result<Vec<u8>, ReadError> {
        let total_size = self.size()?;
        let mut buffer = vec![0u8; total_size];
        self.read_exact_at(0, &mut buffer)?;
        Ok(buffer)
    }

    /// Read the source chunk by chunk in `order`.
    ///
    /// Each chunk lands at its logical offset in the destination, so the
    /// result does not depend on the visit order.
    fn read_chunked(&mut self, plan: &ChunkPlan, order: &Permutation) -> Result<Vec<u8>, ReadError> {
        if order.len() != plan.chunk_count() {
            return Err(ReadError::OrderMismatch {
                expected: plan.chunk_count(),
                actual: order.len(),
            });
        }

        let mut buffer = vec![0u8; plan.total_size()];
        for index in order.iter() {
            let span = plan.span(index);
            self.read_exact_at(span.offset, &mut buffer[span.range()])?;
        }
        Ok(buffer)
    }
}

/// A way of opening a source for reading.
pub trait ReadStrategy {
    fn kind(&self) -> StrategyKind;

    /// Human-readable name, including any variant detail.
    fn label(&self) -> String {
        self.kind().to_string()
    }

    /// Acquire the source. Nothing is timed here.
    fn open(&self) -> Result<Box<dyn ByteSource>, ReadError>;
}

/// Fill `dst` from a reader positioned at `offset`.
///
/// `Interrupted` is retried; end of input before `dst` is full is a
/// `ShortRead`.
pub(crate) fn fill_exact<R: Read + ?Sized>(
    reader: &mut R,
    offset: usize,
    dst: &mut [u8],
) -> Result<(), ReadError> {
    let mut delivered = 0;
    while delivered < dst.len() {
        match reader.read(&mut dst[delivered..]) {
            Ok(0) => {
                return Err(ReadError::ShortRead {
                    offset,
                    expected: dst.len(),
                    delivered,
                })
            }
            Ok(n) => delivered += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(ReadError::ReadFailed {
                    offset: offset + delivered,
                    source,
                })
            }
        }
    }
    Ok(())
}

/// Convert a size reported by the OS into `usize`.
pub(crate) fn size_to_usize<T>(size: T) -> io::Result<usize>
where
    T: TryInto<usize> + Copy + fmt::Display,
{
    size.try_into().map_err(|_| {
        io::Error::new(
            ErrorKind::InvalidData,
            format!("size {} does not fit in usize", size),
        )
    })
}

/// Convert a buffer offset into a file offset for positioned syscalls.
pub(crate) fn file_offset(offset: usize) -> io::Result<libc::off_t> {
    libc::off_t::try_from(offset).map_err(|_| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("offset {} does not fit in off_t", offset),
        )
    })
}

/// Copy `dst.len()` bytes out of a resident region.
pub(crate) fn copy_from_region(region: &[u8], offset: usize, dst: &mut [u8]) -> Result<(), ReadError> {
    let end = offset.saturating_add(dst.len());
    match region.get(offset..end) {
        Some(bytes) => {
            dst.copy_from_slice(bytes);
            Ok(())
        }
        None => Err(ReadError::ShortRead {
            offset,
            expected: dst.len(),
            delivered: region.len().saturating_sub(offset),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Slice(Vec<u8>);

    impl ByteSource for Slice {
        fn size(&mut self) -> Result<usize, ReadError> {
            Ok(self.0.len())
        }

        fn read_exact_at(&mut self, offset: usize, dst: &mut [u8]) -> Result<(), ReadError> {
            copy_from_region(&self.0, offset, dst)
        }
    }

    #[test]
    fn test_chunked_matches_whole() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        let mut source = Slice(data.clone());
        let plan = ChunkPlan::new(1000, 7).unwrap();
        let order = Permutation::from_indices(vec![6, 2, 0, 5, 1, 4, 3]).unwrap();

        assert_eq!(source.read_chunked(&plan, &order).unwrap(), data);
        assert_eq!(source.read_whole().unwrap(), data);
    }

    #[test]
    fn test_order_length_must_match_plan() {
        let mut source = Slice(vec![0; 100]);
        let plan = ChunkPlan::new(100, 4).unwrap();
        let result = source.read_chunked(&plan, &Permutation::identity(3));
        assert!(matches!(
            result,
            Err(ReadError::OrderMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_fill_exact_reports_short_read() {
        let mut reader = Cursor::new(vec![1u8; 10]);
        let mut dst = [0u8; 16];
        let err = fill_exact(&mut reader, 40, &mut dst).unwrap_err();
        assert!(matches!(
            err,
            ReadError::ShortRead {
                offset: 40,
                expected: 16,
                delivered: 10
            }
        ));
    }

    #[test]
    fn test_copy_past_region_end() {
        let region = [7u8; 8];
        let mut dst = [0u8; 4];
        assert!(copy_from_region(&region, 4, &mut dst).is_ok());
        assert!(matches!(
            copy_from_region(&region, 6, &mut dst),
            Err(ReadError::ShortRead { delivered: 2, .. })
        ));
    }

    #[test]
    fn test_size_conversion_rejects_out_of_range() {
        assert_eq!(size_to_usize(4096u64).unwrap(), 4096);
        assert_eq!(size_to_usize(0i64).unwrap(), 0);
        let err = size_to_usize(-1i64).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_file_offset_rejects_out_of_range() {
        assert_eq!(file_offset(852).unwrap(), 852);
        let err = file_offset(usize::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("mmap".parse::<StrategyKind>().unwrap(), StrategyKind::MemoryMap);
        assert_eq!(
            "raw-descriptor".parse::<StrategyKind>().unwrap(),
            StrategyKind::RawDescriptor
        );
        assert!("carrier-pigeon".parse::<StrategyKind>().is_err());
        assert_eq!("seek_end".parse::<SizeProbe>().unwrap(), SizeProbe::SeekEnd);
    }
}
