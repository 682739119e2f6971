// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Memory-mapped file strategy.
//!
//! Safe wrapper over a private, read-only `mmap` of a whole file. All unsafe
//! operations are encapsulated here with bounds checking on every copy.

use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::error::ReadError;
use crate::resources::{ResourceGuard, ResourceKind, ResourceTracker};

use super::{copy_from_region, size_to_usize, ByteSource, ReadStrategy, StrategyKind};

/// Strategy that maps the file and copies out of the mapping.
#[derive(Debug, Clone)]
pub struct MemoryMapStrategy {
    path: PathBuf,
    tracker: ResourceTracker,
}

impl MemoryMapStrategy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tracker: ResourceTracker::new(),
        }
    }

    pub fn with_tracker(mut self, tracker: ResourceTracker) -> Self {
        self.tracker = tracker;
        self
    }
}

impl ReadStrategy for MemoryMapStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MemoryMap
    }

    fn open(&self) -> Result<Box<dyn ByteSource>, ReadError> {
        Ok(Box::new(MappedFile::open(&self.path, &self.tracker)?))
    }
}

/// A read-only mapping of an entire file.
///
/// Owns the mapping and the file; unmaps and closes on drop.
pub struct MappedFile {
    path: PathBuf,
    /// `None` for an empty file, which cannot be mapped.
    ptr: Option<NonNull<u8>>,
    size: usize,
    _mapping: Option<ResourceGuard>,
    _file: File,
    _handle: ResourceGuard,
}

impl MappedFile {
    /// Open and map `path` over its full extent.
    ///
    /// # Errors
    /// `OpenFailed` if the file cannot be opened or mapped, `StatFailed` if
    /// its size cannot be determined.
    pub fn open(path: &Path, tracker: &ResourceTracker) -> Result<Self, ReadError> {
        let file = File::open(path).map_err(|source| ReadError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let handle = tracker.acquire(ResourceKind::Handle);

        let size = file
            .metadata()
            .and_then(|metadata| size_to_usize(metadata.len()))
            .map_err(|source| ReadError::StatFailed {
                path: path.to_path_buf(),
                source,
            })?;

        if size == 0 {
            return Ok(Self {
                path: path.to_path_buf(),
                ptr: None,
                size,
                _mapping: None,
                _file: file,
                _handle: handle,
            });
        }

        // SAFETY: fd is valid for the lifetime of `file`, size is the file
        // length and non-zero, offset 0 is valid.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                libc::PROT_READ,
                libc::MAP_PRIVATE,
                file.as_raw_fd(),
                0,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(ReadError::OpenFailed {
                path: path.to_path_buf(),
                source: std::io::Error::last_os_error(),
            });
        }

        let ptr = NonNull::new(ptr as *mut u8).ok_or_else(|| ReadError::OpenFailed {
            path: path.to_path_buf(),
            source: std::io::Error::other("mmap returned null"),
        })?;

        tracing::debug!(path = %path.display(), size = size, "Mapped file");

        Ok(Self {
            path: path.to_path_buf(),
            ptr: Some(ptr),
            size,
            _mapping: Some(tracker.acquire(ResourceKind::Mapping)),
            _file: file,
            _handle: handle,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// View of the mapped bytes.
    pub fn as_slice(&self) -> &[u8] {
        match self.ptr {
            // SAFETY: ptr maps exactly `size` readable bytes until drop, and
            // the mapping is private so nothing in-process writes through it.
            Some(ptr) => unsafe { std::slice::from_raw_parts(ptr.as_ptr(), self.size) },
            None => &[],
        }
    }
}

impl ByteSource for MappedFile {
    fn size(&mut self) -> Result<usize, ReadError> {
        Ok(self.size)
    }

    fn read_exact_at(&mut self, offset: usize, dst: &mut [u8]) -> Result<(), ReadError> {
        copy_from_region(self.as_slice(), offset, dst)
    }
}

impl Drop for MappedFile {
    fn drop(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: ptr and size were set by a successful mmap.
            let result = unsafe { libc::munmap(ptr.as_ptr() as *mut libc::c_void, self.size) };
            if result < 0 {
                tracing::error!(
                    path = %self.path.display(),
                    error = %std::io::Error::last_os_error(),
                    "Failed to unmap file"
                );
            } else {
                tracing::debug!(path = %self.path.display(), "Unmapped file");
            }
        }
    }
}

impl std::fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFile")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("mapped", &self.ptr.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_map_and_copy() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"0123456789abcdef").unwrap();

        let tracker = ResourceTracker::new();
        let mut mapped = MappedFile::open(file.path(), &tracker).unwrap();
        assert_eq!(tracker.live_mappings(), 1);
        assert_eq!(mapped.len(), 16);

        let mut dst = [0u8; 6];
        mapped.read_exact_at(10, &mut dst).unwrap();
        assert_eq!(&dst, b"abcdef");

        drop(mapped);
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_empty_file_is_not_mapped() {
        let file = NamedTempFile::new().unwrap();
        let tracker = ResourceTracker::new();

        let mut mapped = MappedFile::open(file.path(), &tracker).unwrap();
        assert!(mapped.is_empty());
        assert_eq!(tracker.live_mappings(), 0);
        assert!(mapped.read_whole().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let tracker = ResourceTracker::new();
        let result = MappedFile::open(Path::new("/nonexistent/readbench.bin"), &tracker);
        assert!(matches!(result, Err(ReadError::OpenFailed { .. })));
        assert!(tracker.is_idle());
    }
}
