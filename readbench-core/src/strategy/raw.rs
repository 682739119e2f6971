// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Unbuffered descriptor strategy.
//!
//! Goes straight to the syscalls: `open`, `fstat` or `lseek` for the size,
//! `pread` for every range. Nothing is buffered in userspace.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::error::ReadError;
use crate::resources::{ResourceGuard, ResourceKind, ResourceTracker};

use super::{file_offset, size_to_usize, ByteSource, ReadStrategy, SizeProbe, StrategyKind};

/// Strategy over a raw file descriptor.
#[derive(Debug, Clone)]
pub struct RawDescriptorStrategy {
    path: PathBuf,
    probe: SizeProbe,
    tracker: ResourceTracker,
}

impl RawDescriptorStrategy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            probe: SizeProbe::default(),
            tracker: ResourceTracker::new(),
        }
    }

    /// Choose how the size is determined.
    pub fn size_probe(mut self, probe: SizeProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_tracker(mut self, tracker: ResourceTracker) -> Self {
        self.tracker = tracker;
        self
    }
}

impl ReadStrategy for RawDescriptorStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RawDescriptor
    }

    fn label(&self) -> String {
        format!("{}({})", self.kind(), self.probe)
    }

    fn open(&self) -> Result<Box<dyn ByteSource>, ReadError> {
        Ok(Box::new(RawDescriptor::open(
            &self.path,
            self.probe,
            &self.tracker,
        )?))
    }
}

/// An open read-only descriptor. Closed on drop.
#[derive(Debug)]
pub struct RawDescriptor {
    path: PathBuf,
    fd: libc::c_int,
    probe: SizeProbe,
    _handle: ResourceGuard,
}

impl RawDescriptor {
    pub fn open(path: &Path, probe: SizeProbe, tracker: &ResourceTracker) -> Result<Self, ReadError> {
        let open_failed = |source| ReadError::OpenFailed {
            path: path.to_path_buf(),
            source,
        };

        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|e| {
            open_failed(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })?;

        // SAFETY: c_path is a valid NUL-terminated string.
        let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_RDONLY | libc::O_CLOEXEC) };
        if fd < 0 {
            return Err(open_failed(std::io::Error::last_os_error()));
        }

        tracing::debug!(path = %path.display(), fd = fd, "Opened descriptor");

        Ok(Self {
            path: path.to_path_buf(),
            fd,
            probe,
            _handle: tracker.acquire(ResourceKind::Handle),
        })
    }

    fn stat_size(&self) -> std::io::Result<usize> {
        let mut stat = std::mem::MaybeUninit::<libc::stat>::uninit();
        // SAFETY: fd is open and stat points to writable storage.
        let result = unsafe { libc::fstat(self.fd, stat.as_mut_ptr()) };
        if result < 0 {
            return Err(std::io::Error::last_os_error());
        }
        // SAFETY: fstat succeeded and initialised the struct.
        let stat = unsafe { stat.assume_init() };
        size_to_usize(stat.st_size)
    }

    fn seek_size(&self) -> std::io::Result<usize> {
        // SAFETY: fd is open; lseek has no memory effects.
        let end = unsafe { libc::lseek(self.fd, 0, libc::SEEK_END) };
        if end < 0 {
            return Err(std::io::Error::last_os_error());
        }
        // SAFETY: as above.
        if unsafe { libc::lseek(self.fd, 0, libc::SEEK_SET) } < 0 {
            return Err(std::io::Error::last_os_error());
        }
        size_to_usize(end)
    }
}

impl ByteSource for RawDescriptor {
    fn size(&mut self) -> Result<usize, ReadError> {
        let size = match self.probe {
            SizeProbe::Stat => self.stat_size(),
            SizeProbe::SeekEnd => self.seek_size(),
        };
        size.map_err(|source| ReadError::StatFailed {
            path: self.path.clone(),
            source,
        })
    }

    fn read_exact_at(&mut self, offset: usize, dst: &mut [u8]) -> Result<(), ReadError> {
        let mut delivered = 0;
        while delivered < dst.len() {
            let position = offset + delivered;
            let file_position = file_offset(position).map_err(|source| ReadError::ReadFailed {
                offset: position,
                source,
            })?;
            let remaining = &mut dst[delivered..];
            // SAFETY: remaining is a valid writable buffer of the given length.
            let n = unsafe {
                libc::pread(
                    self.fd,
                    remaining.as_mut_ptr() as *mut libc::c_void,
                    remaining.len(),
                    file_position,
                )
            };

            if n < 0 {
                let err = std::io::Error::last_os_error();
                if err.kind() == std::io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(ReadError::ReadFailed {
                    offset: position,
                    source: err,
                });
            }
            if n == 0 {
                return Err(ReadError::ShortRead {
                    offset,
                    expected: dst.len(),
                    delivered,
                });
            }
            delivered += n as usize;
        }
        Ok(())
    }
}

impl Drop for RawDescriptor {
    fn drop(&mut self) {
        // SAFETY: fd was opened by us and is closed exactly once.
        if unsafe { libc::close(self.fd) } < 0 {
            tracing::error!(
                path = %self.path.display(),
                error = %std::io::Error::last_os_error(),
                "Failed to close descriptor"
            );
        }
    }
}
