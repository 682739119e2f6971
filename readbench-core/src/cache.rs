// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Page cache eviction between runs.
//!
//! Asks the kernel to drop a file's cached pages so every strategy starts
//! equally cold. Advisory only: clean pages go, dirty pages may stay.

use std::fs::File;
use std::path::Path;

/// Drop the cached pages of `path`.
#[cfg(target_os = "linux")]
pub fn evict_page_cache(path: &Path) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;

    let file = File::open(path)?;
    // SAFETY: fd is valid for the lifetime of `file`; offset 0 and length 0
    // cover the whole file.
    let result = unsafe { libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_DONTNEED) };
    if result != 0 {
        // posix_fadvise returns the error number instead of setting errno.
        return Err(std::io::Error::from_raw_os_error(result));
    }

    tracing::debug!(path = %path.display(), "Evicted cached pages");
    Ok(())
}

/// Drop the cached pages of `path`.
///
/// No portable equivalent exists off Linux; only checks the file opens.
#[cfg(not(target_os = "linux"))]
pub fn evict_page_cache(path: &Path) -> std::io::Result<()> {
    File::open(path)?;
    tracing::warn!(path = %path.display(), "Page cache eviction is not supported on this platform");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_evict_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1u8; 8192]).unwrap();
        file.flush().unwrap();
        assert!(evict_page_cache(file.path()).is_ok());
    }

    #[test]
    fn test_evict_missing_file() {
        assert!(evict_page_cache(Path::new("/nonexistent/readbench.bin")).is_err());
    }
}
