// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `readbench stage` command - Copy a file into a working directory.

use std::fs;
use std::path::{Path, PathBuf};

/// Name the staged copy gets inside the destination directory.
pub const STAGED_FILE_NAME: &str = "local_content.txt";

pub fn execute(source: &Path, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let staged = stage(source, dir)?;
    println!("✓ Staged {} at {}", source.display(), staged.display());
    Ok(())
}

/// Copy `source` to `dir/local_content.txt`, creating `dir` if needed.
fn stage(source: &Path, dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(STAGED_FILE_NAME);
    let length = fs::copy(source, &target)?;

    tracing::info!(
        source = %source.display(),
        target = %target.display(),
        length = length,
        "Staged file"
    );
    Ok(target)
}
