// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `readbench generate` command - Write a random printable-ASCII fixture.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use rand::Rng;

pub const DEFAULT_FILE_NAME: &str = "random_content.txt";
pub const DEFAULT_SIZE_MIB: usize = 100;

/// Letters, digits and ASCII punctuation.
const CHARSET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

const BLOCK_SIZE: usize = 64 * 1024;

pub fn execute(output: &Path, size_mib: usize) -> Result<(), Box<dyn std::error::Error>> {
    let size = size_mib
        .checked_mul(1024 * 1024)
        .ok_or("requested size overflows")?;

    tracing::info!(path = %output.display(), size_mib = size_mib, "Generating file");

    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    write_random(&mut writer, size, &mut rand::rng())?;
    writer.flush()?;

    println!(
        "✓ File '{}' with random content of size {}MB has been created",
        output.display(),
        size_mib
    );
    Ok(())
}

/// Write `size` characters drawn uniformly from [`CHARSET`].
fn write_random<W: Write, R: Rng + ?Sized>(writer: &mut W, size: usize, rng: &mut R) -> io::Result<()> {
    let mut block = vec![0u8; BLOCK_SIZE.min(size)];
    let mut remaining = size;

    while remaining > 0 {
        let len = remaining.min(block.len());
        for byte in &mut block[..len] {
            *byte = CHARSET[rng.random_range(0..CHARSET.len())];
        }
        writer.write_all(&block[..len])?;
        remaining -= len;
    }
    Ok(())
}
