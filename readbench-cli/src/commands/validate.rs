// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `readbench validate` command - Validate configuration file.

use std::path::Path;

use readbench_core::ConfigLoader;

pub fn execute(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file.display(), "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Benchmark Settings:");
            println!("  Chunk Count:        {}", config.chunk_count);
            println!("  Size Probe:         {}", config.size_probe);
            println!(
                "  Stream Buffer Size: {} bytes",
                config.stream_buffer_size
            );
            println!("  Evict Page Cache:   {}", config.evict_page_cache);
            println!();
            println!("Strategies ({}):", config.strategies.len());
            for strategy in &config.strategies {
                println!("  - {}", strategy);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
