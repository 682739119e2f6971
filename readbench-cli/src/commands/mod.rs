// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod generate;
pub mod run;
pub mod stage;
pub mod validate;
