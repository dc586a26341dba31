// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel Common Library for the hash offload stack
//!
//! This crate provides the error definitions, configuration structures,
//! constants, shared types and logging used by `q-hal` and `q-hash`.
//!
//! # Features
//!
//! - `defmt`: Enable defmt logging support for embedded debugging
//!
//! # Security
//!
//! Digest values implement `Zeroize`. Message plaintext never passes through
//! this crate, and the log never records it.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod errors;
pub mod log;
pub mod types;

// Re-export commonly used items
pub use config::HashEngineConfig;
pub use errors::{Error, Result};
pub use types::{Digest, HashAlgorithm};
