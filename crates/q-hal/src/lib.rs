// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hardware Abstraction Layer for the Qbitel hash offload stack
//!
//! This crate provides the platform-agnostic interface to word-oriented
//! SHA-256 accelerators and its implementations:
//!
//! - **EM32F967**: ELAN Cortex-M4 crypto block (feature `em32f967`)
//! - **Simulated**: host-side model of the same accelerator (feature `sim`)
//!
//! # Architecture
//!
//! The HAL is structured in layers:
//!
//! 1. **Traits**: `HashAccelerator` and `BusyWait` (`traits` module)
//! 2. **Drivers**: Platform-specific implementations
//! 3. **Registers**: Low-level volatile access, private to each driver
//!
//! # Security
//!
//! - Drivers never buffer message data; words go straight to the input port
//! - Register access is confined to drivers constructed through `unsafe fn new`

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod traits;

#[cfg(feature = "em32f967")]
pub mod em32f967;

#[cfg(feature = "sim")]
pub mod sim;

// Re-export main traits
pub use error::{HalError, HalResult};
pub use traits::*;

/// Platform identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// ELAN EM32F967 (Cortex-M4)
    Em32f967,
    /// Host-side accelerator model
    Simulated,
    /// No accelerator driver compiled in
    Unknown,
}

impl Platform {
    /// Get the current platform
    #[must_use]
    pub const fn current() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(feature = "em32f967")] {
                Self::Em32f967
            } else if #[cfg(feature = "sim")] {
                Self::Simulated
            } else {
                Self::Unknown
            }
        }
    }

    /// Check if a SHA-256 accelerator driver is available
    #[must_use]
    pub const fn has_hash_accelerator(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Check if accelerator completion can raise an interrupt
    #[must_use]
    pub const fn has_completion_interrupt(&self) -> bool {
        matches!(self, Self::Em32f967 | Self::Simulated)
    }

    /// Get the platform name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Em32f967 => "EM32F967",
            Self::Simulated => "simulated",
            Self::Unknown => "unknown",
        }
    }
}
