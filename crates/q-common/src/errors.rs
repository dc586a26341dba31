// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Error types for the hash offload stack
//!
//! This module defines the unified error type returned by the hash engine.
//! All errors are no_std compatible, `Copy`, and carry a stable numeric code
//! so they can be reported over a debug link without heap allocation.

use core::fmt;

/// Result type alias for hash engine operations
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the hash offload stack
///
/// Every variant is recoverable at the caller's level. None of them leaves the
/// engine in a state where `free` could fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Session Errors (0x01xx)
    // =========================================================================
    /// A session is already open on this engine
    AlreadyActive,
    /// Requested hash algorithm is not handled by the accelerator
    UnsupportedAlgorithm,
    /// Operation is not valid in the session's current state
    InvalidState,
    /// Handle does not belong to the session the engine has open
    InvalidSession,

    // =========================================================================
    // Buffer Errors (0x02xx)
    // =========================================================================
    /// Caller did not supply an input or output buffer
    NullBuffer,
    /// Accumulated message would exceed the configured maximum, or the
    /// allocator refused the growth
    CapacityExceeded,

    // =========================================================================
    // Hardware Errors (0x03xx)
    // =========================================================================
    /// Accelerator did not complete within the configured budget
    Timeout,
    /// Accelerator reported a fault other than a timeout
    HardwareFault,

    // =========================================================================
    // General Errors (0xFFxx)
    // =========================================================================
    /// Output buffer pointer or size is invalid
    InvalidArgument,
    /// Engine configuration is inconsistent
    InvalidConfig,
}

impl Error {
    /// Get the error code for this error
    ///
    /// Error codes are organized by category:
    /// - 0x01xx: Session errors
    /// - 0x02xx: Buffer errors
    /// - 0x03xx: Hardware errors
    /// - 0xFFxx: General errors
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            // Session errors (0x01xx)
            Self::AlreadyActive => 0x0101,
            Self::UnsupportedAlgorithm => 0x0102,
            Self::InvalidState => 0x0103,
            Self::InvalidSession => 0x0104,

            // Buffer errors (0x02xx)
            Self::NullBuffer => 0x0201,
            Self::CapacityExceeded => 0x0202,

            // Hardware errors (0x03xx)
            Self::Timeout => 0x0301,
            Self::HardwareFault => 0x0302,

            // General errors (0xFFxx)
            Self::InvalidArgument => 0xFF01,
            Self::InvalidConfig => 0xFF02,
        }
    }

    /// Get a short description of the error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::AlreadyActive => "session already active",
            Self::UnsupportedAlgorithm => "unsupported algorithm",
            Self::InvalidState => "invalid session state",
            Self::InvalidSession => "invalid session handle",
            Self::NullBuffer => "missing buffer",
            Self::CapacityExceeded => "accumulation capacity exceeded",
            Self::Timeout => "hardware timeout",
            Self::HardwareFault => "hardware fault",
            Self::InvalidArgument => "invalid argument",
            Self::InvalidConfig => "invalid configuration",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}
