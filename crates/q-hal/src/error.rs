// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL error types

use core::fmt;

/// HAL error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Value does not fit the register field it targets
    InvalidParameter,
    /// Status bit never reached the expected value
    Timeout,
    /// Accelerator latched a protocol fault
    HardwareFault,
}

impl HalError {
    /// Get error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidParameter => 0x08F0,
            Self::Timeout => 0x08F1,
            Self::HardwareFault => 0x08D0,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid parameter",
            Self::Timeout => "timeout",
            Self::HardwareFault => "hardware fault detected",
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

impl From<HalError> for q_common::Error {
    fn from(e: HalError) -> Self {
        match e {
            HalError::Timeout => Self::Timeout,
            HalError::InvalidParameter => Self::InvalidArgument,
            HalError::HardwareFault => Self::HardwareFault,
        }
    }
}

/// HAL Result type
pub type HalResult<T> = Result<T, HalError>;
