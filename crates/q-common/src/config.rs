// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hash engine configuration
//!
//! This module defines the buffer and timing limits that control a hash
//! engine. Configuration is fixed when the engine is constructed; there are
//! no per-call overrides.

use crate::constants::{
    DEFAULT_BLOCK_SETTLE_CYCLES, DEFAULT_HARDWARE_TIMEOUT_US, DEFAULT_INITIAL_ACCUMULATION_CAPACITY,
    DEFAULT_INLINE_CAPACITY, DEFAULT_MAX_ACCUMULATION_SIZE, DEFAULT_PREALLOCATION_SIZE,
    DEFAULT_RESET_TIMEOUT_POLLS, INLINE_STORAGE_SIZE,
};
use crate::errors::{Error, Result};
use crate::log::LogLevel;

/// Hash engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashEngineConfig {
    /// Largest message kept in the inline (non-heap) buffer
    pub inline_buffer_capacity: usize,
    /// Dynamic capacity allocated when a session leaves the inline path
    pub preallocation_size: usize,
    /// First capacity of an accumulation buffer grown from empty
    pub initial_accumulation_capacity: usize,
    /// Hard cap on an accumulated message; `update` fails beyond it
    pub max_accumulation_size: usize,
    /// Budget for the done wait, in microseconds (also bounds each ready wait)
    pub hardware_timeout_us: u32,
    /// Bound on reset-complete polls during `begin`
    pub reset_timeout_polls: u32,
    /// Settle delay after each 16-word block, in CPU cycles
    pub block_settle_cycles: u32,
    /// Unmask the completion interrupt and fire the completion callback
    pub interrupt_notify: bool,
    /// Minimum level recorded in the engine's event log
    pub log_level: LogLevel,
}

impl HashEngineConfig {
    /// Default configuration
    pub const DEFAULT: Self = Self {
        inline_buffer_capacity: DEFAULT_INLINE_CAPACITY,
        preallocation_size: DEFAULT_PREALLOCATION_SIZE,
        initial_accumulation_capacity: DEFAULT_INITIAL_ACCUMULATION_CAPACITY,
        max_accumulation_size: DEFAULT_MAX_ACCUMULATION_SIZE,
        hardware_timeout_us: DEFAULT_HARDWARE_TIMEOUT_US,
        reset_timeout_polls: DEFAULT_RESET_TIMEOUT_POLLS,
        block_settle_cycles: DEFAULT_BLOCK_SETTLE_CYCLES,
        interrupt_notify: false,
        log_level: LogLevel::Info,
    };

    /// Configuration for streaming large firmware images
    pub const FIRMWARE_IMAGE: Self = Self {
        preallocation_size: 64 * 1024,
        max_accumulation_size: 1024 * 1024,
        hardware_timeout_us: 500_000,
        ..Self::DEFAULT
    };

    /// Configuration for RAM-constrained parts
    pub const CONSTRAINED: Self = Self {
        inline_buffer_capacity: 128,
        preallocation_size: 1024,
        initial_accumulation_capacity: 256,
        max_accumulation_size: 64 * 1024,
        log_level: LogLevel::Warn,
        ..Self::DEFAULT
    };

    /// Set the accumulation cap
    #[must_use]
    pub const fn with_max_accumulation_size(mut self, max: usize) -> Self {
        self.max_accumulation_size = max;
        self
    }

    /// Set the migration preallocation
    #[must_use]
    pub const fn with_preallocation_size(mut self, size: usize) -> Self {
        self.preallocation_size = size;
        self
    }

    /// Set the done-wait budget
    #[must_use]
    pub const fn with_hardware_timeout_us(mut self, timeout_us: u32) -> Self {
        self.hardware_timeout_us = timeout_us;
        self
    }

    /// Enable or disable the completion interrupt
    #[must_use]
    pub const fn with_interrupt_notify(mut self, enabled: bool) -> Self {
        self.interrupt_notify = enabled;
        self
    }

    /// Check that the limits are mutually consistent
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the cap is zero, a starting capacity
    /// exceeds the cap, the inline threshold exceeds the inline storage, or a
    /// timeout is zero.
    pub const fn validate(&self) -> Result<()> {
        if self.max_accumulation_size == 0
            || self.preallocation_size > self.max_accumulation_size
            || self.initial_accumulation_capacity == 0
            || self.initial_accumulation_capacity > self.max_accumulation_size
            || self.inline_buffer_capacity > INLINE_STORAGE_SIZE
            || self.hardware_timeout_us == 0
            || self.reset_timeout_polls == 0
        {
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

impl Default for HashEngineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
