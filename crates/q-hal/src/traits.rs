// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL trait definitions
//!
//! This module defines the platform-agnostic interfaces to a word-oriented
//! SHA-256 accelerator and to the busy-wait primitive used while polling it.

use crate::error::{HalError, HalResult};

/// Mode word programmed before a transform
///
/// The reversal bits describe how the peripheral maps the CPU's 32-bit words
/// onto message bytes (input side) and digest bytes (output side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccelMode {
    /// Byte-reverse each input word
    pub write_reverse: bool,
    /// Byte-reverse each output word
    pub read_reverse: bool,
    /// Raise the completion interrupt
    pub interrupt_enable: bool,
}

impl AccelMode {
    /// Byte reversal on both sides, interrupt masked
    pub const SHA256_STREAM: Self = Self {
        write_reverse: true,
        read_reverse: true,
        interrupt_enable: false,
    };

    /// Same mode with the completion interrupt enabled or disabled
    #[must_use]
    pub const fn with_interrupt(mut self, enabled: bool) -> Self {
        self.interrupt_enable = enabled;
        self
    }
}

/// Word-oriented SHA-256 accelerator
///
/// The accelerator is stateful and owned by exactly one engine. It cannot
/// suspend a partial transform: every message is presented as one word
/// stream, preceded by its word count and padding control.
pub trait HashAccelerator {
    /// Issue a soft reset
    fn request_reset(&mut self);

    /// Check whether the reset issued by `request_reset` is still in progress
    fn reset_pending(&mut self) -> bool;

    /// Program the mode word (byte reversal, interrupt mask)
    fn configure(&mut self, mode: AccelMode);

    /// Program the message length in 32-bit words
    ///
    /// # Errors
    /// `HalError::InvalidParameter` if the count does not fit the length
    /// register.
    fn set_word_count(&mut self, words: u64) -> HalResult<()>;

    /// Program the padding control word
    ///
    /// # Arguments
    /// * `valid_byte_code` - valid bytes in the last word, 0 meaning all four
    /// * `pad_packets` - zero words the hardware appends before the length
    ///
    /// # Errors
    /// `HalError::InvalidParameter` if a field does not fit its register bits.
    fn set_padding(&mut self, valid_byte_code: u8, pad_packets: u8) -> HalResult<()>;

    /// Start the transform
    fn start(&mut self);

    /// Push one word into the input port
    fn write_word(&mut self, word: u32);

    /// Check whether the input latch can take the next block
    fn is_ready(&mut self) -> bool;

    /// Check whether the digest is complete
    fn is_done(&mut self) -> bool;

    /// Acknowledge completion and clear the pending interrupt
    fn clear_done(&mut self);

    /// Check whether the accelerator latched a protocol fault since reset
    ///
    /// A faulted transform never raises done. Blocks without fault reporting
    /// keep the default and surface a hang as `HalError::Timeout` instead.
    fn fault_latched(&mut self) -> bool {
        false
    }

    /// Read one of the eight digest output words
    ///
    /// # Errors
    /// `HalError::InvalidParameter` if `index` is not below 8.
    fn read_digest_word(&mut self, index: usize) -> HalResult<u32>;
}

/// Busy-wait primitive
///
/// Keeps the core logic free of platform delay loops.
pub trait BusyWait {
    /// Idle for a handful of CPU cycles
    fn settle(&mut self, cycles: u32);

    /// Idle for approximately `us` microseconds
    fn pause_us(&mut self, us: u32);
}

/// Calibrated spin-loop delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinWait {
    spins_per_us: u32,
}

impl SpinWait {
    /// Create a delay calibrated for the given core clock
    #[must_use]
    pub const fn new(core_clock_hz: u32) -> Self {
        let spins = core_clock_hz / 1_000_000;
        Self {
            spins_per_us: if spins == 0 { 1 } else { spins },
        }
    }

    /// Spin iterations per microsecond
    #[must_use]
    pub const fn spins_per_us(&self) -> u32 {
        self.spins_per_us
    }
}

impl BusyWait for SpinWait {
    fn settle(&mut self, cycles: u32) {
        for _ in 0..cycles {
            core::hint::spin_loop();
        }
    }

    fn pause_us(&mut self, us: u32) {
        for _ in 0..us.saturating_mul(self.spins_per_us) {
            core::hint::spin_loop();
        }
    }
}

/// Poll `condition` until it holds, at most `budget` times
///
/// Between polls the caller's wait primitive idles for `step_us`
/// microseconds, or spins once when `step_us` is zero.
///
/// # Returns
/// The number of failed polls before the condition held.
///
/// # Errors
/// `HalError::Timeout` if the condition never held.
pub fn wait_until<W, F>(wait: &mut W, budget: u32, step_us: u32, mut condition: F) -> HalResult<u32>
where
    W: BusyWait + ?Sized,
    F: FnMut() -> bool,
{
    let mut polls = 0;

    while polls < budget {
        if condition() {
            return Ok(polls);
        }
        polls += 1;
        if step_us == 0 {
            core::hint::spin_loop();
        } else {
            wait.pause_us(step_us);
        }
    }

    Err(HalError::Timeout)
}
