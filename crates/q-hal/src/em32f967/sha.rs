// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! EM32F967 SHA-256 engine driver
//!
//! Thin register-level implementation of [`HashAccelerator`]. Sequencing
//! (reset wait, block flow control, completion wait) lives in the caller.

use super::registers::{modify_reg, read_reg, write_reg};
use super::{ctr, offsets, pad_ctr, MAX_WORD_COUNT};
use crate::error::{HalError, HalResult};
use crate::traits::{AccelMode, HashAccelerator};

/// EM32F967 SHA-256 driver
#[derive(Debug)]
pub struct Em32f967Sha {
    /// Crypto block base address
    base: u32,
    /// Last mode word written, re-used when starting
    mode: u32,
}

impl Em32f967Sha {
    /// Create a driver for the crypto block at `base`
    ///
    /// # Safety
    /// `base` must be the address of the EM32F967 crypto block, its clock must
    /// be enabled, and no other code may access the SHA registers while the
    /// driver exists.
    #[must_use]
    pub const unsafe fn new(base: u32) -> Self {
        Self { base, mode: 0 }
    }

    /// Base address of the crypto block
    #[must_use]
    pub const fn base(&self) -> u32 {
        self.base
    }

    const fn reg(&self, offset: u32) -> u32 {
        self.base + offset
    }

    fn mode_bits(mode: AccelMode) -> u32 {
        let mut bits = 0;
        if mode.write_reverse {
            bits |= ctr::WR_REV;
        }
        if mode.read_reverse {
            bits |= ctr::RD_REV;
        }
        if mode.interrupt_enable {
            bits |= ctr::INT_MASK;
        }
        bits
    }

    fn status(&self) -> u32 {
        // SAFETY: SHA_CTR lies inside the block handed to `new`.
        unsafe { read_reg(self.reg(offsets::SHA_CTR)) }
    }

    /// Interrupt service helper
    ///
    /// Call from the crypto block's interrupt handler. Clears the pending
    /// interrupt and returns `true` if a transform has completed.
    pub fn service_interrupt(&mut self) -> bool {
        let status = self.status();
        if status & ctr::STA == 0 {
            return false;
        }

        // SAFETY: SHA_CTR lies inside the block handed to `new`. Writing back
        // the status with INT_CLR acknowledges the interrupt.
        unsafe {
            write_reg(self.reg(offsets::SHA_CTR), status | ctr::INT_CLR);
        }
        true
    }
}

impl HashAccelerator for Em32f967Sha {
    fn request_reset(&mut self) {
        // SAFETY: SHA_CTR lies inside the block handed to `new`.
        unsafe {
            modify_reg(self.reg(offsets::SHA_CTR), |v| v | ctr::RST);
        }
    }

    fn reset_pending(&mut self) -> bool {
        self.status() & ctr::RST != 0
    }

    fn configure(&mut self, mode: AccelMode) {
        self.mode = Self::mode_bits(mode);
        // SAFETY: SHA_CTR lies inside the block handed to `new`.
        unsafe {
            write_reg(self.reg(offsets::SHA_CTR), self.mode);
        }
    }

    fn set_word_count(&mut self, words: u64) -> HalResult<()> {
        if words > MAX_WORD_COUNT {
            return Err(HalError::InvalidParameter);
        }

        #[allow(clippy::cast_possible_truncation)]
        let (low, high) = (words as u32, (words >> 32) as u32);

        // SAFETY: both length registers lie inside the block handed to `new`.
        unsafe {
            write_reg(self.reg(offsets::SHA_DATALEN_LOW), low);
            write_reg(self.reg(offsets::SHA_DATALEN_HIGH), high);
        }
        Ok(())
    }

    fn set_padding(&mut self, valid_byte_code: u8, pad_packets: u8) -> HalResult<()> {
        let valid = u32::from(valid_byte_code);
        let packets = u32::from(pad_packets);
        if valid > pad_ctr::VALID_BYTE_MASK || packets > pad_ctr::PACKETS_MASK {
            return Err(HalError::InvalidParameter);
        }

        // SAFETY: SHA_PAD_CTR lies inside the block handed to `new`.
        unsafe {
            write_reg(
                self.reg(offsets::SHA_PAD_CTR),
                (valid << pad_ctr::VALID_BYTE_SHIFT) | packets,
            );
        }
        Ok(())
    }

    fn start(&mut self) {
        // SAFETY: SHA_CTR lies inside the block handed to `new`.
        unsafe {
            write_reg(self.reg(offsets::SHA_CTR), self.mode | ctr::STR);
        }
    }

    fn write_word(&mut self, word: u32) {
        // SAFETY: SHA_IN lies inside the block handed to `new`.
        unsafe {
            write_reg(self.reg(offsets::SHA_IN), word);
        }
    }

    fn is_ready(&mut self) -> bool {
        self.status() & ctr::READY != 0
    }

    fn is_done(&mut self) -> bool {
        self.status() & ctr::STA != 0
    }

    fn clear_done(&mut self) {
        // SAFETY: SHA_CTR lies inside the block handed to `new`.
        unsafe {
            modify_reg(self.reg(offsets::SHA_CTR), |v| v | ctr::INT_CLR);
        }
    }

    fn read_digest_word(&mut self, index: usize) -> HalResult<u32> {
        if index >= 8 {
            return Err(HalError::InvalidParameter);
        }

        #[allow(clippy::cast_possible_truncation)]
        let addr = self.reg(offsets::SHA_OUT + (index as u32) * 4);
        // SAFETY: the output bank is eight words from SHA_OUT, index checked above.
        Ok(unsafe { read_reg(addr) })
    }
}
