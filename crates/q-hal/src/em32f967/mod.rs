// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! EM32F967 Hardware Abstraction Layer
//!
//! This module provides the driver for the SHA-256 engine inside the ELAN
//! EM32F967 crypto block (ARM Cortex-M4).
//!
//! # Supported Features
//!
//! - Word-oriented SHA-256 with hardware padding
//! - Input/output byte reversal
//! - Completion interrupt
//!
//! Clock gating and interrupt wiring are the board's responsibility. The
//! crypto block clock must be running before the driver is used.

pub mod sha;

pub use sha::Em32f967Sha;

/// Memory-mapped register access utilities
pub(crate) mod registers {
    use core::ptr::{read_volatile, write_volatile};

    /// Read a 32-bit register
    ///
    /// # Safety
    /// The address must be a valid memory-mapped register.
    #[inline]
    pub unsafe fn read_reg(addr: u32) -> u32 {
        read_volatile(addr as *const u32)
    }

    /// Write a 32-bit register
    ///
    /// # Safety
    /// The address must be a valid memory-mapped register.
    #[inline]
    pub unsafe fn write_reg(addr: u32, value: u32) {
        write_volatile(addr as *mut u32, value);
    }

    /// Modify a 32-bit register (read-modify-write)
    ///
    /// # Safety
    /// The address must be a valid memory-mapped register.
    #[inline]
    pub unsafe fn modify_reg<F>(addr: u32, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = read_reg(addr);
        write_reg(addr, f(value));
    }
}

/// SHA register offsets from the crypto block base
pub mod offsets {
    /// Control/status register
    pub const SHA_CTR: u32 = 0x00;
    /// Input word port
    pub const SHA_IN: u32 = 0x04;
    /// First of eight digest output words
    pub const SHA_OUT: u32 = 0x08;
    /// Data length in words, bits [58:32]
    pub const SHA_DATALEN_HIGH: u32 = 0x28;
    /// Data length in words, bits [31:0]
    pub const SHA_DATALEN_LOW: u32 = 0x2C;
    /// Padding control
    pub const SHA_PAD_CTR: u32 = 0x30;
}

/// `SHA_CTR` bit definitions
pub mod ctr {
    /// Start transform
    pub const STR: u32 = 1 << 0;
    /// Interrupt clear
    pub const INT_CLR: u32 = 1 << 1;
    /// Soft reset, self-clearing
    pub const RST: u32 = 1 << 2;
    /// Input latch ready
    pub const READY: u32 = 1 << 3;
    /// Digest complete
    pub const STA: u32 = 1 << 4;
    /// Completion interrupt enable
    pub const INT_MASK: u32 = 1 << 5;
    /// Byte-reverse input words
    pub const WR_REV: u32 = 1 << 8;
    /// Byte-reverse output words
    pub const RD_REV: u32 = 1 << 9;
}

/// `SHA_PAD_CTR` field layout
pub mod pad_ctr {
    /// Padding packet count, bits [4:0]
    pub const PACKETS_MASK: u32 = 0x1F;
    /// Valid byte code shift, bits [9:8]
    pub const VALID_BYTE_SHIFT: u32 = 8;
    /// Valid byte code mask (unshifted)
    pub const VALID_BYTE_MASK: u32 = 0x3;
}

/// Largest word count the length register pair can hold (59 bits)
pub const MAX_WORD_COUNT: u64 = (1 << 59) - 1;
