// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Padding calculator
//!
//! The accelerator appends the FIPS 180-4 padding itself but has to be told
//! how: the number of valid bytes in the last input word and the number of
//! zero "padding packets" (32-bit words) to insert before the 64-bit length.
//! Together they must close the final 512-bit block exactly.

use q_common::constants::{
    BLOCK_BITS, LENGTH_FIELD_OFFSET_BITS, LENGTH_FIELD_WORDS, WORDS_PER_BLOCK, WORD_SIZE,
};

/// Padding parameters derived from a message length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingParameters {
    /// Input words to stream, `ceil(len / 4)`
    pub word_count: u64,
    /// Valid bytes in the last word, `len mod 4` (0 means all four)
    pub valid_byte_code: u8,
    /// Zero words the hardware inserts before the length field
    pub pad_packet_count: u8,
}

impl PaddingParameters {
    /// Words the hardware processes including padding and length
    #[must_use]
    pub const fn total_words(&self) -> u64 {
        self.word_count + self.pad_packet_count as u64 + LENGTH_FIELD_WORDS as u64
    }

    /// 512-bit blocks the hardware compresses
    #[must_use]
    pub const fn block_count(&self) -> u64 {
        self.total_words() / WORDS_PER_BLOCK as u64
    }

    /// Check that the parameters close the last block
    #[must_use]
    pub const fn is_block_aligned(&self) -> bool {
        self.total_words() % WORDS_PER_BLOCK as u64 == 0
    }
}

/// Compute the padding parameters for a message of `total_bytes` bytes
///
/// Pure and infallible. The packet count is at most 16, so it always fits the
/// 5-bit register field.
#[must_use]
pub const fn compute_padding(total_bytes: u64) -> PaddingParameters {
    let word_size = WORD_SIZE as u64;
    let remainder = total_bytes % word_size;
    let word_count = total_bytes / word_size + if remainder == 0 { 0 } else { 1 };

    // bits mod 512, taken on bytes first so huge lengths cannot overflow
    let bmod = (total_bytes % (BLOCK_BITS / 8)) * 8;
    let pad_bits = if bmod < LENGTH_FIELD_OFFSET_BITS {
        BLOCK_BITS - bmod - 64
    } else {
        BLOCK_BITS - bmod + LENGTH_FIELD_OFFSET_BITS
    };

    #[allow(clippy::cast_possible_truncation)]
    let (valid_byte_code, pad_packet_count) = (remainder as u8, (pad_bits / 32) as u8);

    PaddingParameters {
        word_count,
        valid_byte_code,
        pad_packet_count,
    }
}
