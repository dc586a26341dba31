// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Constants for the hash offload stack
//!
//! SHA-256 geometry as seen by a word-oriented accelerator, and the default
//! buffer and timing limits. All sizes are chosen for embedded RAM budgets.

// =============================================================================
// SHA-256 Geometry
// =============================================================================

/// SHA-256 digest size in bytes
pub const SHA256_DIGEST_SIZE: usize = 32;

/// SHA-256 digest size in 32-bit words
pub const SHA256_DIGEST_WORDS: usize = SHA256_DIGEST_SIZE / WORD_SIZE;

/// SHA-256 block size in bytes
pub const SHA256_BLOCK_SIZE: usize = 64;

/// Accelerator input word size in bytes
pub const WORD_SIZE: usize = 4;

/// Words per 512-bit block (flow-control boundary of the input latch)
pub const WORDS_PER_BLOCK: usize = SHA256_BLOCK_SIZE / WORD_SIZE;

/// Block size in bits
pub const BLOCK_BITS: u64 = 512;

/// Bit offset within a block where the 64-bit length field starts
pub const LENGTH_FIELD_OFFSET_BITS: u64 = 448;

/// Width of the trailing message length field, in 32-bit words
pub const LENGTH_FIELD_WORDS: u32 = 2;

/// Largest padding packet count the 5-bit register field can hold
pub const MAX_PAD_PACKETS: u32 = 0x1F;

// =============================================================================
// Buffer Defaults
// =============================================================================

/// Inline (non-heap) session storage in bytes
pub const INLINE_STORAGE_SIZE: usize = 256;

/// Default fast-path threshold
pub const DEFAULT_INLINE_CAPACITY: usize = INLINE_STORAGE_SIZE;

/// Default dynamic capacity allocated when a session leaves the inline path
pub const DEFAULT_PREALLOCATION_SIZE: usize = 4 * 1024;

/// Default first capacity for an accumulation buffer grown without a
/// preallocation
pub const DEFAULT_INITIAL_ACCUMULATION_CAPACITY: usize = 512;

/// Default hard cap on an accumulated message
pub const DEFAULT_MAX_ACCUMULATION_SIZE: usize = 512 * 1024;

// =============================================================================
// Timing Defaults
// =============================================================================

/// Default done-wait budget in microseconds
pub const DEFAULT_HARDWARE_TIMEOUT_US: u32 = 100_000;

/// Default bound on reset-complete polls
pub const DEFAULT_RESET_TIMEOUT_POLLS: u32 = 10_000;

/// Settle delay (CPU cycles) between a full block and the ready poll
pub const DEFAULT_BLOCK_SETTLE_CYCLES: u32 = 6;

// =============================================================================
// Logging
// =============================================================================

/// Maximum log message length
pub const MAX_LOG_MESSAGE_LEN: usize = 128;

/// Log buffer size (number of entries)
pub const LOG_BUFFER_SIZE: usize = 32;

// Compile-time sanity
const _: () = assert!(WORDS_PER_BLOCK == 16);
const _: () = assert!(SHA256_DIGEST_WORDS == 8);
const _: () = assert!(DEFAULT_INLINE_CAPACITY <= INLINE_STORAGE_SIZE);
const _: () = assert!(DEFAULT_PREALLOCATION_SIZE <= DEFAULT_MAX_ACCUMULATION_SIZE);
