// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel SHA-256 Offload Engine
//!
//! This crate drives fixed-function SHA-256 accelerators that take input as
//! 32-bit words and need the padding parameters up front. It provides:
//!
//! - **Sessions**: begin / update / finalize / free with a single-session
//!   engine and checked handles
//! - **Buffering**: inline storage for short messages, doubling heap buffer
//!   with a hard cap for streamed ones
//! - **Padding**: valid-byte code and padding packet count per FIPS 180-4
//! - **Feed protocol**: block-wise flow control and bounded completion waits
//!
//! # Example
//!
//! ```ignore
//! use q_common::{HashAlgorithm, HashEngineConfig};
//! use q_hal::em32f967::Em32f967Sha;
//! use q_hal::SpinWait;
//! use q_hash::HashEngine;
//!
//! let accel = unsafe { Em32f967Sha::new(CRYPTO_BASE) };
//! let mut engine = HashEngine::new(accel, SpinWait::new(96_000_000), HashEngineConfig::DEFAULT)?;
//!
//! let session = engine.begin(HashAlgorithm::Sha256)?;
//! engine.update(&session, b"firmware chunk")?;
//! let mut digest = [0u8; 32];
//! engine.finalize(&session, &mut digest)?;
//! engine.free(&session);
//! ```
//!
//! # Security
//!
//! - Buffered plaintext is zeroized on free, on migration and on every
//!   reallocation
//! - The event log records lengths and states, never message bytes

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

extern crate alloc;

pub mod buffer;
pub mod engine;
pub mod feed;
pub mod notify;
pub mod padding;

pub use buffer::{AccumulationBuffer, BufferLimits, Growth, SessionBuffer};
pub use engine::{HashEngine, HashPacket, SessionHandle, SessionState};
pub use feed::{FeedReport, FeedTiming};
pub use notify::{CompletionCallback, CompletionEvent};
pub use padding::{compute_padding, PaddingParameters};
