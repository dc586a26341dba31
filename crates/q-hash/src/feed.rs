// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hardware feed protocol
//!
//! Streams one complete message through a [`HashAccelerator`]:
//!
//! 1. Program byte order, word count and padding control
//! 2. Start, then write every word, little-endian assembled
//! 3. After each 16-word block: settle, then wait for ready
//! 4. Wait for done, acknowledge it, read eight digest words
//!
//! Every wait is bounded. Nothing here retries.

use q_common::constants::{SHA256_DIGEST_SIZE, SHA256_DIGEST_WORDS, WORDS_PER_BLOCK, WORD_SIZE};
use q_common::HashEngineConfig;
use q_hal::{wait_until, AccelMode, BusyWait, HalError, HalResult, HashAccelerator};

use crate::padding::compute_padding;

/// Wait budgets and delays used while driving the accelerator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTiming {
    /// Reset-complete polls, 1 µs apart
    pub reset_polls: u32,
    /// Ready polls per block, spinning
    pub ready_polls: u32,
    /// Done polls, 1 µs apart
    pub done_polls: u32,
    /// Settle delay after each block, in cycles
    pub settle_cycles: u32,
}

impl From<&HashEngineConfig> for FeedTiming {
    fn from(config: &HashEngineConfig) -> Self {
        Self {
            reset_polls: config.reset_timeout_polls,
            ready_polls: config.hardware_timeout_us,
            done_polls: config.hardware_timeout_us,
            settle_cycles: config.block_settle_cycles,
        }
    }
}

/// What one transform cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedReport {
    /// Words written to the input port
    pub words: u64,
    /// Block boundaries waited on
    pub blocks: u64,
    /// Ready polls that found the latch busy
    pub ready_stalls: u64,
    /// Done polls that found the transform running
    pub done_stalls: u32,
}

/// Pack up to four message bytes into an input word, first byte in bits 7:0
///
/// Missing trailing bytes read as zero.
#[must_use]
pub fn assemble_word(bytes: &[u8]) -> u32 {
    let mut lanes = [0u8; WORD_SIZE];
    let n = bytes.len().min(WORD_SIZE);
    lanes[..n].copy_from_slice(&bytes[..n]);
    u32::from_le_bytes(lanes)
}

/// Reset the accelerator and program its mode
///
/// # Errors
/// `HalError::Timeout` if the reset does not complete within
/// `timing.reset_polls` polls.
pub fn reset_accelerator<A, W>(accel: &mut A, wait: &mut W, timing: &FeedTiming, mode: AccelMode) -> HalResult<()>
where
    A: HashAccelerator + ?Sized,
    W: BusyWait + ?Sized,
{
    accel.request_reset();
    wait_until(wait, timing.reset_polls, 1, || !accel.reset_pending())?;
    accel.configure(mode);
    Ok(())
}

/// Bounded poll on an accelerator status bit that gives up as soon as the
/// accelerator latches a fault
fn poll_status<A, W, F>(accel: &mut A, wait: &mut W, budget: u32, step_us: u32, mut status: F) -> HalResult<u32>
where
    A: HashAccelerator + ?Sized,
    W: BusyWait + ?Sized,
    F: FnMut(&mut A) -> bool,
{
    let mut faulted = false;
    let polls = wait_until(wait, budget, step_us, || {
        faulted = accel.fault_latched();
        faulted || status(&mut *accel)
    });
    if faulted {
        return Err(HalError::HardwareFault);
    }
    polls
}

/// Run one complete transform over `message` and store the digest in `out`
///
/// # Errors
/// - `HalError::Timeout` if a ready wait or the done wait runs out
/// - `HalError::HardwareFault` if the accelerator latches a fault
/// - `HalError::InvalidParameter` if the message is too long for the
///   length register
pub fn run_transform<A, W>(
    accel: &mut A,
    wait: &mut W,
    timing: &FeedTiming,
    mode: AccelMode,
    message: &[u8],
    out: &mut [u8; SHA256_DIGEST_SIZE],
) -> HalResult<FeedReport>
where
    A: HashAccelerator + ?Sized,
    W: BusyWait + ?Sized,
{
    let params = compute_padding(message.len() as u64);
    let mut report = FeedReport::default();

    accel.configure(mode);
    accel.set_word_count(params.word_count)?;
    accel.set_padding(params.valid_byte_code, params.pad_packet_count)?;
    accel.start();

    for (index, chunk) in message.chunks(WORD_SIZE).enumerate() {
        accel.write_word(assemble_word(chunk));
        report.words += 1;

        if (index + 1) % WORDS_PER_BLOCK == 0 {
            wait.settle(timing.settle_cycles);
            let stalls = poll_status(accel, wait, timing.ready_polls, 0, |a| a.is_ready())?;
            report.ready_stalls += u64::from(stalls);
            report.blocks += 1;
        }
    }

    report.done_stalls = poll_status(accel, wait, timing.done_polls, 1, |a| a.is_done())?;
    accel.clear_done();

    for (index, lanes) in out.chunks_exact_mut(WORD_SIZE).enumerate().take(SHA256_DIGEST_WORDS) {
        lanes.copy_from_slice(&accel.read_digest_word(index)?.to_le_bytes());
    }

    Ok(report)
}
