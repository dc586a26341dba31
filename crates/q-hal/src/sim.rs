// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Software model of the word-oriented SHA-256 accelerator
//!
//! Behaves like the silicon at the register level: it honours reset latency,
//! the byte-reversal bits, the word count and padding control, and appends
//! the FIPS 180-4 padding itself from the programmed padding packet count.
//! Only the compression function is delegated to `sha2`.
//!
//! Protocol violations never panic. They latch a [`SimFault`] and the model
//! then refuses to raise done, which is what a host sees on real hardware.

use sha2::compress256;
use sha2::digest::generic_array::GenericArray;

use crate::error::{HalError, HalResult};
use crate::traits::{AccelMode, BusyWait, HashAccelerator};

/// SHA-256 initial hash value (FIPS 180-4 section 5.3.3)
const H0: [u32; 8] = [
    0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a,
    0x510e_527f, 0x9b05_688c, 0x1f83_d9ab, 0x5be0_cd19,
];

/// Length register pair width
const MAX_WORD_COUNT: u64 = (1 << 59) - 1;

/// Latencies of the model, counted in status polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimTiming {
    /// Polls of `reset_pending` that still report the reset in progress
    pub reset_polls: u32,
    /// Polls of `is_ready` that report busy after each 16-word block
    pub block_busy_polls: u32,
    /// Polls of `is_done` that report busy after the last word
    pub done_polls: u32,
}

impl SimTiming {
    /// No latency anywhere
    pub const INSTANT: Self = Self {
        reset_polls: 0,
        block_busy_polls: 0,
        done_polls: 0,
    };

    /// Latencies in the range seen on silicon at a slow core clock
    pub const REALISTIC: Self = Self {
        reset_polls: 2,
        block_busy_polls: 4,
        done_polls: 8,
    };
}

/// Protocol violations latched by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    /// A word was written while the input latch was busy
    Overrun,
    /// More words were written than the programmed word count
    ExtraWord,
    /// A word was written before `start`
    NotStarted,
    /// The padding control does not close the last block
    PaddingMismatch,
}

/// Activity counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimStats {
    /// Resets requested
    pub resets: u32,
    /// Transforms started
    pub transforms: u32,
    /// Words pushed into the input port, accepted or not
    pub words_written: u64,
    /// Times the input latch went busy at a block boundary
    pub block_boundaries: u64,
    /// `is_ready` polls
    pub ready_polls: u64,
    /// `is_done` polls
    pub done_polls: u64,
    /// Words dropped because the latch was busy
    pub overruns: u32,
    /// 512-bit blocks compressed
    pub blocks_compressed: u64,
    /// Completion acknowledgements
    pub done_clears: u32,
}

/// Simulated SHA-256 accelerator
pub struct SimulatedSha256 {
    timing: SimTiming,
    mode: AccelMode,
    stall: bool,
    reset_stuck: bool,
    ready_stuck: bool,
    reset_countdown: u32,
    word_count: u64,
    valid_byte_code: u8,
    pad_packets: u8,
    running: bool,
    received: u64,
    message_bits: u64,
    state: [u32; 8],
    block: [u8; 64],
    block_len: usize,
    busy_countdown: u32,
    digest: Option<[u32; 8]>,
    done_countdown: u32,
    interrupt_pending: bool,
    fault: Option<SimFault>,
    stats: SimStats,
}

impl SimulatedSha256 {
    /// Create a model with the given latencies
    #[must_use]
    pub const fn new(timing: SimTiming) -> Self {
        Self {
            timing,
            mode: AccelMode {
                write_reverse: false,
                read_reverse: false,
                interrupt_enable: false,
            },
            stall: false,
            reset_stuck: false,
            ready_stuck: false,
            reset_countdown: 0,
            word_count: 0,
            valid_byte_code: 0,
            pad_packets: 0,
            running: false,
            received: 0,
            message_bits: 0,
            state: H0,
            block: [0; 64],
            block_len: 0,
            busy_countdown: 0,
            digest: None,
            done_countdown: 0,
            interrupt_pending: false,
            fault: None,
            stats: SimStats {
                resets: 0,
                transforms: 0,
                words_written: 0,
                block_boundaries: 0,
                ready_polls: 0,
                done_polls: 0,
                overruns: 0,
                blocks_compressed: 0,
                done_clears: 0,
            },
        }
    }

    /// Never raise done, as if the engine hung
    pub fn set_stall(&mut self, stall: bool) {
        self.stall = stall;
    }

    /// Keep the reset bit set forever
    pub fn set_reset_stuck(&mut self, stuck: bool) {
        self.reset_stuck = stuck;
    }

    /// Report ready even while the input latch is busy
    pub fn set_ready_stuck(&mut self, stuck: bool) {
        self.ready_stuck = stuck;
    }

    /// Activity counters
    #[must_use]
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// First protocol violation since the last reset
    #[must_use]
    pub const fn fault(&self) -> Option<SimFault> {
        self.fault
    }

    /// Currently programmed mode word
    #[must_use]
    pub const fn mode(&self) -> AccelMode {
        self.mode
    }

    /// Programmed word count
    #[must_use]
    pub const fn word_count(&self) -> u64 {
        self.word_count
    }

    /// Programmed padding control as `(valid_byte_code, pad_packets)`
    #[must_use]
    pub const fn padding(&self) -> (u8, u8) {
        (self.valid_byte_code, self.pad_packets)
    }

    /// Completion interrupt raised and not yet cleared
    #[must_use]
    pub const fn interrupt_pending(&self) -> bool {
        self.interrupt_pending
    }

    fn raise(&mut self, fault: SimFault) {
        if self.fault.is_none() {
            self.fault = Some(fault);
        }
    }

    fn absorb(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.block[self.block_len] = byte;
            self.block_len += 1;
            if self.block_len == self.block.len() {
                let block = GenericArray::clone_from_slice(&self.block);
                compress256(&mut self.state, &[block]);
                self.block_len = 0;
                self.stats.blocks_compressed += 1;
            }
        }
    }

    /// Append the hardware padding and latch the digest
    fn finish(&mut self) {
        self.running = false;

        let valid = usize::from(self.valid_byte_code);
        if valid != 0 {
            let mut tail = [0u8; 4];
            tail[0] = 0x80;
            self.absorb(&tail[..4 - valid]);
        }
        for i in 0..self.pad_packets {
            let mut packet = [0u8; 4];
            if i == 0 && valid == 0 {
                packet[0] = 0x80;
            }
            self.absorb(&packet);
        }
        let length = self.message_bits.to_be_bytes();
        self.absorb(&length);

        let marker_placed = valid != 0 || self.pad_packets != 0;
        if self.block_len != 0 || !marker_placed {
            self.raise(SimFault::PaddingMismatch);
            return;
        }
        if self.fault.is_none() {
            self.digest = Some(self.state);
            self.done_countdown = self.timing.done_polls;
        }
    }
}

impl Default for SimulatedSha256 {
    fn default() -> Self {
        Self::new(SimTiming::INSTANT)
    }
}

impl HashAccelerator for SimulatedSha256 {
    fn request_reset(&mut self) {
        let (timing, stall, reset_stuck, ready_stuck, mut stats) = (
            self.timing,
            self.stall,
            self.reset_stuck,
            self.ready_stuck,
            self.stats,
        );
        stats.resets += 1;

        *self = Self::new(timing);
        self.stall = stall;
        self.reset_stuck = reset_stuck;
        self.ready_stuck = ready_stuck;
        self.stats = stats;
        self.reset_countdown = timing.reset_polls;
    }

    fn reset_pending(&mut self) -> bool {
        if self.reset_stuck {
            return true;
        }
        if self.reset_countdown > 0 {
            self.reset_countdown -= 1;
            return true;
        }
        false
    }

    fn configure(&mut self, mode: AccelMode) {
        self.mode = mode;
    }

    fn set_word_count(&mut self, words: u64) -> HalResult<()> {
        if words > MAX_WORD_COUNT {
            return Err(HalError::InvalidParameter);
        }
        self.word_count = words;
        Ok(())
    }

    fn set_padding(&mut self, valid_byte_code: u8, pad_packets: u8) -> HalResult<()> {
        if valid_byte_code > 3 || pad_packets > 0x1F {
            return Err(HalError::InvalidParameter);
        }
        self.valid_byte_code = valid_byte_code;
        self.pad_packets = pad_packets;
        Ok(())
    }

    fn start(&mut self) {
        self.stats.transforms += 1;
        self.running = true;
        self.received = 0;
        self.message_bits = 0;
        self.state = H0;
        self.block = [0; 64];
        self.block_len = 0;
        self.busy_countdown = 0;
        self.digest = None;
        self.interrupt_pending = false;

        if self.word_count == 0 {
            self.finish();
        }
    }

    fn write_word(&mut self, word: u32) {
        self.stats.words_written += 1;

        if !self.running {
            self.raise(SimFault::NotStarted);
            return;
        }
        if self.busy_countdown > 0 {
            self.stats.overruns += 1;
            self.raise(SimFault::Overrun);
            return;
        }
        if self.received >= self.word_count {
            self.raise(SimFault::ExtraWord);
            return;
        }

        let bytes = if self.mode.write_reverse {
            word.to_le_bytes()
        } else {
            word.to_be_bytes()
        };
        self.received += 1;

        let last = self.received == self.word_count;
        let valid = if last && self.valid_byte_code != 0 {
            usize::from(self.valid_byte_code)
        } else {
            4
        };
        self.absorb(&bytes[..valid]);
        self.message_bits += (valid as u64) * 8;

        if self.received % 16 == 0 {
            self.stats.block_boundaries += 1;
            self.busy_countdown = self.timing.block_busy_polls;
        }
        if last {
            self.finish();
        }
    }

    fn is_ready(&mut self) -> bool {
        self.stats.ready_polls += 1;
        if self.ready_stuck {
            return true;
        }
        if self.busy_countdown > 0 {
            self.busy_countdown -= 1;
            return false;
        }
        true
    }

    fn is_done(&mut self) -> bool {
        self.stats.done_polls += 1;
        if self.stall || self.fault.is_some() || self.digest.is_none() {
            return false;
        }
        if self.done_countdown > 0 {
            self.done_countdown -= 1;
            return false;
        }
        if self.mode.interrupt_enable {
            self.interrupt_pending = true;
        }
        true
    }

    fn fault_latched(&mut self) -> bool {
        self.fault.is_some()
    }

    fn clear_done(&mut self) {
        self.stats.done_clears += 1;
        self.interrupt_pending = false;
    }

    fn read_digest_word(&mut self, index: usize) -> HalResult<u32> {
        if index >= 8 {
            return Err(HalError::InvalidParameter);
        }
        let word = self.digest.map_or(0, |digest| digest[index]);
        Ok(if self.mode.read_reverse {
            word.swap_bytes()
        } else {
            word
        })
    }
}

/// Busy-wait that records requests instead of spinning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordingWait {
    /// `settle` calls
    pub settles: u64,
    /// Cycles requested across all `settle` calls
    pub settle_cycles: u64,
    /// `pause_us` calls
    pub pauses: u64,
    /// Microseconds requested across all `pause_us` calls
    pub paused_us: u64,
}

impl RecordingWait {
    /// Create a zeroed recorder
    #[must_use]
    pub const fn new() -> Self {
        Self {
            settles: 0,
            settle_cycles: 0,
            pauses: 0,
            paused_us: 0,
        }
    }
}

impl BusyWait for RecordingWait {
    fn settle(&mut self, cycles: u32) {
        self.settles += 1;
        self.settle_cycles += u64::from(cycles);
    }

    fn pause_us(&mut self, us: u32) {
        self.pauses += 1;
        self.paused_us += u64::from(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the model the way a careful host would, with words assembled
    /// little-endian and byte reversal on both sides
    fn run(sim: &mut SimulatedSha256, message: &[u8], valid: u8, pad: u8) -> Option<[u8; 32]> {
        let words = (message.len() as u64 + 3) / 4;
        sim.request_reset();
        while sim.reset_pending() {}
        sim.configure(AccelMode::SHA256_STREAM);
        sim.set_word_count(words).ok()?;
        sim.set_padding(valid, pad).ok()?;
        sim.start();
        for (i, chunk) in message.chunks(4).enumerate() {
            let mut lanes = [0u8; 4];
            lanes[..chunk.len()].copy_from_slice(chunk);
            sim.write_word(u32::from_le_bytes(lanes));
            if (i + 1) % 16 == 0 {
                while !sim.is_ready() {}
            }
        }
        for _ in 0..64 {
            if sim.is_done() {
                let mut out = [0u8; 32];
                for i in 0..8 {
                    let word = sim.read_digest_word(i).ok()?;
                    out[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
                }
                return Some(out);
            }
        }
        None
    }

    #[test]
    fn test_abc() {
        let mut sim = SimulatedSha256::new(SimTiming::REALISTIC);
        let digest = run(&mut sim, b"abc", 3, 13);
        assert_eq!(
            digest,
            Some(hex_literal::hex!(
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
            ))
        );
    }

    #[test]
    fn test_empty_message() {
        let mut sim = SimulatedSha256::default();
        let digest = run(&mut sim, b"", 0, 14);
        assert_eq!(
            digest,
            Some(hex_literal::hex!(
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
            ))
        );
    }

    #[test]
    fn test_wrong_padding_never_completes() {
        let mut sim = SimulatedSha256::default();
        assert_eq!(run(&mut sim, b"abc", 3, 12), None);
        assert_eq!(sim.fault(), Some(SimFault::PaddingMismatch));
    }

    #[test]
    fn test_write_while_busy_is_an_overrun() {
        let mut sim = SimulatedSha256::new(SimTiming::REALISTIC);
        sim.configure(AccelMode::SHA256_STREAM);
        sim.set_word_count(32).unwrap();
        sim.set_padding(0, 14).unwrap();
        sim.start();
        for _ in 0..17 {
            sim.write_word(0);
        }
        assert_eq!(sim.stats().overruns, 1);
        assert_eq!(sim.fault(), Some(SimFault::Overrun));
        assert!(!sim.is_done());
    }

    #[test]
    fn test_stuck_ready_lets_writes_overrun() {
        let mut sim = SimulatedSha256::new(SimTiming::REALISTIC);
        sim.set_ready_stuck(true);
        sim.configure(AccelMode::SHA256_STREAM);
        sim.set_word_count(32).unwrap();
        sim.set_padding(0, 14).unwrap();
        sim.start();
        for _ in 0..16 {
            sim.write_word(0);
        }
        assert!(sim.is_ready());
        assert!(!sim.fault_latched());
        sim.write_word(0);
        assert!(sim.fault_latched());

        sim.request_reset();
        assert!(!sim.fault_latched());
        assert!(sim.is_ready());
    }

    #[test]
    fn test_reset_clears_fault_but_keeps_counters() {
        let mut sim = SimulatedSha256::default();
        sim.write_word(0);
        assert_eq!(sim.fault(), Some(SimFault::NotStarted));
        sim.request_reset();
        assert_eq!(sim.fault(), None);
        assert_eq!(sim.stats().words_written, 1);
        assert_eq!(sim.stats().resets, 1);
    }

    #[test]
    fn test_register_field_limits() {
        let mut sim = SimulatedSha256::default();
        assert_eq!(sim.set_padding(4, 0), Err(HalError::InvalidParameter));
        assert_eq!(sim.set_padding(0, 32), Err(HalError::InvalidParameter));
        assert_eq!(sim.read_digest_word(8), Err(HalError::InvalidParameter));
    }
}
