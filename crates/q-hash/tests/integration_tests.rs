// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for q-hash
//!
//! Every test drives a `HashEngine` over the simulated accelerator from
//! `q-hal` and checks digests against the `sha2` software implementation.

use q_common::{Error, HashAlgorithm, HashEngineConfig};
use q_hal::sim::{RecordingWait, SimTiming, SimulatedSha256};
use q_hash::HashEngine;
use sha2::{Digest as _, Sha256};

type Engine = HashEngine<SimulatedSha256, RecordingWait>;

fn engine_with(timing: SimTiming, config: HashEngineConfig) -> Engine {
    HashEngine::new(SimulatedSha256::new(timing), RecordingWait::new(), config).unwrap()
}

fn engine() -> Engine {
    engine_with(SimTiming::REALISTIC, HashEngineConfig::DEFAULT)
}

fn reference(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

fn counter_pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i & 0xFF) as u8).collect()
}

/// Hash `data` in chunks whose sizes cycle through `chunk_sizes`
fn chunked(engine: &mut Engine, data: &[u8], chunk_sizes: &[usize]) -> [u8; 32] {
    let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
    let mut offset = 0;
    let mut sizes = chunk_sizes.iter().cycle();
    while offset < data.len() {
        let size = (*sizes.next().unwrap()).min(data.len() - offset);
        engine.update(&handle, &data[offset..offset + size]).unwrap();
        offset += size;
    }
    let mut out = [0u8; 32];
    engine.finalize(&handle, &mut out).unwrap();
    engine.free(&handle);
    out
}

mod known_answer_tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_abc() {
        let mut engine = engine();
        assert_eq!(
            engine.digest(b"abc").unwrap().as_bytes(),
            &hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn test_empty() {
        let mut engine = engine();
        assert_eq!(
            engine.digest(b"").unwrap().as_bytes(),
            &hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn test_nist_448_bit_message() {
        let mut engine = engine();
        let message = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
        assert_eq!(
            engine.digest(message).unwrap().as_bytes(),
            &hex!("248d6a61d20638b8e5c026930c3e6039a33ce45964ff2167f6ecedd419db06c1")
        );
    }

    #[test]
    fn test_empty_session_without_update() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        let mut out = [0u8; 32];
        engine.finalize(&handle, &mut out).unwrap();
        assert_eq!(out, reference(b""));
    }

    #[test]
    fn test_400_kib_counter_pattern_in_64_kib_chunks() {
        let mut engine = engine();
        for len in [409_600usize, 409_601, 409_602, 409_603] {
            let data = counter_pattern(len);
            assert_eq!(chunked(&mut engine, &data, &[64 * 1024]), reference(&data), "len {len}");
        }
    }

    #[test]
    fn test_firmware_preset_with_size_hint() {
        let mut engine = engine_with(SimTiming::REALISTIC, HashEngineConfig::FIRMWARE_IMAGE);
        let data = counter_pattern(300 * 1024 + 7);
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.set_expected_total_length(&handle, data.len() as u64).unwrap();
        for chunk in data.chunks(64 * 1024) {
            engine.update(&handle, chunk).unwrap();
        }
        let mut out = [0u8; 32];
        engine.finalize(&handle, &mut out).unwrap();
        engine.free(&handle);
        assert_eq!(out, reference(&data));
    }
}

mod chunking_tests {
    use super::*;

    #[test]
    fn test_one_shot_equals_chunked_around_inline_threshold() {
        let mut engine = engine();
        for len in [255usize, 256, 257] {
            let data = counter_pattern(len);
            let expected = reference(&data);
            assert_eq!(chunked(&mut engine, &data, &[len]), expected, "one-shot {len}");
            assert_eq!(chunked(&mut engine, &data, &[1]), expected, "bytewise {len}");
            assert_eq!(chunked(&mut engine, &data, &[100, 3]), expected, "mixed {len}");
        }
    }

    #[test]
    fn test_one_shot_equals_chunked_around_preallocation() {
        let mut engine = engine();
        for len in [4095usize, 4096, 4097] {
            let data = counter_pattern(len);
            let expected = reference(&data);
            assert_eq!(chunked(&mut engine, &data, &[len]), expected, "one-shot {len}");
            assert_eq!(chunked(&mut engine, &data, &[64]), expected, "blocks {len}");
        }
    }

    #[test]
    fn test_alternating_73_and_257_byte_chunks() {
        let mut engine = engine();
        let data: Vec<u8> = (0..10_000u32).map(|i| (i.wrapping_mul(31) >> 3) as u8).collect();
        assert_eq!(chunked(&mut engine, &data, &[73, 257]), reference(&data));
    }

    #[test]
    fn test_empty_updates_are_ignored() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.update(&handle, b"").unwrap();
        engine.update(&handle, b"ab").unwrap();
        engine.update(&handle, b"").unwrap();
        engine.update(&handle, b"c").unwrap();
        let mut out = [0u8; 32];
        engine.finalize(&handle, &mut out).unwrap();
        assert_eq!(out, reference(b"abc"));
    }

    #[test]
    fn test_migration_happens_once_past_inline_capacity() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.update(&handle, &[0u8; 256]).unwrap();
        assert!(engine.is_inline());
        engine.update(&handle, &[0u8; 1]).unwrap();
        assert!(!engine.is_inline());
        assert_eq!(engine.buffered_len(), 257);
        engine.free(&handle);
    }
}

mod capacity_tests {
    use super::*;

    #[test]
    fn test_cap_rejects_without_partial_append() {
        let config = HashEngineConfig::DEFAULT
            .with_preallocation_size(1024)
            .with_max_accumulation_size(2048);
        let mut engine = engine_with(SimTiming::INSTANT, config);

        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.update(&handle, &[1u8; 2000]).unwrap();
        assert_eq!(engine.update(&handle, &[2u8; 49]), Err(Error::CapacityExceeded));
        assert_eq!(engine.buffered_len(), 2000);

        // Still Active: the cap is exactly reachable and the digest is intact
        engine.update(&handle, &[2u8; 48]).unwrap();
        let mut out = [0u8; 32];
        engine.finalize(&handle, &mut out).unwrap();
        let mut expected = vec![1u8; 2000];
        expected.extend_from_slice(&[2u8; 48]);
        assert_eq!(out, reference(&expected));

        engine.free(&handle);
        assert_eq!(engine.digest(b"abc").unwrap().as_bytes(), &reference(b"abc"));
    }

    #[test]
    fn test_single_oversized_chunk() {
        let config = HashEngineConfig::CONSTRAINED;
        let mut engine = engine_with(SimTiming::INSTANT, config);
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        let data = vec![0u8; config.max_accumulation_size + 1];
        assert_eq!(engine.update(&handle, &data), Err(Error::CapacityExceeded));
        assert!(engine.is_inline());
        engine.free(&handle);
        assert!(!engine.is_session_open());
    }
}

mod state_machine_tests {
    use super::*;
    use q_hash::{HashPacket, SessionState};

    #[test]
    fn test_operations_before_begin() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.free(&handle);

        let mut out = [0u8; 32];
        assert_eq!(engine.update(&handle, b"x"), Err(Error::InvalidState));
        assert_eq!(engine.finalize(&handle, &mut out), Err(Error::InvalidState));
        assert_eq!(engine.set_expected_total_length(&handle, 10), Err(Error::InvalidState));
    }

    #[test]
    fn test_double_begin() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        assert_eq!(engine.begin(HashAlgorithm::Sha256), Err(Error::AlreadyActive));
        engine.update(&handle, b"abc").unwrap();
        let mut out = [0u8; 32];
        engine.finalize(&handle, &mut out).unwrap();
        assert_eq!(out, reference(b"abc"));
    }

    #[test]
    fn test_begin_after_finalize_requires_free() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        let mut out = [0u8; 32];
        engine.finalize(&handle, &mut out).unwrap();
        assert_eq!(engine.begin(HashAlgorithm::Sha256), Err(Error::AlreadyActive));
        engine.free(&handle);
        assert!(engine.begin(HashAlgorithm::Sha256).is_ok());
    }

    #[test]
    fn test_unsupported_algorithm() {
        let mut engine = engine();
        for algorithm in [HashAlgorithm::Sha224, HashAlgorithm::Sha384, HashAlgorithm::Sha512] {
            assert_eq!(engine.begin(algorithm), Err(Error::UnsupportedAlgorithm));
        }
        assert!(!engine.is_session_open());
        assert_eq!(engine.accelerator().stats().resets, 0);
    }

    #[test]
    fn test_free_is_idempotent() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.update(&handle, &[9u8; 5000]).unwrap();
        engine.free(&handle);
        engine.free(&handle);
        assert_eq!(engine.state(), SessionState::Idle);
        assert!(!engine.is_session_open());
    }

    #[test]
    fn test_free_from_every_state() {
        let mut engine = engine();

        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.free(&handle);

        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        let mut out = [0u8; 32];
        engine.finalize(&handle, &mut out).unwrap();
        engine.free(&handle);

        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        let mut short = [0u8; 8];
        assert_eq!(engine.finalize(&handle, &mut short), Err(Error::InvalidArgument));
        assert_eq!(engine.state(), SessionState::Error);
        engine.free(&handle);
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn test_stale_handle_is_invalid_session() {
        let mut engine = engine();
        let stale = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.free(&stale);

        let current = engine.begin(HashAlgorithm::Sha256).unwrap();
        assert_ne!(stale.id(), current.id());
        assert_eq!(engine.update(&stale, b"x"), Err(Error::InvalidSession));

        // Freeing with the stale handle must not tear down the new session
        engine.free(&stale);
        assert!(engine.is_session_open());
        engine.update(&current, b"abc").unwrap();
        let mut out = [0u8; 32];
        engine.finalize(&current, &mut out).unwrap();
        assert_eq!(out, reference(b"abc"));
    }

    #[test]
    fn test_handle_from_other_engine_is_invalid_session() {
        let mut first = engine();
        let mut second = engine();
        let foreign = first.begin(HashAlgorithm::Sha256).unwrap();
        let own = second.begin(HashAlgorithm::Sha256).unwrap();
        assert_eq!(second.update(&foreign, b"x"), Err(Error::InvalidSession));
        assert!(second.update(&own, b"x").is_ok());
    }

    #[test]
    fn test_process_packet_flow() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.process(&handle, HashPacket::input(b"ab"), false).unwrap();
        let mut out = [0u8; 32];
        engine
            .process(&handle, HashPacket::with_output(b"c", &mut out), true)
            .unwrap();
        assert_eq!(out, reference(b"abc"));
    }

    #[test]
    fn test_output_longer_than_digest() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.update(&handle, b"abc").unwrap();
        let mut out = [0xEEu8; 40];
        engine.finalize(&handle, &mut out).unwrap();
        assert_eq!(out[..32], reference(b"abc"));
        assert_eq!(out[32..], [0xEE; 8]);
    }
}

mod hardware_fault_tests {
    use super::*;
    use q_common::log::LogLevel;
    use q_hash::SessionState;

    #[test]
    fn test_stalled_accelerator_times_out_and_poisons() {
        let config = HashEngineConfig::DEFAULT.with_hardware_timeout_us(500);
        let mut engine = engine_with(SimTiming::INSTANT, config);
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.update(&handle, b"abc").unwrap();

        engine.accelerator_mut().set_stall(true);
        let mut out = [0u8; 32];
        assert_eq!(engine.finalize(&handle, &mut out), Err(Error::Timeout));
        assert_eq!(out, [0u8; 32]);
        assert_eq!(engine.state(), SessionState::Error);
        assert_eq!(engine.update(&handle, b"x"), Err(Error::InvalidState));
        assert_eq!(engine.finalize(&handle, &mut out), Err(Error::InvalidState));
        assert_eq!(engine.wait_primitive().pauses, 500);

        let last = engine.log().last().unwrap();
        assert_eq!(last.level, LogLevel::Error);

        engine.free(&handle);
        engine.accelerator_mut().set_stall(false);
        assert_eq!(engine.digest(b"abc").unwrap().as_bytes(), &reference(b"abc"));
    }

    #[test]
    fn test_stuck_reset_fails_begin() {
        let mut engine = engine();
        engine.accelerator_mut().set_reset_stuck(true);
        assert_eq!(engine.begin(HashAlgorithm::Sha256), Err(Error::Timeout));
        assert!(!engine.is_session_open());
    }
}

mod flow_control_tests {
    use super::*;

    #[test]
    fn test_no_overrun_at_any_ready_latency() {
        let data = counter_pattern(5000);
        let expected = reference(&data);
        for latency in [0u32, 1, 3, 17, 250] {
            let timing = SimTiming {
                block_busy_polls: latency,
                ..SimTiming::REALISTIC
            };
            let mut engine = engine_with(timing, HashEngineConfig::DEFAULT);
            assert_eq!(engine.digest(&data).unwrap().as_bytes(), &expected, "latency {latency}");
            assert_eq!(engine.accelerator().stats().overruns, 0);
            assert_eq!(engine.accelerator().fault(), None);
        }
    }

    #[test]
    fn test_one_ready_wait_per_full_block() {
        for len in [63usize, 64, 65, 1000, 4096] {
            let mut engine = engine();
            engine.digest(&counter_pattern(len)).unwrap();

            let full_blocks = ((len + 3) / 4 / 16) as u64;
            let wait = engine.wait_primitive();
            assert_eq!(wait.settles, full_blocks, "len {len}");
            assert_eq!(wait.settle_cycles, full_blocks * 6, "len {len}");
            assert_eq!(engine.accelerator().stats().block_boundaries, full_blocks);
        }
    }

    #[test]
    fn test_ready_budget_exhaustion_is_timeout() {
        let timing = SimTiming {
            block_busy_polls: 1_000,
            ..SimTiming::INSTANT
        };
        let config = HashEngineConfig::DEFAULT.with_hardware_timeout_us(100);
        let mut engine = engine_with(timing, config);
        assert_eq!(engine.digest(&[0u8; 64]), Err(Error::Timeout));
    }
}

mod padding_tests {
    use q_hash::compute_padding;

    #[test]
    fn test_branch_boundaries() {
        assert_eq!(compute_padding(55).pad_packet_count, 0);
        assert_eq!(compute_padding(56).pad_packet_count, 16);
    }

    #[test]
    fn test_dense_sweep_to_400_kib() {
        let mut len = 0u64;
        while len <= 409_600 {
            let p = compute_padding(len);
            assert!(p.pad_packet_count <= 16, "len {len}");
            assert!(p.is_block_aligned(), "len {len}");
            assert_eq!(p.word_count, (len + 3) / 4);
            assert_eq!(u64::from(p.valid_byte_code), len % 4);
            // Every residue of the first few blocks, then a stride coprime to 64
            len += if len < 4096 { 1 } else { 37 };
        }
    }

    #[test]
    fn test_padded_length_matches_fips_180_4() {
        for len in 0..=200u64 {
            let p = compute_padding(len);
            // Total padded bits: message + 1 + k zero bits + 64, k minimal
            let k = (448 + 512 - (len * 8 + 1) % 512) % 512;
            let padded_words = (len * 8 + 1 + k + 64) / 32;
            assert_eq!(p.total_words(), padded_words, "len {len}");
        }
    }
}

mod lifecycle_tests {
    use super::*;
    use q_common::log::LogLevel;
    use q_hash::CompletionEvent;
    use std::sync::Mutex;

    static EVENTS: Mutex<Vec<CompletionEvent>> = Mutex::new(Vec::new());

    fn record(event: &CompletionEvent) {
        EVENTS.lock().unwrap().push(event.clone());
    }

    #[test]
    fn test_completion_callback_receives_digest_and_errors() {
        let mut engine = engine();
        engine.set_completion_callback(Some(record));

        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.update(&handle, b"abc").unwrap();
        let mut out = [0u8; 32];
        engine.finalize(&handle, &mut out).unwrap();
        let ok_id = handle.id();
        engine.free(&handle);

        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.accelerator_mut().set_stall(true);
        assert_eq!(engine.finalize(&handle, &mut out), Err(Error::Timeout));
        let err_id = handle.id();
        engine.free(&handle);

        let events = EVENTS.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].session, ok_id);
        assert!(events[0].is_success());
        assert_eq!(events[0].outcome.as_ref().unwrap().as_bytes(), &reference(b"abc"));
        assert_eq!(events[1].session, err_id);
        assert_eq!(events[1].outcome, Err(Error::Timeout));
    }

    #[test]
    fn test_free_wipes_and_returns_to_inline() {
        let mut engine = engine();
        let handle = engine.begin(HashAlgorithm::Sha256).unwrap();
        engine.update(&handle, &[0x41u8; 10_000]).unwrap();
        assert!(!engine.is_inline());
        engine.free(&handle);
        assert_eq!(engine.buffered_len(), 0);
        assert!(engine.is_inline());

        let (sim, _) = engine.release();
        assert_eq!(sim.fault(), None);
    }

    #[test]
    fn test_log_sequence_is_monotonic() {
        let mut engine = engine();
        engine.log_mut().set_min_level(LogLevel::Trace);
        engine.digest(&[0u8; 1000]).unwrap();
        let sequences: Vec<u32> = engine.log().iter().map(|e| e.sequence).collect();
        assert!(sequences.windows(2).all(|w| w[0] <= w[1]));
        assert!(engine.log().iter().any(|e| e.level == LogLevel::Trace));
    }
}
