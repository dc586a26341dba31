// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Hash engine and session state machine
//!
//! A [`HashEngine`] owns one accelerator and runs at most one session at a
//! time. A session is bound to the engine from `begin` until `free`:
//!
//! ```text
//! Idle --begin--> Active --finalize--> Busy --ok--> Idle
//!                   |  ^                 |
//!                update |                +--hardware error/bad output--> Error
//! ```
//!
//! `Error` is terminal until the session is freed. A finished session stays
//! bound (so another `finalize` reports `InvalidState`) until it is freed,
//! which is also when its buffered plaintext is wiped.

use core::sync::atomic::{AtomicU32, Ordering};

use q_common::constants::{INLINE_STORAGE_SIZE, SHA256_DIGEST_SIZE};
use q_common::log::LogBuffer;
use q_common::{log_debug, log_error, log_info, log_trace, log_warn};
use q_common::{Digest, Error, HashAlgorithm, HashEngineConfig, Result};
use q_hal::{AccelMode, BusyWait, HashAccelerator};
use zeroize::Zeroize;

use crate::buffer::{BufferLimits, Growth, SessionBuffer};
use crate::feed::{self, FeedTiming};
use crate::notify::{CompletionCallback, CompletionEvent};

/// Module tag for log entries
const MODULE: &str = "q-hash";

/// Session ids are unique across every engine in the image
static NEXT_SESSION_ID: AtomicU32 = AtomicU32::new(1);

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No computation in progress
    Idle,
    /// Accepting input
    Active,
    /// Finalize in progress
    Busy,
    /// Hardware failed or output was invalid; only `free` is accepted
    Error,
}

/// Token for the session a `begin` call opened
///
/// Neither `Clone` nor `Copy`: the only way to obtain one is `begin`. A handle
/// stays usable after `free` but is then stale and rejected.
#[derive(Debug, PartialEq, Eq)]
pub struct SessionHandle {
    id: u32,
}

impl SessionHandle {
    /// Session id, unique across engines until the counter wraps
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }
}

/// Input/output pair for [`HashEngine::process`]
///
/// Missing buffers are reported as `NullBuffer` instead of being treated as
/// empty.
#[derive(Debug, Default)]
pub struct HashPacket<'a> {
    /// Message bytes to append
    pub input: Option<&'a [u8]>,
    /// Digest destination, used when finishing
    pub output: Option<&'a mut [u8]>,
}

impl<'a> HashPacket<'a> {
    /// Packet carrying input only
    #[must_use]
    pub const fn input(data: &'a [u8]) -> Self {
        Self {
            input: Some(data),
            output: None,
        }
    }

    /// Packet carrying a digest destination only, for finishing
    #[must_use]
    pub fn output(out: &'a mut [u8]) -> Self {
        Self {
            input: None,
            output: Some(out),
        }
    }

    /// Packet carrying input and a digest destination
    #[must_use]
    pub fn with_output(data: &'a [u8], out: &'a mut [u8]) -> Self {
        Self {
            input: Some(data),
            output: Some(out),
        }
    }
}

/// One bound session
struct Session<const N: usize> {
    id: u32,
    state: SessionState,
    buffer: SessionBuffer<N>,
    total_length: u64,
}

/// Find the session `handle` refers to
fn bind<'s, const N: usize>(
    slot: &'s mut Option<Session<N>>,
    handle: &SessionHandle,
) -> Result<&'s mut Session<N>> {
    match slot {
        None => Err(Error::InvalidState),
        Some(session) if session.id != handle.id => Err(Error::InvalidSession),
        Some(session) => Ok(session),
    }
}

/// SHA-256 offload engine
///
/// Generic over the accelerator `A`, the busy-wait primitive `W`, and the
/// inline storage size `INLINE`.
pub struct HashEngine<A, W, const INLINE: usize = INLINE_STORAGE_SIZE> {
    accel: A,
    wait: W,
    config: HashEngineConfig,
    timing: FeedTiming,
    session: Option<Session<INLINE>>,
    sequence: u32,
    callback: Option<CompletionCallback>,
    log: LogBuffer,
}

impl<A, W, const INLINE: usize> HashEngine<A, W, INLINE>
where
    A: HashAccelerator,
    W: BusyWait,
{
    /// Create an engine around an accelerator
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration fails validation.
    pub fn new(accel: A, wait: W, config: HashEngineConfig) -> Result<Self> {
        config.validate()?;

        let mut engine = Self {
            accel,
            wait,
            config,
            timing: FeedTiming::from(&config),
            session: None,
            sequence: 0,
            callback: None,
            log: LogBuffer::with_min_level(config.log_level),
        };
        log_info!(
            engine.log,
            engine.sequence,
            MODULE,
            "engine up: inline {} prealloc {} cap {}",
            config.inline_buffer_capacity.min(INLINE),
            config.preallocation_size,
            config.max_accumulation_size
        );
        Ok(engine)
    }

    /// Configuration in force
    #[must_use]
    pub const fn config(&self) -> &HashEngineConfig {
        &self.config
    }

    /// Event log
    #[must_use]
    pub const fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Event log, for draining or changing the filter level
    pub fn log_mut(&mut self) -> &mut LogBuffer {
        &mut self.log
    }

    /// The accelerator
    #[must_use]
    pub const fn accelerator(&self) -> &A {
        &self.accel
    }

    /// The accelerator, for fault injection or interrupt servicing
    pub fn accelerator_mut(&mut self) -> &mut A {
        &mut self.accel
    }

    /// The busy-wait primitive
    #[must_use]
    pub const fn wait_primitive(&self) -> &W {
        &self.wait
    }

    /// Operation sequence number stamped on log entries
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// State of the bound session, `Idle` if none
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.as_ref().map_or(SessionState::Idle, |s| s.state)
    }

    /// Check if a session is bound
    #[must_use]
    pub const fn is_session_open(&self) -> bool {
        self.session.is_some()
    }

    /// Bytes buffered by the bound session
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.buffer.len())
    }

    /// Check if the bound session still uses inline storage
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.session.as_ref().map_or(true, |s| s.buffer.is_inline())
    }

    /// Register or remove the completion callback
    pub fn set_completion_callback(&mut self, callback: Option<CompletionCallback>) {
        self.callback = callback;
    }

    /// Tear the engine down and return its parts
    ///
    /// Any bound session is wiped first.
    pub fn release(mut self) -> (A, W) {
        if let Some(mut session) = self.session.take() {
            session.buffer.wipe();
        }
        (self.accel, self.wait)
    }

    fn tick(&mut self) -> u32 {
        self.sequence = self.sequence.wrapping_add(1);
        self.sequence
    }

    fn mode(&self) -> AccelMode {
        AccelMode::SHA256_STREAM.with_interrupt(self.config.interrupt_notify)
    }

    /// Open a session
    ///
    /// Resets the accelerator and programs byte reversal in both directions.
    ///
    /// # Errors
    /// - `AlreadyActive` if a session is bound
    /// - `UnsupportedAlgorithm` unless `algorithm` is SHA-256
    /// - `Timeout` if the accelerator reset does not complete
    pub fn begin(&mut self, algorithm: HashAlgorithm) -> Result<SessionHandle> {
        let seq = self.tick();

        if let Some(session) = &self.session {
            log_warn!(self.log, seq, MODULE, "begin rejected: session {} open", session.id);
            return Err(Error::AlreadyActive);
        }
        if !algorithm.is_hardware_supported() {
            log_warn!(self.log, seq, MODULE, "begin rejected: {} not supported", algorithm);
            return Err(Error::UnsupportedAlgorithm);
        }

        let mode = self.mode();
        if let Err(e) = feed::reset_accelerator(&mut self.accel, &mut self.wait, &self.timing, mode) {
            log_error!(self.log, seq, MODULE, "accelerator reset failed: {}", e);
            return Err(e.into());
        }

        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        self.session = Some(Session {
            id,
            state: SessionState::Active,
            buffer: SessionBuffer::new(BufferLimits::from(&self.config)),
            total_length: 0,
        });

        log_info!(self.log, seq, MODULE, "session {} begin", id);
        Ok(SessionHandle { id })
    }

    /// Append message bytes
    ///
    /// Never touches the hardware. An empty chunk is accepted and ignored.
    ///
    /// # Errors
    /// - `InvalidState` if no session is bound or it is not `Active`
    /// - `InvalidSession` if `handle` is not the bound session
    /// - `CapacityExceeded` if the message would pass the configured cap;
    ///   the session stays `Active` with its earlier bytes intact
    pub fn update(&mut self, handle: &SessionHandle, data: &[u8]) -> Result<()> {
        self.append(handle, Some(data))
    }

    /// Write the digest of everything appended so far into `out`
    ///
    /// # Errors
    /// - `InvalidState` if no session is bound or it is not `Active`
    /// - `InvalidSession` if `handle` is not the bound session
    /// - `InvalidArgument` if `out` is shorter than 32 bytes (poisons the
    ///   session)
    /// - `Timeout` if the accelerator stops responding (poisons the session)
    /// - `HardwareFault` if the accelerator latches a fault (poisons the
    ///   session)
    pub fn finalize(&mut self, handle: &SessionHandle, out: &mut [u8]) -> Result<()> {
        self.complete(handle, Some(out)).map(|_| ())
    }

    /// Zephyr-style packet entry point: append `packet.input`, then finalize
    /// into `packet.output` when `finish` is set
    ///
    /// A finishing packet may omit the input; nothing is appended then.
    ///
    /// # Errors
    /// As `update` and `finalize`, plus `NullBuffer` if a non-finishing packet
    /// lacks the input, or a finishing one lacks the output. A missing output
    /// leaves the session `Active`.
    pub fn process(&mut self, handle: &SessionHandle, packet: HashPacket<'_>, finish: bool) -> Result<()> {
        if packet.input.is_some() || !finish {
            self.append(handle, packet.input)?;
        }
        if finish {
            self.complete(handle, packet.output)?;
        }
        Ok(())
    }

    /// Size hint for the message the session will receive
    ///
    /// Sizes the heap buffer up front so large streamed messages do not
    /// reallocate. Never changes the digest.
    ///
    /// # Errors
    /// - `InvalidState` if no session is bound or it is not `Active`
    /// - `InvalidSession` if `handle` is not the bound session
    pub fn set_expected_total_length(&mut self, handle: &SessionHandle, total: u64) -> Result<()> {
        let seq = self.tick();
        let session = bind(&mut self.session, handle)?;
        if session.state != SessionState::Active {
            return Err(Error::InvalidState);
        }

        let total = usize::try_from(total).unwrap_or(usize::MAX);
        if let Growth::Grew { from, to } = session.buffer.set_expected_total(total) {
            log_debug!(self.log, seq, MODULE, "session {} reserve {} -> {}", session.id, from, to);
        }
        Ok(())
    }

    /// Wipe and release the session
    ///
    /// Valid in every state and idempotent. A handle that does not own the
    /// bound session is ignored.
    pub fn free(&mut self, handle: &SessionHandle) {
        let seq = self.tick();

        match self.session.as_ref().map(|s| s.id) {
            None => {}
            Some(owner) if owner != handle.id => {
                log_warn!(
                    self.log,
                    seq,
                    MODULE,
                    "free ignored: handle {} does not own session {}",
                    handle.id,
                    owner
                );
            }
            Some(owner) => {
                if let Some(mut session) = self.session.take() {
                    session.buffer.wipe();
                }
                log_info!(self.log, seq, MODULE, "session {} freed", owner);
            }
        }
    }

    /// Hash `data` in one call
    ///
    /// The session is freed on every path.
    ///
    /// # Errors
    /// Any error of `begin`, `update` or `finalize`.
    pub fn digest(&mut self, data: &[u8]) -> Result<Digest> {
        let handle = self.begin(HashAlgorithm::Sha256)?;
        let mut out = [0u8; SHA256_DIGEST_SIZE];
        let result = self
            .update(&handle, data)
            .and_then(|()| self.complete(&handle, Some(&mut out[..])));
        out.zeroize();
        self.free(&handle);
        result
    }

    fn append(&mut self, handle: &SessionHandle, data: Option<&[u8]>) -> Result<()> {
        let seq = self.tick();
        let session = bind(&mut self.session, handle)?;
        if session.state != SessionState::Active {
            return Err(Error::InvalidState);
        }
        let data = data.ok_or(Error::NullBuffer)?;

        match session.buffer.append(data) {
            Ok(Growth::None) => {}
            Ok(Growth::Migrated { capacity }) => {
                log_debug!(
                    self.log,
                    seq,
                    MODULE,
                    "session {} inline -> heap, capacity {}",
                    session.id,
                    capacity
                );
            }
            Ok(Growth::Grew { from, to }) => {
                log_debug!(self.log, seq, MODULE, "session {} grow {} -> {}", session.id, from, to);
            }
            Err(e) => {
                log_warn!(
                    self.log,
                    seq,
                    MODULE,
                    "session {} rejected {} bytes at {}: {}",
                    session.id,
                    data.len(),
                    session.total_length,
                    e
                );
                return Err(e);
            }
        }

        session.total_length += data.len() as u64;
        Ok(())
    }

    fn complete(&mut self, handle: &SessionHandle, out: Option<&mut [u8]>) -> Result<Digest> {
        let seq = self.tick();
        let mode = self.mode();
        let session = bind(&mut self.session, handle)?;
        if session.state != SessionState::Active {
            return Err(Error::InvalidState);
        }
        let out = out.ok_or(Error::NullBuffer)?;

        session.state = SessionState::Busy;
        if out.len() < SHA256_DIGEST_SIZE {
            session.state = SessionState::Error;
            log_error!(
                self.log,
                seq,
                MODULE,
                "session {} poisoned: output {} bytes",
                session.id,
                out.len()
            );
            return Err(Error::InvalidArgument);
        }

        let mut digest = [0u8; SHA256_DIGEST_SIZE];
        let result = feed::run_transform(
            &mut self.accel,
            &mut self.wait,
            &self.timing,
            mode,
            session.buffer.as_slice(),
            &mut digest,
        );

        let outcome = match result {
            Ok(report) => {
                out[..SHA256_DIGEST_SIZE].copy_from_slice(&digest);
                session.state = SessionState::Idle;
                log_trace!(
                    self.log,
                    seq,
                    MODULE,
                    "session {} fed {} words, {} ready stalls, {} done stalls",
                    session.id,
                    report.words,
                    report.ready_stalls,
                    report.done_stalls
                );
                log_info!(
                    self.log,
                    seq,
                    MODULE,
                    "session {} digest over {} bytes",
                    session.id,
                    session.total_length
                );
                Ok(Digest::new(digest))
            }
            Err(e) => {
                let err = Error::from(e);
                session.state = SessionState::Error;
                log_error!(self.log, seq, MODULE, "session {} poisoned: {}", session.id, err);
                Err(err)
            }
        };
        digest.zeroize();

        let event = CompletionEvent {
            session: session.id,
            outcome,
        };
        if let Some(callback) = self.callback {
            callback(&event);
        }
        event.outcome
    }
}
