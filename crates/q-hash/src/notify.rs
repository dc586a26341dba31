// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Completion notification
//!
//! An optional side channel for callers that want to hear about finalize
//! outcomes without threading the return value through their own code. The
//! synchronous return value of `finalize` is always authoritative.

use q_common::{Digest, Result};

/// Outcome of one finalize that reached the hardware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEvent {
    /// Id of the session that finalized
    pub session: u32,
    /// Digest, or the error that poisoned the session
    pub outcome: Result<Digest>,
}

impl CompletionEvent {
    /// Check if the transform produced a digest
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Callback invoked with each completion event
///
/// Runs synchronously inside `finalize`, on the caller's stack. The event is
/// borrowed; a callback that keeps the digest owns the clone it makes.
pub type CompletionCallback = fn(&CompletionEvent);
