// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Message buffering
//!
//! The accelerator cannot resume a partial transform, so a session keeps the
//! whole message until finalize. Short messages stay in a fixed inline array;
//! the first append that would overflow it moves everything to a heap
//! [`AccumulationBuffer`] that grows by doubling up to a hard cap.
//!
//! # Security
//!
//! Every copy of buffered plaintext is zeroized before its memory is
//! released: after migration, after each growth step, and on wipe/drop.

use alloc::vec::Vec;
use core::cmp::max;

use q_common::{Error, HashEngineConfig, Result};
use zeroize::Zeroize;

/// Size limits applied to one session's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLimits {
    /// Largest message kept inline
    pub inline_capacity: usize,
    /// Minimum heap capacity on migration
    pub preallocation_size: usize,
    /// Start of the doubling sequence heap capacities are taken from
    pub initial_capacity: usize,
    /// Hard cap on the message length
    pub max_size: usize,
}

impl From<&HashEngineConfig> for BufferLimits {
    fn from(config: &HashEngineConfig) -> Self {
        Self {
            inline_capacity: config.inline_buffer_capacity,
            preallocation_size: config.preallocation_size,
            initial_capacity: config.initial_accumulation_capacity,
            max_size: config.max_accumulation_size,
        }
    }
}

/// Capacity change caused by an append or a size hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// Stored in place
    None,
    /// Moved from inline storage to the heap
    Migrated {
        /// Heap capacity after the move
        capacity: usize,
    },
    /// Heap buffer reallocated
    Grew {
        /// Capacity before
        from: usize,
        /// Capacity after
        to: usize,
    },
}

/// Next capacity in the doubling sequence that holds `need` bytes
fn next_capacity(current: usize, initial: usize, need: usize, max_size: usize) -> usize {
    let mut capacity = if current == 0 { max(initial, 1) } else { current };
    while capacity < need {
        capacity = capacity.saturating_mul(2);
    }
    capacity.min(max_size)
}

/// Growable heap buffer holding a whole message
///
/// `len <= capacity <= max_size` always holds. Growth never truncates: an
/// append that would pass `max_size`, or that the allocator refuses, fails
/// with `CapacityExceeded` and leaves the contents untouched.
pub struct AccumulationBuffer {
    data: Vec<u8>,
    capacity: usize,
    initial_capacity: usize,
    max_size: usize,
}

impl AccumulationBuffer {
    /// Create an empty buffer without allocating
    #[must_use]
    pub const fn new(initial_capacity: usize, max_size: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity: 0,
            initial_capacity,
            max_size,
        }
    }

    /// Create an empty buffer with `capacity` bytes reserved (clamped to
    /// `max_size`)
    ///
    /// # Errors
    /// `CapacityExceeded` if the allocation fails.
    pub fn with_capacity(capacity: usize, initial_capacity: usize, max_size: usize) -> Result<Self> {
        let mut buffer = Self::new(initial_capacity, max_size);
        let capacity = capacity.min(max_size);
        if capacity > 0 {
            buffer.reallocate(capacity)?;
        }
        Ok(buffer)
    }

    /// Number of buffered bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing is buffered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reserved capacity
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Hard cap on the contents
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Buffered bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Append bytes, growing by doubling if needed
    ///
    /// # Errors
    /// `CapacityExceeded` if the result would pass `max_size` or the
    /// allocation fails. Nothing is appended in that case.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let need = self
            .data
            .len()
            .checked_add(bytes.len())
            .ok_or(Error::CapacityExceeded)?;
        self.grow_to(need)?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Make room for `total` bytes in one step (clamped to `max_size`)
    ///
    /// # Errors
    /// `CapacityExceeded` if the allocation fails.
    pub fn reserve_total(&mut self, total: usize) -> Result<()> {
        let target = total.min(self.max_size);
        if target > self.capacity {
            self.reallocate(target)?;
        }
        Ok(())
    }

    /// Zeroize the contents and release the memory
    pub fn wipe(&mut self) {
        self.data.zeroize();
        self.data = Vec::new();
        self.capacity = 0;
    }

    fn grow_to(&mut self, need: usize) -> Result<()> {
        if need > self.max_size {
            return Err(Error::CapacityExceeded);
        }
        if need <= self.capacity {
            return Ok(());
        }
        let capacity = next_capacity(self.capacity, self.initial_capacity, need, self.max_size);
        self.reallocate(capacity)
    }

    /// Move the contents into a fresh allocation of exactly `capacity` bytes
    fn reallocate(&mut self, capacity: usize) -> Result<()> {
        let mut fresh = Vec::new();
        fresh
            .try_reserve_exact(capacity)
            .map_err(|_| Error::CapacityExceeded)?;
        fresh.extend_from_slice(&self.data);

        let mut old = core::mem::replace(&mut self.data, fresh);
        old.zeroize();
        self.capacity = capacity;
        Ok(())
    }
}

impl Drop for AccumulationBuffer {
    fn drop(&mut self) {
        self.wipe();
    }
}

enum Storage<const N: usize> {
    Inline(heapless::Vec<u8, N>),
    Heap(AccumulationBuffer),
}

/// Per-session message buffer with inline fast path
///
/// Exactly one of the inline array or the heap buffer is active. The switch
/// happens once, on the first append that no longer fits inline.
pub struct SessionBuffer<const N: usize> {
    storage: Storage<N>,
    limits: BufferLimits,
    expected_total: usize,
}

impl<const N: usize> SessionBuffer<N> {
    /// Create an empty inline buffer
    ///
    /// The inline threshold is clamped to the storage size `N`.
    #[must_use]
    pub fn new(limits: BufferLimits) -> Self {
        Self {
            storage: Storage::Inline(heapless::Vec::new()),
            limits: BufferLimits {
                inline_capacity: limits.inline_capacity.min(N),
                ..limits
            },
            expected_total: 0,
        }
    }

    /// Limits in force
    #[must_use]
    pub const fn limits(&self) -> &BufferLimits {
        &self.limits
    }

    /// Number of buffered bytes
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Inline(inline) => inline.len(),
            Storage::Heap(heap) => heap.len(),
        }
    }

    /// Check if nothing is buffered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the inline path is still active
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    /// Bytes that fit before the next migration or growth
    #[must_use]
    pub const fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Inline(_) => self.limits.inline_capacity,
            Storage::Heap(heap) => heap.capacity(),
        }
    }

    /// Buffered bytes
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match &self.storage {
            Storage::Inline(inline) => inline.as_slice(),
            Storage::Heap(heap) => heap.as_slice(),
        }
    }

    /// Record the caller's expected message length
    ///
    /// Used to size the heap allocation on migration, or to reserve right
    /// away if the buffer already lives on the heap. Purely advisory: an
    /// allocation failure here is ignored and surfaces on the next append.
    pub fn set_expected_total(&mut self, total: usize) -> Growth {
        self.expected_total = total.min(self.limits.max_size);

        if let Storage::Heap(heap) = &mut self.storage {
            let from = heap.capacity();
            if heap.reserve_total(self.expected_total).is_ok() && heap.capacity() != from {
                return Growth::Grew {
                    from,
                    to: heap.capacity(),
                };
            }
        }
        Growth::None
    }

    /// Append a chunk
    ///
    /// # Errors
    /// `CapacityExceeded` if the message would pass the cap or an allocation
    /// fails. Nothing is appended in that case.
    pub fn append(&mut self, bytes: &[u8]) -> Result<Growth> {
        if bytes.is_empty() {
            return Ok(Growth::None);
        }

        let need = self
            .len()
            .checked_add(bytes.len())
            .ok_or(Error::CapacityExceeded)?;
        if need > self.limits.max_size {
            return Err(Error::CapacityExceeded);
        }

        match &mut self.storage {
            Storage::Inline(inline) => {
                if need <= self.limits.inline_capacity {
                    inline
                        .extend_from_slice(bytes)
                        .map_err(|()| Error::CapacityExceeded)?;
                    return Ok(Growth::None);
                }

                let floor = max(max(self.limits.preallocation_size, need), self.expected_total);
                let target = next_capacity(
                    0,
                    self.limits.initial_capacity,
                    floor,
                    self.limits.max_size,
                );
                let mut heap = AccumulationBuffer::with_capacity(
                    target,
                    self.limits.initial_capacity,
                    self.limits.max_size,
                )?;
                heap.append(inline.as_slice())?;
                heap.append(bytes)?;

                inline.as_mut_slice().zeroize();
                inline.clear();

                let capacity = heap.capacity();
                self.storage = Storage::Heap(heap);
                Ok(Growth::Migrated { capacity })
            }
            Storage::Heap(heap) => {
                let from = heap.capacity();
                heap.append(bytes)?;
                let to = heap.capacity();
                Ok(if to == from {
                    Growth::None
                } else {
                    Growth::Grew { from, to }
                })
            }
        }
    }

    /// Zeroize everything and return to the empty inline state
    pub fn wipe(&mut self) {
        match &mut self.storage {
            Storage::Inline(inline) => {
                inline.as_mut_slice().zeroize();
                inline.clear();
            }
            Storage::Heap(heap) => heap.wipe(),
        }
        self.storage = Storage::Inline(heapless::Vec::new());
        self.expected_total = 0;
    }
}

impl<const N: usize> Drop for SessionBuffer<N> {
    fn drop(&mut self) {
        self.wipe();
    }
}
