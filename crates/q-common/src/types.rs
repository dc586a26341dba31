// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Common types for the hash offload stack
//!
//! This module defines the digest value returned by the engine and the
//! algorithm selector accepted by `begin`.

use core::fmt;
use zeroize::Zeroize;

use crate::constants::SHA256_DIGEST_SIZE;

/// SHA-256 digest (32 bytes)
///
/// The bytes are in FIPS 180-4 presentation order, so they compare equal to
/// any software SHA-256 implementation's output. Not `Copy`: every copy is
/// an explicit `clone` the holder is responsible for wiping.
#[derive(Clone, PartialEq, Eq, Hash, Default, Zeroize)]
pub struct Digest([u8; SHA256_DIGEST_SIZE]);

impl Digest {
    /// Size of a digest in bytes
    pub const SIZE: usize = SHA256_DIGEST_SIZE;

    /// Create a digest from raw bytes
    #[must_use]
    pub const fn new(bytes: [u8; SHA256_DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a digest from a slice
    ///
    /// Returns `None` if the slice length is not exactly 32 bytes.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() != Self::SIZE {
            return None;
        }
        let mut bytes = [0u8; SHA256_DIGEST_SIZE];
        bytes.copy_from_slice(slice);
        Some(Self(bytes))
    }

    /// Get the digest as a byte array
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SHA256_DIGEST_SIZE] {
        &self.0
    }

    /// Consume the digest and return its bytes
    #[must_use]
    pub const fn into_bytes(self) -> [u8; SHA256_DIGEST_SIZE] {
        self.0
    }
}

impl From<[u8; SHA256_DIGEST_SIZE]> for Digest {
    fn from(bytes: [u8; SHA256_DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest(")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...)")
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Digest {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[u8]:02x}", &self.0[..]);
    }
}

/// Hash algorithm selector
///
/// Only SHA-256 is backed by the accelerator. The other members exist so a
/// caller holding a generic algorithm id gets a typed rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HashAlgorithm {
    /// SHA-224
    Sha224 = 0x01,
    /// SHA-256
    Sha256 = 0x02,
    /// SHA-384
    Sha384 = 0x03,
    /// SHA-512
    Sha512 = 0x04,
}

impl HashAlgorithm {
    /// Convert from raw identifier
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Sha224),
            0x02 => Some(Self::Sha256),
            0x03 => Some(Self::Sha384),
            0x04 => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Digest size in bytes
    #[must_use]
    pub const fn digest_size(&self) -> usize {
        match self {
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// Check whether the SHA-256 accelerator can compute this algorithm
    #[must_use]
    pub const fn is_hardware_supported(&self) -> bool {
        matches!(self, Self::Sha256)
    }

    /// Get the algorithm name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sha224 => "SHA-224",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

impl Default for HashAlgorithm {
    fn default() -> Self {
        Self::Sha256
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
