//! Content hashing for change detection.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of hex characters in the canonical rendering of a [`Digest`].
pub const DIGEST_HEX_LEN: usize = 32;

/// A 128-bit content digest computed using XXH3.
///
/// Two byte sequences with the same `Digest` are assumed to have identical
/// content. The digest is computed over raw bytes, never over decoded text,
/// so the same file always hashes the same way regardless of its encoding.
///
/// Serializes as its canonical lowercase hex string, which is also the form
/// stored in the change registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; 16]);

impl Digest {
    /// Computes the digest of a byte slice using XXH3-128.
    pub fn of(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_be_bytes())
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the canonical lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

/// Error returned when a string is not a canonical hex digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DigestParseError {
    /// The string does not have exactly [`DIGEST_HEX_LEN`] characters.
    #[error("expected {DIGEST_HEX_LEN} hex characters, got {0}")]
    Length(usize),

    /// The string contains a character that is not a hex digit.
    #[error("invalid hex character {0:?}")]
    InvalidChar(char),
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != DIGEST_HEX_LEN {
            return Err(DigestParseError::Length(s.chars().count()));
        }
        let mut bytes = [0u8; 16];
        let mut chars = s.chars();
        for byte in &mut bytes {
            let hi = hex_value(chars.next())?;
            let lo = hex_value(chars.next())?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_value(c: Option<char>) -> Result<u8, DigestParseError> {
    // Length was checked up front, so `None` only happens on multi-byte input.
    let c = c.ok_or(DigestParseError::Length(0))?;
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or(DigestParseError::InvalidChar(c))
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = Digest;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a 32-character hex digest string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}
