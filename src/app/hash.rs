//! SHA-1 digest type used by manifests and the object store
//!
//! Digests are stored as their raw 20-byte representation rather than hex
//! strings. This keeps comparisons cheap when thousands of asset objects are
//! checked, while serialization stays compatible with the manifest's hex
//! format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::errors::{ManifestError, ManifestResult};

/// SHA-1 digest storage using a 20-byte array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sha1Hash([u8; 20]);

impl Sha1Hash {
    /// Create a digest from a hex string
    ///
    /// # Arguments
    ///
    /// * `hex` - 40-character hexadecimal string (case insensitive)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use client_fetcher::app::Sha1Hash;
    ///
    /// let hash = Sha1Hash::from_hex("a94a8fe5ccb19ba61c4c0873d391e987982fbbd3")?;
    /// let upper = Sha1Hash::from_hex("A94A8FE5CCB19BA61C4C0873D391E987982FBBD3")?;
    /// assert_eq!(hash, upper);
    /// # Ok::<(), client_fetcher::errors::ManifestError>(())
    /// ```
    pub fn from_hex(hex: &str) -> ManifestResult<Self> {
        let invalid = || ManifestError::InvalidHash {
            hash: hex.to_string(),
        };

        if hex.len() != 40 || !hex.is_ascii() {
            return Err(invalid());
        }

        let mut bytes = [0u8; 20];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| invalid())?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }

        Ok(Sha1Hash(bytes))
    }

    /// Lowercase 40-character hex representation
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;
        self.0.iter().fold(String::with_capacity(40), |mut acc, b| {
            let _ = write!(&mut acc, "{:02x}", b);
            acc
        })
    }

    /// First two hex characters, used as the object store subdirectory
    pub fn prefix(&self) -> String {
        format!("{:02x}", self.0[0])
    }

    /// Get the raw byte array representation
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Sha1Hash(bytes)
    }

    /// Digest of an in-memory buffer
    pub fn compute(data: &[u8]) -> Self {
        Self::from_hasher(Sha1::new_with_prefix(data))
    }

    /// Finish an incremental hasher
    pub fn from_hasher(hasher: Sha1) -> Self {
        Sha1Hash(hasher.finalize().into())
    }
}

impl fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Sha1Hash {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Serialize as hex string for JSON compatibility
impl Serialize for Sha1Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Sha1Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_string = String::deserialize(deserializer)?;
        Self::from_hex(&hex_string).map_err(serde::de::Error::custom)
    }
}
