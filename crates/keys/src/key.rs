//! Internal implementation of stable keys.
//!
//! This module contains the [`StableKey`] newtype and the [`KeyDigest`] used to derive
//! storage paths from it.

use crate::{KeyError, KeyResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Durable identity of a metadata record.
///
/// Once constructed, the contained key is guaranteed to be non-empty, bounded in length and made
/// only of `[A-Za-z0-9._:-]`.
///
/// # Construction
/// - [`StableKey::parse`] validates an externally supplied key (catalogue table, CLI input).
/// - [`StableKey::from_uuid`] wraps a UUID in its hyphenated lowercase form.
///
/// Keys are never generated here; they are chosen at authoring time.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StableKey(String);

impl StableKey {
    /// Maximum key length in bytes.
    pub const MAX_LEN: usize = 128;

    /// Validates and wraps a stable key.
    ///
    /// The input is taken verbatim: surrounding whitespace is an error, not trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidInput`] if `input` is empty, longer than [`Self::MAX_LEN`], or
    /// contains characters outside `[A-Za-z0-9._:-]`.
    pub fn parse(input: &str) -> KeyResult<Self> {
        if input.is_empty() {
            return Err(KeyError::InvalidInput("key cannot be empty".into()));
        }

        if input.len() > Self::MAX_LEN {
            return Err(KeyError::InvalidInput(format!(
                "key exceeds maximum length of {} characters",
                Self::MAX_LEN
            )));
        }

        if !Self::is_valid(input) {
            return Err(KeyError::InvalidInput(format!(
                "key contains invalid characters (only alphanumeric, '.', '_', ':', '-' allowed), got: '{}'",
                input
            )));
        }

        Ok(Self(input.to_owned()))
    }

    /// Returns true if `input` is a syntactically valid stable key.
    pub fn is_valid(input: &str) -> bool {
        !input.is_empty()
            && input.len() <= Self::MAX_LEN
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'_' | b':' | b'-'))
    }

    /// Wraps a UUID using its hyphenated lowercase representation.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the key as a UUID if it is spelled as one.
    ///
    /// Both hyphenated and simple (32 hex characters) spellings are recognised.
    pub fn as_uuid(&self) -> Option<Uuid> {
        Uuid::try_parse(&self.0).ok()
    }

    /// Returns the SHA-256 digest of this key.
    pub fn digest(&self) -> KeyDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        KeyDigest(hex::encode(hasher.finalize()))
    }

    /// Returns `parent_dir/<d[0..2]>/<d[2..4]>/<d>.<extension>` for this key's digest `d`.
    ///
    /// # Arguments
    ///
    /// * `parent_dir` - Base directory under which to shard the key.
    /// * `extension` - File extension without the leading dot.
    pub fn sharded_file(&self, parent_dir: &Path, extension: &str) -> PathBuf {
        let digest = self.digest();
        let hex = digest.as_str();
        parent_dir
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(format!("{hex}.{extension}"))
    }
}

impl fmt::Display for StableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StableKey {
    type Err = KeyError;

    /// Equivalent to [`StableKey::parse`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StableKey::parse(s)
    }
}

impl AsRef<str> for StableKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for StableKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for StableKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StableKey::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Lowercase hex SHA-256 digest of a [`StableKey`] (64 characters).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyDigest(String);

impl KeyDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
