//! Stable metadata keys and digest-sharded path utilities.
//!
//! Every metadata record is identified by a *stable key*: an opaque token chosen when the record
//! is authored and never regenerated. The same key names the same logical record in every
//! environment, so it is the only thing a store may use to find a record again.
//!
//! ## Key form
//! - Length: 1 to [`StableKey::MAX_LEN`] bytes
//! - Characters: ASCII letters, digits, `.`, `_`, `:` and `-`
//! - Examples: `465a92f2-baf8-42e9-9612-53064be868e8`, `kenyaemr.defaultLocation`, `A`
//!
//! Keys are compared byte for byte. Unlike canonical UUID handling, no normalisation is applied:
//! `ABC` and `abc` are different keys.
//!
//! ## Sharded layout
//! File-backed stores place a record under a path derived from the SHA-256 digest of its key:
//! `parent_dir/<d[0..2]>/<d[2..4]>/<d>.<ext>`
//!
//! Example:
//! `metadata_store/3f/a9/3fa9…e1.yaml`
//!
//! Key characters such as `:` never appear in file names.

mod key;

pub use key::{KeyDigest, StableKey, Uuid};

/// Error type for stable key operations.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Invalid input provided
    #[error("Invalid key: {0}")]
    InvalidInput(String),
}

/// Result type for stable key operations.
pub type KeyResult<T> = Result<T, KeyError>;
