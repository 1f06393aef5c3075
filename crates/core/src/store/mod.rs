//! Target stores for metadata records.
//!
//! The reconciler only needs to look a record up by key and create it; `update` and `list` exist
//! for the sync policy and for operators inspecting what was installed.
//!
//! Two implementations are provided:
//! - [`InMemoryStore`]: a map, for tests and dry runs.
//! - [`YamlFileStore`]: one YAML file per record under a digest-sharded directory tree.

mod memory;
mod yaml;

pub use memory::InMemoryStore;
pub use yaml::YamlFileStore;

use crate::descriptor::MetadataRecord;
use emr_keys::StableKey;
use std::path::PathBuf;

/// Errors returned by a [`MetadataStore`].
///
/// Only [`StoreError::Unavailable`] means the store as a whole cannot be used (its root is gone or
/// cannot be listed); the other variants concern a single record or shard.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
    #[error("record already exists: {0}")]
    AlreadyExists(StableKey),
    #[error("record not found: {0}")]
    NotFound(StableKey),
    #[error("corrupt record at {path}: {message}", path = path.display())]
    Corrupt { path: PathBuf, message: String },
    #[error("I/O error on {path}", path = path.display())]
    RecordIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize record {key}: {message}")]
    Serialization { key: StableKey, message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>, source: Option<std::io::Error>) -> Self {
        StoreError::Unavailable {
            message: message.into(),
            source,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A registry of metadata records keyed by [`StableKey`].
pub trait MetadataStore {
    /// Looks a record up by key, regardless of its kind.
    fn find_by_key(&self, key: &StableKey) -> StoreResult<Option<MetadataRecord>>;

    /// Stores a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] if a record with the same key is present.
    fn create(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord>;

    /// Replaces an existing record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record with the key is present.
    fn update(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord>;

    /// Returns every record, ordered by key.
    fn list(&self) -> StoreResult<Vec<MetadataRecord>>;
}
