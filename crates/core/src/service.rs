//! File-backed metadata service.
//!
//! [`MetadataService`] ties a [`CoreConfig`] to a [`YamlFileStore`] rooted at the configured
//! metadata directory. Binaries go through this type; tests and embedders that want a different
//! store use [`MetadataReconciler`] directly.

use crate::catalogue::common_metadata;
use crate::config::CoreConfig;
use crate::descriptor::{MetadataDescriptor, MetadataKind, MetadataRecord};
use crate::reconcile::{MetadataReconciler, ReconcileReport};
use crate::store::{MetadataStore, YamlFileStore};
use crate::{MetadataError, MetadataResult};
use emr_keys::StableKey;
use std::fs;
use std::sync::Arc;

/// Installs and inspects metadata in the configured store.
#[derive(Clone, Debug)]
pub struct MetadataService {
    cfg: Arc<CoreConfig>,
}

impl MetadataService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    /// Reconciles `descriptors` into the store, creating the metadata directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::MetadataDirCreation` if the directory cannot be created, or
    /// `MetadataError::StoreUnavailable` if the store goes away part way through. Failures of
    /// individual descriptors are reported in the returned [`ReconcileReport`].
    pub fn install(&self, descriptors: &[MetadataDescriptor]) -> MetadataResult<ReconcileReport> {
        let metadata_dir = self.cfg.metadata_dir();
        fs::create_dir_all(metadata_dir).map_err(MetadataError::MetadataDirCreation)?;
        let mut store = YamlFileStore::open(metadata_dir)?;

        tracing::info!(
            "installing metadata into {} ({})",
            metadata_dir.display(),
            self.cfg.policy()
        );
        MetadataReconciler::new(&mut store, self.cfg.policy()).reconcile(descriptors)
    }

    /// Installs the built-in common metadata catalogue.
    pub fn install_common_metadata(&self) -> MetadataResult<ReconcileReport> {
        let descriptors = common_metadata()?;
        self.install(&descriptors)
    }

    /// Lists installed records, optionally only those of one kind.
    ///
    /// # Errors
    ///
    /// Returns a store error if the metadata directory does not exist or holds a corrupt record.
    pub fn list(&self, kind: Option<MetadataKind>) -> MetadataResult<Vec<MetadataRecord>> {
        let store = self.existing_store()?;
        let mut records = store.list()?;
        if let Some(kind) = kind {
            records.retain(|r| r.kind() == kind);
        }
        Ok(records)
    }

    /// Looks a record up by key.
    ///
    /// A UUID-shaped key spelled differently from the stored hyphenated lowercase form (upper
    /// case, or without hyphens) also finds the record.
    pub fn find(&self, key: &StableKey) -> MetadataResult<Option<MetadataRecord>> {
        let store = self.existing_store()?;
        if let Some(record) = store.find_by_key(key)? {
            return Ok(Some(record));
        }

        match key.as_uuid().map(StableKey::from_uuid) {
            Some(canonical) if &canonical != key => Ok(store.find_by_key(&canonical)?),
            _ => Ok(None),
        }
    }

    /// Checks `value` against the validation rule of the installed record `key`.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::InvalidInput` if no record has that key or the record carries no
    /// rule, and `MetadataError::InvalidRule` if the stored rule does not compile.
    pub fn check_identifier(&self, key: &StableKey, value: &str) -> MetadataResult<bool> {
        let record = self
            .find(key)?
            .ok_or_else(|| MetadataError::InvalidInput(format!("no metadata record with key {key}")))?;
        let rule = record.validation_rule.as_ref().ok_or_else(|| {
            MetadataError::InvalidInput(format!(
                "{} {} has no validation rule",
                record.kind(),
                record.display_name
            ))
        })?;
        Ok(rule.compile()?.check(value))
    }

    fn existing_store(&self) -> MetadataResult<YamlFileStore> {
        Ok(YamlFileStore::open(self.cfg.metadata_dir())?)
    }
}
