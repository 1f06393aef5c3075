//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services. Nothing
//! below `main` reads environment variables; the `*_from_env_value` helpers take the raw value so
//! callers (and tests) decide where it comes from.

use crate::constants::DEFAULT_METADATA_DIR;
use crate::reconcile::ReconcilePolicy;
use crate::{MetadataError, MetadataResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    metadata_dir: PathBuf,
    policy: ReconcilePolicy,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::InvalidInput` if `metadata_dir` is empty.
    pub fn new(metadata_dir: PathBuf, policy: ReconcilePolicy) -> MetadataResult<Self> {
        if metadata_dir.as_os_str().is_empty() {
            return Err(MetadataError::InvalidInput(
                "metadata_dir cannot be empty".into(),
            ));
        }

        Ok(Self {
            metadata_dir,
            policy,
        })
    }

    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }
}

/// Resolve the metadata store directory from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_METADATA_DIR`].
pub fn metadata_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_METADATA_DIR))
}

/// Parse the reconcile policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default (install-once).
pub fn reconcile_policy_from_env_value(value: Option<String>) -> MetadataResult<ReconcilePolicy> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<ReconcilePolicy>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_dir_defaults_when_unset_or_blank() {
        assert_eq!(
            metadata_dir_from_env_value(None),
            PathBuf::from(DEFAULT_METADATA_DIR)
        );
        assert_eq!(
            metadata_dir_from_env_value(Some("   ".into())),
            PathBuf::from(DEFAULT_METADATA_DIR)
        );
        assert_eq!(
            metadata_dir_from_env_value(Some(" /var/lib/emr ".into())),
            PathBuf::from("/var/lib/emr")
        );
    }

    #[test]
    fn policy_defaults_to_install_once() {
        assert_eq!(
            reconcile_policy_from_env_value(None).unwrap(),
            ReconcilePolicy::InstallOnce
        );
        assert_eq!(
            reconcile_policy_from_env_value(Some("".into())).unwrap(),
            ReconcilePolicy::InstallOnce
        );
        assert_eq!(
            reconcile_policy_from_env_value(Some("sync".into())).unwrap(),
            ReconcilePolicy::Sync
        );
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = reconcile_policy_from_env_value(Some("always".into())).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidInput(_)));
    }

    #[test]
    fn empty_metadata_dir_is_rejected() {
        assert!(CoreConfig::new(PathBuf::new(), ReconcilePolicy::Sync).is_err());
        let cfg = CoreConfig::new(PathBuf::from("store"), ReconcilePolicy::Sync).unwrap();
        assert_eq!(cfg.metadata_dir(), Path::new("store"));
        assert_eq!(cfg.policy(), ReconcilePolicy::Sync);
    }
}
