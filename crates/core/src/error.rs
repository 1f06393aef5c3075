use crate::reconcile::ReconcileReport;
use crate::store::StoreError;
use emr_keys::StableKey;

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid key: {0}")]
    InvalidKey(#[from] emr_keys::KeyError),
    #[error("invalid value: {0}")]
    InvalidValue(#[from] emr_types::TypesError),
    #[error("invalid validation rule: {0}")]
    InvalidRule(#[from] crate::rules::RuleError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error(
        "store became unavailable while reconciling {key} after {completed} descriptor(s): {source}",
        completed = report.outcomes.len()
    )]
    StoreUnavailable {
        key: StableKey,
        #[source]
        source: StoreError,
        report: Box<ReconcileReport>,
    },
    #[error("failed to create metadata directory: {0}")]
    MetadataDirCreation(std::io::Error),
}

pub type MetadataResult<T> = std::result::Result<T, MetadataError>;
