//! # EMR Core
//!
//! Declarative installation of EMR metadata.
//!
//! This crate contains pure data operations and file management:
//! - Metadata descriptors and their validation rules
//! - Target stores (in-memory and sharded YAML files under `EMR_METADATA_DIR`)
//! - The reconciler that makes a store agree with a declared list, idempotently
//! - The built-in common metadata catalogue
//! - Report column converters
//!
//! **No process concerns**: reading the environment, logging setup and argument parsing belong in
//! the `emr-install` and `emr` binaries.

pub mod catalogue;
pub mod config;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod reconcile;
pub mod reporting;
pub mod rules;
pub mod service;
pub mod store;
pub mod validation;

pub use config::CoreConfig;
pub use descriptor::{
    AttributeTypeDetails, KindDetails, LocationBehavior, MetadataDescriptor, MetadataKind,
    MetadataRecord,
};
pub use emr_keys::StableKey;
pub use emr_types::{NonEmptyText, SortWeight};
pub use error::{MetadataError, MetadataResult};
pub use reconcile::{
    DescriptorFailure, DescriptorOutcome, FailureReason, MetadataReconciler, Outcome,
    ReconcilePolicy, ReconcileReport,
};
pub use rules::{CompiledRule, RuleError, ValidationRule};
pub use service::MetadataService;
pub use store::{InMemoryStore, MetadataStore, StoreError, YamlFileStore};
