//! Reconciliation of declared metadata into a target store.
//!
//! [`MetadataReconciler::reconcile`] walks a list of [`MetadataDescriptor`]s in declaration order
//! and makes the store agree with them:
//!
//! - absent records are created,
//! - present records of the same kind are skipped ([`ReconcilePolicy::InstallOnce`]) or brought
//!   up to date ([`ReconcilePolicy::Sync`]),
//! - nothing is ever deleted; records no longer declared stay in the store.
//!
//! ## Failure handling
//!
//! Problems with a single descriptor (bad rule, key claimed by another kind, dangling reference,
//! a corrupt stored record) are collected in the [`ReconcileReport`] and the batch carries on.
//! An unavailable store stops the batch immediately: the call fails with
//! [`MetadataError::StoreUnavailable`], which carries the report for the descriptors that were
//! processed before the failure. No write is retried.
//!
//! Running the same list twice is safe: the second run creates nothing.

use crate::descriptor::{MetadataDescriptor, MetadataKind, MetadataRecord};
use crate::rules::RuleError;
use crate::store::{MetadataStore, StoreError};
use crate::{MetadataError, MetadataResult};
use chrono::Utc;
use emr_keys::StableKey;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// What to do with a record that already exists with the same key and kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Leave existing records untouched, even if their attributes have drifted.
    #[default]
    InstallOnce,
    /// Overwrite mutable attributes of existing records that differ from the descriptor.
    Sync,
}

impl ReconcilePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconcilePolicy::InstallOnce => "install-once",
            ReconcilePolicy::Sync => "sync",
        }
    }
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconcilePolicy {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "install-once" => Ok(ReconcilePolicy::InstallOnce),
            "sync" => Ok(ReconcilePolicy::Sync),
            _ => Err(MetadataError::InvalidInput(format!(
                "unknown reconcile policy '{s}' (expected 'install-once' or 'sync')"
            ))),
        }
    }
}

/// Why a single descriptor could not be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// The key is held by a stored record of another kind (`existing`), or declared in the same
    /// batch under other kinds (`declared_elsewhere`).
    #[error("{}", identity_conflict_message(.declared, .existing, .declared_elsewhere))]
    IdentityConflict {
        declared: MetadataKind,
        existing: Option<MetadataKind>,
        declared_elsewhere: Vec<MetadataKind>,
    },
    #[error("invalid validation rule: {0}")]
    InvalidRule(#[from] RuleError),
    #[error("reference {reference} does not resolve to a {expected}{}", found_suffix(.found))]
    UnresolvedReference {
        reference: StableKey,
        expected: MetadataKind,
        found: Option<MetadataKind>,
    },
    #[error("store rejected the record: {0}")]
    Store(String),
}

fn found_suffix(found: &Option<MetadataKind>) -> String {
    match found {
        Some(kind) => format!(" (found a {kind})"),
        None => String::new(),
    }
}

fn identity_conflict_message(
    declared: &MetadataKind,
    existing: &Option<MetadataKind>,
    declared_elsewhere: &[MetadataKind],
) -> String {
    match existing {
        Some(existing) => {
            format!("key is already used by a {existing}, cannot install it as a {declared}")
        }
        None => {
            let others = declared_elsewhere
                .iter()
                .map(MetadataKind::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            format!("key is declared as a {declared} and also as {others} in this batch")
        }
    }
}

/// Result of reconciling one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
    /// Present already; under install-once this includes drifted records.
    Skipped,
    Failed(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorOutcome {
    pub key: StableKey,
    pub kind: MetadataKind,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorFailure {
    pub key: StableKey,
    pub kind: MetadataKind,
    pub reason: FailureReason,
}

/// Summary of a reconcile run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// One entry per processed descriptor, in input order.
    pub outcomes: Vec<DescriptorOutcome>,
    pub failures: Vec<DescriptorFailure>,
}

impl ReconcileReport {
    fn push(&mut self, descriptor: &MetadataDescriptor, outcome: Outcome) {
        match &outcome {
            Outcome::Created => self.created += 1,
            Outcome::Updated => self.updated += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed(reason) => {
                self.failed += 1;
                self.failures.push(DescriptorFailure {
                    key: descriptor.stable_key.clone(),
                    kind: descriptor.kind(),
                    reason: reason.clone(),
                });
            }
        }
        self.outcomes.push(DescriptorOutcome {
            key: descriptor.stable_key.clone(),
            kind: descriptor.kind(),
            outcome,
        });
    }

    /// True when no descriptor failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    pub fn failed_keys(&self) -> Vec<&StableKey> {
        self.failures.iter().map(|f| &f.key).collect()
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} updated={} skipped={} failed={}",
            self.created, self.updated, self.skipped, self.failed
        )
    }
}

/// Internal outcome of one step: either a descriptor-level failure or a batch abort.
enum StepError {
    Failed(FailureReason),
    Abort(StoreError),
}

impl From<StoreError> for StepError {
    fn from(err: StoreError) -> Self {
        if err.is_unavailable() {
            StepError::Abort(err)
        } else {
            StepError::Failed(FailureReason::Store(err.to_string()))
        }
    }
}

impl From<FailureReason> for StepError {
    fn from(reason: FailureReason) -> Self {
        StepError::Failed(reason)
    }
}

/// Brings a store into agreement with a declared list of descriptors.
///
/// The reconciler borrows the store mutably for its whole lifetime, so two reconciles cannot run
/// against the same store instance at once.
pub struct MetadataReconciler<'s, S: MetadataStore + ?Sized> {
    store: &'s mut S,
    policy: ReconcilePolicy,
}

impl<'s, S: MetadataStore + ?Sized> MetadataReconciler<'s, S> {
    pub fn new(store: &'s mut S, policy: ReconcilePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Reconciles `descriptors` in order.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::StoreUnavailable`] if the store cannot be reached; the error
    /// carries the report for the descriptors processed before the failure.
    pub fn reconcile(&mut self, descriptors: &[MetadataDescriptor]) -> MetadataResult<ReconcileReport> {
        tracing::info!(
            "reconciling {} metadata descriptor(s) with policy {}",
            descriptors.len(),
            self.policy
        );

        let conflicts = conflicting_declarations(descriptors);
        let mut report = ReconcileReport::default();

        for descriptor in descriptors {
            let outcome = match conflicts.get(&descriptor.stable_key) {
                Some(kinds) => Err(StepError::Failed(FailureReason::IdentityConflict {
                    declared: descriptor.kind(),
                    existing: None,
                    declared_elsewhere: kinds
                        .iter()
                        .copied()
                        .filter(|kind| *kind != descriptor.kind())
                        .collect(),
                })),
                None => self.reconcile_one(descriptor),
            };

            match outcome {
                Ok(outcome) => {
                    tracing::debug!(
                        "{} {}: {:?}",
                        descriptor.kind(),
                        descriptor.stable_key,
                        outcome
                    );
                    report.push(descriptor, outcome);
                }
                Err(StepError::Failed(reason)) => {
                    tracing::warn!(
                        "failed to reconcile {} {}: {}",
                        descriptor.kind(),
                        descriptor.stable_key,
                        reason
                    );
                    report.push(descriptor, Outcome::Failed(reason));
                }
                Err(StepError::Abort(source)) => {
                    tracing::error!(
                        "store unavailable at {} {}, aborting after {} descriptor(s): {}",
                        descriptor.kind(),
                        descriptor.stable_key,
                        report.outcomes.len(),
                        source
                    );
                    return Err(MetadataError::StoreUnavailable {
                        key: descriptor.stable_key.clone(),
                        source,
                        report: Box::new(report),
                    });
                }
            }
        }

        tracing::info!("metadata reconcile finished: {}", report);
        Ok(report)
    }

    fn reconcile_one(&mut self, descriptor: &MetadataDescriptor) -> Result<Outcome, StepError> {
        if let Some(rule) = &descriptor.validation_rule {
            rule.compile().map_err(FailureReason::InvalidRule)?;
        }

        let existing = self.store.find_by_key(&descriptor.stable_key)?;

        match existing {
            Some(record) if record.kind() != descriptor.kind() => {
                Err(FailureReason::IdentityConflict {
                    declared: descriptor.kind(),
                    existing: Some(record.kind()),
                    declared_elsewhere: Vec::new(),
                }
                .into())
            }
            Some(record) => match self.policy {
                ReconcilePolicy::InstallOnce => Ok(Outcome::Skipped),
                ReconcilePolicy::Sync if record.matches(descriptor) => Ok(Outcome::Skipped),
                ReconcilePolicy::Sync => {
                    self.check_references(descriptor)?;
                    self.store.update(record.updated_from(descriptor, Utc::now()))?;
                    Ok(Outcome::Updated)
                }
            },
            None => {
                self.check_references(descriptor)?;
                self.store
                    .create(MetadataRecord::from_descriptor(descriptor, Utc::now()))?;
                Ok(Outcome::Created)
            }
        }
    }

    fn check_references(&self, descriptor: &MetadataDescriptor) -> Result<(), StepError> {
        for (reference, expected) in descriptor.details.references() {
            let found = self.store.find_by_key(reference)?.map(|r| r.kind());
            if found != Some(expected) {
                return Err(FailureReason::UnresolvedReference {
                    reference: reference.clone(),
                    expected,
                    found,
                }
                .into());
            }
        }
        Ok(())
    }
}

/// Keys declared with more than one kind in `descriptors`, mapped to the kinds involved.
fn conflicting_declarations(
    descriptors: &[MetadataDescriptor],
) -> BTreeMap<StableKey, BTreeSet<MetadataKind>> {
    let mut kinds_by_key: BTreeMap<&StableKey, BTreeSet<MetadataKind>> = BTreeMap::new();
    for descriptor in descriptors {
        kinds_by_key
            .entry(&descriptor.stable_key)
            .or_default()
            .insert(descriptor.kind());
    }

    kinds_by_key
        .into_iter()
        .filter(|(_, kinds)| kinds.len() > 1)
        .map(|(key, kinds)| (key.clone(), kinds))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::KindDetails;
    use crate::rules::ValidationRule;
    use crate::store::{InMemoryStore, StoreResult};

    fn key(s: &str) -> StableKey {
        StableKey::parse(s).unwrap()
    }

    fn encounter(k: &str, name: &str) -> MetadataDescriptor {
        MetadataDescriptor::encounter_type(k, name, None).unwrap()
    }

    fn identifier(k: &str, name: &str, rule: ValidationRule) -> MetadataDescriptor {
        MetadataDescriptor::new(
            k,
            name,
            None,
            KindDetails::PatientIdentifierType {
                location_behavior: None,
                required: false,
            },
        )
        .unwrap()
        .with_rule(rule)
    }

    fn reconcile(
        store: &mut InMemoryStore,
        policy: ReconcilePolicy,
        descriptors: &[MetadataDescriptor],
    ) -> ReconcileReport {
        MetadataReconciler::new(store, policy)
            .reconcile(descriptors)
            .expect("in-memory store is always available")
    }

    #[test]
    fn creates_into_empty_store() {
        let mut store = InMemoryStore::new();
        let report = reconcile(
            &mut store,
            ReconcilePolicy::InstallOnce,
            &[encounter("A", "Consultation")],
        );

        assert_eq!((report.created, report.skipped, report.failed), (1, 0, 0));
        let found = store.find_by_key(&key("A")).unwrap().unwrap();
        assert_eq!(found.display_name.as_str(), "Consultation");
        assert_eq!(found.kind(), MetadataKind::EncounterType);
    }

    #[test]
    fn second_run_creates_nothing() {
        let descriptors = vec![
            encounter("A", "Consultation"),
            encounter("B", "Triage"),
            MetadataDescriptor::form("F", "Triage form", None, "B", "1").unwrap(),
        ];

        for policy in [ReconcilePolicy::InstallOnce, ReconcilePolicy::Sync] {
            let mut store = InMemoryStore::new();
            let first = reconcile(&mut store, policy, &descriptors);
            assert_eq!(first.created, 3);

            let second = reconcile(&mut store, policy, &descriptors);
            assert_eq!(second.created, 0);
            assert_eq!(second.updated, 0);
            assert_eq!(second.skipped, 3);
            assert_eq!(store.len(), 3);
        }
    }

    #[test]
    fn install_once_keeps_existing_record_despite_rename() {
        let mut store = InMemoryStore::new();
        reconcile(
            &mut store,
            ReconcilePolicy::InstallOnce,
            &[encounter("A", "Consultation")],
        );
        let original = store.find_by_key(&key("A")).unwrap().unwrap();

        for name in ["Consult", "Main consultation", "Clinical consultation"] {
            let report = reconcile(
                &mut store,
                ReconcilePolicy::InstallOnce,
                &[encounter("A", name)],
            );
            assert_eq!(report.skipped, 1);
        }

        let current = store.find_by_key(&key("A")).unwrap().unwrap();
        assert_eq!(current, original);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sync_updates_drifted_record_in_place() {
        let mut store = InMemoryStore::new();
        reconcile(
            &mut store,
            ReconcilePolicy::Sync,
            &[encounter("A", "Consultation")],
        );
        let original = store.find_by_key(&key("A")).unwrap().unwrap();

        let report = reconcile(
            &mut store,
            ReconcilePolicy::Sync,
            &[encounter("A", "Main consultation")],
        );
        assert_eq!((report.updated, report.created, report.skipped), (1, 0, 0));

        let current = store.find_by_key(&key("A")).unwrap().unwrap();
        assert_eq!(current.display_name.as_str(), "Main consultation");
        assert_eq!(current.stable_key, original.stable_key);
        assert_eq!(current.installed_at, original.installed_at);
        assert!(current.updated_at >= original.updated_at);
    }

    #[test]
    fn one_malformed_rule_fails_only_its_descriptor() {
        let mut store = InMemoryStore::new();
        let descriptors = vec![
            encounter("A", "Consultation"),
            identifier("N", "National ID", ValidationRule::pattern(r"\d{5,10}", None)),
            identifier("BAD", "Broken", ValidationRule::pattern("([0-9]", None)),
            identifier("C", "Clinic Number", ValidationRule::pattern(".{1,15}", None)),
            MetadataDescriptor::visit_type("V", "Outpatient", None).unwrap(),
        ];

        let report = reconcile(&mut store, ReconcilePolicy::InstallOnce, &descriptors);

        assert_eq!(report.created, 4);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failed_keys(), vec![&key("BAD")]);
        assert!(matches!(
            report.failures[0].reason,
            FailureReason::InvalidRule(RuleError::InvalidPattern { .. })
        ));
        assert!(store.find_by_key(&key("BAD")).unwrap().is_none());
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn unknown_validator_is_an_invalid_rule() {
        let mut store = InMemoryStore::new();
        let report = reconcile(
            &mut store,
            ReconcilePolicy::InstallOnce,
            &[identifier("M", "MRN", ValidationRule::validator("mod-97"))],
        );
        assert!(matches!(
            report.failures[0].reason,
            FailureReason::InvalidRule(RuleError::UnknownValidator(_))
        ));
    }

    #[test]
    fn same_key_different_kinds_in_one_batch_conflicts() {
        let mut store = InMemoryStore::new();
        let descriptors = vec![
            encounter("K", "Consultation"),
            MetadataDescriptor::visit_type("K", "Outpatient", None).unwrap(),
            encounter("A", "Triage"),
        ];

        let report = reconcile(&mut store, ReconcilePolicy::InstallOnce, &descriptors);

        assert_eq!(report.failed, 2);
        assert_eq!(report.created, 1);
        assert_eq!(
            report.failures[0].reason,
            FailureReason::IdentityConflict {
                declared: MetadataKind::EncounterType,
                existing: None,
                declared_elsewhere: vec![MetadataKind::VisitType],
            }
        );
        assert_eq!(
            report.failures[1].reason,
            FailureReason::IdentityConflict {
                declared: MetadataKind::VisitType,
                existing: None,
                declared_elsewhere: vec![MetadataKind::EncounterType],
            }
        );
        assert!(report.failures[1]
            .reason
            .to_string()
            .contains("also as encounter_type"));
        assert!(store.find_by_key(&key("K")).unwrap().is_none());
    }

    #[test]
    fn key_held_by_another_kind_in_store_conflicts() {
        let mut store = InMemoryStore::new();
        reconcile(
            &mut store,
            ReconcilePolicy::InstallOnce,
            &[encounter("K", "Consultation")],
        );

        for policy in [ReconcilePolicy::InstallOnce, ReconcilePolicy::Sync] {
            let report = reconcile(
                &mut store,
                policy,
                &[MetadataDescriptor::visit_type("K", "Outpatient", None).unwrap()],
            );
            assert_eq!(report.failed, 1);
            assert_eq!(
                report.failures[0].reason,
                FailureReason::IdentityConflict {
                    declared: MetadataKind::VisitType,
                    existing: Some(MetadataKind::EncounterType),
                    declared_elsewhere: Vec::new(),
                }
            );
        }

        let stored = store.find_by_key(&key("K")).unwrap().unwrap();
        assert_eq!(stored.kind(), MetadataKind::EncounterType);
        assert_eq!(stored.display_name.as_str(), "Consultation");
    }

    #[test]
    fn form_requires_its_encounter_type() {
        let mut store = InMemoryStore::new();
        let report = reconcile(
            &mut store,
            ReconcilePolicy::InstallOnce,
            &[
                MetadataDescriptor::form("F", "Triage", None, "E", "1").unwrap(),
                encounter("E", "Triage"),
                MetadataDescriptor::form("G", "Triage again", None, "E", "1").unwrap(),
            ],
        );

        assert_eq!(report.created, 2);
        assert_eq!(report.failed_keys(), vec![&key("F")]);
        assert_eq!(
            report.failures[0].reason,
            FailureReason::UnresolvedReference {
                reference: key("E"),
                expected: MetadataKind::EncounterType,
                found: None,
            }
        );
    }

    #[test]
    fn form_reference_to_wrong_kind_fails() {
        let mut store = InMemoryStore::new();
        let report = reconcile(
            &mut store,
            ReconcilePolicy::InstallOnce,
            &[
                MetadataDescriptor::visit_type("V", "Outpatient", None).unwrap(),
                MetadataDescriptor::form("F", "Triage", None, "V", "1").unwrap(),
            ],
        );
        assert_eq!(report.failed, 1);
        assert!(report.failures[0].reason.to_string().contains("found a visit_type"));
    }

    #[test]
    fn outcomes_follow_declaration_order() {
        let mut store = InMemoryStore::new();
        reconcile(
            &mut store,
            ReconcilePolicy::InstallOnce,
            &[encounter("B", "Triage")],
        );
        let report = reconcile(
            &mut store,
            ReconcilePolicy::InstallOnce,
            &[encounter("C", "Registration"), encounter("B", "Triage"), encounter("A", "Lab")],
        );

        let summary: Vec<(String, Outcome)> = report
            .outcomes
            .iter()
            .map(|o| (o.key.to_string(), o.outcome.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("C".to_string(), Outcome::Created),
                ("B".to_string(), Outcome::Skipped),
                ("A".to_string(), Outcome::Created),
            ]
        );
        assert_eq!(report.to_string(), "created=2 updated=0 skipped=1 failed=0");
    }

    /// Store that becomes unreachable after a fixed number of writes.
    struct FlakyStore {
        inner: InMemoryStore,
        writes_left: usize,
        writes: usize,
    }

    impl MetadataStore for FlakyStore {
        fn find_by_key(&self, key: &StableKey) -> StoreResult<Option<MetadataRecord>> {
            if self.writes_left == 0 {
                return Err(StoreError::unavailable("connection refused", None));
            }
            self.inner.find_by_key(key)
        }

        fn create(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord> {
            self.writes_left -= 1;
            self.writes += 1;
            self.inner.create(record)
        }

        fn update(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord> {
            self.inner.update(record)
        }

        fn list(&self) -> StoreResult<Vec<MetadataRecord>> {
            self.inner.list()
        }
    }

    #[test]
    fn unavailable_store_aborts_with_partial_report() {
        let mut store = FlakyStore {
            inner: InMemoryStore::new(),
            writes_left: 2,
            writes: 0,
        };
        let descriptors = vec![
            encounter("A", "Consultation"),
            encounter("B", "Triage"),
            encounter("C", "Registration"),
            encounter("D", "Lab Results"),
        ];

        let err = MetadataReconciler::new(&mut store, ReconcilePolicy::InstallOnce)
            .reconcile(&descriptors)
            .expect_err("store goes away after two writes");

        match err {
            MetadataError::StoreUnavailable { key: failed_at, report, .. } => {
                assert_eq!(failed_at.as_str(), "C");
                assert_eq!(report.created, 2);
                assert_eq!(report.outcomes.len(), 2);
            }
            other => panic!("expected StoreUnavailable, got {other:?}"),
        }
        assert_eq!(store.inner.len(), 2);
        assert_eq!(store.writes, 2);
    }

    #[test]
    fn non_availability_store_errors_fail_only_the_descriptor() {
        struct RejectingStore;

        impl MetadataStore for RejectingStore {
            fn find_by_key(&self, _key: &StableKey) -> StoreResult<Option<MetadataRecord>> {
                Ok(None)
            }
            fn create(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord> {
                Err(StoreError::AlreadyExists(record.stable_key))
            }
            fn update(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord> {
                Err(StoreError::NotFound(record.stable_key))
            }
            fn list(&self) -> StoreResult<Vec<MetadataRecord>> {
                Ok(Vec::new())
            }
        }

        let mut store = RejectingStore;
        let report = MetadataReconciler::new(&mut store, ReconcilePolicy::InstallOnce)
            .reconcile(&[encounter("A", "Consultation"), encounter("B", "Triage")])
            .unwrap();
        assert_eq!(report.failed, 2);
        assert!(matches!(report.failures[0].reason, FailureReason::Store(_)));
    }

    #[test]
    fn policy_parses_from_text() {
        assert_eq!(
            "install-once".parse::<ReconcilePolicy>().unwrap(),
            ReconcilePolicy::InstallOnce
        );
        assert_eq!(
            "INSTALL_ONCE".parse::<ReconcilePolicy>().unwrap(),
            ReconcilePolicy::InstallOnce
        );
        assert_eq!(" sync ".parse::<ReconcilePolicy>().unwrap(), ReconcilePolicy::Sync);
        assert!("overwrite".parse::<ReconcilePolicy>().is_err());
        assert_eq!(ReconcilePolicy::default(), ReconcilePolicy::InstallOnce);
    }
}
