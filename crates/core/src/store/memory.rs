use super::{MetadataStore, StoreError, StoreResult};
use crate::descriptor::MetadataRecord;
use emr_keys::StableKey;
use std::collections::BTreeMap;

/// Map-backed store. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    records: BTreeMap<StableKey, MetadataRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MetadataStore for InMemoryStore {
    fn find_by_key(&self, key: &StableKey) -> StoreResult<Option<MetadataRecord>> {
        Ok(self.records.get(key).cloned())
    }

    fn create(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord> {
        if self.records.contains_key(&record.stable_key) {
            return Err(StoreError::AlreadyExists(record.stable_key));
        }
        self.records.insert(record.stable_key.clone(), record.clone());
        Ok(record)
    }

    fn update(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord> {
        match self.records.get_mut(&record.stable_key) {
            Some(slot) => {
                *slot = record.clone();
                Ok(record)
            }
            None => Err(StoreError::NotFound(record.stable_key)),
        }
    }

    fn list(&self) -> StoreResult<Vec<MetadataRecord>> {
        Ok(self.records.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MetadataDescriptor;
    use chrono::Utc;

    fn record(key: &str, name: &str) -> MetadataRecord {
        let d = MetadataDescriptor::encounter_type(key, name, None).unwrap();
        MetadataRecord::from_descriptor(&d, Utc::now())
    }

    #[test]
    fn create_then_find() {
        let mut store = InMemoryStore::new();
        store.create(record("A", "Consultation")).unwrap();

        let found = store
            .find_by_key(&StableKey::parse("A").unwrap())
            .unwrap()
            .expect("record should exist");
        assert_eq!(found.display_name.as_str(), "Consultation");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn create_rejects_duplicate_key() {
        let mut store = InMemoryStore::new();
        store.create(record("A", "Consultation")).unwrap();
        let err = store.create(record("A", "Other")).expect_err("duplicate");
        assert!(matches!(err, StoreError::AlreadyExists(key) if key.as_str() == "A"));
    }

    #[test]
    fn update_requires_existing_record() {
        let mut store = InMemoryStore::new();
        let err = store.update(record("A", "Consultation")).expect_err("missing");
        assert!(matches!(err, StoreError::NotFound(_)));

        store.create(record("A", "Consultation")).unwrap();
        store.update(record("A", "Renamed")).unwrap();
        let found = store
            .find_by_key(&StableKey::parse("A").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(found.display_name.as_str(), "Renamed");
    }

    #[test]
    fn list_is_ordered_by_key() {
        let mut store = InMemoryStore::new();
        store.create(record("b", "B")).unwrap();
        store.create(record("a", "A")).unwrap();
        let keys: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.stable_key.to_string())
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
