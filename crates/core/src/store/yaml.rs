//! File-backed store: one YAML document per record.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//!   <d0d1>/
//!     <d2d3>/
//!       <digest>.yaml
//! ```
//!
//! where `digest` is the SHA-256 of the record's stable key (see [`StableKey::sharded_file`]).
//! The key is also stored inside the document and must agree with the file it was read from.
//!
//! ## Wire format
//!
//! ```yaml
//! key: 465a92f2-baf8-42e9-9612-53064be868e8
//! kind: encounter_type
//! name: Consultation
//! description: Collection of clinical data during the main consultation
//! installed_at: 2024-01-01T00:00:00Z
//! updated_at: 2024-01-01T00:00:00Z
//! ```
//!
//! Unknown keys are rejected, and so are detail fields that do not belong to the record's kind.

use super::{MetadataStore, StoreError, StoreResult};
use crate::constants::{RECORD_FILE_EXTENSION, TEMP_FILE_SUFFIX};
use crate::descriptor::{
    AttributeTypeDetails, KindDetails, LocationBehavior, MetadataKind, MetadataRecord,
};
use crate::rules::ValidationRule;
use chrono::{DateTime, Utc};
use emr_keys::StableKey;
use emr_types::{NonEmptyText, SortWeight};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Store that keeps each record in its own YAML file under `root`.
///
/// The root directory must exist when the store is opened and for every later operation; a
/// missing root is reported as [`StoreError::Unavailable`] (for example an unmounted volume).
#[derive(Debug, Clone)]
pub struct YamlFileStore {
    root: PathBuf,
}

impl YamlFileStore {
    /// Opens a store rooted at an existing directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if `root` is not a directory.
    pub fn open(root: &Path) -> StoreResult<Self> {
        let store = Self {
            root: root.to_path_buf(),
        };
        store.ensure_available()?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file that holds (or would hold) the record for `key`.
    pub fn record_path(&self, key: &StableKey) -> PathBuf {
        key.sharded_file(&self.root, RECORD_FILE_EXTENSION)
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(StoreError::unavailable(
                format!("{} is not a directory", self.root.display()),
                None,
            ))
        }
    }

    fn read_record(&self, path: &Path) -> StoreResult<Option<MetadataRecord>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::RecordIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        parse_record(&text)
            .map(Some)
            .map_err(|message| StoreError::Corrupt {
                path: path.to_path_buf(),
                message,
            })
    }

    fn write_record(&self, record: &MetadataRecord) -> StoreResult<()> {
        let path = self.record_path(&record.stable_key);
        let text = render_record(record)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::RecordIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        // Write to a sibling and rename so a crash never leaves a half-written record behind.
        let temp = path.with_extension(format!("{RECORD_FILE_EXTENSION}.{TEMP_FILE_SUFFIX}"));
        fs::write(&temp, text).map_err(|source| StoreError::RecordIo {
            path: temp.clone(),
            source,
        })?;
        fs::rename(&temp, &path).map_err(|source| StoreError::RecordIo {
            path: path.clone(),
            source,
        })?;

        Ok(())
    }

    fn record_files(&self) -> StoreResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        let root_entries = fs::read_dir(&self.root).map_err(|e| {
            StoreError::unavailable(format!("failed to list {}", self.root.display()), Some(e))
        })?;
        let read_shard = |dir: &Path| {
            fs::read_dir(dir).map_err(|source| StoreError::RecordIo {
                path: dir.to_path_buf(),
                source,
            })
        };

        for s1 in root_entries.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }
            for s2 in read_shard(&s1_path)?.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }
                for entry in read_shard(&s2_path)?.flatten() {
                    let path = entry.path();
                    let is_record = path.is_file()
                        && path.extension().and_then(|e| e.to_str()) == Some(RECORD_FILE_EXTENSION);
                    if is_record {
                        files.push(path);
                    }
                }
            }
        }

        Ok(files)
    }
}

impl MetadataStore for YamlFileStore {
    fn find_by_key(&self, key: &StableKey) -> StoreResult<Option<MetadataRecord>> {
        self.ensure_available()?;
        let path = self.record_path(key);

        match self.read_record(&path)? {
            Some(record) if &record.stable_key != key => Err(StoreError::Corrupt {
                path,
                message: format!(
                    "file holds key '{}' but was looked up as '{}'",
                    record.stable_key, key
                ),
            }),
            found => Ok(found),
        }
    }

    fn create(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord> {
        self.ensure_available()?;
        if self.record_path(&record.stable_key).exists() {
            return Err(StoreError::AlreadyExists(record.stable_key));
        }
        self.write_record(&record)?;
        Ok(record)
    }

    fn update(&mut self, record: MetadataRecord) -> StoreResult<MetadataRecord> {
        self.ensure_available()?;
        if !self.record_path(&record.stable_key).exists() {
            return Err(StoreError::NotFound(record.stable_key));
        }
        self.write_record(&record)?;
        Ok(record)
    }

    fn list(&self) -> StoreResult<Vec<MetadataRecord>> {
        self.ensure_available()?;

        let mut records = Vec::new();
        for path in self.record_files()? {
            let Some(record) = self.read_record(&path)? else {
                continue;
            };
            if self.record_path(&record.stable_key) != path {
                return Err(StoreError::Corrupt {
                    path,
                    message: format!("key '{}' does not belong in this file", record.stable_key),
                });
            }
            records.push(record);
        }

        records.sort_by(|a, b| a.stable_key.cmp(&b.stable_key));
        Ok(records)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordWire {
    key: StableKey,
    kind: MetadataKind,
    name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<NonEmptyText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<RuleWire>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sort_weight: Option<SortWeight>,
    #[serde(default, skip_serializing_if = "DetailsWire::is_empty")]
    details: DetailsWire,
    installed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validator: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DetailsWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    encounter_type: Option<StableKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<NonEmptyText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    datatype: Option<NonEmptyText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    datatype_config: Option<NonEmptyText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_occurs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_occurs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_behavior: Option<LocationBehavior>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<NonEmptyText>,
    #[serde(skip_serializing_if = "Option::is_none")]
    searchable: Option<bool>,
}

impl DetailsWire {
    fn present_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("encounter_type", self.encounter_type.is_some()),
            ("version", self.version.is_some()),
            ("datatype", self.datatype.is_some()),
            ("datatype_config", self.datatype_config.is_some()),
            ("default_value", self.default_value.is_some()),
            ("min_occurs", self.min_occurs.is_some()),
            ("max_occurs", self.max_occurs.is_some()),
            ("location_behavior", self.location_behavior.is_some()),
            ("required", self.required.is_some()),
            ("format", self.format.is_some()),
            ("searchable", self.searchable.is_some()),
        ];
        fields
            .into_iter()
            .filter_map(|(name, present)| present.then_some(name))
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }

    fn only(&self, kind: MetadataKind, allowed: &[&str]) -> Result<(), String> {
        match self
            .present_fields()
            .into_iter()
            .find(|field| !allowed.contains(field))
        {
            Some(field) => Err(format!("details.{field} is not valid for kind {kind}")),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

/// Parses a record document, reporting the failing field path on schema errors.
fn parse_record(yaml_text: &str) -> Result<MetadataRecord, String> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

    let wire = match serde_path_to_error::deserialize::<_, RecordWire>(deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() {
                "<root>"
            } else {
                path.as_str()
            };
            return Err(format!("schema mismatch at {path}: {source}"));
        }
    };

    wire_to_domain(wire)
}

fn render_record(record: &MetadataRecord) -> StoreResult<String> {
    serde_yaml::to_string(&domain_to_wire(record)).map_err(|e| StoreError::Serialization {
        key: record.stable_key.clone(),
        message: e.to_string(),
    })
}

fn required<T>(value: Option<T>, kind: MetadataKind, field: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("details.{field} is required for kind {kind}"))
}

fn wire_to_domain(wire: RecordWire) -> Result<MetadataRecord, String> {
    let kind = wire.kind;
    let d = wire.details;

    let details = match kind {
        MetadataKind::EncounterType => {
            d.only(kind, &[])?;
            KindDetails::EncounterType
        }
        MetadataKind::VisitType => {
            d.only(kind, &[])?;
            KindDetails::VisitType
        }
        MetadataKind::Form => {
            d.only(kind, &["encounter_type", "version"])?;
            KindDetails::Form {
                encounter_type: required(d.encounter_type, kind, "encounter_type")?,
                version: required(d.version, kind, "version")?,
            }
        }
        MetadataKind::GlobalProperty => {
            d.only(kind, &["datatype", "datatype_config", "default_value"])?;
            KindDetails::GlobalProperty {
                datatype: d.datatype,
                datatype_config: d.datatype_config,
                default_value: d.default_value,
            }
        }
        MetadataKind::LocationAttributeType | MetadataKind::VisitAttributeType => {
            d.only(
                kind,
                &["datatype", "datatype_config", "min_occurs", "max_occurs"],
            )?;
            let datatype = required(d.datatype, kind, "datatype")?;
            let attribute = AttributeTypeDetails::new(
                datatype.as_str(),
                d.datatype_config.as_ref().map(NonEmptyText::as_str),
                d.min_occurs.unwrap_or(0),
                d.max_occurs,
            )
            .map_err(|e| e.to_string())?;
            if kind == MetadataKind::LocationAttributeType {
                KindDetails::LocationAttributeType(attribute)
            } else {
                KindDetails::VisitAttributeType(attribute)
            }
        }
        MetadataKind::PatientIdentifierType => {
            d.only(kind, &["location_behavior", "required"])?;
            KindDetails::PatientIdentifierType {
                location_behavior: d.location_behavior,
                required: d.required.unwrap_or(false),
            }
        }
        MetadataKind::PersonAttributeType => {
            d.only(kind, &["format", "searchable"])?;
            KindDetails::PersonAttributeType {
                format: required(d.format, kind, "format")?,
                searchable: d.searchable.unwrap_or(false),
            }
        }
    };

    let validation_rule = match wire.rule {
        None => None,
        Some(RuleWire {
            pattern: Some(regex),
            description,
            validator: None,
        }) => Some(ValidationRule::Pattern { regex, description }),
        Some(RuleWire {
            pattern: None,
            description: None,
            validator: Some(name),
        }) => Some(ValidationRule::Validator(name)),
        Some(_) => {
            return Err(
                "rule must have either pattern (with optional description) or validator".into(),
            )
        }
    };

    if wire.updated_at < wire.installed_at {
        return Err("updated_at is earlier than installed_at".into());
    }

    Ok(MetadataRecord {
        stable_key: wire.key,
        display_name: wire.name,
        description: wire.description,
        validation_rule,
        ordering: wire.sort_weight,
        details,
        installed_at: wire.installed_at,
        updated_at: wire.updated_at,
    })
}

fn domain_to_wire(record: &MetadataRecord) -> RecordWire {
    let mut details = DetailsWire::default();

    match &record.details {
        KindDetails::EncounterType | KindDetails::VisitType => {}
        KindDetails::Form {
            encounter_type,
            version,
        } => {
            details.encounter_type = Some(encounter_type.clone());
            details.version = Some(version.clone());
        }
        KindDetails::GlobalProperty {
            datatype,
            datatype_config,
            default_value,
        } => {
            details.datatype = datatype.clone();
            details.datatype_config = datatype_config.clone();
            details.default_value = default_value.clone();
        }
        KindDetails::LocationAttributeType(attribute)
        | KindDetails::VisitAttributeType(attribute) => {
            details.datatype = Some(attribute.datatype.clone());
            details.datatype_config = attribute.datatype_config.clone();
            details.min_occurs = Some(attribute.min_occurs);
            details.max_occurs = attribute.max_occurs;
        }
        KindDetails::PatientIdentifierType {
            location_behavior,
            required,
        } => {
            details.location_behavior = *location_behavior;
            details.required = Some(*required);
        }
        KindDetails::PersonAttributeType { format, searchable } => {
            details.format = Some(format.clone());
            details.searchable = Some(*searchable);
        }
    }

    let rule = record.validation_rule.as_ref().map(|rule| match rule {
        ValidationRule::Pattern { regex, description } => RuleWire {
            pattern: Some(regex.clone()),
            description: description.clone(),
            validator: None,
        },
        ValidationRule::Validator(name) => RuleWire {
            pattern: None,
            description: None,
            validator: Some(name.clone()),
        },
    });

    RecordWire {
        key: record.stable_key.clone(),
        kind: record.kind(),
        name: record.display_name.clone(),
        description: record.description.clone(),
        rule,
        sort_weight: record.ordering,
        details,
        installed_at: record.installed_at,
        updated_at: record.updated_at,
    }
}
