//! Metadata descriptors and the records they reconcile into.
//!
//! A [`MetadataDescriptor`] is a static declaration of one piece of platform vocabulary: an
//! encounter type, a form, an identifier type, and so on. Its [`StableKey`] is its identity; every
//! other attribute may change between releases without creating a new logical record.
//!
//! The kind of a descriptor is derived from its [`KindDetails`] payload rather than stored next to
//! it, so a descriptor cannot claim to be a form while carrying visit-type attributes.

use crate::rules::ValidationRule;
use crate::validation::{validate_occurs, validate_token};
use crate::{MetadataError, MetadataResult};
use chrono::{DateTime, Utc};
use emr_keys::StableKey;
use emr_types::{NonEmptyText, SortWeight};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of metadata record the reconciler knows how to install.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    EncounterType,
    Form,
    GlobalProperty,
    LocationAttributeType,
    PatientIdentifierType,
    PersonAttributeType,
    VisitAttributeType,
    VisitType,
}

impl MetadataKind {
    pub const ALL: [MetadataKind; 8] = [
        MetadataKind::EncounterType,
        MetadataKind::Form,
        MetadataKind::GlobalProperty,
        MetadataKind::LocationAttributeType,
        MetadataKind::PatientIdentifierType,
        MetadataKind::PersonAttributeType,
        MetadataKind::VisitAttributeType,
        MetadataKind::VisitType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataKind::EncounterType => "encounter_type",
            MetadataKind::Form => "form",
            MetadataKind::GlobalProperty => "global_property",
            MetadataKind::LocationAttributeType => "location_attribute_type",
            MetadataKind::PatientIdentifierType => "patient_identifier_type",
            MetadataKind::PersonAttributeType => "person_attribute_type",
            MetadataKind::VisitAttributeType => "visit_attribute_type",
            MetadataKind::VisitType => "visit_type",
        }
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataKind {
    type Err = MetadataError;

    /// Accepts the snake_case name, with `-` allowed in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().replace('-', "_");
        MetadataKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalised)
            .ok_or_else(|| MetadataError::InvalidInput(format!("unknown metadata kind '{s}'")))
    }
}

/// Whether an identifier type must be issued at a specific location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationBehavior {
    Required,
    NotUsed,
}

/// Attributes shared by location and visit attribute types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeTypeDetails {
    pub datatype: NonEmptyText,
    pub datatype_config: Option<NonEmptyText>,
    pub min_occurs: u32,
    /// `None` means unbounded.
    pub max_occurs: Option<u32>,
}

impl AttributeTypeDetails {
    /// # Errors
    ///
    /// Returns `MetadataError::InvalidInput` if the datatype is not a plain token or the
    /// occurrence bounds are inconsistent.
    pub fn new(
        datatype: &str,
        datatype_config: Option<&str>,
        min_occurs: u32,
        max_occurs: Option<u32>,
    ) -> MetadataResult<Self> {
        validate_token("datatype", datatype)?;
        validate_occurs(min_occurs, max_occurs)?;
        Ok(Self {
            datatype: NonEmptyText::new(datatype)?,
            datatype_config: NonEmptyText::optional(datatype_config),
            min_occurs,
            max_occurs,
        })
    }
}

/// Kind-specific attributes of a descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KindDetails {
    EncounterType,
    Form {
        /// Key of the encounter type this form records.
        encounter_type: StableKey,
        version: NonEmptyText,
    },
    GlobalProperty {
        datatype: Option<NonEmptyText>,
        datatype_config: Option<NonEmptyText>,
        default_value: Option<String>,
    },
    LocationAttributeType(AttributeTypeDetails),
    PatientIdentifierType {
        location_behavior: Option<LocationBehavior>,
        required: bool,
    },
    PersonAttributeType {
        format: NonEmptyText,
        searchable: bool,
    },
    VisitAttributeType(AttributeTypeDetails),
    VisitType,
}

impl KindDetails {
    pub fn kind(&self) -> MetadataKind {
        match self {
            KindDetails::EncounterType => MetadataKind::EncounterType,
            KindDetails::Form { .. } => MetadataKind::Form,
            KindDetails::GlobalProperty { .. } => MetadataKind::GlobalProperty,
            KindDetails::LocationAttributeType(_) => MetadataKind::LocationAttributeType,
            KindDetails::PatientIdentifierType { .. } => MetadataKind::PatientIdentifierType,
            KindDetails::PersonAttributeType { .. } => MetadataKind::PersonAttributeType,
            KindDetails::VisitAttributeType(_) => MetadataKind::VisitAttributeType,
            KindDetails::VisitType => MetadataKind::VisitType,
        }
    }

    /// Keys of other records this record points at, with the kind each must have.
    pub fn references(&self) -> Vec<(&StableKey, MetadataKind)> {
        match self {
            KindDetails::Form { encounter_type, .. } => {
                vec![(encounter_type, MetadataKind::EncounterType)]
            }
            _ => Vec::new(),
        }
    }

    /// Form details.
    ///
    /// # Errors
    ///
    /// Returns an error if the encounter type key or version is invalid.
    pub fn form(encounter_type: &str, version: &str) -> MetadataResult<Self> {
        validate_token("version", version)?;
        Ok(KindDetails::Form {
            encounter_type: StableKey::parse(encounter_type)?,
            version: NonEmptyText::new(version)?,
        })
    }

    /// Global property details.
    ///
    /// # Errors
    ///
    /// Returns an error if `datatype` is given but is not a plain token.
    pub fn global_property(
        datatype: Option<&str>,
        datatype_config: Option<&str>,
        default_value: Option<&str>,
    ) -> MetadataResult<Self> {
        if let Some(datatype) = datatype {
            validate_token("datatype", datatype)?;
        }
        Ok(KindDetails::GlobalProperty {
            datatype: NonEmptyText::optional(datatype),
            datatype_config: NonEmptyText::optional(datatype_config),
            default_value: default_value.map(str::to_owned),
        })
    }

    /// Person attribute type details.
    ///
    /// # Errors
    ///
    /// Returns an error if `format` is not a plain token.
    pub fn person_attribute_type(format: &str, searchable: bool) -> MetadataResult<Self> {
        validate_token("format", format)?;
        Ok(KindDetails::PersonAttributeType {
            format: NonEmptyText::new(format)?,
            searchable,
        })
    }
}

/// Declared form of one metadata record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataDescriptor {
    pub stable_key: StableKey,
    pub display_name: NonEmptyText,
    pub description: Option<NonEmptyText>,
    pub validation_rule: Option<ValidationRule>,
    pub ordering: Option<SortWeight>,
    pub details: KindDetails,
}

impl MetadataDescriptor {
    /// Creates a descriptor without a rule or ordering.
    ///
    /// A blank `description` is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if `stable_key` is not a valid key or `display_name` is blank.
    pub fn new(
        stable_key: &str,
        display_name: &str,
        description: Option<&str>,
        details: KindDetails,
    ) -> MetadataResult<Self> {
        Ok(Self {
            stable_key: StableKey::parse(stable_key)?,
            display_name: NonEmptyText::new(display_name)?,
            description: NonEmptyText::optional(description),
            validation_rule: None,
            ordering: None,
            details,
        })
    }

    pub fn encounter_type(
        stable_key: &str,
        display_name: &str,
        description: Option<&str>,
    ) -> MetadataResult<Self> {
        Self::new(stable_key, display_name, description, KindDetails::EncounterType)
    }

    pub fn visit_type(
        stable_key: &str,
        display_name: &str,
        description: Option<&str>,
    ) -> MetadataResult<Self> {
        Self::new(stable_key, display_name, description, KindDetails::VisitType)
    }

    pub fn form(
        stable_key: &str,
        display_name: &str,
        description: Option<&str>,
        encounter_type: &str,
        version: &str,
    ) -> MetadataResult<Self> {
        let details = KindDetails::form(encounter_type, version)?;
        Self::new(stable_key, display_name, description, details)
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rule = Some(rule);
        self
    }

    /// # Errors
    ///
    /// Returns an error if `weight` is NaN or infinite.
    pub fn with_ordering(mut self, weight: f64) -> MetadataResult<Self> {
        self.ordering = Some(SortWeight::new(weight)?);
        Ok(self)
    }

    pub fn kind(&self) -> MetadataKind {
        self.details.kind()
    }
}

/// A metadata record as held by a target store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataRecord {
    pub stable_key: StableKey,
    pub display_name: NonEmptyText,
    pub description: Option<NonEmptyText>,
    pub validation_rule: Option<ValidationRule>,
    pub ordering: Option<SortWeight>,
    pub details: KindDetails,
    pub installed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MetadataRecord {
    /// Builds a fresh record from a descriptor, stamped with `now`.
    pub fn from_descriptor(descriptor: &MetadataDescriptor, now: DateTime<Utc>) -> Self {
        Self {
            stable_key: descriptor.stable_key.clone(),
            display_name: descriptor.display_name.clone(),
            description: descriptor.description.clone(),
            validation_rule: descriptor.validation_rule.clone(),
            ordering: descriptor.ordering,
            details: descriptor.details.clone(),
            installed_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> MetadataKind {
        self.details.kind()
    }

    /// Returns true if every mutable attribute equals the descriptor's.
    pub fn matches(&self, descriptor: &MetadataDescriptor) -> bool {
        self.display_name == descriptor.display_name
            && self.description == descriptor.description
            && self.validation_rule == descriptor.validation_rule
            && self.ordering == descriptor.ordering
            && self.details == descriptor.details
    }

    /// Returns a copy carrying the descriptor's mutable attributes.
    ///
    /// The key and `installed_at` are preserved; `updated_at` becomes `now`, but never earlier
    /// than `installed_at` (the clock may have stepped back since install).
    pub fn updated_from(&self, descriptor: &MetadataDescriptor, now: DateTime<Utc>) -> Self {
        let updated_at = now.max(self.installed_at);
        Self {
            stable_key: self.stable_key.clone(),
            installed_at: self.installed_at,
            updated_at,
            ..Self::from_descriptor(descriptor, updated_at)
        }
    }
}
