//! The built-in "common metadata" catalogue.
//!
//! Keys are fixed forever: they were issued once and are what other installations, forms and
//! reports refer to. Names and descriptions may be edited in later releases; keys may not.
//!
//! Some keys (the unknown location, the drug order type, the unknown provider) belong to records
//! owned by the platform itself. They are exposed here so callers can refer to them, but the
//! catalogue does not install them.

use crate::constants::LUHN_MOD_25;
use crate::descriptor::{AttributeTypeDetails, KindDetails, LocationBehavior, MetadataDescriptor};
use crate::rules::ValidationRule;
use crate::MetadataResult;

pub mod encounter_type {
    pub const CONSULTATION: &str = "465a92f2-baf8-42e9-9612-53064be868e8";
    pub const LAB_RESULTS: &str = "17a381d1-7e29-406a-b782-aa903b963c28";
    pub const REGISTRATION: &str = "de1f9d67-b73e-4e1b-90d0-036166fc6995";
    pub const TRIAGE: &str = "d1059fb9-a079-4feb-a749-eedd709ae542";
}

pub mod form {
    pub const CLINICAL_ENCOUNTER: &str = "e958f902-64df-4819-afd4-7fb061f59308";
    pub const LAB_RESULTS: &str = "7e603909-9ed5-4d0c-a688-26ecb05d8b6e";
    pub const OBSTETRIC_HISTORY: &str = "8e4e1abf-7c08-4ba8-b6d8-19a9f1ccb6c9";
    pub const OTHER_MEDICATIONS: &str = "d4ff8ad1-19f8-484f-9395-04c755de9a47";
    pub const PROGRESS_NOTE: &str = "0038a296-62f8-4099-80e5-c9ea7590c157";
    pub const SURGICAL_AND_MEDICAL_HISTORY: &str = "4f3c9bd8-c117-4a5e-a7eb-12a627c29de6";
    pub const TRIAGE: &str = "37f6bd8d-586a-4169-95fa-5781f987fe62";
}

pub mod global_property {
    pub const DEFAULT_LOCATION: &str = "8f80f3f7-bdc0-46f5-8f50-54dea2fcbb01";

    /// Property name under which the default location is looked up.
    pub const DEFAULT_LOCATION_NAME: &str = "kenyaemr.defaultLocation";
}

/// Reference only.
pub mod location {
    pub const UNKNOWN: &str = "8d6c993e-c2cc-11de-8d13-0010c6dffd0f";
}

pub mod location_attribute_type {
    pub const MASTER_FACILITY_CODE: &str = "8a845a89-6aa5-4111-81d3-0af31c45c002";
}

/// Reference only.
pub mod order_type {
    pub const DRUG: &str = "131168f4-15f5-102d-96e4-000c29c2a5d7";
}

pub mod patient_identifier_type {
    pub const NATIONAL_ID: &str = "49af6cdc-7968-4abb-bf46-de10d7f4859f";
    pub const OLD_ID: &str = "8d79403a-c2cc-11de-8d13-0010c6dffd0f";
    pub const OPENMRS_ID: &str = "dfacd928-0370-4315-99d7-6ec1c9f7ae76";
    pub const PATIENT_CLINIC_NUMBER: &str = "b4d66522-11fc-45c7-83e3-39a1af21ae0d";
}

pub mod person_attribute_type {
    pub const TELEPHONE_CONTACT: &str = "b2c38640-2603-4629-aebd-3b54f33f1e3a";
    pub const SUBCHIEF_NAME: &str = "40fa0c9c-7415-43ff-a4eb-c7c73d7b1a7a";
    pub const NEXT_OF_KIN_NAME: &str = "830bef6d-b01f-449d-9f8d-ac0fede8dbd3";
    pub const NEXT_OF_KIN_RELATIONSHIP: &str = "d0aa9fd1-2ac5-45d8-9c5e-4317c622c8f5";
    pub const NEXT_OF_KIN_CONTACT: &str = "342a1d39-c541-4b29-8818-930916f4c2dc";
    pub const NEXT_OF_KIN_ADDRESS: &str = "7cf22bec-d90a-46ad-9f48-035952261294";
}

/// Reference only.
pub mod provider {
    pub const UNKNOWN: &str = "ae01b8ff-a4cc-4012-bcf7-72359e852e14";
}

pub mod visit_attribute_type {
    pub const SOURCE_FORM: &str = "8bfab185-6947-4958-b7ab-dfafae1a3e3d";
}

pub mod visit_type {
    pub const OUTPATIENT: &str = "3371a4d4-f66f-4454-a86d-92c7b3da990c";
}

/// Returns the common metadata in install order.
///
/// Encounter types come before the forms that reference them.
///
/// # Errors
///
/// Only fails if a hard-coded entry is itself invalid, which the tests below rule out.
pub fn common_metadata() -> MetadataResult<Vec<MetadataDescriptor>> {
    let mut descriptors = Vec::new();

    for (key, name, description) in [
        (
            encounter_type::CONSULTATION,
            "Consultation",
            "Collection of clinical data during the main consultation",
        ),
        (
            encounter_type::LAB_RESULTS,
            "Lab Results",
            "Collection of laboratory results",
        ),
        (
            encounter_type::REGISTRATION,
            "Registration",
            "Initial data collection for a patient, not specific to any program",
        ),
        (
            encounter_type::TRIAGE,
            "Triage",
            "Collection of limited data prior to a more thorough examination",
        ),
    ] {
        descriptors.push(MetadataDescriptor::encounter_type(key, name, Some(description))?);
    }

    for (key, name, description, encounter) in [
        (
            form::CLINICAL_ENCOUNTER,
            "Clinical Encounter",
            None,
            encounter_type::CONSULTATION,
        ),
        (form::LAB_RESULTS, "Lab Results", None, encounter_type::LAB_RESULTS),
        (
            form::OBSTETRIC_HISTORY,
            "Obstetric History",
            None,
            encounter_type::REGISTRATION,
        ),
        (
            form::OTHER_MEDICATIONS,
            "Other Medications",
            Some("Recording of non-regimen medications"),
            encounter_type::CONSULTATION,
        ),
        (
            form::PROGRESS_NOTE,
            "Progress Note",
            Some("For additional information - mostly complaints and examination findings."),
            encounter_type::CONSULTATION,
        ),
        (
            form::SURGICAL_AND_MEDICAL_HISTORY,
            "Surgical and Medical History",
            None,
            encounter_type::REGISTRATION,
        ),
        (form::TRIAGE, "Triage", None, encounter_type::TRIAGE),
    ] {
        descriptors.push(MetadataDescriptor::form(key, name, description, encounter, "1")?);
    }

    descriptors.push(MetadataDescriptor::new(
        global_property::DEFAULT_LOCATION,
        global_property::DEFAULT_LOCATION_NAME,
        Some("The facility for which this installation is configured"),
        KindDetails::global_property(Some("location"), None, None)?,
    )?);

    descriptors.push(
        MetadataDescriptor::new(
            location_attribute_type::MASTER_FACILITY_CODE,
            "Master Facility Code",
            Some("Unique facility code allocated by the Ministry of Health"),
            KindDetails::LocationAttributeType(AttributeTypeDetails::new(
                "regex-validated-text",
                Some(r"\d{5}"),
                0,
                Some(1),
            )?),
        )?
        .with_rule(ValidationRule::pattern(r"\d{5}", Some("Five digits"))),
    );

    descriptors.push(identifier_type(
        patient_identifier_type::OLD_ID,
        "Old Identification Number",
        "Identifier given out prior to OpenMRS",
        None,
        None,
        false,
    )?);
    descriptors.push(identifier_type(
        patient_identifier_type::OPENMRS_ID,
        "OpenMRS ID",
        "Medical Record Number generated by OpenMRS for every patient",
        Some(ValidationRule::validator(LUHN_MOD_25)),
        Some(LocationBehavior::Required),
        true,
    )?);
    descriptors.push(identifier_type(
        patient_identifier_type::PATIENT_CLINIC_NUMBER,
        "Patient Clinic Number",
        "Assigned to the patient at a clinic service (not globally unique)",
        Some(ValidationRule::pattern(".{1,15}", Some("At most 15 characters long"))),
        Some(LocationBehavior::Required),
        false,
    )?);
    descriptors.push(identifier_type(
        patient_identifier_type::NATIONAL_ID,
        "National ID",
        "Kenyan national identity card number",
        Some(ValidationRule::pattern(
            r"\d{5,10}",
            Some("Between 5 and 10 consecutive digits"),
        )),
        Some(LocationBehavior::NotUsed),
        false,
    )?);

    for (key, name, description, weight) in [
        (
            person_attribute_type::TELEPHONE_CONTACT,
            "Telephone contact",
            "Telephone number the patient can be contacted at",
            1.0,
        ),
        (
            person_attribute_type::SUBCHIEF_NAME,
            "Subchief name",
            "Name of subchief or chief of patient's area",
            2.0,
        ),
        (
            person_attribute_type::NEXT_OF_KIN_NAME,
            "Next of kin name",
            "Name of patient's next of kin",
            3.0,
        ),
        (
            person_attribute_type::NEXT_OF_KIN_RELATIONSHIP,
            "Next of kin relationship",
            "Next of kin relationship to the patient",
            3.1,
        ),
        (
            person_attribute_type::NEXT_OF_KIN_CONTACT,
            "Next of kin contact",
            "Telephone contact of patient's next of kin",
            3.2,
        ),
        (
            person_attribute_type::NEXT_OF_KIN_ADDRESS,
            "Next of kin address",
            "Address of patient's next of kin",
            3.3,
        ),
    ] {
        descriptors.push(
            MetadataDescriptor::new(
                key,
                name,
                Some(description),
                KindDetails::person_attribute_type("text", false)?,
            )?
            .with_ordering(weight)?,
        );
    }

    descriptors.push(MetadataDescriptor::new(
        visit_attribute_type::SOURCE_FORM,
        "Source form",
        Some("The form whose submission created the visit"),
        KindDetails::VisitAttributeType(AttributeTypeDetails::new("form", None, 0, Some(1))?),
    )?);

    descriptors.push(MetadataDescriptor::visit_type(
        visit_type::OUTPATIENT,
        "Outpatient",
        Some("Visit where the patient is not admitted to the hospital"),
    )?);

    Ok(descriptors)
}

fn identifier_type(
    key: &str,
    name: &str,
    description: &str,
    rule: Option<ValidationRule>,
    location_behavior: Option<LocationBehavior>,
    required: bool,
) -> MetadataResult<MetadataDescriptor> {
    let descriptor = MetadataDescriptor::new(
        key,
        name,
        Some(description),
        KindDetails::PatientIdentifierType {
            location_behavior,
            required,
        },
    )?;
    Ok(match rule {
        Some(rule) => descriptor.with_rule(rule),
        None => descriptor,
    })
}
