//! Input validation utilities.
//!
//! Checks applied to descriptor attributes that end up as identifiers in the target store
//! (datatype names, form versions) before a descriptor is accepted.

use crate::{MetadataError, MetadataResult};

/// Validates that a datatype or version token is a short, plain ASCII identifier.
///
/// Datatype names are matched by the host platform against its registry, so they must not carry
/// whitespace or punctuation that could be mistaken for configuration syntax:
/// - Rejects empty or whitespace-only strings
/// - Bounds the length to avoid pathological inputs
/// - Restricts characters to ASCII alphanumerics, '.', '-' and '_'
///
/// # Arguments
///
/// * `field` - Name of the attribute being validated, used in error messages.
/// * `value` - The token to validate.
///
/// # Errors
///
/// Returns a `MetadataError::InvalidInput` if the token is invalid.
pub fn validate_token(field: &str, value: &str) -> MetadataResult<()> {
    const MAX_TOKEN_LEN: usize = 64;

    if value.trim().is_empty() {
        return Err(MetadataError::InvalidInput(format!(
            "{field} cannot be empty"
        )));
    }

    if value.len() > MAX_TOKEN_LEN {
        return Err(MetadataError::InvalidInput(format!(
            "{field} exceeds maximum length of {MAX_TOKEN_LEN} characters"
        )));
    }

    let ok = value
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));

    if !ok {
        return Err(MetadataError::InvalidInput(format!(
            "{field} contains invalid characters (only alphanumeric, '.', '-', '_' allowed)"
        )));
    }

    Ok(())
}

/// Validates occurrence bounds of an attribute type.
///
/// # Errors
///
/// Returns a `MetadataError::InvalidInput` if `max_occurs` is zero or below `min_occurs`.
pub fn validate_occurs(min_occurs: u32, max_occurs: Option<u32>) -> MetadataResult<()> {
    match max_occurs {
        Some(0) => Err(MetadataError::InvalidInput(
            "max_occurs must be at least 1 when bounded".into(),
        )),
        Some(max) if max < min_occurs => Err(MetadataError::InvalidInput(format!(
            "max_occurs ({max}) is less than min_occurs ({min_occurs})"
        ))),
        _ => Ok(()),
    }
}
