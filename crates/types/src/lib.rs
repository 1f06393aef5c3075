//! Validated primitives shared by the metadata crates.

use std::cmp::Ordering;
use std::fmt;

/// Errors that can occur when creating validated values.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    EmptyText,

    /// The sort weight was NaN or infinite
    #[error("Sort weight must be a finite number, got {0}")]
    NonFiniteWeight(f64),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction, so names such as
/// `"  Triage "` and `"Triage"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::EmptyText`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypesError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyText);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Creates optional text, mapping empty or whitespace-only input to `None`.
    ///
    /// Useful for free-text fields such as descriptions where "no value" and "blank value" mean
    /// the same thing.
    pub fn optional(input: Option<impl AsRef<str>>) -> Option<Self> {
        input.and_then(|s| Self::new(s).ok())
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Display priority of a record among records of the same kind.
///
/// Wraps a finite `f64` so that weights such as `3.1` and `3.2` can slot between integers, while
/// still providing a total order (`Eq` and `Ord`).
#[derive(Debug, Clone, Copy)]
pub struct SortWeight(f64);

impl SortWeight {
    /// Creates a sort weight.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::NonFiniteWeight`] for NaN or infinite values.
    pub fn new(value: f64) -> Result<Self, TypesError> {
        if !value.is_finite() {
            return Err(TypesError::NonFiniteWeight(value));
        }
        // Normalise -0.0 so equality and ordering agree.
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialEq for SortWeight {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortWeight {}

impl PartialOrd for SortWeight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortWeight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SortWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for SortWeight {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for SortWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        SortWeight::new(value).map_err(serde::de::Error::custom)
    }
}
