//! Validation rules attached to identifier and attribute types.
//!
//! A rule is authored as plain data on a descriptor and only compiled when the descriptor is
//! reconciled; a malformed rule fails its own descriptor, not the batch.
//!
//! Two shapes are supported:
//! - [`ValidationRule::Pattern`]: a regular expression the *whole* value must match.
//! - [`ValidationRule::Validator`]: a named check-digit algorithm (currently `luhn-mod-25`).

use crate::constants::{LUHN_MOD_25, LUHN_MOD_25_ALPHABET};
use regex::Regex;
use std::fmt;

/// Errors produced when compiling a [`ValidationRule`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("pattern cannot be empty")]
    EmptyPattern,
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
    #[error("unknown validator '{0}'")]
    UnknownValidator(String),
}

/// A validation rule as authored on a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    Pattern {
        regex: String,
        /// Human-readable explanation shown to users entering a value.
        description: Option<String>,
    },
    Validator(String),
}

impl ValidationRule {
    pub fn pattern(regex: impl Into<String>, description: Option<&str>) -> Self {
        ValidationRule::Pattern {
            regex: regex.into(),
            description: description.map(str::to_owned),
        }
    }

    pub fn validator(name: impl Into<String>) -> Self {
        ValidationRule::Validator(name.into())
    }

    /// Compiles the rule so values can be checked against it.
    ///
    /// Patterns are anchored at both ends, so `\d{5}` accepts `12345` but not `123456`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] if the pattern is empty or does not parse, or the validator name is
    /// not known.
    pub fn compile(&self) -> Result<CompiledRule, RuleError> {
        match self {
            ValidationRule::Pattern { regex, .. } => {
                if regex.is_empty() {
                    return Err(RuleError::EmptyPattern);
                }
                let anchored = format!("^(?:{regex})$");
                Regex::new(&anchored)
                    .map(CompiledRule::Pattern)
                    .map_err(|e| RuleError::InvalidPattern {
                        pattern: regex.clone(),
                        message: e.to_string(),
                    })
            }
            ValidationRule::Validator(name) => match name.as_str() {
                LUHN_MOD_25 => Ok(CompiledRule::CheckDigit(LuhnModN::mod_25())),
                other => Err(RuleError::UnknownValidator(other.to_owned())),
            },
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Pattern {
                regex,
                description: Some(description),
            } => write!(f, "pattern /{regex}/ ({description})"),
            ValidationRule::Pattern { regex, .. } => write!(f, "pattern /{regex}/"),
            ValidationRule::Validator(name) => write!(f, "validator {name}"),
        }
    }
}

/// A rule ready to check values.
#[derive(Debug, Clone)]
pub enum CompiledRule {
    Pattern(Regex),
    CheckDigit(LuhnModN),
}

impl CompiledRule {
    /// Returns true if `value` satisfies the rule.
    pub fn check(&self, value: &str) -> bool {
        match self {
            CompiledRule::Pattern(regex) => regex.is_match(value),
            CompiledRule::CheckDigit(luhn) => luhn.is_valid(value),
        }
    }
}

/// Luhn mod-N check-digit algorithm over a fixed alphabet.
///
/// The last character of an identifier is its check digit. Input is matched case-insensitively
/// against the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuhnModN {
    alphabet: &'static str,
}

impl LuhnModN {
    /// The 25-character alphabet used for medical record numbers.
    pub fn mod_25() -> Self {
        Self {
            alphabet: LUHN_MOD_25_ALPHABET,
        }
    }

    fn modulus(&self) -> usize {
        self.alphabet.len()
    }

    fn code_point(&self, c: char) -> Option<usize> {
        let upper = c.to_ascii_uppercase();
        self.alphabet.chars().position(|a| a == upper)
    }

    /// Computes the check character for `payload`.
    ///
    /// Returns `None` if `payload` is empty or contains characters outside the alphabet.
    pub fn check_character(&self, payload: &str) -> Option<char> {
        if payload.is_empty() {
            return None;
        }

        let n = self.modulus();
        let mut factor = 2;
        let mut sum = 0;

        for c in payload.chars().rev() {
            let addend = factor * self.code_point(c)?;
            factor = if factor == 2 { 1 } else { 2 };
            sum += addend / n + addend % n;
        }

        let check = (n - sum % n) % n;
        self.alphabet.chars().nth(check)
    }

    /// Returns true if the last character of `identifier` is the check character of the rest.
    pub fn is_valid(&self, identifier: &str) -> bool {
        let mut chars = identifier.chars();
        let Some(last) = chars.next_back() else {
            return false;
        };
        match self.check_character(chars.as_str()) {
            Some(expected) => expected == last.to_ascii_uppercase(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matches_whole_value() {
        let rule = ValidationRule::pattern(r"\d{5}", None).compile().unwrap();
        assert!(rule.check("12345"));
        assert!(!rule.check("123456"));
        assert!(!rule.check("a12345"));
        assert!(!rule.check("1234"));
    }

    #[test]
    fn pattern_with_alternation_is_anchored_as_a_group() {
        let rule = ValidationRule::pattern("a|b", None).compile().unwrap();
        assert!(rule.check("a"));
        assert!(!rule.check("ab"));
    }

    #[test]
    fn national_id_pattern_bounds() {
        let rule = ValidationRule::pattern(r"\d{5,10}", Some("Between 5 and 10 consecutive digits"))
            .compile()
            .unwrap();
        assert!(rule.check("12345"));
        assert!(rule.check("1234567890"));
        assert!(!rule.check("12345678901"));
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        let err = ValidationRule::pattern("([0-9]", None)
            .compile()
            .expect_err("unbalanced group should fail");
        assert!(matches!(err, RuleError::InvalidPattern { pattern, .. } if pattern == "([0-9]"));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let err = ValidationRule::pattern("", None).compile().expect_err("empty");
        assert_eq!(err, RuleError::EmptyPattern);
    }

    #[test]
    fn unknown_validator_is_rejected() {
        let err = ValidationRule::validator("verhoeff").compile().expect_err("unknown");
        assert_eq!(err, RuleError::UnknownValidator("verhoeff".into()));
    }

    #[test]
    fn luhn_mod_25_known_check_characters() {
        let luhn = LuhnModN::mod_25();
        assert_eq!(luhn.check_character("12"), Some('M'));
        assert_eq!(luhn.check_character("9"), Some('7'));
        assert_eq!(luhn.check_character("T"), Some('1'));
        assert_eq!(luhn.check_character(""), None);
        assert_eq!(luhn.check_character("1B"), None);
    }

    #[test]
    fn luhn_mod_25_validates_identifiers() {
        let rule = ValidationRule::validator(LUHN_MOD_25).compile().unwrap();
        assert!(rule.check("12M"));
        assert!(rule.check("12m"));
        assert!(rule.check("97"));
        assert!(!rule.check("12N"));
        assert!(!rule.check("13M"));
        assert!(!rule.check("M"));
        assert!(!rule.check(""));
    }

    #[test]
    fn luhn_mod_25_accepts_every_computed_check_character() {
        let luhn = LuhnModN::mod_25();
        for payload in ["1", "100", "MRN42", "ACDE", "999999"] {
            let check = luhn.check_character(payload).unwrap();
            let identifier = format!("{payload}{check}");
            assert!(luhn.is_valid(&identifier), "{identifier} should be valid");
        }
    }

    #[test]
    fn display_describes_rule() {
        assert_eq!(
            ValidationRule::pattern(".{1,15}", Some("At most 15 characters long")).to_string(),
            "pattern /.{1,15}/ (At most 15 characters long)"
        );
        assert_eq!(
            ValidationRule::validator(LUHN_MOD_25).to_string(),
            "validator luhn-mod-25"
        );
    }
}
