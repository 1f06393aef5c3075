//! Report column converters.
//!
//! A report engine evaluates a data definition per patient and then passes the raw value through a
//! converter to get what is printed in the column. Converters never fail: a missing value renders
//! as an empty cell.

use crate::constants::REPORT_DATE_FORMAT;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient's enrollment in a care program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEnrollment {
    pub program: String,
    pub date_enrolled: Option<NaiveDate>,
    pub date_completed: Option<NaiveDate>,
}

impl ProgramEnrollment {
    pub fn new(program: impl Into<String>, date_enrolled: Option<NaiveDate>) -> Self {
        Self {
            program: program.into(),
            date_enrolled,
            date_completed: None,
        }
    }
}

/// Turns an evaluated report value into column text.
pub trait DataConverter {
    type Input;

    fn convert(&self, value: Option<&Self::Input>) -> String;
}

/// Renders the enrolled date of a patient's last program enrollment as `DD/MM/YYYY`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateOfLastEnrollmentConverter;

impl DataConverter for DateOfLastEnrollmentConverter {
    type Input = ProgramEnrollment;

    fn convert(&self, value: Option<&ProgramEnrollment>) -> String {
        value
            .and_then(|enrollment| enrollment.date_enrolled)
            .map(format_date)
            .unwrap_or_default()
    }
}

/// Formats a date with [`REPORT_DATE_FORMAT`].
pub fn format_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

/// Picks the most recent enrollment by enrolled date.
///
/// On equal dates the one later in the slice wins. Undated enrollments are only returned when no
/// enrollment has a date.
pub fn last_enrollment(enrollments: &[ProgramEnrollment]) -> Option<&ProgramEnrollment> {
    // `max_by_key` keeps the last of equal maxima, and `None` sorts before any date.
    enrollments.iter().max_by_key(|e| e.date_enrolled)
}
