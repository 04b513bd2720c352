//! Schema enforcement for student payloads
//!
//! Validation semantics:
//! - Required text fields must be present and non-blank
//! - `gender` and `status` must name a member of their domain exactly
//! - Dates must be RFC 3339 timestamps or `YYYY-MM-DD` with a year in
//!   0000..=9999
//! - Defaults apply only to fields that are absent: gender Other,
//!   section "A", status Active, enrollment date = creation time
//!
//! Validation never mutates the payload and never coerces values.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use super::errors::{StudentError, StudentResult, ValidationDetails};
use super::types::{Gender, StudentPayload, StudentRecord, StudentStatus};

const DEFAULT_SECTION: &str = "A";

/// A payload that passed validation, minus system-managed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentDraft {
    pub roll_number: String,
    pub full_name: String,
    pub gender: Gender,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub class_name: String,
    pub section: String,
    pub email: String,
    pub phone: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub address: String,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub status: StudentStatus,
}

impl StudentDraft {
    /// Validates a full payload. Fields are checked in declaration order and
    /// the first violation is reported.
    pub fn validate(payload: &StudentPayload) -> StudentResult<Self> {
        let roll_number = required("rollNumber", &payload.roll_number)?;
        let full_name = required("fullName", &payload.full_name)?;
        let gender = parse_gender(payload.gender.as_deref())?;
        let date_of_birth = match &payload.date_of_birth {
            Some(Some(raw)) => optional_date("dateOfBirth", raw)?,
            Some(None) | None => None,
        };
        let class_name = required("className", &payload.class_name)?;
        let section = match payload.section.as_deref() {
            Some(s) if !s.trim().is_empty() => s.to_string(),
            _ => DEFAULT_SECTION.to_string(),
        };
        let email = required("email", &payload.email)?;
        let phone = required("phone", &payload.phone)?;
        let guardian_name = required("guardianName", &payload.guardian_name)?;
        let guardian_phone = required("guardianPhone", &payload.guardian_phone)?;
        let address = required("address", &payload.address)?;
        let enrollment_date = match payload.enrollment_date.as_deref() {
            Some(raw) => optional_date("enrollmentDate", raw)?,
            None => None,
        };
        let status = parse_status(payload.status.as_deref())?;

        Ok(Self {
            roll_number,
            full_name,
            gender,
            date_of_birth,
            class_name,
            section,
            email,
            phone,
            guardian_name,
            guardian_phone,
            address,
            enrollment_date,
            status,
        })
    }

    /// Builds a brand-new record.
    pub fn into_record(self, id: Uuid, now: DateTime<Utc>) -> StudentRecord {
        StudentRecord {
            id,
            enrollment_date: self.enrollment_date.unwrap_or(now),
            roll_number: self.roll_number,
            full_name: self.full_name,
            gender: self.gender,
            date_of_birth: self.date_of_birth,
            class_name: self.class_name,
            section: self.section,
            email: self.email,
            phone: self.phone,
            guardian_name: self.guardian_name,
            guardian_phone: self.guardian_phone,
            address: self.address,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lays `patch` over `existing` and re-validates the result, keeping the
    /// record's identity. Dates the patch leaves out keep their stored value.
    pub fn merge(
        existing: &StudentRecord,
        patch: &StudentPayload,
        now: DateTime<Utc>,
    ) -> StudentResult<StudentRecord> {
        let draft = Self::validate(&StudentPayload::from(existing).overlay(patch))?;

        let date_of_birth = match patch.date_of_birth {
            Some(_) => draft.date_of_birth,
            None => existing.date_of_birth,
        };
        let enrollment_date = draft.enrollment_date.unwrap_or(existing.enrollment_date);

        Ok(StudentRecord {
            id: existing.id,
            created_at: existing.created_at,
            date_of_birth,
            enrollment_date,
            ..draft.into_record(existing.id, now)
        })
    }
}

fn required(field: &str, value: &Option<String>) -> StudentResult<String> {
    match value.as_deref() {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(StudentError::Validation(ValidationDetails::required(field))),
    }
}

fn parse_gender(value: Option<&str>) -> StudentResult<Gender> {
    match value {
        None => Ok(Gender::default()),
        Some(label) => Gender::parse(label).ok_or_else(|| {
            StudentError::Validation(ValidationDetails::not_in_domain(
                "gender",
                label,
                &Gender::labels(),
            ))
        }),
    }
}

fn parse_status(value: Option<&str>) -> StudentResult<StudentStatus> {
    match value {
        None => Ok(StudentStatus::default()),
        Some(label) => StudentStatus::parse(label).ok_or_else(|| {
            StudentError::Validation(ValidationDetails::not_in_domain(
                "status",
                label,
                &StudentStatus::labels(),
            ))
        }),
    }
}

/// Blank means "no date"; anything else must parse.
fn optional_date(field: &str, raw: &str) -> StudentResult<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_date(raw)
        .map(Some)
        .ok_or_else(|| StudentError::validation(field, format!("`{}` is not a valid date", raw)))
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let date = match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(_) => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
            Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?)
        }
    };
    // Stored dates must render back as four-digit RFC 3339 years
    (0..=9999).contains(&date.year()).then_some(date)
}
