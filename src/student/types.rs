//! Student record types
//!
//! `StudentRecord` is what the store holds and what clients receive.
//! `StudentPayload` is what clients submit: every field optional, enum
//! fields still raw strings so that out-of-domain values can be rejected
//! with a message naming the field.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::errors::{StudentError, StudentResult};

/// Gender domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Exact, case-sensitive match against the domain labels
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == label)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(Gender::as_str).collect()
    }
}

/// Enrollment status domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StudentStatus {
    #[default]
    Active,
    Graduated,
    #[serde(rename = "On Leave")]
    OnLeave,
}

impl StudentStatus {
    pub const ALL: [StudentStatus; 3] = [
        StudentStatus::Active,
        StudentStatus::Graduated,
        StudentStatus::OnLeave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Graduated => "Graduated",
            StudentStatus::OnLeave => "On Leave",
        }
    }

    /// Exact, case-sensitive match against the domain labels
    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == label)
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(StudentStatus::as_str).collect()
    }
}

/// A stored student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Storage-assigned identifier
    #[serde(rename = "_id")]
    pub id: Uuid,
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
    pub enrollment_date: DateTime<Utc>,
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A client submission.
///
/// Unknown keys (including `_id`, `createdAt` and `updatedAt`) are ignored,
/// which keeps system-managed fields out of client control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub roll_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// `Some(None)` is an explicit `null`, which clears the date on update
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl StudentPayload {
    /// Decodes a JSON request body.
    ///
    /// A body that is not an object, or a field of the wrong JSON type, is a
    /// validation failure rather than a transport error.
    pub fn from_json(body: Value) -> StudentResult<Self> {
        if !body.is_object() {
            return Err(StudentError::validation("$body", "must be a JSON object"));
        }
        serde_json::from_value(body).map_err(|e| StudentError::validation("$body", e.to_string()))
    }

    /// Lays `patch` over `self`: every field present in `patch` wins.
    pub fn overlay(self, patch: &StudentPayload) -> Self {
        Self {
            roll_number: patch.roll_number.clone().or(self.roll_number),
            full_name: patch.full_name.clone().or(self.full_name),
            gender: patch.gender.clone().or(self.gender),
            date_of_birth: patch.date_of_birth.clone().or(self.date_of_birth),
            class_name: patch.class_name.clone().or(self.class_name),
            section: patch.section.clone().or(self.section),
            email: patch.email.clone().or(self.email),
            phone: patch.phone.clone().or(self.phone),
            guardian_name: patch.guardian_name.clone().or(self.guardian_name),
            guardian_phone: patch.guardian_phone.clone().or(self.guardian_phone),
            address: patch.address.clone().or(self.address),
            enrollment_date: patch.enrollment_date.clone().or(self.enrollment_date),
            status: patch.status.clone().or(self.status),
        }
    }
}

/// The text fields of a stored record. Dates are left out and merged as
/// typed values by `StudentDraft::merge`.
impl From<&StudentRecord> for StudentPayload {
    fn from(record: &StudentRecord) -> Self {
        Self {
            roll_number: Some(record.roll_number.clone()),
            full_name: Some(record.full_name.clone()),
            gender: Some(record.gender.as_str().to_string()),
            date_of_birth: None,
            class_name: Some(record.class_name.clone()),
            section: Some(record.section.clone()),
            email: Some(record.email.clone()),
            phone: Some(record.phone.clone()),
            guardian_name: Some(record.guardian_name.clone()),
            guardian_phone: Some(record.guardian_phone.clone()),
            address: Some(record.address.clone()),
            enrollment_date: None,
            status: Some(record.status.as_str().to_string()),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(de::Error::custom("rollNumber must be a string or a number")),
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_labels() {
        assert_eq!(StudentStatus::parse("On Leave"), Some(StudentStatus::OnLeave));
        assert_eq!(StudentStatus::parse("on leave"), None);
        assert_eq!(
            serde_json::to_value(StudentStatus::OnLeave).unwrap(),
            json!("On Leave")
        );
    }

    #[test]
    fn test_gender_default_is_other() {
        assert_eq!(Gender::default(), Gender::Other);
        assert_eq!(Gender::parse("Female"), Some(Gender::Female));
        assert_eq!(Gender::parse("X"), None);
    }

    #[test]
    fn test_payload_accepts_numeric_roll_number() {
        let payload = StudentPayload::from_json(json!({"rollNumber": 42})).unwrap();
        assert_eq!(payload.roll_number.as_deref(), Some("42"));
    }

    #[test]
    fn test_payload_distinguishes_null_from_absent_date() {
        let absent = StudentPayload::from_json(json!({})).unwrap();
        let null = StudentPayload::from_json(json!({"dateOfBirth": null})).unwrap();

        assert_eq!(absent.date_of_birth, None);
        assert_eq!(null.date_of_birth, Some(None));
    }

    #[test]
    fn test_payload_ignores_system_fields() {
        let payload = StudentPayload::from_json(json!({
            "_id": "abc",
            "createdAt": "2020-01-01",
            "fullName": "Ada"
        }))
        .unwrap();
        assert_eq!(payload.full_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_payload_wrong_type_is_validation_failure() {
        let err = StudentPayload::from_json(json!({"fullName": 7})).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_FAILED");

        let err = StudentPayload::from_json(json!([1, 2])).unwrap_err();
        assert_eq!(err.field(), Some("$body"));
    }

    #[test]
    fn test_overlay_prefers_patch_fields() {
        let base = StudentPayload {
            full_name: Some("Ada".into()),
            status: Some("Active".into()),
            date_of_birth: Some(Some("2010-01-01".into())),
            ..Default::default()
        };
        let patch = StudentPayload {
            status: Some("Graduated".into()),
            date_of_birth: Some(None),
            ..Default::default()
        };

        let merged = base.overlay(&patch);
        assert_eq!(merged.full_name.as_deref(), Some("Ada"));
        assert_eq!(merged.status.as_deref(), Some("Graduated"));
        assert_eq!(merged.date_of_birth, Some(None));
    }
}
