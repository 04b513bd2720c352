//! Payload normalization
//!
//! Canonicalizes text fields before validation: trims the free-text and key
//! fields, upper-cases `rollNumber` and `section`, lower-cases `email`.
//! Absent fields stay absent and nothing is rejected here.

use super::types::StudentPayload;

/// Returns the canonical form of `payload`.
///
/// Idempotent: `normalize(&normalize(p)) == normalize(p)`.
pub fn normalize(payload: &StudentPayload) -> StudentPayload {
    StudentPayload {
        roll_number: map_text(&payload.roll_number, |s| s.trim().to_uppercase()),
        full_name: map_text(&payload.full_name, trim),
        class_name: map_text(&payload.class_name, trim),
        section: map_text(&payload.section, |s| s.trim().to_uppercase()),
        guardian_name: map_text(&payload.guardian_name, trim),
        address: map_text(&payload.address, trim),
        email: map_text(&payload.email, |s| s.trim().to_lowercase()),
        ..payload.clone()
    }
}

fn trim(s: &str) -> String {
    s.trim().to_string()
}

fn map_text(field: &Option<String>, f: impl Fn(&str) -> String) -> Option<String> {
    field.as_deref().map(f)
}
