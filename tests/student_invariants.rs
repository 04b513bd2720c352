//! Student Record Invariant Tests
//!
//! - Normalization is idempotent
//! - Roll number and email stay unique under concurrent writers
//! - Listings are ordered by roll number
//! - Summary buckets always sum to the total

use std::sync::Arc;
use std::thread;

use rosterdb::observability::MetricsRegistry;
use rosterdb::store::{DocumentStore, RecordStore};
use rosterdb::student::{
    normalize, StudentError, StudentPayload, StudentQuery, StudentService, StudentStatus,
};

// =============================================================================
// Test Utilities
// =============================================================================

fn payload(roll: &str, email: &str, class_name: &str) -> StudentPayload {
    StudentPayload {
        roll_number: Some(roll.into()),
        full_name: Some(format!("Student {}", roll.trim())),
        class_name: Some(class_name.into()),
        email: Some(email.into()),
        phone: Some("555-0100".into()),
        guardian_name: Some("Guardian".into()),
        guardian_phone: Some("555-0101".into()),
        address: Some("12 High Street".into()),
        ..Default::default()
    }
}

fn service() -> StudentService {
    StudentService::new(
        Arc::new(DocumentStore::in_memory()),
        Arc::new(MetricsRegistry::new()),
    )
}

fn query(search: Option<&str>, class_name: Option<&str>, status: Option<&str>) -> StudentQuery {
    StudentQuery {
        search: search.map(String::from),
        class_name: class_name.map(String::from),
        status: status.map(String::from),
    }
}

// =============================================================================
// Normalization
// =============================================================================

#[test]
fn test_normalize_is_idempotent() {
    let raw = StudentPayload {
        section: Some(" b ".into()),
        status: Some("Graduated".into()),
        ..payload("  r-07 ", "  Mixed.Case@Example.ORG ", " 10 ")
    };

    let once = normalize(&raw);
    let twice = normalize(&once);

    assert_eq!(once, twice);
    assert_eq!(once.roll_number.as_deref(), Some("R-07"));
    assert_eq!(once.email.as_deref(), Some("mixed.case@example.org"));
    assert_eq!(once.section.as_deref(), Some("B"));
}

// =============================================================================
// Uniqueness
// =============================================================================

#[test]
fn test_concurrent_duplicate_create_admits_exactly_one() {
    let store = Arc::new(DocumentStore::in_memory());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let raw = payload("R01", &format!("student{}@x.com", i), "10");
                store.create(&normalize(&raw))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();

    assert_eq!(successes, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        match result {
            Err(StudentError::DuplicateKey { field }) => assert_eq!(*field, "rollNumber"),
            other => panic!("expected duplicate key, got {:?}", other),
        }
    }
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_email_uniqueness_ignores_case() {
    let service = service();
    service.create_student(&payload("R01", "ada@x.com", "10")).unwrap();

    let err = service
        .create_student(&payload("R02", "ADA@X.COM", "10"))
        .unwrap_err();
    assert_eq!(err.field(), Some("email"));
    assert_eq!(err.status_code(), 409);
}

#[test]
fn test_update_cannot_steal_another_roll_number() {
    let service = service();
    service.create_student(&payload("R01", "a@x.com", "10")).unwrap();
    let second = service.create_student(&payload("R02", "b@x.com", "10")).unwrap();

    let patch = StudentPayload {
        roll_number: Some("r01".into()),
        ..Default::default()
    };
    let err = service
        .update_student(&second.id.to_string(), &patch)
        .unwrap_err();

    assert_eq!(err.field(), Some("rollNumber"));
    assert_eq!(
        service.get_student(&second.id.to_string()).unwrap().roll_number,
        "R02"
    );
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn test_list_sorted_by_roll_number() {
    let service = service();
    for (roll, email) in [("R03", "c@x.com"), ("R01", "a@x.com"), ("R02", "b@x.com")] {
        service.create_student(&payload(roll, email, "10")).unwrap();
    }

    let rolls: Vec<String> = service
        .list_students(&StudentQuery::default())
        .unwrap()
        .into_iter()
        .map(|r| r.roll_number)
        .collect();
    assert_eq!(rolls, vec!["R01", "R02", "R03"]);
}

#[test]
fn test_status_and_class_filters() {
    let service = service();
    service.create_student(&payload("R01", "a@x.com", "10")).unwrap();
    service
        .create_student(&StudentPayload {
            status: Some("Graduated".into()),
            ..payload("R02", "b@x.com", "10")
        })
        .unwrap();
    service
        .create_student(&StudentPayload {
            status: Some("Graduated".into()),
            ..payload("R03", "c@x.com", "11")
        })
        .unwrap();

    let graduated = service
        .list_students(&query(None, None, Some("Graduated")))
        .unwrap();
    assert_eq!(graduated.len(), 2);
    assert!(graduated.iter().all(|r| r.status == StudentStatus::Graduated));

    let narrowed = service
        .list_students(&query(None, Some("10"), Some("Graduated")))
        .unwrap();
    assert_eq!(narrowed.len(), 1);
    assert_eq!(narrowed[0].roll_number, "R02");

    let nothing = service
        .list_students(&query(None, None, Some("Expelled")))
        .unwrap();
    assert!(nothing.is_empty());
}

#[test]
fn test_search_treats_metacharacters_literally() {
    let service = service();
    service
        .create_student(&StudentPayload {
            full_name: Some("O'Brien (Jr.)".into()),
            ..payload("R01", "a@x.com", "10")
        })
        .unwrap();
    service
        .create_student(&StudentPayload {
            full_name: Some("Jrx".into()),
            ..payload("R02", "b@x.com", "10")
        })
        .unwrap();

    let found = service
        .list_students(&query(Some("(jr."), None, None))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].roll_number, "R01");
}

// =============================================================================
// Summary
// =============================================================================

#[test]
fn test_summary_counts_sum_to_total() {
    let service = service();
    let statuses = ["Active", "Inactive", "Graduated", "On Leave", "Active"];
    for (i, status) in statuses.iter().enumerate() {
        service
            .create_student(&StudentPayload {
                status: Some(status.to_string()),
                ..payload(
                    &format!("R{:02}", i),
                    &format!("s{}@x.com", i),
                    if i % 2 == 0 { "10" } else { "11" },
                )
            })
            .unwrap();
    }

    let summary = service.get_summary().unwrap();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.status.total(), summary.total);
    assert_eq!(summary.classes.total(), summary.total);
    assert_eq!(summary.status.get("Active"), Some(2));
    assert_eq!(summary.classes.get("10"), Some(3));
}

#[test]
fn test_summary_tracks_deletes() {
    let service = service();
    let first = service.create_student(&payload("R01", "a@x.com", "10")).unwrap();
    service.create_student(&payload("R02", "b@x.com", "10")).unwrap();

    service.delete_student(&first.id.to_string()).unwrap();

    let summary = service.get_summary().unwrap();
    assert_eq!(summary.total, 1);
    assert_eq!(summary.classes.get("10"), Some(1));
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_create_update_delete_lifecycle() {
    let service = service();
    let created = service.create_student(&payload("R01", "a@x.com", "10")).unwrap();
    let id = created.id.to_string();

    assert_eq!(created.status, StudentStatus::Active);
    assert_eq!(created.section, "A");

    let updated = service
        .update_student(
            &id,
            &StudentPayload {
                status: Some("Inactive".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.status, StudentStatus::Inactive);
    assert!(updated.updated_at >= created.updated_at);

    service.delete_student(&id).unwrap();
    assert!(matches!(
        service.get_student(&id),
        Err(StudentError::NotFound)
    ));
    assert!(matches!(
        service.delete_student(&id),
        Err(StudentError::NotFound)
    ));
}

#[test]
fn test_invalid_status_rejected_on_create() {
    let service = service();
    let err = service
        .create_student(&StudentPayload {
            status: Some("Expelled".into()),
            ..payload("R01", "a@x.com", "10")
        })
        .unwrap_err();

    assert_eq!(err.field(), Some("status"));
    assert_eq!(err.status_code(), 400);
    assert_eq!(service.store().count().unwrap(), 0);
}

#[test]
fn test_status_patch_keeps_edge_of_range_birth_date() {
    let service = service();
    let created = service
        .create_student(&StudentPayload {
            date_of_birth: Some(Some("9999-12-31".into())),
            ..payload("R01", "a@x.com", "10")
        })
        .unwrap();

    let updated = service
        .update_student(
            &created.id.to_string(),
            &StudentPayload {
                status: Some("Graduated".into()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.status, StudentStatus::Graduated);
    assert_eq!(updated.date_of_birth, created.date_of_birth);
}

#[test]
fn test_birth_dates_beyond_four_digit_years_rejected() {
    let service = service();
    for (i, raw) in ["-0001-01-01", "+12345-01-01"].iter().enumerate() {
        let err = service
            .create_student(&StudentPayload {
                date_of_birth: Some(Some(raw.to_string())),
                ..payload(&format!("R{:02}", i), &format!("s{}@x.com", i), "10")
            })
            .unwrap_err();
        assert_eq!(err.field(), Some("dateOfBirth"));
    }
    assert_eq!(service.store().count().unwrap(), 0);
}
