//! Document store backed by the append-only collection log
//!
//! All state lives in memory behind one `RwLock`. Writes hold the write lock
//! across the uniqueness check, the log append and the in-memory mutation,
//! so concurrent writers with the same key serialize and exactly one wins.
//!
//! A mutation reaches memory only after its log record is fsynced. A failed
//! append leaves the store unchanged.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use super::RecordStore;
use crate::storage::{LogWriter, StorageError, StorageResult};
use crate::student::{
    StudentDraft, StudentError, StudentFilter, StudentPayload, StudentRecord, StudentResult,
};

/// Log file name (without extension) for the student collection
pub const STUDENTS_COLLECTION: &str = "students";

pub struct DocumentStore {
    inner: RwLock<Collection>,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore").finish_non_exhaustive()
    }
}

#[derive(Default)]
struct Collection {
    records: HashMap<Uuid, StudentRecord>,
    /// Upper-cased roll number -> id
    roll_numbers: HashMap<String, Uuid>,
    /// Lower-cased email -> id
    emails: HashMap<String, Uuid>,
    log: Option<LogWriter>,
    closed: bool,
}

impl DocumentStore {
    /// A store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Collection::default()),
        }
    }

    /// Opens `<data_dir>/data/students.dat`, replaying it into memory.
    ///
    /// Any checksum failure, undecodable document or duplicate key in the
    /// log aborts the open.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let (writer, live) = LogWriter::open_and_replay(data_dir, STUDENTS_COLLECTION)?;

        let mut collection = Collection {
            log: Some(writer),
            ..Collection::default()
        };

        for (document_id, body) in live {
            let record: StudentRecord = serde_json::from_slice(&body).map_err(|e| {
                StorageError::corruption_for_document(&document_id, e.to_string())
            })?;
            if record.id.to_string() != document_id {
                return Err(StorageError::corruption_for_document(
                    &document_id,
                    format!("body carries id {}", record.id),
                ));
            }
            if let Some(field) = collection.conflicting_key(&record, None) {
                return Err(StorageError::corruption_for_document(
                    &document_id,
                    format!("duplicate {}", field),
                ));
            }
            collection.index(&record);
            collection.records.insert(record.id, record);
        }

        Ok(Self {
            inner: RwLock::new(collection),
        })
    }

    fn read(&self) -> StudentResult<RwLockReadGuard<'_, Collection>> {
        self.inner
            .read()
            .map_err(|_| StudentError::store_fault("store lock poisoned"))
    }

    fn write(&self) -> StudentResult<RwLockWriteGuard<'_, Collection>> {
        let guard = self
            .inner
            .write()
            .map_err(|_| StudentError::store_fault("store lock poisoned"))?;
        if guard.closed {
            return Err(StudentError::store_fault("store is closed"));
        }
        Ok(guard)
    }
}

impl Collection {
    /// First unique field of `record` already held by another record.
    fn conflicting_key(&self, record: &StudentRecord, exclude: Option<Uuid>) -> Option<&'static str> {
        let taken = |index: &HashMap<String, Uuid>, key: String| {
            index
                .get(&key)
                .map_or(false, |owner| Some(*owner) != exclude)
        };

        if taken(&self.roll_numbers, roll_key(&record.roll_number)) {
            Some("rollNumber")
        } else if taken(&self.emails, email_key(&record.email)) {
            Some("email")
        } else {
            None
        }
    }

    fn index(&mut self, record: &StudentRecord) {
        self.roll_numbers
            .insert(roll_key(&record.roll_number), record.id);
        self.emails.insert(email_key(&record.email), record.id);
    }

    fn unindex(&mut self, record: &StudentRecord) {
        self.roll_numbers.remove(&roll_key(&record.roll_number));
        self.emails.remove(&email_key(&record.email));
    }

    fn persist(&mut self, record: &StudentRecord) -> StudentResult<()> {
        if let Some(log) = self.log.as_mut() {
            let body = serde_json::to_vec(record)
                .map_err(|e| StudentError::store_fault(format!("encode failed: {}", e)))?;
            log.put(&record.id.to_string(), body)?;
        }
        Ok(())
    }

    fn persist_delete(&mut self, id: Uuid) -> StudentResult<()> {
        if let Some(log) = self.log.as_mut() {
            log.delete(&id.to_string())?;
        }
        Ok(())
    }
}

impl RecordStore for DocumentStore {
    fn create(&self, payload: &StudentPayload) -> StudentResult<StudentRecord> {
        let draft = StudentDraft::validate(payload)?;

        let mut collection = self.write()?;
        let record = draft.into_record(Uuid::new_v4(), Utc::now());

        if let Some(field) = collection.conflicting_key(&record, None) {
            return Err(StudentError::DuplicateKey { field });
        }

        collection.persist(&record)?;
        collection.index(&record);
        collection.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn get(&self, id: &str) -> StudentResult<StudentRecord> {
        let id = parse_id(id)?;
        self.read()?
            .records
            .get(&id)
            .cloned()
            .ok_or(StudentError::NotFound)
    }

    fn list(&self, filter: &StudentFilter) -> StudentResult<Vec<StudentRecord>> {
        let collection = self.read()?;
        let mut matching: Vec<StudentRecord> = collection
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.roll_number
                .cmp(&b.roll_number)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matching)
    }

    fn update(&self, id: &str, payload: &StudentPayload) -> StudentResult<StudentRecord> {
        let id = parse_id(id)?;

        let mut collection = self.write()?;
        let existing = collection
            .records
            .get(&id)
            .cloned()
            .ok_or(StudentError::NotFound)?;

        let updated = StudentDraft::merge(&existing, payload, Utc::now())?;

        if let Some(field) = collection.conflicting_key(&updated, Some(id)) {
            return Err(StudentError::DuplicateKey { field });
        }

        collection.persist(&updated)?;
        collection.unindex(&existing);
        collection.index(&updated);
        collection.records.insert(id, updated.clone());
        Ok(updated)
    }

    fn delete(&self, id: &str) -> StudentResult<()> {
        let id = parse_id(id)?;

        let mut collection = self.write()?;
        if !collection.records.contains_key(&id) {
            return Err(StudentError::NotFound);
        }

        collection.persist_delete(id)?;
        if let Some(removed) = collection.records.remove(&id) {
            collection.unindex(&removed);
        }
        Ok(())
    }

    fn count(&self) -> StudentResult<u64> {
        Ok(self.read()?.records.len() as u64)
    }

    fn close(&self) -> StudentResult<()> {
        let mut collection = self
            .inner
            .write()
            .map_err(|_| StudentError::store_fault("store lock poisoned"))?;
        if let Some(mut log) = collection.log.take() {
            log.sync()?;
        }
        collection.closed = true;
        Ok(())
    }
}

fn parse_id(id: &str) -> StudentResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| StudentError::NotFound)
}

fn roll_key(roll_number: &str) -> String {
    roll_number.trim().to_uppercase()
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::StudentStatus;
    use tempfile::TempDir;

    fn payload(roll: &str, email: &str) -> StudentPayload {
        StudentPayload {
            roll_number: Some(roll.into()),
            full_name: Some("Ada Lovelace".into()),
            class_name: Some("10".into()),
            email: Some(email.into()),
            phone: Some("555-0100".into()),
            guardian_name: Some("Lord Byron".into()),
            guardian_phone: Some("555-0101".into()),
            address: Some("12 St James's Square".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_then_get() {
        let store = DocumentStore::in_memory();
        let created = store.create(&payload("R01", "a@x.com")).unwrap();

        let fetched = store.get(&created.id.to_string()).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_roll_number_rejected() {
        let store = DocumentStore::in_memory();
        store.create(&payload("R01", "a@x.com")).unwrap();

        let err = store.create(&payload("R01", "b@x.com")).unwrap_err();
        assert_eq!(err.field(), Some("rollNumber"));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = DocumentStore::in_memory();
        store.create(&payload("R01", "a@x.com")).unwrap();

        let err = store.create(&payload("R02", "a@x.com")).unwrap_err();
        assert!(matches!(err, StudentError::DuplicateKey { field: "email" }));
    }

    #[test]
    fn test_malformed_id_is_not_found() {
        let store = DocumentStore::in_memory();
        assert!(matches!(store.get("not-a-uuid"), Err(StudentError::NotFound)));
        assert!(matches!(store.delete("42"), Err(StudentError::NotFound)));
    }

    #[test]
    fn test_list_sorted_by_roll_number() {
        let store = DocumentStore::in_memory();
        store.create(&payload("R03", "c@x.com")).unwrap();
        store.create(&payload("R01", "a@x.com")).unwrap();
        store.create(&payload("R02", "b@x.com")).unwrap();

        let rolls: Vec<String> = store
            .list(&StudentFilter::all())
            .unwrap()
            .into_iter()
            .map(|r| r.roll_number)
            .collect();
        assert_eq!(rolls, vec!["R01", "R02", "R03"]);
    }

    #[test]
    fn test_update_merges_and_revalidates() {
        let store = DocumentStore::in_memory();
        let created = store.create(&payload("R01", "a@x.com")).unwrap();
        let id = created.id.to_string();

        let patch = StudentPayload {
            status: Some("Graduated".into()),
            ..Default::default()
        };
        let updated = store.update(&id, &patch).unwrap();
        assert_eq!(updated.status, StudentStatus::Graduated);
        assert_eq!(updated.full_name, created.full_name);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.enrollment_date, created.enrollment_date);

        let bad = StudentPayload {
            status: Some("Expelled".into()),
            ..Default::default()
        };
        let err = store.update(&id, &bad).unwrap_err();
        assert_eq!(err.field(), Some("status"));
        assert_eq!(store.get(&id).unwrap().status, StudentStatus::Graduated);
    }

    #[test]
    fn test_update_may_keep_own_keys() {
        let store = DocumentStore::in_memory();
        let created = store.create(&payload("R01", "a@x.com")).unwrap();

        let updated = store
            .update(&created.id.to_string(), &payload("R01", "a@x.com"))
            .unwrap();
        assert_eq!(updated.roll_number, "R01");
    }

    #[test]
    fn test_update_releases_old_keys() {
        let store = DocumentStore::in_memory();
        let created = store.create(&payload("R01", "a@x.com")).unwrap();

        let patch = StudentPayload {
            roll_number: Some("R09".into()),
            ..Default::default()
        };
        store.update(&created.id.to_string(), &patch).unwrap();

        assert!(store.create(&payload("R01", "b@x.com")).is_ok());
    }

    #[test]
    fn test_update_into_taken_key_rejected() {
        let store = DocumentStore::in_memory();
        store.create(&payload("R01", "a@x.com")).unwrap();
        let second = store.create(&payload("R02", "b@x.com")).unwrap();

        let patch = StudentPayload {
            email: Some("a@x.com".into()),
            ..Default::default()
        };
        let err = store.update(&second.id.to_string(), &patch).unwrap_err();
        assert_eq!(err.field(), Some("email"));
    }

    #[test]
    fn test_delete_then_get_is_not_found() {
        let store = DocumentStore::in_memory();
        let created = store.create(&payload("R01", "a@x.com")).unwrap();
        let id = created.id.to_string();

        store.delete(&id).unwrap();
        assert!(matches!(store.get(&id), Err(StudentError::NotFound)));
        assert!(matches!(store.delete(&id), Err(StudentError::NotFound)));
        assert!(store.create(&payload("R01", "a@x.com")).is_ok());
    }

    #[test]
    fn test_reopen_restores_records_and_indexes() {
        let temp_dir = TempDir::new().unwrap();
        let (kept, removed) = {
            let store = DocumentStore::open(temp_dir.path()).unwrap();
            let kept = store.create(&payload("R01", "a@x.com")).unwrap();
            let removed = store.create(&payload("R02", "b@x.com")).unwrap();
            store.delete(&removed.id.to_string()).unwrap();
            store.close().unwrap();
            (kept, removed)
        };

        let store = DocumentStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get(&kept.id.to_string()).unwrap(), kept);
        assert!(store.get(&removed.id.to_string()).is_err());
        assert!(matches!(
            store.create(&payload("R01", "z@x.com")),
            Err(StudentError::DuplicateKey { field: "rollNumber" })
        ));
    }

    #[test]
    fn test_closed_store_rejects_writes() {
        let store = DocumentStore::in_memory();
        store.close().unwrap();

        let err = store.create(&payload("R01", "a@x.com")).unwrap_err();
        assert_eq!(err.code(), "STORE_FAULT");
    }
}
