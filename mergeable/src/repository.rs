//! Narrow persistence interface used by the merge executor.
//!
//! The executor only needs three operations: `persist` (identity
//! assignment + insert), `save` (update) and `load`. Both mutations are
//! synchronous, atomic per operation, and fail by returning a
//! [`StoreError`] which the executor surfaces unchanged.

use std::collections::HashMap;

use chrono::Utc;
use nanoid::nanoid;

use crate::errors::StoreError;
use crate::record::Record;

/// Record identifiers are lowercase alphanumerics, long enough that the
/// store never needs collision handling.
const RECORD_ID_ALPHABET: &[char] = &[
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
    'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const RECORD_ID_LENGTH: usize = 24;

fn generate_record_id() -> String {
    nanoid!(RECORD_ID_LENGTH, RECORD_ID_ALPHABET)
}

/// Persistence collaborator for merge execution.
pub trait Store {
    /// Assign an identity, stamp the creation time and insert the record.
    /// Returns the assigned identity. Rejects a record that already
    /// carries one.
    fn persist(&mut self, record: &mut Record) -> Result<String, StoreError>;

    /// Update an existing record, stamping the update time.
    fn save(&mut self, record: &mut Record) -> Result<(), StoreError>;

    /// Fetch a record by identity.
    fn load(&self, id: &str) -> Result<Record, StoreError>;
}

/// Hash-map backed store. Suitable for tests and single-process hosts;
/// anything durable implements [`Store`] over its own backend.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: HashMap<String, Record>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Store for InMemoryStore {
    fn persist(&mut self, record: &mut Record) -> Result<String, StoreError> {
        if let Some(id) = &record.id {
            return Err(StoreError::AlreadyPersisted { id: id.clone() });
        }
        let id = generate_record_id();
        record.id = Some(id.clone());
        record.created_at = Some(Utc::now());
        self.records.insert(id.clone(), record.clone());
        Ok(id)
    }

    fn save(&mut self, record: &mut Record) -> Result<(), StoreError> {
        let id = record.id.clone().ok_or(StoreError::Unsaved)?;
        if !self.records.contains_key(&id) {
            return Err(StoreError::NotFound { id });
        }
        record.updated_at = Some(Utc::now());
        self.records.insert(id, record.clone());
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Record, StoreError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }
}
