use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use mergeable_synth::ProvenanceSlot;

/// One entity record at runtime: a string-keyed document of field values
/// plus the three provenance slots recording merge lineage.
///
/// A fresh record starts with no identity and all provenance slots unset.
/// The store assigns the identity on `persist`; the merge executor fills
/// the parent references when the record is created as a merge product and
/// sets the forward `merge_result` link when the record is consumed by a
/// merge call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Entity type name.
    pub entity: String,
    /// Store-assigned identity; `None` until persisted.
    pub id: Option<String>,
    /// Data fields. A missing entry reads as null.
    pub values: Map<String, Value>,
    /// Identity of the first parent; set iff this record is a merge product.
    pub merge_main_reference: Option<String>,
    /// Identity of the second parent; set iff this record is a merge product.
    pub merge_second_reference: Option<String>,
    /// Identity of the merge product this record contributed to; `None`
    /// until the record has been consumed by a merge call.
    pub merge_result: Option<String>,
    /// Stamped by the store on `persist`.
    pub created_at: Option<DateTime<Utc>>,
    /// Stamped by the store on `save`.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Create a fresh, unpersisted record with all fields null.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            id: None,
            values: Map::new(),
            merge_main_reference: None,
            merge_second_reference: None,
            merge_result: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Builder-style field assignment.
    pub fn with_value(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set_value(field, value);
        self
    }

    pub fn set_value(&mut self, field: impl Into<String>, value: Value) {
        self.values.insert(field.into(), value);
    }

    /// Read a field value; missing fields read as null.
    pub fn value(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&Value::Null)
    }

    /// Read a provenance slot.
    pub fn provenance(&self, slot: ProvenanceSlot) -> Option<&str> {
        let slot = match slot {
            ProvenanceSlot::MainReference => &self.merge_main_reference,
            ProvenanceSlot::SecondReference => &self.merge_second_reference,
            ProvenanceSlot::Result => &self.merge_result,
        };
        slot.as_deref()
    }

    /// True iff this record has been consumed into some merge product.
    pub fn was_merged(&self) -> bool {
        self.merge_result.is_some()
    }

    /// True iff this record is itself a merge product. Not the complement
    /// of [`Record::was_merged`]: a fresh leaf record has both false, and
    /// a product that was never re-merged has only this one true.
    pub fn is_merge_result(&self) -> bool {
        self.merge_main_reference.is_some()
    }
}
