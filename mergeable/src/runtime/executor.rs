//! Interpreter for synthesized method bodies.
//!
//! The design-time crate emits method bodies as ordered statement
//! sequences; this executor runs them against records and a store, so the
//! generated members behave as declared without a physical weaving step.

use serde_json::Value;

use mergeable_synth::{AugmentationDescriptor, MERGE_METHOD, MergeSource, MethodDecl, Stmt};

use crate::errors::MergeError;
use crate::record::Record;
use crate::repository::Store;

/// Runs generated merge, accessor and predicate bodies for one entity type.
pub struct MergeExecutor<'a, S: Store> {
    store: &'a mut S,
    augmentation: &'a AugmentationDescriptor,
}

impl<'a, S: Store> MergeExecutor<'a, S> {
    pub fn new(store: &'a mut S, augmentation: &'a AugmentationDescriptor) -> Self {
        Self { store, augmentation }
    }

    /// Merge two persisted records into a third.
    ///
    /// Interprets the generated merge body: allocates the product, binds
    /// both parent references, copies each mergeable field first-non-null
    /// (primary wins), persists the product, then links and saves both
    /// sources in order. A store failure propagates unchanged; saves that
    /// already happened are not rolled back, so a failure on the second
    /// save leaves the main record linked while the second is not.
    pub fn merge(&mut self, main: &mut Record, second: &mut Record) -> Result<Record, MergeError> {
        self.check_entity(main)?;
        self.check_entity(second)?;

        let method = self.generated_method(MERGE_METHOD, 1)?;
        let mut product: Option<Record> = None;

        for stmt in &method.body {
            match stmt {
                Stmt::AllocProduct => {
                    product = Some(Record::new(&self.augmentation.entity));
                }
                Stmt::BindParent { source } => {
                    let parent_id = self.source_identity(*source, main, second)?;
                    let product = product
                        .as_mut()
                        .ok_or_else(|| MergeError::malformed("parent bound before allocation"))?;
                    match source {
                        MergeSource::Main => product.merge_main_reference = Some(parent_id),
                        MergeSource::Second => product.merge_second_reference = Some(parent_id),
                    }
                }
                Stmt::CopyFirstNonNull { field } => {
                    let product = product
                        .as_mut()
                        .ok_or_else(|| MergeError::malformed("field copy before allocation"))?;
                    let value = first_non_null(main.value(field), second.value(field));
                    if !value.is_null() {
                        product.set_value(field.clone(), value);
                    }
                }
                Stmt::PersistProduct => {
                    let product = product
                        .as_mut()
                        .ok_or_else(|| MergeError::malformed("persist before allocation"))?;
                    self.store.persist(product)?;
                }
                Stmt::SetResultLink { source } => {
                    let product_id = product
                        .as_ref()
                        .and_then(|p| p.id.clone())
                        .ok_or_else(|| MergeError::malformed("result link before persist"))?;
                    // An existing link is silently overwritten; re-merging
                    // a consumed record is not guarded against.
                    self.source_mut(*source, main, second).merge_result = Some(product_id);
                }
                Stmt::SaveSource { source } => {
                    let record = self.source_mut(*source, main, second);
                    self.store.save(record)?;
                }
                Stmt::ReturnProduct => {
                    return product
                        .take()
                        .ok_or_else(|| MergeError::malformed("return before allocation"));
                }
                Stmt::ReturnProvenance { .. } | Stmt::ReturnProvenanceSet { .. } => {
                    return Err(MergeError::malformed("accessor statement in merge body"));
                }
            }
        }

        Err(MergeError::malformed("body ended without returning the product"))
    }

    /// Evaluate a generated accessor (`getMergeMainReference`,
    /// `getMergeSecondReference`, `getMergeResult`) against a record,
    /// returning the referenced record identity.
    pub fn evaluate_reference(
        &self,
        name: &str,
        record: &Record,
    ) -> Result<Option<String>, MergeError> {
        self.check_entity(record)?;
        let method = self.generated_method(name, 0)?;
        match method.body.as_slice() {
            [Stmt::ReturnProvenance { slot }] => {
                Ok(record.provenance(*slot).map(str::to_string))
            }
            _ => Err(MergeError::malformed("expected a provenance accessor body")),
        }
    }

    /// Evaluate a generated predicate (`wasMerged`, `isMergeResult`)
    /// against a record.
    pub fn evaluate_predicate(&self, name: &str, record: &Record) -> Result<bool, MergeError> {
        self.check_entity(record)?;
        let method = self.generated_method(name, 0)?;
        match method.body.as_slice() {
            [Stmt::ReturnProvenanceSet { slot }] => Ok(record.provenance(*slot).is_some()),
            _ => Err(MergeError::malformed("expected a provenance predicate body")),
        }
    }

    fn generated_method(&self, name: &str, arity: usize) -> Result<&'a MethodDecl, MergeError> {
        if let Some(method) = self.augmentation.method(name) {
            return Ok(method);
        }
        if self.augmentation.is_reused(name, arity) {
            return Err(MergeError::ReusedMember {
                entity: self.augmentation.entity.clone(),
                name: name.to_string(),
            });
        }
        Err(MergeError::UnknownMethod {
            entity: self.augmentation.entity.clone(),
            name: name.to_string(),
        })
    }

    fn check_entity(&self, record: &Record) -> Result<(), MergeError> {
        if record.entity == self.augmentation.entity {
            Ok(())
        } else {
            Err(MergeError::EntityMismatch {
                expected: self.augmentation.entity.clone(),
                actual: record.entity.clone(),
            })
        }
    }

    fn source_identity(
        &self,
        source: MergeSource,
        main: &Record,
        second: &Record,
    ) -> Result<String, MergeError> {
        let record = match source {
            MergeSource::Main => main,
            MergeSource::Second => second,
        };
        record.id.clone().ok_or_else(|| MergeError::UnsavedSource {
            entity: record.entity.clone(),
        })
    }

    fn source_mut<'r>(
        &self,
        source: MergeSource,
        main: &'r mut Record,
        second: &'r mut Record,
    ) -> &'r mut Record {
        match source {
            MergeSource::Main => main,
            MergeSource::Second => second,
        }
    }
}

/// Per-field, primary-wins policy: when both sides are non-null the second
/// value is simply discarded.
fn first_non_null(main: &Value, second: &Value) -> Value {
    if !main.is_null() {
        main.clone()
    } else if !second.is_null() {
        second.clone()
    } else {
        Value::Null
    }
}
