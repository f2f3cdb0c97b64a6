//! Mergeable runtime library.
//!
//! Executes the merge semantics synthesized by `mergeable-synth`: dynamic
//! records with provenance tracking, a narrow persistence interface
//! (`persist`/`save`/`load`), and an executor that interprets generated
//! method bodies against records and a store.
//!
//! A host registers one augmentation per entity type (see [`registry`]),
//! then merges two persisted records through [`MergeExecutor`]. The
//! product's parent references are fixed at creation; each source's
//! forward `mergeResult` link is updated (a second merge of the same
//! source silently overwrites it).

pub mod errors;
pub mod record;
pub mod registry;
pub mod repository;
pub mod runtime;

pub use errors::*;
pub use record::Record;
pub use registry::{augment_and_register, get_augmentation, register_augmentation};
pub use repository::{InMemoryStore, Store};
pub use runtime::MergeExecutor;

// Re-export the design-time surface so hosts depend on one crate.
pub use mergeable_synth::{
    AugmentationDescriptor, FieldDescriptor, MemberSignature, MergeableFieldSet, MethodDecl,
    ProvenanceSlot, SemanticType, Stmt, SynthError, TypeDescriptor, augment, mergeable_fields,
    synthesize,
};
