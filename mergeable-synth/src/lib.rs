//! Design-time core of the mergeable toolkit.
//!
//! Given the structural description of an entity type, this crate decides
//! which fields participate in merging ([`mergeable_fields`]) and produces
//! the declarations and method bodies that implement merge together with
//! the provenance fields that record merge lineage ([`synthesize`]).
//!
//! Everything here is pure: no I/O, no global state. The host builds a
//! [`TypeDescriptor`] once per entity type definition and materializes the
//! resulting [`AugmentationDescriptor`] however it sees fit; the runtime
//! crate interprets it directly.

pub mod augment;
pub mod descriptor;
pub mod errors;
pub mod filter;
pub mod synthesizer;

pub use augment::{
    ACCESSOR_MAIN_REFERENCE, ACCESSOR_MERGE_RESULT, ACCESSOR_SECOND_REFERENCE,
    AugmentationDescriptor, FieldDecl, IS_MERGE_RESULT_METHOD, MERGE_MAIN_REFERENCE,
    MERGE_METHOD, MERGE_RESULT, MERGE_SECOND_REFERENCE, MergeSource, MethodDecl, MethodReturn,
    ProvenanceSlot, RelationKind, Stmt, Visibility, WAS_MERGED_METHOD,
};
pub use descriptor::{FieldDescriptor, MemberSignature, MergeableFieldSet, SemanticType, TypeDescriptor};
pub use errors::SynthError;
pub use filter::mergeable_fields;
pub use synthesizer::{augment, synthesize};
