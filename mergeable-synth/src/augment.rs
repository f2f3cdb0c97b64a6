//! Augmentation IR: the abstract declarations and method bodies the
//! synthesizer emits for one entity type.
//!
//! Bodies are ordered statement sequences, serializable so an external
//! weaving step can consume them as plain data. The runtime crate
//! interprets them directly against records and a store.

use serde::{Deserialize, Serialize};

use crate::descriptor::MemberSignature;

/// Name of the field referencing the first ("this") parent of a merge product.
pub const MERGE_MAIN_REFERENCE: &str = "mergeMainReference";
/// Name of the field referencing the second parent of a merge product.
pub const MERGE_SECOND_REFERENCE: &str = "mergeSecondReference";
/// Name of the forward link from a consumed record to its merge product.
pub const MERGE_RESULT: &str = "mergeResult";

pub const ACCESSOR_MAIN_REFERENCE: &str = "getMergeMainReference";
pub const ACCESSOR_SECOND_REFERENCE: &str = "getMergeSecondReference";
pub const ACCESSOR_MERGE_RESULT: &str = "getMergeResult";
pub const WAS_MERGED_METHOD: &str = "wasMerged";
pub const IS_MERGE_RESULT_METHOD: &str = "isMergeResult";
pub const MERGE_METHOD: &str = "merge";

/// The three provenance fields every augmented entity acquires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvenanceSlot {
    MainReference,
    SecondReference,
    Result,
}

impl ProvenanceSlot {
    /// Field name of the slot on the augmented type.
    pub const fn field_name(self) -> &'static str {
        match self {
            ProvenanceSlot::MainReference => MERGE_MAIN_REFERENCE,
            ProvenanceSlot::SecondReference => MERGE_SECOND_REFERENCE,
            ProvenanceSlot::Result => MERGE_RESULT,
        }
    }

    /// Name of the generated accessor for the slot.
    pub const fn accessor_name(self) -> &'static str {
        match self {
            ProvenanceSlot::MainReference => ACCESSOR_MAIN_REFERENCE,
            ProvenanceSlot::SecondReference => ACCESSOR_SECOND_REFERENCE,
            ProvenanceSlot::Result => ACCESSOR_MERGE_RESULT,
        }
    }
}

/// Which source record a merge-body statement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeSource {
    /// The receiver of the merge call.
    Main,
    /// The second argument.
    Second,
}

/// Visibility of a generated declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Private,
    Public,
}

/// Relation kind of a generated provenance field. Parent references are
/// one-to-one; the forward result link is many-to-one (two parents share
/// one product).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    OneToOne,
    ManyToOne,
}

/// Return type of a generated method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodReturn {
    /// A (nullable) reference to the entity type itself.
    Entity,
    Bool,
}

/// One statement of a generated method body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stmt {
    /// Allocate a fresh record of the entity type as the merge product.
    AllocProduct,
    /// Set the product's parent reference to the given source. Parent
    /// references are assigned at creation and never change again.
    BindParent { source: MergeSource },
    /// Per-field first-non-null copy: take the main record's value when
    /// non-null, else the second record's when non-null, else leave the
    /// product's field at its default.
    CopyFirstNonNull { field: String },
    /// Persist the product (identity assignment, insert).
    PersistProduct,
    /// Point the source's forward result link at the product. A source
    /// already carrying a link is silently overwritten.
    SetResultLink { source: MergeSource },
    /// Save the source record.
    SaveSource { source: MergeSource },
    /// Return the product.
    ReturnProduct,
    /// Return the value of a provenance slot of the receiver.
    ReturnProvenance { slot: ProvenanceSlot },
    /// Return whether a provenance slot of the receiver is non-null.
    ReturnProvenanceSet { slot: ProvenanceSlot },
}

/// A generated provenance field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    /// Field type: a reference to the entity type itself.
    pub ty: String,
    pub visibility: Visibility,
    pub relation: RelationKind,
}

/// A generated method declaration with its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    /// Parameter type names; empty for accessors, the entity type for merge.
    pub params: Vec<String>,
    pub param_names: Vec<String>,
    pub returns: MethodReturn,
    pub visibility: Visibility,
    pub body: Vec<Stmt>,
}

impl MethodDecl {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// The synthesizer's output for one entity type: field declarations,
/// generated methods, and the signatures of candidate members that were
/// reused from the target type instead of generated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AugmentationDescriptor {
    pub entity: String,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    /// Candidate members the target type already declared by hand. These
    /// are reused verbatim; no declaration is emitted for them.
    pub reused: Vec<MemberSignature>,
}

impl AugmentationDescriptor {
    /// Look up a generated method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|method| method.name == name)
    }

    /// The generated merge method, if one was emitted.
    pub fn merge_method(&self) -> Option<&MethodDecl> {
        self.method(MERGE_METHOD)
    }

    /// Whether a candidate member was satisfied by a hand-written
    /// declaration on the target type.
    pub fn is_reused(&self, name: &str, arity: usize) -> bool {
        self.reused
            .iter()
            .any(|member| member.name == name && member.arity == arity)
    }
}
