//! Merge augmentation synthesizer.
//!
//! Consumes the mergeable-field set and the target type's existing members
//! and produces the full augmentation descriptor: three provenance fields,
//! their accessors, the two query predicates, and the merge method body.
//! Generation is idempotent per member: anything the target type already
//! declares is reused verbatim instead of being re-declared.

use crate::augment::{
    AugmentationDescriptor, FieldDecl, IS_MERGE_RESULT_METHOD, MERGE_METHOD, MergeSource,
    MethodDecl, MethodReturn, ProvenanceSlot, RelationKind, Stmt, Visibility, WAS_MERGED_METHOD,
};
use crate::descriptor::{MemberSignature, MergeableFieldSet, TypeDescriptor};
use crate::errors::SynthError;
use crate::filter::mergeable_fields;

/// Produce the augmentation descriptor for one entity type.
///
/// Fails fast if a mergeable field is not declared on the type; otherwise
/// total. The mergeable set may be empty, in which case the generated merge
/// only creates and links records without copying data.
pub fn synthesize(
    ty: &TypeDescriptor,
    mergeable: &MergeableFieldSet,
) -> Result<AugmentationDescriptor, SynthError> {
    for field in mergeable {
        if !ty.fields.iter().any(|declared| declared.name == field.name) {
            return Err(SynthError::ForeignMergeableField {
                entity: ty.entity.clone(),
                name: field.name.clone(),
            });
        }
    }

    let mut augmentation = AugmentationDescriptor {
        entity: ty.entity.clone(),
        fields: provenance_fields(&ty.entity),
        methods: Vec::new(),
        reused: Vec::new(),
    };

    let candidates = [
        accessor(ProvenanceSlot::MainReference),
        accessor(ProvenanceSlot::SecondReference),
        accessor(ProvenanceSlot::Result),
        predicate(WAS_MERGED_METHOD, ProvenanceSlot::Result),
        predicate(IS_MERGE_RESULT_METHOD, ProvenanceSlot::MainReference),
        merge_method(ty, mergeable),
    ];

    for candidate in candidates {
        let arity = candidate.arity();
        if ty.declares(&candidate.name, arity) {
            augmentation
                .reused
                .push(MemberSignature::new(candidate.name, arity));
        } else {
            augmentation.methods.push(candidate);
        }
    }

    Ok(augmentation)
}

/// Run the filter and the synthesizer in one call, deriving identity and
/// version field names from the descriptor's role tags. This is the
/// pipeline a host driver runs once per entity type definition.
pub fn augment(ty: &TypeDescriptor) -> Result<AugmentationDescriptor, SynthError> {
    let mergeable = mergeable_fields(
        &ty.fields,
        &ty.identity_field_names(),
        ty.version_field_name(),
    )?;
    synthesize(ty, &mergeable)
}

fn provenance_fields(entity: &str) -> Vec<FieldDecl> {
    let reference = |slot: ProvenanceSlot, relation: RelationKind| FieldDecl {
        name: slot.field_name().to_string(),
        ty: entity.to_string(),
        visibility: Visibility::Private,
        relation,
    };

    vec![
        reference(ProvenanceSlot::MainReference, RelationKind::OneToOne),
        reference(ProvenanceSlot::SecondReference, RelationKind::OneToOne),
        // Two parents share one product.
        reference(ProvenanceSlot::Result, RelationKind::ManyToOne),
    ]
}

fn accessor(slot: ProvenanceSlot) -> MethodDecl {
    MethodDecl {
        name: slot.accessor_name().to_string(),
        params: Vec::new(),
        param_names: Vec::new(),
        returns: MethodReturn::Entity,
        visibility: Visibility::Public,
        body: vec![Stmt::ReturnProvenance { slot }],
    }
}

fn predicate(name: &str, slot: ProvenanceSlot) -> MethodDecl {
    MethodDecl {
        name: name.to_string(),
        params: Vec::new(),
        param_names: Vec::new(),
        returns: MethodReturn::Bool,
        visibility: Visibility::Public,
        body: vec![Stmt::ReturnProvenanceSet { slot }],
    }
}

fn merge_method(ty: &TypeDescriptor, mergeable: &MergeableFieldSet) -> MethodDecl {
    let mut body = vec![
        Stmt::AllocProduct,
        Stmt::BindParent {
            source: MergeSource::Main,
        },
        Stmt::BindParent {
            source: MergeSource::Second,
        },
    ];

    for field in mergeable {
        body.push(Stmt::CopyFirstNonNull {
            field: field.name.clone(),
        });
    }

    body.push(Stmt::PersistProduct);
    body.push(Stmt::SetResultLink {
        source: MergeSource::Main,
    });
    body.push(Stmt::SaveSource {
        source: MergeSource::Main,
    });
    body.push(Stmt::SetResultLink {
        source: MergeSource::Second,
    });
    body.push(Stmt::SaveSource {
        source: MergeSource::Second,
    });
    body.push(Stmt::ReturnProduct);

    MethodDecl {
        name: MERGE_METHOD.to_string(),
        params: vec![ty.entity.clone()],
        param_names: vec!["second".to_string()],
        returns: MethodReturn::Entity,
        visibility: Visibility::Public,
        body,
    }
}
