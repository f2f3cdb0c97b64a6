//! Field eligibility filter.
//!
//! Pure function from a type's field descriptors plus identity/version
//! field names to the ordered subset of fields that participate in value
//! copying during merge.

use crate::augment::{MERGE_MAIN_REFERENCE, MERGE_RESULT, MERGE_SECOND_REFERENCE};
use crate::descriptor::{FieldDescriptor, MergeableFieldSet};
use crate::errors::SynthError;

/// Compute the mergeable-field set for one entity type.
///
/// Evaluated per field in declaration order (order is preserved in the
/// output): static, transient, collection-typed and array-typed fields are
/// skipped, as are identity fields, the version field, and the provenance
/// fields by name. Everything else is included. An empty result is valid.
///
/// Fails fast on inconsistent input: duplicate field names, or an
/// identity/version name that is not present in the field list.
pub fn mergeable_fields(
    all_fields: &[FieldDescriptor],
    identity_field_names: &[String],
    version_field_name: Option<&str>,
) -> Result<MergeableFieldSet, SynthError> {
    validate(all_fields, identity_field_names, version_field_name)?;

    let fields = all_fields
        .iter()
        .filter(|field| {
            !(field.is_static
                || field.is_transient
                || field.ty.is_collection()
                || field.ty.is_array()
                || identity_field_names.iter().any(|name| *name == field.name)
                || version_field_name == Some(field.name.as_str())
                || is_provenance_name(&field.name))
        })
        .cloned()
        .collect();

    Ok(MergeableFieldSet::new(fields))
}

/// Provenance fields never participate in value copying. `mergeResult` is
/// excluded alongside the two parent references so that reprocessing a type
/// whose provenance fields show up as ordinary declared fields cannot copy
/// lineage into a new product.
fn is_provenance_name(name: &str) -> bool {
    name == MERGE_MAIN_REFERENCE || name == MERGE_SECOND_REFERENCE || name == MERGE_RESULT
}

fn validate(
    all_fields: &[FieldDescriptor],
    identity_field_names: &[String],
    version_field_name: Option<&str>,
) -> Result<(), SynthError> {
    for (index, field) in all_fields.iter().enumerate() {
        if all_fields[..index].iter().any(|prior| prior.name == field.name) {
            return Err(SynthError::DuplicateField {
                name: field.name.clone(),
            });
        }
    }

    for name in identity_field_names {
        if !all_fields.iter().any(|field| field.name == *name) {
            return Err(SynthError::UnknownIdentityField { name: name.clone() });
        }
    }

    if let Some(name) = version_field_name {
        if !all_fields.iter().any(|field| field.name == name) {
            return Err(SynthError::UnknownVersionField {
                name: name.to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::SemanticType;

    fn scalar(name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, SemanticType::Scalar("String".into()))
    }

    #[test]
    fn excludes_modifiers_types_and_roles() {
        let fields = vec![
            scalar("id").identity(),
            scalar("version").version(),
            scalar("author"),
            scalar("content"),
            scalar("counter").statically_declared(),
            scalar("cache").transient(),
            FieldDescriptor::new(
                "retweets",
                SemanticType::Collection(Box::new(SemanticType::EntityRef("Tweet".into()))),
            ),
            FieldDescriptor::new(
                "tags",
                SemanticType::Array(Box::new(SemanticType::Scalar("String".into()))),
            ),
        ];

        let set = mergeable_fields(&fields, &["id".into()], Some("version")).unwrap();
        assert_eq!(set.names(), vec!["author", "content"]);
    }

    #[test]
    fn excludes_provenance_fields_by_name() {
        let fields = vec![
            scalar("author"),
            FieldDescriptor::new("mergeMainReference", SemanticType::EntityRef("Tweet".into())),
            FieldDescriptor::new("mergeSecondReference", SemanticType::EntityRef("Tweet".into())),
            FieldDescriptor::new("mergeResult", SemanticType::EntityRef("Tweet".into())),
        ];

        let set = mergeable_fields(&fields, &[], None).unwrap();
        assert_eq!(set.names(), vec!["author"]);
    }

    #[test]
    fn empty_result_is_valid() {
        let fields = vec![scalar("id").identity()];
        let set = mergeable_fields(&fields, &["id".into()], None).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn preserves_declaration_order() {
        let fields = vec![scalar("c"), scalar("a"), scalar("b")];
        let set = mergeable_fields(&fields, &[], None).unwrap();
        assert_eq!(set.names(), vec!["c", "a", "b"]);
    }

    #[test]
    fn rejects_unknown_identity_field() {
        let fields = vec![scalar("author")];
        let err = mergeable_fields(&fields, &["id".into()], None).unwrap_err();
        assert_eq!(err, SynthError::UnknownIdentityField { name: "id".into() });
    }

    #[test]
    fn rejects_unknown_version_field() {
        let fields = vec![scalar("author")];
        let err = mergeable_fields(&fields, &[], Some("version")).unwrap_err();
        assert_eq!(
            err,
            SynthError::UnknownVersionField {
                name: "version".into()
            }
        );
    }

    #[test]
    fn rejects_duplicate_field_names() {
        let fields = vec![scalar("author"), scalar("author")];
        let err = mergeable_fields(&fields, &[], None).unwrap_err();
        assert_eq!(err, SynthError::DuplicateField { name: "author".into() });
    }
}
