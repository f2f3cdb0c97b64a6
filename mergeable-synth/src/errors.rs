use thiserror::Error;

/// Configuration errors raised by the filter and the synthesizer.
///
/// These are precondition violations in the descriptors supplied by the
/// host. They are reported immediately rather than producing a partially
/// valid augmentation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthError {
    /// Field names must be unique within a type.
    #[error("duplicate field '{name}' in descriptor")]
    DuplicateField { name: String },

    /// An identity field name was supplied that the type does not declare.
    #[error("identity field '{name}' is not declared in the field list")]
    UnknownIdentityField { name: String },

    /// A version field name was supplied that the type does not declare.
    #[error("version field '{name}' is not declared in the field list")]
    UnknownVersionField { name: String },

    /// A mergeable field was supplied that the target type does not declare.
    #[error("mergeable field '{name}' is not declared on type '{entity}'")]
    ForeignMergeableField { entity: String, name: String },
}
