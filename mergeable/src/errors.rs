use std::borrow::Cow;

use thiserror::Error;

use mergeable_synth::SynthError;

/// Errors raised by the persistence interface.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `save` was called on a record that was never persisted.
    #[error("record has no identity; persist it before saving")]
    Unsaved,

    /// The record is not present in the store.
    #[error("record '{id}' not found")]
    NotFound { id: String },

    /// `persist` was called on a record that already carries an identity.
    #[error("record '{id}' is already persisted")]
    AlreadyPersisted { id: String },

    /// Failure surfaced by the backing store.
    #[error("{message}")]
    Backend { message: Cow<'static, str> },
}

/// Top-level error type returned by the merge executor.
///
/// Persistence errors are surfaced unchanged; there is no retry and no
/// rollback of saves that already happened.
#[derive(Debug, Error)]
pub enum MergeError {
    /// Underlying store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error from the design-time pipeline.
    #[error(transparent)]
    Synth(#[from] SynthError),

    /// A record of the wrong entity type was passed to the executor.
    #[error("expected a record of entity '{expected}', got '{actual}'")]
    EntityMismatch { expected: String, actual: String },

    /// A merge source must be persisted so the product can reference it.
    #[error("source record of entity '{entity}' must be persisted before merging")]
    UnsavedSource { entity: String },

    /// The target type declares this member by hand; the executor only
    /// runs generated bodies.
    #[error("entity '{entity}' reuses a hand-written '{name}'; no generated body to run")]
    ReusedMember { entity: String, name: String },

    /// No generated method of this name exists on the augmentation.
    #[error("no generated method '{name}' on entity '{entity}'")]
    UnknownMethod { entity: String, name: String },

    /// A body statement was encountered out of its valid position.
    #[error("malformed method body: {message}")]
    MalformedBody { message: Cow<'static, str> },
}

impl MergeError {
    pub(crate) fn malformed(message: &'static str) -> Self {
        MergeError::MalformedBody {
            message: Cow::Borrowed(message),
        }
    }
}
