//! Errors raised while declaring sequence-scoped setups.

use mockseq_mock::InvalidMember;
use thiserror::Error;

/// Failures reported at declaration time, before any call is made.
///
/// Failures during calls are [`SequenceError`](mockseq_ledger::SequenceError)s
/// travelling inside [`MockError::Callback`](mockseq_mock::MockError::Callback);
/// see [`sequence_error`](crate::sequence_error).
#[derive(Debug, Error)]
pub enum DeclarationError {
    /// The callback form cannot be composed with the sequence recorder.
    #[error("{0}")]
    NotSupported(String),

    /// A protected member was addressed by an invalid name.
    #[error("invalid argument: {0}")]
    Argument(#[from] InvalidMember),
}

/// Convenience type alias for declarations.
pub type Result<T> = std::result::Result<T, DeclarationError>;
