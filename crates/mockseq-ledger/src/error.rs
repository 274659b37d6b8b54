//! Error types for sequence matching and verification.

use thiserror::Error;

use crate::report::VerificationReport;

/// Errors raised by a [`VerifiableSequence`](crate::VerifiableSequence).
///
/// The display strings are part of the public contract: tests assert on
/// them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// A call arrived that is not the next pending step.
    #[error("Executed action '{executed}' does not match setup '{expected}'.")]
    OrderViolation { executed: String, expected: String },

    /// A call arrived after every declared step was already matched.
    #[error("All setups in this sequence were matched. Unexpected call '{executed}'.")]
    Overrun { executed: String },

    /// `verify` found pending steps.
    #[error("{0}")]
    Verification(VerificationReport),
}

impl SequenceError {
    /// The label of the call that triggered the error, if any.
    pub fn executed(&self) -> Option<&str> {
        match self {
            Self::OrderViolation { executed, .. } | Self::Overrun { executed } => Some(executed),
            Self::Verification(_) => None,
        }
    }
}

/// Convenience type alias for sequence operations.
pub type Result<T> = std::result::Result<T, SequenceError>;
