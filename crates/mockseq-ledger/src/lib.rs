//! Ordered step ledger for MockSeq.
//!
//! A [`VerifiableSequence`] holds the labels of sequence-scoped setups in the
//! order they were declared, plus a cursor to the next pending step. Live
//! calls are matched strictly against that cursor:
//!
//! - [`VerifiableSequence::declare`] appends a step during test setup
//! - [`VerifiableSequence::record`] consumes the next step or rejects the call
//! - [`VerifiableSequence::verify`] fails with a [`VerificationReport`] while
//!   steps are still pending
//!
//! The ledger only sees labels. It knows nothing about mocks, which keeps it
//! usable from any interception layer.
//!
//! ```rust
//! use mockseq_ledger::{SequenceError, VerifiableSequence};
//!
//! let seq = VerifiableSequence::new();
//! seq.declare("M(0)");
//! seq.declare("M(1)");
//!
//! let error = seq.record("M(1)").unwrap_err();
//! assert_eq!(
//!     error.to_string(),
//!     "Executed action 'M(1)' does not match setup 'M(0)'."
//! );
//!
//! seq.record("M(0)").unwrap();
//! seq.record("M(1)").unwrap();
//! seq.verify().unwrap();
//! ```

pub mod error;
pub mod report;
pub mod sequence;

pub use error::{Result, SequenceError};
pub use report::{StepStatus, VerificationReport};
pub use sequence::VerifiableSequence;
