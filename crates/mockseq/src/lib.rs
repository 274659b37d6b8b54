//! Verifiable call sequences across mocks.
//!
//! Declare setups through [`InVerifiableSequence::in_verifiable_sequence`]
//! and each one becomes a step of a [`VerifiableSequence`]. Every matched call
//! records its step; a call that arrives out of order fails at the call
//! site, and [`VerifiableSequence::verify`] reports steps that never ran.
//!
//! Sequence membership is per setup, not per mock: setups declared on the
//! mock directly can be called at any time without touching the sequence.
//!
//! # Quick Start
//!
//! ```rust
//! use mockseq::{InVerifiableSequence, Matcher, MemberRef, Mock, VerifiableSequence};
//!
//! const METHOD: MemberRef<(String,), String> = MemberRef::method("method");
//!
//! let seq = VerifiableSequence::new();
//! let mock = Mock::new("Mockable");
//! mock.in_verifiable_sequence(&seq)
//!     .setup(&METHOD, Matcher::value("0".to_string()));
//! mock.in_verifiable_sequence(&seq)
//!     .setup(&METHOD, Matcher::value("1".to_string()));
//!
//! let error = mock.invoke(&METHOD, ("1".to_string(),)).unwrap_err();
//! assert_eq!(
//!     error.to_string(),
//!     "Executed action 'Mockable::method(\"1\")' does not match setup 'Mockable::method(\"0\")'."
//! );
//!
//! mock.invoke(&METHOD, ("0".to_string(),)).unwrap();
//! mock.invoke(&METHOD, ("1".to_string(),)).unwrap();
//! seq.verify().unwrap();
//! ```

pub mod error;
pub mod intercept;
pub mod protected;
pub mod setup;
pub mod wrapper;

pub use error::DeclarationError;
pub use intercept::Interceptor;
pub use protected::{ProtectedAsMockWrapper, ProtectedMockWrapper};
pub use setup::SetupWrapper;
pub use wrapper::{InVerifiableSequence, MockWrapper};

// Re-exports for convenience.
pub use mockseq_ledger::{SequenceError, StepStatus, VerifiableSequence, VerificationReport};
pub use mockseq_mock::{
    EventHandler, InvalidMember, Invocation, Matcher, MemberRef, Mock, MockBehavior, MockConfig,
    MockError, Setup, TypeArgs,
};

/// The sequence failure carried by a failed call, if that is why it failed.
pub fn sequence_error(error: &MockError) -> Option<&SequenceError> {
    error.downcast_callback::<SequenceError>()
}
