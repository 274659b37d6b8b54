//! Error types for mock dispatch.

use thiserror::Error;

/// Error returned by a callback attached to a setup.
///
/// Boxed so that any layer (for example a sequence recorder) can abort a
/// call with its own error type and recover it with `downcast_ref`.
pub type CallbackError = Box<dyn std::error::Error>;

/// Errors surfaced from calls on a [`Mock`](crate::Mock).
#[derive(Debug, Error)]
pub enum MockError {
    /// A callback attached to the matched setup failed.
    #[error("{0}")]
    Callback(CallbackError),

    /// The matched setup was configured to throw.
    #[error("{message}")]
    Thrown { label: String, message: String },

    /// A strict mock received a call with no matching setup.
    #[error("strict mock has no setup for call '{call}'")]
    NoSetup { call: String },

    /// A strict mock matched a non-unit setup with no return value.
    #[error("setup '{label}' on a strict mock has no return value configured")]
    MissingReturn { label: String },

    /// The setup was matched more often than allowed.
    #[error("setup '{label}' was matched {hits} times, at most {limit} allowed")]
    TooManyCalls {
        label: String,
        hits: usize,
        limit: usize,
    },

    /// A type-erased callback did not accept the call's arguments.
    #[error("callback for setup '{label}' does not accept the call's arguments")]
    CallbackSignature { label: String },

    /// `verify` found setups that were never matched.
    #[error("mock verification failed, setups not matched: {}", .labels.join(", "))]
    Unverified { labels: Vec<String> },
}

impl MockError {
    /// The error raised by a callback, if this is a callback failure.
    pub fn callback_error(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Callback(error) => Some(error.as_ref()),
            _ => None,
        }
    }

    /// Recover a callback's concrete error type.
    pub fn downcast_callback<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.callback_error()?.downcast_ref::<E>()
    }
}

/// A protected setup named a member that cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid member name: {0}")]
pub struct InvalidMember(pub String);

/// Result of declaring a setup on a member addressed by name.
pub type Declared<T> = std::result::Result<T, InvalidMember>;

/// Convenience type alias for mock operations.
pub type Result<T> = std::result::Result<T, MockError>;
