//! The contract between a mock framework and the sequence adapter.

use std::rc::Rc;

use crate::error::CallbackError;
use crate::member::{MemberKind, MemberRef};

/// A live call as seen by a callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Name of the called member.
    pub member: String,
    pub kind: MemberKind,
    /// The call rendered with its concrete arguments.
    pub call: String,
}

impl Invocation {
    pub fn new<A, R>(member: &MemberRef<A, R>, call: impl Into<String>) -> Self {
        Self {
            member: member.name().to_string(),
            kind: member.kind(),
            call: call.into(),
        }
    }
}

/// Side effect run on every matched call, before the setup's return value or
/// error resolves. An `Err` aborts the call and is returned to the caller.
pub type Callback<A> = Rc<dyn Fn(&Invocation, &A) -> Result<(), CallbackError>>;

/// A declared setup, seen from outside the mock framework.
///
/// Implementations must render the same label for the lifetime of the stub
/// and must run the installed callback synchronously, exactly once per
/// matched call.
pub trait Stub<A> {
    /// Human-readable description of the expected call.
    fn label(&self) -> String;

    /// Install the stub's callback, replacing any previous one.
    fn set_callback(&self, callback: Callback<A>);
}

/// Box a closure as a [`Callback`], letting the compiler infer its
/// signature.
pub fn into_callback<A, F>(f: F) -> Callback<A>
where
    F: Fn(&Invocation, &A) -> Result<(), CallbackError> + 'static,
{
    Rc::new(f)
}
