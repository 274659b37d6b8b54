//! Setups: what a mock does when one of its members is called.

use std::any::{Any, TypeId};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::error::{MockError, Result};
use crate::matcher::{Args, Matcher};
use crate::stub::{into_callback, Callback, Invocation, Stub};

/// A fluent handle to one declared setup.
///
/// The mock keeps its own reference to the setup, so the handle may be
/// dropped once configuration is done.
pub struct Setup<A, R> {
    state: Rc<SetupState<A, R>>,
}

pub(crate) struct SetupState<A, R> {
    label: String,
    matcher: Matcher<A>,
    behavior: RefCell<Behavior<A, R>>,
    hits: Cell<usize>,
}

struct Behavior<A, R> {
    callback: Option<Callback<A>>,
    outcome: Outcome<A, R>,
    raises: Vec<(String, String)>,
    verifiable: bool,
    at_most: Option<usize>,
}

enum Outcome<A, R> {
    Unset,
    Value(R),
    With(Rc<dyn Fn(&A) -> R>),
    Throw(String),
    CallBase,
}

impl<A, R: Clone> Clone for Outcome<A, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Unset => Self::Unset,
            Self::Value(value) => Self::Value(value.clone()),
            Self::With(f) => Self::With(f.clone()),
            Self::Throw(message) => Self::Throw(message.clone()),
            Self::CallBase => Self::CallBase,
        }
    }
}

/// How a matched call produces its return value.
pub(crate) enum Reply<R> {
    Value(R),
    Default,
    Base,
}

/// What the mock should do after a setup's side effects ran.
pub(crate) struct Resolution<R> {
    pub(crate) result: Result<Reply<R>>,
    pub(crate) raises: Vec<(String, String)>,
}

impl<A: Args, R: 'static> Setup<A, R> {
    pub(crate) fn new(label: String, matcher: Matcher<A>) -> Self {
        Self {
            state: Rc::new(SetupState {
                label,
                matcher,
                behavior: RefCell::new(Behavior {
                    callback: None,
                    outcome: Outcome::Unset,
                    raises: Vec::new(),
                    verifiable: false,
                    at_most: None,
                }),
                hits: Cell::new(0),
            }),
        }
    }

    pub(crate) fn state(&self) -> Rc<SetupState<A, R>> {
        self.state.clone()
    }

    /// The label rendered when the setup was declared.
    pub fn label(&self) -> &str {
        &self.state.label
    }

    /// Number of calls this setup has matched.
    pub fn hits(&self) -> usize {
        self.state.hits.get()
    }

    pub fn is_verifiable(&self) -> bool {
        self.state.behavior.borrow().verifiable
    }

    /// Run `f` with the call's arguments on every matched call.
    pub fn callback(self, f: impl Fn(&A) + 'static) -> Self {
        self.set_callback(into_callback(move |_, args| {
            f(args);
            Ok(())
        }));
        self
    }

    /// Run `f` with the invocation on every matched call.
    pub fn callback_invocation(self, f: impl Fn(&Invocation) + 'static) -> Self {
        self.set_callback(into_callback(move |invocation, _| {
            f(invocation);
            Ok(())
        }));
        self
    }

    /// Install a type-erased callback.
    ///
    /// `f` must hold a `Box<dyn Fn(&A)>`; anything else fails each matched
    /// call with [`MockError::CallbackSignature`].
    pub fn callback_any(self, f: Rc<dyn Any>) -> Self {
        let label = self.state.label.clone();
        self.set_callback(into_callback(move |_, args| {
            match f.downcast_ref::<Box<dyn Fn(&A)>>() {
                Some(callback) => {
                    callback(args);
                    Ok(())
                }
                None => Err(MockError::CallbackSignature {
                    label: label.clone(),
                }
                .into()),
            }
        }));
        self
    }

    /// Return a clone of `value` from every matched call.
    pub fn returns(self, value: R) -> Self {
        self.state.behavior.borrow_mut().outcome = Outcome::Value(value);
        self
    }

    /// Compute the return value from the call's arguments.
    pub fn returns_with(self, f: impl Fn(&A) -> R + 'static) -> Self {
        self.state.behavior.borrow_mut().outcome = Outcome::With(Rc::new(f));
        self
    }

    /// Fail every matched call with [`MockError::Thrown`].
    pub fn throws(self, message: impl Into<String>) -> Self {
        self.state.behavior.borrow_mut().outcome = Outcome::Throw(message.into());
        self
    }

    /// Delegate to the base implementation supplied by the caller.
    pub fn call_base(self) -> Self {
        self.state.behavior.borrow_mut().outcome = Outcome::CallBase;
        self
    }

    /// Include this setup in [`Mock::verify`](crate::Mock::verify).
    pub fn verifiable(self) -> Self {
        self.state.behavior.borrow_mut().verifiable = true;
        self
    }

    /// Raise `event` with `payload` after each matched call's callback.
    pub fn raises(self, event: impl Into<String>, payload: impl Into<String>) -> Self {
        self.state
            .behavior
            .borrow_mut()
            .raises
            .push((event.into(), payload.into()));
        self
    }

    /// Fail calls beyond the `limit`-th match.
    pub fn at_most(self, limit: usize) -> Self {
        self.state.behavior.borrow_mut().at_most = Some(limit);
        self
    }

    pub fn at_most_once(self) -> Self {
        self.at_most(1)
    }
}

impl<A: Args, R: 'static> Stub<A> for Setup<A, R> {
    fn label(&self) -> String {
        self.state.label.clone()
    }

    fn set_callback(&self, callback: Callback<A>) {
        self.state.behavior.borrow_mut().callback = Some(callback);
    }
}

impl<A, R> Clone for Setup<A, R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Setup<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setup")
            .field("label", &self.state.label)
            .field("hits", &self.state.hits.get())
            .finish()
    }
}

impl<A: Args, R: Clone + 'static> SetupState<A, R> {
    pub(crate) fn matches(&self, args: &A) -> bool {
        self.matcher.matches(args)
    }

    /// Run the setup's side effects for one call and decide its result.
    ///
    /// No borrow of the behavior is held while the callback runs, so the
    /// callback may call back into the same setup.
    pub(crate) fn resolve(&self, invocation: &Invocation, args: &A, strict: bool) -> Resolution<R> {
        let hits = self.hits.get() + 1;
        self.hits.set(hits);
        trace!(label = %self.label, hits, "setup matched");

        let (callback, raises, at_most, outcome) = {
            let behavior = self.behavior.borrow();
            (
                behavior.callback.clone(),
                behavior.raises.clone(),
                behavior.at_most,
                behavior.outcome.clone(),
            )
        };

        if let Some(limit) = at_most {
            if hits > limit {
                return Resolution::fail(MockError::TooManyCalls {
                    label: self.label.clone(),
                    hits,
                    limit,
                });
            }
        }

        if let Some(callback) = callback {
            if let Err(error) = callback(invocation, args) {
                return Resolution::fail(MockError::Callback(error));
            }
        }

        let result = match outcome {
            Outcome::Value(value) => Ok(Reply::Value(value)),
            Outcome::With(f) => Ok(Reply::Value(f(args))),
            Outcome::Throw(message) => Err(MockError::Thrown {
                label: self.label.clone(),
                message,
            }),
            Outcome::CallBase => Ok(Reply::Base),
            Outcome::Unset if strict && TypeId::of::<R>() != TypeId::of::<()>() => {
                Err(MockError::MissingReturn {
                    label: self.label.clone(),
                })
            }
            Outcome::Unset => Ok(Reply::Default),
        };

        Resolution { result, raises }
    }
}

impl<R> Resolution<R> {
    fn fail(error: MockError) -> Self {
        Self {
            result: Err(error),
            raises: Vec::new(),
        }
    }
}

/// Type-independent view of a setup, used for verification.
pub(crate) trait SetupRecord {
    fn label(&self) -> &str;
    fn hits(&self) -> usize;
    fn is_verifiable(&self) -> bool;
}

impl<A, R> SetupRecord for SetupState<A, R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn hits(&self) -> usize {
        self.hits.get()
    }

    fn is_verifiable(&self) -> bool {
        self.behavior.borrow().verifiable
    }
}
