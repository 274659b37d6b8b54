//! Sequence-scoped setups.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use mockseq_ledger::VerifiableSequence;
use mockseq_mock::{into_callback, Args, Invocation, Setup};

use crate::error::{DeclarationError, Result};
use crate::intercept::Interceptor;

/// A [`Setup`] that records its calls in a [`VerifiableSequence`].
///
/// Behaves exactly like the wrapped setup except for callbacks: every
/// callback registered here runs after the sequence recorder, and the
/// recorder runs exactly once per matched call. The wrapped setup is never
/// handed out, since replacing its callback would drop the recorder.
pub struct SetupWrapper<A, R> {
    inner: Setup<A, R>,
    interceptor: Interceptor<A>,
}

impl<A: Args, R: 'static> SetupWrapper<A, R> {
    pub(crate) fn new(inner: Setup<A, R>, sequence: &VerifiableSequence) -> Self {
        let interceptor = Interceptor::attach(&inner, sequence);
        Self { inner, interceptor }
    }

    /// Label declared in the sequence.
    pub fn label(&self) -> &str {
        self.interceptor.label()
    }

    /// Number of calls the setup has matched.
    pub fn hits(&self) -> usize {
        self.inner.hits()
    }

    /// Whether the setup is checked by [`Mock::verify`](mockseq_mock::Mock::verify).
    pub fn is_verifiable(&self) -> bool {
        self.inner.is_verifiable()
    }

    /// Run `f` with the call's arguments after the sequence step is
    /// recorded.
    pub fn callback(self, f: impl Fn(&A) + 'static) -> Self {
        self.interceptor.compose(
            &self.inner,
            into_callback(move |_, args| {
                f(args);
                Ok(())
            }),
        );
        self
    }

    /// Run `f` with the invocation after the sequence step is recorded.
    pub fn callback_invocation(self, f: impl Fn(&Invocation) + 'static) -> Self {
        self.interceptor.compose(
            &self.inner,
            into_callback(move |invocation, _| {
                f(invocation);
                Ok(())
            }),
        );
        self
    }

    /// Type-erased callbacks cannot be composed with the recorder and are
    /// refused here rather than failing on the first call.
    pub fn callback_any(self, _callback: Rc<dyn Any>) -> Result<Self> {
        Err(DeclarationError::NotSupported(
            "The 'callback_any' form is not supported in a verifiable sequence. \
             Please use 'callback' or 'callback_invocation'."
                .into(),
        ))
    }

    pub fn returns(self, value: R) -> Self {
        self.map(|setup| setup.returns(value))
    }

    pub fn returns_with(self, f: impl Fn(&A) -> R + 'static) -> Self {
        self.map(|setup| setup.returns_with(f))
    }

    pub fn throws(self, message: impl Into<String>) -> Self {
        self.map(|setup| setup.throws(message))
    }

    pub fn call_base(self) -> Self {
        self.map(Setup::call_base)
    }

    pub fn verifiable(self) -> Self {
        self.map(Setup::verifiable)
    }

    pub fn raises(self, event: impl Into<String>, payload: impl Into<String>) -> Self {
        self.map(|setup| setup.raises(event, payload))
    }

    pub fn at_most(self, limit: usize) -> Self {
        self.map(|setup| setup.at_most(limit))
    }

    pub fn at_most_once(self) -> Self {
        self.map(Setup::at_most_once)
    }

    fn map(self, f: impl FnOnce(Setup<A, R>) -> Setup<A, R>) -> Self {
        Self {
            inner: f(self.inner),
            interceptor: self.interceptor,
        }
    }
}

impl<A, R> fmt::Debug for SetupWrapper<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetupWrapper")
            .field("setup", &self.inner)
            .finish()
    }
}
