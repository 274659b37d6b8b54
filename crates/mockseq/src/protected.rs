//! Sequence-scoped setups on protected members.

use mockseq_ledger::VerifiableSequence;
use mockseq_mock::{Args, Matcher, MemberRef, ProtectedAsMock, ProtectedMock, TypeArgs};

use crate::error::Result;
use crate::setup::SetupWrapper;

/// Protected members addressed by name.
pub struct ProtectedMockWrapper<'a> {
    inner: ProtectedMock<'a>,
    sequence: VerifiableSequence,
}

impl<'a> ProtectedMockWrapper<'a> {
    pub(crate) fn new(inner: ProtectedMock<'a>, sequence: &VerifiableSequence) -> Self {
        Self {
            inner,
            sequence: sequence.clone(),
        }
    }

    /// A method returning `R`; `R = ()` for methods without a result.
    ///
    /// Fails with [`DeclarationError::Argument`](crate::DeclarationError::Argument)
    /// if `name` is not a valid member name. Nothing is declared in the
    /// sequence in that case.
    pub fn setup<A, R>(&self, name: &str, matcher: Matcher<A>) -> Result<SetupWrapper<A, R>>
    where
        A: Args,
        R: 'static,
    {
        let setup = self.inner.setup(name, matcher)?;
        Ok(SetupWrapper::new(setup, &self.sequence))
    }

    /// An instantiation of a generic method with explicit type arguments
    /// `G`. Each instantiation is its own step with its own label.
    pub fn setup_generic<G, A, R>(&self, name: &str, matcher: Matcher<A>) -> Result<SetupWrapper<A, R>>
    where
        G: TypeArgs,
        A: Args,
        R: 'static,
    {
        let setup = self.inner.setup_generic::<G, A, R>(name, matcher)?;
        Ok(SetupWrapper::new(setup, &self.sequence))
    }

    pub fn setup_get<R: 'static>(&self, name: &str) -> Result<SetupWrapper<(), R>> {
        let setup = self.inner.setup_get(name)?;
        Ok(SetupWrapper::new(setup, &self.sequence))
    }

    pub fn setup_set<T>(&self, name: &str, matcher: Matcher<(T,)>) -> Result<SetupWrapper<(T,), ()>>
    where
        (T,): Args,
    {
        let setup = self.inner.setup_set(name, matcher)?;
        Ok(SetupWrapper::new(setup, &self.sequence))
    }

    /// Declare through the members of an analog interface named `analog`.
    pub fn as_analog(&self, analog: impl Into<String>) -> ProtectedAsMockWrapper<'a> {
        ProtectedAsMockWrapper {
            inner: self.inner.as_analog(analog),
            sequence: self.sequence.clone(),
        }
    }
}

/// Protected members declared through an analog interface.
pub struct ProtectedAsMockWrapper<'a> {
    inner: ProtectedAsMock<'a>,
    sequence: VerifiableSequence,
}

impl<'a> ProtectedAsMockWrapper<'a> {
    pub fn setup<A, R>(&self, member: &MemberRef<A, R>, matcher: Matcher<A>) -> SetupWrapper<A, R>
    where
        A: Args,
        R: 'static,
    {
        SetupWrapper::new(self.inner.setup(member, matcher), &self.sequence)
    }

    pub fn setup_get<R: 'static>(&self, member: &MemberRef<(), R>) -> SetupWrapper<(), R> {
        SetupWrapper::new(self.inner.setup_get(member), &self.sequence)
    }

    pub fn setup_set<T>(
        &self,
        member: &MemberRef<(T,), ()>,
        matcher: Matcher<(T,)>,
    ) -> SetupWrapper<(T,), ()>
    where
        (T,): Args,
    {
        SetupWrapper::new(self.inner.setup_set(member, matcher), &self.sequence)
    }
}
