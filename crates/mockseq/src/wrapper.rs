//! Entry point: binding a mock to a sequence.

use mockseq_ledger::VerifiableSequence;
use mockseq_mock::{Args, EventHandler, Matcher, MemberRef, Mock};

use crate::protected::ProtectedMockWrapper;
use crate::setup::SetupWrapper;

/// Places setups of a mock in a [`VerifiableSequence`].
pub trait InVerifiableSequence {
    /// Setups declared through the returned wrapper become steps of
    /// `sequence`. Setups declared on the mock directly stay unordered.
    fn in_verifiable_sequence(&self, sequence: &VerifiableSequence) -> MockWrapper<'_>;
}

impl InVerifiableSequence for Mock {
    fn in_verifiable_sequence(&self, sequence: &VerifiableSequence) -> MockWrapper<'_> {
        MockWrapper::new(self, sequence)
    }
}

/// The declaration surface of a [`Mock`], with every setup sequence-scoped.
#[derive(Debug)]
pub struct MockWrapper<'a> {
    mock: &'a Mock,
    sequence: VerifiableSequence,
}

impl<'a> MockWrapper<'a> {
    pub fn new(mock: &'a Mock, sequence: &VerifiableSequence) -> Self {
        Self {
            mock,
            sequence: sequence.clone(),
        }
    }

    pub fn setup<A, R>(&self, member: &MemberRef<A, R>, matcher: Matcher<A>) -> SetupWrapper<A, R>
    where
        A: Args,
        R: 'static,
    {
        SetupWrapper::new(self.mock.setup(member, matcher), &self.sequence)
    }

    pub fn setup_get<R: 'static>(&self, member: &MemberRef<(), R>) -> SetupWrapper<(), R> {
        SetupWrapper::new(self.mock.setup_get(member), &self.sequence)
    }

    pub fn setup_set<T>(
        &self,
        member: &MemberRef<(T,), ()>,
        matcher: Matcher<(T,)>,
    ) -> SetupWrapper<(T,), ()>
    where
        (T,): Args,
    {
        SetupWrapper::new(self.mock.setup_set(member, matcher), &self.sequence)
    }

    pub fn setup_add(
        &self,
        member: &MemberRef<(EventHandler,), ()>,
    ) -> SetupWrapper<(EventHandler,), ()> {
        SetupWrapper::new(self.mock.setup_add(member), &self.sequence)
    }

    pub fn setup_remove(
        &self,
        member: &MemberRef<(EventHandler,), ()>,
    ) -> SetupWrapper<(EventHandler,), ()> {
        SetupWrapper::new(self.mock.setup_remove(member), &self.sequence)
    }

    /// Sequence-scoped setups on protected members.
    pub fn protected(&self) -> ProtectedMockWrapper<'a> {
        ProtectedMockWrapper::new(self.mock.protected(), &self.sequence)
    }

    pub fn mock(&self) -> &'a Mock {
        self.mock
    }

    pub fn sequence(&self) -> &VerifiableSequence {
        &self.sequence
    }
}
