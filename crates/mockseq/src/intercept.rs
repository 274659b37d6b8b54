//! Recording side effects for sequence-scoped stubs.

use std::marker::PhantomData;

use mockseq_ledger::VerifiableSequence;
use mockseq_mock::{into_callback, Callback, Stub};
use tracing::trace;

/// Binds one stub to a sequence.
///
/// Attaching declares the stub's label and installs a callback that records
/// the label on every matched call. Callbacks added later with
/// [`compose`](Self::compose) run after the recorder, in one ordered chain,
/// however often they are replaced.
pub struct Interceptor<A> {
    label: String,
    sequence: VerifiableSequence,
    _args: PhantomData<fn(&A)>,
}

impl<A: 'static> Interceptor<A> {
    /// Declare `stub` in `sequence` and install the recorder.
    ///
    /// The label is read once, here; later changes to the stub's rendering
    /// do not affect matching.
    pub fn attach<S: Stub<A>>(stub: &S, sequence: &VerifiableSequence) -> Self {
        let label = stub.label();
        sequence.declare(label.clone());

        let interceptor = Self {
            label,
            sequence: sequence.clone(),
            _args: PhantomData,
        };
        stub.set_callback(interceptor.chain(None));
        interceptor
    }

    /// Replace the stub's user callback, keeping the recorder in front.
    pub fn compose<S: Stub<A>>(&self, stub: &S, callback: Callback<A>) {
        stub.set_callback(self.chain(Some(callback)));
    }

    /// The label declared for the stub.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sequence(&self) -> &VerifiableSequence {
        &self.sequence
    }

    fn recorder(&self) -> Callback<A> {
        let sequence = self.sequence.clone();
        let label = self.label.clone();
        into_callback(move |invocation, _| {
            trace!(%label, call = %invocation.call, "recording sequence step");
            sequence.record(&label).map_err(Into::into)
        })
    }

    fn chain(&self, user: Option<Callback<A>>) -> Callback<A> {
        let steps: Vec<Callback<A>> = std::iter::once(self.recorder()).chain(user).collect();
        into_callback(move |invocation, args| {
            for step in &steps {
                step(invocation, args)?;
            }
            Ok(())
        })
    }
}
