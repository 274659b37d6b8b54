//! The ordered step ledger.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::error::{Result, SequenceError};
use crate::report::VerificationReport;

/// A sequence of expected steps that live calls must satisfy in order.
///
/// Cloning produces another handle to the same ledger, so a recorder
/// installed on a stub and the test that calls [`verify`](Self::verify)
/// observe the same cursor. The ledger is single-threaded (`!Send`).
///
/// Borrows of the inner ledger never outlive a single method call, which
/// lets a recorder run from inside another recorder's call stack.
#[derive(Clone, Default)]
pub struct VerifiableSequence {
    inner: Rc<RefCell<Ledger>>,
}

#[derive(Default)]
struct Ledger {
    steps: Vec<String>,
    cursor: usize,
}

impl VerifiableSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an expected step. Labels may repeat.
    pub fn declare(&self, label: impl Into<String>) {
        let label = label.into();
        let mut ledger = self.inner.borrow_mut();
        debug!(index = ledger.steps.len(), %label, "sequence step declared");
        ledger.steps.push(label);
    }

    /// Match a live call against the next pending step.
    ///
    /// On success the cursor advances by one. A mismatch is rejected without
    /// consuming a step, so later calls in the right order still match.
    pub fn record(&self, label: &str) -> Result<()> {
        let mut ledger = self.inner.borrow_mut();
        let cursor = ledger.cursor;

        let Some(expected) = ledger.steps.get(cursor) else {
            warn!(%label, "call after sequence was fully matched");
            return Err(SequenceError::Overrun {
                executed: label.to_string(),
            });
        };

        if expected != label {
            warn!(%label, %expected, cursor, "call out of sequence");
            return Err(SequenceError::OrderViolation {
                executed: label.to_string(),
                expected: expected.clone(),
            });
        }

        ledger.cursor += 1;
        trace!(%label, cursor = ledger.cursor, "sequence step matched");
        Ok(())
    }

    /// Fail with a [`VerificationReport`] if any declared step is pending.
    ///
    /// An empty sequence always verifies.
    pub fn verify(&self) -> Result<()> {
        let report = self.report();
        if report.is_complete() {
            debug!(steps = report.steps.len(), "sequence verified");
            return Ok(());
        }

        debug!(
            steps = report.steps.len(),
            pending = report.pending().count(),
            "sequence verification failed"
        );
        Err(SequenceError::Verification(report))
    }

    /// Snapshot of every step and whether it has been matched.
    pub fn report(&self) -> VerificationReport {
        let ledger = self.inner.borrow();
        VerificationReport::from_steps(&ledger.steps, ledger.cursor)
    }

    /// Declared step labels in declaration order.
    pub fn steps(&self) -> Vec<String> {
        self.inner.borrow().steps.clone()
    }

    /// Index of the next pending step.
    pub fn cursor(&self) -> usize {
        self.inner.borrow().cursor
    }

    /// Number of declared steps.
    pub fn len(&self) -> usize {
        self.inner.borrow().steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` when no step is pending.
    pub fn is_complete(&self) -> bool {
        let ledger = self.inner.borrow();
        ledger.cursor == ledger.steps.len()
    }

    /// Returns `true` if both handles point at the same ledger.
    pub fn same_ledger(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for VerifiableSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ledger = self.inner.borrow();
        f.debug_struct("VerifiableSequence")
            .field("steps", &ledger.steps)
            .field("cursor", &ledger.cursor)
            .finish()
    }
}
