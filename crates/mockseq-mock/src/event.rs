use std::fmt;
use std::rc::Rc;

/// A subscriber to a mocked event.
///
/// Handlers compare by identity: a clone is the same handler, a new closure
/// with the same body is not.
#[derive(Clone)]
pub struct EventHandler {
    inner: Rc<dyn Fn(&str)>,
}

impl EventHandler {
    pub fn new(f: impl Fn(&str) + 'static) -> Self {
        Self { inner: Rc::new(f) }
    }

    /// Invoke the handler with an event payload.
    pub fn call(&self, payload: &str) {
        (self.inner)(payload)
    }

    /// Returns `true` if both values refer to the same subscription.
    pub fn same_handler(&self, other: &Self) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.inner) as *const (),
            Rc::as_ptr(&other.inner) as *const (),
        )
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.same_handler(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<handler>")
    }
}
