//! Argument matching and rendering.

use std::any::TypeId;
use std::fmt::{self, Debug};
use std::rc::Rc;

/// Argument tuples a mocked member can be called with.
///
/// Implemented for tuples of up to eight `Debug` elements. `render` produces
/// the comma-separated argument list used in labels, e.g. `"0", "1"`.
pub trait Args: 'static {
    fn render(&self) -> String;
}

macro_rules! impl_args {
    ($($name:ident),*) => {
        impl<$($name: Debug + 'static),*> Args for ($($name,)*) {
            #[allow(non_snake_case)]
            fn render(&self) -> String {
                let ($($name,)*) = self;
                let parts: Vec<String> = vec![$(format!("{:?}", $name)),*];
                parts.join(", ")
            }
        }
    };
}

impl_args!();
impl_args!(T0);
impl_args!(T0, T1);
impl_args!(T0, T1, T2);
impl_args!(T0, T1, T2, T3);
impl_args!(T0, T1, T2, T3, T4);
impl_args!(T0, T1, T2, T3, T4, T5);
impl_args!(T0, T1, T2, T3, T4, T5, T6);
impl_args!(T0, T1, T2, T3, T4, T5, T6, T7);

/// Decides whether a call's arguments select a setup.
///
/// Every matcher carries the text it renders as inside a setup label.
pub struct Matcher<A> {
    description: String,
    predicate: Rc<dyn Fn(&A) -> bool>,
}

impl<A: Args> Matcher<A> {
    /// Match arguments equal to `expected`.
    pub fn eq(expected: A) -> Self
    where
        A: PartialEq,
    {
        Self {
            description: expected.render(),
            predicate: Rc::new(move |actual| *actual == expected),
        }
    }

    /// Match any arguments.
    ///
    /// Renders as `_`, or as nothing for members without arguments so that
    /// the label reads like the calls it matches.
    pub fn any() -> Self {
        let description = if TypeId::of::<A>() == TypeId::of::<()>() {
            ""
        } else {
            "_"
        };
        Self::when(description, |_| true)
    }

    /// Match arguments accepted by `predicate`, rendered as `description`.
    pub fn when(description: impl Into<String>, predicate: impl Fn(&A) -> bool + 'static) -> Self {
        Self {
            description: description.into(),
            predicate: Rc::new(predicate),
        }
    }

    pub fn matches(&self, args: &A) -> bool {
        (self.predicate)(args)
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl<T: Debug + PartialEq + 'static> Matcher<(T,)> {
    /// Match a single argument equal to `expected`.
    pub fn value(expected: T) -> Self {
        Self::eq((expected,))
    }
}

impl<A> Clone for Matcher<A> {
    fn clone(&self) -> Self {
        Self {
            description: self.description.clone(),
            predicate: self.predicate.clone(),
        }
    }
}

impl<A> fmt::Debug for Matcher<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Matcher").field(&self.description).finish()
    }
}
