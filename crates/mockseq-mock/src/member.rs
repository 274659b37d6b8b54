//! Typed handles naming mocked members.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use crate::event::EventHandler;

/// The shape of a mocked member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Getter,
    Setter,
    EventAdd,
    EventRemove,
}

/// Whether a member is part of the public surface or reached by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
}

/// Explicit type arguments of a generic member, e.g. `(String,)` for
/// `generic::<String>`.
///
/// Implemented for tuples of one to four types.
pub trait TypeArgs: 'static {
    /// The arguments as they appear between angle brackets.
    fn render() -> String;
}

macro_rules! impl_type_args {
    ($($name:ident),+) => {
        impl<$($name: 'static),+> TypeArgs for ($($name,)+) {
            fn render() -> String {
                let parts: Vec<String> = vec![$(short_type_name::<$name>()),+];
                parts.join(", ")
            }
        }
    };
}

impl_type_args!(T0);
impl_type_args!(T0, T1);
impl_type_args!(T0, T1, T2);
impl_type_args!(T0, T1, T2, T3);

/// `std::any::type_name` without module paths: `Option<String>` rather than
/// `core::option::Option<alloc::string::String>`.
pub fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(last_path_segment(&segment));
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(last_path_segment(&segment));
    out
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

#[derive(Clone, Debug)]
struct Generics {
    rendered: String,
    id: TypeId,
}

/// An opaque handle to a member of a mocked type.
///
/// `A` is the argument tuple and `R` the return type. Calls and setups meet
/// only when visibility, kind, name, explicit type arguments and both type
/// parameters agree, so two instantiations of a generic member are distinct
/// members. Their labels differ too: explicit type arguments render as
/// `name<T>`, and members reached by name render a non-unit return type as
/// `-> R`.
pub struct MemberRef<A, R> {
    name: Cow<'static, str>,
    kind: MemberKind,
    visibility: Visibility,
    generics: Option<Generics>,
    _signature: PhantomData<fn(A) -> R>,
}

impl<A, R> MemberRef<A, R> {
    const fn new(name: &'static str, kind: MemberKind, visibility: Visibility) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind,
            visibility,
            generics: None,
            _signature: PhantomData,
        }
    }

    /// A public method.
    pub const fn method(name: &'static str) -> Self {
        Self::new(name, MemberKind::Method, Visibility::Public)
    }

    /// A protected method, reached by name.
    pub const fn protected_method(name: &'static str) -> Self {
        Self::new(name, MemberKind::Method, Visibility::Protected)
    }

    /// A member whose name is only known at run time.
    pub fn named(name: impl Into<String>, kind: MemberKind, visibility: Visibility) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            kind,
            visibility,
            generics: None,
            _signature: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Render a call to this member on `owner` with already rendered
    /// arguments.
    pub fn render(&self, owner: &str, args: &str) -> String {
        let name = match &self.generics {
            Some(generics) => format!("{}<{}>", self.name, generics.rendered),
            None => self.name.to_string(),
        };
        let call = match self.kind {
            MemberKind::Method => format!("{owner}::{name}({args})"),
            MemberKind::Getter => format!("{owner}::{name}"),
            MemberKind::Setter => format!("{owner}::{name} = {args}"),
            MemberKind::EventAdd => format!("{owner}::{name} += {args}"),
            MemberKind::EventRemove => format!("{owner}::{name} -= {args}"),
        };

        let returns = short_type_name::<R>();
        if self.visibility == Visibility::Protected && returns != "()" {
            format!("{call} -> {returns}")
        } else {
            call
        }
    }

    /// The same member with a different visibility.
    pub fn with_visibility(&self, visibility: Visibility) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            visibility,
            generics: self.generics.clone(),
            _signature: PhantomData,
        }
    }

    /// The instantiation of this generic member with type arguments `G`.
    pub fn with_type_args<G: TypeArgs>(&self) -> Self {
        Self {
            generics: Some(Generics {
                rendered: G::render(),
                id: TypeId::of::<G>(),
            }),
            ..self.clone()
        }
    }

    /// Rendered explicit type arguments, if the member has any.
    pub fn type_args(&self) -> Option<&str> {
        self.generics.as_ref().map(|g| g.rendered.as_str())
    }
}

impl<A: 'static, R: 'static> MemberRef<A, R> {
    pub(crate) fn dispatch_key(&self) -> DispatchKey {
        DispatchKey {
            name: self.name.to_string(),
            kind: self.kind,
            visibility: self.visibility,
            generics: self.generics.as_ref().map(|g| g.id),
            signature: TypeId::of::<(A, R)>(),
        }
    }
}

impl<R> MemberRef<(), R> {
    /// A public property getter.
    pub const fn getter(name: &'static str) -> Self {
        Self::new(name, MemberKind::Getter, Visibility::Public)
    }

    /// A protected property getter, reached by name.
    pub const fn protected_getter(name: &'static str) -> Self {
        Self::new(name, MemberKind::Getter, Visibility::Protected)
    }
}

impl<T> MemberRef<(T,), ()> {
    /// A public property setter.
    pub const fn setter(name: &'static str) -> Self {
        Self::new(name, MemberKind::Setter, Visibility::Public)
    }

    /// A protected property setter, reached by name.
    pub const fn protected_setter(name: &'static str) -> Self {
        Self::new(name, MemberKind::Setter, Visibility::Protected)
    }
}

impl MemberRef<(EventHandler,), ()> {
    /// Subscribing to a public event.
    pub const fn event_add(name: &'static str) -> Self {
        Self::new(name, MemberKind::EventAdd, Visibility::Public)
    }

    /// Unsubscribing from a public event.
    pub const fn event_remove(name: &'static str) -> Self {
        Self::new(name, MemberKind::EventRemove, Visibility::Public)
    }
}

impl<A, R> Clone for MemberRef<A, R> {
    fn clone(&self) -> Self {
        self.with_visibility(self.visibility)
    }
}

impl<A, R> fmt::Debug for MemberRef<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberRef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("type_args", &self.type_args())
            .finish()
    }
}

/// Identity of a member for dispatch, including its type parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct DispatchKey {
    name: String,
    kind: MemberKind,
    visibility: Visibility,
    generics: Option<TypeId>,
    signature: TypeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHOD: MemberRef<(String,), String> = MemberRef::method("method");
    const GETTER: MemberRef<(), String> = MemberRef::getter("getter");
    const SETTER: MemberRef<(String,), ()> = MemberRef::setter("setter");
    const EVENT_ADD: MemberRef<(EventHandler,), ()> = MemberRef::event_add("event");
    const EVENT_REMOVE: MemberRef<(EventHandler,), ()> = MemberRef::event_remove("event");

    #[test]
    fn renders_each_member_kind() {
        assert_eq!(METHOD.render("Mockable", "\"0\""), "Mockable::method(\"0\")");
        assert_eq!(GETTER.render("Mockable", ""), "Mockable::getter");
        assert_eq!(SETTER.render("Mockable", "\"\""), "Mockable::setter = \"\"");
        assert_eq!(EVENT_ADD.render("Mockable", "_"), "Mockable::event += _");
        assert_eq!(EVENT_REMOVE.render("Mockable", "_"), "Mockable::event -= _");
    }

    #[test]
    fn visibility_and_signature_are_part_of_the_key() {
        let protected = METHOD.with_visibility(Visibility::Protected);
        assert_ne!(METHOD.dispatch_key(), protected.dispatch_key());

        let other_signature: MemberRef<(i32,), String> = MemberRef::method("method");
        assert_ne!(METHOD.dispatch_key(), other_signature.dispatch_key());

        let runtime: MemberRef<(String,), String> =
            MemberRef::named("method", MemberKind::Method, Visibility::Public);
        assert_eq!(METHOD.dispatch_key(), runtime.dispatch_key());
    }

    #[test]
    fn type_arguments_render_and_key_instantiations() {
        const GENERIC: MemberRef<(), ()> = MemberRef::method("generic");
        let strings = GENERIC.with_type_args::<(String,)>();
        let ints = GENERIC.with_type_args::<(i32,)>();

        assert_eq!(strings.render("Mockable", ""), "Mockable::generic<String>()");
        assert_eq!(ints.render("Mockable", ""), "Mockable::generic<i32>()");
        assert_ne!(strings.dispatch_key(), ints.dispatch_key());
        assert_ne!(GENERIC.dispatch_key(), strings.dispatch_key());
    }

    #[test]
    fn protected_members_render_non_unit_return_type() {
        const INTS: MemberRef<(), i32> = MemberRef::protected_method("generic");
        const STRINGS: MemberRef<(), String> = MemberRef::protected_method("generic");
        const VOID: MemberRef<(), ()> = MemberRef::protected_method("generic");
        const VALUE: MemberRef<(), Option<String>> = MemberRef::protected_getter("value");

        assert_eq!(INTS.render("Mockable", ""), "Mockable::generic() -> i32");
        assert_eq!(STRINGS.render("Mockable", ""), "Mockable::generic() -> String");
        assert_eq!(VOID.render("Mockable", ""), "Mockable::generic()");
        assert_eq!(VALUE.render("Mockable", ""), "Mockable::value -> Option<String>");
        assert_eq!(METHOD.render("Mockable", "\"0\""), "Mockable::method(\"0\")");
    }

    #[test]
    fn short_type_names_drop_module_paths() {
        assert_eq!(short_type_name::<String>(), "String");
        assert_eq!(short_type_name::<Vec<Option<String>>>(), "Vec<Option<String>>");
        assert_eq!(short_type_name::<(i32, &str)>(), "(i32, &str)");
    }
}
