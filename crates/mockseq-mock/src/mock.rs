//! In-memory mock: setup registry, dispatch and event subscriptions.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::{MockBehavior, MockConfig};
use crate::error::{Declared, InvalidMember, MockError, Result};
use crate::event::EventHandler;
use crate::matcher::{Args, Matcher};
use crate::member::{DispatchKey, MemberKind, MemberRef, TypeArgs, Visibility};
use crate::setup::{Reply, Setup, SetupRecord, SetupState};
use crate::stub::Invocation;

/// A mocked object.
///
/// Test doubles forward their trait methods to [`invoke`](Self::invoke);
/// tests declare behavior with [`setup`](Self::setup) and friends. When
/// several setups match a call, the most recently declared one wins.
///
/// No internal borrow is held while callbacks or event handlers run, so a
/// callback may call the same mock again.
pub struct Mock {
    config: MockConfig,
    state: RefCell<MockState>,
}

#[derive(Default)]
struct MockState {
    setups: Vec<Registration>,
    handlers: HashMap<String, Vec<EventHandler>>,
    history: Vec<String>,
}

struct Registration {
    key: DispatchKey,
    setup: Rc<dyn Any>,
    record: Rc<dyn SetupRecord>,
}

impl Mock {
    /// A loose mock of the named type.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(MockConfig::loose(name))
    }

    /// A strict mock of the named type.
    pub fn strict(name: impl Into<String>) -> Self {
        Self::with_config(MockConfig::strict(name))
    }

    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            state: RefCell::new(MockState::default()),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Type name used in labels.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn behavior(&self) -> MockBehavior {
        self.config.behavior
    }

    // -----------------------------------------------------------------------
    // Declaration
    // -----------------------------------------------------------------------

    /// Declare behavior for calls to `member` selected by `matcher`.
    pub fn setup<A, R>(&self, member: &MemberRef<A, R>, matcher: Matcher<A>) -> Setup<A, R>
    where
        A: Args,
        R: 'static,
    {
        let label = member.render(&self.config.name, matcher.description());
        self.register(member, label, matcher)
    }

    /// Declare behavior for a property getter.
    pub fn setup_get<R: 'static>(&self, member: &MemberRef<(), R>) -> Setup<(), R> {
        debug_assert_eq!(member.kind(), MemberKind::Getter);
        self.setup(member, Matcher::any())
    }

    /// Declare behavior for a property setter receiving a value selected by
    /// `matcher`.
    pub fn setup_set<T>(&self, member: &MemberRef<(T,), ()>, matcher: Matcher<(T,)>) -> Setup<(T,), ()>
    where
        (T,): Args,
    {
        debug_assert_eq!(member.kind(), MemberKind::Setter);
        self.setup(member, matcher)
    }

    /// Declare behavior for subscriptions to an event.
    pub fn setup_add(&self, member: &MemberRef<(EventHandler,), ()>) -> Setup<(EventHandler,), ()> {
        debug_assert_eq!(member.kind(), MemberKind::EventAdd);
        self.setup(member, Matcher::any())
    }

    /// Declare behavior for unsubscriptions from an event.
    pub fn setup_remove(
        &self,
        member: &MemberRef<(EventHandler,), ()>,
    ) -> Setup<(EventHandler,), ()> {
        debug_assert_eq!(member.kind(), MemberKind::EventRemove);
        self.setup(member, Matcher::any())
    }

    /// Setups on protected members, addressed by name.
    pub fn protected(&self) -> ProtectedMock<'_> {
        ProtectedMock { mock: self }
    }

    /// Register a setup with a label rendered by the caller.
    pub(crate) fn register<A, R>(
        &self,
        member: &MemberRef<A, R>,
        label: String,
        matcher: Matcher<A>,
    ) -> Setup<A, R>
    where
        A: Args,
        R: 'static,
    {
        let setup = Setup::new(label, matcher);
        let state = setup.state();
        debug!(mock = %self.config.name, label = %setup.label(), "setup declared");

        self.state.borrow_mut().setups.push(Registration {
            key: member.dispatch_key(),
            setup: state.clone(),
            record: state,
        });
        setup
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Call `member` with `args`.
    ///
    /// A setup configured with `call_base` returns `R::default()` here; use
    /// [`invoke_with_base`](Self::invoke_with_base) to supply the real
    /// implementation.
    pub fn invoke<A, R>(&self, member: &MemberRef<A, R>, args: A) -> Result<R>
    where
        A: Args,
        R: Clone + Default + 'static,
    {
        self.invoke_with_base(member, args, |_| R::default())
    }

    /// Call `member` with `args`, running `base` if the matched setup
    /// delegates to the base implementation.
    pub fn invoke_with_base<A, R, F>(&self, member: &MemberRef<A, R>, args: A, base: F) -> Result<R>
    where
        A: Args,
        R: Clone + Default + 'static,
        F: FnOnce(&A) -> R,
    {
        let call = member.render(&self.config.name, &args.render());
        let invocation = Invocation::new(member, call);
        trace!(mock = %self.config.name, call = %invocation.call, "mock invoked");

        let setup = {
            let mut state = self.state.borrow_mut();
            state.history.push(invocation.call.clone());
            find_setup(&state.setups, member, &args)
        };

        let Some(setup) = setup else {
            return match self.config.behavior {
                MockBehavior::Strict => Err(MockError::NoSetup {
                    call: invocation.call,
                }),
                MockBehavior::Loose => Ok(R::default()),
            };
        };

        let resolution = setup.resolve(&invocation, &args, self.config.is_strict());
        for (event, payload) in &resolution.raises {
            self.raise(event, payload);
        }

        match resolution.result? {
            Reply::Value(value) => Ok(value),
            Reply::Default => Ok(R::default()),
            Reply::Base => Ok(base(&args)),
        }
    }

    /// Subscribe `handler` to `event`, dispatching the subscription like any
    /// other call first.
    pub fn subscribe(&self, event: &MemberRef<(EventHandler,), ()>, handler: EventHandler) -> Result<()> {
        self.invoke(event, (handler.clone(),))?;
        self.state
            .borrow_mut()
            .handlers
            .entry(event.name().to_string())
            .or_default()
            .push(handler);
        Ok(())
    }

    /// Remove `handler` from `event`.
    pub fn unsubscribe(&self, event: &MemberRef<(EventHandler,), ()>, handler: EventHandler) -> Result<()> {
        self.invoke(event, (handler.clone(),))?;
        if let Some(handlers) = self.state.borrow_mut().handlers.get_mut(event.name()) {
            handlers.retain(|h| !h.same_handler(&handler));
        }
        Ok(())
    }

    /// Invoke every handler subscribed to `event`. Returns how many ran.
    pub fn raise(&self, event: &str, payload: &str) -> usize {
        let handlers = self
            .state
            .borrow()
            .handlers
            .get(event)
            .cloned()
            .unwrap_or_default();

        debug!(mock = %self.config.name, event, handlers = handlers.len(), "event raised");
        for handler in &handlers {
            handler.call(payload);
        }
        handlers.len()
    }

    // -----------------------------------------------------------------------
    // Verification
    // -----------------------------------------------------------------------

    /// Fail if a setup marked `verifiable` was never matched.
    pub fn verify(&self) -> Result<()> {
        self.verify_where(|record| record.is_verifiable())
    }

    /// Fail if any setup was never matched.
    pub fn verify_all(&self) -> Result<()> {
        self.verify_where(|_| true)
    }

    fn verify_where(&self, selected: impl Fn(&dyn SetupRecord) -> bool) -> Result<()> {
        let state = self.state.borrow();
        let labels: Vec<String> = state
            .setups
            .iter()
            .map(|registration| registration.record.as_ref())
            .filter(|record| selected(*record) && record.hits() == 0)
            .map(|record| record.label().to_string())
            .collect();

        if labels.is_empty() {
            Ok(())
        } else {
            Err(MockError::Unverified { labels })
        }
    }

    /// Every call received so far, rendered, in call order.
    pub fn invocations(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Mock")
            .field("config", &self.config)
            .field("setups", &state.setups.len())
            .field("calls", &state.history.len())
            .finish()
    }
}

/// The most recently declared setup for `member` whose matcher accepts
/// `args`.
fn find_setup<A, R>(
    setups: &[Registration],
    member: &MemberRef<A, R>,
    args: &A,
) -> Option<Rc<SetupState<A, R>>>
where
    A: Args,
    R: Clone + 'static,
{
    let key = member.dispatch_key();
    setups
        .iter()
        .rev()
        .filter(|registration| registration.key == key)
        .filter_map(|registration| registration.setup.clone().downcast::<SetupState<A, R>>().ok())
        .find(|setup| setup.matches(args))
}

// ---------------------------------------------------------------------------
// Protected members
// ---------------------------------------------------------------------------

/// Declares setups on protected members by name.
pub struct ProtectedMock<'a> {
    mock: &'a Mock,
}

impl<'a> ProtectedMock<'a> {
    /// A method returning `R`. Use `R = ()` for methods without a result.
    pub fn setup<A, R>(&self, name: &str, matcher: Matcher<A>) -> Declared<Setup<A, R>>
    where
        A: Args,
        R: 'static,
    {
        let member = protected_member(name, MemberKind::Method)?;
        Ok(self.mock.setup(&member, matcher))
    }

    /// An instantiation of a generic method with explicit type arguments
    /// `G`, e.g. `(String,)` for `generic::<String>`.
    pub fn setup_generic<G, A, R>(&self, name: &str, matcher: Matcher<A>) -> Declared<Setup<A, R>>
    where
        G: TypeArgs,
        A: Args,
        R: 'static,
    {
        let member = protected_member::<A, R>(name, MemberKind::Method)?.with_type_args::<G>();
        Ok(self.mock.setup(&member, matcher))
    }

    /// A property getter.
    pub fn setup_get<R: 'static>(&self, name: &str) -> Declared<Setup<(), R>> {
        let member = protected_member(name, MemberKind::Getter)?;
        Ok(self.mock.setup(&member, Matcher::any()))
    }

    /// A property setter.
    pub fn setup_set<T>(&self, name: &str, matcher: Matcher<(T,)>) -> Declared<Setup<(T,), ()>>
    where
        (T,): Args,
    {
        let member = protected_member(name, MemberKind::Setter)?;
        Ok(self.mock.setup(&member, matcher))
    }

    /// Declare protected setups through the public shape of `analog`, an
    /// interface whose members mirror the protected ones by name.
    pub fn as_analog(&self, analog: impl Into<String>) -> ProtectedAsMock<'a> {
        ProtectedAsMock {
            mock: self.mock,
            analog: analog.into(),
        }
    }

    pub fn mock(&self) -> &'a Mock {
        self.mock
    }
}

/// Declares protected setups using members of an analog interface.
///
/// Labels render against the analog's name; calls are dispatched to the
/// protected member of the same name and kind.
pub struct ProtectedAsMock<'a> {
    mock: &'a Mock,
    analog: String,
}

impl<'a> ProtectedAsMock<'a> {
    pub fn setup<A, R>(&self, member: &MemberRef<A, R>, matcher: Matcher<A>) -> Setup<A, R>
    where
        A: Args,
        R: 'static,
    {
        let label = member.render(&self.analog, matcher.description());
        let protected = member.with_visibility(Visibility::Protected);
        self.mock.register(&protected, label, matcher)
    }

    pub fn setup_get<R: 'static>(&self, member: &MemberRef<(), R>) -> Setup<(), R> {
        self.setup(member, Matcher::any())
    }

    pub fn setup_set<T>(&self, member: &MemberRef<(T,), ()>, matcher: Matcher<(T,)>) -> Setup<(T,), ()>
    where
        (T,): Args,
    {
        self.setup(member, matcher)
    }

    pub fn analog(&self) -> &str {
        &self.analog
    }

    pub fn mock(&self) -> &'a Mock {
        self.mock
    }
}

fn protected_member<A, R>(name: &str, kind: MemberKind) -> Declared<MemberRef<A, R>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InvalidMember("member name must not be empty".into()));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(InvalidMember(format!(
            "'{name}' must not contain whitespace"
        )));
    }
    Ok(MemberRef::named(name, kind, Visibility::Protected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const METHOD: MemberRef<(String,), String> = MemberRef::method("method");
    const VOID: MemberRef<(), ()> = MemberRef::method("method");
    const GETTER: MemberRef<(), String> = MemberRef::getter("getter");
    const EVENT_ADD: MemberRef<(EventHandler,), ()> = MemberRef::event_add("event");
    const EVENT_REMOVE: MemberRef<(EventHandler,), ()> = MemberRef::event_remove("event");
    const PROTECTED: MemberRef<(String,), String> = MemberRef::protected_method("method");

    fn arg(s: &str) -> (String,) {
        (s.to_string(),)
    }

    #[test]
    fn loose_mock_returns_default_without_setup() {
        let mock = Mock::new("Mockable");
        assert_eq!(mock.invoke(&METHOD, arg("0")).unwrap(), "");
        assert_eq!(mock.invocations(), vec!["Mockable::method(\"0\")".to_string()]);
    }

    #[test]
    fn strict_mock_rejects_calls_without_setup() {
        let mock = Mock::strict("Mockable");
        let error = mock.invoke(&METHOD, arg("0")).unwrap_err();
        assert!(matches!(error, MockError::NoSetup { call } if call == "Mockable::method(\"0\")"));
    }

    #[test]
    fn strict_mock_requires_return_value_for_non_unit_setup() {
        let mock = Mock::strict("Mockable");
        mock.setup(&METHOD, Matcher::value("0".to_string()));
        mock.setup(&VOID, Matcher::any());

        assert!(matches!(
            mock.invoke(&METHOD, arg("0")),
            Err(MockError::MissingReturn { .. })
        ));
        mock.invoke(&VOID, ()).unwrap();
    }

    #[test]
    fn latest_matching_setup_wins() {
        let mock = Mock::new("Mockable");
        mock.setup(&METHOD, Matcher::any()).returns("any".into());
        mock.setup(&METHOD, Matcher::value("0".to_string()))
            .returns("zero".into());

        assert_eq!(mock.invoke(&METHOD, arg("0")).unwrap(), "zero");
        assert_eq!(mock.invoke(&METHOD, arg("1")).unwrap(), "any");
    }

    #[test]
    fn callback_runs_before_throw() {
        let called = Rc::new(Cell::new(false));
        let flag = called.clone();
        let mock = Mock::new("Mockable");
        mock.setup_get(&GETTER)
            .callback(move |_| flag.set(true))
            .throws("boom");

        let error = mock.invoke(&GETTER, ()).unwrap_err();
        assert_eq!(error.to_string(), "boom");
        assert!(called.get());
    }

    #[test]
    fn returns_with_sees_arguments() {
        let mock = Mock::new("Mockable");
        mock.setup(&METHOD, Matcher::any())
            .returns_with(|(a0,)| format!("echo {a0}"));
        assert_eq!(mock.invoke(&METHOD, arg("x")).unwrap(), "echo x");
    }

    #[test]
    fn call_base_uses_supplied_implementation() {
        let mock = Mock::new("Mockable");
        mock.setup(&METHOD, Matcher::any()).call_base();
        let result = mock
            .invoke_with_base(&METHOD, arg("x"), |_| "<default>".to_string())
            .unwrap();
        assert_eq!(result, "<default>");
    }

    #[test]
    fn unset_outcome_ignores_base_implementation() {
        let mock = Mock::new("Mockable");
        mock.setup(&METHOD, Matcher::any());
        let result = mock
            .invoke_with_base(&METHOD, arg("x"), |_| "<default>".to_string())
            .unwrap();
        assert_eq!(result, "");
    }

    #[test]
    fn at_most_limits_matches() {
        let mock = Mock::new("Mockable");
        mock.setup(&VOID, Matcher::any()).at_most_once();
        mock.invoke(&VOID, ()).unwrap();
        assert!(matches!(
            mock.invoke(&VOID, ()),
            Err(MockError::TooManyCalls { hits: 2, limit: 1, .. })
        ));
    }

    #[test]
    fn callback_error_is_returned_to_caller() {
        let mock = Mock::new("Mockable");
        let setup = mock.setup(&VOID, Matcher::any());
        crate::Stub::set_callback(
            &setup,
            crate::stub::into_callback::<(), _>(|_, _| Err(InvalidMember("nope".into()).into())),
        );

        let error = mock.invoke(&VOID, ()).unwrap_err();
        assert_eq!(
            error.downcast_callback::<InvalidMember>(),
            Some(&InvalidMember("nope".into()))
        );
    }

    #[test]
    fn callback_any_checks_signature_at_call_time() {
        let mock = Mock::new("Mockable");
        let seen = Rc::new(Cell::new(0));
        let sink = seen.clone();
        let typed: Box<dyn Fn(&(String,))> = Box::new(move |_| sink.set(sink.get() + 1));
        mock.setup(&METHOD, Matcher::value("0".to_string()))
            .callback_any(Rc::new(typed));
        mock.setup(&METHOD, Matcher::value("1".to_string()))
            .callback_any(Rc::new(42_u8));

        mock.invoke(&METHOD, arg("0")).unwrap();
        assert_eq!(seen.get(), 1);
        let error = mock.invoke(&METHOD, arg("1")).unwrap_err();
        assert!(matches!(
            error.downcast_callback::<MockError>(),
            Some(MockError::CallbackSignature { .. })
        ));
    }

    #[test]
    fn verify_reports_unmatched_verifiable_setups() {
        let mock = Mock::new("Mockable");
        mock.setup(&METHOD, Matcher::value("0".to_string())).verifiable();
        mock.setup(&METHOD, Matcher::value("1".to_string()));

        let error = mock.verify().unwrap_err();
        assert_eq!(
            error.to_string(),
            "mock verification failed, setups not matched: Mockable::method(\"0\")"
        );

        mock.invoke(&METHOD, arg("0")).unwrap();
        mock.verify().unwrap();
        assert!(mock.verify_all().is_err());
    }

    #[test]
    fn subscriptions_receive_raised_events() {
        let mock = Mock::new("Mockable");
        let count = Rc::new(Cell::new(0));
        let sink = count.clone();
        let handler = EventHandler::new(move |_| sink.set(sink.get() + 1));

        mock.subscribe(&EVENT_ADD, handler.clone()).unwrap();
        assert_eq!(mock.raise("event", "x"), 1);
        mock.unsubscribe(&EVENT_REMOVE, handler).unwrap();
        assert_eq!(mock.raise("event", "x"), 0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn raises_fire_after_callback() {
        let mock = Rc::new(Mock::new("Mockable"));
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = order.clone();
        mock.subscribe(&EVENT_ADD, EventHandler::new(move |p| log.borrow_mut().push(p.to_string())))
            .unwrap();
        let log = order.clone();
        mock.setup(&VOID, Matcher::any())
            .callback(move |_| log.borrow_mut().push("callback".into()))
            .raises("event", "raised");

        mock.invoke(&VOID, ()).unwrap();
        assert_eq!(*order.borrow(), vec!["callback".to_string(), "raised".to_string()]);
    }

    #[test]
    fn callback_may_reenter_the_mock() {
        let mock = Rc::new(Mock::new("Mockable"));
        let inner = mock.clone();
        mock.setup(&VOID, Matcher::any()).callback(move |_| {
            inner.invoke(&METHOD, arg("nested")).unwrap();
        });

        mock.invoke(&VOID, ()).unwrap();
        assert_eq!(
            mock.invocations(),
            vec![
                "Mockable::method()".to_string(),
                "Mockable::method(\"nested\")".to_string()
            ]
        );
    }

    #[test]
    fn protected_setups_dispatch_by_name() {
        let mock = Mock::new("Mockable");
        mock.protected()
            .setup::<(String,), String>("method", Matcher::value("0".to_string()))
            .unwrap()
            .returns("result".into());

        assert_eq!(mock.invoke(&PROTECTED, arg("0")).unwrap(), "result");
        assert_eq!(mock.invoke(&METHOD, arg("0")).unwrap(), "");
    }

    #[test]
    fn protected_setup_rejects_invalid_names() {
        let mock = Mock::new("Mockable");
        let protected = mock.protected();
        assert!(matches!(
            protected.setup::<(), ()>("  ", Matcher::any()),
            Err(InvalidMember(_))
        ));
        assert!(matches!(
            protected.setup_get::<String>("two words"),
            Err(InvalidMember(_))
        ));
        assert!(matches!(
            protected.setup_generic::<(i32,), (), ()>("", Matcher::any()),
            Err(InvalidMember(_))
        ));
    }

    #[test]
    fn protected_generic_instantiations_are_distinct() {
        let mock = Mock::new("Mockable");
        let protected = mock.protected();
        let ints = protected
            .setup_generic::<(i32,), (), String>("generic", Matcher::any())
            .unwrap()
            .returns("int".into());
        let strings = protected
            .setup_generic::<(String,), (), String>("generic", Matcher::any())
            .unwrap()
            .returns("string".into());

        assert_eq!(ints.label(), "Mockable::generic<i32>() -> String");
        assert_eq!(strings.label(), "Mockable::generic<String>() -> String");

        let member: MemberRef<(), String> = MemberRef::protected_method("generic");
        assert_eq!(mock.invoke(&member.with_type_args::<(i32,)>(), ()).unwrap(), "int");
        assert_eq!(
            mock.invoke(&member.with_type_args::<(String,)>(), ()).unwrap(),
            "string"
        );
        assert_eq!(mock.invoke(&member, ()).unwrap(), "");
    }

    #[test]
    fn protected_labels_tell_return_types_apart() {
        let mock = Mock::new("Mockable");
        let protected = mock.protected();
        let ints = protected.setup::<(), i32>("generic", Matcher::any()).unwrap();
        let strings = protected.setup::<(), String>("generic", Matcher::any()).unwrap();
        let unit = protected.setup::<(), ()>("generic", Matcher::any()).unwrap();

        assert_eq!(ints.label(), "Mockable::generic() -> i32");
        assert_eq!(strings.label(), "Mockable::generic() -> String");
        assert_eq!(unit.label(), "Mockable::generic()");
    }

    #[test]
    fn analog_setups_render_against_analog_name() {
        let mock = Mock::new("Mockable");
        let setup = mock
            .protected()
            .as_analog("IMockable")
            .setup(&METHOD, Matcher::value("0".to_string()))
            .returns("analog".into());

        assert_eq!(setup.label(), "IMockable::method(\"0\")");
        assert_eq!(mock.invoke(&PROTECTED, arg("0")).unwrap(), "analog");
        assert_eq!(setup.hits(), 1);
    }
}
