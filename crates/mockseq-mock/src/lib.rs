//! Stub contract and in-memory reference mock for MockSeq.
//!
//! The sequence adapter only needs two things from a mocking framework: a
//! stable, human-readable label for every setup and a callback slot that runs
//! synchronously on each matched call. Those are captured by the [`Stub`]
//! trait. Everything else here is a small reference implementation of that
//! contract, suitable for tests and embedding:
//!
//! - [`Mock`]: dispatches calls to the most recent matching [`Setup`]
//! - [`MemberRef`]: typed, opaque handle naming a mocked member
//! - [`Matcher`]: argument matching with a rendered description
//! - [`MockConfig`] / [`MockBehavior`]: loose or strict dispatch
//!
//! ```rust
//! use mockseq_mock::{Matcher, MemberRef, Mock};
//!
//! const GREET: MemberRef<(String,), String> = MemberRef::method("greet");
//!
//! let mock = Mock::new("Greeter");
//! let setup = mock
//!     .setup(&GREET, Matcher::value("ada".to_string()))
//!     .returns("hello ada".to_string());
//!
//! assert_eq!(setup.label(), "Greeter::greet(\"ada\")");
//! assert_eq!(mock.invoke(&GREET, ("ada".to_string(),)).unwrap(), "hello ada");
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod matcher;
pub mod member;
pub mod mock;
pub mod setup;
pub mod stub;

pub use config::{MockBehavior, MockConfig};
pub use error::{CallbackError, Declared, InvalidMember, MockError, Result};
pub use event::EventHandler;
pub use matcher::{Args, Matcher};
pub use member::{short_type_name, MemberKind, MemberRef, TypeArgs, Visibility};
pub use mock::{Mock, ProtectedAsMock, ProtectedMock};
pub use setup::Setup;
pub use stub::{into_callback, Callback, Invocation, Stub};
