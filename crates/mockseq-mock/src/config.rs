use serde::{Deserialize, Serialize};

/// How a [`Mock`](crate::Mock) answers calls it has no usable setup for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MockBehavior {
    /// Unmatched calls return `Default::default()`.
    #[default]
    Loose,
    /// Unmatched calls fail, and matched non-unit calls must have a
    /// configured return value.
    Strict,
}

/// Configuration for a [`Mock`](crate::Mock).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockConfig {
    /// Type name used when rendering setup labels, e.g. `Mockable`.
    pub name: String,
    /// Dispatch behavior for unmatched calls.
    #[serde(default)]
    pub behavior: MockBehavior,
}

impl MockConfig {
    /// A loose mock of the named type.
    pub fn loose(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: MockBehavior::Loose,
        }
    }

    /// A strict mock of the named type.
    pub fn strict(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: MockBehavior::Strict,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.behavior == MockBehavior::Strict
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self::loose("Mock")
    }
}
