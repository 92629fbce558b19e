use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque correlation key published by one widget and consumed by another.
///
/// Carries an identifier only, never shared mutable state: a consumer that
/// receives a key re-fetches or re-derives whatever it needs from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionKey(String);

impl SelectionKey {
    /// Wraps a row identifier.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SelectionKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
