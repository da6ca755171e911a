use core::borrow::Borrow;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque card identifier. Ordering is alphabetical by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(String);

impl Card {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Card {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Card {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for Card {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Card {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
