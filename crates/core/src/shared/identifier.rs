use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque detection-track token assigned by the upstream face detector.
///
/// Ordered lexicographically; this order is the canonical order used for
/// deterministic output and tie-breaking.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Identifier {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<u64> for Identifier {
    fn from(token: u64) -> Self {
        Self(token.to_string())
    }
}
