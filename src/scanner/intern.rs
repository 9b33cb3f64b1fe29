//! MatchTag interning
//!
//! Tags are compared on every typed range query, so they are interned once in
//! a process-wide `lasso` interner and carried around as a `Spur`.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

static INTERNER: OnceLock<ThreadedRodeo> = OnceLock::new();

fn interner() -> &'static ThreadedRodeo {
    INTERNER.get_or_init(ThreadedRodeo::default)
}

/// Names the category of a match (which detector produced it).
///
/// Two tags are equal iff their strings are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchTag(Spur);

impl MatchTag {
    pub fn new(name: &str) -> Self {
        MatchTag(interner().get_or_intern(name))
    }

    /// Resolved name. `'static` because interned strings live forever.
    pub fn as_str(&self) -> &'static str {
        interner().resolve(&self.0)
    }
}

impl fmt::Debug for MatchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchTag({:?})", self.as_str())
    }
}

impl fmt::Display for MatchTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MatchTag {
    fn from(name: &str) -> Self {
        MatchTag::new(name)
    }
}

impl Serialize for MatchTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MatchTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(MatchTag::new(&name))
    }
}

// =============================================================================
// Tests
// =============================================================================
