//! Strongly typed identifier wrappers.
//!
//! Map-derived ids (`NodeId`, `WayId`) wrap the source map's signed 64-bit
//! identifiers and are `Copy + Ord + Hash`.  Agent ids are opaque strings
//! chosen by remote clients, so `AgentId` owns its text.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Identifier of a map node, as assigned by the source map.
    pub struct NodeId(i64);
}

typed_id! {
    /// Identifier of a map way, as assigned by the source map.
    pub struct WayId(i64);
}

// ── AgentId ───────────────────────────────────────────────────────────────────

/// Client-chosen agent identifier.
///
/// Always non-empty and free of whitespace, since the line protocol splits
/// requests on spaces.  Construct with [`AgentId::new`] or `str::parse`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct AgentId(String);

impl AgentId {
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        if raw.is_empty() || raw.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidAgentId(raw));
        }
        Ok(AgentId(raw))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AgentId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentId::new(s)
    }
}

impl TryFrom<String> for AgentId {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        AgentId::new(raw)
    }
}

impl From<AgentId> for String {
    fn from(id: AgentId) -> String {
        id.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
