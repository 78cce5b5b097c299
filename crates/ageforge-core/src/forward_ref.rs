//! Deferred symbolic links between target-model objects.
//!
//! A [`ForwardRef`] names *who* is referenced (an owning group plus the
//! reference name of one of its Raw API Objects), never *where* that object
//! ends up. It is resolved only by the link pass once every object exists;
//! see [`crate::link`].

use crate::id::GroupRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic handle to a Raw API Object that may not be registered yet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ForwardRef {
    pub owner: GroupRef,
    pub target: String,
}

impl ForwardRef {
    pub fn new(owner: GroupRef, target: impl Into<String>) -> Self {
        Self {
            owner,
            target: target.into(),
        }
    }
}

impl fmt::Display for ForwardRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.target)
    }
}

/// Where a Raw API Object lives in the target namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// A concrete, dot-separated namespace path such as `data.civ.britons`.
    Path(String),
    /// Nested inside another, possibly unfinished, object.
    Nested(ForwardRef),
}

impl Location {
    pub fn path(path: impl Into<String>) -> Self {
        Location::Path(path.into())
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}
