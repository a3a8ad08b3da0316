//! Tri-state permission predicates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Answer of an entity permission predicate.
///
/// `Unknown` is only meaningful for anonymous callers: it asks the caller to
/// authenticate instead of refusing outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// The operation is permitted.
    Allow,
    /// The operation is refused.
    Deny,
    /// The entity cannot decide without an identity.
    Unknown,
}

impl Permission {
    /// Build a permission from a plain boolean.
    pub fn from_bool(allowed: bool) -> Self {
        if allowed {
            Permission::Allow
        } else {
            Permission::Deny
        }
    }

    /// Whether the operation is permitted.
    pub fn is_allowed(&self) -> bool {
        *self == Permission::Allow
    }
}

impl From<bool> for Permission {
    fn from(allowed: bool) -> Self {
        Self::from_bool(allowed)
    }
}

impl Default for Permission {
    fn default() -> Self {
        Permission::Allow
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Allow => write!(f, "allow"),
            Permission::Deny => write!(f, "deny"),
            Permission::Unknown => write!(f, "unknown"),
        }
    }
}
