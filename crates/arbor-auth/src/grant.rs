//! Grant sets.

use arbor_core::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Methods a caller may invoke on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantSet(BTreeSet<Method>);

impl GrantSet {
    /// No methods.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every supported method.
    pub fn full() -> Self {
        Self(Method::ALL.into_iter().collect())
    }

    /// Whether `method` is granted.
    pub fn contains(&self, method: Method) -> bool {
        self.0.contains(&method)
    }

    /// Whether any of `methods` is granted.
    pub fn contains_any(&self, methods: &[Method]) -> bool {
        methods.iter().any(|m| self.contains(*m))
    }

    /// Methods granted by both sets.
    #[must_use]
    pub fn intersect(&self, other: &GrantSet) -> GrantSet {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    /// Methods granted by either set.
    #[must_use]
    pub fn union(&self, other: &GrantSet) -> GrantSet {
        Self(self.0.union(&other.0).copied().collect())
    }

    /// Granted methods in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Method> + '_ {
        self.0.iter().copied()
    }

    /// Number of granted methods.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is granted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Comma-separated list for `Allow`-style headers.
    pub fn header_value(&self) -> String {
        self.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl FromIterator<Method> for GrantSet {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for GrantSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_value())
    }
}
