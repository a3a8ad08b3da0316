//! Caller identities and authentication schemes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identifier of the caller (user name, key id, ...).
    pub id: String,
    /// Free-form claims supplied by the authenticator.
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Identity {
    /// Create an identity without claims.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Add a claim.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up a claim.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// An authentication scheme offered to callers, rendered into
/// `WWW-Authenticate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthScheme {
    /// Scheme name, e.g. `Basic` or `Bearer`.
    pub scheme: String,
    /// Protection realm.
    pub realm: String,
}

impl AuthScheme {
    /// Create a scheme.
    pub fn new(scheme: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            realm: realm.into(),
        }
    }

    /// Value of a `WWW-Authenticate` header for this scheme.
    pub fn challenge(&self) -> String {
        format!("{} realm=\"{}\"", self.scheme, self.realm.replace('"', "\\\""))
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.challenge())
    }
}
