//! Transport-agnostic attribute bags.

use crate::{Meta, Status};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Keys a listing item owns. Merged child fields never overwrite them.
pub const RESERVED_LISTING_KEYS: [&str; 4] = ["_id", "_href", "_collection", "_permissions"];

/// Ordered key/value map produced and consumed by entities, plus response
/// hints (status override, meta headers, redirect policy, preferred output
/// types).
#[derive(Debug, Clone, PartialEq)]
pub struct Representation {
    fields: Map<String, Value>,
    status: Option<Status>,
    meta: Meta,
    allow_redirect: bool,
    preferred_output_types: Vec<String>,
}

impl Default for Representation {
    fn default() -> Self {
        Self {
            fields: Map::new(),
            status: None,
            meta: Meta::new(),
            allow_redirect: true,
            preferred_output_types: Vec::new(),
        }
    }
}

impl Representation {
    /// Create an empty representation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing field map.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Build from a JSON value; only objects qualify.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self::from_fields(fields)),
            other => Err(crate::Error::FormatError(format!(
                "expected an object, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// The fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume into the field map.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Whether a field is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Set a field. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Remove a field, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// Iterate over fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy every field of `other` whose key is not reserved for listings.
    /// When `only` is given, just those keys are copied.
    pub fn merge_unreserved(&mut self, other: &Representation, only: Option<&[String]>) {
        for (key, value) in other.iter() {
            if RESERVED_LISTING_KEYS.contains(&key.as_str()) {
                continue;
            }
            if let Some(only) = only {
                if !only.iter().any(|k| k == key) {
                    continue;
                }
            }
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Status override.
    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Override the status the response is produced with.
    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    /// Builder form of [`Representation::set_status`].
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Headers merged into the response.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Mutable headers.
    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    /// Whether a `Location` header may be sent.
    pub fn allow_redirect(&self) -> bool {
        self.allow_redirect
    }

    /// Allow or forbid `Location` on the response.
    pub fn set_allow_redirect(&mut self, allow: bool) {
        self.allow_redirect = allow;
    }

    /// Output types this representation prefers, best first.
    pub fn preferred_output_types(&self) -> &[String] {
        &self.preferred_output_types
    }

    /// Declare preferred output types, best first.
    pub fn set_preferred_output_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_output_types = types.into_iter().map(Into::into).collect();
    }
}

impl Serialize for Representation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

impl From<Map<String, Value>> for Representation {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
