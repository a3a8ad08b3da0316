//! The CRUD state machine.
//!
//! Maps a resolved [`Target`] and the request method to an entity
//! operation. Handlers return an [`Outcome`]; the finalizer turns it into a
//! response.

mod collection;
mod resource;

use crate::context::Context;
use crate::resolver::Target;
use arbor_auth::GrantSet;
use arbor_core::{Entity, Error, Meta, Representation, Resource, Result, Status};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Header listing the methods granted on the addressed entity.
pub const ALLOW: &str = "Allow";
/// CORS header listing the methods granted on the addressed entity.
pub const ACCESS_CONTROL_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
/// Header listing the methods granted on a resource's child collection.
pub const COLLECTION_ALLOW: &str = "X-Collection-Allow";

/// What a handler produced, before content negotiation.
pub(crate) struct Outcome {
    pub status: Status,
    pub representation: Representation,
    pub headers: Meta,
    pub entity: Option<Entity>,
    pub parent: Option<Arc<dyn Resource>>,
}

impl Outcome {
    pub fn new(status: Status, entity: Entity, parent: Option<Arc<dyn Resource>>) -> Self {
        Self {
            status,
            representation: Representation::new(),
            headers: Meta::new(),
            entity: Some(entity),
            parent,
        }
    }

    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }

    /// Status-only outcome for a failed request, carrying the error body
    /// and any authentication challenges.
    pub fn from_error(error: Error) -> Self {
        let status = error.status();
        let mut headers = Meta::new();
        for scheme in error.schemes() {
            headers.append("WWW-Authenticate", scheme.challenge());
        }
        let (_, representation) = error.into_parts();
        Self {
            status,
            representation: representation.unwrap_or_default(),
            headers,
            entity: None,
            parent: None,
        }
    }

    fn allow(&mut self, grants: &GrantSet) {
        let methods = grants.header_value();
        self.headers.insert(ALLOW, methods.clone());
        self.headers.insert(ACCESS_CONTROL_ALLOW_METHODS, methods);
    }
}

/// Run the operation the request method selects on `target`.
pub(crate) async fn dispatch(ctx: &Context<'_>, target: Target) -> Result<Outcome> {
    match target {
        Target::Resource(resource) => resource::dispatch(ctx, resource).await,
        Target::Collection {
            collection,
            parent,
            unresolved,
        } => collection::dispatch(ctx, collection, parent, unresolved).await,
    }
}

/// Apply a partial update to a current representation.
///
/// Unless `permissive`, every patched field must already exist.
pub(crate) fn overlay(
    current: Representation,
    patch: &Map<String, Value>,
    permissive: bool,
) -> Result<Representation> {
    let mut merged = Representation::from_fields(current.into_fields());
    for (key, value) in patch {
        if !permissive && !merged.contains_key(key) {
            return Err(Error::FormatError(format!("unknown field '{}'", key)));
        }
        merged.insert(key.clone(), value.clone());
    }
    Ok(merged)
}
