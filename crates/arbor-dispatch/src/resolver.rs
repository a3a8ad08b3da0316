//! Path resolution.
//!
//! Walks a slash-separated tree path one segment at a time, asking each
//! collection for the named child. Every lookup goes through
//! [`Collection::child`], so a collection backed by a store pays one query
//! per segment and never enumerates its children.

use arbor_core::{Collection, Entity, Error, Method, Request, Resource, Result};
use percent_encoding::percent_decode_str;
use std::fmt;
use std::sync::Arc;

/// Result of resolving a tree path.
#[derive(Clone, Default)]
pub struct Resolution {
    /// The resource the path names, or the owner of `collection`.
    pub resource: Option<Arc<dyn Resource>>,
    /// The collection the path names, if it names one.
    pub collection: Option<Arc<dyn Collection>>,
    /// Final segment that named no child of `collection` (`PUT` only).
    pub unresolved: Option<String>,
}

impl Resolution {
    fn resource(resource: Arc<dyn Resource>) -> Self {
        Self {
            resource: Some(resource),
            ..Self::default()
        }
    }

    fn collection(
        owner: Option<Arc<dyn Resource>>,
        collection: Arc<dyn Collection>,
        unresolved: Option<String>,
    ) -> Self {
        Self {
            resource: owner,
            collection: Some(collection),
            unresolved,
        }
    }

    /// The entity a request addressed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an empty resolution.
    pub fn into_target(self) -> Result<Target> {
        match (self.resource, self.collection) {
            (parent, Some(collection)) => Ok(Target::Collection {
                collection,
                parent,
                unresolved: self.unresolved,
            }),
            (Some(resource), None) => Ok(Target::Resource(resource)),
            (None, None) => Err(Error::not_found("empty resolution")),
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolution")
            .field("resource", &self.resource.as_ref().map(|r| r.name()))
            .field("collection", &self.collection.is_some())
            .field("unresolved", &self.unresolved)
            .finish()
    }
}

/// The entity a request is dispatched to.
#[derive(Clone)]
pub enum Target {
    /// A resource.
    Resource(Arc<dyn Resource>),
    /// A collection, with the resource owning it and, for an upsert, the
    /// name of the child to create.
    Collection {
        /// The collection.
        collection: Arc<dyn Collection>,
        /// Resource owning the collection; `None` for a root collection.
        parent: Option<Arc<dyn Resource>>,
        /// Name of a child that does not exist yet.
        unresolved: Option<String>,
    },
}

impl Target {
    /// The addressed entity.
    pub fn entity(&self) -> Entity {
        match self {
            Target::Resource(resource) => Entity::Resource(resource.clone()),
            Target::Collection { collection, .. } => Entity::Collection(collection.clone()),
        }
    }

    /// Resource owning the addressed collection.
    pub fn parent(&self) -> Option<&Arc<dyn Resource>> {
        match self {
            Target::Resource(_) => None,
            Target::Collection { parent, .. } => parent.as_ref(),
        }
    }
}

/// Resolve `path` against `root`.
///
/// - `""` or `"/"` names the root.
/// - A trailing slash names the collection of the preceding resource.
/// - Under `PUT`, a missing final child resolves to its collection with
///   the name left unresolved, so the dispatcher can create it. Only a
///   [`Error::NotFound`] lookup counts as missing; any other lookup failure
///   is reported as not found rather than turned into a create.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for any other failed lookup and
/// [`Error::ClientError`] for a malformed segment.
pub async fn resolve(root: &Entity, path: &str, request: &Request) -> Result<Resolution> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Ok(match root {
            Entity::Resource(resource) => Resolution::resource(resource.clone()),
            Entity::Collection(collection) => Resolution::collection(None, collection.clone(), None),
        });
    }

    let (mut owner, mut current) = match root {
        Entity::Resource(resource) => (
            Some(resource.clone()),
            resource
                .child_collection()
                .ok_or_else(|| Error::not_found(path))?,
        ),
        Entity::Collection(collection) => (None, collection.clone()),
    };

    let segments: Vec<&str> = trimmed.split('/').collect();
    let last = segments.len() - 1;

    for (index, raw) in segments.into_iter().enumerate() {
        if raw.is_empty() {
            if index == last {
                return Ok(Resolution::collection(owner, current, None));
            }
            return Err(Error::not_found(path));
        }

        let name = decode_segment(raw)?;
        let child = match current.child(&name, request).await {
            Ok(child) => child,
            Err(e)
                if index == last
                    && request.method() == Method::Put
                    && matches!(e.kind(), Error::NotFound(_)) =>
            {
                tracing::debug!(segment = %name, "Unresolved final segment kept for upsert");
                return Ok(Resolution::collection(owner, current, Some(name)));
            }
            Err(e) => {
                tracing::debug!(segment = %name, error = %e, "Path lookup failed");
                return Err(Error::not_found(path));
            }
        };

        if index == last {
            return Ok(Resolution::resource(child));
        }
        current = child
            .child_collection()
            .ok_or_else(|| Error::not_found(path))?;
        owner = Some(child);
    }

    Err(Error::not_found(path))
}

/// Percent-decode one path segment.
fn decode_segment(raw: &str) -> Result<String> {
    let malformed = || Error::ClientError(format!("malformed path segment '{}'", raw));

    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(malformed());
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| malformed())
}
