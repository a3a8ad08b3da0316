//! Authorizer contract.

use arbor_core::{Entity, Method, Request, Resource, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Decides whether a request may touch an entity.
///
/// `parent` is the resource owning the entity when the entity is a
/// collection.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Approve or reject `request` against `entity`.
    ///
    /// # Errors
    ///
    /// A rejection (typically [`arbor_core::Error::Unauthorized`]) fails the
    /// request.
    async fn authorize(
        &self,
        request: &Request,
        entity: &Entity,
        parent: Option<&Arc<dyn Resource>>,
    ) -> Result<()>;

    /// Methods this authorizer grants on `entity`.
    async fn granted_methods(
        &self,
        entity: &Entity,
        parent: Option<&Arc<dyn Resource>>,
        request: Option<&Request>,
    ) -> Result<Vec<Method>>;
}
