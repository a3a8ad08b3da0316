//! Operations on a resource.

use super::{collection, overlay, Outcome, COLLECTION_ALLOW};
use crate::context::Context;
use arbor_core::{Entity, Error, Method, Resource, Result, Status};
use std::sync::Arc;

pub(crate) async fn dispatch(ctx: &Context<'_>, resource: Arc<dyn Resource>) -> Result<Outcome> {
    let request = ctx.request;
    let identity = request.identity();
    let entity = Entity::Resource(resource.clone());

    match request.method() {
        Method::Get | Method::Head => {
            ctx.require(resource.is_readable(identity), "read", &entity)?;
            let representation = resource.representation(request).await?;
            Ok(Outcome::new(Status::Ok, entity, None).with_representation(representation))
        }
        // A hybrid resource accepts new children on behalf of its collection.
        Method::Post => match resource.child_collection() {
            Some(children) => collection::create(ctx, &children, Some(&resource), None).await,
            None => Err(Error::UnsupportedMethod(Method::Post)),
        },
        Method::Put => {
            ctx.require(resource.is_writable(identity), "write", &entity)?;
            let representation = ctx.body().await?;
            resource.set_representation(representation, request).await?;
            tracing::debug!(path = %entity.path(), "Resource replaced");
            Ok(Outcome::new(Status::Stored, entity, None))
        }
        Method::Patch => {
            ctx.require(resource.is_writable(identity), "write", &entity)?;
            let patch = ctx.body().await?;
            let current = resource.representation(request).await?;
            let merged = overlay(current, patch.fields(), ctx.config.permissive_merge)?;
            resource.set_representation(merged, request).await?;
            tracing::debug!(path = %entity.path(), fields = patch.len(), "Resource patched");
            Ok(Outcome::new(Status::Stored, entity, None))
        }
        Method::Delete => {
            ctx.require(resource.is_removable(identity), "remove", &entity)?;
            resource.remove(request).await?;
            tracing::debug!(path = %entity.path(), "Resource removed");
            Ok(Outcome::new(Status::Removed, entity, None))
        }
        Method::Options => {
            let grants = ctx.auth.granted_methods(&entity, None, Some(request)).await?;
            let children = resource.child_collection();
            let mut outcome = Outcome::new(Status::Ok, entity, None);
            outcome.allow(&grants);
            if let Some(children) = children {
                let child_grants = ctx
                    .auth
                    .granted_methods(&Entity::Collection(children), Some(&resource), Some(request))
                    .await?;
                outcome.headers.insert(COLLECTION_ALLOW, child_grants.header_value());
            }
            Ok(outcome)
        }
    }
}
