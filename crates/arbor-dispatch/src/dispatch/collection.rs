//! Operations on a collection.

use super::{overlay, Outcome};
use crate::context::Context;
use crate::listing;
use arbor_core::{
    resource_path, Collection, Entity, Error, Method, Representation, Resource, Result, Status,
};
use futures::future::join_all;
use std::sync::Arc;

pub(crate) async fn dispatch(
    ctx: &Context<'_>,
    collection: Arc<dyn Collection>,
    parent: Option<Arc<dyn Resource>>,
    unresolved: Option<String>,
) -> Result<Outcome> {
    let request = ctx.request;
    let identity = request.identity();

    // PUT to a missing child creates it under that name.
    if let Some(name) = unresolved {
        if request.method() != Method::Put {
            return Err(Error::not_found(name));
        }
        return create(ctx, &collection, parent.as_ref(), Some(&name)).await;
    }

    let entity = Entity::Collection(collection.clone());
    match request.method() {
        Method::Get | Method::Head => {
            ctx.require(collection.is_browsable(identity), "browse", &entity)?;
            let listing = listing::build(ctx, &collection).await?;
            Ok(Outcome::new(Status::Ok, entity, parent).with_representation(listing))
        }
        Method::Post => create(ctx, &collection, parent.as_ref(), None).await,
        Method::Put => {
            ctx.require(collection.is_writable(identity), "write", &entity)?;
            replace_children(ctx, &collection, true).await?;
            Ok(Outcome::new(Status::Stored, entity, parent))
        }
        Method::Patch => {
            ctx.require(collection.is_writable(identity), "write", &entity)?;
            replace_children(ctx, &collection, false).await?;
            Ok(Outcome::new(Status::Stored, entity, parent))
        }
        Method::Delete => {
            ctx.require(collection.is_removable(identity), "remove", &entity)?;
            collection.remove(request).await?;
            tracing::debug!(path = %entity.path(), "Collection removed");
            Ok(Outcome::new(Status::Removed, entity, parent))
        }
        Method::Options => {
            let grants = ctx
                .auth
                .granted_methods(&entity, parent.as_ref(), Some(request))
                .await?;
            let mut outcome = Outcome::new(Status::Ok, entity, parent);
            outcome.allow(&grants);
            Ok(outcome)
        }
    }
}

/// Create a child from the request body and point `Location` at it.
pub(crate) async fn create(
    ctx: &Context<'_>,
    collection: &Arc<dyn Collection>,
    parent: Option<&Arc<dyn Resource>>,
    name: Option<&str>,
) -> Result<Outcome> {
    let entity = Entity::Collection(collection.clone());
    ctx.require(collection.is_writable(ctx.request.identity()), "write", &entity)?;

    let representation = ctx.body().await?;
    let child = collection
        .create_child(representation, name, ctx.request)
        .await?;
    let location = ctx.href(&resource_path(child.as_ref()));
    tracing::debug!(location = %location, "Child created");

    let mut outcome = Outcome::new(Status::Created, entity, parent.cloned());
    outcome.headers.insert("Location", location);
    Ok(outcome)
}

enum ChildOp {
    Update(Arc<dyn Resource>, Representation),
    Remove(Arc<dyn Resource>),
    Create(String, Representation),
}

/// Apply a `{name: fields}` body to every child at once.
///
/// Named children are patched and missing ones created. With `prune`,
/// children the body does not name are removed. All operations run
/// concurrently; the most severe failure is reported.
async fn replace_children(
    ctx: &Context<'_>,
    collection: &Arc<dyn Collection>,
    prune: bool,
) -> Result<()> {
    let body = ctx.body().await?;
    let mut wanted = body
        .into_fields()
        .into_iter()
        .map(|(name, value)| Representation::from_value(value).map(|rep| (name, rep)))
        .collect::<Result<Vec<_>>>()?;

    let mut ops = Vec::new();
    for child in collection.children(ctx.request).await? {
        let name = child.name();
        match wanted.iter().position(|(wanted_name, _)| *wanted_name == name) {
            Some(index) => {
                let (_, representation) = wanted.remove(index);
                ops.push(ChildOp::Update(child, representation));
            }
            None if prune => ops.push(ChildOp::Remove(child)),
            None => {}
        }
    }
    ops.extend(
        wanted
            .into_iter()
            .map(|(name, representation)| ChildOp::Create(name, representation)),
    );

    tracing::debug!(operations = ops.len(), prune, "Applying collection body");
    let results = join_all(ops.into_iter().map(|op| apply(ctx, collection, op))).await;

    let mut worst: Option<Error> = None;
    for error in results.into_iter().filter_map(|r| r.err()) {
        let replace = worst
            .as_ref()
            .map_or(true, |w| error.status().severity() > w.status().severity());
        if replace {
            worst = Some(error);
        }
    }
    match worst {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

async fn apply(ctx: &Context<'_>, collection: &Arc<dyn Collection>, op: ChildOp) -> Result<()> {
    let request = ctx.request;
    let identity = request.identity();
    match op {
        ChildOp::Update(child, patch) => {
            let entity = Entity::Resource(child.clone());
            ctx.require(child.is_writable(identity), "write", &entity)?;
            let current = child.representation(request).await?;
            let merged = overlay(current, patch.fields(), ctx.config.permissive_merge)?;
            child.set_representation(merged, request).await
        }
        ChildOp::Remove(child) => {
            let entity = Entity::Resource(child.clone());
            ctx.require(child.is_removable(identity), "remove", &entity)?;
            child.remove(request).await
        }
        ChildOp::Create(name, representation) => collection
            .create_child(representation, Some(&name), request)
            .await
            .map(|_| ()),
    }
}
