//! Collection listings.
//!
//! A listing is built in three phases:
//!
//! 1. Names filter, search, sort, and slice are offered to an
//!    [`ExtendedCollection`] before the children are fetched. Parameters
//!    are reset right after the fetch, whether it succeeded or not.
//! 2. Every child gets a stub (`_id`, `_href`, `_collection`,
//!    `_permissions`), optionally expanded with its own fields. Children
//!    are processed concurrently.
//! 3. Whatever the collection declined is applied in memory, each step
//!    noted in the performance header.
//!
//! [`ExtendedCollection`]: arbor_core::ExtendedCollection

use crate::context::Context;
use crate::pagination::PageLinks;
use crate::query::ListingQuery;
use arbor_core::{
    collection_path, resource_path, Collection, Entity, Expansion, Method, Representation,
    Resource, Result, SortOrder,
};
use futures::future::join_all;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::sync::Arc;

/// Listing type marker.
pub const LISTING_TYPE: &str = "listing";

/// Work the collection did not take over.
#[derive(Debug, Clone, Copy)]
struct Pending {
    names: bool,
    search: bool,
    sort: bool,
    slice: bool,
}

impl Pending {
    fn from_query(query: &ListingQuery) -> Self {
        Self {
            names: query.names.is_some(),
            search: query.search.is_some(),
            sort: query.sort.is_some(),
            slice: query.is_sliced(),
        }
    }

    fn filters(&self) -> bool {
        self.names || self.search || self.sort
    }
}

/// Build the listing representation of `collection`.
pub(crate) async fn build(ctx: &Context<'_>, collection: &Arc<dyn Collection>) -> Result<Representation> {
    let query = ListingQuery::from_request(ctx.request, ctx.config.max_limit)?;
    let mut pending = Pending::from_query(&query);
    let (children, source_total) = fetch(ctx, collection, &query, &mut pending).await?;

    let expansion = query
        .expand
        .clone()
        .unwrap_or_else(|| collection.listing_expansion());
    let mut items = join_all(
        children
            .iter()
            .map(|child| item(ctx, collection, child, &expansion)),
    )
    .await;

    let mut warnings = Vec::new();
    if pending.names {
        if let Some(names) = &query.names {
            items.retain(|item| {
                item.get("_id")
                    .and_then(Value::as_str)
                    .is_some_and(|id| names.iter().any(|n| n == id))
            });
            warnings.push("names filtered in memory");
        }
    }
    if pending.search {
        if let Some(phrase) = &query.search {
            let needle = phrase.to_lowercase();
            items.retain(|item| matches_search(item, &needle));
            warnings.push("search applied in memory");
        }
    }
    if pending.sort {
        if let Some(field) = &query.sort {
            items.sort_by(|a, b| compare_field(a.get(field), b.get(field), query.order));
            warnings.push("sort applied in memory");
        }
    }

    let sliced_at_source = query.is_sliced() && !pending.slice;
    let total = if sliced_at_source {
        if source_total.is_none() {
            tracing::warn!("Collection sliced its children but reported no total");
        }
        source_total
    } else {
        Some(items.len())
    };
    if pending.slice {
        items = items
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();
        warnings.push("pagination applied in memory");
    }

    let page_len = items.len();
    tracing::debug!(
        items = page_len,
        total = ?total,
        in_memory = warnings.len(),
        "Listing built"
    );

    let mut listing = Representation::new();
    listing.insert("type", LISTING_TYPE);
    listing.insert("total", total);
    listing.insert("idAttribute", collection.name_attribute());
    listing.insert(
        "items",
        Value::Array(
            items
                .into_iter()
                .map(|item| Value::Object(item.into_fields()))
                .collect(),
        ),
    );

    if !warnings.is_empty() {
        listing
            .meta_mut()
            .insert(ctx.config.performance_header.as_str(), warnings.join("; "));
    }
    if let Some(limit) = query.limit {
        let base_url = ctx.href(&collection_path(collection.as_ref()));
        let params = ctx.request.query_pairs();
        let links = match total {
            Some(total) => PageLinks::new(&base_url, params, query.offset, limit, total),
            None => {
                PageLinks::open_ended(&base_url, params, query.offset, limit, page_len >= limit)
            }
        };
        if let Some(link) = links.to_header_value() {
            listing.meta_mut().insert("Link", link);
        }
    }
    Ok(listing)
}

/// Offer the query to the collection, then fetch its children.
async fn fetch(
    ctx: &Context<'_>,
    collection: &Arc<dyn Collection>,
    query: &ListingQuery,
    pending: &mut Pending,
) -> Result<(Vec<Arc<dyn Resource>>, Option<usize>)> {
    let Some(extended) = collection.as_extended() else {
        return Ok((collection.children(ctx.request).await?, None));
    };

    if let Some(names) = &query.names {
        pending.names = !extended.set_names(names);
    }
    if let Some(phrase) = &query.search {
        pending.search = !extended.set_search_phrase(phrase);
    }
    if let Some(field) = &query.sort {
        pending.sort = !extended.set_sort(field, query.order);
    }
    // Slicing at the source is only sound once every filter ran there, and
    // only useful when the unsliced total comes back with the page.
    if pending.slice && !pending.filters() && extended.reports_total() {
        pending.slice = !extended.set_slice(query.offset, query.limit);
    }

    let fetched = collection.children(ctx.request).await;
    let total = extended.total();
    extended.reset_parameters();
    Ok((fetched?, total))
}

/// Stub for one child, refined by grants and optionally expanded.
async fn item(
    ctx: &Context<'_>,
    collection: &Arc<dyn Collection>,
    child: &Arc<dyn Resource>,
    expansion: &Expansion,
) -> Representation {
    let request = ctx.request;
    let identity = request.identity();
    let name = child.name();
    let children = child.child_collection();

    let mut read = child.is_readable(identity).is_allowed();
    let mut write = child.is_writable(identity).is_allowed();
    let mut delete = child.is_removable(identity).is_allowed();

    if ctx.auth.has_authorizers() {
        let resource_entity = Entity::Resource(child.clone());
        let collection_entity = children.clone().map(Entity::Collection);
        let (resource_grants, collection_grants) = futures::join!(
            ctx.auth.granted_methods(&resource_entity, None, Some(request)),
            async {
                match &collection_entity {
                    Some(entity) => Some(ctx.auth.granted_methods(entity, Some(child), Some(request)).await),
                    None => None,
                }
            }
        );

        match resource_grants {
            Ok(mut grants) => {
                match collection_grants {
                    Some(Ok(extra)) => grants = grants.union(&extra),
                    Some(Err(e)) => {
                        tracing::debug!(child = %name, error = %e, "Child collection grants unavailable");
                    }
                    None => {}
                }
                read &= grants.contains(Method::Get);
                write &= grants.contains_any(&[Method::Put, Method::Patch, Method::Post]);
                delete &= grants.contains(Method::Delete);
            }
            Err(e) => {
                tracing::debug!(child = %name, error = %e, "Child grants unavailable");
            }
        }
    }

    let mut stub = Representation::new();
    stub.insert("_id", name.clone());
    stub.insert("_href", ctx.href(&resource_path(child.as_ref())));
    stub.insert("_collection", children.is_some());
    stub.insert(
        "_permissions",
        json!({"read": read, "write": write, "delete": delete}),
    );
    stub.insert(collection.name_attribute(), name.clone());

    if !read {
        return stub;
    }

    let expanded = match collection.as_child_representation() {
        Some(source) => Some(source.child_representation(child, request).await),
        None if expansion.is_requested() => Some(child.representation(request).await),
        None => None,
    };
    match expanded {
        Some(Ok(representation)) => stub.merge_unreserved(&representation, expansion.only()),
        Some(Err(e)) => {
            tracing::debug!(child = %name, error = %e, "Listing expansion failed");
        }
        None => {}
    }
    stub
}

/// Case-insensitive substring match over `_id` and every scalar field.
fn matches_search(item: &Representation, needle: &str) -> bool {
    item.iter().any(|(key, value)| {
        if key.starts_with('_') && key != "_id" {
            return false;
        }
        match value {
            Value::String(s) => s.to_lowercase().contains(needle),
            Value::Number(n) => n.to_string().contains(needle),
            _ => false,
        }
    })
}

/// Order two field values; missing values always sort last.
fn compare_field(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };
    let ordering = match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .zip(y.as_f64())
            .and_then(|(x, y)| x.partial_cmp(&y))
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        // Numbers before strings before anything else.
        (x, y) => rank(x).cmp(&rank(y)),
    };
    match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rep(value: Value) -> Representation {
        Representation::from_value(value).unwrap()
    }

    #[test]
    fn test_search_matches_id_and_scalars() {
        let item = rep(json!({"_id": "alice", "_href": "/users/bob", "age": 42, "tags": ["x"]}));
        assert!(matches_search(&item, "ali"));
        assert!(matches_search(&item, "42"));
        assert!(!matches_search(&item, "bob"));
        assert!(!matches_search(&item, "x"));
    }

    #[test]
    fn test_sort_puts_missing_last_in_both_directions() {
        let mut items = vec![
            rep(json!({"_id": "a"})),
            rep(json!({"_id": "b", "age": 30})),
            rep(json!({"_id": "c", "age": 20})),
        ];
        items.sort_by(|x, y| compare_field(x.get("age"), y.get("age"), SortOrder::Ascending));
        let ids: Vec<_> = items.iter().map(|i| i.get("_id").cloned().unwrap()).collect();
        assert_eq!(ids, vec![json!("c"), json!("b"), json!("a")]);

        items.sort_by(|x, y| compare_field(x.get("age"), y.get("age"), SortOrder::Descending));
        let ids: Vec<_> = items.iter().map(|i| i.get("_id").cloned().unwrap()).collect();
        assert_eq!(ids, vec![json!("b"), json!("c"), json!("a")]);
    }

    #[test]
    fn test_mixed_types_rank() {
        assert_eq!(
            compare_field(Some(&json!(5)), Some(&json!("5")), SortOrder::Ascending),
            Ordering::Less
        );
    }
}
