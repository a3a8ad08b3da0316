//! Shared fixtures: an in-memory tree, authenticators, authorizers and
//! sessions.

#![allow(dead_code)]

use arbor_auth::{Authenticator, Authorizer};
use arbor_core::{
    AuthScheme, ChildRepresentation, Collection, Entity, Error, Expansion, ExtendedCollection,
    Identity, Method, Permission, Representation, Request, Resource, Response, Result, Session,
    SessionFactory, SortOrder,
};
use arbor_dispatch::{Controller, ControllerConfig};
use arbor_mime::JsonProcessor;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

// ==================== Access ====================

/// Permission answered to anonymous and identified callers.
#[derive(Debug, Clone, Copy)]
pub struct Access {
    pub anonymous: Permission,
    pub authenticated: Permission,
}

impl Access {
    pub const OPEN: Access = Access {
        anonymous: Permission::Allow,
        authenticated: Permission::Allow,
    };
    pub const MEMBERS_ONLY: Access = Access {
        anonymous: Permission::Unknown,
        authenticated: Permission::Allow,
    };
    pub const UNDECIDED: Access = Access {
        anonymous: Permission::Unknown,
        authenticated: Permission::Unknown,
    };
    pub const DENIED: Access = Access {
        anonymous: Permission::Deny,
        authenticated: Permission::Deny,
    };

    fn check(&self, identity: Option<&Identity>) -> Permission {
        if identity.is_some() {
            self.authenticated
        } else {
            self.anonymous
        }
    }
}

/// Read, write and remove permissions of a resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceAccess {
    pub read: Access,
    pub write: Access,
    pub remove: Access,
}

impl Default for ResourceAccess {
    fn default() -> Self {
        Self {
            read: Access::OPEN,
            write: Access::OPEN,
            remove: Access::OPEN,
        }
    }
}

/// Browse, write and remove permissions of a collection.
#[derive(Debug, Clone, Copy)]
pub struct CollectionAccess {
    pub browse: Access,
    pub write: Access,
    pub remove: Access,
}

impl Default for CollectionAccess {
    fn default() -> Self {
        Self {
            browse: Access::OPEN,
            write: Access::OPEN,
            remove: Access::OPEN,
        }
    }
}

// ==================== Resources ====================

/// A resource holding a JSON object.
pub struct MemoryResource {
    name: String,
    fields: Mutex<Map<String, Value>>,
    parent: Weak<MemoryCollection>,
    children: Mutex<Option<Arc<MemoryCollection>>>,
    access: Mutex<ResourceAccess>,
    fail_reads: Mutex<bool>,
}

impl MemoryResource {
    pub fn fields(&self) -> Value {
        Value::Object(self.fields.lock().clone())
    }

    pub fn set_access(&self, access: ResourceAccess) {
        *self.access.lock() = access;
    }

    /// Make `representation` fail from now on.
    pub fn fail_reads(&self) {
        *self.fail_reads.lock() = true;
    }

    /// Give this resource a child collection.
    pub fn attach_children(self: &Arc<Self>, options: CollectionOptions) -> Arc<MemoryCollection> {
        let children = MemoryCollection::with_options(options);
        *children.owner.lock() = Arc::downgrade(self);
        *self.children.lock() = Some(children.clone());
        children
    }
}

#[async_trait]
impl Resource for MemoryResource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_readable(&self, identity: Option<&Identity>) -> Permission {
        self.access.lock().read.check(identity)
    }

    fn is_writable(&self, identity: Option<&Identity>) -> Permission {
        self.access.lock().write.check(identity)
    }

    fn is_removable(&self, identity: Option<&Identity>) -> Permission {
        self.access.lock().remove.check(identity)
    }

    fn parent_collection(&self) -> Option<Arc<dyn Collection>> {
        self.parent.upgrade().map(|c| c as Arc<dyn Collection>)
    }

    fn child_collection(&self) -> Option<Arc<dyn Collection>> {
        self.children.lock().clone().map(|c| c as Arc<dyn Collection>)
    }

    async fn representation(&self, _request: &Request) -> Result<Representation> {
        if *self.fail_reads.lock() {
            return Err(Error::internal(format!("{} is unreadable", self.name)));
        }
        Ok(Representation::from_fields(self.fields.lock().clone()))
    }

    async fn set_representation(&self, representation: Representation, _request: &Request) -> Result<()> {
        *self.fields.lock() = representation.into_fields();
        Ok(())
    }

    async fn remove(&self, _request: &Request) -> Result<()> {
        if let Some(parent) = self.parent.upgrade() {
            parent.items.lock().retain(|item| item.name != self.name);
        }
        Ok(())
    }
}

/// A resource that panics when read.
pub struct PanickingResource;

#[async_trait]
impl Resource for PanickingResource {
    fn name(&self) -> String {
        "boom".to_string()
    }

    fn parent_collection(&self) -> Option<Arc<dyn Collection>> {
        None
    }

    async fn representation(&self, _request: &Request) -> Result<Representation> {
        panic!("representation exploded")
    }

    async fn set_representation(&self, _representation: Representation, _request: &Request) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _request: &Request) -> Result<()> {
        Ok(())
    }
}

// ==================== Collections ====================

/// Which listing parameters a collection takes over.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushDown {
    pub names: bool,
    pub search: bool,
    pub sort: bool,
    pub slice: bool,
}

impl PushDown {
    pub const ALL: PushDown = PushDown {
        names: true,
        search: true,
        sort: true,
        slice: true,
    };
}

#[derive(Debug, Clone, Default)]
pub struct CollectionOptions {
    pub access: CollectionAccess,
    /// `Some` makes the collection an extended collection.
    pub push_down: Option<PushDown>,
    /// Report a total from the source.
    pub report_total: bool,
    /// Contribute a dedicated representation per child.
    pub child_representation: bool,
    pub expansion: Expansion,
}

#[derive(Debug, Clone, Default)]
struct Parameters {
    names: Option<Vec<String>>,
    search: Option<String>,
    sort: Option<(String, SortOrder)>,
    slice: Option<(usize, Option<usize>)>,
}

/// A collection of [`MemoryResource`]s, recording every lookup.
pub struct MemoryCollection {
    me: Weak<MemoryCollection>,
    owner: Mutex<Weak<MemoryResource>>,
    items: Mutex<Vec<Arc<MemoryResource>>>,
    options: CollectionOptions,
    params: Mutex<Parameters>,
    last_total: Mutex<Option<usize>>,
    lookups: Mutex<Vec<String>>,
    listings: AtomicUsize,
    slices: Mutex<Vec<(usize, Option<usize>)>>,
    resets: AtomicUsize,
    removed: AtomicUsize,
    fail_children: Mutex<bool>,
}

impl MemoryCollection {
    pub fn new() -> Arc<Self> {
        Self::with_options(CollectionOptions::default())
    }

    pub fn with_options(options: CollectionOptions) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            me: me.clone(),
            owner: Mutex::new(Weak::new()),
            items: Mutex::new(Vec::new()),
            options,
            params: Mutex::new(Parameters::default()),
            last_total: Mutex::new(None),
            lookups: Mutex::new(Vec::new()),
            listings: AtomicUsize::new(0),
            slices: Mutex::new(Vec::new()),
            resets: AtomicUsize::new(0),
            removed: AtomicUsize::new(0),
            fail_children: Mutex::new(false),
        })
    }

    /// Add a child holding `fields`.
    pub fn add(&self, name: &str, fields: Value) -> Arc<MemoryResource> {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let resource = Arc::new(MemoryResource {
            name: name.to_string(),
            fields: Mutex::new(fields),
            parent: self.me.clone(),
            children: Mutex::new(None),
            access: Mutex::new(ResourceAccess::default()),
            fail_reads: Mutex::new(false),
        });
        self.items.lock().push(resource.clone());
        resource
    }

    pub fn get(&self, name: &str) -> Option<Arc<MemoryResource>> {
        self.items.lock().iter().find(|i| i.name == name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.items.lock().iter().map(|i| i.name.clone()).collect()
    }

    /// Names passed to [`Collection::child`], in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    /// Number of [`Collection::children`] calls.
    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    /// Every slice pushed down.
    pub fn slices(&self) -> Vec<(usize, Option<usize>)> {
        self.slices.lock().clone()
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    /// Make every [`Collection::children`] call fail until switched back.
    pub fn fail_children(&self, fail: bool) {
        *self.fail_children.lock() = fail;
    }

    pub fn removals(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }

    fn push_down(&self) -> PushDown {
        self.options.push_down.unwrap_or_default()
    }
}

fn field_text(fields: &Map<String, Value>, field: &str) -> Option<String> {
    fields.get(field).map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[async_trait]
impl Collection for MemoryCollection {
    fn is_browsable(&self, identity: Option<&Identity>) -> Permission {
        self.options.access.browse.check(identity)
    }

    fn is_writable(&self, identity: Option<&Identity>) -> Permission {
        self.options.access.write.check(identity)
    }

    fn is_removable(&self, identity: Option<&Identity>) -> Permission {
        self.options.access.remove.check(identity)
    }

    fn parent_resource(&self) -> Option<Arc<dyn Resource>> {
        self.owner.lock().upgrade().map(|r| r as Arc<dyn Resource>)
    }

    fn listing_expansion(&self) -> Expansion {
        self.options.expansion.clone()
    }

    async fn child(&self, name: &str, _request: &Request) -> Result<Arc<dyn Resource>> {
        self.lookups.lock().push(name.to_string());
        self.get(name)
            .map(|r| r as Arc<dyn Resource>)
            .ok_or_else(|| Error::not_found(name))
    }

    async fn children(&self, _request: &Request) -> Result<Vec<Arc<dyn Resource>>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        if *self.fail_children.lock() {
            return Err(Error::internal("listing store offline"));
        }
        let params = self.params.lock().clone();
        let mut items = self.items.lock().clone();

        if let Some(names) = &params.names {
            items.retain(|i| names.contains(&i.name));
        }
        if let Some(phrase) = &params.search {
            let needle = phrase.to_lowercase();
            items.retain(|i| {
                i.name.to_lowercase().contains(&needle)
                    || i.fields.lock().values().any(|v| {
                        v.as_str().is_some_and(|s| s.to_lowercase().contains(&needle))
                    })
            });
        }
        if let Some((field, order)) = &params.sort {
            items.sort_by_key(|i| field_text(&i.fields.lock(), field));
            if *order == SortOrder::Descending {
                items.reverse();
            }
        }
        *self.last_total.lock() = Some(items.len());
        if let Some((offset, limit)) = params.slice {
            items = items
                .into_iter()
                .skip(offset)
                .take(limit.unwrap_or(usize::MAX))
                .collect();
        }

        Ok(items.into_iter().map(|i| i as Arc<dyn Resource>).collect())
    }

    async fn create_child(
        &self,
        representation: Representation,
        name: Option<&str>,
        _request: &Request,
    ) -> Result<Arc<dyn Resource>> {
        let name = match name {
            Some(name) => name.to_string(),
            None => representation
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::FormatRejected("a name is required".into()))?,
        };
        if self.get(&name).is_some() {
            return Err(Error::ClientError(format!("{} already exists", name)));
        }
        Ok(self.add(&name, Value::Object(representation.into_fields())))
    }

    async fn remove(&self, _request: &Request) -> Result<()> {
        self.removed.fetch_add(1, Ordering::SeqCst);
        self.items.lock().clear();
        Ok(())
    }

    fn as_extended(&self) -> Option<&dyn ExtendedCollection> {
        self.options
            .push_down
            .map(|_| self as &dyn ExtendedCollection)
    }

    fn as_child_representation(&self) -> Option<&dyn ChildRepresentation> {
        if self.options.child_representation {
            Some(self)
        } else {
            None
        }
    }
}

impl ExtendedCollection for MemoryCollection {
    fn set_names(&self, names: &[String]) -> bool {
        if !self.push_down().names {
            return false;
        }
        self.params.lock().names = Some(names.to_vec());
        true
    }

    fn set_search_phrase(&self, phrase: &str) -> bool {
        if !self.push_down().search {
            return false;
        }
        self.params.lock().search = Some(phrase.to_string());
        true
    }

    fn set_sort(&self, field: &str, order: SortOrder) -> bool {
        if !self.push_down().sort {
            return false;
        }
        self.params.lock().sort = Some((field.to_string(), order));
        true
    }

    fn set_slice(&self, offset: usize, count: Option<usize>) -> bool {
        if !self.push_down().slice {
            return false;
        }
        self.slices.lock().push((offset, count));
        self.params.lock().slice = Some((offset, count));
        true
    }

    fn total(&self) -> Option<usize> {
        if self.options.report_total {
            *self.last_total.lock()
        } else {
            None
        }
    }

    fn reports_total(&self) -> bool {
        self.options.report_total
    }

    fn reset_parameters(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
        *self.params.lock() = Parameters::default();
    }
}

#[async_trait]
impl ChildRepresentation for MemoryCollection {
    async fn child_representation(
        &self,
        child: &Arc<dyn Resource>,
        _request: &Request,
    ) -> Result<Representation> {
        let name = child.name();
        Representation::from_value(json!({
            "summary": format!("about {}", name),
            "_href": "/hijacked",
        }))
    }
}

/// Root collection `/` with `alice` (owning `posts/first` and
/// `posts/second`), `bob` and `carol`.
pub struct SampleTree {
    pub root: Arc<MemoryCollection>,
    pub alice: Arc<MemoryResource>,
    pub posts: Arc<MemoryCollection>,
}

impl SampleTree {
    pub fn new(options: CollectionOptions) -> Self {
        let root = MemoryCollection::with_options(options);
        let alice = root.add("alice", json!({"name": "alice", "age": 34, "city": "Paris"}));
        root.add("bob", json!({"name": "bob", "age": 27, "city": "Berlin"}));
        root.add("carol", json!({"name": "carol", "age": 41, "city": "Lisbon"}));

        let posts = alice.attach_children(CollectionOptions::default());
        posts.add("first", json!({"title": "Hello"}));
        posts.add("second", json!({"title": "Again"}));

        Self { root, alice, posts }
    }

    pub fn entity(&self) -> Entity {
        Entity::Collection(self.root.clone())
    }

    /// Controller with a JSON codec over this tree.
    pub fn controller(&self, config: ControllerConfig) -> Controller {
        let mut controller = Controller::with_config(self.entity(), config);
        controller.register_processor(Arc::new(JsonProcessor::new()), None);
        controller
    }
}

// ==================== Authentication ====================

/// Accepts `Authorization: Bearer <user>`; `Bearer invalid` fails.
pub struct BearerAuthenticator;

#[async_trait]
impl Authenticator for BearerAuthenticator {
    async fn authenticate(&self, request: &Request) -> Result<Option<Identity>> {
        let Some(header) = request.header("Authorization") else {
            return Ok(None);
        };
        match header.strip_prefix("Bearer ") {
            Some("invalid") => Err(Error::unauthenticated(Vec::new())),
            Some(user) => Ok(Some(Identity::new(user))),
            None => Ok(None),
        }
    }

    fn schemes(&self) -> Vec<AuthScheme> {
        vec![AuthScheme::new("Bearer", "arbor")]
    }
}

/// Grants fixed methods, optionally per path, and rejects listed paths.
#[derive(Default)]
pub struct StaticAuthorizer {
    pub default_grants: Vec<Method>,
    pub grants: HashMap<String, Vec<Method>>,
    pub rejected: Vec<String>,
    pub fail_grants_for: Vec<String>,
    pub authorize_calls: AtomicUsize,
}

impl StaticAuthorizer {
    pub fn granting(methods: &[Method]) -> Self {
        Self {
            default_grants: methods.to_vec(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn authorize(
        &self,
        _request: &Request,
        entity: &Entity,
        _parent: Option<&Arc<dyn Resource>>,
    ) -> Result<()> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        let path = entity.path();
        if self.rejected.contains(&path) {
            return Err(Error::Unauthorized(path));
        }
        Ok(())
    }

    async fn granted_methods(
        &self,
        entity: &Entity,
        _parent: Option<&Arc<dyn Resource>>,
        _request: Option<&Request>,
    ) -> Result<Vec<Method>> {
        let path = entity.path();
        if self.fail_grants_for.contains(&path) {
            return Err(Error::internal("grant store unavailable"));
        }
        Ok(self
            .grants
            .get(&path)
            .cloned()
            .unwrap_or_else(|| self.default_grants.clone()))
    }
}

// ==================== Sessions ====================

#[derive(Default)]
pub struct SessionStore {
    pub data: Mutex<HashMap<String, Map<String, Value>>>,
    pub fail_load: bool,
    pub fail_store: bool,
}

/// Sessions keyed by the `sid` cookie.
pub struct MemorySessionFactory {
    pub store: Arc<SessionStore>,
}

impl SessionFactory for MemorySessionFactory {
    fn has_session(&self, request: &Request) -> bool {
        session_id(request).is_some()
    }

    fn create(&self, request: &Request) -> Arc<dyn Session> {
        Arc::new(MemorySession {
            id: session_id(request).unwrap_or_else(|| "fresh".to_string()),
            store: self.store.clone(),
            values: Mutex::new(Map::new()),
        })
    }
}

fn session_id(request: &Request) -> Option<String> {
    request
        .header("Cookie")?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("sid="))
        .map(str::to_string)
}

pub struct MemorySession {
    id: String,
    store: Arc<SessionStore>,
    values: Mutex<Map<String, Value>>,
}

#[async_trait]
impl Session for MemorySession {
    async fn load(&self) -> Result<()> {
        if self.store.fail_load {
            return Err(Error::Session("store offline".into()));
        }
        if let Some(values) = self.store.data.lock().get(&self.id) {
            *self.values.lock() = values.clone();
        }
        Ok(())
    }

    async fn store(&self) -> Result<()> {
        if self.store.fail_store {
            return Err(Error::Session("store offline".into()));
        }
        self.store
            .data
            .lock()
            .insert(self.id.clone(), self.values.lock().clone());
        Ok(())
    }

    fn add_to_response(&self, response: &mut Response) {
        response
            .meta_mut()
            .insert("Set-Cookie", format!("sid={}", self.id));
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.values.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.values.lock().remove(key)
    }
}

/// Resource that counts visits in the caller's session.
pub struct VisitCounter;

#[async_trait]
impl Resource for VisitCounter {
    fn name(&self) -> String {
        "visits".to_string()
    }

    fn parent_collection(&self) -> Option<Arc<dyn Collection>> {
        None
    }

    async fn representation(&self, request: &Request) -> Result<Representation> {
        let session = request
            .start_session()
            .ok_or_else(|| Error::internal("sessions are not configured"))?;
        let visits = session.get("visits").and_then(|v| v.as_u64()).unwrap_or(0) + 1;
        session.set("visits", json!(visits));
        Representation::from_value(json!({ "visits": visits }))
    }

    async fn set_representation(&self, _representation: Representation, _request: &Request) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _request: &Request) -> Result<()> {
        Ok(())
    }
}

// ==================== Helpers ====================

pub fn get(path: &str) -> Request {
    Request::builder(Method::Get, path).build()
}

pub fn with_json(method: Method, path: &str, body: Value) -> Request {
    Request::builder(method, path)
        .body("application/json", body.to_string())
        .build()
}

pub fn json_body(response: &Response) -> Value {
    let body = response.body().expect("response has a body");
    serde_json::from_slice(body).expect("body is JSON")
}

pub fn item_ids(listing: &Value) -> Vec<String> {
    listing["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["_id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
