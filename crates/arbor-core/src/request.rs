//! Incoming requests.

use crate::{parse_accept, Identity, Meta, Method, Session, SessionFactory};
use bytes::Bytes;
use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, OnceLock};

/// A request as handed over by a transport adapter.
///
/// Immutable after construction, apart from two one-time slots: the caller
/// identity (set by authentication) and the session (created lazily).
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    meta: Meta,
    body: Option<Bytes>,
    content_type: Option<String>,
    accepted_types: Vec<String>,
    remote_addr: Option<IpAddr>,
    secure: bool,
    identity: OnceLock<Identity>,
    session: OnceLock<Arc<dyn Session>>,
    session_factory: Option<Arc<dyn SessionFactory>>,
}

impl Request {
    /// Start building a request.
    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }

    /// The verb.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The raw (still percent-encoded) path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a query parameter.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every decoded query pair, in order.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// First value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.meta.get(name)
    }

    /// All request headers.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// The body, if one was sent.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Media type of the body, parameters included.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Accepted output types, most preferred first.
    pub fn accepted_types(&self) -> &[String] {
        &self.accepted_types
    }

    /// Address of the remote peer.
    pub fn remote_addr(&self) -> Option<IpAddr> {
        self.remote_addr
    }

    /// Whether the request arrived over a secure channel.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// The authenticated caller, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.get()
    }

    /// Attach the caller identity. Only the first call has an effect;
    /// returns whether this call attached it.
    pub fn set_identity(&self, identity: Identity) -> bool {
        self.identity.set(identity).is_ok()
    }

    /// The session attached to this request, if one was started or loaded.
    pub fn session(&self) -> Option<Arc<dyn Session>> {
        self.session.get().cloned()
    }

    /// The attached session, creating a fresh one through the configured
    /// factory if none exists yet. `None` when sessions are not configured.
    pub fn start_session(&self) -> Option<Arc<dyn Session>> {
        if let Some(session) = self.session.get() {
            return Some(session.clone());
        }
        let factory = self.session_factory.as_ref()?;
        Some(self.session.get_or_init(|| factory.create(self)).clone())
    }

    /// Attach an already loaded session. Returns whether it was attached.
    pub fn attach_session(&self, session: Arc<dyn Session>) -> bool {
        self.session.set(session).is_ok()
    }

    /// Make lazily created sessions come from `factory`.
    pub fn set_session_factory(&mut self, factory: Arc<dyn SessionFactory>) {
        self.session_factory = Some(factory);
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("content_type", &self.content_type)
            .field("accepted_types", &self.accepted_types)
            .field("identity", &self.identity.get().map(|i| &i.id))
            .field("has_session", &self.session.get().is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    meta: Meta,
    body: Option<Bytes>,
    remote_addr: Option<IpAddr>,
    secure: bool,
}

impl RequestBuilder {
    /// Start a request for `method` on `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            meta: Meta::new(),
            body: None,
            remote_addr: None,
            secure: false,
        }
    }

    /// Add a decoded query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add every pair of a raw `application/x-www-form-urlencoded` query
    /// string (without the leading `?`).
    #[must_use]
    pub fn query_string(mut self, raw: &str) -> Self {
        self.query.extend(
            url::form_urlencoded::parse(raw.trim_start_matches('?').as_bytes()).into_owned(),
        );
        self
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.append(name, value);
        self
    }

    /// Attach a body with its media type.
    #[must_use]
    pub fn body(mut self, content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.meta.insert("Content-Type", content_type);
        self.body = Some(body.into());
        self
    }

    /// Record the remote peer address.
    #[must_use]
    pub fn remote_addr(mut self, addr: IpAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Mark the request as received over a secure channel.
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Finish the request.
    pub fn build(self) -> Request {
        let accepted_types = parse_accept(self.meta.get("Accept").unwrap_or_default());
        let content_type = self.meta.get("Content-Type").map(str::to_string);
        Request {
            method: self.method,
            path: self.path,
            query: self.query,
            meta: self.meta,
            body: self.body,
            content_type,
            accepted_types,
            remote_addr: self.remote_addr,
            secure: self.secure,
            identity: OnceLock::new(),
            session: OnceLock::new(),
            session_factory: None,
        }
    }
}
