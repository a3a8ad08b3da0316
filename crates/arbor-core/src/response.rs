//! Outgoing responses.

use crate::{Meta, Status};
use bytes::Bytes;

/// A transport-agnostic response, handed back to the transport adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: Status,
    meta: Meta,
    content_type: Option<String>,
    body: Option<Bytes>,
}

impl Response {
    /// A response without a body.
    pub fn new(status: Status) -> Self {
        Self {
            status,
            meta: Meta::new(),
            content_type: None,
            body: None,
        }
    }

    /// A response with a body of the given media type.
    pub fn with_body(status: Status, content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let content_type = content_type.into();
        let mut meta = Meta::new();
        meta.insert("Content-Type", content_type.clone());
        Self {
            status,
            meta,
            content_type: Some(content_type),
            body: Some(body.into()),
        }
    }

    /// Abstract status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    /// Replace the status.
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Headers.
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Headers, for post-processing (session cookies, CORS).
    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    /// First value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.meta.get(name)
    }

    /// Media type of the body.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into the body.
    pub fn into_body(self) -> Option<Bytes> {
        self.body
    }
}
