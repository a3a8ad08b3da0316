//! Session collaborator contracts.
//!
//! A session is a request-scoped key/value store keyed by a cookie or token.
//! The controller loads it before authentication and stores it after the
//! response has been assembled.

use crate::{Request, Response, Result};
use async_trait::async_trait;
use serde_json::Value;

/// A request-scoped session.
#[async_trait]
pub trait Session: Send + Sync {
    /// Load persisted state.
    async fn load(&self) -> Result<()>;

    /// Persist state.
    async fn store(&self) -> Result<()>;

    /// Attach the session handle (cookie, token) to the response.
    fn add_to_response(&self, response: &mut Response);

    /// Read a value.
    fn get(&self, key: &str) -> Option<Value>;

    /// Write a value.
    fn set(&self, key: &str, value: Value);

    /// Delete a value.
    fn remove(&self, key: &str) -> Option<Value>;
}

/// Creates sessions for requests.
pub trait SessionFactory: Send + Sync {
    /// Whether the request refers to an existing session.
    fn has_session(&self, request: &Request) -> bool;

    /// Create the session object for a request. Nothing is loaded yet.
    fn create(&self, request: &Request) -> std::sync::Arc<dyn Session>;
}
