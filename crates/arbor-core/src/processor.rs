//! Content-type codec contract.

use crate::{Entity, Representation, Request, Response, Result};
use async_trait::async_trait;

/// Translates between raw bodies of given media types and
/// [`Representation`]s.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Media types this codec handles, e.g. `application/json`.
    fn supported_content_types(&self) -> Vec<String>;

    /// Parse a request body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FormatError`] if the body cannot be parsed.
    async fn parse(&self, body: &[u8], content_type: &str) -> Result<Representation>;

    /// Render a representation as a response body.
    ///
    /// `entity` is the entity the representation belongs to, when known.
    async fn serialize(
        &self,
        entity: Option<&Entity>,
        representation: &Representation,
        request: Option<&Request>,
    ) -> Result<Response>;
}
