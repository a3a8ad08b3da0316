//! Authenticator contract.

use arbor_core::{AuthScheme, Identity, Request, Result};
use async_trait::async_trait;

/// Establishes who is calling.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Identify the caller.
    ///
    /// `Ok(None)` means this authenticator found no credentials it handles.
    ///
    /// # Errors
    ///
    /// A failure (typically [`arbor_core::Error::Unauthenticated`], possibly
    /// carrying an error body) fails authentication for the whole request.
    async fn authenticate(&self, request: &Request) -> Result<Option<Identity>>;

    /// Schemes offered in `WWW-Authenticate` challenges.
    fn schemes(&self) -> Vec<AuthScheme> {
        Vec::new()
    }
}
