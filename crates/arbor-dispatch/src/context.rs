//! Per-request dispatch context.

use crate::ControllerConfig;
use arbor_auth::AuthOrchestrator;
use arbor_core::{Entity, Error, Permission, Representation, Request, Result};
use arbor_mime::MimeRegistry;

/// Everything a handler needs while serving one request.
#[derive(Clone, Copy)]
pub(crate) struct Context<'a> {
    pub request: &'a Request,
    pub registry: &'a MimeRegistry,
    pub auth: &'a AuthOrchestrator,
    pub config: &'a ControllerConfig,
}

impl<'a> Context<'a> {
    /// Turn an entity's permission answer into a dispatch decision.
    ///
    /// `Unknown` asks an anonymous caller to authenticate and refuses an
    /// identified one. `Deny` always refuses.
    pub fn require(&self, permission: Permission, action: &str, entity: &Entity) -> Result<()> {
        match permission {
            Permission::Allow => Ok(()),
            Permission::Unknown if self.request.identity().is_none() => {
                tracing::debug!(action, path = %entity.path(), "Anonymous caller must authenticate");
                Err(self.auth.challenge())
            }
            Permission::Unknown | Permission::Deny => {
                tracing::debug!(action, path = %entity.path(), %permission, "Operation refused");
                Err(Error::not_allowed(format!("{} {}", action, entity.path())))
            }
        }
    }

    /// Parse the request body with the codec registered for its content
    /// type.
    pub async fn body(&self) -> Result<Representation> {
        let body = match self.request.body() {
            Some(body) if !body.is_empty() => body,
            _ => return Err(Error::FormatMissing),
        };
        let content_type = self
            .request
            .content_type()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .ok_or_else(|| Error::FormatUnsupported("no content type".into()))?;
        let processor = self
            .registry
            .resolve(content_type)
            .ok_or_else(|| Error::FormatUnsupported(content_type.to_string()))?;
        processor.parse(body, content_type).await
    }

    /// Absolute URI for a tree path.
    pub fn href(&self, tree_path: &str) -> String {
        self.config.href(tree_path)
    }
}
