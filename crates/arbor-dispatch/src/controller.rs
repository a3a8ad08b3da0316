//! The request pipeline.

use crate::context::Context;
use crate::dispatch::{self, Outcome};
use crate::finalize::finalize;
use crate::{resolver, ControllerConfig};
use arbor_auth::{AuthOrchestrator, Authenticator, Authorizer};
use arbor_core::{Entity, Error, Processor, Request, Response, Result, SessionFactory, Status};
use arbor_mime::MimeRegistry;
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

/// Serves requests against a tree of resources and collections.
///
/// Each request runs through: output negotiation, session load,
/// authentication, path resolution, authorization, dispatch, and
/// finalization. Failures at any step become a status response; a panic
/// inside the pipeline becomes `SERVER_ERROR`.
pub struct Controller {
    root: Entity,
    config: ControllerConfig,
    registry: MimeRegistry,
    auth: AuthOrchestrator,
    sessions: Option<Arc<dyn SessionFactory>>,
}

impl Controller {
    /// Create a controller with the default configuration.
    pub fn new(root: Entity) -> Self {
        Self::with_config(root, ControllerConfig::default())
    }

    /// Create a controller with `config`.
    pub fn with_config(root: Entity, config: ControllerConfig) -> Self {
        let auth = AuthOrchestrator::new().with_default_methods(config.default_grants());
        Self {
            root,
            config,
            registry: MimeRegistry::new(),
            auth,
            sessions: None,
        }
    }

    /// Register a codec for `mime_types`, or for every type it reports.
    pub fn register_processor(&mut self, processor: Arc<dyn Processor>, mime_types: Option<&[&str]>) {
        self.registry.register(processor, mime_types);
    }

    /// Register an authenticator.
    pub fn add_authenticator(&mut self, authenticator: Arc<dyn Authenticator>) {
        self.auth.add_authenticator(authenticator);
    }

    /// Register an authorizer.
    pub fn add_authorizer(&mut self, authorizer: Arc<dyn Authorizer>) {
        self.auth.add_authorizer(authorizer);
    }

    /// Install the session factory.
    pub fn set_session_factory(&mut self, factory: Arc<dyn SessionFactory>) {
        self.sessions = Some(factory);
    }

    /// Controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Registered codecs.
    pub fn registry(&self) -> &MimeRegistry {
        &self.registry
    }

    /// Registered authenticators and authorizers.
    pub fn auth(&self) -> &AuthOrchestrator {
        &self.auth
    }

    /// Serve one request.
    pub async fn handle(&self, mut request: Request) -> Response {
        if let Some(factory) = &self.sessions {
            request.set_session_factory(factory.clone());
        }

        let span = tracing::info_span!(
            "arbor.request",
            method = %request.method(),
            path = %request.path(),
        );

        async {
            let ctx = Context {
                request: &request,
                registry: &self.registry,
                auth: &self.auth,
                config: &self.config,
            };

            let mut response = match AssertUnwindSafe(self.process(&ctx)).catch_unwind().await {
                Ok(Ok(response)) => response,
                Ok(Err(error)) => {
                    let status = error.status();
                    if status == Status::ServerError {
                        tracing::error!(error = %error, "Request failed");
                    } else {
                        tracing::debug!(error = %error, status = %status, "Request rejected");
                    }
                    finalize(&ctx, Outcome::from_error(error)).await
                }
                Err(_) => {
                    tracing::error!("Request handler panicked");
                    Response::new(Status::ServerError)
                }
            };

            store_session(&request, &mut response).await;
            tracing::debug!(status = response.status_code(), "Request completed");
            response
        }
        .instrument(span)
        .await
    }

    async fn process(&self, ctx: &Context<'_>) -> Result<Response> {
        let request = ctx.request;

        if ctx.registry.negotiate(request.accepted_types()).is_none() {
            return Err(Error::NoAcceptableFormat);
        }

        self.load_session(request).await?;
        ctx.auth.authenticate(request).await?;

        let tree_path = self
            .config
            .tree_path(request.path())
            .ok_or_else(|| Error::not_found(request.path()))?;
        let target = resolver::resolve(&self.root, tree_path, request)
            .await?
            .into_target()?;

        ctx.auth
            .authorize(request, &target.entity(), target.parent())
            .await?;

        let outcome = dispatch::dispatch(ctx, target).await?;
        Ok(finalize(ctx, outcome).await)
    }

    async fn load_session(&self, request: &Request) -> Result<()> {
        let Some(factory) = &self.sessions else {
            return Ok(());
        };
        if !factory.has_session(request) {
            return Ok(());
        }

        let session = factory.create(request);
        session
            .load()
            .await
            .map_err(|e| Error::Session(format!("failed to load session: {}", e)))?;
        request.attach_session(session);
        Ok(())
    }
}

/// Persist the request's session, if one was started, and let it decorate
/// the response. A failed store leaves the response untouched.
async fn store_session(request: &Request, response: &mut Response) {
    let Some(session) = request.session() else {
        return;
    };
    match session.store().await {
        Ok(()) => session.add_to_response(response),
        Err(e) => tracing::warn!(error = %e, "Failed to store session"),
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("auth", &self.auth)
            .field("sessions", &self.sessions.is_some())
            .finish()
    }
}
