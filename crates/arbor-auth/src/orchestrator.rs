//! Fan-out / fan-in over registered authenticators and authorizers.

use crate::{Authenticator, Authorizer, GrantSet};
use arbor_core::{AuthScheme, Entity, Error, Identity, Request, Resource, Result};
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;

/// Runs every authenticator or authorizer concurrently and merges their
/// answers.
///
/// Branches may complete in any order; results are always consumed in
/// registration order.
#[derive(Clone)]
pub struct AuthOrchestrator {
    authenticators: Vec<Arc<dyn Authenticator>>,
    authorizers: Vec<Arc<dyn Authorizer>>,
    default_methods: GrantSet,
}

impl Default for AuthOrchestrator {
    fn default() -> Self {
        Self {
            authenticators: Vec::new(),
            authorizers: Vec::new(),
            default_methods: GrantSet::full(),
        }
    }
}

impl AuthOrchestrator {
    /// Create an orchestrator with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant set reported when no authorizer is registered.
    #[must_use]
    pub fn with_default_methods(mut self, methods: GrantSet) -> Self {
        self.default_methods = methods;
        self
    }

    /// Register an authenticator.
    pub fn add_authenticator(&mut self, authenticator: Arc<dyn Authenticator>) {
        self.authenticators.push(authenticator);
    }

    /// Register an authorizer.
    pub fn add_authorizer(&mut self, authorizer: Arc<dyn Authorizer>) {
        self.authorizers.push(authorizer);
    }

    /// Grant set reported when no authorizer is registered.
    pub fn default_methods(&self) -> &GrantSet {
        &self.default_methods
    }

    /// Whether any authorizer is registered.
    pub fn has_authorizers(&self) -> bool {
        !self.authorizers.is_empty()
    }

    /// Every scheme offered by every authenticator, in registration order.
    pub fn schemes(&self) -> Vec<AuthScheme> {
        self.authenticators.iter().flat_map(|a| a.schemes()).collect()
    }

    /// An authentication challenge listing every known scheme.
    pub fn challenge(&self) -> Error {
        Error::unauthenticated(self.schemes())
    }

    /// Identify the caller and attach the identity to the request.
    ///
    /// Every authenticator runs; any failure fails the whole check. The
    /// first non-empty identity in registration order wins.
    ///
    /// # Errors
    ///
    /// Returns the first failure in registration order. An authentication
    /// challenge without schemes is completed with [`Self::schemes`].
    pub async fn authenticate(&self, request: &Request) -> Result<Option<Identity>> {
        if self.authenticators.is_empty() {
            return Ok(None);
        }

        let results = join_all(self.authenticators.iter().map(|a| a.authenticate(request))).await;

        let mut adopted = None;
        for result in results {
            match result {
                Ok(identity) => {
                    if adopted.is_none() {
                        adopted = identity;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Authentication failed");
                    return Err(self.complete_challenge(e));
                }
            }
        }

        if let Some(identity) = &adopted {
            if request.set_identity(identity.clone()) {
                tracing::debug!(identity = %identity.id, "Caller authenticated");
            }
        }
        Ok(adopted)
    }

    /// Approve the request against `entity`; every authorizer must agree.
    ///
    /// # Errors
    ///
    /// Returns the first rejection in registration order.
    pub async fn authorize(
        &self,
        request: &Request,
        entity: &Entity,
        parent: Option<&Arc<dyn Resource>>,
    ) -> Result<()> {
        let results =
            join_all(self.authorizers.iter().map(|a| a.authorize(request, entity, parent))).await;

        for result in results {
            if let Err(e) = result {
                tracing::debug!(error = %e, entity = entity.kind(), "Authorization rejected");
                return Err(e);
            }
        }
        Ok(())
    }

    /// Methods granted on `entity`: the intersection of every authorizer's
    /// grants, or the default set when none is registered.
    ///
    /// # Errors
    ///
    /// Returns the first failure in registration order.
    pub async fn granted_methods(
        &self,
        entity: &Entity,
        parent: Option<&Arc<dyn Resource>>,
        request: Option<&Request>,
    ) -> Result<GrantSet> {
        if self.authorizers.is_empty() {
            return Ok(self.default_methods.clone());
        }

        let results = join_all(
            self.authorizers
                .iter()
                .map(|a| a.granted_methods(entity, parent, request)),
        )
        .await;

        let mut effective: Option<GrantSet> = None;
        for result in results {
            let granted: GrantSet = result?.into_iter().collect();
            effective = Some(match effective {
                Some(current) => current.intersect(&granted),
                None => granted,
            });
        }
        Ok(effective.unwrap_or_default())
    }

    fn complete_challenge(&self, error: Error) -> Error {
        let (inner, representation) = error.into_parts();
        let inner = match inner {
            Error::Unauthenticated { schemes } if schemes.is_empty() => self.challenge(),
            other => other,
        };
        match representation {
            Some(representation) => inner.with_representation(representation),
            None => inner,
        }
    }
}

impl fmt::Debug for AuthOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOrchestrator")
            .field("authenticators", &self.authenticators.len())
            .field("authorizers", &self.authorizers.len())
            .field("default_methods", &self.default_methods)
            .finish()
    }
}
