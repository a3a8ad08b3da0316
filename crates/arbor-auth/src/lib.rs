//! Authentication and authorization for Arbor.
//!
//! This crate provides:
//! - **Authenticators**: turn a request into an optional caller [`Identity`]
//! - **Authorizers**: approve a request against an entity and compute the
//!   methods a caller is granted on it
//! - **Grant sets**: method sets combined by intersection
//! - **Orchestrator**: runs every registered authenticator or authorizer
//!   concurrently and merges the results
//!
//! # Example
//!
//! ```
//! use arbor_auth::{AuthOrchestrator, GrantSet};
//! use arbor_core::{Method, Request};
//!
//! let orchestrator = AuthOrchestrator::new();
//! let request = Request::builder(Method::Get, "/").build();
//!
//! // With nothing registered, authentication trivially succeeds anonymously.
//! let identity = futures::executor::block_on(orchestrator.authenticate(&request)).unwrap();
//! assert!(identity.is_none());
//! assert_eq!(orchestrator.default_methods(), &GrantSet::full());
//! ```
//!
//! [`Identity`]: arbor_core::Identity

mod authenticator;
mod authorizer;
mod grant;
mod orchestrator;

pub use authenticator::Authenticator;
pub use authorizer::Authorizer;
pub use grant::GrantSet;
pub use orchestrator::AuthOrchestrator;
