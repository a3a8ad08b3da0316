//! Request dispatching for Arbor.
//!
//! A [`Controller`] serves transport-independent [`Request`]s against a
//! tree of resources and collections:
//!
//! - **Resolution**: one [`Collection::child`] lookup per path segment
//! - **Authentication and authorization**: every registered authenticator
//!   and authorizer runs concurrently
//! - **Dispatch**: `GET`, `HEAD`, `POST`, `PUT`, `PATCH`, `DELETE` and
//!   `OPTIONS` mapped onto entity operations
//! - **Listings**: filter, search, sort and slice pushed down to the
//!   collection when it supports it, applied in memory otherwise
//! - **Finalization**: content negotiation and status mapping
//!
//! # Example
//!
//! ```ignore
//! use arbor_core::{Entity, Method, Request};
//! use arbor_dispatch::{Controller, ControllerConfig};
//! use arbor_mime::JsonProcessor;
//! use std::sync::Arc;
//!
//! let config = ControllerConfig::load(None)?;
//! let mut controller = Controller::with_config(Entity::Collection(users), config);
//! controller.register_processor(Arc::new(JsonProcessor::new()), None);
//!
//! let response = controller
//!     .handle(Request::builder(Method::Get, "/alice").build())
//!     .await;
//! ```
//!
//! [`Request`]: arbor_core::Request
//! [`Collection::child`]: arbor_core::Collection::child

mod config;
mod context;
mod controller;
mod dispatch;
mod error;
mod finalize;
mod listing;
mod logging;
pub mod pagination;
pub mod query;
pub mod resolver;

pub use config::{ControllerConfig, DEFAULT_PERFORMANCE_HEADER};
pub use controller::Controller;
pub use dispatch::{ACCESS_CONTROL_ALLOW_METHODS, ALLOW, COLLECTION_ALLOW};
pub use error::SetupError;
pub use listing::LISTING_TYPE;
pub use logging::{init_logging, LogFormat};
pub use query::ListingQuery;
pub use resolver::{resolve, Resolution, Target};
