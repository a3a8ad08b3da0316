//! Media type handling for Arbor.
//!
//! This crate provides:
//! - **Registry**: maps media types (wildcards included) to [`Processor`]s
//! - **Negotiation**: picks an output codec from a request's accepted types
//!   and a representation's preferred types
//! - **JSON**: a reference `application/json` codec
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use arbor_mime::{JsonProcessor, MimeRegistry};
//!
//! let mut registry = MimeRegistry::new();
//! registry.register(Arc::new(JsonProcessor::new()), None);
//!
//! assert!(registry.resolve("application/json").is_some());
//! assert!(registry.resolve("application/*").is_some());
//! assert!(registry.resolve("text/html").is_none());
//!
//! let accepted = arbor_mime::parse_accept("text/html, application/json;q=0.5");
//! let negotiated = registry.negotiate(&accepted).unwrap();
//! assert_eq!(negotiated.media_type, "application/json");
//! ```
//!
//! [`Processor`]: arbor_core::Processor

mod json;
mod negotiate;
mod registry;

pub use arbor_core::parse_accept;
pub use json::JsonProcessor;
pub use negotiate::{media_matches, Negotiated};
pub use registry::MimeRegistry;
