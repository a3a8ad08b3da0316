//! # Arbor Core
//!
//! Core types, tree contracts, and error definitions shared by every Arbor
//! crate.
//!
//! Arbor exposes a hierarchical domain model (single items and keyed
//! collections of items) through a uniform CRUD protocol. This crate holds the
//! vocabulary the rest of the workspace speaks:
//!
//! - **Protocol values**: [`Method`], [`Status`], [`Meta`]
//! - **Messages**: [`Request`], [`Response`], [`Representation`]
//! - **Tree contracts**: [`Resource`], [`Collection`], [`Entity`], plus the
//!   optional [`ExtendedCollection`] and [`ChildRepresentation`] capabilities
//! - **Collaborator contracts**: [`Processor`], [`Session`], [`SessionFactory`]
//! - **Errors**: [`Error`], mapped one-to-one onto [`Status`]
//!
//! ## Example
//!
//! ```
//! use arbor_core::{Method, Request, Representation, Status};
//!
//! let request = Request::builder(Method::Get, "/articles/")
//!     .query_string("offset=10&limit=5")
//!     .header("Accept", "application/json;q=0.9, text/html;q=0.5")
//!     .build();
//!
//! assert_eq!(request.query("limit"), Some("5"));
//! assert_eq!(request.accepted_types(), ["application/json", "text/html"]);
//!
//! let mut representation = Representation::new();
//! representation.insert("title", "Hello");
//! representation.set_status(Status::Created);
//! assert_eq!(representation.status(), Some(Status::Created));
//! ```

pub mod accept;
mod error;
mod identity;
mod meta;
mod method;
mod permission;
mod processor;
mod representation;
mod request;
mod response;
mod session;
mod status;
mod tree;

pub use accept::parse_accept;
pub use error::{Error, Result};
pub use identity::{AuthScheme, Identity};
pub use meta::Meta;
pub use method::Method;
pub use permission::Permission;
pub use processor::Processor;
pub use representation::{Representation, RESERVED_LISTING_KEYS};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use session::{Session, SessionFactory};
pub use status::Status;
pub use tree::{
    collection_path, resource_path, ChildRepresentation, Collection, Entity, Expansion,
    ExtendedCollection, Resource, SortOrder,
};
