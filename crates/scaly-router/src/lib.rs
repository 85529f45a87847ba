//! Longest-prefix router for Scaly.
//!
//! Routes live in a two-tier [`RoutingTable`]: a dynamic table generated
//! from controller route annotations (and persisted between runs) and a
//! static table for routes registered directly by code. The [`Router`]
//! resolves a request path to the longest registered prefix, passes the
//! remaining segments to the controller action as positional arguments, and
//! runs the whole dispatch through the middleware chain.
//!
//! # Example
//!
//! ```rust
//! use scaly_core::{ControllerDescriptor, ControllerRegistry, ResponseExt};
//! use scaly_router::{MemoryRouteTableSource, Router};
//! use std::sync::Arc;
//!
//! let mut registry = ControllerRegistry::new();
//! registry.register(
//!     ControllerDescriptor::new("DocsController")
//!         .route("/docs", "page")
//!         .action("page", |_req, res, args: Vec<String>| async move {
//!             Ok(res.with_added_custom_argument("page", args.join("/")))
//!         }),
//! );
//!
//! let source = MemoryRouteTableSource::empty();
//! let router = Router::load(&source, Arc::new(registry)).unwrap();
//! router.regenerate();
//!
//! assert!(router.has_route("/DOCS"));
//! assert!(router.persist(&source).unwrap());
//! assert!(!router.is_dirty());
//! ```
//!
//! # Resolution
//!
//! ```text
//! table: /a → R1, /a/b → R2
//!
//! /a/b/c  → /a/b/c ✗ → /a/b ✓  ⇒ R2, args ["c"]
//! /x/y    → /x/y ✗ → /x ✗ → / ✗ ⇒ default route, or pass-through
//! ```

#![doc(html_root_url = "https://docs.rs/scaly-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod document;
mod generator;
pub mod path;
mod route_entry;
mod router;
mod routing_table;
pub mod source;

pub use document::{PersistedRoute, RouteTableDocument};
pub use generator::RouteTableGenerator;
pub use route_entry::{RouteData, RouteEntry, RouteHandler};
pub use router::{RouteResolution, Router};
pub use routing_table::RoutingTable;
pub use source::{JsonRouteTableFile, MemoryRouteTableSource, RouteTableSource};
