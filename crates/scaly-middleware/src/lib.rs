//! # Scaly Middleware
//!
//! Composable middleware for the Scaly dispatch pipeline.
//!
//! ```text
//! Request → m1 → m2 → .. → mn → core handler
//!                                    ↓
//! Response ← m1 ← m2 ← .. ← mn ←─────┘
//! ```
//!
//! - [`Middleware`] - one layer: `process(request, response, next)`
//! - [`Next`] - the continuation standing for every inner layer
//! - [`HttpMiddlewareDispatcher`] - an immutable ordered chain around a core handler
//! - [`hooks`] - method filtering, REST verb mapping, dependency injection
//!
//! ## Example
//!
//! ```
//! use scaly_middleware::hooks::MethodFilterMiddleware;
//! use scaly_middleware::HttpMiddlewareDispatcher;
//! use std::sync::Arc;
//!
//! let base = HttpMiddlewareDispatcher::new();
//! let filtered = base.add_middleware(Arc::new(MethodFilterMiddleware::new()));
//!
//! assert!(base.is_empty());
//! assert_eq!(filtered.names(), vec!["method_filter"]);
//! ```

#![doc(html_root_url = "https://docs.rs/scaly-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dispatcher;
pub mod hooks;
pub mod middleware;

pub use dispatcher::{BoxedMiddleware, HttpMiddlewareDispatcher};
pub use middleware::{BoxFuture, CoreHandler, FnMiddleware, Middleware, Next};
