//! # Scaly Core
//!
//! Core types shared by every Scaly crate.
//!
//! - [`Request`] / [`Response`] - HTTP message aliases used across the dispatch pipeline
//! - [`ResponseExt`] - the `with_*` mutator contract and the custom-argument bag
//! - [`ScalyError`] - the error taxonomy for routing and controller dispatch
//! - [`ControllerRegistry`] - typed controller actions registered at startup
//! - [`ServiceContainer`] - named service locator consumed by the injection hook

#![doc(html_root_url = "https://docs.rs/scaly-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod controller;
pub mod di;
mod error;
pub mod message;

pub use controller::{
    Action, BoxFuture, ControllerDescriptor, ControllerRegistry, InjectionPoint, RouteAnnotation,
};
pub use di::{Injected, ServiceContainer};
pub use error::{ErrorDetail, ErrorEnvelope, ScalyError, ScalyResult};
pub use message::{arguments, empty_response, CustomArguments, Request, Response, ResponseExt};
