//! # Scaly
//!
//! **Prefix routing and onion middleware dispatch for MVC applications**
//!
//! - **Longest-prefix routing** – `/blog/archive/2024` reaches the `/blog/archive`
//!   action with `["2024"]` as arguments
//! - **Persisted route tables** – generated from controller route annotations,
//!   written back only when they change
//! - **Onion middleware** – each layer wraps the rest of the chain and may
//!   answer without calling it
//! - **Built-in hooks** – `405` method filtering, REST verb mapping and
//!   controller dependency injection
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scaly::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_optional_file("scaly.toml")?.load()?;
//!     scaly::init_telemetry(&config)?;
//!
//!     let app = Application::builder()
//!         .config(config)
//!         .controller(
//!             ControllerDescriptor::new("BlogController")
//!                 .route("/blog", "index")
//!                 .action("index", |_req, res, args| async move {
//!                     Ok(res.with_added_custom_argument("page", args.join("/")))
//!                 }),
//!         )
//!         .build()?;
//!
//!     let response = app.dispatch(request).await?;
//!     app.shutdown()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → resolve prefix → seed custom arguments from route data
//!         → method_filter → rest_controller → dependency_injection → user middleware
//!         → Controller::Function(residual arguments) → Response
//! ```

#![doc(html_root_url = "https://docs.rs/scaly/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod application;

pub use application::{init_telemetry, Application, ApplicationBuilder};

// Re-export core types
pub use scaly_core as core;

// Re-export middleware types
pub use scaly_middleware as middleware;

// Re-export router types
pub use scaly_router as router;

// Re-export configuration types
pub use scaly_config as config;

// Re-export telemetry
pub use scaly_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use scaly::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Application, ApplicationBuilder};

    pub use scaly_core::{
        arguments, ControllerDescriptor, ControllerRegistry, Injected, Request, Response,
        ResponseExt, ScalyError, ScalyResult, ServiceContainer,
    };

    pub use scaly_middleware::hooks::{
        ControllerDependencyInjectionHook, MethodFilterMiddleware, RestControllerHook,
    };
    pub use scaly_middleware::{FnMiddleware, HttpMiddlewareDispatcher, Middleware, Next};

    pub use scaly_router::{
        JsonRouteTableFile, MemoryRouteTableSource, RouteEntry, RouteTableSource, Router,
        RoutingTable,
    };

    pub use scaly_config::{ConfigLoader, ScalyConfig};
}
