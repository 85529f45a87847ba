//! Boot and shutdown wiring.

use std::fmt;
use std::sync::Arc;

use scaly_config::ScalyConfig;
use scaly_core::{
    ControllerDescriptor, ControllerRegistry, Request, Response, ScalyResult, ServiceContainer,
};
use scaly_middleware::hooks::{
    ControllerDependencyInjectionHook, MethodFilterMiddleware, RestControllerHook,
};
use scaly_middleware::{BoxedMiddleware, Middleware};
use scaly_router::{JsonRouteTableFile, RouteEntry, RouteTableSource, Router};
use scaly_telemetry::TelemetryResult;

/// A booted router with its route-table source.
///
/// Built with [`Application::builder`]. Booting loads the persisted route
/// table, optionally regenerates it from the registered controllers and
/// layers the enabled built-in hooks ahead of any user middleware:
///
/// ```text
/// method_filter → rest_controller → dependency_injection → user middleware → action
/// ```
///
/// [`shutdown`](Self::shutdown) writes the table back when it changed.
pub struct Application {
    config: ScalyConfig,
    router: Router,
    source: Box<dyn RouteTableSource>,
}

impl Application {
    /// Starts building an application.
    #[must_use]
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// The configuration the application booted with.
    #[must_use]
    pub fn config(&self) -> &ScalyConfig {
        &self.config
    }

    /// The router, for route and handler changes after boot.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Dispatches a request through the middleware chain to its route.
    ///
    /// # Errors
    ///
    /// See [`Router::dispatch`].
    pub async fn dispatch(&self, request: Request) -> ScalyResult<Response> {
        self.router.dispatch(request).await
    }

    /// Persists the route table if configured to and it changed.
    ///
    /// Returns `true` if the table was written.
    pub fn shutdown(&self) -> ScalyResult<bool> {
        if !self.config.router.persist_on_shutdown {
            tracing::debug!("Route table persistence disabled");
            return Ok(false);
        }
        self.router.persist(self.source.as_ref())
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("router", &self.router)
            .field("source", &self.source.describe())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Application`].
///
/// # Example
///
/// ```rust
/// use scaly::prelude::*;
///
/// let app = Application::builder()
///     .controller(ControllerDescriptor::new("PageController").route("/", "home"))
///     .source(MemoryRouteTableSource::empty())
///     .build()
///     .unwrap();
///
/// assert!(app.router().has_route("/"));
/// ```
#[derive(Default)]
pub struct ApplicationBuilder {
    config: ScalyConfig,
    registry: ControllerRegistry,
    services: ServiceContainer,
    source: Option<Box<dyn RouteTableSource>>,
    middleware: Vec<BoxedMiddleware>,
}

impl ApplicationBuilder {
    /// Creates a builder with default configuration and nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ScalyConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the controller registry.
    pub fn registry(mut self, registry: ControllerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registers one controller.
    pub fn controller(mut self, descriptor: ControllerDescriptor) -> Self {
        self.registry.register(descriptor);
        self
    }

    /// Replaces the service container.
    pub fn services(mut self, services: ServiceContainer) -> Self {
        self.services = services;
        self
    }

    /// Registers one named service.
    pub fn service<T: Send + Sync + 'static>(
        mut self,
        name: impl Into<String>,
        service: Arc<T>,
    ) -> Self {
        self.services.register(name, service);
        self
    }

    /// Sets the route-table source. Defaults to a JSON file at
    /// `router.route_table_path`.
    pub fn source(mut self, source: impl RouteTableSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Adds user middleware, run after the built-in hooks in the order added.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Boots the application.
    ///
    /// # Errors
    ///
    /// Fails if the route table cannot be loaded or the configured default
    /// route names an unknown controller or action.
    pub fn build(self) -> ScalyResult<Application> {
        let config = self.config;
        let registry = Arc::new(self.registry);
        let services = Arc::new(self.services);
        let source: Box<dyn RouteTableSource> = match self.source {
            Some(source) => source,
            None => Box::new(JsonRouteTableFile::new(&config.router.route_table_path)),
        };

        let router = Router::load(source.as_ref(), Arc::clone(&registry))?;

        if config.router.regenerate_on_boot {
            router.regenerate();
        }

        if let Some(default_route) = &config.router.default_route {
            registry.resolve_action(&default_route.controller, &default_route.function)?;
            router.set_default_route(Some(RouteEntry::controller(
                "/",
                &default_route.controller,
                &default_route.function,
            )));
        }

        let hooks = &config.hooks;
        if hooks.method_filter {
            router.add_handler(Arc::new(MethodFilterMiddleware::new()));
        }
        if hooks.rest_controllers {
            router.add_handler(Arc::new(RestControllerHook::new(Arc::clone(&registry))));
        }
        if hooks.dependency_injection {
            router.add_handler(Arc::new(ControllerDependencyInjectionHook::new(
                Arc::clone(&registry),
                services,
            )));
        }
        for middleware in self.middleware {
            router.add_handler(middleware);
        }

        tracing::info!(
            controllers = registry.len(),
            handlers = ?router.get_handlers().names(),
            source = %source.describe(),
            "Application booted"
        );

        Ok(Application {
            config,
            router,
            source,
        })
    }
}

impl fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("config", &self.config)
            .field("controllers", &self.registry.len())
            .field("services", &self.services.len())
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

/// Installs logging and metrics as configured.
///
/// # Errors
///
/// Fails if a global subscriber or recorder is already installed, or the
/// metrics address is invalid.
pub fn init_telemetry(config: &ScalyConfig) -> TelemetryResult<()> {
    scaly_telemetry::init_logging(&config.logging.to_log_config())?;
    scaly_telemetry::init_metrics(&config.metrics.to_metrics_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use scaly_config::DefaultRouteConfig;
    use scaly_core::{ResponseExt, ScalyError};
    use scaly_router::MemoryRouteTableSource;

    fn blog() -> ControllerDescriptor {
        ControllerDescriptor::new("BlogController")
            .route("/blog", "index")
            .action("index", |_req, res, _args: Vec<String>| async move { Ok(res) })
    }

    #[test]
    fn test_hooks_layered_in_order() {
        let app = Application::builder()
            .source(MemoryRouteTableSource::empty())
            .build()
            .unwrap();

        assert_eq!(
            app.router().get_handlers().names(),
            vec!["method_filter", "rest_controller", "dependency_injection"]
        );
    }

    #[test]
    fn test_disabled_hooks_not_layered() {
        let mut config = ScalyConfig::default();
        config.hooks.rest_controllers = false;
        config.hooks.dependency_injection = false;

        let app = Application::builder()
            .config(config)
            .source(MemoryRouteTableSource::empty())
            .build()
            .unwrap();

        assert_eq!(app.router().get_handlers().names(), vec!["method_filter"]);
    }

    #[test]
    fn test_regenerate_on_boot() {
        let app = Application::builder()
            .controller(blog())
            .source(MemoryRouteTableSource::empty())
            .build()
            .unwrap();
        assert!(app.router().has_route("/blog"));
        assert!(app.router().is_dirty());

        let mut config = ScalyConfig::default();
        config.router.regenerate_on_boot = false;
        let app = Application::builder()
            .config(config)
            .controller(blog())
            .source(MemoryRouteTableSource::empty())
            .build()
            .unwrap();
        assert!(!app.router().has_route("/blog"));
    }

    #[test]
    fn test_unknown_default_route_fails_boot() {
        let mut config = ScalyConfig::default();
        config.router.default_route = Some(DefaultRouteConfig {
            controller: "BlogController".to_string(),
            function: "missing".to_string(),
        });

        let result = Application::builder()
            .config(config)
            .controller(blog())
            .source(MemoryRouteTableSource::empty())
            .build();
        assert!(matches!(
            result,
            Err(ScalyError::ControllerResolution { .. })
        ));
    }

    #[test]
    fn test_default_route_installed() {
        let mut config = ScalyConfig::default();
        config.router.default_route = Some(DefaultRouteConfig {
            controller: "BlogController".to_string(),
            function: "index".to_string(),
        });

        let app = Application::builder()
            .config(config)
            .controller(blog())
            .source(MemoryRouteTableSource::empty())
            .build()
            .unwrap();

        let resolution = app.router().resolve("/nowhere/else").unwrap();
        assert!(resolution.prefix.is_none());
        assert_eq!(resolution.entry.function_name(), Some("index"));
        assert_eq!(resolution.args, vec!["nowhere", "else"]);
    }

    #[test]
    fn test_shutdown_respects_config() {
        let mut config = ScalyConfig::default();
        config.router.persist_on_shutdown = false;

        let app = Application::builder()
            .config(config)
            .controller(blog())
            .source(MemoryRouteTableSource::empty())
            .build()
            .unwrap();

        assert!(app.router().is_dirty());
        assert!(!app.shutdown().unwrap());
    }

    #[tokio::test]
    async fn test_dispatch_delegates_to_router() {
        let app = Application::builder()
            .controller(
                ControllerDescriptor::new("PingController")
                    .route("/ping", "pong")
                    .action("pong", |_req, res: Response, _args: Vec<String>| async move {
                        Ok(res.with_added_custom_argument("pong", true))
                    }),
            )
            .source(MemoryRouteTableSource::empty())
            .build()
            .unwrap();

        let request = http::Request::builder()
            .uri("/ping")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let response = app.dispatch(request).await.unwrap();
        assert_eq!(response.custom_argument("pong"), Some(&serde_json::Value::Bool(true)));
    }
}
