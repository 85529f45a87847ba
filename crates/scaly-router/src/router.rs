//! The router: longest-prefix resolution and dispatch.
//!
//! Resolution walks the request path from the full path down to the root,
//! dropping one trailing segment at a time, and stops at the first key
//! present in either table:
//!
//! ```text
//! /blog/archive/2024/05
//! /blog/archive/2024
//! /blog/archive          ← registered, residual arguments ["2024", "05"]
//! ```
//!
//! The segments after the matched prefix become positional arguments for
//! the controller action. Lookups are case-insensitive; the arguments keep
//! the request's original case.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use scaly_core::{
    arguments, empty_response, Action, BoxFuture, ControllerRegistry, Request, Response,
    ResponseExt, ScalyError, ScalyResult,
};
use scaly_middleware::{BoxedMiddleware, CoreHandler, HttpMiddlewareDispatcher};
use scaly_telemetry::metrics;

use crate::document::RouteTableDocument;
use crate::generator::RouteTableGenerator;
use crate::path::{normalize, request_path, residual_arguments};
use crate::route_entry::{RouteData, RouteEntry};
use crate::routing_table::RoutingTable;
use crate::source::RouteTableSource;

/// Metrics label for dispatches answered by the default route.
const DEFAULT_ROUTE_LABEL: &str = "<default>";

/// Metrics label for dispatches that matched nothing.
const UNMATCHED_LABEL: &str = "<unmatched>";

/// The outcome of resolving a path.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResolution {
    /// The matched table key, or `None` when the default route answered.
    pub prefix: Option<String>,
    /// The matched entry.
    pub entry: RouteEntry,
    /// Residual path segments after the prefix.
    pub args: Vec<String>,
}

/// Resolves request paths and dispatches them through the middleware chain.
///
/// The routing table and the middleware dispatcher each sit behind a
/// read-write lock. A dispatch copies what it needs under a short read lock
/// and runs without holding any lock, so regeneration and handler changes
/// never affect a request already in flight.
///
/// # Example
///
/// ```rust
/// use scaly_core::{ControllerDescriptor, ControllerRegistry};
/// use scaly_router::{Router, RoutingTable};
/// use std::sync::Arc;
///
/// let mut registry = ControllerRegistry::new();
/// registry.register(ControllerDescriptor::new("BlogController").route("/blog", "index"));
///
/// let router = Router::new(RoutingTable::new(), Arc::new(registry));
/// router.regenerate();
///
/// let resolution = router.resolve("/Blog/2024/May").unwrap();
/// assert_eq!(resolution.prefix.as_deref(), Some("/blog"));
/// assert_eq!(resolution.args, vec!["2024", "May"]);
/// ```
pub struct Router {
    table: RwLock<RoutingTable>,
    dispatcher: RwLock<HttpMiddlewareDispatcher>,
    registry: Arc<ControllerRegistry>,
    loaded: RwLock<RouteTableDocument>,
}

impl Router {
    /// Creates a router over `table`.
    ///
    /// The table's current dynamic routes are the baseline for
    /// [`is_dirty`](Self::is_dirty).
    #[must_use]
    pub fn new(table: RoutingTable, registry: Arc<ControllerRegistry>) -> Self {
        let loaded = table.to_document();
        Self {
            table: RwLock::new(table),
            dispatcher: RwLock::new(HttpMiddlewareDispatcher::new()),
            registry,
            loaded: RwLock::new(loaded),
        }
    }

    /// Creates a router from a persisted route table.
    ///
    /// # Errors
    ///
    /// Fails if the source cannot be read or holds a malformed table.
    pub fn load(
        source: &dyn RouteTableSource,
        registry: Arc<ControllerRegistry>,
    ) -> ScalyResult<Self> {
        let document = RouteTableDocument::from_value(source.load()?)?;
        let table = RoutingTable::from_document(document);
        tracing::info!(
            source = %source.describe(),
            routes = table.len(),
            "Loaded route table"
        );

        Ok(Self::new(table, registry))
    }

    /// The controller registry actions are resolved from.
    #[must_use]
    pub fn registry(&self) -> &Arc<ControllerRegistry> {
        &self.registry
    }

    /// A copy of the current routing table.
    #[must_use]
    pub fn routing_table(&self) -> RoutingTable {
        self.table.read().clone()
    }

    /// Registers a static route served directly by `handler`.
    ///
    /// `uri` may be a path or a full URI. Residual path segments are passed
    /// to the handler as its third argument.
    pub fn add_route<F, Fut>(&self, uri: &str, handler: F)
    where
        F: Fn(Request, Response, Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ScalyResult<Response>> + Send + 'static,
    {
        let action: Action = Arc::new(
            move |request: Request,
                  response: Response,
                  args: Vec<String>|
                  -> BoxFuture<'static, ScalyResult<Response>> {
                Box::pin(handler(request, response, args))
            },
        );

        let entry = RouteEntry::new(uri).with_static(true);
        let entry = entry
            .with_data_value(arguments::PATH, entry.path())
            .with_handler(action);
        self.add_entry(entry);
    }

    /// Inserts `entry` into the table it belongs to.
    pub fn add_entry(&self, entry: RouteEntry) -> Option<RouteEntry> {
        tracing::debug!(
            route = entry.path(),
            is_static = entry.is_static(),
            "Adding route"
        );
        self.table.write().add_route(entry)
    }

    /// Removes `uri` from both tables. Returns `true` if anything was removed.
    pub fn remove_route(&self, uri: &str) -> bool {
        let mut table = self.table.write();
        let removed_static = table.remove_route(uri, true).is_some();
        let removed_dynamic = table.remove_route(uri, false).is_some();
        removed_static || removed_dynamic
    }

    /// Returns `true` if `uri` is registered in either table.
    #[must_use]
    pub fn has_route(&self, uri: &str) -> bool {
        self.table.read().find(&normalize(uri)).is_some()
    }

    /// Sets or clears the entry used when nothing matches.
    pub fn set_default_route(&self, entry: Option<RouteEntry>) {
        self.table.write().set_default_route(entry);
    }

    /// Appends `middleware` as the innermost layer.
    pub fn add_handler(&self, middleware: BoxedMiddleware) {
        let mut dispatcher = self.dispatcher.write();
        *dispatcher = dispatcher.add_middleware(middleware);
    }

    /// Removes `middleware` (matched by identity).
    pub fn remove_handler(&self, middleware: &BoxedMiddleware) {
        let mut dispatcher = self.dispatcher.write();
        *dispatcher = dispatcher.remove_middleware(middleware);
    }

    /// The current middleware chain.
    #[must_use]
    pub fn get_handlers(&self) -> HttpMiddlewareDispatcher {
        self.dispatcher.read().clone()
    }

    /// Finds the longest registered prefix of `uri`.
    ///
    /// Falls back to the default route when no prefix matches, with every
    /// path segment as a residual argument. Returns `None` when there is no
    /// match and no default route.
    #[must_use]
    pub fn resolve(&self, uri: &str) -> Option<RouteResolution> {
        let path = request_path(uri);
        let lowered = path.to_ascii_lowercase();
        let table = self.table.read();

        let mut candidate = lowered.as_str();
        loop {
            let key = if candidate.is_empty() { "/" } else { candidate };
            if let Some(entry) = table.find(key) {
                tracing::debug!(path = %path, route = key, "Resolved route");
                return Some(RouteResolution {
                    prefix: Some(key.to_string()),
                    entry: entry.clone(),
                    args: residual_arguments(&path, candidate.len()),
                });
            }

            match candidate.rfind('/') {
                Some(end) => candidate = &candidate[..end],
                None => break,
            }
        }

        let entry = table.default_route()?.clone();
        tracing::debug!(path = %path, "No route matched, using default route");
        Some(RouteResolution {
            prefix: None,
            entry,
            args: residual_arguments(&path, 0),
        })
    }

    /// Dispatches `request` through the middleware chain to its route.
    ///
    /// The response handed to the first middleware already carries the
    /// matched entry's data as custom arguments. The core then calls the
    /// entry's bound handler, or the `Controller`/`Function` action named by
    /// the custom arguments as middleware left them. An unmatched path with
    /// no default route passes the response through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ScalyError::ControllerResolution`] if the named controller
    /// or action does not exist, and propagates middleware and action errors.
    pub async fn dispatch(&self, request: Request) -> ScalyResult<Response> {
        let started = Instant::now();
        let dispatcher = self.get_handlers();

        let (label, response, core) = match self.resolve(request.uri().path()) {
            Some(resolution) => {
                let label = resolution
                    .prefix
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ROUTE_LABEL.to_string());
                let response = seed_arguments(resolution.entry.data());
                (label, response, self.core_handler(resolution))
            }
            None => {
                tracing::debug!(http.path = %request.uri().path(), "No route matched");
                metrics::record_route_miss();
                (UNMATCHED_LABEL.to_string(), empty_response(), passthrough())
            }
        };

        let result = dispatcher.dispatch(request, response, core).await;
        match &result {
            Ok(response) => {
                metrics::record_dispatch(&label, response.status().as_u16(), started.elapsed());
            }
            Err(error) => {
                metrics::record_dispatch_error(error.error_code());
                tracing::error!(route = %label, error = %error, "Dispatch failed");
            }
        }
        result
    }

    /// Rebuilds the dynamic table from the controller registry.
    ///
    /// Static routes and the default route are kept. Returns the number of
    /// generated routes.
    pub fn regenerate(&self) -> usize {
        let routes = RouteTableGenerator::generate(&self.registry);
        let count = routes.len();
        self.table.write().replace_routes(routes);
        tracing::info!(routes = count, "Regenerated route table");
        count
    }

    /// Returns `true` if the dynamic table differs from the one last loaded
    /// or persisted.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.table.read().to_document() != *self.loaded.read()
    }

    /// Saves the dynamic table to `source` if it is dirty.
    ///
    /// Returns `true` if the table was written.
    pub fn persist(&self, source: &dyn RouteTableSource) -> ScalyResult<bool> {
        let document = self.table.read().to_document();
        if document == *self.loaded.read() {
            tracing::debug!("Route table unchanged, not persisting");
            return Ok(false);
        }

        source.save(&document)?;
        tracing::info!(
            source = %source.describe(),
            routes = document.len(),
            "Persisted route table"
        );
        *self.loaded.write() = document;
        Ok(true)
    }

    fn core_handler(&self, resolution: RouteResolution) -> CoreHandler<'static> {
        let registry = Arc::clone(&self.registry);
        let handler = resolution.entry.handler().cloned();
        let args = resolution.args;

        Box::new(
            move |request: Request, response: Response| -> BoxFuture<'static, ScalyResult<Response>> {
                Box::pin(async move {
                    match handler {
                        Some(handler) => handler(request, response, args).await,
                        None => invoke_controller(&registry, request, response, args).await,
                    }
                })
            },
        )
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.read().len())
            .field("handlers", &self.dispatcher.read().names())
            .field("controllers", &self.registry.len())
            .finish()
    }
}

/// A fresh response whose custom arguments are the route data.
fn seed_arguments(data: &RouteData) -> Response {
    data.iter().fold(empty_response(), |response, (name, value)| {
        response.with_added_custom_argument(name.clone(), value.clone())
    })
}

/// A core that returns the response untouched.
fn passthrough() -> CoreHandler<'static> {
    Box::new(
        |_request: Request, response: Response| -> BoxFuture<'static, ScalyResult<Response>> {
            Box::pin(async move { Ok(response) })
        },
    )
}

async fn invoke_controller(
    registry: &ControllerRegistry,
    request: Request,
    response: Response,
    args: Vec<String>,
) -> ScalyResult<Response> {
    let controller = response
        .custom_argument_str(arguments::CONTROLLER)
        .map(str::to_string);
    let function = response
        .custom_argument_str(arguments::FUNCTION)
        .map(str::to_string);

    match (controller, function) {
        (Some(controller), Some(function)) => {
            tracing::debug!(
                controller = %controller,
                function = %function,
                args = args.len(),
                "Invoking controller action"
            );
            registry
                .invoke(&controller, &function, request, response, args)
                .await
        }
        (controller, function) => Err(ScalyError::missing_target(
            controller.as_deref(),
            function.as_deref(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use crate::source::MemoryRouteTableSource;
    use scaly_core::ControllerDescriptor;

    fn request(path: &str) -> Request {
        http::Request::builder()
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn router_with(paths: &[(&str, &str)]) -> Router {
        let mut table = RoutingTable::new();
        for (path, controller) in paths {
            table.add_route(RouteEntry::controller(path, controller, "index"));
        }
        Router::new(table, Arc::new(ControllerRegistry::new()))
    }

    #[test]
    fn test_longest_prefix() {
        let router = router_with(&[("/a", "R1"), ("/a/b", "R2")]);

        let resolution = router.resolve("/a/b/c").unwrap();
        assert_eq!(resolution.prefix.as_deref(), Some("/a/b"));
        assert_eq!(resolution.entry.controller_name(), Some("R2"));
        assert_eq!(resolution.args, vec!["c"]);
    }

    #[test]
    fn test_prefix_stops_at_segment_boundary() {
        let router = router_with(&[("/a", "R1")]);

        assert_eq!(router.resolve("/ab").map(|r| r.prefix), None);
        assert_eq!(router.resolve("/a/").unwrap().args, Vec::<String>::new());
    }

    #[test]
    fn test_root_route() {
        let router = router_with(&[("/", "Home")]);

        let resolution = router.resolve("/Anything/Here").unwrap();
        assert_eq!(resolution.prefix.as_deref(), Some("/"));
        assert_eq!(resolution.args, vec!["Anything", "Here"]);
        assert_eq!(router.resolve("/").unwrap().args, Vec::<String>::new());
    }

    #[test]
    fn test_no_match_without_default() {
        let router = router_with(&[("/a", "R1")]);
        assert!(router.resolve("/b/c").is_none());
    }

    #[test]
    fn test_default_route_fallback() {
        let router = router_with(&[("/a", "R1")]);
        router.set_default_route(Some(RouteEntry::controller("/", "NotFound", "show")));

        let resolution = router.resolve("/b/c").unwrap();
        assert_eq!(resolution.prefix, None);
        assert_eq!(resolution.entry.controller_name(), Some("NotFound"));
        assert_eq!(resolution.args, vec!["b", "c"]);
    }

    #[test]
    fn test_resolve_full_uri() {
        let router = router_with(&[("/shop", "Shop")]);
        let resolution = router.resolve("http://example.com/Shop/Item?x=1").unwrap();
        assert_eq!(resolution.args, vec!["Item"]);
    }

    #[test]
    fn test_add_has_remove_route() {
        let router = router_with(&[("/dyn", "D")]);
        router.add_route("http://localhost/Assets", |_req, res, _args| async move { Ok(res) });

        assert!(router.has_route("/assets/"));
        assert!(router.has_route("/DYN"));
        assert!(router.remove_route("/assets"));
        assert!(!router.remove_route("/assets"));
        assert!(!router.has_route("/assets"));
    }

    #[tokio::test]
    async fn test_dispatch_bound_handler_gets_args() {
        let router = router_with(&[]);
        router.add_route("/echo", |_req, res: Response, args: Vec<String>| async move {
            Ok(res.with_added_custom_argument("args", args.join("|")))
        });

        let response = router.dispatch(request("/echo/One/two")).await.unwrap();
        assert_eq!(response.custom_argument_str("args"), Some("One|two"));
        assert_eq!(response.custom_argument_str(arguments::PATH), Some("/echo"));
    }

    #[tokio::test]
    async fn test_dispatch_unmatched_passes_through() {
        let router = router_with(&[]);
        let response = router.dispatch(request("/nowhere")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.custom_arguments().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_controller() {
        let router = router_with(&[("/ghost", "GhostController")]);
        let err = router.dispatch(request("/ghost")).await.unwrap_err();
        assert_eq!(err.error_code(), "CONTROLLER_RESOLUTION");
    }

    #[tokio::test]
    async fn test_dispatch_without_target() {
        let mut table = RoutingTable::new();
        table.add_route(RouteEntry::new("/bare"));
        let router = Router::new(table, Arc::new(ControllerRegistry::new()));

        let err = router.dispatch(request("/bare")).await.unwrap_err();
        assert!(matches!(err, ScalyError::ControllerResolution { .. }));
    }

    #[test]
    fn test_regenerate_keeps_static_routes() {
        let mut registry = ControllerRegistry::new();
        registry.register(ControllerDescriptor::new("Blog").route("/blog", "index"));
        let router = Router::new(RoutingTable::new(), Arc::new(registry));
        router.add_route("/static", |_req, res, _args| async move { Ok(res) });

        assert!(!router.is_dirty());
        assert_eq!(router.regenerate(), 1);
        assert!(router.is_dirty());
        assert!(router.has_route("/blog"));
        assert!(router.has_route("/static"));
    }

    #[test]
    fn test_static_routes_do_not_dirty() {
        let router = router_with(&[("/a", "A")]);
        router.add_route("/s", |_req, res, _args| async move { Ok(res) });
        assert!(!router.is_dirty());

        router.add_entry(RouteEntry::controller("/b", "B", "index"));
        assert!(router.is_dirty());
    }

    #[test]
    fn test_loaded_table_with_unnormalized_keys_is_clean() {
        let source = MemoryRouteTableSource::new(serde_json::json!({
            "routes": {
                "/Blog/": {
                    "Data": { "Controller": "BlogController", "Function": "index" }
                }
            }
        }));

        let router = Router::load(&source, Arc::new(ControllerRegistry::new())).unwrap();
        assert!(router.has_route("/blog"));
        assert!(!router.is_dirty());
        assert!(!router.persist(&source).unwrap());
        assert_eq!(source.save_count(), 0);
    }

    #[test]
    fn test_debug() {
        let router = router_with(&[("/a", "A")]);
        assert!(format!("{router:?}").contains("routes: 1"));
    }
}
