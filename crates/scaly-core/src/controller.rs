//! Controller registry.
//!
//! Controllers are registered once at startup as [`ControllerDescriptor`]s:
//! a class name, a set of typed actions, optional injection points, optional
//! route annotations and a REST capability flag. The router's terminal
//! handler looks actions up by the `Controller` / `Function` names carried in
//! the route data, so routing metadata stays plain strings while invocation
//! stays statically typed.
//!
//! Class and action names are matched case-insensitively.
//!
//! # Example
//!
//! ```rust
//! use scaly_core::{ControllerDescriptor, ControllerRegistry, ResponseExt};
//! use http::StatusCode;
//!
//! let mut registry = ControllerRegistry::new();
//! registry.register(
//!     ControllerDescriptor::new("PostController")
//!         .route("/posts", "index")
//!         .action("index", |_req, res, _args| async move {
//!             Ok(res.with_status(StatusCode::OK))
//!         }),
//! );
//!
//! assert!(registry.contains("postcontroller"));
//! assert!(registry.get("PostController").unwrap().has_action("Index"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{ScalyError, ScalyResult};
use crate::message::{Request, Response};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A controller action.
///
/// Receives the request, the response built up by middleware, and the
/// residual path segments as positional arguments.
pub type Action = Arc<
    dyn Fn(Request, Response, Vec<String>) -> BoxFuture<'static, ScalyResult<Response>>
        + Send
        + Sync,
>;

/// A route declared by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAnnotation {
    /// Route path, e.g. `/blog/posts`.
    pub path: String,
    /// Action the path dispatches to.
    pub function: String,
    /// Allowed HTTP verbs. Empty means any.
    pub methods: Vec<String>,
}

/// A named service a controller wants injected before its actions run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionPoint {
    /// Slot the action reads the service from.
    pub slot: String,
    /// Name the service is registered under.
    pub service: String,
}

/// Everything the framework knows about one controller.
pub struct ControllerDescriptor {
    name: String,
    rest: bool,
    injections: Vec<InjectionPoint>,
    routes: Vec<RouteAnnotation>,
    actions: HashMap<String, Action>,
}

impl ControllerDescriptor {
    /// Creates a descriptor for the controller class `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rest: false,
            injections: Vec::new(),
            routes: Vec::new(),
            actions: HashMap::new(),
        }
    }

    /// Marks the controller as a REST controller.
    ///
    /// REST controllers have their action chosen from the request verb.
    #[must_use]
    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }

    /// Declares that `slot` must be filled with the service named `service`.
    #[must_use]
    pub fn inject(mut self, slot: impl Into<String>, service: impl Into<String>) -> Self {
        self.injections.push(InjectionPoint {
            slot: slot.into(),
            service: service.into(),
        });
        self
    }

    /// Declares a route that dispatches to `function` for any verb.
    #[must_use]
    pub fn route(self, path: impl Into<String>, function: impl Into<String>) -> Self {
        self.route_with_methods(path, function, std::iter::empty::<String>())
    }

    /// Declares a route restricted to the given verbs.
    #[must_use]
    pub fn route_with_methods<I, S>(
        mut self,
        path: impl Into<String>,
        function: impl Into<String>,
        methods: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routes.push(RouteAnnotation {
            path: path.into(),
            function: function.into(),
            methods: methods.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Registers an action.
    #[must_use]
    pub fn action<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
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
        self.actions.insert(name.into().to_ascii_lowercase(), action);
        self
    }

    /// The controller class name as registered.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the controller is a REST controller.
    #[must_use]
    pub fn is_rest(&self) -> bool {
        self.rest
    }

    /// Declared injection points.
    #[must_use]
    pub fn injections(&self) -> &[InjectionPoint] {
        &self.injections
    }

    /// Declared routes.
    #[must_use]
    pub fn routes(&self) -> &[RouteAnnotation] {
        &self.routes
    }

    /// Looks up an action by name.
    #[must_use]
    pub fn get_action(&self, name: &str) -> Option<&Action> {
        self.actions.get(&name.to_ascii_lowercase())
    }

    /// Checks whether an action exists.
    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.get_action(name).is_some()
    }
}

impl fmt::Debug for ControllerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut actions: Vec<&String> = self.actions.keys().collect();
        actions.sort();
        f.debug_struct("ControllerDescriptor")
            .field("name", &self.name)
            .field("rest", &self.rest)
            .field("injections", &self.injections)
            .field("routes", &self.routes)
            .field("actions", &actions)
            .finish()
    }
}

/// All registered controllers.
#[derive(Debug, Default, Clone)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Arc<ControllerDescriptor>>,
    order: Vec<String>,
}

impl ControllerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller, replacing any controller with the same name.
    pub fn register(&mut self, descriptor: ControllerDescriptor) {
        let key = descriptor.name().to_ascii_lowercase();
        if self
            .controllers
            .insert(key.clone(), Arc::new(descriptor))
            .is_none()
        {
            self.order.push(key);
        } else {
            tracing::warn!(controller = %key, "Controller registered twice, keeping the latest");
        }
    }

    /// Looks up a controller by class name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ControllerDescriptor>> {
        self.controllers.get(&name.to_ascii_lowercase())
    }

    /// Checks whether a controller is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over controllers in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &Arc<ControllerDescriptor>> {
        self.order.iter().filter_map(|key| self.controllers.get(key))
    }

    /// Number of registered controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// Returns `true` if no controller is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Resolves `controller::function` to a callable action.
    pub fn resolve_action(&self, controller: &str, function: &str) -> ScalyResult<Action> {
        let descriptor = self
            .get(controller)
            .ok_or_else(|| ScalyError::unknown_controller(controller, function))?;

        descriptor
            .get_action(function)
            .cloned()
            .ok_or_else(|| ScalyError::unknown_action(controller, function))
    }

    /// Resolves and invokes `controller::function`.
    pub async fn invoke(
        &self,
        controller: &str,
        function: &str,
        request: Request,
        response: Response,
        args: Vec<String>,
    ) -> ScalyResult<Response> {
        let action = self.resolve_action(controller, function)?;
        action(request, response, args).await
    }
}
