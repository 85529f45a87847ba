//! REST controller hook.
//!
//! For controllers registered as REST controllers the action is chosen by
//! the request verb rather than by the route:
//!
//! | Verb     | Action   |
//! |----------|----------|
//! | `GET`    | `get`    |
//! | `POST`   | `create` |
//! | `PUT`    | `update` |
//! | `PATCH`  | `patch`  |
//! | `DELETE` | `delete` |
//!
//! Any other verb leaves the `Function` argument as the route set it.

use std::sync::Arc;

use http::Method;
use scaly_core::{arguments, ControllerRegistry, Request, Response, ResponseExt, ScalyResult};

use crate::middleware::{BoxFuture, Middleware, Next};

/// Maps an HTTP verb to the canonical REST action name.
#[must_use]
pub fn rest_function(method: &Method) -> Option<&'static str> {
    match *method {
        Method::GET => Some("get"),
        Method::POST => Some("create"),
        Method::PUT => Some("update"),
        Method::PATCH => Some("patch"),
        Method::DELETE => Some("delete"),
        _ => None,
    }
}

/// Middleware that rewrites `Function` for REST controllers.
#[derive(Debug, Clone)]
pub struct RestControllerHook {
    registry: Arc<ControllerRegistry>,
}

impl RestControllerHook {
    /// Creates the hook over the given controller registry.
    #[must_use]
    pub fn new(registry: Arc<ControllerRegistry>) -> Self {
        Self { registry }
    }

    fn targets_rest_controller(&self, response: &Response) -> bool {
        response
            .custom_argument_str(arguments::CONTROLLER)
            .and_then(|name| self.registry.get(name))
            .is_some_and(|descriptor| descriptor.is_rest())
    }
}

impl Middleware for RestControllerHook {
    fn name(&self) -> &'static str {
        "rest_controller"
    }

    fn process<'a>(
        &'a self,
        request: Request,
        response: Response,
        next: Next<'a>,
    ) -> BoxFuture<'a, ScalyResult<Response>> {
        Box::pin(async move {
            let response = match rest_function(request.method()) {
                Some(function) if self.targets_rest_controller(&response) => {
                    tracing::debug!(
                        http.method = %request.method(),
                        function,
                        "Mapped REST verb to action"
                    );
                    response.with_added_custom_argument(arguments::FUNCTION, function)
                }
                _ => response,
            };

            next.run(request, response).await
        })
    }
}
