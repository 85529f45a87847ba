//! Method filter hook.
//!
//! Routes may restrict the verbs they accept through a `Method` entry in
//! their data: a single verb (`"POST"`) or a list (`["GET", "HEAD"]`). When
//! the request verb is not listed, this middleware answers
//! `405 Method Not Allowed` itself and the inner layers never run.
//!
//! Routes without a `Method` entry, or with an empty list, accept every verb.

use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use scaly_core::{arguments, Request, Response, ResponseExt, ScalyResult};
use serde_json::Value;

use crate::middleware::{BoxFuture, Middleware, Next};

/// Middleware that rejects verbs a route does not allow.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodFilterMiddleware;

impl MethodFilterMiddleware {
    /// Creates a new method filter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the verbs allowed by the route, or `None` if it allows any.
    fn allowed_methods(response: &Response) -> Option<Vec<String>> {
        let allowed: Vec<String> = match response.custom_argument(arguments::METHOD)? {
            Value::String(method) => vec![method.clone()],
            Value::Array(methods) => methods
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => return None,
        };

        if allowed.is_empty() {
            None
        } else {
            Some(allowed)
        }
    }

    /// Checks whether `method` is among `allowed`, ignoring case.
    fn is_allowed(method: &Method, allowed: &[String]) -> bool {
        allowed
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(method.as_str()))
    }

    fn method_not_allowed(response: Response, allowed: &[String]) -> Response {
        let (parts, _) = response.into_parts();
        let status = StatusCode::METHOD_NOT_ALLOWED;
        let mut denied = Response::error(status, status.canonical_reason().unwrap_or_default());
        *denied.extensions_mut() = parts.extensions;

        let allow = allowed
            .iter()
            .map(|m| m.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&allow) {
            denied.headers_mut().insert(ALLOW, value);
        }

        denied
    }
}

impl Middleware for MethodFilterMiddleware {
    fn name(&self) -> &'static str {
        "method_filter"
    }

    fn process<'a>(
        &'a self,
        request: Request,
        response: Response,
        next: Next<'a>,
    ) -> BoxFuture<'a, ScalyResult<Response>> {
        Box::pin(async move {
            if let Some(allowed) = Self::allowed_methods(&response) {
                if !Self::is_allowed(request.method(), &allowed) {
                    tracing::debug!(
                        http.method = %request.method(),
                        allowed = ?allowed,
                        "Method not allowed for route"
                    );
                    scaly_telemetry::metrics::record_short_circuit(self.name());
                    return Ok(Self::method_not_allowed(response, &allowed));
                }
            }

            next.run(request, response).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use scaly_core::empty_response;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request(method: Method) -> Request {
        http::Request::builder()
            .method(method)
            .uri("/orders")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    async fn run(method: Method, response: Response) -> (Response, usize) {
        let filter = MethodFilterMiddleware::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let next = Next::core(move |_req, res| {
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(res)
            })
        });

        let response = filter
            .process(request(method), response, next)
            .await
            .unwrap();
        (response, calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_rejects_disallowed_method() {
        let response = empty_response().with_added_custom_argument(arguments::METHOD, "POST");
        let (response, calls) = run(Method::GET, response).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "POST");
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_passes_allowed_method() {
        let response = empty_response().with_added_custom_argument(arguments::METHOD, "POST");
        let (response, calls) = run(Method::POST, response).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_method_list_and_case() {
        let response = empty_response()
            .with_added_custom_argument(arguments::METHOD, serde_json::json!(["get", "head"]));
        let (_, calls) = run(Method::HEAD, response).await;
        assert_eq!(calls, 1);

        let response = empty_response()
            .with_added_custom_argument(arguments::METHOD, serde_json::json!(["get", "head"]));
        let (response, calls) = run(Method::DELETE, response).await;
        assert_eq!(calls, 0);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET, HEAD");
    }

    #[tokio::test]
    async fn test_no_restriction_passes() {
        let (_, calls) = run(Method::PATCH, empty_response()).await;
        assert_eq!(calls, 1);

        let response =
            empty_response().with_added_custom_argument(arguments::METHOD, serde_json::json!([]));
        let (_, calls) = run(Method::PATCH, response).await;
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_rejection_keeps_custom_arguments() {
        let response = empty_response()
            .with_added_custom_argument(arguments::CONTROLLER, "OrderController")
            .with_added_custom_argument(arguments::METHOD, "PUT");
        let (response, _) = run(Method::GET, response).await;

        assert_eq!(
            response.custom_argument_str(arguments::CONTROLLER),
            Some("OrderController")
        );
    }
}
