//! Onion-style middleware dispatcher.
//!
//! Given middleware `[m1, m2, .., mn]` in registration order and a core
//! handler, the dispatcher wraps the core from the inside out: `mn` ends up
//! closest to the core and `m1` outermost. Requests therefore pass through
//! the layers in registration order and responses come back out in reverse:
//!
//! ```text
//! m1 before → m2 before → .. → core → .. → m2 after → m1 after
//! ```
//!
//! Adding or removing middleware returns a new dispatcher and leaves the
//! original untouched, so a base dispatcher can be shared and extended per
//! route without interference.

use std::fmt;
use std::sync::Arc;

use scaly_core::{Request, Response, ScalyResult};

use crate::middleware::{BoxFuture, Middleware, Next};

/// A shareable middleware handle.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// An immutable, ordered middleware chain.
#[derive(Clone)]
pub struct HttpMiddlewareDispatcher {
    middleware: Arc<[BoxedMiddleware]>,
}

impl HttpMiddlewareDispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            middleware: Arc::from(Vec::new()),
        }
    }

    /// Creates a dispatcher from middleware in execution order.
    #[must_use]
    pub fn with_middleware<I>(middleware: I) -> Self
    where
        I: IntoIterator<Item = BoxedMiddleware>,
    {
        Self {
            middleware: middleware.into_iter().collect(),
        }
    }

    /// Returns a new dispatcher with `middleware` appended as the innermost layer.
    #[must_use]
    pub fn add_middleware(&self, middleware: BoxedMiddleware) -> Self {
        let mut chain = self.middleware.to_vec();
        chain.push(middleware);
        Self {
            middleware: chain.into(),
        }
    }

    /// Returns a new dispatcher without `middleware`.
    ///
    /// Middleware is matched by identity (the same `Arc`). Removing something
    /// that is not in the chain returns an equivalent dispatcher.
    #[must_use]
    pub fn remove_middleware(&self, middleware: &BoxedMiddleware) -> Self {
        Self {
            middleware: self
                .middleware
                .iter()
                .filter(|m| !Arc::ptr_eq(*m, middleware))
                .cloned()
                .collect(),
        }
    }

    /// The middleware in execution order.
    #[must_use]
    pub fn middleware(&self) -> &[BoxedMiddleware] {
        &self.middleware
    }

    /// Names of the middleware in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }

    /// Number of middleware layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Returns `true` if the chain has no middleware.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Runs `request`/`response` through every layer and finally `core`.
    pub async fn dispatch<H>(
        &self,
        request: Request,
        response: Response,
        core: H,
    ) -> ScalyResult<Response>
    where
        H: FnOnce(Request, Response) -> BoxFuture<'static, ScalyResult<Response>> + Send + 'static,
    {
        let next = self.build_chain(core);
        next.run(request, response).await
    }

    fn build_chain<'a, H>(&'a self, core: H) -> Next<'a>
    where
        H: FnOnce(Request, Response) -> BoxFuture<'static, ScalyResult<Response>> + Send + 'a,
    {
        let mut next = Next::core(move |request, response| -> BoxFuture<'a, ScalyResult<Response>> {
            core(request, response)
        });

        for middleware in self.middleware.iter().rev() {
            next = Next::layer(middleware.as_ref(), next);
        }

        next
    }
}

impl Default for HttpMiddlewareDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HttpMiddlewareDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMiddlewareDispatcher")
            .field("middleware", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use scaly_core::{empty_response, ResponseExt};
    use std::sync::Mutex;

    struct Recording {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            request: Request,
            response: Response,
            next: Next<'a>,
        ) -> BoxFuture<'a, ScalyResult<Response>> {
            Box::pin(async move {
                self.log.lock().unwrap().push(format!("{}:before", self.name));
                let response = next.run(request, response).await?;
                self.log.lock().unwrap().push(format!("{}:after", self.name));
                Ok(response)
            })
        }
    }

    fn recording(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> BoxedMiddleware {
        Arc::new(Recording {
            name,
            log: Arc::clone(log),
        })
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_dispatcher_runs_core() {
        let dispatcher = HttpMiddlewareDispatcher::new();
        assert!(dispatcher.is_empty());

        let response = dispatcher
            .dispatch(request(), empty_response(), |_req, res| {
                Box::pin(async move { Ok(res.with_status(StatusCode::NO_CONTENT)) })
            })
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_registration_order_is_execution_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = HttpMiddlewareDispatcher::new()
            .add_middleware(recording("first", &log))
            .add_middleware(recording("second", &log));

        let core_log = Arc::clone(&log);
        dispatcher
            .dispatch(request(), empty_response(), move |_req, res| {
                Box::pin(async move {
                    core_log.lock().unwrap().push("core".to_string());
                    Ok(res)
                })
            })
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "first:before",
                "second:before",
                "core",
                "second:after",
                "first:after"
            ]
        );
    }

    #[test]
    fn test_add_returns_new_dispatcher() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let base = HttpMiddlewareDispatcher::new().add_middleware(recording("base", &log));
        let extended = base.add_middleware(recording("extra", &log));

        assert_eq!(base.names(), vec!["base"]);
        assert_eq!(extended.names(), vec!["base", "extra"]);
    }

    #[test]
    fn test_remove_by_identity() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recording("same", &log);
        let b = recording("same", &log);

        let dispatcher = HttpMiddlewareDispatcher::with_middleware([Arc::clone(&a), Arc::clone(&b)]);
        let removed = dispatcher.remove_middleware(&a);

        assert_eq!(dispatcher.len(), 2);
        assert_eq!(removed.len(), 1);
        assert!(Arc::ptr_eq(&removed.middleware()[0], &b));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = HttpMiddlewareDispatcher::new().add_middleware(recording("kept", &log));
        let stranger = recording("stranger", &log);

        let after = dispatcher.remove_middleware(&stranger);
        assert_eq!(after.names(), vec!["kept"]);
    }

    #[test]
    fn test_debug_lists_names() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = HttpMiddlewareDispatcher::new().add_middleware(recording("one", &log));
        assert_eq!(
            format!("{dispatcher:?}"),
            r#"HttpMiddlewareDispatcher { middleware: ["one"] }"#
        );
    }
}
