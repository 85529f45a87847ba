//! Core middleware trait and continuation type.
//!
//! A middleware receives the request, the response built so far, and a
//! [`Next`] continuation standing for every layer inside it, ending with
//! the core handler. It may:
//!
//! - inspect or replace the request/response before calling `next`,
//! - call `next.run(request, response)` to continue inward,
//! - post-process the response returned by `next`,
//! - return without calling `next` at all, which skips every inner layer.
//!
//! # Example
//!
//! ```ignore
//! use scaly_middleware::{BoxFuture, Middleware, Next};
//! use scaly_core::{Request, Response, ScalyResult};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         request: Request,
//!         response: Response,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, ScalyResult<Response>> {
//!         Box::pin(async move {
//!             let started = std::time::Instant::now();
//!             let response = next.run(request, response).await?;
//!             tracing::debug!(elapsed = ?started.elapsed(), "inner layers finished");
//!             Ok(response)
//!         })
//!     }
//! }
//! ```

use scaly_core::{Request, Response, ScalyResult};
pub use scaly_core::BoxFuture;

/// The core middleware trait.
///
/// # Invariants
///
/// - Middleware calls `next.run()` at most once. Not calling it short-circuits
///   the chain and the returned response is final.
/// - Errors from inner layers are propagated, not swallowed.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware.
    ///
    /// This name is used for logging and metrics.
    fn name(&self) -> &'static str;

    /// Processes the request/response pair.
    ///
    /// # Arguments
    ///
    /// * `request` - The incoming HTTP request
    /// * `response` - The response accumulated so far (status, custom arguments)
    /// * `next` - Continuation invoking the inner layers
    fn process<'a>(
        &'a self,
        request: Request,
        response: Response,
        next: Next<'a>,
    ) -> BoxFuture<'a, ScalyResult<Response>>;
}

/// The terminal handler at the centre of the chain.
pub type CoreHandler<'a> =
    Box<dyn FnOnce(Request, Response) -> BoxFuture<'a, ScalyResult<Response>> + Send + 'a>;

/// Continuation invoking the next middleware, or the core handler.
///
/// `run` consumes `self`, so each layer can continue inward at most once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More middleware to process
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain - invoke the core handler
    Core(CoreHandler<'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that wraps `next` with `middleware`.
    pub fn layer(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the core handler.
    pub fn core<F>(f: F) -> Self
    where
        F: FnOnce(Request, Response) -> BoxFuture<'a, ScalyResult<Response>> + Send + 'a,
    {
        Self {
            inner: NextInner::Core(Box::new(f)),
        }
    }

    /// Invokes the next middleware or the core handler.
    pub async fn run(self, request: Request, response: Response) -> ScalyResult<Response> {
        match self.inner {
            NextInner::Chain { middleware, next } => {
                tracing::trace!(middleware = middleware.name(), "Entering middleware");
                middleware.process(request, response, *next).await
            }
            NextInner::Core(handler) => handler(request, response).await,
        }
    }
}

/// A middleware defined by a closure.
///
/// # Example
///
/// ```ignore
/// let tagger = FnMiddleware::new("tagger", |request, response, next| {
///     Box::pin(async move {
///         let response = response.with_added_custom_argument("Tagged", true);
///         next.run(request, response).await
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(Request, Response, Next<'a>) -> BoxFuture<'a, ScalyResult<Response>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(Request, Response, Next<'a>) -> BoxFuture<'a, ScalyResult<Response>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        request: Request,
        response: Response,
        next: Next<'a>,
    ) -> BoxFuture<'a, ScalyResult<Response>> {
        (self.func)(request, response, next)
    }
}
