//! Controller dependency injection hook.
//!
//! Before the target controller runs, every injection point it declares is
//! filled from the [`ServiceContainer`] and the resulting [`Injected`] bag is
//! attached to the request. Actions read their services from the request,
//! so the services are scoped to this request only.

use std::sync::Arc;

use scaly_core::{
    arguments, ControllerRegistry, Injected, Request, Response, ResponseExt, ScalyError,
    ScalyResult, ServiceContainer,
};

use crate::middleware::{BoxFuture, Middleware, Next};

/// Middleware that resolves the target controller's named services.
#[derive(Debug, Clone)]
pub struct ControllerDependencyInjectionHook {
    registry: Arc<ControllerRegistry>,
    services: Arc<ServiceContainer>,
}

impl ControllerDependencyInjectionHook {
    /// Creates the hook.
    #[must_use]
    pub fn new(registry: Arc<ControllerRegistry>, services: Arc<ServiceContainer>) -> Self {
        Self { registry, services }
    }

    fn inject(&self, mut request: Request, response: &Response) -> ScalyResult<Request> {
        let Some(descriptor) = response
            .custom_argument_str(arguments::CONTROLLER)
            .and_then(|name| self.registry.get(name))
        else {
            return Ok(request);
        };

        if descriptor.injections().is_empty() {
            return Ok(request);
        }

        let mut injected = request
            .extensions_mut()
            .remove::<Injected>()
            .unwrap_or_default();

        for point in descriptor.injections() {
            let service = self.services.resolve_any(&point.service).ok_or_else(|| {
                ScalyError::service_not_registered(&point.service, descriptor.name())
            })?;
            injected.insert(point.slot.clone(), service);
        }

        tracing::debug!(
            controller = descriptor.name(),
            slots = injected.len(),
            "Injected controller services"
        );
        request.extensions_mut().insert(injected);
        Ok(request)
    }
}

impl Middleware for ControllerDependencyInjectionHook {
    fn name(&self) -> &'static str {
        "dependency_injection"
    }

    fn process<'a>(
        &'a self,
        request: Request,
        response: Response,
        next: Next<'a>,
    ) -> BoxFuture<'a, ScalyResult<Response>> {
        Box::pin(async move {
            let request = self.inject(request, &response)?;
            next.run(request, response).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;
    use scaly_core::{empty_response, ControllerDescriptor};

    struct Mailer {
        sender: &'static str,
    }

    fn hook(with_mailer: bool) -> ControllerDependencyInjectionHook {
        let mut registry = ControllerRegistry::new();
        registry.register(ControllerDescriptor::new("SignupController").inject("mail", "mailer"));
        registry.register(ControllerDescriptor::new("HomeController"));

        let mut services = ServiceContainer::new();
        if with_mailer {
            services.register(
                "mailer",
                Arc::new(Mailer {
                    sender: "noreply@example.com",
                }),
            );
        }

        ControllerDependencyInjectionHook::new(Arc::new(registry), Arc::new(services))
    }

    fn request() -> Request {
        http::Request::builder()
            .uri("/signup")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn targeting(controller: &str) -> Response {
        empty_response().with_added_custom_argument(arguments::CONTROLLER, controller)
    }

    #[tokio::test]
    async fn test_injects_declared_services() {
        let injector = hook(true);
        let next = Next::core(|req: Request, res| {
            Box::pin(async move {
                let injected = req.extensions().get::<Injected>().unwrap();
                let mailer = injected.get::<Mailer>("mail").unwrap();
                Ok(res.with_added_custom_argument("sender", mailer.sender))
            })
        });

        let response = injector
            .process(request(), targeting("SignupController"), next)
            .await
            .unwrap();
        assert_eq!(
            response.custom_argument_str("sender"),
            Some("noreply@example.com")
        );
    }

    #[tokio::test]
    async fn test_missing_service_is_an_error() {
        let injector = hook(false);
        let next = Next::core(|_req, res| Box::pin(async move { Ok(res) }));

        let err = injector
            .process(request(), targeting("SignupController"), next)
            .await
            .unwrap_err();
        assert!(matches!(err, ScalyError::ServiceResolution { ref service, .. } if service == "mailer"));
    }

    #[tokio::test]
    async fn test_controller_without_injections_untouched() {
        let injector = hook(false);
        let next = Next::core(|req: Request, res| {
            Box::pin(async move {
                assert!(req.extensions().get::<Injected>().is_none());
                Ok(res)
            })
        });

        injector
            .process(request(), targeting("HomeController"), next)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_no_controller_argument_untouched() {
        let injector = hook(false);
        let next = Next::core(|_req, res| Box::pin(async move { Ok(res) }));

        assert!(injector
            .process(request(), empty_response(), next)
            .await
            .is_ok());
    }
}
