//! Route-table generation from controller route annotations.

use indexmap::IndexMap;
use scaly_core::ControllerRegistry;

use crate::route_entry::RouteEntry;

/// Builds the dynamic routing table from the registered controllers.
///
/// Every route annotation of every controller becomes one dynamic entry
/// whose data holds `Controller`, `Function`, `Path` and, when the route is
/// restricted, `Method`. Controllers are walked in registration order; a
/// path declared twice keeps the later declaration.
///
/// # Example
///
/// ```rust
/// use scaly_core::{ControllerDescriptor, ControllerRegistry};
/// use scaly_router::RouteTableGenerator;
///
/// let mut registry = ControllerRegistry::new();
/// registry.register(
///     ControllerDescriptor::new("ContactController")
///         .route_with_methods("/Contact", "send", ["POST"]),
/// );
///
/// let routes = RouteTableGenerator::generate(&registry);
/// assert_eq!(routes["/contact"].data()["Method"], "POST");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTableGenerator;

impl RouteTableGenerator {
    /// Generates path → entry for every declared route.
    #[must_use]
    pub fn generate(registry: &ControllerRegistry) -> IndexMap<String, RouteEntry> {
        let mut routes = IndexMap::new();

        for descriptor in registry.descriptors() {
            for annotation in descriptor.routes() {
                let entry = RouteEntry::controller(
                    &annotation.path,
                    descriptor.name(),
                    &annotation.function,
                )
                .with_methods(annotation.methods.iter().cloned());

                let key = entry.path().to_string();
                if let Some(previous) = routes.insert(key, entry) {
                    tracing::warn!(
                        route = previous.path(),
                        previous = ?previous.controller_name(),
                        controller = descriptor.name(),
                        "Route declared twice, keeping the later declaration"
                    );
                }
            }
        }

        tracing::debug!(routes = routes.len(), "Generated route table");
        routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaly_core::ControllerDescriptor;
    use serde_json::json;

    fn registry() -> ControllerRegistry {
        let mut registry = ControllerRegistry::new();
        registry.register(
            ControllerDescriptor::new("BlogController")
                .route("/Blog", "index")
                .route_with_methods("/blog/archive", "archive", ["get", "head"]),
        );
        registry.register(ControllerDescriptor::new("HomeController").route("/", "index"));
        registry
    }

    #[test]
    fn test_generates_entries() {
        let routes = RouteTableGenerator::generate(&registry());
        assert_eq!(routes.len(), 3);

        let blog = &routes["/blog"];
        assert!(!blog.is_static());
        assert_eq!(blog.controller_name(), Some("BlogController"));
        assert_eq!(blog.function_name(), Some("index"));
        assert_eq!(blog.data()["Path"], "/blog");
        assert!(blog.data().get("Method").is_none());

        assert_eq!(routes["/blog/archive"].data()["Method"], json!(["GET", "HEAD"]));
        assert_eq!(routes["/"].controller_name(), Some("HomeController"));
    }

    #[test]
    fn test_later_declaration_wins() {
        let mut registry = registry();
        registry.register(ControllerDescriptor::new("NewsController").route("/blog/", "list"));

        let routes = RouteTableGenerator::generate(&registry);
        assert_eq!(routes.len(), 3);
        assert_eq!(routes["/blog"].controller_name(), Some("NewsController"));
    }

    #[test]
    fn test_empty_registry() {
        assert!(RouteTableGenerator::generate(&ControllerRegistry::new()).is_empty());
    }
}
