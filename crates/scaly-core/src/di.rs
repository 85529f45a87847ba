//! Named service container.
//!
//! Controllers declare *injection points*: a slot name plus the name of the
//! service that should fill it. At dispatch time the injection hook resolves
//! each named service from the [`ServiceContainer`] and hands the results to
//! the action through an [`Injected`] bag stored in the request extensions.
//! Nothing is written to process-wide state, so concurrent requests for the
//! same controller never observe each other's services.
//!
//! # Example
//!
//! ```rust
//! use scaly_core::di::{Injected, ServiceContainer};
//! use std::sync::Arc;
//!
//! struct Mailer {
//!     host: String,
//! }
//!
//! let mut container = ServiceContainer::new();
//! container.register("mailer", Arc::new(Mailer { host: "smtp.local".into() }));
//!
//! let mut injected = Injected::new();
//! injected.insert("mail", container.resolve_any("mailer").unwrap());
//!
//! let mailer: Arc<Mailer> = injected.get("mail").unwrap();
//! assert_eq!(mailer.host, "smtp.local");
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased shared service.
pub type SharedService = Arc<dyn Any + Send + Sync>;

/// A named service locator.
///
/// Services are registered once at startup and looked up by name.
#[derive(Default, Clone)]
pub struct ServiceContainer {
    services: HashMap<String, SharedService>,
}

impl ServiceContainer {
    /// Creates a new empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Registers a service under `name`, replacing any previous registration.
    pub fn register<T: Send + Sync + 'static>(&mut self, name: impl Into<String>, service: Arc<T>) {
        self.services.insert(name.into(), service);
    }

    /// Resolves a service by name and type.
    ///
    /// Returns `None` if nothing is registered under `name` or the
    /// registered service has a different type.
    #[must_use]
    pub fn resolve<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.services
            .get(name)
            .and_then(|s| s.clone().downcast::<T>().ok())
    }

    /// Resolves a service by name without a type check.
    #[must_use]
    pub fn resolve_any(&self, name: &str) -> Option<SharedService> {
        self.services.get(name).cloned()
    }

    /// Checks if a service is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.services.keys().collect();
        names.sort();
        f.debug_struct("ServiceContainer")
            .field("services", &names)
            .finish()
    }
}

/// Services resolved for a single request, keyed by injection slot.
#[derive(Default, Clone)]
pub struct Injected {
    slots: HashMap<String, SharedService>,
}

impl Injected {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills `slot` with `service`.
    pub fn insert(&mut self, slot: impl Into<String>, service: SharedService) {
        self.slots.insert(slot.into(), service);
    }

    /// Returns the service in `slot` if it has type `T`.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self, slot: &str) -> Option<Arc<T>> {
        self.slots
            .get(slot)
            .and_then(|s| s.clone().downcast::<T>().ok())
    }

    /// Checks if `slot` has been filled.
    #[must_use]
    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    /// Number of filled slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot has been filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut slots: Vec<&String> = self.slots.keys().collect();
        slots.sort();
        f.debug_struct("Injected").field("slots", &slots).finish()
    }
}
