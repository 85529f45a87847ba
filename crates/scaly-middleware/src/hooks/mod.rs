//! Built-in hooks layered by the framework at boot.
//!
//! 1. [`method_filter`] - answers `405` when the route restricts verbs
//! 2. [`rest_controller`] - picks the action of a REST controller from the verb
//! 3. [`dependency_injection`] - resolves the target controller's named services
//!
//! Hooks read routing metadata from the response's custom-argument bag, which
//! the router seeds from the matched route before the chain runs.

pub mod dependency_injection;
pub mod method_filter;
pub mod rest_controller;

pub use dependency_injection::ControllerDependencyInjectionHook;
pub use method_filter::MethodFilterMiddleware;
pub use rest_controller::RestControllerHook;
