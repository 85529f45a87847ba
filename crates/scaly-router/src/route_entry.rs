//! Route entries.

use std::fmt;

use indexmap::IndexMap;
use scaly_core::{arguments, Action};
use serde_json::Value;

use crate::path::normalize;

/// Route metadata carried into the custom-argument bag on dispatch.
///
/// Conventionally holds `Controller`, `Function`, `Path` and optionally
/// `Method`. Equality ignores insertion order.
pub type RouteData = IndexMap<String, Value>;

/// A handler bound directly to a route.
pub type RouteHandler = Action;

/// A single path binding.
///
/// Entries are values: the `with_*` methods return an updated copy and
/// leave `self` untouched.
///
/// # Example
///
/// ```rust
/// use scaly_router::RouteEntry;
///
/// let entry = RouteEntry::controller("/Blog/", "BlogController", "index");
/// assert_eq!(entry.path(), "/blog");
/// assert_eq!(entry.controller_name(), Some("BlogController"));
///
/// let restricted = entry.with_methods(["GET"]);
/// assert!(entry.data().get("Method").is_none());
/// assert!(restricted.data().get("Method").is_some());
/// ```
#[derive(Clone)]
pub struct RouteEntry {
    path: String,
    is_static: bool,
    data: RouteData,
    handler: Option<RouteHandler>,
}

impl RouteEntry {
    /// Creates a dynamic entry for `path` with no data.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: normalize(path),
            is_static: false,
            data: RouteData::new(),
            handler: None,
        }
    }

    /// Creates a dynamic entry dispatching to `controller::function`.
    #[must_use]
    pub fn controller(path: &str, controller: &str, function: &str) -> Self {
        let entry = Self::new(path);
        let mut data = RouteData::new();
        data.insert(arguments::CONTROLLER.to_string(), Value::from(controller));
        data.insert(arguments::FUNCTION.to_string(), Value::from(function));
        data.insert(arguments::PATH.to_string(), Value::from(entry.path.as_str()));
        entry.with_data(data)
    }

    /// Returns a copy registered under `path`.
    #[must_use]
    pub fn with_path(&self, path: &str) -> Self {
        Self {
            path: normalize(path),
            ..self.clone()
        }
    }

    /// Returns a copy that lives in the static or the dynamic table.
    #[must_use]
    pub fn with_static(&self, is_static: bool) -> Self {
        Self {
            is_static,
            ..self.clone()
        }
    }

    /// Returns a copy with its data replaced.
    #[must_use]
    pub fn with_data(&self, data: RouteData) -> Self {
        Self {
            data,
            ..self.clone()
        }
    }

    /// Returns a copy with one data value set.
    #[must_use]
    pub fn with_data_value(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut entry = self.clone();
        entry.data.insert(name.into(), value.into());
        entry
    }

    /// Returns a copy restricted to the given verbs.
    ///
    /// A single verb is stored as a string, several as a list.
    #[must_use]
    pub fn with_methods<I, S>(&self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut methods: Vec<Value> = methods
            .into_iter()
            .map(|m| Value::String(m.into().to_ascii_uppercase()))
            .collect();

        match methods.len() {
            0 => {
                let mut entry = self.clone();
                entry.data.shift_remove(arguments::METHOD);
                entry
            }
            1 => self.with_data_value(arguments::METHOD, methods.remove(0)),
            _ => self.with_data_value(arguments::METHOD, Value::Array(methods)),
        }
    }

    /// Returns a copy bound to `handler`.
    #[must_use]
    pub fn with_handler(&self, handler: RouteHandler) -> Self {
        Self {
            handler: Some(handler),
            ..self.clone()
        }
    }

    /// The normalised route path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the entry belongs to the static table.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Route metadata.
    #[must_use]
    pub fn data(&self) -> &RouteData {
        &self.data
    }

    /// The bound handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<&RouteHandler> {
        self.handler.as_ref()
    }

    /// The `Controller` data value.
    #[must_use]
    pub fn controller_name(&self) -> Option<&str> {
        self.data.get(arguments::CONTROLLER).and_then(Value::as_str)
    }

    /// The `Function` data value.
    #[must_use]
    pub fn function_name(&self) -> Option<&str> {
        self.data.get(arguments::FUNCTION).and_then(Value::as_str)
    }
}

/// Bound handlers are live-only and take no part in equality.
impl PartialEq for RouteEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.is_static == other.is_static && self.data == other.data
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("path", &self.path)
            .field("is_static", &self.is_static)
            .field("data", &self.data)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}
