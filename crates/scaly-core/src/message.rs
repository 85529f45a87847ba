//! HTTP message types used throughout the dispatch pipeline.
//!
//! Requests and responses are plain `http` messages with a buffered body.
//! Responses additionally carry a *custom-argument bag*: an ad hoc key/value
//! store kept in the response extensions. The router seeds it with the
//! matched route's data, middleware may rewrite entries, and the terminal
//! handler reads `Controller` / `Function` back out of it.
//!
//! All mutators take `self` by value and hand back the updated message, so a
//! response that was cloned before a middleware ran is never affected.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use indexmap::IndexMap;
use serde_json::Value;

/// The HTTP request type used in the dispatch pipeline.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the dispatch pipeline.
pub type Response = http::Response<Full<Bytes>>;

/// Well-known custom-argument keys.
pub mod arguments {
    /// Controller class name the terminal handler instantiates.
    pub const CONTROLLER: &str = "Controller";
    /// Action (method) name invoked on the controller.
    pub const FUNCTION: &str = "Function";
    /// Allowed HTTP verb(s): a string or a list of strings.
    pub const METHOD: &str = "Method";
    /// Route path the entry was registered under.
    pub const PATH: &str = "Path";
}

/// Custom arguments attached to a response.
///
/// Insertion order is kept for readable debugging output only; equality
/// ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomArguments(IndexMap<String, Value>);

impl CustomArguments {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns `true` if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Inserts or replaces an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Number of stored arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Creates an empty `200 OK` response.
#[must_use]
pub fn empty_response() -> Response {
    http::Response::new(Full::new(Bytes::new()))
}

/// Immutable-with-mutator helpers for [`Response`].
pub trait ResponseExt: Sized {
    /// Creates a plain-text response with the given status code and message.
    fn error(status: StatusCode, message: &str) -> Response;

    /// Creates a JSON error response.
    fn json_error(status: StatusCode, code: &str, message: &str) -> Response;

    /// Returns the response with its status replaced.
    fn with_status(self, status: StatusCode) -> Self;

    /// Returns the response with `name` set to `value` in the custom-argument bag.
    fn with_added_custom_argument(self, name: impl Into<String>, value: impl Into<Value>) -> Self;

    /// Returns `true` if the custom-argument bag contains `name`.
    fn has_custom_argument(&self, name: &str) -> bool;

    /// Returns the custom argument stored under `name`.
    fn custom_argument(&self, name: &str) -> Option<&Value>;

    /// Returns the custom argument under `name` if it is a string.
    fn custom_argument_str(&self, name: &str) -> Option<&str> {
        self.custom_argument(name).and_then(Value::as_str)
    }

    /// Returns the whole custom-argument bag, if any argument was ever set.
    fn custom_arguments(&self) -> Option<&CustomArguments>;
}

impl ResponseExt for Response {
    fn error(status: StatusCode, message: &str) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::from(message.to_string())));
        *response.status_mut() = status;
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }

    fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
        let body = serde_json::json!({
            "error": {
                "code": code,
                "message": message
            }
        });

        let mut response = http::Response::new(Full::new(Bytes::from(body.to_string())));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }

    fn with_status(mut self, status: StatusCode) -> Self {
        *self.status_mut() = status;
        self
    }

    fn with_added_custom_argument(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        match self.extensions_mut().get_mut::<CustomArguments>() {
            Some(arguments) => arguments.insert(name, value),
            None => {
                let mut arguments = CustomArguments::new();
                arguments.insert(name, value);
                self.extensions_mut().insert(arguments);
            }
        }
        self
    }

    fn has_custom_argument(&self, name: &str) -> bool {
        self.custom_arguments()
            .is_some_and(|arguments| arguments.contains(name))
    }

    fn custom_argument(&self, name: &str) -> Option<&Value> {
        self.custom_arguments()?.get(name)
    }

    fn custom_arguments(&self) -> Option<&CustomArguments> {
        self.extensions().get::<CustomArguments>()
    }
}
