//! Error types for Scaly.
//!
//! Structural problems (a malformed route table, a controller or action that
//! does not exist) are errors. Per-request routing outcomes are not: an
//! unmatched path falls through to a pass-through handler and a disallowed
//! verb becomes a `405` response produced by middleware.
//!
//! Every error maps onto an HTTP status so the embedding server can turn a
//! failed dispatch into a response instead of tearing down the process.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{Response, ResponseExt};

/// Result type alias using [`ScalyError`].
pub type ScalyResult<T> = Result<T, ScalyError>;

/// Standard error type for Scaly.
///
/// # Example
///
/// ```
/// use scaly_core::ScalyError;
///
/// let err = ScalyError::unknown_controller("UserController", "index");
/// assert_eq!(err.error_code(), "CONTROLLER_RESOLUTION");
/// assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
/// ```
#[derive(Error, Debug)]
pub enum ScalyError {
    /// The route-table data handed to the router is malformed.
    #[error("Invalid route table: {message}")]
    InvalidRouteTable {
        /// What was wrong with the table.
        message: String,
    },

    /// The controller or action a route points at does not exist.
    #[error("Cannot resolve {controller}::{function}: {reason}")]
    ControllerResolution {
        /// Controller class name as found in the route data.
        controller: String,
        /// Action name as found in the route data.
        function: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A service the target controller asked to have injected is not registered.
    #[error("Service '{service}' required by {controller} is not registered")]
    ServiceResolution {
        /// The service name requested by the controller.
        service: String,
        /// The controller that declared the injection.
        controller: String,
    },

    /// The persisted route table could not be read or written.
    #[error("Route table source error at {path}: {source}")]
    RouteTableSource {
        /// Location of the route table.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ScalyError {
    /// Creates an invalid route table error.
    #[must_use]
    pub fn invalid_route_table(message: impl Into<String>) -> Self {
        Self::InvalidRouteTable {
            message: message.into(),
        }
    }

    /// Creates a controller resolution error for an unknown controller.
    #[must_use]
    pub fn unknown_controller(controller: impl Into<String>, function: impl Into<String>) -> Self {
        Self::ControllerResolution {
            controller: controller.into(),
            function: function.into(),
            reason: "controller is not registered".to_string(),
        }
    }

    /// Creates a controller resolution error for an unknown action.
    #[must_use]
    pub fn unknown_action(controller: impl Into<String>, function: impl Into<String>) -> Self {
        Self::ControllerResolution {
            controller: controller.into(),
            function: function.into(),
            reason: "controller has no such action".to_string(),
        }
    }

    /// Creates a controller resolution error for a dispatch that carries no
    /// `Controller` / `Function` arguments.
    #[must_use]
    pub fn missing_target(controller: Option<&str>, function: Option<&str>) -> Self {
        Self::ControllerResolution {
            controller: controller.unwrap_or_default().to_string(),
            function: function.unwrap_or_default().to_string(),
            reason: "route data names no controller action".to_string(),
        }
    }

    /// Creates a service resolution error.
    #[must_use]
    pub fn service_not_registered(
        service: impl Into<String>,
        controller: impl Into<String>,
    ) -> Self {
        Self::ServiceResolution {
            service: service.into(),
            controller: controller.into(),
        }
    }

    /// Creates a route table source error.
    #[must_use]
    pub fn route_table_source(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::RouteTableSource {
            path: path.into(),
            source,
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Every variant describes a server-side fault, so all of them are `500`.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    /// Returns the stable error code used in error envelopes.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRouteTable { .. } => "INVALID_ROUTE_TABLE",
            Self::ControllerResolution { .. } => "CONTROLLER_RESOLUTION",
            Self::ServiceResolution { .. } => "SERVICE_RESOLUTION",
            Self::RouteTableSource { .. } => "ROUTE_TABLE_SOURCE",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
            },
        }
    }

    /// Renders this error as a JSON error response.
    #[must_use]
    pub fn into_response(self) -> Response {
        Response::json_error(self.status_code(), self.error_code(), &self.to_string())
    }
}

/// Serializable error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error payload.
    pub error: ErrorDetail,
}

/// Error details inside an [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}
