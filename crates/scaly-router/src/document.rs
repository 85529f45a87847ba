//! Persisted route-table document.
//!
//! The on-disk shape is:
//!
//! ```json
//! {
//!   "routes": {
//!     "/blog": {
//!       "Data": {
//!         "Controller": "BlogController",
//!         "Function": "index",
//!         "Path": "/blog",
//!         "Method": ["GET", "HEAD"]
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Only the dynamic table is persisted. Static routes are registered by
//! code on every start and bound handlers cannot be serialised.

use indexmap::IndexMap;
use scaly_core::{ScalyError, ScalyResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::normalize;
use crate::route_entry::{RouteData, RouteEntry};

/// The serialised form of a routing table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTableDocument {
    /// Route records keyed by path.
    #[serde(default)]
    pub routes: IndexMap<String, PersistedRoute>,
}

/// One persisted route record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedRoute {
    /// Route metadata.
    #[serde(rename = "Data")]
    pub data: RouteData,
}

impl RouteTableDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a document from loaded JSON.
    ///
    /// The root must be an object. A missing `routes` key is an empty table;
    /// any other shape mismatch is an [`ScalyError::InvalidRouteTable`].
    pub fn from_value(value: Value) -> ScalyResult<Self> {
        if !value.is_object() {
            return Err(ScalyError::invalid_route_table(format!(
                "expected an object at the root, found {}",
                kind(&value)
            )));
        }

        serde_json::from_value(value).map_err(|e| ScalyError::invalid_route_table(e.to_string()))
    }

    /// Builds the document for a set of dynamic entries.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a RouteEntry>) -> Self {
        let routes = entries
            .into_iter()
            .map(|entry| {
                (
                    entry.path().to_string(),
                    PersistedRoute {
                        data: entry.data().clone(),
                    },
                )
            })
            .collect();
        Self { routes }
    }

    /// Converts the records into dynamic entries keyed by normalised path.
    ///
    /// Keys that normalise to the same path collapse into one entry; the
    /// later record wins and a warning is logged.
    #[must_use]
    pub fn into_entries(self) -> IndexMap<String, RouteEntry> {
        let mut entries = IndexMap::with_capacity(self.routes.len());

        for (path, record) in self.routes {
            let key = normalize(&path);
            let entry = RouteEntry::new(&key).with_data(record.data);
            if let Some(previous) = entries.insert(key, entry) {
                tracing::warn!(
                    route = previous.path(),
                    key = %path,
                    previous = ?previous.controller_name(),
                    "Persisted route collides after normalisation, keeping the later record"
                );
            }
        }

        entries
    }

    /// Number of route records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if there are no route records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
