//! Route-table sources.
//!
//! A [`RouteTableSource`] loads the persisted route table at boot and saves
//! it back at shutdown. Loading happens once, before any request is served,
//! so sources are synchronous.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use scaly_core::{ScalyError, ScalyResult};
use serde_json::Value;

use crate::document::RouteTableDocument;

/// Where the persisted route table lives.
pub trait RouteTableSource: Send + Sync {
    /// Loads the raw route-table JSON.
    fn load(&self) -> ScalyResult<Value>;

    /// Replaces the stored table with `document`.
    fn save(&self, document: &RouteTableDocument) -> ScalyResult<()>;

    /// A short description for log output.
    fn describe(&self) -> String;
}

/// A route table stored as a JSON file.
///
/// A missing file loads as an empty table. Saving creates missing parent
/// directories and writes pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonRouteTableFile {
    path: PathBuf,
}

impl JsonRouteTableFile {
    /// Creates a source for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn source_error(&self, error: std::io::Error) -> ScalyError {
        ScalyError::route_table_source(self.path.display().to_string(), error)
    }
}

impl RouteTableSource for JsonRouteTableFile {
    fn load(&self) -> ScalyResult<Value> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "Route table file not found, starting empty");
                return Ok(serde_json::json!({ "routes": {} }));
            }
            Err(e) => return Err(self.source_error(e)),
        };

        serde_json::from_str(&content).map_err(|e| {
            ScalyError::invalid_route_table(format!("{}: {e}", self.path.display()))
        })
    }

    fn save(&self, document: &RouteTableDocument) -> ScalyResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.source_error(e))?;
        }

        let content = serde_json::to_string_pretty(document)
            .map_err(|e| ScalyError::internal_with_source("Failed to serialise route table", e))?;
        fs::write(&self.path, content).map_err(|e| self.source_error(e))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A route table held in memory.
#[derive(Debug)]
pub struct MemoryRouteTableSource {
    value: Mutex<Value>,
    saves: AtomicUsize,
}

impl MemoryRouteTableSource {
    /// Creates a source that loads `value`.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value: Mutex::new(value),
            saves: AtomicUsize::new(0),
        }
    }

    /// Creates a source holding an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(serde_json::json!({ "routes": {} }))
    }

    /// The currently stored JSON.
    #[must_use]
    pub fn value(&self) -> Value {
        self.value.lock().clone()
    }

    /// How many times [`RouteTableSource::save`] was called.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl RouteTableSource for MemoryRouteTableSource {
    fn load(&self) -> ScalyResult<Value> {
        Ok(self.value())
    }

    fn save(&self, document: &RouteTableDocument) -> ScalyResult<()> {
        let value = serde_json::to_value(document)
            .map_err(|e| ScalyError::internal_with_source("Failed to serialise route table", e))?;
        *self.value.lock() = value;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
