//! Two-tier routing table.
//!
//! The table keeps two independent maps from normalised path to
//! [`RouteEntry`]:
//!
//! - the **dynamic** table, loaded from the persisted document or generated
//!   from controller route annotations,
//! - the **static** table, for routes registered directly by code.
//!
//! The same path may exist in both. Lookups are exact; longest-prefix
//! search is the [`Router`](crate::Router)'s job.

use indexmap::IndexMap;
use scaly_core::ScalyResult;
use serde_json::Value;

use crate::document::RouteTableDocument;
use crate::path::normalize;
use crate::route_entry::RouteEntry;

/// Path → entry maps plus an optional fallback entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingTable {
    routes: IndexMap<String, RouteEntry>,
    static_routes: IndexMap<String, RouteEntry>,
    default_route: Option<RouteEntry>,
}

impl RoutingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from loaded route-table JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScalyError::InvalidRouteTable`](scaly_core::ScalyError::InvalidRouteTable)
    /// if `value` is not a route-table object.
    pub fn from_value(value: Value) -> ScalyResult<Self> {
        Ok(Self::from_document(RouteTableDocument::from_value(value)?))
    }

    /// Builds a table whose dynamic routes are the document's records.
    #[must_use]
    pub fn from_document(document: RouteTableDocument) -> Self {
        Self {
            routes: document.into_entries(),
            ..Self::default()
        }
    }

    /// Inserts `entry` into the table selected by [`RouteEntry::is_static`],
    /// replacing any entry with the same path.
    pub fn add_route(&mut self, entry: RouteEntry) -> Option<RouteEntry> {
        let key = entry.path().to_string();
        self.table_mut(entry.is_static()).insert(key, entry)
    }

    /// Exact lookup in one table, falling back to the default route.
    #[must_use]
    pub fn get_route(&self, path: &str, is_static: bool) -> Option<&RouteEntry> {
        self.table(is_static)
            .get(&normalize(path))
            .or(self.default_route.as_ref())
    }

    /// Returns `true` if `path` itself is present in one table.
    ///
    /// The default route does not count.
    #[must_use]
    pub fn has_route(&self, path: &str, is_static: bool) -> bool {
        self.table(is_static).contains_key(&normalize(path))
    }

    /// Resolves `path` against the dynamic table first, then the static one.
    ///
    /// Returns the default route when neither has it.
    #[must_use]
    pub fn resolve_route(&self, path: &str) -> Option<&RouteEntry> {
        let key = normalize(path);
        self.find(&key).or(self.default_route.as_ref())
    }

    /// Removes `path` from one table. Missing paths are ignored.
    pub fn remove_route(&mut self, path: &str, is_static: bool) -> Option<RouteEntry> {
        self.table_mut(is_static).shift_remove(&normalize(path))
    }

    /// A copy of the dynamic table.
    #[must_use]
    pub fn get_routing_table(&self) -> IndexMap<String, RouteEntry> {
        self.routes.clone()
    }

    /// A copy of the static table.
    #[must_use]
    pub fn get_static_routing_table(&self) -> IndexMap<String, RouteEntry> {
        self.static_routes.clone()
    }

    /// Replaces the whole dynamic table.
    pub fn replace_routes(&mut self, routes: IndexMap<String, RouteEntry>) {
        self.routes = routes;
    }

    /// The fallback entry.
    #[must_use]
    pub fn default_route(&self) -> Option<&RouteEntry> {
        self.default_route.as_ref()
    }

    /// Sets or clears the fallback entry.
    pub fn set_default_route(&mut self, entry: Option<RouteEntry>) {
        self.default_route = entry;
    }

    /// Serialises the dynamic table.
    #[must_use]
    pub fn to_document(&self) -> RouteTableDocument {
        RouteTableDocument::from_entries(self.routes.values())
    }

    /// Total number of entries in both tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len() + self.static_routes.len()
    }

    /// Returns `true` if both tables are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.static_routes.is_empty()
    }

    /// Exact lookup of an already normalised key, dynamic table first.
    pub(crate) fn find(&self, key: &str) -> Option<&RouteEntry> {
        self.routes.get(key).or_else(|| self.static_routes.get(key))
    }

    fn table(&self, is_static: bool) -> &IndexMap<String, RouteEntry> {
        if is_static {
            &self.static_routes
        } else {
            &self.routes
        }
    }

    fn table_mut(&mut self, is_static: bool) -> &mut IndexMap<String, RouteEntry> {
        if is_static {
            &mut self.static_routes
        } else {
            &mut self.routes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dynamic(path: &str, controller: &str) -> RouteEntry {
        RouteEntry::controller(path, controller, "index")
    }

    #[test]
    fn test_add_and_get() {
        let mut table = RoutingTable::new();
        table.add_route(dynamic("/a", "A"));
        table.add_route(dynamic("/b", "B").with_static(true));

        assert!(table.has_route("/a", false));
        assert!(!table.has_route("/a", true));
        assert!(table.has_route("/B", true));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_route("/a", false).unwrap().controller_name(), Some("A"));
    }

    #[test]
    fn test_add_overwrites() {
        let mut table = RoutingTable::new();
        assert!(table.add_route(dynamic("/a", "A")).is_none());
        let previous = table.add_route(dynamic("/a", "A2")).unwrap();

        assert_eq!(previous.controller_name(), Some("A"));
        assert_eq!(table.resolve_route("/a").unwrap().controller_name(), Some("A2"));
    }

    #[test]
    fn test_static_is_fallback() {
        let mut table = RoutingTable::new();
        table.add_route(dynamic("/x", "Static").with_static(true));

        assert_eq!(table.resolve_route("/x").unwrap().controller_name(), Some("Static"));
    }

    #[test]
    fn test_dynamic_wins_on_conflict() {
        let mut table = RoutingTable::new();
        table.add_route(dynamic("/x", "Static").with_static(true));
        table.add_route(dynamic("/x", "Dynamic"));

        assert_eq!(table.resolve_route("/x").unwrap().controller_name(), Some("Dynamic"));
    }

    #[test]
    fn test_default_route() {
        let mut table = RoutingTable::new();
        assert!(table.resolve_route("/missing").is_none());
        assert!(table.get_route("/missing", false).is_none());

        table.set_default_route(Some(dynamic("/", "Fallback")));
        assert_eq!(
            table.resolve_route("/missing").unwrap().controller_name(),
            Some("Fallback")
        );
        assert_eq!(
            table.get_route("/missing", true).unwrap().controller_name(),
            Some("Fallback")
        );
        assert!(!table.has_route("/missing", false));
    }

    #[test]
    fn test_remove_route() {
        let mut table = RoutingTable::new();
        table.add_route(dynamic("/a", "A"));
        table.add_route(dynamic("/a", "S").with_static(true));

        assert!(table.remove_route("/A", false).is_some());
        assert!(table.remove_route("/a", false).is_none());
        assert_eq!(table.resolve_route("/a").unwrap().controller_name(), Some("S"));
    }

    #[test]
    fn test_copies_are_detached() {
        let mut table = RoutingTable::new();
        table.add_route(dynamic("/a", "A"));

        let mut copy = table.get_routing_table();
        copy.clear();
        let mut static_copy = table.get_static_routing_table();
        static_copy.insert("/z".to_string(), dynamic("/z", "Z"));

        assert!(table.has_route("/a", false));
        assert!(!table.has_route("/z", true));
    }

    #[test]
    fn test_from_value() {
        let table = RoutingTable::from_value(json!({
            "routes": {
                "/shop": { "Data": { "Controller": "ShopController", "Function": "index" } }
            }
        }))
        .unwrap();

        assert!(table.has_route("/shop", false));
        assert!(table.get_static_routing_table().is_empty());
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        let err = RoutingTable::from_value(json!("routes")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ROUTE_TABLE");
    }

    #[test]
    fn test_document_excludes_static_routes() {
        let mut table = RoutingTable::new();
        table.add_route(dynamic("/a", "A"));
        table.add_route(dynamic("/s", "S").with_static(true));

        let document = table.to_document();
        assert_eq!(document.len(), 1);
        assert!(document.routes.contains_key("/a"));
    }
}
