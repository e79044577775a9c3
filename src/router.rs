use crate::error::{ServerError, ServerResult};
use crate::http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A route entry: requests for `path` with `method` are answered with the
/// contents of `file_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub method: Method,
    pub path: String,
    pub file_path: PathBuf,
}

impl RouteEntry {
    pub fn new(method: Method, path: &str, file_path: impl Into<PathBuf>) -> Self {
        Self {
            method,
            path: path.to_string(),
            file_path: file_path.into(),
        }
    }
}

/// Per-method mapping from URL path to file.
///
/// Filled before the server starts listening and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<Method, HashMap<String, PathBuf>>,
}

impl RouteTable {
    /// Create an empty route table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. An existing `(method, path)` is never overwritten.
    pub fn register(
        &mut self,
        method: Method,
        path: &str,
        file_path: impl Into<PathBuf>,
    ) -> ServerResult<()> {
        let table = self.routes.entry(method).or_default();
        if table.contains_key(path) {
            return Err(ServerError::DuplicateRoute {
                method,
                path: path.to_string(),
            });
        }

        table.insert(path.to_string(), file_path.into());
        Ok(())
    }

    /// Look up the file mapped to `(method, path)`. Paths match exactly.
    pub fn resolve(&self, method: Method, path: &str) -> Option<&Path> {
        self.routes
            .get(&method)
            .and_then(|table| table.get(path))
            .map(PathBuf::as_path)
    }

    /// Number of registered routes across all methods
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All routes, sorted by method then path.
    pub fn entries(&self) -> Vec<RouteEntry> {
        let mut entries: Vec<RouteEntry> = self
            .routes
            .iter()
            .flat_map(|(method, table)| {
                table
                    .iter()
                    .map(move |(path, file)| RouteEntry::new(*method, path, file.clone()))
            })
            .collect();
        entries.sort_by(|a, b| {
            a.method
                .as_str()
                .cmp(b.method.as_str())
                .then_with(|| a.path.cmp(&b.path))
        });
        entries
    }
}
