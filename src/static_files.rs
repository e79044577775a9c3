use crate::http::{Method, Response};
use crate::logger::{LogLevel, LogSink};
use crate::router::RouteTable;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File served when no route matches
pub const DEFAULT_ERROR_FILE: &str = "error.html";

/// Turns a method and path into a complete response by reading the routed
/// file from disk.
pub struct ResponseBuilder {
    routes: RouteTable,
    default_file: PathBuf,
    logger: Arc<dyn LogSink>,
}

impl ResponseBuilder {
    pub fn new(routes: RouteTable, default_file: impl Into<PathBuf>, logger: Arc<dyn LogSink>) -> Self {
        Self {
            routes,
            default_file: default_file.into(),
            logger,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Build the response for a request.
    ///
    /// Only GET reads files. Every other method gets an empty `200 OK`, even
    /// when a route is registered for it.
    pub fn build(&self, method: Method, path: &str) -> Response {
        if method != Method::Get {
            self.logger.log(
                &format!("{} {} has no handler, answering with an empty body", method, path),
                LogLevel::Debug,
            );
            return Response::html(Vec::new());
        }

        let file = self.target_file(path);
        self.logger.log(
            &format!("route is {}, serving {}", path, file.display()),
            LogLevel::Debug,
        );

        let body = match fs::read(file) {
            Ok(contents) => contents,
            Err(e) => {
                // Still a 200, just with nothing in it.
                self.logger.log(
                    &format!("cannot open {}: {}", file.display(), e),
                    LogLevel::Warn,
                );
                Vec::new()
            }
        };

        Response::html(body)
    }

    /// The file a GET for `path` is answered with.
    pub fn target_file(&self, path: &str) -> &Path {
        self.routes
            .resolve(Method::Get, path)
            .unwrap_or(self.default_file.as_path())
    }
}
