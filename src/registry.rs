//! Handler capability and the (method, path) registry.
//!
//! A handler is a capability: anything that can take a parsed [`Request`]
//! and a writable sink and produce a full response. The registry maps
//! method to path to handler, exact match on both keys.
//!
//! Registration-then-freeze discipline: `register` is the only mutator and
//! all registration happens before the server starts accepting. While
//! serving, the registry sits behind an `Arc` and is read concurrently by
//! every dispatch task; no lookup ever creates intermediate structure.

use std::collections::HashMap;
use std::io::{self, Write};

use thiserror::Error;

use crate::request::{Method, Request};

/// Failure raised by a handler while producing its response.
///
/// Handler failures are isolated per connection: the dispatcher logs them
/// and closes the connection, nothing more.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Writing the response (or reading what it needed) failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// Any other handler-specific failure.
    #[error("{0}")]
    Other(String),
}

impl HandlerError {
    /// Builds a [`HandlerError::Other`] from any message.
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// A route handler capability.
///
/// Given the parsed request and the connection's output sink, produce a
/// complete HTTP response (status line, headers, blank line, body) and
/// signal completion or failure. Plain closures with the matching
/// signature implement this trait.
pub trait Handler: Send + Sync {
    /// Handles one request, writing the full response to `out`.
    ///
    /// # Errors
    ///
    /// Any [`HandlerError`]; the dispatcher logs it and closes the
    /// connection.
    fn handle(&self, request: &Request, out: &mut dyn Write) -> Result<(), HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut dyn Write) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, request: &Request, out: &mut dyn Write) -> Result<(), HandlerError> {
        self(request, out)
    }
}

/// Exact-match routing table: method → path → handler.
#[derive(Default)]
pub struct HandlerRegistry {
    routes: HashMap<Method, HashMap<String, Box<dyn Handler>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Inserts or replaces the handler for `(method, path)`.
    ///
    /// The only mutator: call it during startup, before the server begins
    /// accepting connections.
    pub fn register(&mut self, method: Method, path: impl Into<String>, handler: impl Handler + 'static) {
        self.routes
            .entry(method)
            .or_default()
            .insert(path.into(), Box::new(handler));
    }

    /// Looks up the handler for `(method, path)`.
    ///
    /// Exact string match on the path, no wildcard or prefix matching, and
    /// no structure is created on a miss.
    #[must_use]
    pub fn lookup(&self, method: Method, path: &str) -> Option<&dyn Handler> {
        self.routes
            .get(&method)
            .and_then(|by_path| by_path.get(path))
            .map(|handler| &**handler)
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.values().all(HashMap::is_empty)
    }
}
