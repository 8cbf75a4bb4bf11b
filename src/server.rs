//! TCP listener and server configuration.

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::connection;
use crate::pool::WorkerPool;
use crate::registry::HandlerRegistry;

/// Default worker-pool size.
pub const DEFAULT_WORKERS: usize = 64;

/// Default per-connection read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    bind_addr: String,
    workers: usize,
    read_timeout: Option<Duration>,
}

impl ServerConfig {
    /// Creates a configuration with the given bind address and defaults
    /// everywhere else.
    #[must_use]
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            workers: DEFAULT_WORKERS,
            read_timeout: Some(Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS)),
        }
    }

    /// Sets the worker-pool size.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Sets the per-connection read timeout; `None` disables it.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Returns the configured bind address.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Returns the worker-pool size.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns the per-connection read timeout.
    #[must_use]
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1:8080")
    }
}

/// Listener-level failure. Fatal: the server does not restart itself.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the listener failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: String,
        /// The underlying I/O error.
        source: io::Error,
    },
    /// Accepting a connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),
}

/// The HTTP server: a bound listener plus a frozen handler registry.
///
/// Construction is two-phase (bind, then serve) so tests and embedders can
/// bind port 0 and read the ephemeral address before serving.
pub struct Server {
    listener: TcpListener,
    registry: Arc<HandlerRegistry>,
    config: ServerConfig,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("listener", &self.listener)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Binds the listener and freezes the registry.
    ///
    /// All registration must already have happened: the registry moves
    /// behind an `Arc` here and is read-only from now on.
    ///
    /// # Errors
    ///
    /// [`ServerError::Bind`] when the address cannot be bound.
    pub fn bind(config: ServerConfig, registry: HandlerRegistry) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.bind_addr()).map_err(|source| ServerError::Bind {
            addr: config.bind_addr().to_string(),
            source,
        })?;

        Ok(Self {
            listener,
            registry: Arc::new(registry),
            config,
        })
    }

    /// Returns the bound local address.
    ///
    /// # Errors
    ///
    /// Propagates the underlying socket error.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections forever, dispatching each on the worker pool.
    ///
    /// The calling thread only accepts and submits; parsing and all
    /// per-connection I/O happen on worker threads. Returns only on a
    /// fatal accept failure.
    ///
    /// # Errors
    ///
    /// [`ServerError::Accept`] on accept failure. The caller is expected to
    /// log it and terminate; there is no automatic restart.
    pub fn serve(self) -> Result<(), ServerError> {
        let pool = WorkerPool::new(self.config.workers());
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, workers = self.config.workers(), "listening");
        }

        loop {
            let (stream, peer) = self.listener.accept().map_err(ServerError::Accept)?;
            debug!(%peer, "accepted connection");

            let registry = Arc::clone(&self.registry);
            let read_timeout = self.config.read_timeout();
            pool.execute(move || connection::dispatch(stream, &registry, read_timeout));
        }
    }
}
