//! Minimal concurrent HTTP/1.1 server.
//!
//! This crate accepts raw TCP connections, hand-parses the request line,
//! headers and body out of a fixed-size byte buffer, and dispatches each
//! request to a handler registered under its exact `(method, path)` pair.
//! Every connection carries exactly one request: `Connection: close` is the
//! standing contract, and keep-alive is never advertised.
//!
//! # Architecture
//!
//! ```text
//! TcpListener ──accept──▶ WorkerPool ──job──▶ dispatch
//!                                              │
//!                                              ├─ parser::parse ──▶ Request
//!                                              ├─ HandlerRegistry::lookup
//!                                              └─ Handler::handle / 400 / 404
//! ```
//!
//! The listener thread only accepts and submits; parsing and all socket I/O
//! beyond `accept` happen on worker threads. The registry is populated before
//! the server starts and is read-only while serving.
//!
//! # Example
//!
//! ```no_run
//! use std::io::Write;
//! use minihttp::{HandlerError, HandlerRegistry, Method, Request, Response, Server, ServerConfig};
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(
//!     Method::Get,
//!     "/hello",
//!     |_request: &Request, out: &mut dyn Write| -> Result<(), HandlerError> {
//!         Response::with_status(200).body("hello").write_to(out)?;
//!         Ok(())
//!     },
//! );
//!
//! let server = Server::bind(ServerConfig::new("127.0.0.1:9999"), registry)?;
//! server.serve()?;
//! # Ok::<(), minihttp::ServerError>(())
//! ```

#![deny(unsafe_code)]

mod connection;
pub mod parser;
pub mod pool;
pub mod query;
pub mod registry;
pub mod request;
pub mod response;
pub mod scan;
pub mod server;

pub use parser::{ParseError, READ_LIMIT};
pub use pool::WorkerPool;
pub use registry::{Handler, HandlerError, HandlerRegistry};
pub use request::{Method, Request};
pub use response::{Response, BAD_REQUEST, NOT_FOUND};
pub use server::{Server, ServerConfig, ServerError, DEFAULT_READ_TIMEOUT_SECS, DEFAULT_WORKERS};
