//! Per-connection dispatch.
//!
//! One request per connection: parse, look up, invoke, close. All protocol
//! error responses are written here so the parser stays a pure classifier,
//! and the socket is shut down on every exit path.

use std::io::{BufWriter, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use tracing::{debug, warn};

use crate::parser;
use crate::registry::HandlerRegistry;
use crate::response;

/// Runs one connection to completion on the current worker thread.
///
/// Parse failures answer with the canned `400`, unroutable requests with
/// the canned `404`. A handler failure is logged and the connection closed;
/// it never propagates past this function, so one bad handler cannot take
/// down the worker or other in-flight connections.
pub(crate) fn dispatch(
    mut stream: TcpStream,
    registry: &HandlerRegistry,
    read_timeout: Option<Duration>,
) {
    // Slow-client protection: a stalled framing or body read times out and
    // classifies as a malformed request.
    let _ = stream.set_read_timeout(read_timeout);
    let peer = stream
        .peer_addr()
        .map_or_else(|_| "unknown".to_string(), |addr| addr.to_string());

    match parser::parse(&mut stream) {
        Err(err) => {
            warn!(%peer, %err, "rejecting request");
            if let Err(err) = stream.write_all(response::BAD_REQUEST) {
                debug!(%peer, %err, "failed to write 400");
            }
        }
        Ok(request) => match registry.lookup(request.method(), request.path()) {
            None => {
                debug!(%peer, method = %request.method(), path = request.path(), "no handler registered");
                if let Err(err) = stream.write_all(response::NOT_FOUND) {
                    debug!(%peer, %err, "failed to write 404");
                }
            }
            Some(handler) => {
                debug!(%peer, method = %request.method(), path = request.path(), "dispatching");
                let mut out = BufWriter::new(&mut stream);
                if let Err(err) = handler.handle(&request, &mut out) {
                    warn!(%peer, path = request.path(), %err, "handler failed");
                }
                if let Err(err) = out.flush() {
                    debug!(%peer, %err, "failed to flush response");
                }
            }
        },
    }

    let _ = stream.shutdown(Shutdown::Both);
}
