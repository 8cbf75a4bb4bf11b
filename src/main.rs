//! Demo server binary.
//!
//! Wires concrete handlers (static files, a templated page, a POST
//! endpoint) into the registry and serves them. Everything here is
//! collaborator code: the library knows nothing about files, content types
//! or templates.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use minihttp::{
    Handler, HandlerError, HandlerRegistry, Method, Request, Response, Server, ServerConfig,
};

/// Static paths served straight from the document root.
const STATIC_PATHS: [&str; 5] = [
    "/index.html",
    "/styles.css",
    "/app.js",
    "/spring.svg",
    "/spring.png",
];

#[derive(Parser, Debug)]
#[command(name = "minihttp", about = "Minimal concurrent HTTP/1.1 file server")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0:9999")]
    addr: String,

    /// Worker-pool size.
    #[arg(long, default_value_t = minihttp::DEFAULT_WORKERS)]
    workers: usize,

    /// Per-connection read timeout in seconds; 0 disables it.
    #[arg(long, default_value_t = minihttp::DEFAULT_READ_TIMEOUT_SECS)]
    read_timeout: u64,

    /// Document root for the static-file handlers.
    #[arg(long, default_value = "public")]
    public: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("minihttp=info")),
        )
        .init();

    let args = Args::parse();

    let mut registry = HandlerRegistry::new();
    for path in STATIC_PATHS {
        registry.register(Method::Get, path, file_handler(args.public.clone()));
    }
    registry.register(Method::Get, "/classic.html", classic_handler(args.public.clone()));
    registry.register(Method::Post, "/message", message_handler());

    let read_timeout = (args.read_timeout > 0).then(|| Duration::from_secs(args.read_timeout));
    let config = ServerConfig::new(args.addr.clone())
        .with_workers(args.workers)
        .with_read_timeout(read_timeout);

    let server = match Server::bind(config, registry) {
        Ok(server) => server,
        Err(err) => {
            error!(%err, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    match server.serve() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "listener failure");
            ExitCode::FAILURE
        }
    }
}

/// Serves the request path verbatim from the document root.
fn file_handler(root: PathBuf) -> impl Handler {
    move |request: &Request, out: &mut dyn Write| -> Result<(), HandlerError> {
        let file = root.join(request.path().trim_start_matches('/'));
        let content = std::fs::read(&file)?;
        Response::with_status(200)
            .header("Content-Type", content_type(&file))
            .body(content)
            .write_to(out)?;
        Ok(())
    }
}

/// Serves `classic.html` with `{time}` replaced by the current local time.
fn classic_handler(root: PathBuf) -> impl Handler {
    move |_request: &Request, out: &mut dyn Write| -> Result<(), HandlerError> {
        let template = std::fs::read_to_string(root.join("classic.html"))?;
        let now = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        Response::with_status(200)
            .header("Content-Type", "text/html")
            .body(template.replace("{time}", &now))
            .write_to(out)?;
        Ok(())
    }
}

/// Acknowledges a posted message with a fixed page.
fn message_handler() -> impl Handler {
    |request: &Request, out: &mut dyn Write| -> Result<(), HandlerError> {
        tracing::info!(bytes = request.body().len(), "message received");
        Response::with_status(200)
            .header("Content-Type", "text/html")
            .body("<html><head></head><body>POST</body></html>\n")
            .write_to(out)?;
        Ok(())
    }
}

/// Fixed extension table; unknown extensions fall back to octet-stream.
fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
