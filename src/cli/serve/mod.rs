//! Development server with live reload support.

mod content;
mod lifecycle;
mod path;
mod response;

use crate::{
    config::PipelineConfig,
    log,
};
use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use tiny_http::{Request, Server};

/// Actual WebSocket port for reload injection (0 = reload disabled).
/// Updated after the reload server binds successfully.
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Update the actual WebSocket port (called after the reload server binds)
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

/// Get the actual WebSocket port, if a reload server is running
fn get_actual_ws_port() -> Option<u16> {
    match ACTUAL_WS_PORT.load(Ordering::Relaxed) {
        0 => None,
        port => Some(port),
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    serve_root: PathBuf,
}

/// Bind the HTTP server without starting the request loop
///
/// This allows the caller to start the reload server and the watcher before
/// entering the request loop.
pub fn bind_server(config: &PipelineConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server: Arc::new(server),
        addr,
        serve_root: config.serve_root(),
    })
}

impl BoundServer {
    /// Get the bound address.
    #[allow(dead_code)]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared server handle (for shutdown registration).
    pub fn server(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Start the request loop (blocking until the server is unblocked).
    pub fn run(self) -> Result<()> {
        // Use a thread pool to handle requests concurrently, so one slow
        // transfer does not block the reload round-trip
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to create thread pool: {e}"))?;

        let serve_root = Arc::new(self.serve_root);
        for request in self.server.incoming_requests() {
            let serve_root = Arc::clone(&serve_root);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &serve_root) {
                    log!("serve"; "request error: {e}");
                }
            });
        }

        Ok(())
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, serve_root: &std::path::Path) -> Result<()> {
    // Early exit if shutdown requested
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let ws_port = get_actual_ws_port();

    match path::resolve_path(request.url(), serve_root) {
        Some(file) => response::respond_file(request, &file, ws_port),
        None => response::respond_not_found(request),
    }
}
