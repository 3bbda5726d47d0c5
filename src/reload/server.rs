//! WebSocket server for live reload.
//!
//! Accepts browser connections and hands them to the reload hub. The accept
//! loop runs on its own thread and exits on process shutdown.

use std::net::TcpListener;

use anyhow::Result;

use super::hub::ReloadHub;
use crate::core::is_shutdown;

/// Default WebSocket port for live reload (the classic livereload port).
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Start the WebSocket accept loop, registering clients on the hub.
///
/// Returns the port actually bound (may differ from `base_port` when it was
/// in use).
pub fn start_reload_server(hub: ReloadHub, base_port: u16) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    // Spawn acceptor thread
    std::thread::spawn(move || {
        loop {
            if is_shutdown() {
                hub.shutdown();
                break;
            }

            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connecting: {}", addr);

                    // Set blocking for the WebSocket handshake
                    let _ = stream.set_nonblocking(false);
                    hub.add_client(stream);
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
        }
    });

    Ok(actual_port)
}

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(format!("127.0.0.1:{}", port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
