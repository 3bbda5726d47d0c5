//! Broadcast hub for connected live-reload clients.

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::message::ReloadMessage;

/// Shared list of connected WebSocket clients.
///
/// Cloning is cheap (Arc). A hub without a running reload server is inert:
/// broadcasts to zero clients are no-ops, which is what one-shot task runs
/// want.
#[derive(Clone)]
pub struct ReloadHub {
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
}

impl ReloadHub {
    /// Create a hub with no connected clients.
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Accept a raw TCP stream as a WebSocket client.
    ///
    /// Performs the handshake, sends the `connected` acknowledgment and
    /// registers the client for future broadcasts.
    pub fn add_client(&self, stream: TcpStream) {
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let connected = ReloadMessage::connected();
                if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
                    crate::log!("reload"; "failed to send connected message: {}", e);
                    return;
                }

                let mut clients = self.clients.lock();
                crate::debug!("reload"; "client connected (total: {})", clients.len() + 1);
                clients.push(ws);
            }
            Err(e) => {
                crate::log!("reload"; "handshake failed: {}", e);
            }
        }
    }

    /// Broadcast a message to every connected client.
    ///
    /// Clients whose send fails are dropped from the list; closed browser
    /// tabs prune themselves on the next broadcast.
    pub fn broadcast(&self, msg: &ReloadMessage) {
        let json = msg.to_json();
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            return;
        }

        crate::debug!("reload"; "broadcast to {} client(s): {}", clients.len(), json);
        clients.retain_mut(|ws| ws.send(Message::Text(json.clone().into())).is_ok());
    }

    /// Number of connected clients.
    #[allow(dead_code)]
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Close all client connections.
    pub fn shutdown(&self) {
        let mut clients = self.clients.lock();
        for mut ws in clients.drain(..) {
            let _ = ws.close(None);
        }
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_starts_empty() {
        let hub = ReloadHub::new();
        assert_eq!(hub.client_count(), 0);
    }

    #[test]
    fn test_broadcast_without_clients_is_noop() {
        let hub = ReloadHub::new();
        hub.broadcast(&ReloadMessage::reload("nothing listening"));
        assert_eq!(hub.client_count(), 0);
    }

    #[test]
    fn test_clone_shares_client_list() {
        let hub = ReloadHub::new();
        let clone = hub.clone();
        assert_eq!(hub.client_count(), clone.client_count());
    }
}
