//! Live-reload channel between the pipeline and browser clients.
//!
//! The hub is the only cross-task shared resource in the pipeline: an
//! append-only broadcast list of WebSocket clients. Tasks receive a hub
//! handle explicitly and push messages into it; the server side accepts
//! clients and registers them on the same hub.

mod hub;
mod message;
mod server;

pub use hub::ReloadHub;
pub use message::ReloadMessage;
pub use server::{DEFAULT_WS_PORT, start_reload_server};
