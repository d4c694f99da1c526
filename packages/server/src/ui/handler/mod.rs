//! HTTP / WebSocket handlers.

mod http;
mod websocket;

pub use http::{get_peers, health_check};
pub use websocket::websocket_handler;
