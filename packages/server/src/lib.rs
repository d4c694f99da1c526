//! WebRTC signaling and presence relay server.
//!
//! This library implements the server side of a browser voice chat demo:
//! it brokers WebRTC connection setup (SDP offers/answers, ICE candidates)
//! and relays presence, chat and typing/talking events between connected
//! peers. Audio itself flows peer-to-peer between browsers; the server
//! never touches media bytes.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
