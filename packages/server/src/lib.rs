//! Beacon relay server.
//!
//! Pairs a display and a controller in a room identified by a 4-digit code
//! and relays motion and annotation events between them over WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// wiring
pub mod app;
