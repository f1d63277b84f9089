//! Data Transfer Objects (DTOs) for the relay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frames
//! - `http`: HTTP API responses
//! - `persistence`: room records on disk

pub mod conversion;
pub mod http;
pub mod persistence;
pub mod websocket;
