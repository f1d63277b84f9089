//! Relay server: axum router, handlers and configuration.

pub mod config;
mod handler;
mod server;
mod signal;
pub mod state;

pub use config::{AccessPolicyKind, ServerConfig};
pub use server::Server;
