//! Terminal client for the Beacon relay.
//!
//! Acts as a display (creates a room and prints what the controller sends) or as
//! a controller (joins by code and sends commands typed at the prompt).

mod command;
mod domain;
mod formatter;
mod protocol;
mod runner;
mod session;
mod ui;

pub mod error;

pub use domain::Role;
pub use runner::run_client;
