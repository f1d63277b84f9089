//! Utilities shared by the Beacon server and client.

pub mod logger;
pub mod time;
