//! Runtime configuration of the relay server.

use std::{path::PathBuf, sync::Arc};

use clap::ValueEnum;

use crate::domain::{BoundRoomPolicy, RoomAccessPolicy, TrustPayloadPolicy};

/// How far the room code named in an event payload is trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AccessPolicyKind {
    /// Any connection may address any room it names
    #[default]
    TrustPayload,
    /// A connection may only address the room it is bound to
    BoundRoom,
}

impl AccessPolicyKind {
    pub fn build(self) -> Arc<dyn RoomAccessPolicy> {
        match self {
            AccessPolicyKind::TrustPayload => Arc::new(TrustPayloadPolicy),
            AccessPolicyKind::BoundRoom => Arc::new(BoundRoomPolicy),
        }
    }
}

/// Settings consumed by the server wiring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Room records are written under `<data_dir>/rooms/`; `None` disables persistence
    pub data_dir: Option<PathBuf>,
    /// Static client assets served for every non-API path
    pub static_dir: Option<PathBuf>,
    pub access_policy: AccessPolicyKind,
    /// Refuse `join-room` while a controller is bound
    pub exclusive_controller: bool,
    /// Suffix annotation ids that collide within a room
    pub unique_annotation_ids: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            data_dir: None,
            static_dir: None,
            access_policy: AccessPolicyKind::default(),
            exclusive_controller: false,
            unique_annotation_ids: false,
        }
    }
}
