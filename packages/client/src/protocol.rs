//! Frames exchanged with the relay server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frame sent to the server
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
}

impl ClientFrame {
    pub fn new(event: impl Into<String>, data: Value, ack: u64) -> Self {
        Self {
            event: event.into(),
            data,
            ack: Some(ack),
        }
    }
}

/// Frame received from the server, either a pushed event or an ack reply
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub ack: Option<u64>,
}

impl ServerFrame {
    /// Ack payload when this frame answers the given ack id
    pub fn ack_for(&self, id: u64) -> Option<AckPayload> {
        if self.event != "ack" || self.ack != Some(id) {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }
}

/// Result carried by an ack reply
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckPayload {
    pub success: bool,
    #[serde(default)]
    pub room_code: Option<String>,
    #[serde(default)]
    pub annotations: Option<Vec<Value>>,
    #[serde(default)]
    pub has_controller: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}
