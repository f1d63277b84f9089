//! InMemory Session Registry 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{ConnectionId, RoomCode, SessionBinding, SessionRegistry};

/// 接続 ↔ (ルームコード, 役割) の対応表
#[derive(Debug, Default)]
pub struct InMemorySessionRegistry {
    bindings: RwLock<HashMap<ConnectionId, SessionBinding>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn bind(
        &self,
        connection: ConnectionId,
        binding: SessionBinding,
    ) -> Option<SessionBinding> {
        let mut bindings = self.bindings.write().await;
        tracing::debug!(
            "Connection '{}' bound to room '{}' as {}",
            connection,
            binding.code,
            binding.role
        );
        bindings.insert(connection, binding)
    }

    async fn unbind(&self, connection: &ConnectionId) -> Option<SessionBinding> {
        let mut bindings = self.bindings.write().await;
        bindings.remove(connection)
    }

    async fn binding_of(&self, connection: &ConnectionId) -> Option<SessionBinding> {
        let bindings = self.bindings.read().await;
        bindings.get(connection).cloned()
    }

    async fn members(&self, code: &RoomCode) -> Vec<ConnectionId> {
        let bindings = self.bindings.read().await;
        bindings
            .iter()
            .filter(|(_, binding)| &binding.code == code)
            .map(|(connection, _)| connection.clone())
            .collect()
    }
}
