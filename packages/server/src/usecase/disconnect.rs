//! UseCase: 接続の切断処理
//!
//! 接続が束縛されていたスロットだけを空け、反対側の役割に切断を通知します。
//! ルーム自体は削除せず、再接続を待ちます。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, DeviceRole, MessagePusher, RelayEvent, RoomRepository, SessionBinding,
    SessionRegistry,
};

/// 切断のユースケース
pub struct DisconnectUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn SessionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn SessionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            registry,
            message_pusher,
        }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// 接続が束縛されていたルームと役割（束縛がなければ `None`）
    pub async fn execute(&self, connection: &ConnectionId) -> Option<SessionBinding> {
        self.message_pusher.unregister_client(connection).await;

        let binding = self.registry.unbind(connection).await?;
        let SessionBinding { code, role } = &binding;

        let released = match role {
            DeviceRole::Display => self.repository.unbind_display(code, connection).await,
            DeviceRole::Controller => self.repository.unbind_controller(code, connection).await,
        };
        match released {
            Ok(true) => {}
            Ok(false) => {
                // 後から参加した接続にスロットが置き換えられている
                tracing::debug!(
                    "{} '{}' no longer held its slot in room '{}'",
                    role,
                    connection,
                    code
                );
                return Some(binding);
            }
            Err(e) => {
                tracing::warn!("Failed to release slot of '{}': {}", connection, e);
                return Some(binding);
            }
        }
        tracing::info!("{} '{}' disconnected from room '{}'", role, connection, code);

        let notification = match role {
            DeviceRole::Display => RelayEvent::DisplayDisconnected,
            DeviceRole::Controller => RelayEvent::ControllerDisconnected,
        };
        match self.repository.get_room(code).await {
            Ok(room) => {
                if let Some(peer) = room.slot(role.opposite()) {
                    if let Err(e) = self.message_pusher.push_to(peer, &notification).await {
                        tracing::warn!("Failed to notify peer in room '{}': {}", code, e);
                    }
                }
            }
            Err(e) => tracing::warn!("Room '{}' vanished during disconnect: {}", code, e),
        }

        Some(binding)
    }
}
