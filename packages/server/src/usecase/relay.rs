//! UseCase: 特定の役割へのイベント転送
//!
//! 姿勢・タッチ移動・ライト・配置要求は display へ、
//! カメラ位置・配置位置は controller へ転送します。転送するだけで保存はしません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RelayEvent, RoomRepository};

use super::{access::RoomAccess, error::RelayError};

/// 転送のユースケース
pub struct RelayUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    access: RoomAccess,
}

impl RelayUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        access: RoomAccess,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            access,
        }
    }

    /// 転送を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信元の接続
    /// * `raw_code` - ペイロードに含まれるルームコード
    /// * `event` - 転送するイベント
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionId)` - 転送先の接続
    /// * `Err(RelayError)` - ルームがない、宛先の役割が接続していない場合など
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        raw_code: &str,
        event: RelayEvent,
    ) -> Result<ConnectionId, RelayError> {
        let role = event
            .direct_recipient()
            .ok_or(RelayError::NotRelayable(event.name()))?;
        let code = self.access.resolve(sender, raw_code).await?;

        let room = self
            .repository
            .get_room(&code)
            .await
            .map_err(|_| RelayError::RoomNotFound(code.to_string()))?;
        let recipient = room
            .slot(role)
            .cloned()
            .ok_or(RelayError::RecipientNotConnected(role))?;

        self.message_pusher.push_to(&recipient, &event).await?;
        tracing::trace!("Relayed '{}' in room '{}' to {}", event.name(), code, role);
        Ok(recipient)
    }
}
