//! UseCase: ルーム作成
//!
//! display からの要求でコードを割り当ててルームを作成し、
//! 要求した接続をそのルームの display として束縛します。

use std::sync::Arc;

use beacon_shared::time::Clock;

use crate::domain::{
    ConnectionId, DeviceRole, RoomCode, RoomRepository, SessionBinding, SessionRegistry,
    Timestamp,
};

use super::{binding::bind_session, error::CreateRoomError};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn SessionRegistry>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn SessionRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            clock,
        }
    }

    /// ルーム作成を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 要求した接続（display になる）
    ///
    /// # Returns
    ///
    /// * `Ok(RoomCode)` - 割り当てられたルームコード
    /// * `Err(CreateRoomError)` - コードの空きがない場合など
    pub async fn execute(&self, connection: ConnectionId) -> Result<RoomCode, CreateRoomError> {
        let created_at = Timestamp::new(self.clock.now_millis());
        let code = self
            .repository
            .create_room(connection.clone(), created_at)
            .await?;

        bind_session(
            self.repository.as_ref(),
            self.registry.as_ref(),
            &connection,
            SessionBinding::new(code.clone(), DeviceRole::Display),
        )
        .await;

        tracing::info!("Room '{}' created by display '{}'", code, connection);
        Ok(code)
    }
}
