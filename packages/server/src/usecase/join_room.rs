//! UseCase: controller としてルームに参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - controller スロットの束縛と display への通知
//!
//! ### どのような状況を想定しているか
//! - 正常系：存在するルームへの参加、既存アノテーションの取得
//! - 異常系：存在しないコード・不正な形式のコード
//! - エッジケース：後から参加した controller による上書き、排他モード

use std::sync::Arc;

use crate::domain::{
    Annotation, ConnectionId, DeviceRole, MessagePusher, RelayEvent, RoomCode, RoomRepository,
    SessionBinding, SessionRegistry,
};

use super::{binding::bind_session, error::JoinRoomError};

/// controller 参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn SessionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
    /// true の場合、controller が既にいるルームへの参加を拒否する
    exclusive_controller: bool,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        registry: Arc<dyn SessionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            registry,
            message_pusher,
            exclusive_controller: false,
        }
    }

    pub fn with_exclusive_controller(mut self, exclusive_controller: bool) -> Self {
        self.exclusive_controller = exclusive_controller;
        self
    }

    /// 参加を実行
    ///
    /// 既定では controller スロットを無条件に上書きします（後から参加した方が勝つ）。
    ///
    /// # Arguments
    ///
    /// * `connection` - 参加する接続
    /// * `raw_code` - クライアントが入力したルームコード
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Annotation>)` - ルームの既存アノテーション（追加順）
    /// * `Err(JoinRoomError)` - ルームが存在しない場合など
    pub async fn execute(
        &self,
        connection: ConnectionId,
        raw_code: &str,
    ) -> Result<Vec<Annotation>, JoinRoomError> {
        let code = RoomCode::new(raw_code.to_string())
            .map_err(|_| JoinRoomError::RoomNotFound(raw_code.to_string()))?;

        let room = if self.exclusive_controller {
            self.repository
                .rebind(&code, DeviceRole::Controller, connection.clone())
                .await?
        } else {
            let previous = self
                .repository
                .bind_controller(&code, connection.clone())
                .await?;
            if let Some(previous) = previous.filter(|previous| previous != &connection) {
                tracing::warn!(
                    "Controller '{}' in room '{}' replaced by '{}'",
                    previous,
                    code,
                    connection
                );
            }
            self.repository.get_room(&code).await?
        };

        bind_session(
            self.repository.as_ref(),
            self.registry.as_ref(),
            &connection,
            SessionBinding::new(code.clone(), DeviceRole::Controller),
        )
        .await;

        if let Some(display) = room.display.as_ref() {
            if let Err(e) = self
                .message_pusher
                .push_to(display, &RelayEvent::ControllerConnected)
                .await
            {
                tracing::warn!("Failed to notify display of room '{}': {}", code, e);
            }
        }

        tracing::info!("Controller '{}' joined room '{}'", connection, code);
        Ok(room.annotations)
    }
}
