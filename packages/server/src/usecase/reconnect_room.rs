//! UseCase: 切断後の再接続
//!
//! 空いているスロットにだけ束縛し直します。同じ役割の二重接続は拒否します。

use std::sync::Arc;

use crate::domain::{
    Annotation, ConnectionId, DeviceRole, MessagePusher, RelayEvent, RepositoryError, RoomCode,
    RoomRepository, SessionBinding, SessionRegistry,
};

use super::{binding::bind_session, error::ReconnectRoomError};

/// 再接続の結果
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectOutcome {
    pub annotations: Vec<Annotation>,
    /// display が再接続した場合のみ、controller がいるかどうか
    pub has_controller: Option<bool>,
}

/// 再接続のユースケース
pub struct ReconnectRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    registry: Arc<dyn SessionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ReconnectRoomUseCase {
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

    /// 再接続を実行
    ///
    /// # Arguments
    ///
    /// * `connection` - 新しい接続
    /// * `raw_code` - 再接続先のルームコード
    /// * `role` - 再接続する役割
    pub async fn execute(
        &self,
        connection: ConnectionId,
        raw_code: &str,
        role: DeviceRole,
    ) -> Result<ReconnectOutcome, ReconnectRoomError> {
        let code = RoomCode::new(raw_code.to_string())
            .map_err(|_| ReconnectRoomError::RoomNotFound(raw_code.to_string()))?;

        let room = self
            .repository
            .rebind(&code, role, connection.clone())
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyBound { .. } => {
                    ReconnectRoomError::DeviceTypeAlreadyConnected(role)
                }
                _ => ReconnectRoomError::RoomNotFound(code.to_string()),
            })?;

        bind_session(
            self.repository.as_ref(),
            self.registry.as_ref(),
            &connection,
            SessionBinding::new(code.clone(), role),
        )
        .await;

        tracing::info!("{} '{}' reconnected to room '{}'", role, connection, code);

        let has_controller = match role {
            DeviceRole::Display => Some(room.has_controller()),
            DeviceRole::Controller => {
                if let Some(display) = room.display.as_ref() {
                    if let Err(e) = self
                        .message_pusher
                        .push_to(display, &RelayEvent::ControllerConnected)
                        .await
                    {
                        tracing::warn!("Failed to notify display of room '{}': {}", code, e);
                    }
                }
                None
            }
        };

        Ok(ReconnectOutcome {
            annotations: room.annotations,
            has_controller,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockMessagePusher, Timestamp},
        infrastructure::{
            persistence::NoopRoomPersistence, repository::InMemoryRoomRepository,
            session::InMemorySessionRegistry,
        },
    };
    use mockall::predicate::eq;

    const NOW: i64 = 1_700_000_000_000;

    fn conn(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    /// display と controller が揃ったルームを用意する
    async fn paired_room() -> (Arc<InMemoryRoomRepository>, RoomCode) {
        let repository = Arc::new(InMemoryRoomRepository::new(Arc::new(NoopRoomPersistence)));
        let code = repository
            .create_room(conn("display-1"), Timestamp::new(NOW))
            .await
            .unwrap();
        repository
            .bind_controller(&code, conn("controller-1"))
            .await
            .unwrap();
        (repository, code)
    }

    #[tokio::test]
    async fn test_display_reconnect_reports_controller() {
        // テスト項目: display の再接続では hasController が返る
        // given (前提条件):
        let (repository, code) = paired_room().await;
        repository
            .unbind_display(&code, &conn("display-1"))
            .await
            .unwrap();
        let usecase = ReconnectRoomUseCase::new(
            repository.clone(),
            Arc::new(InMemorySessionRegistry::new()),
            Arc::new(MockMessagePusher::new()),
        );

        // when (操作):
        let outcome = usecase
            .execute(conn("display-2"), code.as_str(), DeviceRole::Display)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.has_controller, Some(true));
        assert_eq!(
            repository.get_room(&code).await.unwrap().display,
            Some(conn("display-2"))
        );
    }

    #[tokio::test]
    async fn test_reconnect_succeeds_exactly_once() {
        // テスト項目: 空いたスロットへの再接続は 1 回だけ成功する
        // given (前提条件):
        let (repository, code) = paired_room().await;
        repository
            .unbind_display(&code, &conn("display-1"))
            .await
            .unwrap();
        let usecase = ReconnectRoomUseCase::new(
            repository,
            Arc::new(InMemorySessionRegistry::new()),
            Arc::new(MockMessagePusher::new()),
        );

        // when (操作):
        let first = usecase
            .execute(conn("display-2"), code.as_str(), DeviceRole::Display)
            .await;
        let second = usecase
            .execute(conn("display-3"), code.as_str(), DeviceRole::Display)
            .await;

        // then (期待する結果):
        assert!(first.is_ok());
        let err = second.unwrap_err();
        assert_eq!(
            err,
            ReconnectRoomError::DeviceTypeAlreadyConnected(DeviceRole::Display)
        );
        assert_eq!(err.to_string(), "Device type already connected");
    }

    #[tokio::test]
    async fn test_controller_reconnect_notifies_display() {
        // テスト項目: controller の再接続では display に controller-connected が送られる
        // given (前提条件):
        let (repository, code) = paired_room().await;
        repository
            .unbind_controller(&code, &conn("controller-1"))
            .await
            .unwrap();
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .with(eq(conn("display-1")), eq(RelayEvent::ControllerConnected))
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = ReconnectRoomUseCase::new(
            repository,
            Arc::new(InMemorySessionRegistry::new()),
            Arc::new(pusher),
        );

        // when (操作):
        let outcome = usecase
            .execute(conn("controller-2"), code.as_str(), DeviceRole::Controller)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(outcome.has_controller, None);
    }

    #[tokio::test]
    async fn test_reconnect_unknown_room() {
        // テスト項目: 存在しないルームへの再接続は "Room not found"
        let repository = Arc::new(InMemoryRoomRepository::new(Arc::new(NoopRoomPersistence)));
        let usecase = ReconnectRoomUseCase::new(
            repository,
            Arc::new(InMemorySessionRegistry::new()),
            Arc::new(MockMessagePusher::new()),
        );
        let result = usecase
            .execute(conn("display-1"), "1234", DeviceRole::Display)
            .await;
        assert_eq!(
            result,
            Err(ReconnectRoomError::RoomNotFound("1234".to_string()))
        );
    }
}
