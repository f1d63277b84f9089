//! 何も保存しない永続化実装

use async_trait::async_trait;

use crate::domain::{PersistenceError, Room, RoomCode, RoomPersistence};

/// 永続化を無効にする場合の実装
///
/// 保存は常に成功し、読み込みは常に空になります。
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRoomPersistence;

#[async_trait]
impl RoomPersistence for NoopRoomPersistence {
    async fn save(&self, _room: &Room) -> Result<(), PersistenceError> {
        Ok(())
    }

    async fn load(&self, _code: &RoomCode) -> Result<Option<Room>, PersistenceError> {
        Ok(None)
    }

    async fn load_all(&self) -> Result<Vec<Room>, PersistenceError> {
        Ok(Vec::new())
    }
}
