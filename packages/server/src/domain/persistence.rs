//! 永続化ストア trait 定義
//!
//! ルーム 1 件を 1 レコードとして丸ごと書き込み・読み込みします。

use async_trait::async_trait;

use super::{PersistenceError, Room, RoomCode};

/// ルームの永続化先
#[async_trait]
pub trait RoomPersistence: Send + Sync {
    /// ルーム全体を書き込む（既存レコードは置き換え）
    async fn save(&self, room: &Room) -> Result<(), PersistenceError>;

    /// コードに対応するレコードを読み込む
    async fn load(&self, code: &RoomCode) -> Result<Option<Room>, PersistenceError>;

    /// 全てのレコードを読み込む
    async fn load_all(&self) -> Result<Vec<Room>, PersistenceError>;
}
