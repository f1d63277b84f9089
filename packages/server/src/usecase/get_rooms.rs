//! UseCase: ルーム一覧・詳細の取得（HTTP API 用）

use std::sync::Arc;

use crate::domain::{Room, RoomCode, RoomRepository};

use super::error::GetRoomDetailError;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// コード順のルーム一覧
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.list_rooms().await
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, raw_code: String) -> Result<Room, GetRoomDetailError> {
        let code = RoomCode::new(raw_code).map_err(|_| GetRoomDetailError::RoomNotFound)?;
        self.repository
            .get_room(&code)
            .await
            .map_err(|_| GetRoomDetailError::RoomNotFound)
    }
}
