//! Session Registry trait 定義
//!
//! 接続 ↔ (ルームコード, 役割) の対応を管理します。永続化はしません。

use async_trait::async_trait;

use super::{ConnectionId, DeviceRole, RoomCode};

/// 接続が束縛されているルームと役割
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    pub code: RoomCode,
    pub role: DeviceRole,
}

impl SessionBinding {
    pub fn new(code: RoomCode, role: DeviceRole) -> Self {
        Self { code, role }
    }
}

/// Session Registry trait
///
/// 1 接続につき束縛は 1 つ。再度束縛すると以前の束縛は置き換えられる。
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// 接続を束縛し、以前の束縛を返す
    async fn bind(
        &self,
        connection: ConnectionId,
        binding: SessionBinding,
    ) -> Option<SessionBinding>;

    /// 接続の束縛を破棄して返す
    async fn unbind(&self, connection: &ConnectionId) -> Option<SessionBinding>;

    /// 接続の束縛を取得
    async fn binding_of(&self, connection: &ConnectionId) -> Option<SessionBinding>;

    /// ルームに束縛されている全ての接続（ブロードキャスト対象）
    async fn members(&self, code: &RoomCode) -> Vec<ConnectionId>;
}
