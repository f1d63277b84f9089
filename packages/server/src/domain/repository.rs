//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    Annotation, AnnotationId, ConnectionId, DeviceRole, RepositoryError, Room, RoomCode,
    Timestamp,
};

/// Room Repository trait
///
/// 稼働中のルームの表を管理します。変更操作は全て書き込み時に永続化されます
/// （write-through）。永続化の失敗はログに記録されるだけで、メモリ上の状態が正となります。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// コードを割り当てて新しいルームを作成し、display を束縛する
    async fn create_room(
        &self,
        display: ConnectionId,
        created_at: Timestamp,
    ) -> Result<RoomCode, RepositoryError>;

    /// ルームを取得
    async fn get_room(&self, code: &RoomCode) -> Result<Room, RepositoryError>;

    /// 全てのルームをコード順に取得
    async fn list_rooms(&self) -> Vec<Room>;

    /// controller スロットを無条件に上書きし、以前の接続を返す
    async fn bind_controller(
        &self,
        code: &RoomCode,
        connection: ConnectionId,
    ) -> Result<Option<ConnectionId>, RepositoryError>;

    /// 空いているスロットに接続を束縛する（再接続用）
    ///
    /// スロットが埋まっている場合は `RepositoryError::AlreadyBound`。
    async fn rebind(
        &self,
        code: &RoomCode,
        role: DeviceRole,
        connection: ConnectionId,
    ) -> Result<Room, RepositoryError>;

    /// display スロットが `connection` を保持していれば解放する
    async fn unbind_display(
        &self,
        code: &RoomCode,
        connection: &ConnectionId,
    ) -> Result<bool, RepositoryError>;

    /// controller スロットが `connection` を保持していれば解放する
    async fn unbind_controller(
        &self,
        code: &RoomCode,
        connection: &ConnectionId,
    ) -> Result<bool, RepositoryError>;

    /// アノテーションを末尾に追加し、実際に保存されたアノテーションを返す
    async fn append_annotation(
        &self,
        code: &RoomCode,
        annotation: Annotation,
    ) -> Result<Annotation, RepositoryError>;

    /// アノテーションを削除（存在しない ID は何もしない）
    async fn remove_annotation(
        &self,
        code: &RoomCode,
        id: &AnnotationId,
    ) -> Result<bool, RepositoryError>;

    /// 全アノテーションを消去
    async fn clear_annotations(&self, code: &RoomCode) -> Result<(), RepositoryError>;
}
