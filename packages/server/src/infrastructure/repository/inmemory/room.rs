//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `HashMap<RoomCode, Room>` をルーム表として使用し、変更のたびに
//! `RoomPersistence` へ書き込みます（write-through）。
//!
//! ロックを保持したまま永続化するため、同じルームへの書き込み順序は
//! メモリ上の変更順序と一致します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Annotation, AnnotationId, AnnotationIdFactory, ConnectionId, DeviceRole, PersistenceError,
    ROOM_CODE_CAPACITY, RepositoryError, Room, RoomCode, RoomCodeAllocator, RoomPersistence,
    RoomRepository, Timestamp,
};

/// 同一ルーム内でアノテーション ID が衝突したときの扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdCollisionPolicy {
    /// そのまま追加する（同じ ID が複数存在しうる）
    #[default]
    Allow,
    /// `_1`, `_2`, ... を付与して一意にする
    Suffix,
}

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomCode, Room>>,
    persistence: Arc<dyn RoomPersistence>,
    id_policy: IdCollisionPolicy,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    ///
    /// # Arguments
    ///
    /// * `persistence` - 書き込み先の永続化ストア
    pub fn new(persistence: Arc<dyn RoomPersistence>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            persistence,
            id_policy: IdCollisionPolicy::default(),
        }
    }

    pub fn with_id_policy(mut self, id_policy: IdCollisionPolicy) -> Self {
        self.id_policy = id_policy;
        self
    }

    /// 永続化ストアから全てのルームを読み込む
    ///
    /// 接続はプロセスをまたいで存続しないため、スロットは全て空にして復元します。
    ///
    /// # Returns
    ///
    /// 復元したルーム数
    pub async fn restore_persisted(&self) -> Result<usize, PersistenceError> {
        let restored = self.persistence.load_all().await?;
        let mut rooms = self.rooms.lock().await;
        let count = restored.len();
        for mut room in restored {
            room.detach_connections();
            rooms.insert(room.code.clone(), room);
        }
        tracing::info!("Restored {} room(s) from persistence", count);
        Ok(count)
    }

    async fn persist(&self, room: &Room) {
        if let Err(e) = self.persistence.save(room).await {
            tracing::error!("Failed to persist room '{}': {}", room.code, e);
        }
    }

    /// ルーム表にないコードは永続化ストアから遅延読み込みする
    async fn room_mut<'a>(
        &self,
        rooms: &'a mut HashMap<RoomCode, Room>,
        code: &RoomCode,
    ) -> Result<&'a mut Room, RepositoryError> {
        if !rooms.contains_key(code) {
            match self.persistence.load(code).await {
                Ok(Some(mut room)) => {
                    room.detach_connections();
                    tracing::info!("Room '{}' loaded from persistence", code);
                    rooms.insert(code.clone(), room);
                }
                Ok(None) => {}
                Err(e) => tracing::error!("Failed to load room '{}': {}", code, e),
            }
        }
        rooms
            .get_mut(code)
            .ok_or_else(|| RepositoryError::RoomNotFound(code.to_string()))
    }

    async fn unbind(
        &self,
        code: &RoomCode,
        role: DeviceRole,
        connection: &ConnectionId,
    ) -> Result<bool, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = self.room_mut(&mut rooms, code).await?;
        let released = room.release(role, connection);
        if released {
            self.persist(room).await;
        }
        Ok(released)
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(
        &self,
        display: ConnectionId,
        created_at: Timestamp,
    ) -> Result<RoomCode, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.len() >= ROOM_CODE_CAPACITY {
            return Err(RepositoryError::CodeSpaceExhausted);
        }

        let code = RoomCodeAllocator::allocate(|candidate| rooms.contains_key(candidate));
        let room = Room::new(code.clone(), display, created_at);
        self.persist(&room).await;
        rooms.insert(code.clone(), room);

        tracing::info!("Room '{}' created", code);
        Ok(code)
    }

    async fn get_room(&self, code: &RoomCode) -> Result<Room, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = self.room_mut(&mut rooms, code).await?;
        Ok(room.clone())
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        let mut list: Vec<Room> = rooms.values().cloned().collect();
        list.sort_by(|a, b| a.code.cmp(&b.code));
        list
    }

    async fn bind_controller(
        &self,
        code: &RoomCode,
        connection: ConnectionId,
    ) -> Result<Option<ConnectionId>, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = self.room_mut(&mut rooms, code).await?;
        let previous = room.bind(DeviceRole::Controller, connection);
        self.persist(room).await;
        Ok(previous)
    }

    async fn rebind(
        &self,
        code: &RoomCode,
        role: DeviceRole,
        connection: ConnectionId,
    ) -> Result<Room, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = self.room_mut(&mut rooms, code).await?;
        if !room.bind_if_vacant(role, connection) {
            return Err(RepositoryError::AlreadyBound {
                code: code.to_string(),
                role: role.to_string(),
            });
        }
        self.persist(room).await;
        Ok(room.clone())
    }

    async fn unbind_display(
        &self,
        code: &RoomCode,
        connection: &ConnectionId,
    ) -> Result<bool, RepositoryError> {
        self.unbind(code, DeviceRole::Display, connection).await
    }

    async fn unbind_controller(
        &self,
        code: &RoomCode,
        connection: &ConnectionId,
    ) -> Result<bool, RepositoryError> {
        self.unbind(code, DeviceRole::Controller, connection).await
    }

    async fn append_annotation(
        &self,
        code: &RoomCode,
        mut annotation: Annotation,
    ) -> Result<Annotation, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = self.room_mut(&mut rooms, code).await?;

        if self.id_policy == IdCollisionPolicy::Suffix {
            annotation.id = AnnotationIdFactory::unique_within(annotation.id, |id| {
                room.contains_annotation(id)
            });
        }
        room.push_annotation(annotation.clone());
        self.persist(room).await;
        Ok(annotation)
    }

    async fn remove_annotation(
        &self,
        code: &RoomCode,
        id: &AnnotationId,
    ) -> Result<bool, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = self.room_mut(&mut rooms, code).await?;
        let removed = room.remove_annotation(id);
        if removed {
            self.persist(room).await;
        }
        Ok(removed)
    }

    async fn clear_annotations(&self, code: &RoomCode) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = self.room_mut(&mut rooms, code).await?;
        room.clear_annotations();
        self.persist(room).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{AnnotationShape, Position},
        infrastructure::persistence::{JsonFileRoomPersistence, NoopRoomPersistence},
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ルームの作成・取得・スロットの束縛と解放
    // - アノテーションの追加・削除・全消去
    // - 永続化ストアからの復元と遅延読み込み
    //
    // 【どのようなシナリオをテストするか】
    // 1. 作成したルームに display が束縛されている
    // 2. 古い接続の切断で新しい束縛が消えない
    // 3. 空いていないスロットへの再接続は失敗する
    // 4. ID 衝突ポリシーごとのアノテーション追加
    // 5. 再起動後の復元（スロットは空）
    // ========================================

    const NOW: i64 = 1_700_000_000_000;

    fn create_test_repository() -> InMemoryRoomRepository {
        InMemoryRoomRepository::new(Arc::new(NoopRoomPersistence))
    }

    fn conn(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn danger(id: &str) -> Annotation {
        Annotation {
            id: AnnotationId::new(id.to_string()).unwrap(),
            created_at: Timestamp::new(NOW),
            shape: AnnotationShape::Danger {
                position: Position::default(),
                radius: 5.0,
                label: "Danger Zone".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_create_room_binds_display() {
        // テスト項目: 作成したルームには display が束縛され、controller は空
        // given (前提条件):
        let repository = create_test_repository();

        // when (操作):
        let code = repository
            .create_room(conn("display-1"), Timestamp::new(NOW))
            .await
            .unwrap();

        // then (期待する結果):
        let room = repository.get_room(&code).await.unwrap();
        assert_eq!(room.display, Some(conn("display-1")));
        assert_eq!(room.controller, None);
        assert!(room.annotations.is_empty());
    }

    #[tokio::test]
    async fn test_create_room_codes_are_distinct() {
        // テスト項目: 同時に存在するルームのコードは全て異なる
        // given (前提条件):
        let repository = create_test_repository();

        // when (操作):
        for i in 0..50 {
            repository
                .create_room(conn(&format!("display-{}", i)), Timestamp::new(NOW))
                .await
                .unwrap();
        }

        // then (期待する結果):
        let rooms = repository.list_rooms().await;
        assert_eq!(rooms.len(), 50);
        assert!(rooms.windows(2).all(|w| w[0].code < w[1].code));
    }

    #[tokio::test]
    async fn test_get_unknown_room() {
        // テスト項目: 存在しないコードの取得は RoomNotFound
        let repository = create_test_repository();
        let result = repository
            .get_room(&RoomCode::new("1234".to_string()).unwrap())
            .await;
        assert_eq!(result, Err(RepositoryError::RoomNotFound("1234".to_string())));
    }

    #[tokio::test]
    async fn test_bind_controller_returns_previous() {
        // テスト項目: controller の上書き時に以前の接続が返る
        // given (前提条件):
        let repository = create_test_repository();
        let code = repository
            .create_room(conn("display-1"), Timestamp::new(NOW))
            .await
            .unwrap();
        repository
            .bind_controller(&code, conn("controller-1"))
            .await
            .unwrap();

        // when (操作):
        let previous = repository
            .bind_controller(&code, conn("controller-2"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(previous, Some(conn("controller-1")));
        let room = repository.get_room(&code).await.unwrap();
        assert_eq!(room.controller, Some(conn("controller-2")));
    }

    #[tokio::test]
    async fn test_stale_unbind_keeps_new_binding() {
        // テスト項目: 上書きされた古い接続の切断では新しい束縛が消えない
        // given (前提条件):
        let repository = create_test_repository();
        let code = repository
            .create_room(conn("display-1"), Timestamp::new(NOW))
            .await
            .unwrap();
        repository
            .bind_controller(&code, conn("controller-1"))
            .await
            .unwrap();
        repository
            .bind_controller(&code, conn("controller-2"))
            .await
            .unwrap();

        // when (操作):
        let released = repository
            .unbind_controller(&code, &conn("controller-1"))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(!released);
        let room = repository.get_room(&code).await.unwrap();
        assert_eq!(room.controller, Some(conn("controller-2")));
    }

    #[tokio::test]
    async fn test_rebind_vacant_and_occupied() {
        // テスト項目: 空いたスロットには再接続でき、埋まっているスロットには再接続できない
        // given (前提条件):
        let repository = create_test_repository();
        let code = repository
            .create_room(conn("display-1"), Timestamp::new(NOW))
            .await
            .unwrap();
        repository
            .unbind_display(&code, &conn("display-1"))
            .await
            .unwrap();

        // when (操作):
        let first = repository
            .rebind(&code, DeviceRole::Display, conn("display-2"))
            .await;
        let second = repository
            .rebind(&code, DeviceRole::Display, conn("display-3"))
            .await;

        // then (期待する結果):
        assert_eq!(first.unwrap().display, Some(conn("display-2")));
        assert_eq!(
            second,
            Err(RepositoryError::AlreadyBound {
                code: code.to_string(),
                role: "display".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_append_allows_duplicate_ids_by_default() {
        // テスト項目: 既定のポリシーでは同じ ID のアノテーションも追加される
        // given (前提条件):
        let repository = create_test_repository();
        let code = repository
            .create_room(conn("display-1"), Timestamp::new(NOW))
            .await
            .unwrap();

        // when (操作):
        repository
            .append_annotation(&code, danger("danger_1"))
            .await
            .unwrap();
        let stored = repository
            .append_annotation(&code, danger("danger_1"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(stored.id.as_str(), "danger_1");
        assert_eq!(repository.get_room(&code).await.unwrap().annotations.len(), 2);
    }

    #[tokio::test]
    async fn test_append_suffixes_colliding_ids() {
        // テスト項目: Suffix ポリシーでは衝突した ID に接尾辞が付く
        // given (前提条件):
        let repository = create_test_repository().with_id_policy(IdCollisionPolicy::Suffix);
        let code = repository
            .create_room(conn("display-1"), Timestamp::new(NOW))
            .await
            .unwrap();
        repository
            .append_annotation(&code, danger("danger_1"))
            .await
            .unwrap();

        // when (操作):
        let stored = repository
            .append_annotation(&code, danger("danger_1"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(stored.id.as_str(), "danger_1_1");
        let ids: Vec<String> = repository
            .get_room(&code)
            .await
            .unwrap()
            .annotations
            .into_iter()
            .map(|a| a.id.into_string())
            .collect();
        assert_eq!(ids, vec!["danger_1", "danger_1_1"]);
    }

    #[tokio::test]
    async fn test_remove_and_clear_annotations() {
        // テスト項目: 削除は一致する ID のみ、全消去は全てのアノテーションを消す
        // given (前提条件):
        let repository = create_test_repository();
        let code = repository
            .create_room(conn("display-1"), Timestamp::new(NOW))
            .await
            .unwrap();
        for id in ["danger_1", "danger_2", "danger_3"] {
            repository.append_annotation(&code, danger(id)).await.unwrap();
        }

        // when (操作):
        let removed = repository
            .remove_annotation(&code, &AnnotationId::new("danger_2".to_string()).unwrap())
            .await
            .unwrap();
        let missing = repository
            .remove_annotation(&code, &AnnotationId::new("arrow_9".to_string()).unwrap())
            .await
            .unwrap();
        let after_remove = repository.get_room(&code).await.unwrap().annotations.len();
        repository.clear_annotations(&code).await.unwrap();

        // then (期待する結果):
        assert!(removed);
        assert!(!missing);
        assert_eq!(after_remove, 2);
        assert!(repository.get_room(&code).await.unwrap().annotations.is_empty());
    }

    #[tokio::test]
    async fn test_restore_persisted_detaches_connections() {
        // テスト項目: 再起動後はアノテーションが復元され、スロットは空になる
        // given (前提条件):
        let dir = tempfile::tempdir().unwrap();
        let code = {
            let repository =
                InMemoryRoomRepository::new(Arc::new(JsonFileRoomPersistence::new(dir.path())));
            let code = repository
                .create_room(conn("display-1"), Timestamp::new(NOW))
                .await
                .unwrap();
            repository
                .bind_controller(&code, conn("controller-1"))
                .await
                .unwrap();
            repository
                .append_annotation(&code, danger("danger_1"))
                .await
                .unwrap();
            code
        };

        // when (操作):
        let repository =
            InMemoryRoomRepository::new(Arc::new(JsonFileRoomPersistence::new(dir.path())));
        let restored = repository.restore_persisted().await.unwrap();

        // then (期待する結果):
        assert_eq!(restored, 1);
        let room = repository.get_room(&code).await.unwrap();
        assert_eq!(room.display, None);
        assert_eq!(room.controller, None);
        assert_eq!(room.annotations, vec![danger("danger_1")]);
    }

    #[tokio::test]
    async fn test_get_room_loads_lazily() {
        // テスト項目: ルーム表にないコードは永続化ストアから読み込まれる
        // given (前提条件):
        let dir = tempfile::tempdir().unwrap();
        let persistence = Arc::new(JsonFileRoomPersistence::new(dir.path()));
        let room = Room::new(
            RoomCode::new("4821".to_string()).unwrap(),
            conn("display-1"),
            Timestamp::new(NOW),
        );
        persistence.save(&room).await.unwrap();
        let repository = InMemoryRoomRepository::new(persistence);

        // when (操作):
        let loaded = repository.get_room(&room.code).await.unwrap();

        // then (期待する結果):
        assert_eq!(loaded.code, room.code);
        assert_eq!(loaded.display, None);
        assert_eq!(repository.list_rooms().await.len(), 1);
    }
}
