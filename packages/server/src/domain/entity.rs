//! エンティティ
//!
//! - `Room`: display と controller をペアリングするセッション
//! - `Annotation`: ルームに紐づく安全マーカー

use super::{
    AnnotationId, ConnectionId, DeviceRole, Position, RoomCode, Severity, Timestamp, Vertex,
};

/// ルーム
///
/// 各役割のスロットは高々 1 つの接続を保持します。
/// 接続が切れてもルーム自体は残り、再接続を待ちます。
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub code: RoomCode,
    pub display: Option<ConnectionId>,
    pub controller: Option<ConnectionId>,
    /// 追加順 = 表示順。並べ替えない。
    pub annotations: Vec<Annotation>,
    pub created_at: Timestamp,
}

impl Room {
    /// display を束縛した状態で新しいルームを作成
    pub fn new(code: RoomCode, display: ConnectionId, created_at: Timestamp) -> Self {
        Self {
            code,
            display: Some(display),
            controller: None,
            annotations: Vec::new(),
            created_at,
        }
    }

    pub fn slot(&self, role: DeviceRole) -> Option<&ConnectionId> {
        match role {
            DeviceRole::Display => self.display.as_ref(),
            DeviceRole::Controller => self.controller.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: DeviceRole) -> &mut Option<ConnectionId> {
        match role {
            DeviceRole::Display => &mut self.display,
            DeviceRole::Controller => &mut self.controller,
        }
    }

    pub fn has_display(&self) -> bool {
        self.display.is_some()
    }

    pub fn has_controller(&self) -> bool {
        self.controller.is_some()
    }

    /// スロットを無条件に上書きし、以前の接続を返す
    pub fn bind(&mut self, role: DeviceRole, connection: ConnectionId) -> Option<ConnectionId> {
        self.slot_mut(role).replace(connection)
    }

    /// スロットが空いている場合のみ束縛する
    ///
    /// 既に埋まっている場合は `false` を返し、何も変更しない。
    pub fn bind_if_vacant(&mut self, role: DeviceRole, connection: ConnectionId) -> bool {
        let slot = self.slot_mut(role);
        if slot.is_some() {
            return false;
        }
        *slot = Some(connection);
        true
    }

    /// スロットが指定の接続を保持している場合のみ解放する
    pub fn release(&mut self, role: DeviceRole, connection: &ConnectionId) -> bool {
        let slot = self.slot_mut(role);
        if slot.as_ref() == Some(connection) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// 全てのスロットを空にする（プロセス再起動時の復元で使用）
    pub fn detach_connections(&mut self) {
        self.display = None;
        self.controller = None;
    }

    pub fn contains_annotation(&self, id: &AnnotationId) -> bool {
        self.annotations.iter().any(|a| &a.id == id)
    }

    pub fn push_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// ID に一致するアノテーションを取り除く。存在しない ID は何もしない。
    pub fn remove_annotation(&mut self, id: &AnnotationId) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| &a.id != id);
        self.annotations.len() != before
    }

    pub fn clear_annotations(&mut self) {
        self.annotations.clear();
    }
}

/// アノテーション
///
/// 生成後は不変。削除と全消去以外の変更操作はない。
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub created_at: Timestamp,
    pub shape: AnnotationShape,
}

/// アノテーションの種類ごとのペイロード
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationShape {
    Danger {
        position: Position,
        radius: f64,
        label: String,
    },
    Arrow {
        start: Position,
        end: Position,
        label: String,
    },
    Incident {
        position: Position,
        date: String,
        description: String,
        severity: Severity,
    },
    Restricted {
        points: Vec<Vertex>,
        active: bool,
    },
}

impl AnnotationShape {
    /// ID の接頭辞およびワイヤ上の `type` に使う種類名
    pub fn kind(&self) -> &'static str {
        match self {
            AnnotationShape::Danger { .. } => "danger",
            AnnotationShape::Arrow { .. } => "arrow",
            AnnotationShape::Incident { .. } => "incident",
            AnnotationShape::Restricted { .. } => "restricted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> RoomCode {
        RoomCode::new("4821".to_string()).unwrap()
    }

    fn conn(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn danger(id: &str) -> Annotation {
        Annotation {
            id: AnnotationId::new(id.to_string()).unwrap(),
            created_at: Timestamp::new(1),
            shape: AnnotationShape::Danger {
                position: Position::default(),
                radius: 5.0,
                label: "Danger Zone".to_string(),
            },
        }
    }

    #[test]
    fn test_new_room_binds_display_only() {
        // テスト項目: 作成直後のルームは display のみ束縛され、アノテーションは空
        // given (前提条件):

        // when (操作):
        let room = Room::new(code(), conn("display-1"), Timestamp::new(100));

        // then (期待する結果):
        assert_eq!(room.display, Some(conn("display-1")));
        assert!(!room.has_controller());
        assert!(room.annotations.is_empty());
    }

    #[test]
    fn test_bind_overwrites_and_returns_previous() {
        // テスト項目: bind は既存の接続を上書きし、以前の接続を返す
        // given (前提条件):
        let mut room = Room::new(code(), conn("display-1"), Timestamp::new(100));
        room.bind(DeviceRole::Controller, conn("controller-1"));

        // when (操作):
        let previous = room.bind(DeviceRole::Controller, conn("controller-2"));

        // then (期待する結果):
        assert_eq!(previous, Some(conn("controller-1")));
        assert_eq!(room.controller, Some(conn("controller-2")));
    }

    #[test]
    fn test_bind_if_vacant_refuses_occupied_slot() {
        // テスト項目: 埋まっているスロットには bind_if_vacant で束縛できない
        // given (前提条件):
        let mut room = Room::new(code(), conn("display-1"), Timestamp::new(100));

        // when (操作):
        let bound = room.bind_if_vacant(DeviceRole::Display, conn("display-2"));

        // then (期待する結果):
        assert!(!bound);
        assert_eq!(room.display, Some(conn("display-1")));
    }

    #[test]
    fn test_release_only_matching_connection() {
        // テスト項目: スロットを保持していない接続では解放されない
        // given (前提条件):
        let mut room = Room::new(code(), conn("display-1"), Timestamp::new(100));
        room.bind(DeviceRole::Controller, conn("controller-2"));

        // when (操作):
        let stale = room.release(DeviceRole::Controller, &conn("controller-1"));
        let current = room.release(DeviceRole::Controller, &conn("controller-2"));

        // then (期待する結果):
        assert!(!stale);
        assert!(current);
        assert!(!room.has_controller());
        assert!(room.has_display());
    }

    #[test]
    fn test_remove_annotation_keeps_order() {
        // テスト項目: 削除後も残りのアノテーションの順序は維持される
        // given (前提条件):
        let mut room = Room::new(code(), conn("display-1"), Timestamp::new(100));
        room.push_annotation(danger("danger_1"));
        room.push_annotation(danger("danger_2"));
        room.push_annotation(danger("danger_3"));

        // when (操作):
        let removed = room.remove_annotation(&AnnotationId::new("danger_2".to_string()).unwrap());

        // then (期待する結果):
        assert!(removed);
        let ids: Vec<&str> = room.annotations.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["danger_1", "danger_3"]);
    }

    #[test]
    fn test_remove_unknown_annotation_is_noop() {
        // テスト項目: 存在しない ID の削除は何も変更しない
        // given (前提条件):
        let mut room = Room::new(code(), conn("display-1"), Timestamp::new(100));
        room.push_annotation(danger("danger_1"));

        // when (操作):
        let removed = room.remove_annotation(&AnnotationId::new("arrow_9".to_string()).unwrap());

        // then (期待する結果):
        assert!(!removed);
        assert_eq!(room.annotations.len(), 1);
    }

    #[test]
    fn test_detach_connections_clears_both_slots() {
        // テスト項目: detach_connections で両方のスロットが空になる
        // given (前提条件):
        let mut room = Room::new(code(), conn("display-1"), Timestamp::new(100));
        room.bind(DeviceRole::Controller, conn("controller-1"));

        // when (操作):
        room.detach_connections();

        // then (期待する結果):
        assert!(!room.has_display());
        assert!(!room.has_controller());
    }
}
