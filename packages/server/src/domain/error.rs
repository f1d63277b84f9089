//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクト生成時のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Room code must be {len} digits, got '{0}'", len = super::ROOM_CODE_LENGTH)]
    InvalidRoomCode(String),

    #[error("Connection ID must not be empty")]
    EmptyConnectionId,

    #[error("Annotation ID must not be empty")]
    EmptyAnnotationId,

    #[error("Unknown severity '{0}' (expected low, medium or high)")]
    InvalidSeverity(String),

    #[error("Restricted zone needs at least {min} vertices, got {0}", min = super::MIN_RESTRICTED_VERTICES)]
    TooFewVertices(usize),
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Role '{role}' in room '{code}' is already bound")]
    AlreadyBound { code: String, role: String },

    #[error("All room codes are in use")]
    CodeSpaceExhausted,
}

/// 永続化のエラー
///
/// Repository はこのエラーをログに記録するだけで呼び出し元には伝播しません。
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted room record '{0}': {1}")]
    CorruptedRecord(String, String),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' not found")]
    ClientNotFound(String),

    #[error("Push failed: {0}")]
    PushFailed(String),
}
