//! UseCase 層のエラー型
//!
//! `Display` の文言はそのまま ack の `error` としてクライアントに返されます。

use thiserror::Error;

use crate::domain::{DeviceRole, MessagePushError, RepositoryError, ValueObjectError};

use super::access::AccessDenied;

/// ルーム作成のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("No room codes available")]
    CodeSpaceExhausted,

    #[error("Failed to create room: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CreateRoomError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::CodeSpaceExhausted => CreateRoomError::CodeSpaceExhausted,
            other => CreateRoomError::Repository(other),
        }
    }
}

/// controller としての参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("Room not found")]
    RoomNotFound(String),

    #[error("Device type already connected")]
    ControllerAlreadyConnected,
}

impl From<RepositoryError> for JoinRoomError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::AlreadyBound { .. } => JoinRoomError::ControllerAlreadyConnected,
            RepositoryError::RoomNotFound(code) => JoinRoomError::RoomNotFound(code),
            RepositoryError::CodeSpaceExhausted => JoinRoomError::RoomNotFound(String::new()),
        }
    }
}

/// 再接続のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconnectRoomError {
    #[error("Room not found")]
    RoomNotFound(String),

    #[error("Device type already connected")]
    DeviceTypeAlreadyConnected(DeviceRole),
}

/// 特定の役割への転送のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Room not found")]
    RoomNotFound(String),

    #[error("Not allowed to send to room '{0}'")]
    Forbidden(String),

    #[error("No {0} connected")]
    RecipientNotConnected(DeviceRole),

    #[error("Event '{0}' has no direct recipient")]
    NotRelayable(&'static str),

    #[error("Failed to deliver: {0}")]
    Push(#[from] MessagePushError),
}

impl From<AccessDenied> for RelayError {
    fn from(e: AccessDenied) -> Self {
        match e {
            AccessDenied::MalformedCode(code) => RelayError::RoomNotFound(code),
            AccessDenied::Forbidden(code) => RelayError::Forbidden(code.into_string()),
        }
    }
}

/// アノテーション操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotateError {
    #[error("Room not found")]
    RoomNotFound(String),

    #[error("Not allowed to send to room '{0}'")]
    Forbidden(String),

    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(#[from] ValueObjectError),
}

impl From<RepositoryError> for AnnotateError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::RoomNotFound(code) => AnnotateError::RoomNotFound(code),
            other => AnnotateError::RoomNotFound(other.to_string()),
        }
    }
}

impl From<AccessDenied> for AnnotateError {
    fn from(e: AccessDenied) -> Self {
        match e {
            AccessDenied::MalformedCode(code) => AnnotateError::RoomNotFound(code),
            AccessDenied::Forbidden(code) => AnnotateError::Forbidden(code.into_string()),
        }
    }
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room not found")]
    RoomNotFound,
}
