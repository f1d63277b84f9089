//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use std::fmt;

use serde_json::{Value, json};

use crate::{error::ClientError, protocol::ClientFrame};

/// Role this client plays in a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Role {
    Display,
    Controller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Display => "display",
            Role::Controller => "controller",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the client knows about its room across reconnections
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub role: Role,
    pub room_code: Option<String>,
    /// Whether a previous connection already entered the room
    pub entered: bool,
}

impl SessionContext {
    pub fn new(role: Role, room_code: Option<String>) -> Self {
        Self {
            role,
            room_code,
            entered: false,
        }
    }
}

/// Event that puts a fresh connection into its room
#[derive(Debug, Clone, PartialEq)]
pub enum Handshake {
    CreateRoom,
    JoinRoom { code: String },
    ReconnectRoom { code: String, role: Role },
}

impl Handshake {
    pub fn event(&self) -> &'static str {
        match self {
            Handshake::CreateRoom => "create-room",
            Handshake::JoinRoom { .. } => "join-room",
            Handshake::ReconnectRoom { .. } => "reconnect-room",
        }
    }

    pub fn to_frame(&self, ack: u64) -> ClientFrame {
        let data = match self {
            Handshake::CreateRoom => Value::Null,
            Handshake::JoinRoom { code } => json!({"roomCode": code}),
            Handshake::ReconnectRoom { code, role } => {
                json!({"roomId": code, "deviceType": role.as_str()})
            }
        };
        ClientFrame::new(self.event(), data, ack)
    }
}

/// Decide how a new connection should enter its room.
///
/// # Arguments
///
/// * `context` - The role and room known so far
///
/// # Returns
///
/// The handshake to send, or `MissingRoomCode` for a controller without a code
pub fn next_handshake(context: &SessionContext) -> Result<Handshake, ClientError> {
    match (context.role, &context.room_code) {
        (Role::Display, None) => Ok(Handshake::CreateRoom),
        (Role::Controller, None) => Err(ClientError::MissingRoomCode),
        (Role::Controller, Some(code)) if !context.entered => Ok(Handshake::JoinRoom {
            code: code.clone(),
        }),
        (role, Some(code)) => Ok(Handshake::ReconnectRoom {
            code: code.clone(),
            role,
        }),
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// # Arguments
///
/// * `error` - The client error to check
///
/// # Returns
///
/// `true` if retrying cannot help (the server refused the room),
/// `false` otherwise
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::Rejected { .. } | ClientError::MissingRoomCode
    )
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
///
/// # Returns
///
/// `true` if reconnection should be attempted, `false` otherwise
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected() -> ClientError {
        ClientError::Rejected {
            event: "join-room",
            reason: "Room not found".to_string(),
        }
    }

    #[test]
    fn test_display_without_code_creates_room() {
        // テスト項目: コードを持たない display はルームを作成する
        // given (前提条件):
        let context = SessionContext::new(Role::Display, None);

        // when (操作):
        let handshake = next_handshake(&context).unwrap();

        // then (期待する結果):
        assert_eq!(handshake, Handshake::CreateRoom);
    }

    #[test]
    fn test_display_with_code_reconnects() {
        // テスト項目: コードを持つ display は既存ルームに再接続する
        // given (前提条件):
        let context = SessionContext::new(Role::Display, Some("4821".to_string()));

        // when (操作):
        let handshake = next_handshake(&context).unwrap();

        // then (期待する結果):
        assert_eq!(
            handshake,
            Handshake::ReconnectRoom {
                code: "4821".to_string(),
                role: Role::Display
            }
        );
    }

    #[test]
    fn test_controller_joins_then_reconnects() {
        // テスト項目: controller は初回に join-room、入室後の接続では reconnect-room を使う
        // given (前提条件):
        let mut context = SessionContext::new(Role::Controller, Some("4821".to_string()));

        // when (操作):
        let first = next_handshake(&context).unwrap();
        context.entered = true;
        let second = next_handshake(&context).unwrap();

        // then (期待する結果):
        assert_eq!(first.event(), "join-room");
        assert_eq!(second.event(), "reconnect-room");
        assert_eq!(
            second.to_frame(2).data,
            json!({"roomId": "4821", "deviceType": "controller"})
        );
    }

    #[test]
    fn test_controller_without_code_is_an_error() {
        // テスト項目: コードを持たない controller は入室できない
        let context = SessionContext::new(Role::Controller, None);
        assert!(matches!(
            next_handshake(&context),
            Err(ClientError::MissingRoomCode)
        ));
    }

    #[test]
    fn test_should_exit_immediately_when_rejected() {
        // テスト項目: サーバーに拒否された場合、即座に終了すべきと判定される
        // given (前提条件):
        let error = rejected();

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_exit_immediately_with_connection_error() {
        // テスト項目: ConnectionError の場合、即座に終了すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_exit_immediately(&error);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_should_attempt_reconnect_when_rejected() {
        // テスト項目: サーバーに拒否された場合、再接続すべきではないと判定される
        assert!(!should_attempt_reconnect(&rejected(), 0, 5));
    }

    #[test]
    fn test_should_attempt_reconnect_within_limit() {
        // テスト項目: 再接続回数が上限未満の場合、再接続すべきと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 4, 5);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 再接続回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let error = ClientError::ConnectionError("network error".to_string());

        // when (操作):
        let result = should_attempt_reconnect(&error, 5, 5);

        // then (期待する結果):
        assert!(!result);
    }
}
