//! UseCase 層
//!
//! リレーの操作ごとに 1 つのユースケースを置きます。
//! 各ユースケースはドメイン層の trait（Repository, SessionRegistry, MessagePusher）
//! にだけ依存し、結果を `Result` で返します。ack への変換は UI 層が行います。

pub mod access;
mod binding;
pub mod error;

pub mod annotate;
pub mod create_room;
pub mod disconnect;
pub mod get_rooms;
pub mod join_room;
pub mod reconnect_room;
pub mod relay;

pub use access::{AccessDenied, RoomAccess};
pub use annotate::AnnotateUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect::DisconnectUseCase;
pub use error::{
    AnnotateError, CreateRoomError, GetRoomDetailError, JoinRoomError, ReconnectRoomError,
    RelayError,
};
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase};
pub use join_room::JoinRoomUseCase;
pub use reconnect_room::{ReconnectOutcome, ReconnectRoomUseCase};
pub use relay::RelayUseCase;
