//! Shared application state.

use std::sync::Arc;

use crate::{
    domain::MessagePusher,
    usecase::{
        AnnotateUseCase, CreateRoomUseCase, DisconnectUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, JoinRoomUseCase, ReconnectRoomUseCase, RelayUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// MessagePusher（接続ごとの送信チャンネルの登録先）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub reconnect_room_usecase: Arc<ReconnectRoomUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub relay_usecase: Arc<RelayUseCase>,
    pub annotate_usecase: Arc<AnnotateUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}
