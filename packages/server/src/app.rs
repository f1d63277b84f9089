//! Wiring of the relay from its configuration.

use std::sync::Arc;

use beacon_shared::time::{Clock, SystemClock};

use crate::{
    domain::{MessagePusher, PersistenceError, RoomPersistence, RoomRepository, SessionRegistry},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        persistence::{JsonFileRoomPersistence, NoopRoomPersistence},
        repository::{IdCollisionPolicy, InMemoryRoomRepository},
        session::InMemorySessionRegistry,
    },
    ui::{Server, ServerConfig, state::AppState},
    usecase::{
        AnnotateUseCase, CreateRoomUseCase, DisconnectUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, JoinRoomUseCase, ReconnectRoomUseCase, RelayUseCase, RoomAccess,
    },
};

/// Build the application state
///
/// Persisted rooms are restored (with empty slots) before the state is returned.
pub async fn build_state(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> Result<AppState, PersistenceError> {
    // Initialize dependencies in order:
    // 1. Persistence
    // 2. Repository
    // 3. MessagePusher / SessionRegistry
    // 4. UseCases

    // 1. Persistence
    let persistence: Arc<dyn RoomPersistence> = match &config.data_dir {
        Some(dir) => {
            tracing::info!("Persisting rooms under {}", dir.display());
            Arc::new(JsonFileRoomPersistence::new(dir))
        }
        None => {
            tracing::warn!("No data directory configured, rooms will not be persisted");
            Arc::new(NoopRoomPersistence)
        }
    };

    // 2. Repository
    let id_policy = if config.unique_annotation_ids {
        IdCollisionPolicy::Suffix
    } else {
        IdCollisionPolicy::Allow
    };
    let inmemory = InMemoryRoomRepository::new(persistence).with_id_policy(id_policy);
    inmemory.restore_persisted().await?;
    let repository: Arc<dyn RoomRepository> = Arc::new(inmemory);

    // 3. MessagePusher / SessionRegistry
    let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::default());
    let registry: Arc<dyn SessionRegistry> = Arc::new(InMemorySessionRegistry::new());
    let access = RoomAccess::new(registry.clone(), config.access_policy.build());

    // 4. UseCases
    Ok(AppState {
        message_pusher: message_pusher.clone(),
        create_room_usecase: Arc::new(CreateRoomUseCase::new(
            repository.clone(),
            registry.clone(),
            clock.clone(),
        )),
        join_room_usecase: Arc::new(
            JoinRoomUseCase::new(repository.clone(), registry.clone(), message_pusher.clone())
                .with_exclusive_controller(config.exclusive_controller),
        ),
        reconnect_room_usecase: Arc::new(ReconnectRoomUseCase::new(
            repository.clone(),
            registry.clone(),
            message_pusher.clone(),
        )),
        disconnect_usecase: Arc::new(DisconnectUseCase::new(
            repository.clone(),
            registry,
            message_pusher.clone(),
        )),
        relay_usecase: Arc::new(RelayUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            access.clone(),
        )),
        annotate_usecase: Arc::new(AnnotateUseCase::new(
            repository.clone(),
            message_pusher,
            access,
            clock,
        )),
        get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
        get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository)),
    })
}

/// Build a server from its configuration using the system clock
pub async fn build_server(config: &ServerConfig) -> Result<Server, PersistenceError> {
    let state = build_state(config, Arc::new(SystemClock)).await?;
    Ok(Server::new(state, config.static_dir.clone()))
}
