//! Event router: maps a decoded client event onto its use case.
//!
//! Every event yields an [`AckPayload`]. The socket handler only sends it back
//! when the client frame carried an `ack` id; otherwise failures are just logged.

use std::fmt::Display;

use crate::{
    domain::{Annotation, AnnotationDraft, ConnectionId, MotionData, RelayEvent},
    infrastructure::dto::websocket::{AckPayload, AnnotationDto, ClientEvent, FrameError},
    ui::state::AppState,
};

const ROOM_NOT_FOUND: &str = "Room not found";

/// Handle one client event to completion
pub async fn dispatch(state: &AppState, connection: &ConnectionId, event: ClientEvent) -> AckPayload {
    match event {
        ClientEvent::CreateRoom => {
            match state.create_room_usecase.execute(connection.clone()).await {
                Ok(code) => AckPayload::room_created(code.into_string()),
                Err(e) => failed("create-room", connection, e),
            }
        }
        ClientEvent::JoinRoom(payload) => {
            let code = payload.into_code();
            match state
                .join_room_usecase
                .execute(connection.clone(), &code)
                .await
            {
                Ok(annotations) => AckPayload::joined(to_dtos(annotations), None),
                Err(e) => failed("join-room", connection, e),
            }
        }
        ClientEvent::ReconnectRoom(payload) => {
            match state
                .reconnect_room_usecase
                .execute(
                    connection.clone(),
                    &payload.room_id,
                    payload.device_type.into(),
                )
                .await
            {
                Ok(outcome) => {
                    AckPayload::joined(to_dtos(outcome.annotations), outcome.has_controller)
                }
                Err(e) => failed("reconnect-room", connection, e),
            }
        }

        // display 宛て
        ClientEvent::TabletMovement(payload) => {
            let event = RelayEvent::MovementUpdate(MotionData::new(payload.data));
            relay(state, connection, &payload.room_id, event).await
        }
        ClientEvent::TouchMovement(payload) => {
            let event = RelayEvent::TouchMovementUpdate(MotionData::new(payload.data));
            relay(state, connection, &payload.room_id, event).await
        }
        ClientEvent::ToggleFlashlight(payload) => {
            relay(state, connection, &payload.room_id, RelayEvent::FlashlightToggle).await
        }
        ClientEvent::RequestPlacement(payload) => {
            let event = RelayEvent::RequestPlacement {
                annotation_type: payload.annotation_type,
            };
            relay(state, connection, &payload.room_id, event).await
        }

        // controller 宛て
        ClientEvent::CameraPosition(payload) => {
            let event = RelayEvent::CameraPositionUpdate(payload.position.into());
            relay(state, connection, &payload.room_id, event).await
        }
        ClientEvent::PlacementPosition(payload) => {
            let event = RelayEvent::PlacementPosition {
                position: payload.position.into(),
                annotation_type: payload.annotation_type,
            };
            relay(state, connection, &payload.room_id, event).await
        }

        // ルーム全体
        ClientEvent::AddDangerZone(payload) => {
            let room_id = payload.room_id.clone();
            add_annotation(state, connection, &room_id, payload.into()).await
        }
        ClientEvent::AddArrow(payload) => {
            let room_id = payload.room_id.clone();
            add_annotation(state, connection, &room_id, payload.into()).await
        }
        ClientEvent::AddIncident(payload) => {
            let room_id = payload.room_id.clone();
            match AnnotationDraft::try_from(payload) {
                Ok(draft) => add_annotation(state, connection, &room_id, draft).await,
                Err(e) => failed("add-incident", connection, e),
            }
        }
        ClientEvent::AddRestrictedZone(payload) => {
            let room_id = payload.room_id.clone();
            add_annotation(state, connection, &room_id, payload.into()).await
        }
        ClientEvent::RemoveAnnotation(payload) => {
            match state
                .annotate_usecase
                .remove(connection, &payload.room_id, payload.annotation_id)
                .await
            {
                Ok(_) => AckPayload::ok(),
                Err(e) => failed("remove-annotation", connection, e),
            }
        }
        ClientEvent::ClearAnnotations(payload) => {
            match state
                .annotate_usecase
                .clear(connection, &payload.room_id)
                .await
            {
                Ok(()) => AckPayload::ok(),
                Err(e) => failed("clear-annotations", connection, e),
            }
        }
    }
}

/// Reply to a frame whose payload could not be decoded
///
/// A room handshake with an unusable code is answered like an unknown room.
pub fn rejected(connection: &ConnectionId, error: &FrameError) -> AckPayload {
    match error {
        FrameError::InvalidPayload { event, .. }
            if matches!(event.as_str(), "join-room" | "reconnect-room") =>
        {
            tracing::warn!("'{}' from '{}' failed: {}", event, connection, error);
            AckPayload::failed(ROOM_NOT_FOUND)
        }
        other => failed("frame", connection, other),
    }
}

async fn relay(
    state: &AppState,
    connection: &ConnectionId,
    room_id: &str,
    event: RelayEvent,
) -> AckPayload {
    let name = event.name();
    match state.relay_usecase.execute(connection, room_id, event).await {
        Ok(_) => AckPayload::ok(),
        Err(e) => failed(name, connection, e),
    }
}

async fn add_annotation(
    state: &AppState,
    connection: &ConnectionId,
    room_id: &str,
    draft: AnnotationDraft,
) -> AckPayload {
    match state.annotate_usecase.add(connection, room_id, draft).await {
        Ok(_) => AckPayload::ok(),
        Err(e) => failed("add-annotation", connection, e),
    }
}

fn failed(event: &str, connection: &ConnectionId, error: impl Display) -> AckPayload {
    tracing::warn!("'{}' from '{}' failed: {}", event, connection, error);
    AckPayload::failed(error.to_string())
}

fn to_dtos(annotations: Vec<Annotation>) -> Vec<AnnotationDto> {
    annotations.into_iter().map(Into::into).collect()
}
