//! Conversion logic between DTOs and domain entities.

use beacon_shared::time::{rfc3339_to_timestamp, timestamp_to_rfc3339};
use thiserror::Error;

use crate::domain::{
    Annotation, AnnotationDraft, AnnotationId, AnnotationShape, ConnectionId, DeviceRole,
    Position, RelayEvent, Room, RoomCode, Severity, Timestamp, ValueObjectError, Vertex,
};
use crate::infrastructure::dto::{
    http::{RoomDetailDto, RoomSummaryDto},
    persistence::RoomRecord,
    websocket as dto,
};

/// Errors raised when a DTO cannot be turned into a domain value
#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),

    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

// ========================================
// Shapes
// ========================================

impl From<dto::PositionDto> for Position {
    fn from(dto: dto::PositionDto) -> Self {
        Position::new(dto.x, dto.y, dto.z)
    }
}

impl From<Position> for dto::PositionDto {
    fn from(model: Position) -> Self {
        Self {
            x: model.x,
            y: model.y,
            z: model.z,
        }
    }
}

impl From<dto::VertexDto> for Vertex {
    fn from(dto: dto::VertexDto) -> Self {
        Vertex::new(dto.x, dto.z)
    }
}

impl From<Vertex> for dto::VertexDto {
    fn from(model: Vertex) -> Self {
        Self {
            x: model.x,
            z: model.z,
        }
    }
}

impl From<dto::DeviceTypeDto> for DeviceRole {
    fn from(dto: dto::DeviceTypeDto) -> Self {
        match dto {
            dto::DeviceTypeDto::Display => DeviceRole::Display,
            dto::DeviceTypeDto::Controller => DeviceRole::Controller,
        }
    }
}

// ========================================
// Annotation
// ========================================

impl From<Annotation> for dto::AnnotationDto {
    fn from(model: Annotation) -> Self {
        let shape = match model.shape {
            AnnotationShape::Danger {
                position,
                radius,
                label,
            } => dto::AnnotationShapeDto::Danger {
                position: position.into(),
                radius,
                label,
            },
            AnnotationShape::Arrow { start, end, label } => dto::AnnotationShapeDto::Arrow {
                start: start.into(),
                end: end.into(),
                label,
            },
            AnnotationShape::Incident {
                position,
                date,
                description,
                severity,
            } => dto::AnnotationShapeDto::Incident {
                position: position.into(),
                date,
                description,
                severity: severity.as_str().to_string(),
            },
            AnnotationShape::Restricted { points, active } => dto::AnnotationShapeDto::Restricted {
                points: points.into_iter().map(Into::into).collect(),
                active,
            },
        };

        Self {
            id: model.id.into_string(),
            shape,
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl TryFrom<dto::AnnotationDto> for Annotation {
    type Error = ConversionError;

    fn try_from(dto: dto::AnnotationDto) -> Result<Self, Self::Error> {
        let created_at = rfc3339_to_timestamp(&dto.created_at)
            .ok_or_else(|| ConversionError::InvalidTimestamp(dto.created_at.clone()))?;

        let shape = match dto.shape {
            dto::AnnotationShapeDto::Danger {
                position,
                radius,
                label,
            } => AnnotationShape::Danger {
                position: position.into(),
                radius,
                label,
            },
            dto::AnnotationShapeDto::Arrow { start, end, label } => AnnotationShape::Arrow {
                start: start.into(),
                end: end.into(),
                label,
            },
            dto::AnnotationShapeDto::Incident {
                position,
                date,
                description,
                severity,
            } => AnnotationShape::Incident {
                position: position.into(),
                date,
                description,
                severity: Severity::try_from(severity.as_str())?,
            },
            dto::AnnotationShapeDto::Restricted { points, active } => AnnotationShape::Restricted {
                points: points.into_iter().map(Into::into).collect(),
                active,
            },
        };

        Ok(Annotation {
            id: AnnotationId::new(dto.id)?,
            created_at: Timestamp::new(created_at),
            shape,
        })
    }
}

// ========================================
// Inbound payload → AnnotationDraft
// ========================================

impl From<dto::AddDangerZonePayload> for AnnotationDraft {
    fn from(payload: dto::AddDangerZonePayload) -> Self {
        AnnotationDraft::Danger {
            position: payload.position.into(),
            radius: payload.radius,
            label: payload.label,
        }
    }
}

impl From<dto::AddArrowPayload> for AnnotationDraft {
    fn from(payload: dto::AddArrowPayload) -> Self {
        AnnotationDraft::Arrow {
            start: payload.start.into(),
            end: payload.end.into(),
            label: payload.label,
        }
    }
}

impl TryFrom<dto::AddIncidentPayload> for AnnotationDraft {
    type Error = ConversionError;

    fn try_from(payload: dto::AddIncidentPayload) -> Result<Self, Self::Error> {
        let severity = match payload.severity.as_deref() {
            None | Some("") => None,
            Some(value) => Some(Severity::try_from(value)?),
        };
        Ok(AnnotationDraft::Incident {
            position: payload.position.into(),
            date: payload.date,
            description: payload.description,
            severity,
        })
    }
}

impl From<dto::AddRestrictedZonePayload> for AnnotationDraft {
    fn from(payload: dto::AddRestrictedZonePayload) -> Self {
        AnnotationDraft::Restricted {
            points: payload.points.into_iter().map(Into::into).collect(),
            active: payload.active,
        }
    }
}

// ========================================
// RelayEvent → ServerMessage
// ========================================

impl From<RelayEvent> for dto::ServerMessage {
    fn from(event: RelayEvent) -> Self {
        match event {
            RelayEvent::MovementUpdate(motion) => {
                dto::ServerMessage::MovementUpdate(motion.into_value())
            }
            RelayEvent::TouchMovementUpdate(motion) => {
                dto::ServerMessage::TouchMovementUpdate(motion.into_value())
            }
            RelayEvent::FlashlightToggle => dto::ServerMessage::FlashlightToggle,
            RelayEvent::AnnotationAdded(annotation) => {
                dto::ServerMessage::AnnotationAdded(annotation.into())
            }
            RelayEvent::AnnotationsCleared => dto::ServerMessage::AnnotationsCleared,
            RelayEvent::AnnotationRemoved { id } => {
                dto::ServerMessage::AnnotationRemoved(dto::AnnotationRemovedDto { id })
            }
            RelayEvent::CameraPositionUpdate(position) => {
                dto::ServerMessage::CameraPositionUpdate(position.into())
            }
            RelayEvent::RequestPlacement { annotation_type } => {
                dto::ServerMessage::RequestPlacement(dto::RequestPlacementDto { annotation_type })
            }
            RelayEvent::PlacementPosition {
                position,
                annotation_type,
            } => dto::ServerMessage::PlacementPosition(dto::PlacementPositionDto {
                position: position.into(),
                annotation_type,
            }),
            RelayEvent::ControllerConnected => dto::ServerMessage::ControllerConnected,
            RelayEvent::ControllerDisconnected => dto::ServerMessage::ControllerDisconnected,
            RelayEvent::DisplayDisconnected => dto::ServerMessage::DisplayDisconnected,
        }
    }
}

// ========================================
// Room ↔ RoomRecord / HTTP DTOs
// ========================================

impl From<Room> for RoomRecord {
    fn from(model: Room) -> Self {
        Self {
            code: model.code.into_string(),
            display_connection: model.display.map(ConnectionId::into_string),
            controller_connection: model.controller.map(ConnectionId::into_string),
            annotations: model.annotations.into_iter().map(Into::into).collect(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl TryFrom<RoomRecord> for Room {
    type Error = ConversionError;

    fn try_from(record: RoomRecord) -> Result<Self, Self::Error> {
        let created_at = rfc3339_to_timestamp(&record.created_at)
            .ok_or_else(|| ConversionError::InvalidTimestamp(record.created_at.clone()))?;

        Ok(Room {
            code: RoomCode::new(record.code)?,
            display: record.display_connection.map(ConnectionId::new).transpose()?,
            controller: record
                .controller_connection
                .map(ConnectionId::new)
                .transpose()?,
            annotations: record
                .annotations
                .into_iter()
                .map(Annotation::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            created_at: Timestamp::new(created_at),
        })
    }
}

impl From<&Room> for RoomSummaryDto {
    fn from(model: &Room) -> Self {
        Self {
            code: model.code.as_str().to_string(),
            has_display: model.has_display(),
            has_controller: model.has_controller(),
            annotation_count: model.annotations.len(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}

impl From<Room> for RoomDetailDto {
    fn from(model: Room) -> Self {
        Self {
            code: model.code.into_string(),
            display_connection: model.display.map(ConnectionId::into_string),
            controller_connection: model.controller.map(ConnectionId::into_string),
            annotations: model.annotations.into_iter().map(Into::into).collect(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
        }
    }
}
