//! WebSocket message DTOs.
//!
//! Every text frame is a JSON object:
//!
//! ```text
//! client -> server: {"event": "join-room", "data": {"roomCode": "4821"}, "ack": 3}
//! server -> client: {"event": "ack", "ack": 3, "data": {"success": true, "annotations": []}}
//! server -> client: {"event": "annotation-added", "data": {...}}
//! ```

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

// ========================================
// Shared shapes
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionDto {
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexDto {
    pub x: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceTypeDto {
    Display,
    Controller,
}

/// Annotation as sent on the wire and stored in room records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationDto {
    pub id: String,
    #[serde(flatten)]
    pub shape: AnnotationShapeDto,
    /// RFC 3339
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnnotationShapeDto {
    Danger {
        position: PositionDto,
        radius: f64,
        label: String,
    },
    Arrow {
        start: PositionDto,
        end: PositionDto,
        label: String,
    },
    Incident {
        position: PositionDto,
        date: String,
        description: String,
        severity: String,
    },
    Restricted {
        points: Vec<VertexDto>,
        active: bool,
    },
}

// ========================================
// Client -> Server
// ========================================

/// Raw inbound frame before the payload is interpreted
#[derive(Debug, Deserialize)]
pub struct InboundFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub ack: Option<u64>,
}

impl InboundFrame {
    /// Decode the envelope of a text frame
    ///
    /// The payload is interpreted separately by [`InboundFrame::into_event`], so the
    /// `ack` id is still known when the payload turns out to be invalid.
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        serde_json::from_str(text).map_err(FrameError::Malformed)
    }

    pub fn into_event(self) -> Result<ClientEvent, FrameError> {
        ClientEvent::parse(&self.event, self.data)
    }
}

/// Errors raised while decoding an inbound frame
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Malformed frame: {0}")]
    Malformed(serde_json::Error),

    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: String,
        source: serde_json::Error,
    },
}

/// `join-room` accepts either a bare code string or `{"roomCode": "..."}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum JoinRoomPayload {
    Code(String),
    Object {
        #[serde(rename = "roomCode", alias = "roomId")]
        room_code: String,
    },
}

impl JoinRoomPayload {
    pub fn into_code(self) -> String {
        match self {
            JoinRoomPayload::Code(code) => code,
            JoinRoomPayload::Object { room_code } => room_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectRoomPayload {
    pub room_id: String,
    pub device_type: DeviceTypeDto,
}

/// Payload carrying only the target room
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub room_id: String,
}

/// Motion payload relayed to the display exactly as received
///
/// Only `roomId` is read; `data` keeps every field, including `null`s.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardedPayload {
    pub room_id: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDangerZonePayload {
    pub room_id: String,
    pub position: PositionDto,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddArrowPayload {
    pub room_id: String,
    pub start: PositionDto,
    pub end: PositionDto,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddIncidentPayload {
    pub room_id: String,
    pub position: PositionDto,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRestrictedZonePayload {
    pub room_id: String,
    pub points: Vec<VertexDto>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAnnotationPayload {
    pub room_id: String,
    pub annotation_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPositionPayload {
    pub room_id: String,
    pub position: PositionDto,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPlacementPayload {
    pub room_id: String,
    #[serde(default)]
    pub annotation_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementPositionPayload {
    pub room_id: String,
    pub position: PositionDto,
    #[serde(default)]
    pub annotation_type: Option<String>,
}

/// Decoded client event
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    CreateRoom,
    JoinRoom(JoinRoomPayload),
    ReconnectRoom(ReconnectRoomPayload),
    TabletMovement(ForwardedPayload),
    TouchMovement(ForwardedPayload),
    ToggleFlashlight(RoomPayload),
    AddDangerZone(AddDangerZonePayload),
    AddArrow(AddArrowPayload),
    AddIncident(AddIncidentPayload),
    AddRestrictedZone(AddRestrictedZonePayload),
    ClearAnnotations(RoomPayload),
    RemoveAnnotation(RemoveAnnotationPayload),
    CameraPosition(CameraPositionPayload),
    RequestPlacement(RequestPlacementPayload),
    PlacementPosition(PlacementPositionPayload),
}

impl ClientEvent {
    /// Interpret `data` according to the event name
    pub fn parse(event: &str, data: Value) -> Result<Self, FrameError> {
        fn payload<T: DeserializeOwned>(event: &str, data: Value) -> Result<T, FrameError> {
            serde_json::from_value(data).map_err(|source| FrameError::InvalidPayload {
                event: event.to_string(),
                source,
            })
        }

        fn forwarded(event: &str, data: Value) -> Result<ForwardedPayload, FrameError> {
            let RoomPayload { room_id } = payload(event, data.clone())?;
            Ok(ForwardedPayload { room_id, data })
        }

        match event {
            "create-room" => Ok(ClientEvent::CreateRoom),
            "join-room" => payload(event, data).map(ClientEvent::JoinRoom),
            "reconnect-room" => payload(event, data).map(ClientEvent::ReconnectRoom),
            "tablet-movement" => forwarded(event, data).map(ClientEvent::TabletMovement),
            "touch-movement" => forwarded(event, data).map(ClientEvent::TouchMovement),
            "toggle-flashlight" => payload(event, data).map(ClientEvent::ToggleFlashlight),
            "add-danger-zone" => payload(event, data).map(ClientEvent::AddDangerZone),
            "add-arrow" => payload(event, data).map(ClientEvent::AddArrow),
            "add-incident" => payload(event, data).map(ClientEvent::AddIncident),
            "add-restricted-zone" => payload(event, data).map(ClientEvent::AddRestrictedZone),
            "clear-annotations" => payload(event, data).map(ClientEvent::ClearAnnotations),
            "remove-annotation" => payload(event, data).map(ClientEvent::RemoveAnnotation),
            "camera-position" => payload(event, data).map(ClientEvent::CameraPosition),
            "request-placement" => payload(event, data).map(ClientEvent::RequestPlacement),
            "placement-position" => payload(event, data).map(ClientEvent::PlacementPosition),
            other => Err(FrameError::UnknownEvent(other.to_string())),
        }
    }
}

// ========================================
// Server -> Client
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRemovedDto {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPlacementDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementPositionDto {
    pub position: PositionDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_type: Option<String>,
}

/// Event pushed from the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    MovementUpdate(Value),
    TouchMovementUpdate(Value),
    FlashlightToggle,
    AnnotationAdded(AnnotationDto),
    AnnotationsCleared,
    AnnotationRemoved(AnnotationRemovedDto),
    CameraPositionUpdate(PositionDto),
    RequestPlacement(RequestPlacementDto),
    PlacementPosition(PlacementPositionDto),
    ControllerConnected,
    ControllerDisconnected,
    DisplayDisconnected,
}

/// Acknowledgement payload for `create-room`, `join-room` and `reconnect-room`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckPayload {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<AnnotationDto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_controller: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckPayload {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn room_created(room_code: String) -> Self {
        Self {
            success: true,
            room_code: Some(room_code),
            ..Self::default()
        }
    }

    pub fn joined(annotations: Vec<AnnotationDto>, has_controller: Option<bool>) -> Self {
        Self {
            success: true,
            annotations: Some(annotations),
            has_controller,
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Reply frame answering a client frame that carried `ack`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckFrame {
    pub event: String,
    pub ack: u64,
    pub data: AckPayload,
}

impl AckFrame {
    pub fn new(ack: u64, data: AckPayload) -> Self {
        Self {
            event: "ack".to_string(),
            ack,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_frame(text: &str) -> Result<(Option<u64>, ClientEvent), FrameError> {
        let frame = InboundFrame::decode(text)?;
        let ack = frame.ack;
        Ok((ack, frame.into_event()?))
    }

    #[test]
    fn test_parse_create_room_without_data() {
        // テスト項目: data のない create-room が解釈される
        // given (前提条件):
        let text = r#"{"event":"create-room","ack":1}"#;

        // when (操作):
        let (ack, event) = parse_frame(text).unwrap();

        // then (期待する結果):
        assert_eq!(ack, Some(1));
        assert_eq!(event, ClientEvent::CreateRoom);
    }

    #[test]
    fn test_parse_join_room_accepts_bare_code_and_object() {
        // テスト項目: join-room は文字列とオブジェクトの両方を受け付ける
        // given (前提条件):
        let bare = r#"{"event":"join-room","data":"4821","ack":2}"#;
        let object = r#"{"event":"join-room","data":{"roomCode":"4821"}}"#;

        // when (操作):
        let (_, bare_event) = parse_frame(bare).unwrap();
        let (ack, object_event) = parse_frame(object).unwrap();

        // then (期待する結果):
        let ClientEvent::JoinRoom(bare_payload) = bare_event else {
            panic!("expected join-room");
        };
        let ClientEvent::JoinRoom(object_payload) = object_event else {
            panic!("expected join-room");
        };
        assert_eq!(bare_payload.into_code(), "4821");
        assert_eq!(object_payload.into_code(), "4821");
        assert_eq!(ack, None);
    }

    #[test]
    fn test_parse_add_danger_zone_optional_fields() {
        // テスト項目: add-danger-zone の radius / label は省略できる
        // given (前提条件):
        let text = r#"{"event":"add-danger-zone","data":{"roomId":"4821","position":{"x":1,"y":0,"z":2}}}"#;

        // when (操作):
        let (_, event) = parse_frame(text).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::AddDangerZone(AddDangerZonePayload {
                room_id: "4821".to_string(),
                position: PositionDto {
                    x: 1.0,
                    y: 0.0,
                    z: 2.0
                },
                radius: None,
                label: None,
            })
        );
    }

    #[test]
    fn test_parse_touch_movement_keeps_payload() {
        // テスト項目: touch-movement のペイロードは受け取ったまま保持される
        // given (前提条件):
        let text = r#"{"event":"touch-movement","data":{"roomId":"4821","movement":{"forward":1,"right":0,"lookX":0.5,"lookY":-0.5},"isRunning":true}}"#;

        // when (操作):
        let (_, event) = parse_frame(text).unwrap();

        // then (期待する結果):
        let ClientEvent::TouchMovement(payload) = event else {
            panic!("expected touch-movement");
        };
        assert_eq!(payload.room_id, "4821");
        assert_eq!(payload.data["movement"]["lookX"], json!(0.5));
        assert_eq!(payload.data["isRunning"], json!(true));
    }

    #[test]
    fn test_parse_tablet_movement_with_null_rotation() {
        // テスト項目: alpha が null でも tablet-movement は受け付けられ、null のまま保持される
        // given (前提条件):
        let data = json!({
            "roomId": "4821",
            "rotation": {"alpha": null, "beta": 1, "gamma": 2},
            "speed": 0.5,
            "heading": "north"
        });
        let text = json!({"event": "tablet-movement", "data": data}).to_string();

        // when (操作):
        let (_, event) = parse_frame(&text).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            ClientEvent::TabletMovement(ForwardedPayload {
                room_id: "4821".to_string(),
                data,
            })
        );
    }

    #[test]
    fn test_invalid_payload_keeps_ack_id() {
        // テスト項目: ペイロードが不正でもフレームの ack ID は取得できる
        // given (前提条件):
        let text = r#"{"event":"join-room","data":{"roomCode":4821},"ack":7}"#;

        // when (操作):
        let frame = InboundFrame::decode(text).unwrap();
        let ack = frame.ack;
        let result = frame.into_event();

        // then (期待する結果):
        assert_eq!(ack, Some(7));
        assert!(matches!(
            result,
            Err(FrameError::InvalidPayload { event, .. }) if event == "join-room"
        ));
    }

    #[test]
    fn test_parse_unknown_event() {
        // テスト項目: 未知のイベント名はエラーになる
        // given (前提条件):
        let text = r#"{"event":"self-destruct","data":{}}"#;

        // when (操作):
        let result = parse_frame(text);

        // then (期待する結果):
        assert!(matches!(result, Err(FrameError::UnknownEvent(name)) if name == "self-destruct"));
    }

    #[test]
    fn test_parse_invalid_payload() {
        // テスト項目: ペイロードの形式が不正な場合はエラーになる
        // given (前提条件):
        let text = r#"{"event":"remove-annotation","data":{"roomId":"4821"}}"#;

        // when (操作):
        let result = parse_frame(text);

        // then (期待する結果):
        assert!(matches!(result, Err(FrameError::InvalidPayload { .. })));
    }

    #[test]
    fn test_parse_malformed_json() {
        // テスト項目: JSON でないフレームはエラーになる
        assert!(matches!(
            parse_frame("hello"),
            Err(FrameError::Malformed(_))
        ));
    }

    #[test]
    fn test_server_message_unit_variant_has_no_data() {
        // テスト項目: ペイロードのないイベントは event のみでシリアライズされる
        // given (前提条件):
        let message = ServerMessage::FlashlightToggle;

        // when (操作):
        let value = serde_json::to_value(&message).unwrap();

        // then (期待する結果):
        assert_eq!(value, json!({"event": "flashlight-toggle"}));
    }

    #[test]
    fn test_annotation_dto_wire_shape() {
        // テスト項目: アノテーションは type タグ付きのフラットな JSON になる
        // given (前提条件):
        let dto = AnnotationDto {
            id: "arrow_1700000000000".to_string(),
            shape: AnnotationShapeDto::Arrow {
                start: PositionDto {
                    x: 0.0,
                    y: 0.0,
                    z: 0.0,
                },
                end: PositionDto {
                    x: 0.0,
                    y: 0.0,
                    z: -10.0,
                },
                label: "Exit".to_string(),
            },
            created_at: "2023-11-14T22:13:20.000Z".to_string(),
        };

        // when (操作):
        let value = serde_json::to_value(&dto).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "id": "arrow_1700000000000",
                "type": "arrow",
                "start": {"x": 0.0, "y": 0.0, "z": 0.0},
                "end": {"x": 0.0, "y": 0.0, "z": -10.0},
                "label": "Exit",
                "createdAt": "2023-11-14T22:13:20.000Z"
            })
        );
    }

    #[test]
    fn test_ack_failure_shape() {
        // テスト項目: 失敗時の ack は success と error のみを含む
        // given (前提条件):
        let frame = AckFrame::new(5, AckPayload::failed("Room not found"));

        // when (操作):
        let value = serde_json::to_value(&frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({
                "event": "ack",
                "ack": 5,
                "data": {"success": false, "error": "Room not found"}
            })
        );
    }
}
