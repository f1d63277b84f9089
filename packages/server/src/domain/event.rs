//! サーバーからクライアントへ送るイベント
//!
//! ワイヤ形式への変換は Infrastructure 層（DTO）が担当します。

use super::{Annotation, DeviceRole, MotionData, Position};

/// 中継・通知されるイベント
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// タブレットの姿勢と移動速度（display 宛て）
    MovementUpdate(MotionData),
    /// タッチ操作による移動（display 宛て）
    TouchMovementUpdate(MotionData),
    /// ライトの切り替え（display 宛て、ペイロードなし）
    FlashlightToggle,
    /// アノテーション追加（ルーム全体）
    AnnotationAdded(Annotation),
    /// 全アノテーション消去（ルーム全体）
    AnnotationsCleared,
    /// アノテーション削除（ルーム全体、ID はクライアントが送ったまま）
    AnnotationRemoved { id: String },
    /// display のカメラ位置（controller 宛て）
    CameraPositionUpdate(Position),
    /// 配置位置の要求（display 宛て）
    RequestPlacement { annotation_type: Option<String> },
    /// 配置位置の応答（controller 宛て）
    PlacementPosition {
        position: Position,
        annotation_type: Option<String>,
    },
    ControllerConnected,
    ControllerDisconnected,
    DisplayDisconnected,
}

impl RelayEvent {
    /// ワイヤ上のイベント名
    pub fn name(&self) -> &'static str {
        match self {
            RelayEvent::MovementUpdate(_) => "movement-update",
            RelayEvent::TouchMovementUpdate(_) => "touch-movement-update",
            RelayEvent::FlashlightToggle => "flashlight-toggle",
            RelayEvent::AnnotationAdded(_) => "annotation-added",
            RelayEvent::AnnotationsCleared => "annotations-cleared",
            RelayEvent::AnnotationRemoved { .. } => "annotation-removed",
            RelayEvent::CameraPositionUpdate(_) => "camera-position-update",
            RelayEvent::RequestPlacement { .. } => "request-placement",
            RelayEvent::PlacementPosition { .. } => "placement-position",
            RelayEvent::ControllerConnected => "controller-connected",
            RelayEvent::ControllerDisconnected => "controller-disconnected",
            RelayEvent::DisplayDisconnected => "display-disconnected",
        }
    }

    /// 特定の役割にだけ転送されるイベントの宛先
    ///
    /// ルーム全体へのブロードキャストや接続通知は `None`。
    pub fn direct_recipient(&self) -> Option<DeviceRole> {
        match self {
            RelayEvent::MovementUpdate(_)
            | RelayEvent::TouchMovementUpdate(_)
            | RelayEvent::FlashlightToggle
            | RelayEvent::RequestPlacement { .. } => Some(DeviceRole::Display),
            RelayEvent::CameraPositionUpdate(_) | RelayEvent::PlacementPosition { .. } => {
                Some(DeviceRole::Controller)
            }
            _ => None,
        }
    }
}
