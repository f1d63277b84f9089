//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use super::websocket::AnnotationDto;

/// Room summary for `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub code: String,
    pub has_display: bool,
    pub has_controller: bool,
    pub annotation_count: usize,
    pub created_at: String,
}

/// Room detail for `GET /api/rooms/{code}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub code: String,
    pub display_connection: Option<String>,
    pub controller_connection: Option<String>,
    pub annotations: Vec<AnnotationDto>,
    pub created_at: String,
}
