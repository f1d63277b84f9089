//! 永続化レコードの DTO
//!
//! ```text
//! <data_dir>/rooms/<code>.json → RoomRecord (DTO) → Room (ドメインモデル)
//! ```

use serde::{Deserialize, Serialize};

use super::websocket::AnnotationDto;

/// ルーム 1 件分のレコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub code: String,
    #[serde(default)]
    pub display_connection: Option<String>,
    #[serde(default)]
    pub controller_connection: Option<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationDto>,
    /// RFC 3339
    pub created_at: String,
}
