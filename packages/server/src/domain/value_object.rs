//! 値オブジェクト
//!
//! ルームコード、接続 ID、座標などの不変な値を表現します。
//! 生成時にバリデーションを行い、不正な値がドメイン層に入り込まないようにします。

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ValueObjectError;

/// ルームコードの桁数
pub const ROOM_CODE_LENGTH: usize = 4;

/// ルームコード（4 桁の数字文字列）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// 文字列からルームコードを作成
    ///
    /// 4 桁の ASCII 数字以外はエラーになります。
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.len() != ROOM_CODE_LENGTH || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValueObjectError::InvalidRoomCode(value));
        }
        Ok(Self(value))
    }

    /// 数値からルームコードを作成（コード割り当てで使用）
    pub fn from_number(number: u16) -> Result<Self, ValueObjectError> {
        Self::new(format!("{:04}", number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// トランスポート接続の識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    /// 新しい接続 ID をランダムに生成
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConnectionId> for String {
    fn from(id: ConnectionId) -> Self {
        id.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ルーム内でのデバイスの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    /// 3D ビューを表示する側
    Display,
    /// モーション・アノテーションを送る側
    Controller,
}

impl DeviceRole {
    /// 反対側の役割
    pub fn opposite(self) -> Self {
        match self {
            DeviceRole::Display => DeviceRole::Controller,
            DeviceRole::Controller => DeviceRole::Display,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceRole::Display => "display",
            DeviceRole::Controller => "controller",
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// アノテーション ID（`{type}_{millis}` 形式）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnnotationId(pub(super) String);

impl AnnotationId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyAnnotationId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for AnnotationId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AnnotationId> for String {
    fn from(id: AnnotationId) -> Self {
        id.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix タイムスタンプ（UTC, ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 3 次元座標
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// 床面（x, z 平面）上の多角形の頂点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub z: f64,
}

impl Vertex {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// インシデントの深刻度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl TryFrom<&str> for Severity {
    type Error = ValueObjectError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(ValueObjectError::InvalidSeverity(other.to_string())),
        }
    }
}

/// 中継するだけで解釈しないモーションデータ
///
/// `tablet-movement` / `touch-movement` のペイロードを受け取ったまま display に届けます。
/// `null` や未知のフィールドもそのまま残ります。
#[derive(Debug, Clone, PartialEq)]
pub struct MotionData(Value);

impl MotionData {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_accepts_four_digits() {
        // テスト項目: 4 桁の数字はルームコードとして受け付けられる
        // given (前提条件):
        let value = "4821".to_string();

        // when (操作):
        let result = RoomCode::new(value);

        // then (期待する結果):
        assert_eq!(result.unwrap().as_str(), "4821");
    }

    #[test]
    fn test_room_code_rejects_malformed_values() {
        // テスト項目: 桁数違い・数字以外を含むコードは拒否される
        // given (前提条件):
        let candidates = ["", "123", "12345", "12a4", " 123", "１２３４"];

        for candidate in candidates {
            // when (操作):
            let result = RoomCode::new(candidate.to_string());

            // then (期待する結果):
            assert_eq!(
                result,
                Err(ValueObjectError::InvalidRoomCode(candidate.to_string()))
            );
        }
    }

    #[test]
    fn test_room_code_from_number_pads() {
        // テスト項目: 数値からのルームコード生成で 4 桁に揃えられる
        // given (前提条件):
        let number = 1000;

        // when (操作):
        let code = RoomCode::from_number(number).unwrap();

        // then (期待する結果):
        assert_eq!(code.as_str(), "1000");
        assert!(RoomCode::from_number(10000).is_err());
    }

    #[test]
    fn test_connection_id_rejects_blank() {
        // テスト項目: 空白のみの接続 ID は拒否される
        // given (前提条件):
        let value = "   ".to_string();

        // when (操作):
        let result = ConnectionId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyConnectionId));
    }

    #[test]
    fn test_connection_id_generate_is_unique() {
        // テスト項目: 生成される接続 ID は毎回異なる
        // given (前提条件):

        // when (操作):
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
    }

    #[test]
    fn test_device_role_opposite() {
        // テスト項目: 役割の反対側が正しく求まる
        assert_eq!(DeviceRole::Display.opposite(), DeviceRole::Controller);
        assert_eq!(DeviceRole::Controller.opposite(), DeviceRole::Display);
    }

    #[test]
    fn test_severity_parsing() {
        // テスト項目: 深刻度は low / medium / high のみ受け付ける
        assert_eq!(Severity::try_from("low"), Ok(Severity::Low));
        assert_eq!(Severity::try_from("high"), Ok(Severity::High));
        assert_eq!(Severity::default(), Severity::Medium);
        assert_eq!(
            Severity::try_from("critical"),
            Err(ValueObjectError::InvalidSeverity("critical".to_string()))
        );
    }
}
