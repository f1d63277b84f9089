//! Factory
//!
//! - `RoomCodeAllocator`: 衝突しないルームコードの割り当て
//! - `AnnotationFactory`: デフォルト値を補完してアノテーションを生成

use rand::Rng;

use super::{
    Annotation, AnnotationId, AnnotationShape, Position, RoomCode, Severity, Timestamp,
    ValueObjectError, Vertex,
};

/// 割り当て可能なルームコードの最小値
pub const ROOM_CODE_MIN: u16 = 1000;
/// 割り当て可能なルームコードの最大値
pub const ROOM_CODE_MAX: u16 = 9999;
/// 同時に存在できるルーム数の上限
pub const ROOM_CODE_CAPACITY: usize = (ROOM_CODE_MAX - ROOM_CODE_MIN + 1) as usize;

pub const DEFAULT_DANGER_RADIUS: f64 = 5.0;
pub const DEFAULT_DANGER_LABEL: &str = "Danger Zone";
pub const DEFAULT_ARROW_LABEL: &str = "Direction";
pub const DEFAULT_INCIDENT_DESCRIPTION: &str = "Incident reported";
pub const MIN_RESTRICTED_VERTICES: usize = 3;

/// ルームコードの割り当て
///
/// [1000, 9999] から一様に抽選し、使用中のコードに当たった場合は引き直す。
/// 空きがない場合は無限ループになるため、呼び出し側で容量を確認すること。
pub struct RoomCodeAllocator;

impl RoomCodeAllocator {
    /// スレッドローカルの乱数生成器でコードを割り当てる
    pub fn allocate(is_taken: impl Fn(&RoomCode) -> bool) -> RoomCode {
        Self::allocate_with(&mut rand::rng(), is_taken)
    }

    /// 指定の乱数生成器でコードを割り当てる
    pub fn allocate_with<R: Rng + ?Sized>(
        rng: &mut R,
        is_taken: impl Fn(&RoomCode) -> bool,
    ) -> RoomCode {
        loop {
            let number = rng.random_range(ROOM_CODE_MIN..=ROOM_CODE_MAX);
            let Ok(code) = RoomCode::from_number(number) else {
                continue;
            };
            if !is_taken(&code) {
                return code;
            }
            tracing::debug!("Room code {} already in use, drawing again", code);
        }
    }
}

/// クライアントから受け取ったアノテーションの下書き
///
/// `None` の項目は `AnnotationFactory` がデフォルト値で埋める。
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationDraft {
    Danger {
        position: Position,
        radius: Option<f64>,
        label: Option<String>,
    },
    Arrow {
        start: Position,
        end: Position,
        label: Option<String>,
    },
    Incident {
        position: Position,
        date: Option<String>,
        description: Option<String>,
        severity: Option<Severity>,
    },
    Restricted {
        points: Vec<Vertex>,
        active: Option<bool>,
    },
}

/// アノテーションの生成
pub struct AnnotationFactory;

impl AnnotationFactory {
    /// 下書きからアノテーションを生成する
    ///
    /// # Arguments
    ///
    /// * `draft` - クライアントから受け取った下書き
    /// * `created_at` - 生成時刻（ID の生成にも使用）
    /// * `today` - インシデントの日付のデフォルト値（`YYYY-MM-DD`）
    pub fn build(
        draft: AnnotationDraft,
        created_at: Timestamp,
        today: String,
    ) -> Result<Annotation, ValueObjectError> {
        let shape = match draft {
            AnnotationDraft::Danger {
                position,
                radius,
                label,
            } => AnnotationShape::Danger {
                position,
                radius: radius_or_default(radius),
                label: text_or_default(label, DEFAULT_DANGER_LABEL),
            },
            AnnotationDraft::Arrow { start, end, label } => AnnotationShape::Arrow {
                start,
                end,
                label: text_or_default(label, DEFAULT_ARROW_LABEL),
            },
            AnnotationDraft::Incident {
                position,
                date,
                description,
                severity,
            } => AnnotationShape::Incident {
                position,
                date: text_or_default(date, &today),
                description: text_or_default(description, DEFAULT_INCIDENT_DESCRIPTION),
                severity: severity.unwrap_or_default(),
            },
            AnnotationDraft::Restricted { points, active } => {
                if points.len() < MIN_RESTRICTED_VERTICES {
                    return Err(ValueObjectError::TooFewVertices(points.len()));
                }
                AnnotationShape::Restricted {
                    points,
                    active: active.unwrap_or(true),
                }
            }
        };

        Ok(Annotation {
            id: AnnotationIdFactory::generate(shape.kind(), created_at),
            created_at,
            shape,
        })
    }
}

/// 空文字列もデフォルト値に置き換える
fn text_or_default(value: Option<String>, default: &str) -> String {
    match value {
        Some(text) if !text.is_empty() => text,
        _ => default.to_string(),
    }
}

/// 0 と NaN もデフォルト値に置き換える
fn radius_or_default(value: Option<f64>) -> f64 {
    match value {
        Some(radius) if radius != 0.0 && !radius.is_nan() => radius,
        _ => DEFAULT_DANGER_RADIUS,
    }
}

/// アノテーション ID の生成
pub struct AnnotationIdFactory;

impl AnnotationIdFactory {
    /// `{kind}_{millis}` 形式の ID を生成
    ///
    /// 同じ種類が同一ミリ秒に生成されると衝突する。
    pub fn generate(kind: &str, created_at: Timestamp) -> AnnotationId {
        AnnotationId(format!("{}_{}", kind, created_at.value()))
    }

    /// `base` が既に使われていれば `_1`, `_2`, ... を付与して一意にする
    pub fn unique_within(
        base: AnnotationId,
        is_taken: impl Fn(&AnnotationId) -> bool,
    ) -> AnnotationId {
        if !is_taken(&base) {
            return base;
        }
        let mut suffix = 1u32;
        loop {
            let candidate = AnnotationId(format!("{}_{}", base.as_str(), suffix));
            if !is_taken(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
