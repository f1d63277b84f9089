//! UseCase: アノテーションの追加・削除・全消去
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - AnnotateUseCase の add / remove / clear
//! - 変更後にルームの全メンバー（送信元を含む）へブロードキャストされること
//!
//! ### どのような状況を想定しているか
//! - 正常系：デフォルト値の補完、追加順の維持
//! - 異常系：存在しないルーム、頂点不足の立入禁止区域
//! - エッジケース：存在しない ID の削除でも annotation-removed が送られる

use std::sync::Arc;

use beacon_shared::time::Clock;

use crate::domain::{
    Annotation, AnnotationDraft, AnnotationFactory, AnnotationId, ConnectionId, MessagePusher,
    RelayEvent, RoomCode, RoomRepository, Timestamp,
};

use super::{access::RoomAccess, error::AnnotateError};

/// アノテーション操作のユースケース
pub struct AnnotateUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    access: RoomAccess,
    clock: Arc<dyn Clock>,
}

impl AnnotateUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        access: RoomAccess,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            access,
            clock,
        }
    }

    /// アノテーションを追加してブロードキャスト
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信元の接続
    /// * `raw_code` - ペイロードに含まれるルームコード
    /// * `draft` - 省略可能な項目を含む下書き
    ///
    /// # Returns
    ///
    /// * `Ok(Annotation)` - 保存されたアノテーション
    /// * `Err(AnnotateError)` - ルームがない、下書きが不正な場合
    pub async fn add(
        &self,
        sender: &ConnectionId,
        raw_code: &str,
        draft: AnnotationDraft,
    ) -> Result<Annotation, AnnotateError> {
        let code = self.access.resolve(sender, raw_code).await?;

        let now = self.clock.now_millis();
        let annotation =
            AnnotationFactory::build(draft, Timestamp::new(now), self.clock.today_iso_date())?;
        let stored = self.repository.append_annotation(&code, annotation).await?;

        tracing::info!("Annotation '{}' added to room '{}'", stored.id, code);
        self.broadcast(&code, RelayEvent::AnnotationAdded(stored.clone()))
            .await;
        Ok(stored)
    }

    /// ID に一致するアノテーションを削除してブロードキャスト
    ///
    /// ID は比較に使うだけで検証しません。一致するものがなくても（空文字列でも）
    /// `annotation-removed` は送られます。
    pub async fn remove(
        &self,
        sender: &ConnectionId,
        raw_code: &str,
        raw_id: String,
    ) -> Result<String, AnnotateError> {
        let code = self.access.resolve(sender, raw_code).await?;

        let removed = match AnnotationId::new(raw_id.clone()) {
            Ok(id) => self.repository.remove_annotation(&code, &id).await?,
            // 保存済みのアノテーションの ID は空にならない
            Err(_) => {
                self.repository.get_room(&code).await?;
                false
            }
        };
        if !removed {
            tracing::debug!("Annotation '{}' not found in room '{}'", raw_id, code);
        }

        self.broadcast(&code, RelayEvent::AnnotationRemoved { id: raw_id.clone() })
            .await;
        Ok(raw_id)
    }

    /// 全てのアノテーションを消去してブロードキャスト
    pub async fn clear(&self, sender: &ConnectionId, raw_code: &str) -> Result<(), AnnotateError> {
        let code = self.access.resolve(sender, raw_code).await?;
        self.repository.clear_annotations(&code).await?;

        tracing::info!("Annotations cleared in room '{}'", code);
        self.broadcast(&code, RelayEvent::AnnotationsCleared).await;
        Ok(())
    }

    async fn broadcast(&self, code: &RoomCode, event: RelayEvent) {
        let members = self.access.members(code).await;
        if let Err(e) = self.message_pusher.broadcast(members, &event).await {
            tracing::warn!("Failed to broadcast '{}' to room '{}': {}", event.name(), code, e);
        }
    }
}
