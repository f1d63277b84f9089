//! ルームへのアクセス判定とメンバー解決
//!
//! 受信イベントはペイロードのルームコードで宛先を指定します。
//! `RoomAccessPolicy` に接続の束縛を渡して、そのコードへの送信を許可するかを決めます。

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomAccessPolicy, RoomCode, SessionRegistry};

/// 送信元の接続とペイロードのルームコードを突き合わせる
#[derive(Clone)]
pub struct RoomAccess {
    registry: Arc<dyn SessionRegistry>,
    policy: Arc<dyn RoomAccessPolicy>,
}

impl RoomAccess {
    pub fn new(registry: Arc<dyn SessionRegistry>, policy: Arc<dyn RoomAccessPolicy>) -> Self {
        Self { registry, policy }
    }

    /// 文字列のコードを解釈し、送信元がそのルームに送ってよいかを判定する
    ///
    /// # Returns
    ///
    /// * `Ok(RoomCode)` - 許可されたルームコード
    /// * `Err(AccessDenied)` - コードが不正、またはポリシーにより拒否
    pub async fn resolve(
        &self,
        connection: &ConnectionId,
        raw_code: &str,
    ) -> Result<RoomCode, AccessDenied> {
        let code = RoomCode::new(raw_code.to_string())
            .map_err(|_| AccessDenied::MalformedCode(raw_code.to_string()))?;

        let binding = self.registry.binding_of(connection).await;
        if !self.policy.authorize(binding.as_ref(), &code) {
            tracing::warn!(
                "Connection '{}' is not allowed to send to room '{}' ({:?})",
                connection,
                code,
                self.policy
            );
            return Err(AccessDenied::Forbidden(code));
        }
        Ok(code)
    }

    /// ルームに束縛されている全ての接続
    pub async fn members(&self, code: &RoomCode) -> Vec<ConnectionId> {
        self.registry.members(code).await
    }
}

/// アクセスが拒否された理由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    MalformedCode(String),
    Forbidden(RoomCode),
}
