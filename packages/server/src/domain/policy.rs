//! ルームへのアクセス可否の判定
//!
//! 受信イベントはペイロード内のルームコードで宛先が決まります。
//! どこまで信用するかをポリシーとして差し替えられるようにしています。

use std::fmt::Debug;

use super::{RoomCode, SessionBinding};

/// アクセスポリシー
pub trait RoomAccessPolicy: Send + Sync + Debug {
    /// `binding` を持つ接続が `target` 宛てのイベントを送ってよいか
    fn authorize(&self, binding: Option<&SessionBinding>, target: &RoomCode) -> bool;
}

/// ペイロードのルームコードをそのまま信用する
///
/// コードを推測できれば他のルームにもイベントを送れてしまう。
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustPayloadPolicy;

impl RoomAccessPolicy for TrustPayloadPolicy {
    fn authorize(&self, _binding: Option<&SessionBinding>, _target: &RoomCode) -> bool {
        true
    }
}

/// 接続が束縛されているルーム宛てのイベントのみ許可する
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundRoomPolicy;

impl RoomAccessPolicy for BoundRoomPolicy {
    fn authorize(&self, binding: Option<&SessionBinding>, target: &RoomCode) -> bool {
        binding.is_some_and(|binding| &binding.code == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeviceRole;

    fn code(value: &str) -> RoomCode {
        RoomCode::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_trust_payload_allows_unbound_connection() {
        // テスト項目: TrustPayloadPolicy は束縛のない接続も許可する
        // given (前提条件):
        let policy = TrustPayloadPolicy;

        // when (操作):
        let allowed = policy.authorize(None, &code("4821"));

        // then (期待する結果):
        assert!(allowed);
    }

    #[test]
    fn test_bound_room_rejects_other_room() {
        // テスト項目: BoundRoomPolicy は別ルーム宛て・未束縛を拒否する
        // given (前提条件):
        let policy = BoundRoomPolicy;
        let binding = SessionBinding::new(code("4821"), DeviceRole::Controller);

        // when (操作):
        let same = policy.authorize(Some(&binding), &code("4821"));
        let other = policy.authorize(Some(&binding), &code("1234"));
        let unbound = policy.authorize(None, &code("4821"));

        // then (期待する結果):
        assert!(same);
        assert!(!other);
        assert!(!unbound);
    }
}
