//! 接続の束縛の付け替え

use crate::domain::{ConnectionId, DeviceRole, RoomRepository, SessionBinding, SessionRegistry};

/// 接続を束縛し、置き換えられた以前の束縛のスロットを解放する
///
/// 1 接続につき束縛は 1 つなので、別のルーム・役割に束縛し直した接続が
/// 以前のスロットを占有し続けないようにします。
pub(crate) async fn bind_session(
    repository: &dyn RoomRepository,
    registry: &dyn SessionRegistry,
    connection: &ConnectionId,
    binding: SessionBinding,
) {
    let Some(previous) = registry.bind(connection.clone(), binding.clone()).await else {
        return;
    };
    if previous == binding {
        return;
    }

    let released = match previous.role {
        DeviceRole::Display => repository.unbind_display(&previous.code, connection).await,
        DeviceRole::Controller => {
            repository
                .unbind_controller(&previous.code, connection)
                .await
        }
    };
    match released {
        Ok(true) => tracing::debug!(
            "Connection '{}' released {} slot of room '{}'",
            connection,
            previous.role,
            previous.code
        ),
        Ok(false) => {}
        Err(e) => tracing::warn!(
            "Failed to release previous binding of '{}': {}",
            connection,
            e
        ),
    }
}
