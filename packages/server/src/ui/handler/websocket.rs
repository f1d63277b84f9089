//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{Stream, StreamExt},
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{ConnectionId, PusherChannel},
    infrastructure::dto::websocket::{AckFrame, AckPayload, InboundFrame},
    ui::state::AppState,
};

use super::dispatch::{dispatch, rejected};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// Relayed events and ack replies for this connection both flow through `rx`,
/// so they reach the client in the order they were produced.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Wait for the next client frame
///
/// Returns `None` once the stream ends or `stop` fires. `stop` is only observed
/// here, so an event that is already being dispatched always runs to completion.
async fn next_frame<S>(
    receiver: &mut S,
    stop: &mut oneshot::Receiver<()>,
) -> Option<Result<Message, axum::Error>>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    tokio::select! {
        msg = receiver.next() => msg,
        _ = stop => None,
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();

    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_client(connection.clone(), tx.clone())
        .await;
    tracing::info!("Connection '{}' opened", connection);

    let connection_for_recv = connection.clone();
    let state_for_recv = state.clone();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        let connection = connection_for_recv;
        let state = state_for_recv;
        let ack_sender: PusherChannel = tx;

        loop {
            let msg = match next_frame(&mut receiver, &mut stop_rx).await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    tracing::error!("WebSocket error on '{}': {}", connection, e);
                    break;
                }
                None => break,
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", connection, text);

                    let frame = match InboundFrame::decode(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!("Dropping frame from '{}': {}", connection, e);
                            continue;
                        }
                    };
                    let ack = frame.ack;

                    // Events from one connection are handled one at a time
                    let reply = match frame.into_event() {
                        Ok(event) => dispatch(&state, &connection, event).await,
                        Err(e) => rejected(&connection, &e),
                    };

                    if let Some(ack) = ack
                        && !send_ack(&ack_sender, ack, reply)
                    {
                        break;
                    }
                }
                Message::Ping(_) => {
                    tracing::trace!("Received ping from '{}'", connection);
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to deliver relayed events to this client
    let mut send_task = pusher_loop(rx, sender);

    let send_finished_first = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => true,
    };
    if send_finished_first {
        // 書き込み側が閉じても、処理中のイベント（永続化を含む）は完了させる
        let _ = stop_tx.send(());
        if let Err(e) = recv_task.await {
            tracing::error!("Receive task of '{}' failed: {}", connection, e);
        }
    } else {
        send_task.abort();
    }

    match state.disconnect_usecase.execute(&connection).await {
        Some(binding) => tracing::info!(
            "Connection '{}' closed ({} of room '{}')",
            connection,
            binding.role,
            binding.code
        ),
        None => tracing::info!("Connection '{}' closed", connection),
    }
}

/// Queue an ack reply; returns `false` once the connection's channel is closed
fn send_ack(sender: &PusherChannel, ack: u64, reply: AckPayload) -> bool {
    match serde_json::to_string(&AckFrame::new(ack, reply)) {
        Ok(json) => sender.send(json).is_ok(),
        Err(e) => {
            tracing::error!("Failed to encode ack: {}", e);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use std::time::Duration;

    #[tokio::test]
    async fn test_next_frame_stops_while_waiting() {
        // テスト項目: フレームを待っている間に停止要求が来ると None を返す
        // given (前提条件):
        let mut receiver = stream::pending::<Result<Message, axum::Error>>();
        let (stop_tx, mut stop_rx) = oneshot::channel();
        stop_tx.send(()).unwrap();

        // when (操作):
        let frame = tokio::time::timeout(
            Duration::from_secs(1),
            next_frame(&mut receiver, &mut stop_rx),
        )
        .await
        .unwrap();

        // then (期待する結果):
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn test_next_frame_passes_frames_through() {
        // テスト項目: 停止要求がなければ受信したフレームをそのまま返し、終端で None になる
        // given (前提条件):
        let mut receiver = stream::iter(vec![Ok::<_, axum::Error>(Message::Text(
            "hello".into(),
        ))]);
        let (_stop_tx, mut stop_rx) = oneshot::channel::<()>();

        // when (操作):
        let first = next_frame(&mut receiver, &mut stop_rx).await;
        let second = next_frame(&mut receiver, &mut stop_rx).await;

        // then (期待する結果):
        assert!(matches!(first, Some(Ok(Message::Text(text))) if text.as_str() == "hello"));
        assert!(second.is_none());
    }
}
