//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use beacon_shared::time::get_utc_timestamp;

use crate::{
    command::{Command, HELP},
    domain::{SessionContext, next_handshake},
    error::ClientError,
    protocol::{AckPayload, ClientFrame, ServerFrame},
};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const HANDSHAKE_ACK: u64 = 1;

fn encode(frame: &ClientFrame) -> Result<Message, ClientError> {
    serde_json::to_string(frame)
        .map(|json| Message::Text(json.into()))
        .map_err(|e| ClientError::Protocol(e.to_string()))
}

/// Enter the room: send the handshake and wait for its ack
///
/// Events arriving before the ack are printed as they come.
async fn enter_room(
    ws_stream: &mut WsStream,
    context: &mut SessionContext,
) -> Result<String, ClientError> {
    let handshake = next_handshake(context)?;
    ws_stream
        .send(encode(&handshake.to_frame(HANDSHAKE_ACK))?)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    let ack: AckPayload = loop {
        let message = match ws_stream.next().await {
            Some(Ok(message)) => message,
            Some(Err(e)) => return Err(ClientError::ConnectionError(e.to_string())),
            None => {
                return Err(ClientError::ConnectionError(
                    "Connection closed before entering the room".to_string(),
                ));
            }
        };
        let Message::Text(text) = message else {
            continue;
        };
        let frame: ServerFrame =
            serde_json::from_str(&text).map_err(|e| ClientError::Protocol(e.to_string()))?;
        match frame.ack_for(HANDSHAKE_ACK) {
            Some(ack) => break ack,
            None => print!("{}", MessageFormatter::format_event(&frame)),
        }
    };

    if !ack.success {
        return Err(ClientError::Rejected {
            event: handshake.event(),
            reason: ack.error.clone().unwrap_or_default(),
        });
    }

    let code = match (&ack.room_code, &context.room_code) {
        (Some(code), _) | (None, Some(code)) => code.clone(),
        (None, None) => {
            return Err(ClientError::Protocol(
                "create-room ack carried no room code".to_string(),
            ));
        }
    };
    context.room_code = Some(code.clone());
    context.entered = true;

    print!(
        "{}",
        MessageFormatter::format_entered(&code, context.role, &ack)
    );
    Ok(code)
}

/// Run the WebSocket client session
pub async fn run_client_session(
    url: &str,
    context: &mut SessionContext,
) -> Result<(), ClientError> {
    let (mut ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to relay server!");

    let room_code = enter_room(&mut ws_stream, context).await?;
    let prompt = format!("{}@{}> ", context.role, room_code);
    println!("\nType 'help' for the list of commands. Press Ctrl+C to exit.\n");

    let (mut write, mut read) = ws_stream.split();

    // Clone prompt for read task
    let prompt_for_read = prompt.clone();

    // Spawn a task to handle incoming events
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerFrame>(&text) {
                        Ok(frame) if frame.event == "ack" => {
                            match serde_json::from_value::<AckPayload>(frame.data) {
                                Ok(ack) => print!("{}", MessageFormatter::format_ack(&ack)),
                                Err(_) => print!("{}", MessageFormatter::format_raw_message(&text)),
                            }
                        }
                        Ok(frame) => print!("{}", MessageFormatter::format_event(&frame)),
                        // If parsing fails, display as raw text
                        Err(_) => print!("{}", MessageFormatter::format_raw_message(&text)),
                    }
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Binary(data)) => {
                    print!("{}", MessageFormatter::format_binary_message(data.len()));
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let prompt_for_readline = prompt.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt_for_readline) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to turn prompt commands into events
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;
        let mut next_ack = HANDSHAKE_ACK + 1;

        while let Some(line) = input_rx.recv().await {
            let command = match Command::parse(&line) {
                Ok(command) => command,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            let (event, data) = match command.to_event(&room_code) {
                Some(event) => event,
                None if command == Command::Quit => break,
                None => {
                    print!("{}", HELP);
                    continue;
                }
            };

            let message = match encode(&ClientFrame::new(event, data, next_ack)) {
                Ok(message) => message,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };
            next_ack += 1;

            if let Err(e) = write.send(message).await {
                tracing::warn!("Failed to send event: {}", e);
                write_error = true;
                break;
            }

            print!(
                "{}",
                MessageFormatter::format_sent_confirmation(event, get_utc_timestamp())
            );
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            let connection_error = read_result.unwrap_or(false);
            if connection_error {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            let write_error = write_result.unwrap_or(false);
            if write_error {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
        }
    }

    Ok(())
}
