//! WebSocket connection handler
//!
//! Handles individual peer connections: WebSocket handshake, frame
//! decoding, and bidirectional communication with the RelayServer.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::connection::Connection;
use crate::error::AppError;
use crate::message::{ClientSignal, Message};
use crate::server::{RelayServer, ServerCommand};

/// Accept connections forever
///
/// Starts the RelayServer actor, then spawns one handler task per accepted
/// TCP connection. Accept failures are logged and do not stop the loop.
pub async fn serve(listener: TcpListener, config: RelayConfig) {
    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
    tokio::spawn(RelayServer::new(cmd_rx).run());
    info!("RelayServer actor started");

    let config = Arc::new(config);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("New TCP connection from {}", addr);
                let cmd_tx = cmd_tx.clone();
                let config = Arc::clone(&config);

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx, config).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a new TCP connection
///
/// Performs the WebSocket handshake on the configured path, registers the
/// connection with the RelayServer, and pumps frames in both directions
/// until either side closes.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
    config: Arc<RelayConfig>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    // WebSocket handshake, only on the relay endpoint
    let path = config.path.as_str();
    let check_path = |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
        if req.uri().path() == path {
            Ok(response)
        } else {
            warn!("Rejecting upgrade on {} from {}", req.uri().path(), peer_addr);
            let mut rejection = ErrorResponse::new(Some("Not Found".to_string()));
            *rejection.status_mut() = StatusCode::NOT_FOUND;
            Err(rejection)
        }
    };
    let ws_stream = tokio_tungstenite::accept_hdr_async(stream, check_path).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Channel for relay -> peer messages
    let (connection, mut msg_rx) = Connection::channel();
    let connection_id = connection.id();
    info!("Connection {} opened from {}", connection_id, peer_addr);

    // Register with RelayServer
    if cmd_tx
        .send(ServerCommand::Connect { connection })
        .await
        .is_err()
    {
        error!("Failed to register connection {} - server closed", connection_id);
        return Err(AppError::ChannelSend);
    }

    let cmd_tx_read = cmd_tx.clone();

    // Read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(WsMessage::Text(text)) => {
                    let msg = match Message::decode(&text) {
                        Ok(msg) => msg,
                        Err(e) => {
                            // Malformed frames are dropped; the connection stays open
                            warn!("Invalid message from {}: {}", connection_id, e);
                            continue;
                        }
                    };
                    let cmd = ServerCommand::Signal {
                        connection_id,
                        signal: ClientSignal::from(msg),
                    };
                    if cmd_tx_read.send(cmd).await.is_err() {
                        debug!("Server closed, ending read task for {}", connection_id);
                        break;
                    }
                }
                Ok(WsMessage::Close(_)) => {
                    debug!("Connection {} sent close frame", connection_id);
                    break;
                }
                Ok(_) => {
                    // Binary, ping, pong - nothing to relay
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", connection_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", connection_id);
    });

    // Write task (Message -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match msg.encode() {
                Ok(json) => {
                    if ws_sender.send(WsMessage::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }
        debug!("Write task ended for {}", connection_id);

        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete, then stop the other
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", connection_id);
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", connection_id);
        }
    }
    read_task.abort();
    write_task.abort();

    let _ = cmd_tx
        .send(ServerCommand::Disconnect { connection_id })
        .await;

    info!("Connection {} closed", connection_id);

    Ok(())
}
