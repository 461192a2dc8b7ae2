//! Error types for the signaling relay
//!
//! Defines connection-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.
//!
//! Routing itself has no error type: a missing channel or client only
//! changes who receives a reply.

use thiserror::Error;

/// Connection-level errors
///
/// Any of these ends the affected connection only, never the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol or handshake error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Channel send error (relay actor has stopped)
    #[error("Channel send error")]
    ChannelSend,
}

/// Message send errors
///
/// Occurs when delivering to a connection whose write side is gone.
#[derive(Debug, Error)]
pub enum SendError {
    /// The peer's connection has been closed
    #[error("Connection closed")]
    ConnectionClosed,
}
