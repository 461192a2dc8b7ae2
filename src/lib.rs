//! WebRTC Signaling Relay Library
//!
//! A WebSocket relay built with tokio-tungstenite that brokers SDP
//! offers/answers and ICE candidates between peers. No media passes through
//! it; it only forwards small JSON control messages.
//!
//! # Protocol
//! - `CreateChannel`: the sender becomes the owner of a new channel
//! - `NewClient`: the sender joins a channel and gets a client ID
//! - `NewOffer`: offer stored on a client and forwarded to it
//! - `NewAnswer`: answer stored on a client and forwarded to the owner
//! - `IceCandidate`: candidates forwarded to a client (with history) or the owner
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `RelayServer` is the central actor owning the `Router` and its `Registry`
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use signal_relay::{serve, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RelayConfig::default();
//!     let listener = TcpListener::bind(config.bind_addr).await.unwrap();
//!     serve(listener, config).await;
//! }
//! ```

pub mod channel;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod router;
pub mod server;
pub mod types;

// Re-export main types for convenience
pub use channel::Channel;
pub use client::Client;
pub use config::RelayConfig;
pub use connection::Connection;
pub use error::{AppError, SendError};
pub use handler::{handle_connection, serve};
pub use message::{ClientSignal, IceCandidate, Message, MessagePayload, MessageType, ServerSignal};
pub use registry::Registry;
pub use router::Router;
pub use server::{RelayServer, ServerCommand};
pub use types::{generate_id, ChannelId, ClientId, ConnectionId};
