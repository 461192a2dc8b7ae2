//! Connection handle
//!
//! A cheap, cloneable reference to one WebSocket peer. The registry keeps
//! these inside channels and clients, but the connection's lifetime belongs
//! to its handler task: once that task ends, sends simply fail.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::Message;
use crate::types::ConnectionId;

/// Send-capable handle to a connected peer
///
/// Equality is identity: two handles are equal when they refer to the
/// same connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<Message>,
}

impl Connection {
    /// Create a handle with a fresh ID around the given outbound channel
    pub fn new(sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
        }
    }

    /// Create a handle plus the receiver its handler task drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a message for this peer without waiting
    ///
    /// Returns an error if the connection has been closed.
    pub fn send(&self, msg: impl Into<Message>) -> Result<(), SendError> {
        self.sender
            .send(msg.into())
            .map_err(|_| SendError::ConnectionClosed)
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ServerSignal;
    use crate::types::ChannelId;

    #[test]
    fn test_identity_equality() {
        let (a, _rx_a) = Connection::channel();
        let (b, _rx_b) = Connection::channel();

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_send_delivers_message() {
        let (conn, mut rx) = Connection::channel();
        conn.send(ServerSignal::ChannelCreated {
            channel_id: ChannelId::from("abc"),
        })
        .unwrap();

        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.payload.unwrap().id, Some(ChannelId::from("abc")));
    }

    #[test]
    fn test_send_to_closed_connection_fails() {
        let (conn, rx) = Connection::channel();
        drop(rx);

        let result = conn.send(ServerSignal::ChannelCreated {
            channel_id: ChannelId::from("abc"),
        });
        assert!(matches!(result, Err(SendError::ConnectionClosed)));
    }
}
