//! RelayServer Actor implementation
//!
//! The single owner of all relay state. Connection handlers never touch the
//! registry directly; they send `ServerCommand`s and the actor applies them
//! one at a time, so concurrent signals on the same channel are totally
//! ordered by arrival at the actor.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::connection::Connection;
use crate::message::ClientSignal;
use crate::registry::Registry;
use crate::router::Router;
use crate::types::ConnectionId;

/// Commands sent from handlers to the RelayServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New connection established
    Connect { connection: Connection },
    /// Connection closed
    Disconnect { connection_id: ConnectionId },
    /// Signal received on a connection
    Signal {
        connection_id: ConnectionId,
        signal: ClientSignal,
    },
}

/// The main RelayServer actor
///
/// Tracks live connections and feeds their signals through the router.
pub struct RelayServer {
    /// Live connections: ConnectionId -> Connection
    connections: HashMap<ConnectionId, Connection>,
    /// Routing state machine and registry
    router: Router,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl RelayServer {
    /// Create a new RelayServer with an empty registry
    pub fn new(receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self {
            connections: HashMap::new(),
            router: Router::new(Registry::new()),
            receiver,
        }
    }

    /// Run the RelayServer event loop
    ///
    /// Processes commands until all senders are dropped, then hands the
    /// router back.
    pub async fn run(mut self) -> Router {
        info!("RelayServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("RelayServer shutting down");
        self.router
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect { connection } => {
                self.handle_connect(connection);
            }
            ServerCommand::Disconnect { connection_id } => {
                self.handle_disconnect(connection_id);
            }
            ServerCommand::Signal {
                connection_id,
                signal,
            } => {
                self.handle_signal(connection_id, signal);
            }
        }
    }

    fn handle_connect(&mut self, connection: Connection) {
        debug!("Connection {} registered", connection.id());
        self.connections.insert(connection.id(), connection);
        debug!(
            "Total connections: {}, Total channels: {}",
            self.connections.len(),
            self.router.registry().channel_count()
        );
    }

    fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        self.connections.remove(&connection_id);
        self.router.disconnect(connection_id);
        debug!(
            "Total connections: {}, Total channels: {}",
            self.connections.len(),
            self.router.registry().channel_count()
        );
    }

    fn handle_signal(&mut self, connection_id: ConnectionId, signal: ClientSignal) {
        let Some(connection) = self.connections.get(&connection_id) else {
            warn!("Signal from unregistered connection {}", connection_id);
            return;
        };

        self.router.route(connection, signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{IceCandidate, Message, MessageType};
    use crate::types::{ChannelId, ClientId};

    async fn recv(rx: &mut mpsc::UnboundedReceiver<Message>) -> Message {
        rx.recv().await.expect("connection closed")
    }

    #[tokio::test]
    async fn test_signal_from_unknown_connection_is_dropped() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let server = tokio::spawn(RelayServer::new(cmd_rx).run());

        cmd_tx
            .send(ServerCommand::Signal {
                connection_id: ConnectionId::new(),
                signal: ClientSignal::CreateChannel,
            })
            .await
            .unwrap();
        drop(cmd_tx);

        let router = server.await.unwrap();
        assert_eq!(router.registry().channel_count(), 0);
    }

    #[tokio::test]
    async fn test_disconnect_cleans_registry() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let server = tokio::spawn(RelayServer::new(cmd_rx).run());
        let (owner, mut owner_rx) = Connection::channel();

        cmd_tx
            .send(ServerCommand::Connect {
                connection: owner.clone(),
            })
            .await
            .unwrap();
        cmd_tx
            .send(ServerCommand::Signal {
                connection_id: owner.id(),
                signal: ClientSignal::CreateChannel,
            })
            .await
            .unwrap();
        assert_eq!(recv(&mut owner_rx).await.kind, MessageType::ChannelCreated);

        cmd_tx
            .send(ServerCommand::Disconnect {
                connection_id: owner.id(),
            })
            .await
            .unwrap();
        drop(cmd_tx);

        let router = server.await.unwrap();
        assert_eq!(router.registry().channel_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_candidates_are_not_lost() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let server = tokio::spawn(RelayServer::new(cmd_rx).run());

        let (owner, mut owner_rx) = Connection::channel();
        let (peer, mut peer_rx) = Connection::channel();
        for connection in [owner.clone(), peer.clone()] {
            cmd_tx.send(ServerCommand::Connect { connection }).await.unwrap();
        }

        cmd_tx
            .send(ServerCommand::Signal {
                connection_id: owner.id(),
                signal: ClientSignal::CreateChannel,
            })
            .await
            .unwrap();
        let channel_id: ChannelId = recv(&mut owner_rx).await.payload.unwrap().id.unwrap();

        cmd_tx
            .send(ServerCommand::Signal {
                connection_id: peer.id(),
                signal: ClientSignal::NewClient {
                    channel_id: Some(channel_id.clone()),
                },
            })
            .await
            .unwrap();
        let client_id: ClientId = recv(&mut peer_rx).await.payload.unwrap().client_id.unwrap();

        let senders = [(owner.id(), "from-owner"), (peer.id(), "from-peer")].map(
            |(connection_id, line)| {
                let cmd_tx = cmd_tx.clone();
                let channel_id = channel_id.clone();
                let client_id = client_id.clone();
                tokio::spawn(async move {
                    cmd_tx
                        .send(ServerCommand::Signal {
                            connection_id,
                            signal: ClientSignal::IceCandidate {
                                channel_id: Some(channel_id),
                                client_id: Some(client_id),
                                candidates: vec![IceCandidate::new(line)],
                            },
                        })
                        .await
                        .unwrap();
                })
            },
        );
        for sender in senders {
            sender.await.unwrap();
        }
        drop(cmd_tx);

        let router = server.await.unwrap();
        let client = router.registry().get_client(&channel_id, &client_id).unwrap();
        let mut lines: Vec<&str> = client.candidates().iter().map(|c| c.candidate.as_str()).collect();
        assert_eq!(lines.len(), 2);
        lines.sort();
        assert_eq!(lines, vec!["from-owner", "from-peer"]);

        // The second reply carries both candidates in the order they were applied
        let _ = recv(&mut peer_rx).await;
        let last = recv(&mut peer_rx).await;
        assert_eq!(
            last.payload.unwrap().ice_candidates.unwrap(),
            client.candidates().to_vec()
        );
    }
}
