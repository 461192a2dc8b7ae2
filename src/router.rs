//! Signal router
//!
//! Dispatches each inbound signal on its kind, updates the registry, and
//! sends the resulting replies. Missing channels or clients never produce
//! an error: they only narrow who gets a reply.
//!
//! | kind | reply goes to |
//! |---|---|
//! | `CreateChannel` | sender |
//! | `NewClient` | channel owner (if the channel exists) and sender |
//! | `NewOffer` | the addressed client, only if it exists |
//! | `NewAnswer` | channel owner, whenever the channel exists |
//! | `IceCandidate` | per candidate: the client with its full history, or the owner with that one candidate |

use tracing::{debug, info};

use crate::connection::Connection;
use crate::message::{ClientSignal, IceCandidate, ServerSignal};
use crate::registry::Registry;
use crate::types::{ChannelId, ClientId, ConnectionId};

/// Per-kind dispatch over a `Registry`
///
/// Not synchronized; the caller must guarantee a single writer.
#[derive(Debug, Default)]
pub struct Router {
    registry: Registry,
}

impl Router {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handle one inbound signal received on `from`
    pub fn route(&mut self, from: &Connection, signal: ClientSignal) {
        match signal {
            ClientSignal::CreateChannel => self.create_channel(from),
            ClientSignal::NewClient { channel_id } => self.new_client(from, channel_id),
            ClientSignal::NewOffer {
                channel_id,
                client_id,
                offer,
            } => self.new_offer(channel_id, client_id, offer),
            ClientSignal::NewAnswer {
                channel_id,
                client_id,
                answer,
            } => self.new_answer(channel_id, client_id, answer),
            ClientSignal::IceCandidate {
                channel_id,
                client_id,
                candidates,
            } => self.ice_candidate(channel_id, client_id, candidates),
            ClientSignal::Ignored(kind) => {
                debug!("Ignoring {:?} from {}", kind, from.id());
            }
        }
    }

    /// Forget everything tied to a closed connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) {
        let (channels, clients) = self.registry.remove_connection(connection_id);
        if channels > 0 || clients > 0 {
            info!(
                "Connection {} closed: removed {} channel(s), {} client(s)",
                connection_id, channels, clients
            );
        }
    }

    fn create_channel(&mut self, from: &Connection) {
        let channel_id = self.registry.create_channel(from.clone());
        info!("Connection {} created channel {}", from.id(), channel_id);

        deliver(from, ServerSignal::ChannelCreated { channel_id });
    }

    fn new_client(&mut self, from: &Connection, channel_id: Option<ChannelId>) {
        let joined = channel_id
            .as_ref()
            .and_then(|id| self.registry.add_client(id, from.clone()));

        // The joiner gets a client ID even when there was nothing to join
        let client_id = match joined {
            Some(client_id) => {
                info!(
                    "Connection {} joined channel {} as {}",
                    from.id(),
                    channel_id.as_ref().map_or("", ChannelId::as_str),
                    client_id
                );
                client_id
            }
            None => {
                debug!(
                    "NewClient for unknown channel {:?}",
                    channel_id.as_ref().map(ChannelId::as_str)
                );
                ClientId::generate()
            }
        };

        let reply = ServerSignal::ClientAdded {
            channel_id: channel_id.clone(),
            client_id,
        };

        if let Some(channel) = channel_id.as_ref().and_then(|id| self.registry.get_channel(id)) {
            deliver(&channel.owner, reply.clone());
        }
        deliver(from, reply);
    }

    fn new_offer(
        &mut self,
        channel_id: Option<ChannelId>,
        client_id: Option<ClientId>,
        offer: Option<String>,
    ) {
        let (Some(channel_id), Some(client_id)) = (channel_id, client_id) else {
            debug!("NewOffer without channel or client ID");
            return;
        };
        let Some(client) = self.registry.get_client_mut(&channel_id, &client_id) else {
            debug!("NewOffer for unknown client {} in {}", client_id, channel_id);
            return;
        };

        client.set_offer(offer.clone());
        deliver(
            &client.connection,
            ServerSignal::NewOffer {
                channel_id,
                client_id,
                offer,
            },
        );
    }

    fn new_answer(
        &mut self,
        channel_id: Option<ChannelId>,
        client_id: Option<ClientId>,
        answer: Option<String>,
    ) {
        let Some(channel_id) = channel_id else {
            debug!("NewAnswer without channel ID");
            return;
        };
        let Some(channel) = self.registry.get_channel_mut(&channel_id) else {
            debug!("NewAnswer for unknown channel {}", channel_id);
            return;
        };

        if let Some(id) = client_id.as_ref() {
            if let Some(client) = channel.get_client_mut(id) {
                client.set_answer(answer.clone());
            }
        }

        // Owner hears about the answer even if the client is unknown
        deliver(
            &channel.owner,
            ServerSignal::NewAnswer {
                channel_id,
                client_id,
                answer,
            },
        );
    }

    fn ice_candidate(
        &mut self,
        channel_id: Option<ChannelId>,
        client_id: Option<ClientId>,
        candidates: Vec<IceCandidate>,
    ) {
        let Some(channel_id) = channel_id else {
            debug!("IceCandidate without channel ID");
            return;
        };
        let Some(channel) = self.registry.get_channel_mut(&channel_id) else {
            debug!("IceCandidate for unknown channel {}", channel_id);
            return;
        };

        // Candidates for a client that has left go nowhere
        if let Some(id) = client_id.as_ref().filter(|id| channel.has_departed(id)) {
            debug!("Dropping candidates for departed client {} in {}", id, channel_id);
            return;
        }

        let owner = channel.owner.clone();
        let client = match client_id.as_ref() {
            Some(id) => channel.get_client_mut(id),
            None => None,
        };

        match client {
            Some(client) => {
                for candidate in candidates {
                    // Each reply carries the whole history, not just the new candidate
                    let accumulated = client.append_candidate(candidate).to_vec();
                    deliver(
                        &client.connection,
                        ServerSignal::IceCandidate {
                            channel_id: channel_id.clone(),
                            client_id: client_id.clone(),
                            candidates: accumulated,
                        },
                    );
                }
            }
            None => {
                for candidate in candidates {
                    deliver(
                        &owner,
                        ServerSignal::IceCandidate {
                            channel_id: channel_id.clone(),
                            client_id: None,
                            candidates: vec![candidate],
                        },
                    );
                }
            }
        }
    }
}

/// Fire-and-forget send; a closed peer is logged and skipped
fn deliver(connection: &Connection, signal: ServerSignal) {
    if connection.send(signal).is_err() {
        debug!("Dropping message for closed connection {}", connection.id());
    }
}
