//! Channel registry
//!
//! In-memory map from channel ID to channel state. The registry itself is
//! not synchronized: it is owned by the relay actor, which is the only
//! writer.

use std::collections::HashMap;

use tracing::debug;

use crate::channel::Channel;
use crate::client::Client;
use crate::connection::Connection;
use crate::types::{ChannelId, ClientId, ConnectionId};

/// All live channels: ChannelId -> Channel
#[derive(Debug, Default)]
pub struct Registry {
    channels: HashMap<ChannelId, Channel>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty channel owned by `owner` and return its ID
    ///
    /// Regenerates the ID until it does not clash with a live channel.
    pub fn create_channel(&mut self, owner: Connection) -> ChannelId {
        let channel_id = loop {
            let id = ChannelId::generate();
            if !self.channels.contains_key(&id) {
                break id;
            }
            debug!("Channel ID {} collided, regenerating", id);
        };

        self.channels
            .insert(channel_id.clone(), Channel::new(channel_id.clone(), owner));
        channel_id
    }

    /// Join `connection` to a channel as a new client
    ///
    /// Returns None, changing nothing, if the channel does not exist.
    pub fn add_client(&mut self, channel_id: &ChannelId, connection: Connection) -> Option<ClientId> {
        let channel = self.channels.get_mut(channel_id)?;

        let client_id = loop {
            let id = ClientId::generate();
            if !channel.contains_client(&id) && !channel.has_departed(&id) {
                break id;
            }
            debug!("Client ID {} collided in channel {}, regenerating", id, channel_id);
        };

        channel.add_client(Client::new(client_id.clone(), connection));
        Some(client_id)
    }

    pub fn get_channel(&self, channel_id: &ChannelId) -> Option<&Channel> {
        self.channels.get(channel_id)
    }

    pub fn get_channel_mut(&mut self, channel_id: &ChannelId) -> Option<&mut Channel> {
        self.channels.get_mut(channel_id)
    }

    pub fn get_client(&self, channel_id: &ChannelId, client_id: &ClientId) -> Option<&Client> {
        self.channels.get(channel_id)?.get_client(client_id)
    }

    pub fn get_client_mut(
        &mut self,
        channel_id: &ChannelId,
        client_id: &ClientId,
    ) -> Option<&mut Client> {
        self.channels.get_mut(channel_id)?.get_client_mut(client_id)
    }

    /// Drop everything tied to a closed connection
    ///
    /// Removes the channels it owns and the clients it joined as.
    /// Returns (channels removed, clients removed).
    pub fn remove_connection(&mut self, connection_id: ConnectionId) -> (usize, usize) {
        let before = self.channels.len();
        self.channels.retain(|id, channel| {
            if !channel.is_owned_by(connection_id) {
                return true;
            }
            debug!(
                "Channel {} removed after {:?} with {} client(s)",
                id,
                channel.created_at.elapsed(),
                channel.client_count()
            );
            false
        });
        let channels_removed = before - self.channels.len();

        let clients_removed = self
            .channels
            .values_mut()
            .map(|channel| channel.remove_clients_of(connection_id))
            .sum();

        (channels_removed, clients_removed)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_channel_is_empty_and_owned() {
        let mut registry = Registry::new();
        let (owner, _rx) = Connection::channel();

        let ids: Vec<ChannelId> = (0..20).map(|_| registry.create_channel(owner.clone())).collect();

        assert_eq!(registry.channel_count(), 20);
        for id in &ids {
            let channel = registry.get_channel(id).unwrap();
            assert_eq!(channel.owner, owner);
            assert_eq!(channel.client_count(), 0);
        }
    }

    #[test]
    fn test_add_client_to_existing_channel() {
        let mut registry = Registry::new();
        let (owner, _rx_owner) = Connection::channel();
        let (peer, _rx_peer) = Connection::channel();
        let channel_id = registry.create_channel(owner);

        let client_id = registry.add_client(&channel_id, peer.clone()).unwrap();

        let client = registry.get_client(&channel_id, &client_id).unwrap();
        assert_eq!(client.connection, peer);
        assert_eq!(registry.get_channel(&channel_id).unwrap().client_count(), 1);
    }

    #[test]
    fn test_add_client_to_missing_channel_is_noop() {
        let mut registry = Registry::new();
        let (owner, _rx_owner) = Connection::channel();
        let (peer, _rx_peer) = Connection::channel();
        let channel_id = registry.create_channel(owner);

        assert!(registry.add_client(&ChannelId::from("missing"), peer).is_none());
        assert_eq!(registry.channel_count(), 1);
        assert_eq!(registry.get_channel(&channel_id).unwrap().client_count(), 0);
    }

    #[test]
    fn test_lookup_is_exact_match() {
        let mut registry = Registry::new();
        let (owner, _rx) = Connection::channel();
        let channel_id = registry.create_channel(owner);
        let id = channel_id.as_str();

        assert!(registry.get_channel(&channel_id).is_some());
        assert!(registry.get_channel(&ChannelId::from(&id[..5])).is_none());
        assert!(registry.get_channel(&ChannelId(format!("{} ", id))).is_none());
        assert!(registry.get_channel(&ChannelId(format!("{}x", id))).is_none());
    }

    #[test]
    fn test_client_ids_scoped_per_channel() {
        let mut registry = Registry::new();
        let (owner, _rx_owner) = Connection::channel();
        let (peer, _rx_peer) = Connection::channel();
        let first = registry.create_channel(owner.clone());
        let second = registry.create_channel(owner);

        let client_id = registry.add_client(&first, peer).unwrap();

        assert!(registry.get_client(&first, &client_id).is_some());
        assert!(registry.get_client(&second, &client_id).is_none());
    }

    #[test]
    fn test_remove_connection_drops_owned_channels_and_clients() {
        let mut registry = Registry::new();
        let (host, _rx_host) = Connection::channel();
        let (other_host, _rx_other) = Connection::channel();
        let (peer, _rx_peer) = Connection::channel();

        let owned = registry.create_channel(host.clone());
        let kept = registry.create_channel(other_host);
        registry.add_client(&owned, peer.clone()).unwrap();
        let host_as_client = registry.add_client(&kept, host.clone()).unwrap();
        let peer_client = registry.add_client(&kept, peer).unwrap();

        assert_eq!(registry.remove_connection(host.id()), (1, 1));

        assert!(registry.get_channel(&owned).is_none());
        assert!(registry.get_client(&kept, &host_as_client).is_none());
        assert!(registry.get_client(&kept, &peer_client).is_some());
    }
}
