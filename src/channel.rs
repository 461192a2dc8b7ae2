//! Channel struct definition
//!
//! Represents a signaling session: the owner connection that created it
//! and the clients that joined it.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use crate::client::Client;
use crate::connection::Connection;
use crate::types::{ChannelId, ClientId, ConnectionId};

/// Signaling channel
///
/// The owner receives all relay traffic addressed to the channel rather
/// than to a specific client.
#[derive(Debug)]
pub struct Channel {
    /// Channel identifier
    pub id: ChannelId,
    /// Connection that created the channel (host)
    pub owner: Connection,
    /// Joined clients: ClientId -> Client
    clients: HashMap<ClientId, Client>,
    /// IDs of clients whose connection has closed
    departed: HashSet<ClientId>,
    /// Channel creation time
    pub created_at: Instant,
}

impl Channel {
    /// Create a new channel with no clients
    pub fn new(id: ChannelId, owner: Connection) -> Self {
        Self {
            id,
            owner,
            clients: HashMap::new(),
            departed: HashSet::new(),
            created_at: Instant::now(),
        }
    }

    /// Add a client to the channel
    ///
    /// Returns false, leaving the channel untouched, if the ID is taken.
    pub fn add_client(&mut self, client: Client) -> bool {
        if self.clients.contains_key(&client.id) {
            return false;
        }
        self.clients.insert(client.id.clone(), client);
        true
    }

    pub fn contains_client(&self, client_id: &ClientId) -> bool {
        self.clients.contains_key(client_id)
    }

    /// Check if the ID belonged to a client that has since disconnected
    pub fn has_departed(&self, client_id: &ClientId) -> bool {
        self.departed.contains(client_id)
    }

    pub fn get_client(&self, client_id: &ClientId) -> Option<&Client> {
        self.clients.get(client_id)
    }

    pub fn get_client_mut(&mut self, client_id: &ClientId) -> Option<&mut Client> {
        self.clients.get_mut(client_id)
    }

    /// Check if the given connection created this channel
    pub fn is_owned_by(&self, connection_id: ConnectionId) -> bool {
        self.owner.id() == connection_id
    }

    /// Remove every client bound to the given connection
    ///
    /// Their IDs are remembered as departed and never reissued in this
    /// channel. Returns the number of clients removed.
    pub fn remove_clients_of(&mut self, connection_id: ConnectionId) -> usize {
        let departed = &mut self.departed;
        let before = self.clients.len();
        self.clients.retain(|id, client| {
            if client.connection.id() != connection_id {
                return true;
            }
            departed.insert(id.clone());
            false
        });
        before - self.clients.len()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}
