//! Client struct definition
//!
//! Represents a peer that joined a channel, together with the signaling
//! state accumulated for it.

use crate::connection::Connection;
use crate::message::IceCandidate;
use crate::types::ClientId;

/// Peer joined to a channel
///
/// Holds the peer's connection handle and the last offer/answer seen for
/// it, plus every ICE candidate received so far.
#[derive(Debug)]
pub struct Client {
    /// Identifier, unique within the owning channel
    pub id: ClientId,
    /// Relay → peer connection
    pub connection: Connection,
    /// Last SDP offer (last write wins)
    pub offer: Option<String>,
    /// Last SDP answer (last write wins)
    pub answer: Option<String>,
    /// Append-only, in arrival order, duplicates kept
    candidates: Vec<IceCandidate>,
}

impl Client {
    /// Create a new client with no signaling state
    pub fn new(id: ClientId, connection: Connection) -> Self {
        Self {
            id,
            connection,
            offer: None,
            answer: None,
            candidates: Vec::new(),
        }
    }

    pub fn set_offer(&mut self, offer: Option<String>) {
        self.offer = offer;
    }

    pub fn set_answer(&mut self, answer: Option<String>) {
        self.answer = answer;
    }

    /// Append a candidate and return everything accumulated so far
    pub fn append_candidate(&mut self, candidate: IceCandidate) -> &[IceCandidate] {
        self.candidates.push(candidate);
        &self.candidates
    }

    pub fn candidates(&self) -> &[IceCandidate] {
        &self.candidates
    }
}
