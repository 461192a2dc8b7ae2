//! Message protocol definitions
//!
//! Every frame carries one JSON `Message`: a `type` tag plus an optional
//! payload whose fields are all optional. On the wire this shape is shared
//! by every kind; inside the relay it is lifted into the typed
//! `ClientSignal` (inbound) and flattened back from `ServerSignal` (outbound),
//! so each kind only carries the fields it uses.

use serde::{Deserialize, Serialize};

use crate::types::{ChannelId, ClientId};

/// Message kind, encoded as its literal variant name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    CreateChannel,
    ChannelCreated,
    NewClient,
    ClientAdded,
    NewOffer,
    NewAnswer,
    IceCandidate,
    /// Any kind this relay does not know; decoded instead of failing
    #[serde(other)]
    Unknown,
}

/// ICE candidate as produced by a WebRTC peer
///
/// The relay never interprets these fields; it stores and forwards them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foundation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    /// Create a candidate carrying only the candidate line
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_m_line_index: None,
            sdp_mid: None,
            address: None,
            component: None,
            foundation: None,
            port: None,
            priority: None,
            protocol: None,
            related_address: None,
            related_port: None,
            tcp_type: None,
            r#type: None,
            username_fragment: None,
        }
    }
}

/// Untyped payload shared by every message kind
///
/// Absent fields are omitted on the wire, never sent as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    /// Channel ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ChannelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ice_candidates: Option<Vec<IceCandidate>>,
}

/// Wire envelope: one per WebSocket text frame, both directions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<MessagePayload>,
}

impl Message {
    pub fn new(kind: MessageType, payload: MessagePayload) -> Self {
        Self {
            kind,
            payload: Some(payload),
        }
    }

    /// Decode a single text frame
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Encode into a single text frame
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Client → Relay signal
///
/// Identifiers stay optional: a missing ID behaves exactly like one that
/// names nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSignal {
    /// Open a new channel owned by the sender
    CreateChannel,
    /// Join the sender to a channel
    NewClient { channel_id: Option<ChannelId> },
    /// SDP offer addressed to a joined client
    NewOffer {
        channel_id: Option<ChannelId>,
        client_id: Option<ClientId>,
        offer: Option<String>,
    },
    /// SDP answer from a joined client, addressed to the channel owner
    NewAnswer {
        channel_id: Option<ChannelId>,
        client_id: Option<ClientId>,
        answer: Option<String>,
    },
    /// Batch of ICE candidates
    IceCandidate {
        channel_id: Option<ChannelId>,
        client_id: Option<ClientId>,
        candidates: Vec<IceCandidate>,
    },
    /// Kinds the relay only emits, or does not know
    Ignored(MessageType),
}

impl From<Message> for ClientSignal {
    fn from(msg: Message) -> Self {
        let payload = msg.payload.unwrap_or_default();
        match msg.kind {
            MessageType::CreateChannel => ClientSignal::CreateChannel,
            MessageType::NewClient => ClientSignal::NewClient {
                channel_id: payload.id,
            },
            MessageType::NewOffer => ClientSignal::NewOffer {
                channel_id: payload.id,
                client_id: payload.client_id,
                offer: payload.offer,
            },
            MessageType::NewAnswer => ClientSignal::NewAnswer {
                channel_id: payload.id,
                client_id: payload.client_id,
                answer: payload.answer,
            },
            MessageType::IceCandidate => ClientSignal::IceCandidate {
                channel_id: payload.id,
                client_id: payload.client_id,
                candidates: payload.ice_candidates.unwrap_or_default(),
            },
            other => ClientSignal::Ignored(other),
        }
    }
}

/// Relay → Client signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerSignal {
    /// Channel created for the requesting connection
    ChannelCreated { channel_id: ChannelId },
    /// A client joined; `channel_id` echoes the request, which may lack one
    ClientAdded {
        channel_id: Option<ChannelId>,
        client_id: ClientId,
    },
    /// Offer forwarded to the addressed client
    NewOffer {
        channel_id: ChannelId,
        client_id: ClientId,
        offer: Option<String>,
    },
    /// Answer forwarded to the channel owner
    NewAnswer {
        channel_id: ChannelId,
        client_id: Option<ClientId>,
        answer: Option<String>,
    },
    /// Candidates forwarded to the owner (no client) or to a client
    IceCandidate {
        channel_id: ChannelId,
        client_id: Option<ClientId>,
        candidates: Vec<IceCandidate>,
    },
}

impl From<ServerSignal> for Message {
    fn from(signal: ServerSignal) -> Self {
        match signal {
            ServerSignal::ChannelCreated { channel_id } => Message::new(
                MessageType::ChannelCreated,
                MessagePayload {
                    id: Some(channel_id),
                    ..Default::default()
                },
            ),
            ServerSignal::ClientAdded {
                channel_id,
                client_id,
            } => Message::new(
                MessageType::ClientAdded,
                MessagePayload {
                    id: channel_id,
                    client_id: Some(client_id),
                    ..Default::default()
                },
            ),
            ServerSignal::NewOffer {
                channel_id,
                client_id,
                offer,
            } => Message::new(
                MessageType::NewOffer,
                MessagePayload {
                    id: Some(channel_id),
                    client_id: Some(client_id),
                    offer,
                    ..Default::default()
                },
            ),
            ServerSignal::NewAnswer {
                channel_id,
                client_id,
                answer,
            } => Message::new(
                MessageType::NewAnswer,
                MessagePayload {
                    id: Some(channel_id),
                    client_id,
                    answer,
                    ..Default::default()
                },
            ),
            ServerSignal::IceCandidate {
                channel_id,
                client_id,
                candidates,
            } => Message::new(
                MessageType::IceCandidate,
                MessagePayload {
                    id: Some(channel_id),
                    client_id,
                    ice_candidates: Some(candidates),
                    ..Default::default()
                },
            ),
        }
    }
}
