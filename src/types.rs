//! Core data types for Meshtastic UI
//!
//! This module defines the fundamental data structures shared between the
//! device backend, the window controller and the frontend:
//! node identities, node records, packets and connection status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a node on the mesh
///
/// Displayed in Meshtastic user-id form, e.g. `!a1b2c3d4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Broadcast address used by the mesh for "all nodes"
    pub const BROADCAST: NodeId = NodeId(u32::MAX);

    /// Get the raw node number
    pub fn num(self) -> u32 {
        self.0
    }
}

impl From<u32> for NodeId {
    fn from(num: u32) -> Self {
        NodeId(num)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{:08x}", self.0)
    }
}

/// Name shown for nodes the device has no user record for
pub const UNKNOWN_NODE_NAME: &str = "Unknown Node";

/// A node from the device's node table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node identifier
    pub id: NodeId,
    /// Long name from the node's user record
    pub long_name: Option<String>,
    /// Short name (up to four characters) from the node's user record
    pub short_name: Option<String>,
}

impl NodeRecord {
    /// Create a record with a long name
    pub fn new(id: u32, long_name: impl Into<String>) -> Self {
        Self {
            id: NodeId(id),
            long_name: Some(long_name.into()),
            short_name: None,
        }
    }

    /// Create a record for a node without a user record
    pub fn unnamed(id: u32) -> Self {
        Self {
            id: NodeId(id),
            long_name: None,
            short_name: None,
        }
    }

    /// Set the short name
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    /// Name to show in the node list
    pub fn display_name(&self) -> &str {
        self.long_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_NODE_NAME)
    }
}

impl fmt::Display for NodeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.display_name())
    }
}

/// Application tag on a decoded packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortNum {
    /// Plain UTF-8 text message
    TextMessage,
    /// Position report
    Position,
    /// Node user info broadcast
    NodeInfo,
    /// Routing / ack packet
    Routing,
    /// Device or environment telemetry
    Telemetry,
    /// Any other application port
    Other(i32),
}

impl PortNum {
    /// Map a wire port number to a `PortNum`
    pub fn from_wire(value: i32) -> Self {
        match value {
            1 => PortNum::TextMessage,
            3 => PortNum::Position,
            4 => PortNum::NodeInfo,
            5 => PortNum::Routing,
            67 => PortNum::Telemetry,
            other => PortNum::Other(other),
        }
    }
}

impl fmt::Display for PortNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortNum::TextMessage => write!(f, "TEXT_MESSAGE_APP"),
            PortNum::Position => write!(f, "POSITION_APP"),
            PortNum::NodeInfo => write!(f, "NODEINFO_APP"),
            PortNum::Routing => write!(f, "ROUTING_APP"),
            PortNum::Telemetry => write!(f, "TELEMETRY_APP"),
            PortNum::Other(value) => write!(f, "PORT_{}", value),
        }
    }
}

/// Decoded section of a packet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Application port, if the device reported one
    pub portnum: Option<PortNum>,
    /// Raw payload bytes
    pub payload: Option<Vec<u8>>,
}

/// A packet delivered by the device's receive callback
///
/// Fields are optional because the device may deliver packets that are
/// still encrypted or otherwise incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    /// Sender
    pub from: Option<NodeId>,
    /// Destination
    pub to: Option<NodeId>,
    /// Channel index the packet arrived on
    pub channel: u32,
    /// Decoded payload, absent for packets the device could not decrypt
    pub decoded: Option<DecodedPayload>,
}

impl Packet {
    /// Build a text message packet
    pub fn text(from: u32, text: &str) -> Self {
        Self {
            from: Some(NodeId(from)),
            to: Some(NodeId::BROADCAST),
            channel: 0,
            decoded: Some(DecodedPayload {
                portnum: Some(PortNum::TextMessage),
                payload: Some(text.as_bytes().to_vec()),
            }),
        }
    }

    /// Build a packet on an arbitrary port
    pub fn with_port(from: u32, portnum: PortNum, payload: Vec<u8>) -> Self {
        Self {
            from: Some(NodeId(from)),
            to: Some(NodeId::BROADCAST),
            channel: 0,
            decoded: Some(DecodedPayload {
                portnum: Some(portnum),
                payload: Some(payload),
            }),
        }
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = self
            .from
            .map(|id| id.to_string())
            .unwrap_or_else(|| "?".to_string());
        let to = self
            .to
            .map(|id| id.to_string())
            .unwrap_or_else(|| "?".to_string());
        write!(f, "{{from: {}, to: {}, channel: {}", from, to, self.channel)?;
        match &self.decoded {
            Some(decoded) => {
                let port = decoded
                    .portnum
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let len = decoded.payload.as_ref().map(Vec::len).unwrap_or(0);
                write!(f, ", decoded: {{portnum: {}, payload: {} bytes}}}}", port, len)
            }
            None => write!(f, ", encrypted}}"),
        }
    }
}

/// Connection status with the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No device handle held
    #[default]
    Disconnected,
    /// Device handle held and configured
    Connected,
    /// Last connection attempt failed
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Error => write!(f, "Error"),
        }
    }
}
