//! Text message extraction from received packets
//!
//! Turns a [`Packet`] delivered by the device into a [`TextMessage`], or a
//! [`PacketError`] whose `Display` is the line shown to the user.

use crate::types::{NodeId, Packet, PortNum};
use std::fmt;
use thiserror::Error;

/// Reasons a packet did not yield a text message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    /// A required field was absent
    #[error("Missing key in packet: '{0}'")]
    MissingKey(&'static str),

    /// Packet is on a port other than the text message port
    #[error("Received a non-text packet.")]
    NonText(PortNum),

    /// Payload bytes are not valid UTF-8
    #[error("Error decoding message payload.")]
    Decode(#[from] std::str::Utf8Error),
}

/// A decoded text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    /// Sender node
    pub sender: NodeId,
    /// Message body
    pub text: String,
}

impl TextMessage {
    /// Line written to the visible log and the message log file
    pub fn log_line(&self) -> String {
        format!("Message from {}: {}", self.sender, self.text)
    }
}

impl fmt::Display for TextMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.log_line())
    }
}

/// Extract a text message from a packet
///
/// Checks run in the order the fields are nested: `decoded`, `portnum`,
/// `payload`, then `from`.
pub fn extract_text_message(packet: &Packet) -> Result<TextMessage, PacketError> {
    let decoded = packet
        .decoded
        .as_ref()
        .ok_or(PacketError::MissingKey("decoded"))?;
    let portnum = decoded.portnum.ok_or(PacketError::MissingKey("portnum"))?;
    if portnum != PortNum::TextMessage {
        return Err(PacketError::NonText(portnum));
    }
    let payload = decoded
        .payload
        .as_deref()
        .ok_or(PacketError::MissingKey("payload"))?;
    let text = std::str::from_utf8(payload)?;
    let sender = packet.from.ok_or(PacketError::MissingKey("from"))?;

    Ok(TextMessage {
        sender,
        text: text.to_string(),
    })
}

/// Line logged after a message was handed to the device
pub fn sent_line(text: &str) -> String {
    format!("Sent message: {}", text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DecodedPayload;

    #[test]
    fn test_extract_text_message() {
        let packet = Packet::text(0xdeadbeef, "hello mesh");
        let message = extract_text_message(&packet).unwrap();
        assert_eq!(message.sender, NodeId(0xdeadbeef));
        assert_eq!(message.text, "hello mesh");
        assert_eq!(message.log_line(), "Message from !deadbeef: hello mesh");
    }

    #[test]
    fn test_non_text_packet() {
        let packet = Packet::with_port(1, PortNum::Position, vec![1, 2, 3]);
        let err = extract_text_message(&packet).unwrap_err();
        assert_eq!(err, PacketError::NonText(PortNum::Position));
        assert_eq!(err.to_string(), "Received a non-text packet.");
    }

    #[test]
    fn test_missing_keys() {
        let no_decoded = Packet {
            from: Some(NodeId(1)),
            ..Packet::default()
        };
        assert_eq!(
            extract_text_message(&no_decoded).unwrap_err().to_string(),
            "Missing key in packet: 'decoded'"
        );

        let no_port = Packet {
            decoded: Some(DecodedPayload {
                portnum: None,
                payload: Some(b"x".to_vec()),
            }),
            ..no_decoded.clone()
        };
        assert_eq!(
            extract_text_message(&no_port).unwrap_err(),
            PacketError::MissingKey("portnum")
        );

        let mut no_sender = Packet::text(1, "hi");
        no_sender.from = None;
        assert_eq!(
            extract_text_message(&no_sender).unwrap_err(),
            PacketError::MissingKey("from")
        );
    }

    #[test]
    fn test_invalid_utf8_payload() {
        let packet = Packet::with_port(7, PortNum::TextMessage, vec![0xff, 0xfe, 0x00]);
        let err = extract_text_message(&packet).unwrap_err();
        assert!(matches!(err, PacketError::Decode(_)));
        assert_eq!(err.to_string(), "Error decoding message payload.");
    }
}
