//! MeshDevice trait for a unified radio interface
//!
//! This module provides the common traits for all device implementations,
//! enabling both real radios (via the meshtastic crate) and mock devices for
//! testing.

use crate::error::Result;
use crate::types::{NodeRecord, Packet};
use chrono::{DateTime, Local};
use std::sync::Arc;

/// Callback invoked by a device for every packet it receives
///
/// Devices may call this from their own worker thread.
pub type PacketCallback = Arc<dyn Fn(Packet) + Send + Sync>;

/// Counters for device traffic
#[derive(Debug, Clone, Default)]
pub struct DeviceStats {
    /// Packets delivered to the receive callback
    pub packets_received: u64,
    /// Received packets on the text message port
    pub text_messages: u64,
    /// Text messages accepted by the device
    pub messages_sent: u64,
    /// Sends the device rejected or that timed out
    pub send_failures: u64,
    /// Local time the last packet arrived
    pub last_packet_at: Option<DateTime<Local>>,
}

impl DeviceStats {
    /// Record a received packet
    pub fn record_packet(&mut self, packet: &Packet) {
        self.packets_received += 1;
        let is_text = packet
            .decoded
            .as_ref()
            .and_then(|d| d.portnum)
            .is_some_and(|p| p == crate::types::PortNum::TextMessage);
        if is_text {
            self.text_messages += 1;
        }
        self.last_packet_at = Some(Local::now());
    }

    /// Record the outcome of a send
    pub fn record_send(&mut self, ok: bool) {
        if ok {
            self.messages_sent += 1;
        } else {
            self.send_failures += 1;
        }
    }
}

/// An open connection to a mesh radio
///
/// Implementations must be `Send` so the handle can move between threads.
///
/// # Example
///
/// ```ignore
/// fn print_nodes(device: &dyn MeshDevice) {
///     for node in device.nodes() {
///         println!("{}", node);
///     }
/// }
/// ```
pub trait MeshDevice: Send {
    /// Device path this handle was opened on
    fn path(&self) -> String;

    /// Check if the link to the radio is still up
    fn is_connected(&self) -> bool;

    /// Snapshot of the device's node table
    fn nodes(&self) -> Vec<NodeRecord>;

    /// Broadcast a text message on the primary channel
    fn send_text(&mut self, text: &str) -> Result<()>;

    /// Release the device; further calls are no-ops
    fn close(&mut self);

    /// Traffic counters
    fn stats(&self) -> DeviceStats;
}

/// Opens devices and registers the receive callback
pub trait DeviceConnector {
    /// Open the device at `path`, delivering received packets to `on_receive`
    fn open(&self, path: &str, on_receive: PacketCallback) -> Result<Box<dyn MeshDevice>>;

    /// Short name of this connector for logs
    fn name(&self) -> &'static str;
}
