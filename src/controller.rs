//! Window controller
//!
//! Owns the device handle, the visible message log, the node list and the
//! message input, and implements every user action. The frontend only renders
//! this state and forwards clicks.
//!
//! # Threading
//!
//! Devices deliver packets on their own threads. The callback registered on
//! connect only queues the packet and wakes the UI; [`WindowController::poll`]
//! drains the queue on the UI thread, so the visible log and the log file are
//! only ever touched from one thread.
//!
//! # Error handling
//!
//! Every failure becomes a line in the visible log (mirrored to the terminal
//! through `tracing`). Nothing here returns an error or panics.

use crate::backend::{DeviceConnector, DeviceStats, MeshDevice, PacketCallback};
use crate::message::{extract_text_message, sent_line, PacketError};
use crate::session::{is_not_found, MessageLog};
use crate::types::{ConnectionStatus, Packet};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::Arc;

/// Placeholder entry shown in the node list before the first listing
pub const NODE_LIST_PLACEHOLDER: &str = "Nodes will appear here...";

/// Header entry of a populated node list
pub const NODE_LIST_HEADER: &str = "Connected Nodes:";

/// Reported by actions that need a device
pub const NOT_CONNECTED: &str = "Device not connected. Please connect first.";

/// Maximum number of lines kept in the visible log
pub const MAX_SCROLLBACK: usize = 10_000;

/// Hook that asks the UI to redraw, called from device threads
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

/// State and actions behind the main window
pub struct WindowController {
    connector: Box<dyn DeviceConnector>,
    device: Option<Box<dyn MeshDevice>>,
    device_path: String,
    status: ConnectionStatus,
    message_log: MessageLog,
    log_lines: Vec<String>,
    node_list: Vec<String>,
    input: String,
    incoming_tx: Sender<Packet>,
    incoming_rx: Receiver<Packet>,
    repaint: Option<RepaintHook>,
}

impl WindowController {
    /// Create a disconnected controller
    pub fn new(
        connector: Box<dyn DeviceConnector>,
        device_path: impl Into<String>,
        message_log: MessageLog,
    ) -> Self {
        let (incoming_tx, incoming_rx) = unbounded();
        Self {
            connector,
            device: None,
            device_path: device_path.into(),
            status: ConnectionStatus::Disconnected,
            message_log,
            log_lines: Vec::new(),
            node_list: vec![NODE_LIST_PLACEHOLDER.to_string()],
            input: String::new(),
            incoming_tx,
            incoming_rx,
            repaint: None,
        }
    }

    /// Register a hook run whenever a packet is queued
    pub fn set_repaint_hook(&mut self, hook: RepaintHook) {
        self.repaint = Some(hook);
    }

    // ==================== Actions ====================

    /// Open the device and register the receive callback
    pub fn connect(&mut self) {
        if self.device.is_some() {
            self.log(format!("Already connected to {}", self.device_path));
            return;
        }

        self.log(format!(
            "Connecting to Meshtastic device on {}...",
            self.device_path
        ));

        let tx = self.incoming_tx.clone();
        let repaint = self.repaint.clone();
        let callback: PacketCallback = Arc::new(move |packet| {
            if tx.send(packet).is_ok() {
                if let Some(ref repaint) = repaint {
                    repaint();
                }
            }
        });

        match self.connector.open(&self.device_path, callback) {
            Ok(device) => {
                self.device = Some(device);
                self.status = ConnectionStatus::Connected;
                self.list_nodes();
                self.log("Connected to Meshtastic device!");
            }
            Err(e) => {
                self.status = ConnectionStatus::Error;
                self.log_error(format!("Error connecting to device: {}", e));
            }
        }
    }

    /// Handle one received packet
    pub fn on_receive(&mut self, packet: Packet) {
        tracing::debug!("Raw packet received: {}", packet);

        match extract_text_message(&packet) {
            Ok(message) => {
                let line = message.log_line();
                self.log(line.clone());
                if let Err(e) = self.message_log.append(&line) {
                    self.log_error(format!("Error processing message: {}", e));
                }
            }
            Err(e @ PacketError::NonText(_)) => self.log(e.to_string()),
            Err(e) => self.log_error(e.to_string()),
        }
    }

    /// Drain queued packets, returning how many were handled
    ///
    /// Also notices a link that dropped underneath us.
    pub fn poll(&mut self) -> usize {
        let packets: Vec<Packet> = self.incoming_rx.try_iter().collect();
        let count = packets.len();
        for packet in packets {
            self.on_receive(packet);
        }

        let link_lost = self.device.as_ref().is_some_and(|d| !d.is_connected());
        if link_lost {
            self.close();
            self.status = ConnectionStatus::Error;
            self.log_error("Connection to device lost.");
        }

        count
    }

    /// Replace the visible log with the contents of the log file
    pub fn load_messages(&mut self) {
        self.log_lines.clear();
        match self.message_log.load() {
            Ok(mut entries) => {
                tracing::info!(
                    "Loaded {} messages from {}",
                    entries.len(),
                    self.message_log.path().display()
                );
                // One slot goes to the notice so the notice itself survives.
                if entries.len() > MAX_SCROLLBACK {
                    let hidden = entries.len() - (MAX_SCROLLBACK - 1);
                    entries.drain(..hidden);
                    self.log_error(format!(
                        "{} older messages not shown; showing the last {}.",
                        hidden,
                        entries.len()
                    ));
                }
                self.log_lines.extend(entries);
            }
            Err(e) if is_not_found(&e) => self.log_error("No message log file found."),
            Err(e) => self.log_error(format!("Error loading messages: {}", e)),
        }
    }

    /// Repopulate the node list from the device's node table
    pub fn list_nodes(&mut self) {
        let Some(device) = self.device.as_ref() else {
            self.log_error(NOT_CONNECTED);
            return;
        };

        let nodes = device.nodes();
        self.node_list.clear();
        self.node_list.push(NODE_LIST_HEADER.to_string());
        for node in nodes {
            self.node_list.push(node.to_string());
            self.log(format!("Node {}: {}", node.id, node.display_name()));
        }
    }

    /// Send the input text to the mesh
    pub fn send_message(&mut self) {
        let Some(device) = self.device.as_mut() else {
            self.log_error(NOT_CONNECTED);
            return;
        };

        let message = self.input.trim().to_string();
        if message.is_empty() {
            self.log_error("Cannot send an empty message.");
            return;
        }

        match device.send_text(&message) {
            Ok(()) => {
                let line = sent_line(&message);
                self.log(line.clone());
                self.input.clear();
                if let Err(e) = self.message_log.append(&line) {
                    self.log_error(format!("Error saving sent message: {}", e));
                }
            }
            Err(e) => self.log_error(format!("Error sending message: {}", e)),
        }
    }

    /// Release the device handle if held
    pub fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            tracing::info!("Closing device on {}", device.path());
            device.close();
            self.status = ConnectionStatus::Disconnected;
        }
    }

    /// User-initiated disconnect
    pub fn disconnect(&mut self) {
        if self.device.is_none() {
            self.log_error(NOT_CONNECTED);
            return;
        }
        self.close();
        self.log("Disconnected from Meshtastic device.");
    }

    // ==================== State ====================

    /// Lines of the visible message log
    pub fn log_lines(&self) -> &[String] {
        &self.log_lines
    }

    /// Entries of the node list
    pub fn node_list(&self) -> &[String] {
        &self.node_list
    }

    /// Current contents of the message input
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Mutable message input, bound to the text box
    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// Set the message input
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Connection status
    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Check if a device handle is held
    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    /// Device path used by `connect`
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Change the device path; takes effect on the next connect
    pub fn set_device_path(&mut self, path: impl Into<String>) {
        self.device_path = path.into();
    }

    /// Message log file in use
    pub fn message_log_path(&self) -> PathBuf {
        self.message_log.path().to_path_buf()
    }

    /// Switch to another message log file
    pub fn set_message_log(&mut self, log: MessageLog) {
        tracing::info!("Using message log {}", log.path().display());
        self.message_log = log;
    }

    /// Traffic counters of the open device
    pub fn stats(&self) -> Option<DeviceStats> {
        self.device.as_ref().map(|d| d.stats())
    }

    /// Clear the visible log (the log file is untouched)
    pub fn clear_log(&mut self) {
        self.log_lines.clear();
    }

    // ==================== Internal ====================

    fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!("{}", line);
        self.push_line(line);
    }

    fn log_error(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!("{}", line);
        self.push_line(line);
    }

    fn push_line(&mut self, line: String) {
        self.log_lines.push(line);
        self.trim_scrollback();
    }

    fn trim_scrollback(&mut self) {
        if self.log_lines.len() > MAX_SCROLLBACK {
            let excess = self.log_lines.len() - MAX_SCROLLBACK;
            self.log_lines.drain(..excess);
        }
    }
}

impl Drop for WindowController {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockConnector, MockHandle};
    use crate::types::{NodeRecord, PortNum};
    use tempfile::TempDir;

    fn controller_with(connector: MockConnector) -> (WindowController, MockHandle, TempDir) {
        let dir = TempDir::new().unwrap();
        let handle = connector.handle();
        let log = MessageLog::new(dir.path().join("messages.log"));
        let controller = WindowController::new(Box::new(connector), "/dev/mock", log);
        (controller, handle, dir)
    }

    #[test]
    fn test_connect_lists_nodes() {
        let connector = MockConnector::new()
            .with_node(NodeRecord::new(0x10, "Base"))
            .with_node(NodeRecord::unnamed(0x20));
        let (mut controller, handle, _dir) = controller_with(connector);

        controller.connect();

        assert_eq!(controller.status(), ConnectionStatus::Connected);
        assert_eq!(handle.open_count(), 1);
        assert_eq!(
            controller.node_list(),
            &[
                "Connected Nodes:".to_string(),
                "!00000010: Base".to_string(),
                "!00000020: Unknown Node".to_string(),
            ]
        );
        assert_eq!(
            controller.log_lines(),
            &[
                "Connecting to Meshtastic device on /dev/mock...".to_string(),
                "Node !00000010: Base".to_string(),
                "Node !00000020: Unknown Node".to_string(),
                "Connected to Meshtastic device!".to_string(),
            ]
        );
    }

    #[test]
    fn test_connect_twice_keeps_one_connection() {
        let (mut controller, handle, _dir) = controller_with(MockConnector::new());
        controller.connect();
        controller.connect();
        assert_eq!(handle.open_count(), 1);
        assert_eq!(
            controller.log_lines().last().unwrap(),
            "Already connected to /dev/mock"
        );
    }

    #[test]
    fn test_connect_failure_is_logged() {
        let connector = MockConnector::new().with_open_failure("No such file or directory");
        let (mut controller, _handle, _dir) = controller_with(connector);

        controller.connect();

        assert_eq!(controller.status(), ConnectionStatus::Error);
        assert!(!controller.is_connected());
        assert_eq!(
            controller.log_lines().last().unwrap(),
            "Error connecting to device: Device error: No such file or directory"
        );
    }

    #[test]
    fn test_non_text_packet() {
        let (mut controller, _handle, dir) = controller_with(MockConnector::new());
        controller.on_receive(Packet::with_port(1, PortNum::Telemetry, vec![0; 4]));

        assert_eq!(controller.log_lines(), &["Received a non-text packet.".to_string()]);
        assert!(!dir.path().join("messages.log").exists());
    }

    #[test]
    fn test_poll_drains_injected_packets() {
        let (mut controller, handle, _dir) = controller_with(MockConnector::new());
        controller.connect();
        let before = controller.log_lines().len();

        handle.inject(Packet::text(1, "one"));
        handle.inject(Packet::text(2, "two"));
        assert_eq!(controller.log_lines().len(), before);

        assert_eq!(controller.poll(), 2);
        assert_eq!(controller.log_lines().len(), before + 2);
        assert_eq!(controller.log_lines().last().unwrap(), "Message from !00000002: two");
    }

    #[test]
    fn test_link_loss_detected_on_poll() {
        let (mut controller, handle, _dir) = controller_with(MockConnector::new());
        controller.connect();
        handle.drop_link();

        controller.poll();

        assert!(!controller.is_connected());
        assert_eq!(controller.status(), ConnectionStatus::Error);
        assert_eq!(handle.close_count(), 1);
        assert_eq!(controller.log_lines().last().unwrap(), "Connection to device lost.");
    }

    #[test]
    fn test_send_failure_keeps_input() {
        let connector = MockConnector::new().with_send_failure("queue full");
        let (mut controller, _handle, _dir) = controller_with(connector);
        controller.connect();
        controller.set_input("hello");

        controller.send_message();

        assert_eq!(controller.input(), "hello");
        assert_eq!(
            controller.log_lines().last().unwrap(),
            "Error sending message: Send error: queue full"
        );
    }

    #[test]
    fn test_repaint_hook_runs_on_packet() {
        let (mut controller, handle, _dir) = controller_with(MockConnector::new());
        let (tx, rx) = unbounded();
        controller.set_repaint_hook(Arc::new(move || {
            let _ = tx.send(());
        }));
        controller.connect();

        handle.inject(Packet::text(1, "wake"));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_disconnect() {
        let (mut controller, handle, _dir) = controller_with(MockConnector::new());
        controller.disconnect();
        assert_eq!(controller.log_lines().last().unwrap(), NOT_CONNECTED);

        controller.connect();
        controller.disconnect();
        assert_eq!(handle.close_count(), 1);
        assert_eq!(controller.status(), ConnectionStatus::Disconnected);
        assert_eq!(
            controller.log_lines().last().unwrap(),
            "Disconnected from Meshtastic device."
        );
    }

    #[test]
    fn test_scrollback_is_bounded() {
        let (mut controller, _handle, _dir) = controller_with(MockConnector::new());
        for _ in 0..(MAX_SCROLLBACK + 5) {
            controller.on_receive(Packet::with_port(1, PortNum::Routing, vec![]));
        }
        assert_eq!(controller.log_lines().len(), MAX_SCROLLBACK);
    }

    #[test]
    fn test_oversized_log_reports_hidden_entries() {
        let (mut controller, _handle, dir) = controller_with(MockConnector::new());
        let total = MAX_SCROLLBACK + 5;
        let content: String = (0..total).map(|i| format!("entry {}\n", i)).collect();
        std::fs::write(dir.path().join("messages.log"), content).unwrap();

        controller.load_messages();

        let lines = controller.log_lines();
        assert_eq!(lines.len(), MAX_SCROLLBACK);
        assert_eq!(
            lines[0],
            format!("6 older messages not shown; showing the last {}.", MAX_SCROLLBACK - 1)
        );
        assert_eq!(lines[1], "entry 6");
        assert_eq!(lines.last().unwrap(), &format!("entry {}", total - 1));
    }
}
