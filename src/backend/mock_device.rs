//! Mock Device Implementation for Testing
//!
//! This module provides a simulated radio that can be used to run the
//! application and its tests without hardware.
//!
//! # Features
//!
//! - **Scripted node table**: nodes are supplied up front
//! - **Recorded sends**: every accepted text is kept for inspection
//! - **Packet injection**: [`MockHandle::inject`] runs the registered callback,
//!   optionally from a separate thread
//! - **Echo mode**: sent messages come back from a fake peer, from a timer thread
//! - **Failure injection**: refuse to open, or reject sends
//!
//! # Example
//!
//! ```ignore
//! use meshtastic_ui::backend::{MockConnector, DeviceConnector};
//!
//! let connector = MockConnector::new().with_node(NodeRecord::new(1, "Base"));
//! let handle = connector.handle();
//!
//! let device = connector.open("/dev/mock", callback)?;
//! handle.inject(Packet::text(1, "hello"));
//! assert_eq!(handle.sent(), Vec::<String>::new());
//! ```

use crate::error::{MeshUiError, Result};
use crate::types::{NodeId, NodeRecord, Packet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use super::device_trait::{DeviceConnector, DeviceStats, MeshDevice, PacketCallback};

/// Node number the echo peer sends from
pub const ECHO_NODE: NodeId = NodeId(0x0ec4_0000);

/// Delay before an echoed message arrives
const ECHO_DELAY: Duration = Duration::from_millis(300);

/// State shared between the connector, its devices and test handles
#[derive(Default)]
struct MockState {
    nodes: Vec<NodeRecord>,
    callback: Option<PacketCallback>,
    sent: Vec<String>,
    open_count: u32,
    close_count: u32,
    connected: bool,
    fail_open: Option<String>,
    fail_send: Option<String>,
    echo: bool,
    stats: DeviceStats,
}

type SharedMockState = Arc<Mutex<MockState>>;

fn lock(state: &SharedMockState) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Opens [`MockDevice`]s
#[derive(Clone, Default)]
pub struct MockConnector {
    state: SharedMockState,
}

impl MockConnector {
    /// Create a connector with an empty node table
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector with a few named nodes and echo enabled, for running the UI without a radio
    pub fn demo() -> Self {
        Self::new()
            .with_node(NodeRecord::new(0x1234_abcd, "Base Station").with_short_name("BASE"))
            .with_node(NodeRecord::new(0x5678_ef01, "Hilltop Relay").with_short_name("HILL"))
            .with_node(NodeRecord::unnamed(0x0bad_cafe))
            .with_node(NodeRecord::new(ECHO_NODE.num(), "Echo Bot").with_short_name("ECHO"))
            .with_echo(true)
    }

    /// Add a node to the node table
    pub fn with_node(self, node: NodeRecord) -> Self {
        lock(&self.state).nodes.push(node);
        self
    }

    /// Echo sent messages back through the callback
    pub fn with_echo(self, echo: bool) -> Self {
        lock(&self.state).echo = echo;
        self
    }

    /// Make `open` fail with the given message
    pub fn with_open_failure(self, message: impl Into<String>) -> Self {
        lock(&self.state).fail_open = Some(message.into());
        self
    }

    /// Make `send_text` fail with the given message
    pub fn with_send_failure(self, message: impl Into<String>) -> Self {
        lock(&self.state).fail_send = Some(message.into());
        self
    }

    /// Handle for injecting packets and inspecting the device
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: self.state.clone(),
        }
    }
}

impl DeviceConnector for MockConnector {
    fn open(&self, path: &str, on_receive: PacketCallback) -> Result<Box<dyn MeshDevice>> {
        let mut state = lock(&self.state);
        if let Some(ref message) = state.fail_open {
            return Err(MeshUiError::Device(message.clone()));
        }

        state.callback = Some(on_receive);
        state.open_count += 1;
        state.connected = true;
        tracing::info!("Mock device opened on {}", path);

        Ok(Box::new(MockDevice {
            path: path.to_string(),
            state: self.state.clone(),
            closed: false,
        }))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Simulated radio
pub struct MockDevice {
    path: String,
    state: SharedMockState,
    closed: bool,
}

impl MeshDevice for MockDevice {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn is_connected(&self) -> bool {
        !self.closed && lock(&self.state).connected
    }

    fn nodes(&self) -> Vec<NodeRecord> {
        lock(&self.state).nodes.clone()
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        if self.closed {
            return Err(MeshUiError::NotConnected);
        }

        let mut state = lock(&self.state);
        if let Some(ref message) = state.fail_send {
            let message = message.clone();
            state.stats.record_send(false);
            return Err(MeshUiError::Send(message));
        }

        state.sent.push(text.to_string());
        state.stats.record_send(true);

        if state.echo {
            if let Some(callback) = state.callback.clone() {
                let packet = Packet::text(ECHO_NODE.num(), &format!("echo: {}", text));
                let echo_state = self.state.clone();
                std::thread::spawn(move || {
                    std::thread::sleep(ECHO_DELAY);
                    lock(&echo_state).stats.record_packet(&packet);
                    callback(packet);
                });
            }
        }

        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let mut state = lock(&self.state);
        state.close_count += 1;
        state.connected = false;
        state.callback = None;
        tracing::info!("Mock device on {} closed", self.path);
    }

    fn stats(&self) -> DeviceStats {
        lock(&self.state).stats.clone()
    }
}

/// Test-side view of a mock device
#[derive(Clone)]
pub struct MockHandle {
    state: SharedMockState,
}

impl MockHandle {
    /// Deliver a packet through the registered callback on the calling thread
    ///
    /// Returns false when no device is open.
    pub fn inject(&self, packet: Packet) -> bool {
        let callback = {
            let mut state = lock(&self.state);
            let Some(callback) = state.callback.clone() else {
                return false;
            };
            state.stats.record_packet(&packet);
            callback
        };
        callback(packet);
        true
    }

    /// Deliver a packet from a freshly spawned thread
    pub fn inject_from_thread(&self, packet: Packet) -> JoinHandle<bool> {
        let handle = self.clone();
        std::thread::spawn(move || handle.inject(packet))
    }

    /// Replace the node table
    pub fn set_nodes(&self, nodes: Vec<NodeRecord>) {
        lock(&self.state).nodes = nodes;
    }

    /// Simulate the radio being unplugged
    pub fn drop_link(&self) {
        lock(&self.state).connected = false;
    }

    /// Texts accepted by `send_text`
    pub fn sent(&self) -> Vec<String> {
        lock(&self.state).sent.clone()
    }

    /// Number of successful opens
    pub fn open_count(&self) -> u32 {
        lock(&self.state).open_count
    }

    /// Number of times a device was released
    pub fn close_count(&self) -> u32 {
        lock(&self.state).close_count
    }
}
