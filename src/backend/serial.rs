//! Serial radio backend built on the `meshtastic` crate
//!
//! The meshtastic stream API is async, so each open device gets a dedicated
//! worker thread that owns a tokio runtime. The worker:
//!
//! - connects and configures the stream API on the serial port
//! - maintains the node table from `MyInfo` / `NodeInfo` messages
//! - converts incoming mesh packets and runs the receive callback
//! - executes send requests coming from the UI thread
//!
//! `open` blocks until the radio reports that configuration is complete, or
//! until the connect timeout elapses.

use crate::error::{MeshUiError, Result};
use crate::types::{DecodedPayload, NodeId, NodeRecord, Packet, PortNum};
use crossbeam_channel::{bounded, Sender};
use meshtastic::api::StreamApi;
use meshtastic::packet::{PacketDestination, PacketRouter};
use meshtastic::protobufs::{from_radio, mesh_packet, FromRadio, MeshPacket};
use meshtastic::types::{MeshChannel, NodeId as RadioNodeId};
use meshtastic::utils;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::device_trait::{DeviceConnector, DeviceStats, MeshDevice, PacketCallback};

/// Channel index text messages are broadcast on
const PRIMARY_CHANNEL: u32 = 0;

/// Opens Meshtastic radios on serial ports
#[derive(Debug, Clone)]
pub struct SerialConnector {
    /// Baud rate override
    baud_rate: Option<u32>,
    /// Time allowed for connect + configure
    connect_timeout: Duration,
    /// Time allowed for a send to be accepted
    send_timeout: Duration,
}

impl SerialConnector {
    /// Create a connector
    pub fn new(baud_rate: Option<u32>, connect_timeout: Duration, send_timeout: Duration) -> Self {
        Self {
            baud_rate,
            connect_timeout,
            send_timeout,
        }
    }

    /// Create a connector from application config
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        Self::new(
            config.baud_rate,
            config.connect_timeout(),
            config.send_timeout(),
        )
    }
}

impl DeviceConnector for SerialConnector {
    fn open(&self, path: &str, on_receive: PacketCallback) -> Result<Box<dyn MeshDevice>> {
        let shared = Arc::new(Mutex::new(SerialShared::default()));
        let (command_tx, command_rx) = unbounded_channel();
        let (ready_tx, ready_rx) = bounded(1);

        let worker = SerialWorker {
            path: path.to_string(),
            baud_rate: self.baud_rate,
            shared: shared.clone(),
            on_receive,
            ready_tx,
        };

        let handle = std::thread::Builder::new()
            .name("meshtastic-serial".to_string())
            .spawn(move || worker.run(command_rx))?;

        match ready_rx.recv_timeout(self.connect_timeout) {
            Ok(Ok(())) => {
                tracing::info!("Serial device on {} configured", path);
                Ok(Box::new(SerialDevice {
                    path: path.to_string(),
                    commands: command_tx,
                    shared,
                    worker: Some(handle),
                    send_timeout: self.send_timeout,
                }))
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                // Dropping the command sender makes the worker exit once
                // configuration finishes or fails.
                drop(command_tx);
                Err(MeshUiError::Timeout(format!(
                    "device on {} did not finish configuration within {:?}",
                    path, self.connect_timeout
                )))
            }
        }
    }

    fn name(&self) -> &'static str {
        "serial"
    }
}

/// State the worker publishes for the UI thread
#[derive(Debug, Default)]
struct SerialShared {
    my_node: Option<NodeId>,
    nodes: BTreeMap<NodeId, NodeRecord>,
    link_up: bool,
    stats: DeviceStats,
}

fn lock(shared: &Mutex<SerialShared>) -> MutexGuard<'_, SerialShared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Requests from the UI thread to the worker
#[derive(Debug)]
enum SerialCommand {
    SendText {
        text: String,
        reply: Sender<Result<()>>,
    },
    Shutdown,
}

/// Handle to a radio served by a worker thread
pub struct SerialDevice {
    path: String,
    commands: UnboundedSender<SerialCommand>,
    shared: Arc<Mutex<SerialShared>>,
    worker: Option<JoinHandle<()>>,
    send_timeout: Duration,
}

impl MeshDevice for SerialDevice {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn is_connected(&self) -> bool {
        self.worker.is_some() && lock(&self.shared).link_up
    }

    fn nodes(&self) -> Vec<NodeRecord> {
        lock(&self.shared).nodes.values().cloned().collect()
    }

    fn send_text(&mut self, text: &str) -> Result<()> {
        if self.worker.is_none() {
            return Err(MeshUiError::NotConnected);
        }

        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(SerialCommand::SendText {
                text: text.to_string(),
                reply: reply_tx,
            })
            .map_err(|_| MeshUiError::Channel("serial worker has stopped".to_string()))?;

        let result = reply_rx.recv_timeout(self.send_timeout).unwrap_or_else(|_| {
            Err(MeshUiError::Timeout(format!(
                "device did not accept message within {:?}",
                self.send_timeout
            )))
        });
        lock(&self.shared).stats.record_send(result.is_ok());
        result
    }

    fn close(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        let _ = self.commands.send(SerialCommand::Shutdown);
        if worker.join().is_err() {
            tracing::error!("Serial worker for {} panicked", self.path);
        }
        lock(&self.shared).link_up = false;
        tracing::info!("Serial device on {} closed", self.path);
    }

    fn stats(&self) -> DeviceStats {
        lock(&self.shared).stats.clone()
    }
}

impl Drop for SerialDevice {
    fn drop(&mut self) {
        self.close();
    }
}

/// Router required by the stream API for outgoing packets
struct LocalRouter {
    source: RadioNodeId,
}

impl PacketRouter<(), Infallible> for LocalRouter {
    fn handle_packet_from_radio(&mut self, _packet: FromRadio) -> std::result::Result<(), Infallible> {
        Ok(())
    }

    fn handle_mesh_packet(&mut self, _packet: MeshPacket) -> std::result::Result<(), Infallible> {
        Ok(())
    }

    fn source_node_id(&self) -> RadioNodeId {
        self.source
    }
}

struct SerialWorker {
    path: String,
    baud_rate: Option<u32>,
    shared: Arc<Mutex<SerialShared>>,
    on_receive: PacketCallback,
    ready_tx: Sender<Result<()>>,
}

impl SerialWorker {
    fn run(self, commands: UnboundedReceiver<SerialCommand>) {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                let _ = self.ready_tx.send(Err(MeshUiError::Io(e)));
                return;
            }
        };

        let path = self.path.clone();
        runtime.block_on(self.serve(commands));
        tracing::debug!("Serial worker for {} exited", path);
    }

    async fn serve(self, mut commands: UnboundedReceiver<SerialCommand>) {
        let stream = match utils::stream::build_serial_stream(
            self.path.clone(),
            self.baud_rate,
            None,
            None,
        ) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = self.ready_tx.send(Err(MeshUiError::from_device_error(e)));
                return;
            }
        };

        let (listener, stream_api) = StreamApi::new().connect(stream).await;
        let config_id: u32 = utils::generate_rand_id();

        let listener_task = tokio::spawn(listen(
            listener,
            config_id,
            self.shared.clone(),
            self.on_receive.clone(),
            self.ready_tx.clone(),
        ));

        let mut stream_api = match stream_api.configure(config_id).await {
            Ok(api) => api,
            Err(e) => {
                listener_task.abort();
                let _ = self.ready_tx.send(Err(MeshUiError::from_device_error(e)));
                return;
            }
        };

        while let Some(command) = commands.recv().await {
            match command {
                SerialCommand::SendText { text, reply } => {
                    let source = lock(&self.shared)
                        .my_node
                        .map(|id| id.num())
                        .unwrap_or_default();
                    let mut router = LocalRouter {
                        source: RadioNodeId::new(source),
                    };
                    let result = match MeshChannel::new(PRIMARY_CHANNEL) {
                        Ok(channel) => stream_api
                            .send_text(&mut router, text, PacketDestination::Broadcast, true, channel)
                            .await
                            .map_err(|e| MeshUiError::Send(e.to_string())),
                        Err(e) => Err(MeshUiError::Send(e.to_string())),
                    };
                    let _ = reply.send(result);
                }
                SerialCommand::Shutdown => break,
            }
        }

        listener_task.abort();
        if let Err(e) = stream_api.disconnect().await {
            tracing::warn!("Error disconnecting from {}: {}", self.path, e);
        }
    }
}

/// Consume radio messages until the stream closes
async fn listen(
    mut listener: UnboundedReceiver<FromRadio>,
    config_id: u32,
    shared: Arc<Mutex<SerialShared>>,
    on_receive: PacketCallback,
    ready_tx: Sender<Result<()>>,
) {
    let mut ready = Some(ready_tx);
    lock(&shared).link_up = true;

    while let Some(message) = listener.recv().await {
        let Some(variant) = message.payload_variant else {
            continue;
        };

        match variant {
            from_radio::PayloadVariant::MyInfo(info) => {
                lock(&shared).my_node = Some(NodeId(info.my_node_num));
            }
            from_radio::PayloadVariant::NodeInfo(info) => {
                let record = match info.user {
                    Some(user) => NodeRecord {
                        id: NodeId(info.num),
                        long_name: Some(user.long_name).filter(|s| !s.is_empty()),
                        short_name: Some(user.short_name).filter(|s| !s.is_empty()),
                    },
                    None => NodeRecord::unnamed(info.num),
                };
                lock(&shared).nodes.insert(record.id, record);
            }
            from_radio::PayloadVariant::ConfigCompleteId(id) if id == config_id => {
                if let Some(tx) = ready.take() {
                    let _ = tx.send(Ok(()));
                }
            }
            from_radio::PayloadVariant::Packet(mesh) => {
                let packet = packet_from_mesh(&mesh);
                tracing::debug!("Raw packet received: {}", packet);
                lock(&shared).stats.record_packet(&packet);
                on_receive(packet);
            }
            _ => {}
        }
    }

    lock(&shared).link_up = false;
    tracing::warn!("Radio stream closed");
}

/// Convert a protobuf mesh packet into the application packet model
fn packet_from_mesh(mesh: &MeshPacket) -> Packet {
    let decoded = match &mesh.payload_variant {
        Some(mesh_packet::PayloadVariant::Decoded(data)) => Some(DecodedPayload {
            portnum: Some(PortNum::from_wire(data.portnum)),
            payload: Some(data.payload.clone()),
        }),
        _ => None,
    };

    Packet {
        from: Some(NodeId(mesh.from)),
        to: Some(NodeId(mesh.to)),
        channel: mesh.channel,
        decoded,
    }
}

/// List serial ports that may have a radio attached
pub fn list_serial_ports() -> Vec<String> {
    match utils::stream::available_serial_ports() {
        Ok(ports) => ports,
        Err(e) => {
            tracing::warn!("Failed to enumerate serial ports: {}", e);
            Vec::new()
        }
    }
}
