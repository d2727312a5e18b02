//! # Meshtastic UI: desktop chat for Meshtastic radios
//!
//! A small desktop application that connects to a Meshtastic radio over a
//! serial port, lists the nodes the radio knows about, and exchanges text
//! messages with the mesh. Received messages are kept in an append-only log
//! file that can be reloaded into the window.
//!
//! ## Architecture
//!
//! - **Backend**: [`backend::MeshDevice`] seam over the `meshtastic` crate, plus a mock radio
//! - **Controller**: [`controller::WindowController`] owns the device and implements every action
//! - **Frontend**: renders the controller's state using eframe/egui
//! - **Communication**: packets arrive on device threads and reach the UI through a crossbeam channel
//!
//! ## Configuration
//!
//! `config.toml` and `app_state.json` are stored in the platform-appropriate
//! data directory under `dev.meshtastic-ui`:
//!
//! - **Linux**: `~/.local/share/dev.meshtastic-ui/`
//! - **macOS**: `~/Library/Application Support/dev.meshtastic-ui/`
//! - **Windows**: `%APPDATA%\dev.meshtastic-ui\`
//!
//! ## Example
//!
//! ```ignore
//! use meshtastic_ui::{backend::connector_for, config::AppConfig, session::MessageLog};
//! use meshtastic_ui::controller::WindowController;
//!
//! let config = AppConfig::load_or_default();
//! let mut controller = WindowController::new(
//!     connector_for(&config),
//!     config.device_path.clone(),
//!     MessageLog::new(&config.log_file),
//! );
//!
//! controller.connect();
//! controller.set_input("hello mesh");
//! controller.send_message();
//! controller.poll();
//! controller.close();
//! ```

pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod frontend;
pub mod message;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use backend::{DeviceConnector, MeshDevice, MockConnector, SerialConnector};
pub use config::{AppConfig, AppState};
pub use controller::WindowController;
pub use error::{MeshUiError, Result};
pub use frontend::MeshtasticApp;
pub use message::{extract_text_message, PacketError, TextMessage};
pub use session::MessageLog;
pub use types::{ConnectionStatus, NodeId, NodeRecord, Packet, PortNum};
