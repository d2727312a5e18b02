//! Backend module for talking to the radio
//!
//! Everything below the window controller lives here. Radio framing, protobuf
//! decoding and serial I/O are delegated to the `meshtastic` crate; this module
//! only adapts it to the application's [`MeshDevice`] seam.
//!
//! # Components
//!
//! - [`MeshDevice`] / [`DeviceConnector`] - Traits the controller depends on
//! - [`SerialConnector`] - Real radios over a serial port (worker thread + tokio)
//! - [`MockConnector`] - In-process simulated radio for tests and demos
//!
//! # Example
//!
//! ```ignore
//! use meshtastic_ui::backend::{connector_for, PacketCallback};
//! use meshtastic_ui::config::AppConfig;
//!
//! let config = AppConfig::default();
//! let connector = connector_for(&config);
//! let callback: PacketCallback = Arc::new(|packet| println!("{}", packet));
//! let mut device = connector.open(&config.device_path, callback)?;
//! device.send_text("hello mesh")?;
//! device.close();
//! ```

pub mod device_trait;
pub mod mock_device;
pub mod serial;

pub use device_trait::{DeviceConnector, DeviceStats, MeshDevice, PacketCallback};
pub use mock_device::{MockConnector, MockDevice, MockHandle, ECHO_NODE};
pub use serial::{list_serial_ports, SerialConnector, SerialDevice};

use crate::config::{AppConfig, BackendKind};

/// Build the connector selected in the config
pub fn connector_for(config: &AppConfig) -> Box<dyn DeviceConnector> {
    match config.backend {
        BackendKind::Serial => Box::new(SerialConnector::from_app_config(config)),
        BackendKind::Mock => {
            tracing::info!("Using mock device backend");
            Box::new(MockConnector::demo())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_for_backend_kind() {
        let mut config = AppConfig::default();
        assert_eq!(connector_for(&config).name(), "serial");

        config.backend = BackendKind::Mock;
        assert_eq!(connector_for(&config).name(), "mock");
    }
}
