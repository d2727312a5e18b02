//! Mock construction helpers

use meshtastic_ui::backend::{DeviceConnector, DeviceStats, MeshDevice, PacketCallback};
use meshtastic_ui::error::{MeshUiError, Result};
use meshtastic_ui::types::NodeRecord;
use mockall::mock;
use std::cell::RefCell;

mock! {
    pub Device {}

    impl MeshDevice for Device {
        fn path(&self) -> String;
        fn is_connected(&self) -> bool;
        fn nodes(&self) -> Vec<NodeRecord>;
        fn send_text(&mut self, text: &str) -> Result<()>;
        fn close(&mut self);
        fn stats(&self) -> DeviceStats;
    }
}

/// A mock device with permissive defaults for everything except `send_text` and `close`
pub fn lenient_mock_device() -> MockDevice {
    let mut device = MockDevice::new();
    device
        .expect_path()
        .returning(|| "/dev/ttyACM0".to_string());
    device.expect_is_connected().returning(|| true);
    device.expect_nodes().returning(Vec::new);
    device.expect_stats().returning(DeviceStats::default);
    device
}

/// Connector that hands out one prepared device
pub struct OneShotConnector {
    device: RefCell<Option<Box<dyn MeshDevice>>>,
}

impl OneShotConnector {
    pub fn new(device: impl MeshDevice + 'static) -> Self {
        Self {
            device: RefCell::new(Some(Box::new(device))),
        }
    }
}

impl DeviceConnector for OneShotConnector {
    fn open(&self, _path: &str, _on_receive: PacketCallback) -> Result<Box<dyn MeshDevice>> {
        self.device
            .borrow_mut()
            .take()
            .ok_or_else(|| MeshUiError::Device("device already opened".to_string()))
    }

    fn name(&self) -> &'static str {
        "one-shot"
    }
}
