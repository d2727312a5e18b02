//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod mock_helpers;

use meshtastic_ui::backend::{MockConnector, MockHandle};
use meshtastic_ui::controller::WindowController;
use meshtastic_ui::session::MessageLog;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// A controller wired to a mock radio with its log in a temp dir
pub struct TestRig {
    pub controller: WindowController,
    pub radio: MockHandle,
    pub log_path: PathBuf,
    _dir: TempDir,
}

impl TestRig {
    /// Build a rig around the given connector
    pub fn new(connector: MockConnector) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let log_path = dir.path().join("messages.log");
        let radio = connector.handle();
        let controller =
            WindowController::new(Box::new(connector), "/dev/ttyACM0", MessageLog::new(&log_path));

        Self {
            controller,
            radio,
            log_path,
            _dir: dir,
        }
    }

    /// Raw lines of the log file (empty when it does not exist)
    pub fn log_file_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log_path)
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
