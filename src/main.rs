//! Meshtastic UI - Main Entry Point
//!
//! Desktop window for listing mesh nodes and chatting over a serial-connected
//! Meshtastic radio.

use meshtastic_ui::{
    backend::connector_for,
    config::{self, AppConfig, AppState},
    controller::WindowController,
    frontend::MeshtasticApp,
    session::MessageLog,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Diagnostics go to stderr and, when the data dir is usable, a daily file.
    let file_writer = config::ensure_app_data_dir()
        .ok()
        .map(|dir| tracing_appender::rolling::daily(dir.join(config::LOG_DIR), "meshtastic-ui.log"))
        .map(tracing_appender::non_blocking);
    let (file_layer, _file_guard) = match file_writer {
        Some((writer, guard)) => (
            Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,meshtastic_ui=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    tracing::info!("Starting Meshtastic UI");

    let config = AppConfig::load_or_default();
    let app_state = AppState::load_or_default();

    // First run: leave an editable config.toml with the defaults.
    if config::config_path().is_some_and(|path| !path.exists()) {
        match config.save() {
            Ok(()) => tracing::info!("Wrote default config"),
            Err(e) => tracing::warn!("Failed to write default config: {}", e),
        }
    }

    let device_path = app_state.startup_device_path(&config);

    let controller = WindowController::new(
        connector_for(&config),
        device_path,
        MessageLog::new(&config.log_file),
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 600.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("Meshtastic UI"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Meshtastic UI",
        native_options,
        Box::new(|cc| Ok(Box::new(MeshtasticApp::new(cc, controller, config, app_state)))),
    );

    tracing::info!("Shutting down...");
    result
}
