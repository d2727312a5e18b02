//! Frontend module for egui UI
//!
//! This module provides the main window using eframe/egui. All behaviour lives
//! in the [`WindowController`]; the frontend renders its state every frame and
//! turns clicks into [`AppAction`]s.
//!
//! # Layout
//!
//! - Menu bar (File: open log, recent logs, quit)
//! - Connection row (port, connect/disconnect, refresh nodes)
//! - Left side panel: node list
//! - Central panel: message log with load button
//! - Input row and status bar at the bottom
//!
//! # Submodules
//!
//! - `panels` - Reusable panel components
//! - `status_bar` - Bottom status bar
//! - `theme` - Dark palette and font scaling

mod panels;
pub mod status_bar;
pub mod theme;

pub use panels::*;

use crate::backend::list_serial_ports;
use crate::config::{AppConfig, AppState, BackendKind};
use crate::controller::WindowController;
use crate::session::MessageLog;
use crate::types::ConnectionStatus;
use status_bar::{render_status_bar, StatusBarContext};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// How often to repaint while connected, to notice a dropped link
const CONNECTED_REPAINT_INTERVAL: Duration = Duration::from_millis(500);

/// Actions the panels can emit
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Open the device on the entered path
    Connect,
    /// Release the device
    Disconnect,
    /// Repopulate the node list
    ListNodes,
    /// Reload the visible log from the log file
    LoadMessages,
    /// Send the input text
    SendMessage,
    /// Clear the visible log
    ClearLog,
    /// Rescan serial ports
    RefreshPorts,
    /// Switch to another log file and load it
    OpenLogFile(PathBuf),
}

/// Main application state for the Meshtastic window
pub struct MeshtasticApp {
    controller: WindowController,
    config: AppConfig,
    app_state: AppState,
    /// Port text box contents
    device_path_input: String,
    /// Serial ports found on the last scan
    available_ports: Vec<String>,
}

impl MeshtasticApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        mut controller: WindowController,
        config: AppConfig,
        app_state: AppState,
    ) -> Self {
        theme::apply(&cc.egui_ctx, &config.ui);

        let egui_ctx = cc.egui_ctx.clone();
        controller.set_repaint_hook(Arc::new(move || egui_ctx.request_repaint()));

        let device_path_input = controller.device_path().to_string();
        let available_ports = Self::scan_ports(&config);

        Self {
            controller,
            config,
            app_state,
            device_path_input,
            available_ports,
        }
    }

    fn scan_ports(config: &AppConfig) -> Vec<String> {
        match config.backend {
            BackendKind::Serial => list_serial_ports(),
            BackendKind::Mock => Vec::new(),
        }
    }

    fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Connect => {
                let path = self.device_path_input.trim().to_string();
                self.controller.set_device_path(path.clone());
                self.app_state.update_last_device(&path);
                self.controller.connect();
            }
            AppAction::Disconnect => self.controller.disconnect(),
            AppAction::ListNodes => self.controller.list_nodes(),
            AppAction::LoadMessages => self.controller.load_messages(),
            AppAction::SendMessage => self.controller.send_message(),
            AppAction::ClearLog => self.controller.clear_log(),
            AppAction::RefreshPorts => {
                self.available_ports = Self::scan_ports(&self.config);
                tracing::debug!("Found {} serial ports", self.available_ports.len());
            }
            AppAction::OpenLogFile(path) => {
                self.app_state.add_recent_log_file(&path);
                self.controller.set_message_log(MessageLog::new(path));
                self.controller.load_messages();
            }
        }
    }

    fn render_menu(&mut self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Log...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Message log", &["log", "txt"])
                        .pick_file()
                    {
                        actions.push(AppAction::OpenLogFile(path));
                    }
                    ui.close();
                }

                ui.menu_button("Recent Logs", |ui| {
                    if self.app_state.recent_log_files.is_empty() {
                        ui.label("No recent logs");
                    }
                    for path in &self.app_state.recent_log_files {
                        if ui.button(path.display().to_string()).clicked() {
                            actions.push(AppAction::OpenLogFile(path.clone()));
                            ui.close();
                        }
                    }
                });

                ui.separator();

                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    ui.close();
                }
            });
        });
    }
}

impl eframe::App for MeshtasticApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.poll();

        if self.controller.status() == ConnectionStatus::Connected {
            ctx.request_repaint_after(CONNECTED_REPAINT_INTERVAL);
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu(ui, &mut actions);
        });

        egui::TopBottomPanel::top("connection").show(ctx, |ui| {
            ConnectionPanel::render(
                ui,
                self.controller.status(),
                &mut self.device_path_input,
                &self.available_ports,
                &mut actions,
            );
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let stats = self.controller.stats();
            let log_file = self.controller.message_log_path().display().to_string();
            render_status_bar(
                ui,
                &StatusBarContext {
                    status: self.controller.status(),
                    device_path: self.controller.device_path(),
                    log_file: &log_file,
                    stats: stats.as_ref(),
                },
            );
        });

        egui::TopBottomPanel::bottom("input_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            InputBar::render(ui, self.controller.input_mut(), &mut actions);
            ui.add_space(4.0);
        });

        egui::SidePanel::left("node_list")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                NodeListPanel::render(ui, self.controller.node_list());
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            MessagePanel::render(ui, self.controller.log_lines(), &mut actions);
        });

        for action in actions {
            self.handle_action(action);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.close();

        if let Err(e) = self.app_state.save() {
            tracing::warn!("Failed to save app state: {}", e);
        }
    }
}
