//! Panel components for the frontend UI
//!
//! Each panel renders one area of the main window and reports clicks as
//! [`AppAction`]s instead of calling the controller directly.
//!
//! # Panels
//!
//! - [`ConnectionPanel`] - Device path, connect/disconnect, refresh nodes
//! - [`NodeListPanel`] - Node list from the last listing
//! - [`MessagePanel`] - Scrolling message log with the load button
//! - [`InputBar`] - Message input and send button

use super::AppAction;
use crate::types::ConnectionStatus;
use egui::{Color32, RichText, Ui};

/// Renders the connection controls
pub struct ConnectionPanel;

impl ConnectionPanel {
    /// Render the connection row
    pub fn render(
        ui: &mut Ui,
        status: ConnectionStatus,
        device_path: &mut String,
        available_ports: &[String],
        actions: &mut Vec<AppAction>,
    ) {
        ui.horizontal(|ui| {
            let (status_text, status_color) = match status {
                ConnectionStatus::Disconnected => ("Disconnected", Color32::GRAY),
                ConnectionStatus::Connected => ("Connected", Color32::GREEN),
                ConnectionStatus::Error => ("Error", Color32::RED),
            };
            ui.colored_label(status_color, format!("● {}", status_text));

            ui.separator();

            let editable = status != ConnectionStatus::Connected;
            ui.label("Port:");
            ui.add_enabled(
                editable,
                egui::TextEdit::singleline(device_path)
                    .desired_width(160.0)
                    .hint_text("/dev/ttyACM0"),
            );

            ui.add_enabled_ui(editable && !available_ports.is_empty(), |ui| {
                egui::ComboBox::from_id_salt("serial_ports")
                    .selected_text("Detected")
                    .show_ui(ui, |ui| {
                        for port in available_ports {
                            if ui.selectable_label(*device_path == *port, port.as_str()).clicked() {
                                *device_path = port.clone();
                            }
                        }
                    });
            });

            if ui
                .add_enabled(editable, egui::Button::new("⟳"))
                .on_hover_text("Rescan serial ports")
                .clicked()
            {
                actions.push(AppAction::RefreshPorts);
            }

            ui.separator();

            match status {
                ConnectionStatus::Connected => {
                    if ui.button("Disconnect").clicked() {
                        actions.push(AppAction::Disconnect);
                    }
                    if ui.button("Refresh Nodes").clicked() {
                        actions.push(AppAction::ListNodes);
                    }
                }
                ConnectionStatus::Disconnected | ConnectionStatus::Error => {
                    if ui.button("Connect to Meshtastic").clicked() {
                        actions.push(AppAction::Connect);
                    }
                }
            }
        });
    }
}

/// Renders the node list
pub struct NodeListPanel;

impl NodeListPanel {
    /// Render the node list
    pub fn render(ui: &mut Ui, nodes: &[String]) {
        ui.heading("Connected Nodes");
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("node_list")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for node in nodes {
                    ui.label(RichText::new(node).monospace());
                }
            });
    }
}

/// Renders the message log
pub struct MessagePanel;

impl MessagePanel {
    /// Render the message log and its buttons
    pub fn render(ui: &mut Ui, lines: &[String], actions: &mut Vec<AppAction>) {
        ui.heading("Received Messages");
        ui.separator();

        egui::TopBottomPanel::bottom("message_buttons")
            .show_separator_line(false)
            .show_inside(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Load Messages").clicked() {
                        actions.push(AppAction::LoadMessages);
                    }
                    if ui.button("Clear View").clicked() {
                        actions.push(AppAction::ClearLog);
                    }
                });
            });

        egui::ScrollArea::vertical()
            .id_salt("message_log")
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if lines.is_empty() {
                    ui.label(
                        RichText::new("Incoming messages will appear here...")
                            .italics()
                            .color(Color32::GRAY),
                    );
                }
                for line in lines {
                    ui.label(line.as_str());
                }
            });
    }
}

/// Renders the message input row
pub struct InputBar;

impl InputBar {
    /// Render the input and send button
    pub fn render(ui: &mut Ui, input: &mut String, actions: &mut Vec<AppAction>) {
        ui.horizontal(|ui| {
            let button_width = 120.0;
            let response = ui.add(
                egui::TextEdit::singleline(input)
                    .hint_text("Type a message to send...")
                    .desired_width(ui.available_width() - button_width),
            );

            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Send Message").clicked() || enter {
                actions.push(AppAction::SendMessage);
                response.request_focus();
            }
        });
    }
}
