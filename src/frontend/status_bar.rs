//! Status bar panel — bottom bar showing connection and traffic counters.

use egui::{Color32, RichText, Ui};

use crate::backend::DeviceStats;
use crate::types::ConnectionStatus;

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub status: ConnectionStatus,
    pub device_path: &'a str,
    pub log_file: &'a str,
    pub stats: Option<&'a DeviceStats>,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let status_color = match ctx.status {
            ConnectionStatus::Connected => Color32::GREEN,
            ConnectionStatus::Disconnected => Color32::GRAY,
            ConnectionStatus::Error => Color32::RED,
        };
        ui.colored_label(status_color, "●");
        ui.label(RichText::new(format!("{}: {}", ctx.status, ctx.device_path)).small());

        if let Some(stats) = ctx.stats {
            ui.separator();
            ui.label(RichText::new(format!("Packets: {}", stats.packets_received)).small());

            ui.separator();
            ui.label(RichText::new(format!("Texts: {}", stats.text_messages)).small());

            ui.separator();
            ui.label(RichText::new(format!("Sent: {}", stats.messages_sent)).small());

            if stats.send_failures > 0 {
                ui.separator();
                ui.colored_label(
                    Color32::LIGHT_RED,
                    RichText::new(format!("Send failures: {}", stats.send_failures)).small(),
                );
            }

            if let Some(last) = stats.last_packet_at {
                ui.separator();
                ui.label(RichText::new(format!("Last packet: {}", last.format("%H:%M:%S"))).small());
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(format!("Log: {}", ctx.log_file)).small().weak());
        });
    });
}
