//! Window theme
//!
//! The dark palette mirrors the classic Meshtastic UI look: charcoal window,
//! slightly lighter widgets with grey borders.

use crate::config::UiPreferences;
use egui::{Color32, Stroke, Visuals};

/// Window background
pub const WINDOW_BG: Color32 = Color32::from_rgb(0x2b, 0x2b, 0x2b);
/// Lists, text boxes and buttons
pub const WIDGET_BG: Color32 = Color32::from_rgb(0x3c, 0x3f, 0x41);
/// Widget borders
pub const BORDER: Color32 = Color32::from_rgb(0x5c, 0x5c, 0x5c);
/// Hovered button
pub const HOVER_BG: Color32 = Color32::from_rgb(0x50, 0x53, 0x57);

/// Dark visuals with the application palette
pub fn dark_visuals() -> Visuals {
    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(Color32::WHITE);
    visuals.panel_fill = WINDOW_BG;
    visuals.window_fill = WINDOW_BG;
    visuals.extreme_bg_color = WIDGET_BG;
    visuals.faint_bg_color = WIDGET_BG;

    let border = Stroke::new(1.0, BORDER);
    visuals.widgets.noninteractive.bg_stroke = border;
    visuals.widgets.inactive.bg_fill = WIDGET_BG;
    visuals.widgets.inactive.weak_bg_fill = WIDGET_BG;
    visuals.widgets.inactive.bg_stroke = border;
    visuals.widgets.hovered.bg_fill = HOVER_BG;
    visuals.widgets.hovered.weak_bg_fill = HOVER_BG;
    visuals.widgets.hovered.bg_stroke = border;
    visuals.widgets.active.bg_stroke = border;
    visuals
}

/// Apply visuals and font scale to the context
pub fn apply(ctx: &egui::Context, prefs: &UiPreferences) {
    if prefs.dark_mode {
        ctx.set_visuals(dark_visuals());
    } else {
        ctx.set_visuals(Visuals::light());
    }

    let mut style = (*ctx.style()).clone();
    style.text_styles.iter_mut().for_each(|(_, font_id)| {
        font_id.size *= prefs.font_scale;
    });
    ctx.set_style(style);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_visuals_palette() {
        let visuals = dark_visuals();
        assert!(visuals.dark_mode);
        assert_eq!(visuals.panel_fill, WINDOW_BG);
        assert_eq!(visuals.widgets.hovered.weak_bg_fill, HOVER_BG);
        assert_eq!(visuals.widgets.inactive.bg_stroke.color, BORDER);
    }
}
