//! Toasts for mode and component switches, stacked in the top-right corner.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::orchestrator::NoticeLevel;
use crate::ui::{ui_core, DisplayState};

const FADE_SECS: f32 = 0.5;

pub fn notification_plugin(app: &mut App) {
    ui_core(app);
    app.add_systems(Update, toast_system);
}

fn toast_system(mut contexts: EguiContexts, display: Res<DisplayState>) {
    if display.toasts.is_empty() {
        return;
    }
    egui::Area::new(egui::Id::new("toasts"))
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .interactable(false)
        .show(contexts.ctx_mut(), |ui| {
            for toast in &display.toasts {
                let alpha = fade(toast.remaining);
                let (r, g, b) = level_rgb(toast.level);
                egui::Frame::default()
                    .fill(egui::Color32::from_rgba_unmultiplied(r, g, b, (200.0 * alpha) as u8))
                    .inner_margin(egui::Margin::symmetric(12, 8))
                    .corner_radius(egui::CornerRadius::same(4))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(&toast.message)
                                .color(egui::Color32::from_white_alpha((255.0 * alpha) as u8)),
                        );
                    });
                ui.add_space(4.0);
            }
        });
}

/// Opacity for a toast with `remaining` seconds left.
fn fade(remaining: f32) -> f32 {
    (remaining / FADE_SECS).clamp(0.0, 1.0)
}

fn level_rgb(level: NoticeLevel) -> (u8, u8, u8) {
    match level {
        NoticeLevel::Info => (30, 90, 160),
        NoticeLevel::Success => (40, 140, 80),
        NoticeLevel::Warning => (180, 130, 30),
        NoticeLevel::Error => (170, 50, 50),
    }
}
