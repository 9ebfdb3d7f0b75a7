//! Timeline panel: slider, clickable era markers, playback controls.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::orchestrator::{KeyIntent, Orchestrator};
use crate::timeline::{TIME_MAX, TIME_MIN};
use crate::ui::{apply_panel_style, ui_core, ACCENT};

const MARKER_HEIGHT: f32 = 22.0;
const RATES: [f32; 4] = [0.5, 1.0, 2.0, 4.0];

pub fn timeline_plugin(app: &mut App) {
    ui_core(app);
    app.add_systems(Update, timeline_ui_system);
}

fn timeline_ui_system(mut contexts: EguiContexts, orchestrator: Option<ResMut<Orchestrator>>) {
    let Some(mut orchestrator) = orchestrator else {
        return;
    };

    egui::TopBottomPanel::bottom("timeline")
        .frame(
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, 210))
                .inner_margin(egui::Margin::same(8))
                .corner_radius(egui::CornerRadius::same(0)),
        )
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);

            ui.horizontal(|ui| {
                if ui.button("<").on_hover_text("Previous era").clicked() {
                    orchestrator.handle_intent(KeyIntent::StepPrev);
                }
                let playing = orchestrator.timeline().is_auto_advancing();
                if ui.button(if playing { "Pause" } else { "Play" }).clicked() {
                    orchestrator.handle_intent(KeyIntent::TogglePlay);
                }
                if ui.button(">").on_hover_text("Next era").clicked() {
                    orchestrator.handle_intent(KeyIntent::StepNext);
                }
                if ui.button("Reset").clicked() {
                    orchestrator.handle_intent(KeyIntent::Reset);
                }
                if ui.button("Tour").clicked() {
                    orchestrator.handle_intent(KeyIntent::PlayTour);
                }

                let mut rate = orchestrator.timeline().settings().auto_advance_step;
                egui::ComboBox::from_id_salt("rate")
                    .selected_text(format!("{rate:.1}/tick"))
                    .width(70.0)
                    .show_ui(ui, |ui| {
                        for option in RATES {
                            ui.selectable_value(&mut rate, option, format!("{option:.1}"));
                        }
                    });
                if rate != orchestrator.timeline().settings().auto_advance_step {
                    orchestrator.set_auto_advance_rate(rate);
                }

                ui.separator();

                let mut time = orchestrator.timeline().current_time();
                let slider = ui.add(
                    egui::Slider::new(&mut time, TIME_MIN..=TIME_MAX)
                        .show_value(false)
                        .trailing_fill(true),
                );
                if slider.changed() {
                    orchestrator.seek(time);
                }
                ui.label(egui::RichText::new(format!("{time:>5.1}")).color(ACCENT));
            });

            ui.add_space(4.0);
            era_markers(ui, &mut orchestrator);
        });
}

/// One rectangle per time point, sized to the gap before the next point.
fn era_markers(ui: &mut egui::Ui, orchestrator: &mut Orchestrator) {
    let current = orchestrator
        .timeline()
        .current_era()
        .map(|era| era.threshold);
    let points = orchestrator.timeline().points().to_vec();
    let full_width = ui.available_width();
    let mut clicked = None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 2.0;
        for (i, point) in points.iter().enumerate() {
            let next = points.get(i + 1).map_or(TIME_MAX, |p| p.threshold);
            let share = ((next - point.threshold) / (TIME_MAX - TIME_MIN)).max(0.04);
            let width = (full_width * share - 2.0).max(8.0);

            let (response, painter) =
                ui.allocate_painter(egui::vec2(width, MARKER_HEIGHT), egui::Sense::click());
            let is_current = current == Some(point.threshold);
            let fill = if is_current {
                ACCENT
            } else {
                era_color(i, points.len())
            };
            painter.rect_filled(response.rect, 2.0, fill);
            painter.text(
                response.rect.left_center() + egui::vec2(4.0, 0.0),
                egui::Align2::LEFT_CENTER,
                &point.year,
                egui::FontId::monospace(10.0),
                egui::Color32::from_rgb(10, 10, 20),
            );

            if response.clicked() {
                clicked = Some(point.threshold);
            }
            response.on_hover_text(format!("{} ({})", point.label, point.year));
        }
    });

    if let Some(threshold) = clicked {
        orchestrator.seek(threshold);
    }
}

fn era_color(index: usize, total: usize) -> egui::Color32 {
    let t = index as f32 / total.max(1) as f32;
    let g = ((0.25 + 0.45 * t) * 255.0) as u8;
    egui::Color32::from_rgb(40, g, 120)
}
