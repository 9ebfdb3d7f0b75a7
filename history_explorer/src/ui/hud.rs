//! HUD overlay: mode, era, progress, FPS, and the mode/component bar.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::catalog::Category;
use crate::orchestrator::{Orchestrator, ViewMode};
use crate::ui::{apply_panel_style, panel_frame, ui_core, ACCENT, MUTED};

const HELP_LINES: [(&str, &str); 9] = [
    ("Left / Right", "previous / next era"),
    ("Home / End", "start / end of timeline"),
    ("Space", "play / pause"),
    ("R", "reset"),
    ("T", "timeline tour"),
    ("M", "switch view"),
    ("1 2 3", "CPU / memory / storage"),
    ("C", "reset camera"),
    ("Right drag, wheel", "orbit, zoom"),
];

#[derive(Resource, Default, Debug)]
pub struct HudState {
    pub show_help: bool,
}

pub fn hud_plugin(app: &mut App) {
    ui_core(app);
    if !app.is_plugin_added::<FrameTimeDiagnosticsPlugin>() {
        app.add_plugins(FrameTimeDiagnosticsPlugin);
    }
    app.init_resource::<HudState>()
        .add_systems(Update, (help_toggle_system, hud_overlay_system, mode_bar_system));
}

fn help_toggle_system(keys: Res<ButtonInput<KeyCode>>, mut hud: ResMut<HudState>) {
    if keys.just_pressed(KeyCode::F1) {
        hud.show_help = !hud.show_help;
    }
}

fn hud_overlay_system(
    mut contexts: EguiContexts,
    hud: Res<HudState>,
    orchestrator: Option<Res<Orchestrator>>,
    diagnostics: Res<DiagnosticsStore>,
) {
    let Some(orchestrator) = orchestrator else {
        return;
    };
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|d| d.smoothed())
        .unwrap_or(0.0);
    let timeline = orchestrator.timeline();

    egui::Window::new("Chronoscope")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(panel_frame(210))
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);

            ui.label(
                egui::RichText::new(orchestrator.mode().label())
                    .size(16.0)
                    .color(ACCENT),
            );
            if orchestrator.mode() == ViewMode::Evolution {
                ui.label(format!("Line  {}", orchestrator.component().label()));
            }
            ui.add_space(4.0);

            if let Some(era) = timeline.current_era() {
                ui.label(format!("Era   {} ({})", era.label, era.year));
            }
            match timeline.next_era() {
                Some(next) => ui.label(format!("Next  {} ({})", next.label, next.year)),
                None => ui.label(egui::RichText::new("Next  -").color(MUTED)),
            };
            ui.add(
                egui::ProgressBar::new(timeline.progress())
                    .text(format!("{:.0}%", timeline.current_time()))
                    .fill(egui::Color32::from_rgb(0, 150, 190)),
            );
            ui.add_space(4.0);

            ui.separator();
            ui.label(format!(
                "Entities  {}",
                orchestrator.visible_group().entities().len()
            ));
            ui.label(format!("FPS  {fps:.0}"));

            if hud.show_help {
                ui.separator();
                egui::Grid::new("help").num_columns(2).show(ui, |ui| {
                    for (keys, action) in HELP_LINES {
                        ui.label(egui::RichText::new(keys).color(ACCENT));
                        ui.label(action);
                        ui.end_row();
                    }
                });
            } else {
                ui.label(egui::RichText::new("F1 for help").size(11.0).color(MUTED));
            }
        });
}

fn mode_bar_system(mut contexts: EguiContexts, orchestrator: Option<ResMut<Orchestrator>>) {
    let Some(mut orchestrator) = orchestrator else {
        return;
    };

    egui::Window::new("mode")
        .anchor(egui::Align2::CENTER_TOP, [0.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .title_bar(false)
        .frame(panel_frame(200))
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);
            ui.horizontal(|ui| {
                for mode in [ViewMode::Gallery, ViewMode::Evolution] {
                    let selected = orchestrator.mode() == mode;
                    if ui.selectable_label(selected, mode.label()).clicked() && !selected {
                        orchestrator.set_mode(mode);
                    }
                }

                if orchestrator.mode() == ViewMode::Evolution {
                    ui.separator();
                    for category in Category::COMPONENTS {
                        let selected = orchestrator.component() == category;
                        if ui.selectable_label(selected, category.label()).clicked() {
                            orchestrator.switch_component(category);
                        }
                    }
                }
            });
        });
}
