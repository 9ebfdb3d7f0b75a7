//! Era captions over the evolution plinths, projected from world space.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::orchestrator::{Orchestrator, ViewMode};
use crate::ui::{ui_core, ACCENT};

pub fn caption_plugin(app: &mut App) {
    ui_core(app);
    app.add_systems(Update, caption_overlay_system);
}

fn caption_overlay_system(
    mut contexts: EguiContexts,
    orchestrator: Option<Res<Orchestrator>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
) {
    let Some(orchestrator) = orchestrator else {
        return;
    };
    if orchestrator.mode() != ViewMode::Evolution {
        return;
    }
    let Ok((camera, transform)) = cameras.get_single() else {
        return;
    };

    let painter = contexts
        .ctx_mut()
        .layer_painter(egui::LayerId::background());
    for (anchor, text) in orchestrator.evolution().stage().captions() {
        let Ok(position) = camera.world_to_viewport(transform, *anchor) else {
            continue;
        };
        painter.text(
            egui::pos2(position.x, position.y),
            egui::Align2::CENTER_CENTER,
            *text,
            egui::FontId::proportional(18.0),
            ACCENT,
        );
    }
}
