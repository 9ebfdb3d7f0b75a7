//! Routes keyboard and pointer input to the orchestrator.
//!
//! Pointer positions are converted to normalised device coordinates here;
//! the scene groups only ever see NDC and a pick camera.

use bevy::log::debug;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, SystemCursorIcon};
use bevy::winit::cursor::CursorIcon;

use crate::camera::{PickCamera, ViewportCamera};
use crate::catalog::Category;
use crate::orchestrator::{KeyIntent, Orchestrator};
use crate::scene::{advance_explorer, CursorHint};
use crate::ui::UiPointerCapture;

/// Last cursor affordance pushed to the window.
#[derive(Resource, Default, Debug)]
pub struct CursorState {
    pub hint: CursorHint,
}

pub fn input_plugin(app: &mut App) {
    app.init_resource::<CursorState>().add_systems(
        Update,
        (keyboard_system, pointer_system).before(advance_explorer),
    );
}

/// Window position (origin top-left, y down) to NDC (x right, y up).
pub fn cursor_to_ndc(cursor: Vec2, size: Vec2) -> Option<Vec2> {
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        cursor.x / size.x * 2.0 - 1.0,
        1.0 - cursor.y / size.y * 2.0,
    ))
}

pub fn intent_for_key(key: KeyCode) -> Option<KeyIntent> {
    match key {
        KeyCode::ArrowLeft => Some(KeyIntent::StepPrev),
        KeyCode::ArrowRight => Some(KeyIntent::StepNext),
        KeyCode::Home => Some(KeyIntent::SeekStart),
        KeyCode::End => Some(KeyIntent::SeekEnd),
        KeyCode::Space => Some(KeyIntent::TogglePlay),
        KeyCode::KeyR => Some(KeyIntent::Reset),
        KeyCode::KeyT => Some(KeyIntent::PlayTour),
        _ => None,
    }
}

fn component_for_key(key: KeyCode) -> Option<Category> {
    match key {
        KeyCode::Digit1 => Some(Category::Cpu),
        KeyCode::Digit2 => Some(Category::Memory),
        KeyCode::Digit3 => Some(Category::Storage),
        _ => None,
    }
}

fn keyboard_system(keys: Res<ButtonInput<KeyCode>>, orchestrator: Option<ResMut<Orchestrator>>) {
    let Some(mut orchestrator) = orchestrator else {
        return;
    };
    for &key in keys.get_just_pressed() {
        if let Some(intent) = intent_for_key(key) {
            orchestrator.handle_intent(intent);
        } else if key == KeyCode::KeyM {
            orchestrator.toggle_mode();
        } else if let Some(category) = component_for_key(key) {
            if !orchestrator.switch_component(category) {
                debug!("component keys only apply in evolution mode");
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn pointer_system(
    mut commands: Commands,
    buttons: Res<ButtonInput<MouseButton>>,
    mut moved: EventReader<CursorMoved>,
    windows: Query<(Entity, &Window), With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    capture: Option<Res<UiPointerCapture>>,
    orchestrator: Option<ResMut<Orchestrator>>,
    mut cursor: ResMut<CursorState>,
) {
    let Some(mut orchestrator) = orchestrator else {
        return;
    };
    let Ok((window_entity, window)) = windows.get_single() else {
        return;
    };

    let pointer_moved = moved.read().count() > 0;
    let clicked = buttons.just_pressed(MouseButton::Left);
    if !pointer_moved && !clicked {
        return;
    }
    let Some(ndc) = window
        .cursor_position()
        .and_then(|position| cursor_to_ndc(position, window.size()))
    else {
        return;
    };

    let viewport = cameras
        .get_single()
        .ok()
        .map(|(camera, transform)| ViewportCamera { camera, transform });
    let pick_camera = viewport.as_ref().map(|v| v as &dyn PickCamera);

    let over_ui = capture.is_some_and(|capture| capture.0);
    let hint = if over_ui {
        CursorHint::Default
    } else if pointer_moved {
        orchestrator
            .pointer_moved(ndc, pick_camera)
            .unwrap_or_default()
    } else {
        cursor.hint
    };

    if clicked && !over_ui {
        // A missing camera is already reported by the orchestrator.
        let _ = orchestrator.pointer_clicked(ndc, pick_camera);
    }

    if hint != cursor.hint {
        cursor.hint = hint;
        commands.entity(window_entity).insert(cursor_icon(hint));
    }
}

fn cursor_icon(hint: CursorHint) -> CursorIcon {
    match hint {
        CursorHint::Default => SystemCursorIcon::Default.into(),
        CursorHint::Pointer => SystemCursorIcon::Pointer.into(),
    }
}
