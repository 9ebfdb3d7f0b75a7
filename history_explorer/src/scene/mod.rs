mod appearance;
mod details;
mod entity;
mod graph;
mod group;
mod stage;
mod tween;

use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;

use crate::camera::{OrbitCamera, HOME_POSITION};
use crate::error::{ExplorerError, Surface};
use crate::orchestrator::Orchestrator;

pub use appearance::{appearance, hex_color, Appearance, GLOW_COLOR};
pub use details::{detail_parts, PartSpec};
pub use entity::{
    EntityHandle, Interaction, PresentationState, VisualEntity, DIMMED_OPACITY, FULL_OPACITY,
    HOVER_SCALE,
};
pub use graph::{Node, NodeId, RayHit, Role, SceneGraph, Shape, Visual};
pub use group::{
    activation_threshold, CursorHint, GroupSettings, GroupVariant, PickHit, SceneGroup,
};
pub use stage::{plinth_x, Stage, PLINTH_SPACING};
pub use tween::{Animated, Easing, Lerp, Segment};

const FOG_COLOR: u32 = 0x0a0a0a;

pub fn scene_plugin(app: &mut App) {
    app.add_systems(Startup, setup_scene)
        .add_systems(PostStartup, verify_surfaces)
        .add_systems(Update, advance_explorer);
}

/// Camera with fog and the orbit controller, plus ambient, key and accent
/// lights.
pub fn setup_scene(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(HOME_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        DistanceFog {
            color: hex_color(FOG_COLOR),
            falloff: FogFalloff::Linear {
                start: 50.0,
                end: 200.0,
            },
            ..default()
        },
        OrbitCamera::default(),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        PointLight {
            color: GLOW_COLOR,
            intensity: 1_000_000.0,
            range: 60.0,
            ..default()
        },
        Transform::from_xyz(0.0, 15.0, 0.0),
    ));
    commands.insert_resource(AmbientLight {
        color: hex_color(0x404040),
        brightness: 400.0,
    });
}

/// Without a 3D camera nothing can be shown or picked: stop the app.
pub fn verify_surfaces(cameras: Query<(), With<Camera3d>>, mut exit: EventWriter<AppExit>) {
    if cameras.is_empty() {
        error!("{}", ExplorerError::MissingSurface(Surface::Camera));
        exit.send(AppExit::error());
    }
}

pub(crate) fn advance_explorer(time: Res<Time>, orchestrator: Option<ResMut<Orchestrator>>) {
    if let Some(mut orchestrator) = orchestrator {
        orchestrator.tick(time.delta());
    }
}
