//! Orbit controller: right-drag orbits around the focus, the wheel zooms,
//! `C` returns to the home view. Motion is damped towards the targets.

use std::f32::consts::PI;

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::ui::UiPointerCapture;

pub const HOME_POSITION: Vec3 = Vec3::new(0.0, 10.0, 30.0);

const MIN_RADIUS: f32 = 5.0;
const MAX_RADIUS: f32 = 100.0;
const MIN_POLAR: f32 = 0.05;
const MAX_POLAR: f32 = 0.8 * PI;
const ROTATE_SPEED: f32 = 0.005;
const ZOOM_STEP: f32 = 2.0;
const DAMPING: f32 = 8.0;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub focus: Vec3,
    radius: f32,
    azimuth: f32,
    polar: f32,
    target_radius: f32,
    target_azimuth: f32,
    target_polar: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(HOME_POSITION, Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Spherical coordinates of `eye` around `focus`.
    pub fn looking_from(eye: Vec3, focus: Vec3) -> Self {
        let offset = eye - focus;
        let radius = offset.length().clamp(MIN_RADIUS, MAX_RADIUS);
        let polar = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .acos()
            .clamp(MIN_POLAR, MAX_POLAR);
        let azimuth = offset.x.atan2(offset.z);
        Self {
            focus,
            radius,
            azimuth,
            polar,
            target_radius: radius,
            target_azimuth: azimuth,
            target_polar: polar,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn target_radius(&self) -> f32 {
        self.target_radius
    }

    pub fn target_polar(&self) -> f32 {
        self.target_polar
    }

    pub fn rotate(&mut self, delta: Vec2) {
        self.target_azimuth -= delta.x * ROTATE_SPEED;
        self.target_polar = (self.target_polar - delta.y * ROTATE_SPEED).clamp(MIN_POLAR, MAX_POLAR);
    }

    /// Positive `steps` zoom in.
    pub fn zoom(&mut self, steps: f32) {
        self.target_radius = (self.target_radius - steps * ZOOM_STEP).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move the current angles towards the targets and return the eye pose.
    pub fn advance(&mut self, dt: f32) -> Transform {
        let blend = (DAMPING * dt).min(1.0);
        self.radius += (self.target_radius - self.radius) * blend;
        self.azimuth += (self.target_azimuth - self.azimuth) * blend;
        self.polar += (self.target_polar - self.polar) * blend;
        self.transform()
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(orbit_position(self.focus, self.radius, self.azimuth, self.polar))
            .looking_at(self.focus, Vec3::Y)
    }
}

pub fn orbit_position(focus: Vec3, radius: f32, azimuth: f32, polar: f32) -> Vec3 {
    focus
        + radius
            * Vec3::new(
                polar.sin() * azimuth.sin(),
                polar.cos(),
                polar.sin() * azimuth.cos(),
            )
}

pub fn orbit_camera_plugin(app: &mut App) {
    app.add_systems(Update, (orbit_input_system, orbit_apply_system).chain());
}

fn orbit_input_system(
    mut cameras: Query<&mut OrbitCamera>,
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    capture: Option<Res<UiPointerCapture>>,
) {
    let drag: Vec2 = motion.read().map(|m| m.delta).sum();
    let scroll: f32 = wheel
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();
    let over_ui = capture.is_some_and(|c| c.0);

    for mut orbit in &mut cameras {
        if keys.just_pressed(KeyCode::KeyC) {
            orbit.reset();
            continue;
        }
        if over_ui {
            continue;
        }
        if buttons.pressed(MouseButton::Right) && drag != Vec2::ZERO {
            orbit.rotate(drag);
        }
        if scroll.abs() > f32::EPSILON {
            orbit.zoom(scroll);
        }
    }
}

fn orbit_apply_system(time: Res<Time>, mut cameras: Query<(&mut OrbitCamera, &mut Transform)>) {
    for (mut orbit, mut transform) in &mut cameras {
        *transform = orbit.advance(time.delta_secs());
    }
}
