//! Camera capabilities: pick rays for scene groups and the orbit controller.

mod orbit;

pub use orbit::{orbit_camera_plugin, OrbitCamera, HOME_POSITION};

use bevy::prelude::*;

/// Projects normalised device coordinates (x right, y up, both in `[-1, 1]`)
/// into a world-space pick ray.
pub trait PickCamera {
    fn pick_ray(&self, ndc: Vec2) -> Option<Ray3d>;
}

/// Pure perspective camera, for headless picking and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveRig {
    pub transform: Transform,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
}

impl PerspectiveRig {
    pub fn new(transform: Transform, fov_y: f32, aspect: f32) -> Self {
        Self {
            transform,
            fov_y,
            aspect,
        }
    }
}

impl PickCamera for PerspectiveRig {
    fn pick_ray(&self, ndc: Vec2) -> Option<Ray3d> {
        let half_height = (self.fov_y / 2.0).tan();
        let local = Vec3::new(
            ndc.x * half_height * self.aspect,
            ndc.y * half_height,
            -1.0,
        );
        let direction = Dir3::new(self.transform.rotation * local).ok()?;
        Some(Ray3d {
            origin: self.transform.translation,
            direction,
        })
    }
}

/// A live Bevy camera borrowed for one pick.
pub struct ViewportCamera<'a> {
    pub camera: &'a Camera,
    pub transform: &'a GlobalTransform,
}

impl PickCamera for ViewportCamera<'_> {
    fn pick_ray(&self, ndc: Vec2) -> Option<Ray3d> {
        let size = self.camera.logical_viewport_size()?;
        let cursor = Vec2::new((ndc.x + 1.0) / 2.0 * size.x, (1.0 - ndc.y) / 2.0 * size.y);
        self.camera.viewport_to_world(self.transform, cursor).ok()
    }
}
