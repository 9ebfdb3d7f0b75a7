//! Static scenery for the two scene groups.
//!
//! Floors, pillars and plinths are pickable so they occlude entities behind
//! them; a hit on scenery resolves to no entity.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::Rng;

use crate::scene::appearance::{hex_color, GLOW_COLOR};
use crate::scene::graph::{Node, NodeId, Role, SceneGraph, Shape, Visual};

pub const PLINTH_SPACING: f32 = 15.0;
const PLINTHS: usize = 5;
const BACKGROUND_PARTICLES: usize = 500;
const PARTICLE_SPIN: f32 = 0.06;
const ERA_CAPTIONS: [&str; PLINTHS] = ["1940s", "1950s", "1970s", "1990s", "2020s"];

/// Scenery handle kept by a scene group for idle animation.
#[derive(Debug, Clone, Default)]
pub struct Stage {
    spinner: Option<NodeId>,
    captions: Vec<(Vec3, &'static str)>,
}

impl Stage {
    pub fn tick(&self, clock: f32, graph: &mut SceneGraph) {
        if let Some(spinner) = self.spinner {
            graph.set_transform(
                spinner,
                Transform::from_rotation(Quat::from_rotation_y(clock * PARTICLE_SPIN)),
            );
        }
    }

    /// World anchor and text of each caption plaque.
    pub fn captions(&self) -> &[(Vec3, &'static str)] {
        &self.captions
    }
}

fn scenery(transform: Transform, visual: Visual) -> Node {
    Node::new(Role::Backdrop)
        .with_transform(transform)
        .with_visual(visual)
}

/// Hall with floor, two translucent walls, a ceiling and two rows of pillars.
pub fn gallery_stage(graph: &mut SceneGraph) -> Stage {
    graph.insert_top(
        scenery(
            Transform::IDENTITY,
            Visual::new(Shape::Plane(Vec2::new(200.0, 20.0)), hex_color(0x2a2a3e)).opacity(0.8),
        )
        .pickable(),
    );

    for z in [-10.0, 10.0] {
        graph.insert_top(scenery(
            Transform::from_xyz(0.0, 7.5, z).with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
            Visual::new(Shape::Plane(Vec2::new(200.0, 15.0)), hex_color(0x1a1a2e)).opacity(0.6),
        ));
    }

    for step in [-8, -4, 0, 4, 8] {
        for z in [-8.0, 8.0] {
            graph.insert_top(
                scenery(
                    Transform::from_xyz(step as f32 * 10.0, 7.5, z),
                    Visual::new(
                        Shape::Frustum {
                            radius_top: 0.5,
                            radius_bottom: 0.8,
                            height: 15.0,
                        },
                        hex_color(0x4a4a6a),
                    ),
                )
                .pickable(),
            );
        }
    }

    graph.insert_top(scenery(
        Transform::from_xyz(0.0, 15.0, 0.0),
        Visual::new(Shape::Plane(Vec2::new(200.0, 20.0)), hex_color(0x0f0f1a)).opacity(0.4),
    ));

    Stage::default()
}

/// X coordinate of plinth `index` (0..5), centred on the origin.
pub fn plinth_x(index: usize) -> f32 {
    (index as f32 - 2.0) * PLINTH_SPACING
}

/// Five plinths with glowing rims, a grid floor, caption plaques and a
/// slowly turning particle field.
pub fn evolution_stage(graph: &mut SceneGraph, rng: &mut StdRng) -> Stage {
    for index in 0..PLINTHS {
        let x = plinth_x(index);
        graph.insert_top(
            scenery(
                Transform::from_xyz(x, 0.0, 0.0),
                Visual::new(
                    Shape::Frustum {
                        radius_top: 3.0,
                        radius_bottom: 3.0,
                        height: 0.5,
                    },
                    hex_color(0x2a2a3e),
                )
                .opacity(0.8),
            )
            .pickable(),
        );
        graph.insert_top(scenery(
            Transform::from_xyz(x, 0.26, 0.0),
            Visual::new(
                Shape::Torus {
                    minor_radius: 0.2,
                    major_radius: 3.0,
                },
                GLOW_COLOR,
            )
            .opacity(0.6)
            .emissive(),
        ));
    }

    grid_floor(graph, 100.0, 20, -0.5);

    let mut captions = Vec::with_capacity(PLINTHS);
    for (index, caption) in ERA_CAPTIONS.iter().enumerate() {
        let anchor = Vec3::new(plinth_x(index), 5.0, -5.0);
        graph.insert_top(scenery(
            Transform::from_translation(anchor).with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
            Visual::new(Shape::Plane(Vec2::new(2.0, 0.5)), Color::WHITE).opacity(0.8),
        ));
        captions.push((anchor, *caption));
    }

    let points: Arc<[Vec3]> = (0..BACKGROUND_PARTICLES)
        .map(|_| {
            Vec3::new(
                (rng.gen::<f32>() - 0.5) * 100.0,
                rng.gen::<f32>() * 30.0,
                (rng.gen::<f32>() - 0.5) * 100.0,
            )
        })
        .collect();
    let spinner = graph.insert_top(scenery(
        Transform::IDENTITY,
        Visual::new(Shape::Particles { points, size: 0.05 }, hex_color(0x4d6bd9))
            .opacity(0.4)
            .emissive(),
    ));

    Stage {
        spinner: Some(spinner),
        captions,
    }
}

/// Grid of thin bars; the two centre lines are highlighted.
fn grid_floor(graph: &mut SceneGraph, size: f32, divisions: usize, y: f32) {
    let step = size / divisions as f32;
    for line in 0..=divisions {
        let offset = -size / 2.0 + line as f32 * step;
        let centre = line * 2 == divisions;
        let color = if centre {
            GLOW_COLOR
        } else {
            hex_color(0x16213e)
        };
        for along_x in [true, false] {
            let (translation, extent) = if along_x {
                (Vec3::new(0.0, y, offset), Vec3::new(size, 0.02, 0.02))
            } else {
                (Vec3::new(offset, y, 0.0), Vec3::new(0.02, 0.02, size))
            };
            graph.insert_top(scenery(
                Transform::from_translation(translation),
                Visual::new(Shape::Cuboid(extent), color).opacity(0.3),
            ));
        }
    }
}
