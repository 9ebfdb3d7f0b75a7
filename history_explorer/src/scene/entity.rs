//! Visual entities: one catalog record placed in a scene group.
//!
//! An entity owns a small node subtree in its group's [`SceneGraph`] and a
//! set of [`Animated`] properties. State setters only start animations; the
//! group's per-frame `tick` advances them and writes the result back into
//! the graph.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::CatalogRecord;
use crate::scene::appearance::{appearance, GLOW_COLOR};
use crate::scene::details::detail_parts;
use crate::scene::graph::{Node, NodeId, Role, SceneGraph, Shape, Visual};
use crate::scene::tween::{Animated, Easing, Segment};

pub const FULL_OPACITY: f32 = 1.0;
pub const DIMMED_OPACITY: f32 = 0.3;
pub const HOVER_SCALE: f32 = 1.1;

const GLOW_OPACITY: f32 = 0.3;
const GLOW_REST_SCALE: f32 = 1.1;
const GLOW_HIGHLIGHT_SCALE: f32 = 1.3;
const PULSE_SCALE: f32 = 1.2;
const MILESTONE_SPIN_PERIOD: f32 = 20.0;
const COMPONENT_SPIN_PERIOD: f32 = 15.0;
const BOB_HEIGHT: f32 = 0.5;
const BOB_HALF_PERIOD: f32 = 3.0;
const SHELL_PARTICLES: usize = 20;
const EXPLODE_SECS: f32 = 1.0;

/// Stable reference to an entity inside one load of a scene group.
/// The generation changes on every reload, so stale handles never resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresentationState {
    pub active: bool,
    pub highlighted: bool,
    pub hovered: bool,
    pub exploded: bool,
}

/// What a click did to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Pulsed,
    Exploded,
    Assembled,
}

#[derive(Debug)]
struct DetailPart {
    node: NodeId,
    offset: Animated<Vec3>,
    rotation: Animated<Vec3>,
}

#[derive(Debug)]
enum Variant {
    Milestone {
        pulse: Animated<f32>,
        burst: Animated<f32>,
        particles: NodeId,
    },
    Component {
        parts: Vec<DetailPart>,
    },
}

#[derive(Debug)]
pub struct VisualEntity {
    handle: EntityHandle,
    record: Arc<CatalogRecord>,
    position: Vec3,
    state: PresentationState,
    root: NodeId,
    body: NodeId,
    glow: NodeId,
    body_rotation: Quat,
    opacity: Animated<f32>,
    glow_opacity: Animated<f32>,
    glow_scale: Animated<f32>,
    hover_scale: Animated<f32>,
    variant: Variant,
    clock: f32,
    rng: StdRng,
    disposed: bool,
}

impl VisualEntity {
    /// Build the entity's node subtree under `parent`.
    /// Returns `None` if `parent` is not in the graph.
    pub fn spawn(
        handle: EntityHandle,
        record: Arc<CatalogRecord>,
        position: Vec3,
        graph: &mut SceneGraph,
        parent: NodeId,
        seed: u64,
    ) -> Option<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let look = appearance(&record);

        let root = graph.insert(
            parent,
            Node::new(Role::EntityRoot(handle)).with_transform(Transform::from_translation(position)),
        )?;
        let body = graph.insert(
            root,
            Node::new(Role::Part)
                .with_transform(Transform::from_rotation(look.rotation))
                .with_visual(Visual::new(look.shape.clone(), look.color).opacity(DIMMED_OPACITY))
                .pickable(),
        )?;
        let glow = graph.insert(
            body,
            Node::new(Role::Part)
                .with_transform(Transform::from_scale(Vec3::splat(GLOW_REST_SCALE)))
                .with_visual(Visual::new(look.shape, GLOW_COLOR).opacity(0.0).emissive()),
        )?;

        let variant = if record.category.is_component() {
            let rig = graph.insert(root, Node::new(Role::Part))?;
            let mut parts = Vec::new();
            for spec in detail_parts(record.category, record.era, look.size) {
                let mount = graph.insert(
                    rig,
                    Node::new(Role::Part).with_transform(Transform::from_translation(spec.mount)),
                )?;
                let node = graph.insert(
                    mount,
                    Node::new(Role::Part)
                        .with_visual(spec.visual.opacity(DIMMED_OPACITY))
                        .pickable(),
                )?;
                parts.push(DetailPart {
                    node,
                    offset: Animated::new(Vec3::ZERO),
                    rotation: Animated::new(Vec3::ZERO),
                });
            }
            Variant::Component { parts }
        } else {
            let points: Arc<[Vec3]> = (0..SHELL_PARTICLES)
                .map(|_| shell_point(&mut rng))
                .collect();
            let particles = graph.insert(
                root,
                Node::new(Role::Part).with_visual(
                    Visual::new(Shape::Particles { points, size: 0.05 }, GLOW_COLOR)
                        .opacity(0.0)
                        .emissive(),
                ),
            )?;
            Variant::Milestone {
                pulse: Animated::new(1.0),
                burst: Animated::new(0.0),
                particles,
            }
        };

        let entity = Self {
            handle,
            record,
            position,
            state: PresentationState::default(),
            root,
            body,
            glow,
            body_rotation: look.rotation,
            opacity: Animated::new(DIMMED_OPACITY),
            glow_opacity: Animated::new(0.0),
            glow_scale: Animated::new(GLOW_REST_SCALE),
            hover_scale: Animated::new(1.0),
            variant,
            clock: 0.0,
            rng,
            disposed: false,
        };
        entity.write_pose(graph);
        Some(entity)
    }

    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    pub fn record(&self) -> &Arc<CatalogRecord> {
        &self.record
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn state(&self) -> PresentationState {
        self.state
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_component(&self) -> bool {
        matches!(self.variant, Variant::Component { .. })
    }

    /// Current body opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity.value()
    }

    /// Current `(offset, rotation)` of every detail part. Empty for milestones.
    pub fn part_poses(&self) -> Vec<(Vec3, Vec3)> {
        match &self.variant {
            Variant::Component { parts } => parts
                .iter()
                .map(|part| (part.offset.value(), part.rotation.value()))
                .collect(),
            Variant::Milestone { .. } => Vec::new(),
        }
    }

    /// Returns true if the state changed and an animation started.
    pub fn set_active(&mut self, active: bool) -> bool {
        if self.disposed || self.state.active == active {
            return false;
        }
        self.state.active = active;
        let target = if active { FULL_OPACITY } else { DIMMED_OPACITY };
        self.opacity.animate(target, 0.5, Easing::QuadOut);
        true
    }

    pub fn set_highlighted(&mut self, highlighted: bool) -> bool {
        if self.disposed || self.state.highlighted == highlighted {
            return false;
        }
        self.state.highlighted = highlighted;
        let opacity = if highlighted { GLOW_OPACITY } else { 0.0 };
        self.glow_opacity.animate(opacity, 0.3, Easing::QuadOut);
        if let Variant::Milestone { .. } = self.variant {
            let scale = if highlighted {
                GLOW_HIGHLIGHT_SCALE
            } else {
                GLOW_REST_SCALE
            };
            self.glow_scale.animate(scale, 0.3, Easing::QuadOut);
        }
        true
    }

    pub fn set_hovered(&mut self, hovered: bool) -> bool {
        if self.disposed || self.state.hovered == hovered {
            return false;
        }
        self.state.hovered = hovered;
        let scale = if hovered { HOVER_SCALE } else { 1.0 };
        self.hover_scale.animate(scale, 0.2, Easing::QuadOut);
        true
    }

    /// Click reaction: milestones pulse and burst, components toggle between
    /// exploded and assembled. `None` once disposed.
    pub fn on_interact(&mut self) -> Option<Interaction> {
        if self.disposed {
            return None;
        }
        match &mut self.variant {
            Variant::Milestone { pulse, burst, .. } => {
                pulse.sequence([
                    Segment::new(PULSE_SCALE, 0.2, Easing::QuadOut),
                    Segment::new(1.0, 0.2, Easing::QuadOut),
                ]);
                burst.sequence([
                    Segment::new(1.0, 0.3, Easing::QuadOut),
                    Segment::new(0.0, 1.0, Easing::QuadOut).after(0.5),
                ]);
                Some(Interaction::Pulsed)
            }
            Variant::Component { parts } => {
                self.state.exploded = !self.state.exploded;
                if self.state.exploded {
                    for part in parts.iter_mut() {
                        let (offset, rotation) = explode_pose(&mut self.rng);
                        part.offset.animate(offset, EXPLODE_SECS, Easing::QuadOut);
                        part.rotation.animate(rotation, EXPLODE_SECS, Easing::QuadOut);
                    }
                    Some(Interaction::Exploded)
                } else {
                    for part in parts.iter_mut() {
                        part.offset.animate(Vec3::ZERO, EXPLODE_SECS, Easing::QuadOut);
                        part.rotation.animate(Vec3::ZERO, EXPLODE_SECS, Easing::QuadOut);
                    }
                    Some(Interaction::Assembled)
                }
            }
        }
    }

    /// Advance animations and idle motion by `dt` seconds and write the pose
    /// into the graph.
    pub fn tick(&mut self, dt: f32, graph: &mut SceneGraph) {
        if self.disposed {
            return;
        }
        self.clock += dt;
        self.opacity.tick(dt);
        self.glow_opacity.tick(dt);
        self.glow_scale.tick(dt);
        self.hover_scale.tick(dt);
        match &mut self.variant {
            Variant::Milestone { pulse, burst, .. } => {
                pulse.tick(dt);
                burst.tick(dt);
            }
            Variant::Component { parts } => {
                for part in parts.iter_mut() {
                    part.offset.tick(dt);
                    part.rotation.tick(dt);
                }
            }
        }
        self.write_pose(graph);
    }

    /// Stop every animation and release the entity's nodes.
    pub fn dispose(&mut self, graph: &mut SceneGraph) {
        if self.disposed {
            return;
        }
        self.opacity.cancel();
        self.glow_opacity.cancel();
        self.glow_scale.cancel();
        self.hover_scale.cancel();
        match &mut self.variant {
            Variant::Milestone { pulse, burst, .. } => {
                pulse.cancel();
                burst.cancel();
            }
            Variant::Component { parts } => {
                for part in parts.iter_mut() {
                    part.offset.cancel();
                    part.rotation.cancel();
                }
            }
        }
        graph.remove_subtree(self.root);
        self.disposed = true;
    }

    fn write_pose(&self, graph: &mut SceneGraph) {
        let opacity = self.opacity.value();
        let hover = self.hover_scale.value();

        match &self.variant {
            Variant::Milestone {
                pulse,
                burst,
                particles,
            } => {
                let lift = Vec3::Y * bob(self.clock);
                graph.set_transform(self.root, Transform::from_translation(self.position + lift));
                let spin = Quat::from_rotation_y(self.clock * TAU / MILESTONE_SPIN_PERIOD);
                graph.set_transform(
                    self.body,
                    Transform::from_rotation(spin * self.body_rotation)
                        .with_scale(Vec3::splat(hover * pulse.value())),
                );
                graph.set_transform(
                    *particles,
                    Transform::from_rotation(Quat::from_rotation_y(self.clock * 0.5)),
                );
                graph.set_opacity(*particles, burst.value());
            }
            Variant::Component { parts } => {
                let spin = Quat::from_rotation_y(self.clock * TAU / COMPONENT_SPIN_PERIOD);
                graph.set_transform(
                    self.root,
                    Transform::from_translation(self.position)
                        .with_rotation(spin)
                        .with_scale(Vec3::splat(hover)),
                );
                graph.set_transform(self.body, Transform::from_rotation(self.body_rotation));
                for part in parts {
                    let r = part.rotation.value();
                    graph.set_transform(
                        part.node,
                        Transform::from_translation(part.offset.value())
                            .with_rotation(Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)),
                    );
                    graph.set_opacity(part.node, opacity);
                }
            }
        }

        graph.set_opacity(self.body, opacity);
        graph.set_opacity(self.glow, self.glow_opacity.value());
        if let Some(node) = graph.get_mut(self.glow) {
            node.transform.scale = Vec3::splat(self.glow_scale.value());
        }
    }
}

/// Vertical offset of the idle bob: eases up for three seconds, then back.
fn bob(clock: f32) -> f32 {
    let phase = clock.rem_euclid(2.0 * BOB_HALF_PERIOD);
    let t = if phase < BOB_HALF_PERIOD {
        phase / BOB_HALF_PERIOD
    } else {
        (2.0 * BOB_HALF_PERIOD - phase) / BOB_HALF_PERIOD
    };
    BOB_HEIGHT * Easing::QuadInOut.apply(t)
}

fn shell_point(rng: &mut StdRng) -> Vec3 {
    let theta = rng.gen::<f32>() * TAU;
    let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
    let radius: f32 = rng.gen_range(2.0..4.0);
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Random outward offset (mostly upward) and tumble for one detail part.
fn explode_pose(rng: &mut StdRng) -> (Vec3, Vec3) {
    let direction = Vec3::new(
        (rng.gen::<f32>() - 0.5) * 2.0,
        rng.gen::<f32>() + 0.5,
        (rng.gen::<f32>() - 0.5) * 2.0,
    )
    .normalize();
    let distance: f32 = rng.gen_range(2.0..4.0);
    let rotation = Vec3::new(
        rng.gen::<f32>() * PI,
        rng.gen::<f32>() * PI,
        rng.gen::<f32>() * PI,
    );
    (direction * distance, rotation)
}
