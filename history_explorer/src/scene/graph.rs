//! Arena scene graph owned by each scene group.
//!
//! Nodes carry local transforms and an optional renderable visual. World
//! transforms compose along parent links. Picking uses a manual ray/AABB
//! slab test over world-space bounds so it never competes with the UI layer
//! for pointer input.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;

use crate::scene::entity::EntityHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    GroupRoot,
    /// Stage scenery: floors, pillars, plinths, decoration.
    Backdrop,
    EntityRoot(EntityHandle),
    Part,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Cuboid(Vec3),
    Frustum {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Sphere(f32),
    /// Horizontal plane in the local XZ plane.
    Plane(Vec2),
    Torus {
        minor_radius: f32,
        major_radius: f32,
    },
    Particles {
        points: Arc<[Vec3]>,
        size: f32,
    },
}

impl Shape {
    pub fn half_extents(&self) -> Vec3 {
        match self {
            Shape::Cuboid(size) => *size * 0.5,
            Shape::Frustum {
                radius_top,
                radius_bottom,
                height,
            } => {
                let r = radius_top.max(*radius_bottom);
                Vec3::new(r, height * 0.5, r)
            }
            Shape::Sphere(radius) => Vec3::splat(*radius),
            Shape::Plane(size) => Vec3::new(size.x * 0.5, 0.01, size.y * 0.5),
            Shape::Torus {
                minor_radius,
                major_radius,
            } => {
                let r = major_radius + minor_radius;
                Vec3::new(r, *minor_radius, r)
            }
            Shape::Particles { points, size } => points
                .iter()
                .fold(Vec3::ZERO, |acc, p| acc.max(p.abs()))
                + Vec3::splat(*size),
        }
    }
}

/// Renderable description of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub shape: Shape,
    pub color: Color,
    pub opacity: f32,
    /// Unlit additive-looking overlay (glows, rings, particles).
    pub emissive: bool,
}

impl Visual {
    pub fn new(shape: Shape, color: Color) -> Self {
        Self {
            shape,
            color,
            opacity: 1.0,
            emissive: false,
        }
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn emissive(mut self) -> Self {
        self.emissive = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub role: Role,
    pub transform: Transform,
    pub visual: Option<Visual>,
    pub pickable: bool,
    pub visible: bool,
}

impl Node {
    pub fn new(role: Role) -> Self {
        Self {
            parent: None,
            role,
            transform: Transform::IDENTITY,
            visual: None,
            pickable: false,
            visible: true,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = Some(visual);
        self
    }

    pub fn pickable(mut self) -> Self {
        self.pickable = true;
        self
    }
}

/// Nearest pickable node along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub node: NodeId,
    pub distance: f32,
}

#[derive(Debug)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    root: NodeId,
    next_id: u32,
    released: Vec<NodeId>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, Node::new(Role::GroupRoot));
        Self {
            nodes,
            root,
            next_id: 1,
            released: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Attach `node` under `parent`. Returns `None` if the parent is gone.
    pub fn insert(&mut self, parent: NodeId, mut node: Node) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        Some(id)
    }

    /// Attach `node` directly under the group root, which always exists.
    pub fn insert_top(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.parent = Some(self.root);
        self.nodes.insert(id, node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.transform = transform;
        }
    }

    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        if let Some(visual) = self.nodes.get_mut(&id).and_then(|n| n.visual.as_mut()) {
            visual.opacity = opacity;
        }
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    /// Ancestors of `id`, starting with `id` itself and ending at the root.
    pub fn ancestry(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Node)> {
        std::iter::successors(
            self.nodes.get(&id).map(|node| (id, node)),
            move |(_, node)| {
                let parent = node.parent?;
                self.nodes.get(&parent).map(|n| (parent, n))
            },
        )
    }

    pub fn world_transform(&self, id: NodeId) -> Option<GlobalTransform> {
        let chain: Vec<&Transform> = self.ancestry(id).map(|(_, n)| &n.transform).collect();
        if chain.is_empty() {
            return None;
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(GlobalTransform::IDENTITY, |acc, local| acc.mul_transform(**local)),
        )
    }

    /// A node renders only if it and every ancestor are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut seen = false;
        for (_, node) in self.ancestry(id) {
            seen = true;
            if !node.visible {
                return false;
            }
        }
        seen
    }

    /// World-space bounds of a node's visual.
    pub fn world_aabb(&self, id: NodeId) -> Option<(Vec3, Vec3)> {
        let half = self.nodes.get(&id)?.visual.as_ref()?.shape.half_extents();
        let world = self.world_transform(id)?;
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in 0..8u8 {
            let local = Vec3::new(
                if corner & 1 == 0 { -half.x } else { half.x },
                if corner & 2 == 0 { -half.y } else { half.y },
                if corner & 4 == 0 { -half.z } else { half.z },
            );
            let point = world.transform_point(local);
            min = min.min(point);
            max = max.max(point);
        }
        Some((min, max))
    }

    /// Nearest visible pickable node hit by the ray.
    pub fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<RayHit> {
        let mut best: Option<RayHit> = None;
        for (&id, node) in &self.nodes {
            if !node.pickable || node.visual.is_none() || !self.is_visible(id) {
                continue;
            }
            let Some((min, max)) = self.world_aabb(id) else {
                continue;
            };
            if let Some(distance) = ray_aabb_intersect(origin, direction, min, max) {
                if best.is_none_or(|hit| distance < hit.distance) {
                    best = Some(RayHit { node: id, distance });
                }
            }
        }
        best
    }

    /// Walk up from `id` to the first entity root. Scenery resolves to `None`.
    pub fn owner(&self, id: NodeId) -> Option<EntityHandle> {
        self.ancestry(id).find_map(|(_, node)| match node.role {
            Role::EntityRoot(handle) => Some(handle),
            _ => None,
        })
    }

    /// `id` and everything below it.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        if !self.nodes.contains_key(&id) {
            return Vec::new();
        }
        self.nodes
            .keys()
            .copied()
            .filter(|&candidate| self.ancestry(candidate).any(|(a, _)| a == id))
            .collect()
    }

    /// Remove a subtree and queue its ids for resource release.
    /// The group root itself is never removed.
    pub fn remove_subtree(&mut self, id: NodeId) {
        let doomed = if id == self.root {
            let mut all = self.subtree(id);
            all.retain(|&n| n != self.root);
            all
        } else {
            self.subtree(id)
        };
        for node in doomed {
            self.nodes.remove(&node);
            self.released.push(node);
        }
    }

    /// Ids removed since the last drain.
    pub fn drain_released(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.released)
    }
}

pub(crate) fn ray_aabb_intersect(
    origin: Vec3,
    dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    let inv_dir = 1.0 / dir;
    let t1 = (aabb_min - origin) * inv_dir;
    let t2 = (aabb_max - origin) * inv_dir;
    let t_min = t1.min(t2);
    let t_max = t1.max(t2);
    let t_enter = t_min.x.max(t_min.y).max(t_min.z);
    let t_exit = t_max.x.min(t_max.y).min(t_max.z);
    if t_enter <= t_exit && t_exit > 0.0 {
        Some(t_enter.max(0.0))
    } else {
        None
    }
}
