//! Mirrors each scene group's graph into Bevy mesh entities.
//!
//! One Bevy entity per graph node with a visual. World transforms, visibility
//! and opacity are copied every frame; nodes released by the graph are
//! despawned and their mesh and material assets removed.

use std::collections::HashMap;

use bevy::color::Alpha;
use bevy::log::debug;
use bevy::prelude::*;
use bevy::render::render_resource::Face;
use bevy::transform::TransformSystem;

use crate::orchestrator::Orchestrator;
use crate::scene::{GroupVariant, NodeId, SceneGraph, Shape, Visual};

const OPACITY_EPSILON: f32 = 1e-3;

/// Marks the Bevy entity drawing one graph node.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MirrorOf {
    pub group: GroupVariant,
    pub node: NodeId,
}

#[derive(Debug)]
struct Mirrored {
    entity: Entity,
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
    opacity: f32,
}

#[derive(Resource, Default, Debug)]
pub struct SceneMirror {
    nodes: HashMap<(GroupVariant, NodeId), Mirrored>,
}

impl SceneMirror {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn entity(&self, group: GroupVariant, node: NodeId) -> Option<Entity> {
        self.nodes.get(&(group, node)).map(|m| m.entity)
    }
}

pub fn render_plugin(app: &mut App) {
    app.init_resource::<SceneMirror>().add_systems(
        PostUpdate,
        sync_scene_mirror.before(TransformSystem::TransformPropagate),
    );
}

pub fn sync_scene_mirror(
    mut commands: Commands,
    orchestrator: Option<ResMut<Orchestrator>>,
    mut mirror: ResMut<SceneMirror>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut mirrored: Query<(&mut Transform, &mut Visibility), With<MirrorOf>>,
) {
    let Some(mut orchestrator) = orchestrator else {
        return;
    };

    for (group_variant, group) in orchestrator.groups_mut() {
        let released = group.drain_released();
        if !released.is_empty() {
            debug!("releasing {} nodes from {:?}", released.len(), group_variant);
        }
        for node in released {
            if let Some(gone) = mirror.nodes.remove(&(group_variant, node)) {
                commands.entity(gone.entity).despawn_recursive();
                meshes.remove(&gone.mesh);
                materials.remove(&gone.material);
            }
        }

        let graph = group.graph();
        for (id, node) in graph.iter() {
            let Some(visual) = &node.visual else {
                continue;
            };
            let Some(world) = graph.world_transform(id) else {
                continue;
            };
            let transform = world.compute_transform();
            let visibility = node_visibility(graph, id, visual.opacity);
            let key = (group_variant, id);

            if let Some(existing) = mirror.nodes.get_mut(&key) {
                if let Ok((mut current, mut shown)) = mirrored.get_mut(existing.entity) {
                    *current = transform;
                    *shown = visibility;
                }
                if (existing.opacity - visual.opacity).abs() > OPACITY_EPSILON {
                    if let Some(material) = materials.get_mut(&existing.material) {
                        material.base_color = material.base_color.with_alpha(visual.opacity);
                    }
                    existing.opacity = visual.opacity;
                }
                continue;
            }

            let mesh = meshes.add(shape_mesh(&visual.shape));
            let material = materials.add(visual_material(visual));
            let marker = MirrorOf {
                group: group_variant,
                node: id,
            };
            let entity = match &visual.shape {
                Shape::Particles { points, .. } => commands
                    .spawn((marker, transform, visibility))
                    .with_children(|parent| {
                        for point in points.iter() {
                            parent.spawn((
                                Mesh3d(mesh.clone()),
                                MeshMaterial3d(material.clone()),
                                Transform::from_translation(*point),
                            ));
                        }
                    })
                    .id(),
                _ => commands
                    .spawn((
                        marker,
                        Mesh3d(mesh.clone()),
                        MeshMaterial3d(material.clone()),
                        transform,
                        visibility,
                    ))
                    .id(),
            };
            mirror.nodes.insert(
                key,
                Mirrored {
                    entity,
                    mesh,
                    material,
                    opacity: visual.opacity,
                },
            );
        }
    }
}

fn node_visibility(graph: &SceneGraph, id: NodeId, opacity: f32) -> Visibility {
    if graph.is_visible(id) && opacity > OPACITY_EPSILON {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

pub fn shape_mesh(shape: &Shape) -> Mesh {
    match shape {
        Shape::Cuboid(size) => Cuboid::new(size.x, size.y, size.z).into(),
        Shape::Frustum {
            radius_top,
            radius_bottom,
            height,
        } => ConicalFrustum {
            radius_top: *radius_top,
            radius_bottom: *radius_bottom,
            height: *height,
        }
        .into(),
        Shape::Sphere(radius) => Sphere::new(*radius).into(),
        Shape::Plane(size) => Plane3d::default().mesh().size(size.x, size.y).build(),
        Shape::Torus {
            minor_radius,
            major_radius,
        } => Torus::new(major_radius - minor_radius, major_radius + minor_radius).into(),
        Shape::Particles { size, .. } => Sphere::new(*size).into(),
    }
}

/// Translucent by default; glow visuals are unlit and drawn inside out.
pub fn visual_material(visual: &Visual) -> StandardMaterial {
    let plane = matches!(visual.shape, Shape::Plane(_));
    let cull_mode = if plane {
        None
    } else if visual.emissive {
        Some(Face::Front)
    } else {
        Some(Face::Back)
    };
    StandardMaterial {
        base_color: visual.color.with_alpha(visual.opacity),
        emissive: if visual.emissive {
            visual.color.to_linear()
        } else {
            LinearRgba::BLACK
        },
        unlit: visual.emissive,
        alpha_mode: AlphaMode::Blend,
        double_sided: plane,
        cull_mode,
        ..default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Category};
    use crate::config::ExplorerConfig;
    use crate::orchestrator::ViewMode;

    fn app() -> App {
        let config = ExplorerConfig {
            mode: ViewMode::Evolution,
            ..ExplorerConfig::default()
        };
        let orchestrator = Orchestrator::new(Catalog::builtin().unwrap(), &config).unwrap();
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<SceneMirror>()
            .insert_resource(orchestrator)
            .add_systems(Update, sync_scene_mirror);
        app
    }

    fn visual_nodes(orchestrator: &Orchestrator) -> usize {
        [orchestrator.gallery(), orchestrator.evolution()]
            .iter()
            .map(|group| {
                group
                    .graph()
                    .iter()
                    .filter(|(_, node)| node.visual.is_some())
                    .count()
            })
            .sum()
    }

    fn mirrored(app: &mut App) -> usize {
        app.world_mut()
            .query::<&MirrorOf>()
            .iter(app.world())
            .count()
    }

    #[test]
    fn every_visual_node_gets_one_entity() {
        let mut app = app();
        app.update();

        let expected = visual_nodes(app.world().resource::<Orchestrator>());
        assert_eq!(mirrored(&mut app), expected);
        assert_eq!(app.world().resource::<SceneMirror>().len(), expected);
    }

    #[test]
    fn reload_despawns_released_nodes_and_frees_assets() {
        let mut app = app();
        app.update();
        let meshes_before = app.world().resource::<Assets<Mesh>>().len();

        app.world_mut()
            .resource_mut::<Orchestrator>()
            .switch_component(Category::Storage);
        app.update();

        let expected = visual_nodes(app.world().resource::<Orchestrator>());
        assert_eq!(mirrored(&mut app), expected);
        assert!(app.world().resource::<Assets<Mesh>>().len() < meshes_before);
    }

    #[test]
    fn hidden_group_entities_are_hidden() {
        let mut app = app();
        app.update();

        let world = app.world();
        let gallery = world.resource::<Orchestrator>().gallery();
        let mirror = world.resource::<SceneMirror>();
        for (id, _) in gallery.graph().iter().filter(|(_, node)| node.visual.is_some()) {
            let entity = mirror.entity(GroupVariant::Gallery, id).unwrap();
            assert_eq!(world.get::<Visibility>(entity), Some(&Visibility::Hidden));
        }
    }

    #[test]
    fn glow_material_is_unlit_and_inside_out() {
        let glow = Visual::new(Shape::Sphere(1.0), Color::WHITE).opacity(0.3).emissive();
        let material = visual_material(&glow);
        assert!(material.unlit);
        assert_eq!(material.cull_mode, Some(Face::Front));
        assert_eq!(material.base_color.alpha(), 0.3);

        let floor = visual_material(&Visual::new(Shape::Plane(Vec2::ONE), Color::BLACK));
        assert_eq!(floor.cull_mode, None);
        assert!(floor.double_sided);
    }
}
