//! Scene groups: the gallery of milestones and the component evolution line.
//!
//! A group owns its entities and their scene graph. Picking, hover and the
//! timeline mapping only run while the group is visible.

use std::sync::Arc;

use bevy::log::{debug, info};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::PickCamera;
use crate::catalog::{Catalog, CatalogRecord, Filter};
use crate::notify::{Subscribers, Subscription, SubscriptionId};
use crate::scene::entity::{EntityHandle, Interaction, VisualEntity};
use crate::scene::graph::{NodeId, SceneGraph};
use crate::scene::stage::{evolution_stage, gallery_stage, plinth_x, Stage};

const GALLERY_SPAN: f32 = 180.0;
const GALLERY_HEIGHT: f32 = 3.0;
const GALLERY_AISLE_OFFSET: f32 = 5.0;
const EVOLUTION_HEIGHT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupVariant {
    Gallery,
    Evolution,
}

/// Per-variant policy.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSettings {
    /// Half-width of the band around an entity's threshold that highlights it.
    pub highlight_tolerance: f32,
    /// Maximum entities per load; `None` shows every match.
    pub entity_cap: Option<usize>,
    /// Seed for decorative jitter and explode directions.
    pub seed: u64,
}

impl GroupSettings {
    pub fn gallery() -> Self {
        Self {
            highlight_tolerance: 5.0,
            entity_cap: None,
            seed: 0x5eed,
        }
    }

    pub fn evolution() -> Self {
        Self {
            highlight_tolerance: 10.0,
            entity_cap: Some(5),
            seed: 0x5eed,
        }
    }

    pub fn for_variant(variant: GroupVariant) -> Self {
        match variant {
            GroupVariant::Gallery => Self::gallery(),
            GroupVariant::Evolution => Self::evolution(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Pointer affordance the input layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Pointer,
}

/// Resolved pick: the owning entity plus the exact node the ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub entity: EntityHandle,
    pub node: NodeId,
    pub distance: f32,
}

pub struct SceneGroup {
    variant: GroupVariant,
    settings: GroupSettings,
    graph: SceneGraph,
    stage: Stage,
    entities: Vec<VisualEntity>,
    filter: Option<Filter>,
    generation: u32,
    visible: bool,
    disposed: bool,
    clock: f32,
    picks: Subscribers<Arc<CatalogRecord>>,
}

impl SceneGroup {
    pub fn new(variant: GroupVariant, settings: GroupSettings) -> Self {
        let mut graph = SceneGraph::new();
        let stage = match variant {
            GroupVariant::Gallery => gallery_stage(&mut graph),
            GroupVariant::Evolution => {
                let mut rng = StdRng::seed_from_u64(settings.seed);
                evolution_stage(&mut graph, &mut rng)
            }
        };
        Self {
            variant,
            settings,
            graph,
            stage,
            entities: Vec::new(),
            filter: None,
            generation: 0,
            visible: true,
            disposed: false,
            clock: 0.0,
            picks: Subscribers::new(),
        }
    }

    pub fn variant(&self) -> GroupVariant {
        self.variant
    }

    pub fn settings(&self) -> &GroupSettings {
        &self.settings
    }

    pub fn filter(&self) -> Option<Filter> {
        self.filter
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn entities(&self) -> &[VisualEntity] {
        &self.entities
    }

    /// Resolve a handle from the current load. Stale handles miss.
    pub fn entity(&self, handle: EntityHandle) -> Option<&VisualEntity> {
        self.entities
            .get(handle.index())
            .filter(|entity| entity.handle() == handle)
    }

    fn entity_mut(&mut self, handle: EntityHandle) -> Option<&mut VisualEntity> {
        self.entities
            .get_mut(handle.index())
            .filter(|entity| entity.handle() == handle)
    }

    /// Replace the entity set with the records matching `filter`.
    /// Previous entities are disposed first. Returns how many were built.
    pub fn load(&mut self, catalog: &Catalog, filter: Filter) -> usize {
        if self.disposed {
            return 0;
        }
        self.clear_entities();
        self.generation = self.generation.wrapping_add(1);
        self.filter = Some(filter);

        let mut records = catalog.select(filter);
        if let Some(cap) = self.settings.entity_cap {
            records.truncate(cap);
        }

        let total = records.len();
        let parent = self.graph.root();
        for (index, record) in records.into_iter().enumerate() {
            let handle = EntityHandle::new(index as u32, self.generation);
            let position = self.layout(index, total);
            let seed = self
                .settings
                .seed
                .wrapping_add(u64::from(self.generation) << 32)
                .wrapping_add(index as u64);
            if let Some(entity) =
                VisualEntity::spawn(handle, record, position, &mut self.graph, parent, seed)
            {
                self.entities.push(entity);
            }
        }

        info!(
            "{:?} group loaded {} entities for {:?}",
            self.variant,
            self.entities.len(),
            filter
        );
        self.entities.len()
    }

    /// Slot position of entity `index` out of `total`.
    pub fn layout(&self, index: usize, total: usize) -> Vec3 {
        match self.variant {
            GroupVariant::Gallery => {
                let x = if total > 1 {
                    -GALLERY_SPAN / 2.0 + index as f32 * GALLERY_SPAN / (total - 1) as f32
                } else {
                    0.0
                };
                let z = if index % 2 == 0 {
                    -GALLERY_AISLE_OFFSET
                } else {
                    GALLERY_AISLE_OFFSET
                };
                Vec3::new(x, GALLERY_HEIGHT, z)
            }
            GroupVariant::Evolution => Vec3::new(plinth_x(index), EVOLUTION_HEIGHT, 0.0),
        }
    }

    fn accepts_input(&self) -> bool {
        self.visible && !self.disposed
    }

    /// Nearest hit that resolves to an owned entity, with the node it hit.
    pub fn pick_detail(&self, ndc: Vec2, camera: &dyn PickCamera) -> Option<PickHit> {
        if !self.accepts_input() || self.entities.is_empty() {
            return None;
        }
        let ray = camera.pick_ray(ndc)?;
        let hit = self.graph.raycast(ray.origin, *ray.direction)?;
        let Some(owner) = self.graph.owner(hit.node) else {
            debug!("pick hit scenery node {:?}", hit.node);
            return None;
        };
        let entity = self.entity(owner)?;
        Some(PickHit {
            entity: entity.handle(),
            node: hit.node,
            distance: hit.distance,
        })
    }

    pub fn pick(&self, ndc: Vec2, camera: &dyn PickCamera) -> Option<EntityHandle> {
        self.pick_detail(ndc, camera).map(|hit| hit.entity)
    }

    /// Hover follows the pointer: only the entity under it stays hovered.
    pub fn on_pointer_move(&mut self, ndc: Vec2, camera: &dyn PickCamera) -> CursorHint {
        if !self.accepts_input() {
            return CursorHint::Default;
        }
        let target = self.pick(ndc, camera);
        for entity in &mut self.entities {
            entity.set_hovered(Some(entity.handle()) == target);
        }
        if target.is_some() {
            CursorHint::Pointer
        } else {
            CursorHint::Default
        }
    }

    /// Interact with the entity under the pointer and tell subscribers.
    pub fn on_pointer_click(
        &mut self,
        ndc: Vec2,
        camera: &dyn PickCamera,
    ) -> Option<(EntityHandle, Interaction)> {
        if !self.accepts_input() {
            return None;
        }
        let handle = self.pick(ndc, camera)?;
        let entity = self.entity_mut(handle)?;
        let interaction = entity.on_interact()?;
        let record = Arc::clone(entity.record());
        debug!("picked {} ({:?})", record.id, interaction);
        self.picks.notify(record);
        Some((handle, interaction))
    }

    /// Entity `i` of `n` activates once `time >= i / (n - 1) * 100` and is
    /// highlighted while `time` is within the tolerance of that threshold.
    pub fn apply_timeline_progress(&mut self, time: f32) {
        if !self.accepts_input() {
            return;
        }
        let total = self.entities.len();
        if total == 1 {
            self.entities[0].set_active(true);
            self.entities[0].set_highlighted(false);
            return;
        }
        let tolerance = self.settings.highlight_tolerance;
        for (index, entity) in self.entities.iter_mut().enumerate() {
            let threshold = activation_threshold(index, total);
            entity.set_active(time >= threshold);
            entity.set_highlighted((time - threshold).abs() < tolerance);
        }
    }

    /// Hidden groups neither render nor consume input. Hiding drops hover.
    pub fn set_visible(&mut self, visible: bool) {
        if self.disposed {
            return;
        }
        self.visible = visible;
        let root = self.graph.root();
        self.graph.set_visible(root, visible);
        if !visible {
            for entity in &mut self.entities {
                entity.set_hovered(false);
            }
        }
    }

    /// Advance animations by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if !self.accepts_input() {
            return;
        }
        self.clock += dt;
        self.stage.tick(self.clock, &mut self.graph);
        for entity in &mut self.entities {
            entity.tick(dt, &mut self.graph);
        }
    }

    pub fn subscribe_picks(&mut self) -> Subscription<Arc<CatalogRecord>> {
        self.picks.subscribe()
    }

    pub fn unsubscribe_picks(&mut self, id: SubscriptionId) -> bool {
        self.picks.unsubscribe(id)
    }

    /// Node ids freed since the last call, for the render layer to release.
    pub fn drain_released(&mut self) -> Vec<NodeId> {
        self.graph.drain_released()
    }

    /// Dispose every entity and the scenery. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.clear_entities();
        let root = self.graph.root();
        self.graph.remove_subtree(root);
        self.picks.clear();
        self.visible = false;
        self.disposed = true;
        info!("{:?} group disposed", self.variant);
    }

    fn clear_entities(&mut self) {
        for entity in &mut self.entities {
            entity.dispose(&mut self.graph);
        }
        self.entities.clear();
    }
}

/// Timeline value at which entity `index` of `total` (> 1) activates.
pub fn activation_threshold(index: usize, total: usize) -> f32 {
    index as f32 / (total - 1) as f32 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveRig;
    use crate::catalog::Category;

    fn evolution(category: Category) -> SceneGroup {
        let catalog = Catalog::builtin().unwrap();
        let mut group = SceneGroup::new(GroupVariant::Evolution, GroupSettings::evolution());
        group.load(&catalog, Filter::Category(category));
        group
    }

    fn gallery_with_settings(settings: GroupSettings, filter: Filter) -> SceneGroup {
        let catalog = Catalog::builtin().unwrap();
        let mut group = SceneGroup::new(GroupVariant::Gallery, settings);
        group.load(&catalog, filter);
        group
    }

    fn active(group: &SceneGroup) -> Vec<usize> {
        group
            .entities()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.state().active)
            .map(|(i, _)| i)
            .collect()
    }

    fn highlighted(group: &SceneGroup) -> Vec<usize> {
        group
            .entities()
            .iter()
            .enumerate()
            .filter(|(_, e)| e.state().highlighted)
            .map(|(i, _)| i)
            .collect()
    }

    fn straight_down_z(x: f32, y: f32) -> PerspectiveRig {
        PerspectiveRig::new(
            Transform::from_xyz(x, y, 30.0).looking_to(Vec3::NEG_Z, Vec3::Y),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
        )
    }

    #[test]
    fn five_entities_at_fifty_activate_first_three() {
        let mut group = evolution(Category::Cpu);
        assert_eq!(group.entities().len(), 5);
        group.apply_timeline_progress(50.0);
        assert_eq!(active(&group), vec![0, 1, 2]);
    }

    #[test]
    fn gallery_tolerance_highlights_only_nearby_threshold() {
        // Five memory records in a gallery-tolerance group.
        let mut group =
            gallery_with_settings(GroupSettings::gallery(), Filter::Category(Category::Memory));
        assert_eq!(group.entities().len(), 5);

        group.apply_timeline_progress(52.0);
        assert_eq!(highlighted(&group), vec![2]);

        group.apply_timeline_progress(57.0);
        assert!(highlighted(&group).is_empty());
    }

    #[test]
    fn evolution_tolerance_is_wider() {
        let mut group = evolution(Category::Storage);
        group.apply_timeline_progress(57.0);
        assert_eq!(highlighted(&group), vec![2]);
    }

    #[test]
    fn evolution_caps_at_five() {
        let catalog = Catalog::builtin().unwrap();
        let mut group = SceneGroup::new(GroupVariant::Evolution, GroupSettings::evolution());
        assert_eq!(group.load(&catalog, Filter::All), 5);
    }

    #[test]
    fn single_entity_is_always_active_never_highlighted() {
        let catalog = Catalog::builtin().unwrap();
        let mut group = SceneGroup::new(GroupVariant::Gallery, GroupSettings::gallery());
        group.load(&catalog, Filter::Era(crate::catalog::Era::Ancient));
        assert_eq!(group.entities().len(), 1);
        assert_eq!(group.entities()[0].position().x, 0.0);

        group.apply_timeline_progress(0.0);
        let state = group.entities()[0].state();
        assert!(state.active);
        assert!(!state.highlighted);
    }

    #[test]
    fn gallery_alternates_sides_across_the_span() {
        let group = gallery_with_settings(
            GroupSettings::gallery(),
            Filter::Category(Category::HistoricalNode),
        );
        let positions: Vec<Vec3> = group.entities().iter().map(|e| e.position()).collect();
        assert_eq!(positions.len(), 11);
        assert_eq!(positions[0], Vec3::new(-90.0, 3.0, -5.0));
        assert_eq!(positions[1].z, 5.0);
        assert!((positions[10].x - 90.0).abs() < 1e-4);
    }

    #[test]
    fn reload_disposes_previous_entities() {
        let catalog = Catalog::builtin().unwrap();
        let mut group = evolution(Category::Cpu);
        let stale = group.entities()[0].handle();
        let nodes_with_cpu = group.graph().len();

        group.load(&catalog, Filter::Category(Category::Storage));
        let released = group.drain_released();
        assert!(released.len() > 64);
        assert!(group.entity(stale).is_none());
        assert!(group.graph().len() < nodes_with_cpu);
    }

    #[test]
    fn pin_two_levels_below_the_entity_resolves_to_its_owner() {
        let group = evolution(Category::Cpu);
        // Front row of pins under the vacuum tube processor.
        let hit = group
            .pick_detail(Vec2::ZERO, &straight_down_z(-30.75, 0.6))
            .unwrap();
        let owner = group.entity(hit.entity).unwrap();
        assert_eq!(owner.record().id, "vacuum-tube-cpu");
        assert_ne!(hit.node, owner.root());
        assert!(group.graph().ancestry(hit.node).count() >= 4);
    }

    #[test]
    fn pillar_in_front_of_an_entity_is_an_unresolved_pick() {
        let group = gallery_with_settings(
            GroupSettings::gallery(),
            Filter::Category(Category::HistoricalNode),
        );
        // Entity 5 sits at x = 0, z = 5, behind the pillar at z = 8.
        assert!(group.pick(Vec2::ZERO, &straight_down_z(0.0, 3.0)).is_none());
        let first = group.pick(Vec2::ZERO, &straight_down_z(-90.0, 3.0)).unwrap();
        assert_eq!(first.index(), 0);
    }

    #[test]
    fn hover_moves_with_the_pointer() {
        let mut group = evolution(Category::Memory);
        let over_first = straight_down_z(-30.0, 2.0);
        let over_nothing = straight_down_z(-22.0, 2.0);

        assert_eq!(group.on_pointer_move(Vec2::ZERO, &over_first), CursorHint::Pointer);
        assert!(group.entities()[0].state().hovered);

        assert_eq!(group.on_pointer_move(Vec2::ZERO, &over_nothing), CursorHint::Default);
        assert!(group.entities().iter().all(|e| !e.state().hovered));
    }

    #[test]
    fn click_interacts_and_notifies_subscribers() {
        let mut group = evolution(Category::Cpu);
        let picks = group.subscribe_picks();
        let camera = straight_down_z(-15.0, 2.0);

        let (handle, interaction) = group.on_pointer_click(Vec2::ZERO, &camera).unwrap();
        assert_eq!(handle.index(), 1);
        assert_eq!(interaction, Interaction::Exploded);
        assert_eq!(picks.try_recv().unwrap().id, "transistor-cpu");

        group.unsubscribe_picks(picks.id());
        group.on_pointer_click(Vec2::ZERO, &camera);
        assert!(picks.try_recv().is_none());
    }

    #[test]
    fn hidden_group_ignores_picks_and_timeline() {
        let mut group = evolution(Category::Cpu);
        group.set_visible(false);
        group.apply_timeline_progress(100.0);
        assert!(active(&group).is_empty());
        assert!(group
            .pick(Vec2::ZERO, &straight_down_z(-30.0, 2.0))
            .is_none());

        group.set_visible(true);
        group.apply_timeline_progress(100.0);
        assert_eq!(active(&group).len(), 5);
    }

    #[test]
    fn empty_filter_leaves_group_empty_and_unpickable() {
        let full = Catalog::builtin().unwrap();
        let milestones = full
            .by_category(Category::HistoricalNode)
            .iter()
            .map(|record| (**record).clone())
            .collect();
        let catalog = Catalog::from_parts(milestones, full.timeline_points().to_vec()).unwrap();
        let mut group = SceneGroup::new(GroupVariant::Evolution, GroupSettings::evolution());
        assert_eq!(group.load(&catalog, Filter::Category(Category::Cpu)), 0);
        group.apply_timeline_progress(50.0);
        assert!(group.entities().is_empty());
        assert!(group.pick(Vec2::ZERO, &straight_down_z(-30.0, 2.0)).is_none());
    }

    #[test]
    fn dispose_empties_and_later_calls_are_safe() {
        let catalog = Catalog::builtin().unwrap();
        let mut group = evolution(Category::Cpu);
        group.dispose();

        assert!(group.entities().is_empty());
        assert_eq!(group.graph().len(), 1);
        group.apply_timeline_progress(50.0);
        group.tick(0.5);
        group.set_visible(true);
        assert!(group.pick(Vec2::ZERO, &straight_down_z(-30.0, 2.0)).is_none());
        assert_eq!(group.load(&catalog, Filter::All), 0);
        group.dispose();
    }

    #[test]
    fn threshold_spacing() {
        assert_eq!(activation_threshold(0, 5), 0.0);
        assert_eq!(activation_threshold(2, 5), 50.0);
        assert_eq!(activation_threshold(4, 5), 100.0);
    }
}
