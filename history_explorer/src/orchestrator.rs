//! Application state: the catalog, both scene groups, the timeline and the
//! display feed, wired together.
//!
//! Time only reaches a group through [`Orchestrator::pump`], which forwards
//! the latest timeline value to the visible group and turns picked records
//! into display events.

use std::sync::Arc;
use std::time::Duration;

use bevy::log::{debug, info, warn};
use bevy::prelude::*;

use crate::camera::PickCamera;
use crate::catalog::{Catalog, CatalogRecord, Category, Filter};
use crate::config::ExplorerConfig;
use crate::error::{ExplorerError, Result, Surface};
use crate::notify::{Subscribers, Subscription};
use crate::scene::{CursorHint, EntityHandle, GroupVariant, SceneGroup};
use crate::timeline::{Direction, TimelineController, TIME_MAX, TIME_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Gallery,
    Evolution,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Gallery => ViewMode::Evolution,
            ViewMode::Evolution => ViewMode::Gallery,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Gallery => "Historical Gallery",
            ViewMode::Evolution => "Component Evolution",
        }
    }
}

/// Discrete commands from keys and buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    SeekStart,
    SeekEnd,
    StepPrev,
    StepNext,
    TogglePlay,
    Reset,
    PlayTour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// What the display sink is told.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayEvent {
    Record(Arc<CatalogRecord>),
    Notice { level: NoticeLevel, message: String },
}

#[derive(Resource)]
pub struct Orchestrator {
    catalog: Catalog,
    gallery: SceneGroup,
    evolution: SceneGroup,
    timeline: TimelineController,
    time_feed: Subscription<f32>,
    gallery_picks: Subscription<Arc<CatalogRecord>>,
    evolution_picks: Subscription<Arc<CatalogRecord>>,
    display: Subscribers<DisplayEvent>,
    mode: ViewMode,
    component: Category,
    tour: Duration,
    missing_camera_logged: bool,
    disposed: bool,
}

impl Orchestrator {
    pub fn new(catalog: Catalog, config: &ExplorerConfig) -> Result<Self> {
        let mut timeline =
            TimelineController::new(catalog.timeline_points().to_vec(), config.timeline_settings())?;
        let time_feed = timeline.subscribe();

        let mut gallery = SceneGroup::new(
            GroupVariant::Gallery,
            config.group_settings(GroupVariant::Gallery),
        );
        gallery.load(&catalog, Filter::Category(Category::HistoricalNode));
        let gallery_picks = gallery.subscribe_picks();

        let component = if config.component.is_component() {
            config.component
        } else {
            Category::Cpu
        };
        let mut evolution = SceneGroup::new(
            GroupVariant::Evolution,
            config.group_settings(GroupVariant::Evolution),
        );
        evolution.load(&catalog, Filter::Category(component));
        let evolution_picks = evolution.subscribe_picks();

        let mut orchestrator = Self {
            catalog,
            gallery,
            evolution,
            timeline,
            time_feed,
            gallery_picks,
            evolution_picks,
            display: Subscribers::new(),
            mode: config.mode,
            component,
            tour: config.tour,
            missing_camera_logged: false,
            disposed: false,
        };
        orchestrator.show(config.mode);
        info!(
            "explorer ready: {} records, starting in {}",
            orchestrator.catalog.len(),
            config.mode.label()
        );
        Ok(orchestrator)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn timeline(&self) -> &TimelineController {
        &self.timeline
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn component(&self) -> Category {
        self.component
    }

    pub fn gallery(&self) -> &SceneGroup {
        &self.gallery
    }

    pub fn evolution(&self) -> &SceneGroup {
        &self.evolution
    }

    pub fn visible_group(&self) -> &SceneGroup {
        match self.mode {
            ViewMode::Gallery => &self.gallery,
            ViewMode::Evolution => &self.evolution,
        }
    }

    fn visible_group_mut(&mut self) -> &mut SceneGroup {
        match self.mode {
            ViewMode::Gallery => &mut self.gallery,
            ViewMode::Evolution => &mut self.evolution,
        }
    }

    /// Both groups, for the render mirror.
    pub fn groups_mut(&mut self) -> [(GroupVariant, &mut SceneGroup); 2] {
        [
            (GroupVariant::Gallery, &mut self.gallery),
            (GroupVariant::Evolution, &mut self.evolution),
        ]
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn subscribe_display(&mut self) -> Subscription<DisplayEvent> {
        self.display.subscribe()
    }

    pub fn toggle_mode(&mut self) -> ViewMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.disposed || mode == self.mode {
            return;
        }
        self.show(mode);
        info!("switched to {}", mode.label());
        self.notice(NoticeLevel::Info, format!("Switched to {}", mode.label()));
    }

    /// Reload the evolution line with another component category.
    /// Only honoured in evolution mode and for component categories.
    pub fn switch_component(&mut self, category: Category) -> bool {
        if self.disposed || self.mode != ViewMode::Evolution || !category.is_component() {
            return false;
        }
        if category == self.component {
            return true;
        }
        self.component = category;
        self.evolution.load(&self.catalog, Filter::Category(category));
        let time = self.timeline.current_time();
        self.evolution.apply_timeline_progress(time);
        info!("evolution line now shows {}", category.label());
        self.notice(
            NoticeLevel::Success,
            format!("Showing {} evolution", category.label()),
        );
        true
    }

    pub fn handle_intent(&mut self, intent: KeyIntent) {
        if self.disposed {
            return;
        }
        match intent {
            KeyIntent::SeekStart => self.timeline.seek(TIME_MIN),
            KeyIntent::SeekEnd => self.timeline.seek(TIME_MAX),
            KeyIntent::StepPrev => {
                self.timeline.step(Direction::Backward);
            }
            KeyIntent::StepNext => {
                self.timeline.step(Direction::Forward);
            }
            KeyIntent::TogglePlay => {
                let playing = self.timeline.toggle_auto_advance();
                let message = if playing { "Auto-play started" } else { "Auto-play paused" };
                self.notice(NoticeLevel::Info, message.into());
            }
            KeyIntent::Reset => self.timeline.reset(),
            KeyIntent::PlayTour => self.play_tour(),
        }
        self.pump();
    }

    pub fn seek(&mut self, time: f32) {
        self.timeline.seek(time);
        self.pump();
    }

    pub fn set_auto_advance_rate(&mut self, step: f32) {
        self.timeline.set_auto_advance_rate(step);
    }

    /// Eased run from the current time to the end.
    pub fn play_tour(&mut self) {
        if self.disposed {
            return;
        }
        self.timeline.play_timed_transition(self.tour);
        self.notice(NoticeLevel::Info, "Timeline tour started".into());
    }

    pub fn pointer_moved(
        &mut self,
        ndc: Vec2,
        camera: Option<&dyn PickCamera>,
    ) -> Result<CursorHint> {
        let camera = self.require_camera(camera)?;
        Ok(self.visible_group_mut().on_pointer_move(ndc, camera))
    }

    /// Interact with whatever is under the pointer. The picked record is
    /// forwarded to the display feed before this returns.
    pub fn pointer_clicked(
        &mut self,
        ndc: Vec2,
        camera: Option<&dyn PickCamera>,
    ) -> Result<Option<EntityHandle>> {
        let camera = self.require_camera(camera)?;
        let picked = self
            .visible_group_mut()
            .on_pointer_click(ndc, camera)
            .map(|(handle, _)| handle);
        if picked.is_none() {
            debug!("click at {ndc} resolved to nothing");
        }
        self.pump();
        Ok(picked)
    }

    /// Advance the timeline and every animation by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        if self.disposed {
            return;
        }
        self.timeline.tick(dt);
        self.pump();
        let secs = dt.as_secs_f32();
        self.gallery.tick(secs);
        self.evolution.tick(secs);
    }

    /// Deliver pending timeline values and picks.
    pub fn pump(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(time) = self.time_feed.latest() {
            self.visible_group_mut().apply_timeline_progress(time);
        }
        let picked: Vec<_> = self
            .gallery_picks
            .try_iter()
            .chain(self.evolution_picks.try_iter())
            .collect();
        for record in picked {
            self.display.notify(DisplayEvent::Record(record));
        }
    }

    /// Tear everything down. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.timeline.dispose();
        self.gallery.dispose();
        self.evolution.dispose();
        self.display.clear();
        self.disposed = true;
        info!("explorer disposed");
    }

    fn show(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.gallery.set_visible(mode == ViewMode::Gallery);
        self.evolution.set_visible(mode == ViewMode::Evolution);
        let time = self.timeline.current_time();
        self.visible_group_mut().apply_timeline_progress(time);
    }

    fn require_camera<'a>(
        &mut self,
        camera: Option<&'a dyn PickCamera>,
    ) -> Result<&'a dyn PickCamera> {
        match camera {
            Some(camera) => Ok(camera),
            None => {
                if !self.missing_camera_logged {
                    warn!("no pick camera available; pointer input is ignored");
                    self.missing_camera_logged = true;
                }
                Err(ExplorerError::MissingSurface(Surface::Camera))
            }
        }
    }

    fn notice(&mut self, level: NoticeLevel, message: String) {
        self.display.notify(DisplayEvent::Notice { level, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveRig;
    use crate::scene::plinth_x;

    fn orchestrator(mode: ViewMode) -> Orchestrator {
        let config = ExplorerConfig {
            mode,
            ..ExplorerConfig::default()
        };
        Orchestrator::new(Catalog::builtin().unwrap(), &config).unwrap()
    }

    fn facing(x: f32, y: f32) -> PerspectiveRig {
        PerspectiveRig::new(
            Transform::from_xyz(x, y, 30.0).looking_to(Vec3::NEG_Z, Vec3::Y),
            std::f32::consts::FRAC_PI_4,
            16.0 / 9.0,
        )
    }

    fn notices(feed: &Subscription<DisplayEvent>) -> Vec<String> {
        feed.try_iter()
            .filter_map(|event| match event {
                DisplayEvent::Notice { message, .. } => Some(message),
                DisplayEvent::Record(_) => None,
            })
            .collect()
    }

    #[test]
    fn starts_with_only_the_configured_group_visible() {
        let orch = orchestrator(ViewMode::Evolution);
        assert!(orch.evolution().is_visible());
        assert!(!orch.gallery().is_visible());
        assert_eq!(orch.gallery().entities().len(), 11);
        assert_eq!(orch.evolution().entities().len(), 5);
    }

    #[test]
    fn toggle_mode_swaps_visibility_and_announces_it() {
        let mut orch = orchestrator(ViewMode::Gallery);
        let feed = orch.subscribe_display();
        assert_eq!(orch.toggle_mode(), ViewMode::Evolution);
        assert!(orch.evolution().is_visible());
        assert!(!orch.gallery().is_visible());
        assert_eq!(notices(&feed), vec!["Switched to Component Evolution"]);
    }

    #[test]
    fn newly_visible_group_receives_current_time() {
        let mut orch = orchestrator(ViewMode::Gallery);
        orch.seek(100.0);
        assert!(orch.evolution().entities().iter().all(|e| !e.state().active));

        orch.toggle_mode();
        assert!(orch.evolution().entities().iter().all(|e| e.state().active));
    }

    #[test]
    fn hidden_group_is_not_updated_by_seeks() {
        let mut orch = orchestrator(ViewMode::Gallery);
        orch.seek(100.0);
        assert!(orch.gallery().entities().iter().all(|e| e.state().active));
        assert!(orch.evolution().entities().iter().all(|e| !e.state().active));
    }

    #[test]
    fn component_switch_only_in_evolution_mode() {
        let mut orch = orchestrator(ViewMode::Gallery);
        assert!(!orch.switch_component(Category::Memory));
        assert_eq!(orch.component(), Category::Cpu);

        orch.toggle_mode();
        assert!(!orch.switch_component(Category::HistoricalNode));
        assert!(orch.switch_component(Category::Memory));
        assert_eq!(orch.evolution().entities()[0].record().id, "drum-memory");
    }

    #[test]
    fn pointer_without_camera_is_a_missing_surface() {
        let mut orch = orchestrator(ViewMode::Evolution);
        assert!(matches!(
            orch.pointer_moved(Vec2::ZERO, None),
            Err(ExplorerError::MissingSurface(Surface::Camera))
        ));
        assert!(orch.pointer_clicked(Vec2::ZERO, None).is_err());
    }

    #[test]
    fn click_forwards_the_record_to_the_display_feed() {
        let mut orch = orchestrator(ViewMode::Evolution);
        let feed = orch.subscribe_display();
        let camera = facing(plinth_x(3), 2.0);

        let handle = orch.pointer_clicked(Vec2::ZERO, Some(&camera)).unwrap();
        assert_eq!(handle.map(|h| h.index()), Some(3));
        match feed.try_recv() {
            Some(DisplayEvent::Record(record)) => assert_eq!(record.id, "microprocessor-cpu"),
            other => panic!("expected a record, got {other:?}"),
        }
    }

    #[test]
    fn hover_reports_pointer_hint() {
        let mut orch = orchestrator(ViewMode::Evolution);
        let over = facing(plinth_x(0), 2.0);
        let off = facing(plinth_x(0) + 7.0, 2.0);
        assert_eq!(orch.pointer_moved(Vec2::ZERO, Some(&over)).unwrap(), CursorHint::Pointer);
        assert_eq!(orch.pointer_moved(Vec2::ZERO, Some(&off)).unwrap(), CursorHint::Default);
    }

    #[test]
    fn intents_drive_the_timeline() {
        let mut orch = orchestrator(ViewMode::Gallery);
        orch.handle_intent(KeyIntent::StepNext);
        orch.handle_intent(KeyIntent::StepNext);
        assert_eq!(orch.timeline().current_time(), 20.0);
        orch.handle_intent(KeyIntent::StepPrev);
        assert_eq!(orch.timeline().current_time(), 10.0);
        orch.handle_intent(KeyIntent::SeekEnd);
        assert_eq!(orch.timeline().current_time(), 100.0);
        orch.handle_intent(KeyIntent::Reset);
        assert_eq!(orch.timeline().current_time(), 0.0);
    }

    #[test]
    fn tick_runs_auto_play_into_the_visible_group() {
        let mut orch = orchestrator(ViewMode::Evolution);
        orch.handle_intent(KeyIntent::TogglePlay);
        assert!(orch.timeline().is_auto_advancing());
        for _ in 0..60 {
            orch.tick(Duration::from_millis(100));
        }
        // 60 ticks of 0.5 reach 30: thresholds 0 and 25 are active.
        assert_eq!(orch.timeline().current_time(), 30.0);
        let active: Vec<bool> = orch
            .evolution()
            .entities()
            .iter()
            .map(|e| e.state().active)
            .collect();
        assert_eq!(active, vec![true, true, false, false, false]);
    }

    #[test]
    fn tour_reaches_the_end() {
        let mut orch = orchestrator(ViewMode::Gallery);
        orch.handle_intent(KeyIntent::PlayTour);
        for _ in 0..120 {
            orch.tick(Duration::from_millis(100));
        }
        assert_eq!(orch.timeline().current_time(), 100.0);
    }

    #[test]
    fn dispose_is_final() {
        let mut orch = orchestrator(ViewMode::Evolution);
        orch.dispose();
        orch.dispose();
        assert!(orch.evolution().entities().is_empty());
        assert!(orch.gallery().entities().is_empty());
        orch.tick(Duration::from_secs(1));
        orch.seek(50.0);
        assert!(!orch.switch_component(Category::Storage));
        let camera = facing(0.0, 2.0);
        assert_eq!(orch.pointer_clicked(Vec2::ZERO, Some(&camera)).unwrap(), None);
    }
}
