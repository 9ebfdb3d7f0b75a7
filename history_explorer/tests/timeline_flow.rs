//! Timeline driving scene groups through the public API.

use std::time::Duration;

use history_explorer::catalog::{Catalog, Category, Filter};
use history_explorer::scene::{GroupSettings, GroupVariant, SceneGroup};
use history_explorer::timeline::{Direction, TimelineController, TimelineSettings};

fn controller() -> TimelineController {
    let catalog = Catalog::builtin().unwrap();
    TimelineController::new(catalog.timeline_points().to_vec(), TimelineSettings::default())
        .unwrap()
}

fn active_count(group: &SceneGroup) -> usize {
    group.entities().iter().filter(|e| e.state().active).count()
}

#[test]
fn every_seek_notifies_even_when_unchanged() {
    let mut timeline = controller();
    let feed = timeline.subscribe();

    timeline.seek(40.0);
    timeline.seek(40.0);

    assert_eq!(feed.try_iter().collect::<Vec<_>>(), vec![40.0, 40.0]);
}

#[test]
fn stepping_walks_the_time_points_and_stops_at_the_ends() {
    let mut timeline = controller();
    assert!(!timeline.step(Direction::Backward));

    assert!(timeline.step(Direction::Forward));
    assert_eq!(timeline.current_time(), 10.0);

    timeline.seek(15.0);
    assert!(timeline.step(Direction::Backward));
    assert_eq!(timeline.current_time(), 10.0);

    timeline.seek(100.0);
    assert!(!timeline.step(Direction::Forward));
}

#[test]
fn subscription_drives_an_evolution_group() {
    let catalog = Catalog::builtin().unwrap();
    let mut group = SceneGroup::new(GroupVariant::Evolution, GroupSettings::evolution());
    group.load(&catalog, Filter::Category(Category::Memory));
    let mut timeline = controller();
    let feed = timeline.subscribe();

    timeline.seek(50.0);
    group.apply_timeline_progress(feed.latest().unwrap());
    assert_eq!(active_count(&group), 3);

    timeline.seek(100.0);
    group.apply_timeline_progress(feed.latest().unwrap());
    assert_eq!(active_count(&group), 5);

    timeline.reset();
    group.apply_timeline_progress(feed.latest().unwrap());
    assert_eq!(active_count(&group), 1);
}

#[test]
fn autoplay_ticks_at_the_configured_rate_and_stops_at_the_end() {
    let mut timeline = controller();
    assert!(timeline.toggle_auto_advance());

    timeline.tick(Duration::from_secs(1));
    assert!((timeline.current_time() - 5.0).abs() < 1e-4);

    timeline.seek(99.0);
    timeline.tick(Duration::from_millis(500));
    assert_eq!(timeline.current_time(), 100.0);
    assert!(!timeline.is_auto_advancing());
}

#[test]
fn tour_eases_to_the_end_and_a_seek_cancels_it() {
    let mut timeline = controller();
    timeline.play_timed_transition(Duration::from_secs(10));
    assert!(timeline.is_transitioning());

    timeline.tick(Duration::from_secs(5));
    assert!((timeline.current_time() - 50.0).abs() < 1e-3);

    timeline.seek(20.0);
    assert!(!timeline.is_transitioning());
    timeline.tick(Duration::from_secs(5));
    assert_eq!(timeline.current_time(), 20.0);
}

#[test]
fn disposed_timeline_ignores_everything() {
    let mut timeline = controller();
    let feed = timeline.subscribe();
    timeline.dispose();

    timeline.seek(70.0);
    timeline.toggle_auto_advance();
    timeline.tick(Duration::from_secs(3));

    assert_eq!(timeline.current_time(), 0.0);
    assert!(feed.try_recv().is_none());
}
