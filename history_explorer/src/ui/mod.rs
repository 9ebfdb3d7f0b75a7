mod captions;
mod hud;
mod inspector;
mod notifications;
mod timeline;

use std::sync::Arc;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};

use crate::catalog::CatalogRecord;
use crate::notify::Subscription;
use crate::orchestrator::{DisplayEvent, NoticeLevel, Orchestrator};
use crate::scene::advance_explorer;

pub use captions::caption_plugin;
pub use hud::{hud_plugin, HudState};
pub use inspector::inspector_plugin;
pub use notifications::notification_plugin;
pub use timeline::timeline_plugin;

pub const TOAST_SECS: f32 = 3.0;

/// True while the pointer is over an egui panel; scene input is skipped.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiPointerCapture(pub bool);

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub level: NoticeLevel,
    pub message: String,
    pub remaining: f32,
}

/// What the panels show: the picked record and live toasts.
#[derive(Resource, Default)]
pub struct DisplayState {
    feed: Option<Subscription<DisplayEvent>>,
    pub selected: Option<Arc<CatalogRecord>>,
    pub toasts: Vec<Toast>,
}

impl DisplayState {
    pub fn apply(&mut self, event: DisplayEvent) {
        match event {
            DisplayEvent::Record(record) => self.selected = Some(record),
            DisplayEvent::Notice { level, message } => self.toasts.push(Toast {
                level,
                message,
                remaining: TOAST_SECS,
            }),
        }
    }

    /// Count toasts down and drop the expired ones.
    pub fn age(&mut self, dt: f32) {
        for toast in &mut self.toasts {
            toast.remaining -= dt;
        }
        self.toasts.retain(|toast| toast.remaining > 0.0);
    }

    pub fn dismiss(&mut self) {
        self.selected = None;
    }
}

/// Shared by every panel plugin; only the first call registers anything.
fn ui_core(app: &mut App) {
    if app.world().contains_resource::<DisplayState>() {
        return;
    }
    if !app.is_plugin_added::<EguiPlugin>() {
        app.add_plugins(EguiPlugin);
    }
    app.init_resource::<DisplayState>()
        .init_resource::<UiPointerCapture>()
        .add_systems(
            Update,
            (
                track_pointer_capture_system,
                drain_display_system.after(advance_explorer),
            ),
        );
}

fn track_pointer_capture_system(
    mut contexts: EguiContexts,
    mut capture: ResMut<UiPointerCapture>,
) {
    let ctx = contexts.ctx_mut();
    capture.0 = ctx.is_pointer_over_area() || ctx.wants_pointer_input();
}

fn drain_display_system(
    time: Res<Time>,
    orchestrator: Option<ResMut<Orchestrator>>,
    mut display: ResMut<DisplayState>,
) {
    if let Some(mut orchestrator) = orchestrator {
        if display.feed.is_none() {
            display.feed = Some(orchestrator.subscribe_display());
        }
    }
    let events: Vec<DisplayEvent> = display
        .feed
        .as_ref()
        .map(|feed| feed.try_iter().collect())
        .unwrap_or_default();
    for event in events {
        display.apply(event);
    }
    display.age(time.delta_secs());
}

fn panel_frame(alpha: u8) -> egui::Frame {
    egui::Frame::default()
        .fill(egui::Color32::from_rgba_premultiplied(15, 15, 25, alpha))
        .inner_margin(egui::Margin::same(12))
        .corner_radius(egui::CornerRadius::same(6))
}

fn apply_panel_style(ui: &mut egui::Ui) {
    ui.style_mut().override_text_style = Some(egui::TextStyle::Monospace);
    ui.visuals_mut().override_text_color = Some(egui::Color32::from_rgb(200, 220, 240));
}

const ACCENT: egui::Color32 = egui::Color32::from_rgb(0, 212, 255);
const MUTED: egui::Color32 = egui::Color32::from_rgb(120, 120, 140);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::ExplorerConfig;
    use std::time::Duration;

    #[test]
    fn toasts_expire_after_three_seconds() {
        let mut display = DisplayState::default();
        display.apply(DisplayEvent::Notice {
            level: NoticeLevel::Info,
            message: "hello".into(),
        });
        display.age(2.9);
        assert_eq!(display.toasts.len(), 1);
        display.age(0.2);
        assert!(display.toasts.is_empty());
    }

    #[test]
    fn records_select_and_dismiss() {
        let catalog = Catalog::builtin().unwrap();
        let mut display = DisplayState::default();
        display.apply(DisplayEvent::Record(catalog.by_id("eniac").unwrap()));
        assert_eq!(display.selected.as_ref().unwrap().title, "ENIAC");
        display.dismiss();
        assert!(display.selected.is_none());
    }

    #[test]
    fn drain_system_collects_orchestrator_notices() {
        let orchestrator =
            Orchestrator::new(Catalog::builtin().unwrap(), &ExplorerConfig::default()).unwrap();
        let mut app = App::new();
        app.init_resource::<Time>()
            .init_resource::<DisplayState>()
            .insert_resource(orchestrator)
            .add_systems(Update, drain_display_system);

        app.update();
        app.world_mut().resource_mut::<Orchestrator>().toggle_mode();
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(16));
        app.update();

        let display = app.world().resource::<DisplayState>();
        assert_eq!(display.toasts.len(), 1);
        assert_eq!(display.toasts[0].message, "Switched to Component Evolution");
    }
}
