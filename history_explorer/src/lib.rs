//! Chronoscope: a 3D walk through computing history.
//!
//! Library root. A gallery of historical machines and an evolution line of
//! hardware components share one timeline; the [`orchestrator`] routes
//! timeline, pointer and keyboard input to whichever scene group is shown.

mod camera;
pub mod catalog;
pub mod config;
pub mod error;
mod input;
pub mod notify;
pub mod orchestrator;
pub mod render;
pub mod scene;
pub mod timeline;
mod ui;

pub mod prelude;
pub mod sdk;

pub use camera::{orbit_camera_plugin, OrbitCamera, PerspectiveRig, PickCamera, ViewportCamera};
pub use catalog::{Catalog, CatalogRecord, Category, Era, Filter, TimePoint};
pub use error::{ExplorerError, Result};
pub use input::{cursor_to_ndc, input_plugin, intent_for_key, CursorState};
pub use orchestrator::{DisplayEvent, KeyIntent, NoticeLevel, Orchestrator, ViewMode};
pub use timeline::TimelineController;
pub use ui::{
    caption_plugin, hud_plugin, inspector_plugin, notification_plugin, timeline_plugin,
    DisplayState, HudState, Toast, UiPointerCapture,
};
