//! SDK entry points and builder for composing the explorer app.

use bevy::log::info;
use bevy::prelude::*;

use crate::camera::orbit_camera_plugin;
use crate::config::ExplorerConfig;
use crate::error::Result;
use crate::input::input_plugin;
use crate::orchestrator::Orchestrator;
use crate::render::render_plugin;
use crate::scene::scene_plugin;
use crate::ui::{
    caption_plugin, hud_plugin, inspector_plugin, notification_plugin, timeline_plugin,
};

/// Builder for constructing a Chronoscope app with optional panels.
pub struct ExplorerBuilder {
    config: Option<ExplorerConfig>,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    enable_orbit_camera: bool,
    enable_hud: bool,
    enable_inspector: bool,
    enable_timeline: bool,
    enable_notifications: bool,
}

impl Default for ExplorerBuilder {
    fn default() -> Self {
        Self {
            config: None,
            window_title: "Chronoscope".to_string(),
            window_resolution: (1280.0, 720.0),
            clear_color: Color::srgb(0.04, 0.04, 0.04),
            enable_orbit_camera: true,
            enable_hud: true,
            enable_inspector: true,
            enable_timeline: true,
            enable_notifications: true,
        }
    }
}

impl ExplorerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit configuration instead of reading the environment.
    pub fn config(mut self, config: ExplorerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn disable_orbit_camera(mut self) -> Self {
        self.enable_orbit_camera = false;
        self
    }

    pub fn disable_hud(mut self) -> Self {
        self.enable_hud = false;
        self
    }

    pub fn disable_inspector(mut self) -> Self {
        self.enable_inspector = false;
        self
    }

    pub fn disable_timeline(mut self) -> Self {
        self.enable_timeline = false;
        self
    }

    pub fn disable_notifications(mut self) -> Self {
        self.enable_notifications = false;
        self
    }

    /// Load the catalog and assemble the Bevy app.
    ///
    /// Fails if the catalog cannot be read or validated.
    pub fn build(self) -> Result<App> {
        let config = self.config.unwrap_or_else(ExplorerConfig::from_env);
        let catalog = config.load_catalog()?;
        let orchestrator = Orchestrator::new(catalog, &config)?;
        info!(
            "starting in {} with {} records",
            config.mode.label(),
            orchestrator.catalog().len()
        );

        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title,
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(self.clear_color))
        .insert_resource(orchestrator)
        .add_plugins((scene_plugin, render_plugin, input_plugin, caption_plugin))
        .add_systems(Last, dispose_on_exit);

        if self.enable_orbit_camera {
            app.add_plugins(orbit_camera_plugin);
        }
        if self.enable_hud {
            app.add_plugins(hud_plugin);
        }
        if self.enable_inspector {
            app.add_plugins(inspector_plugin);
        }
        if self.enable_timeline {
            app.add_plugins(timeline_plugin);
        }
        if self.enable_notifications {
            app.add_plugins(notification_plugin);
        }

        Ok(app)
    }
}

fn dispose_on_exit(mut exits: EventReader<AppExit>, orchestrator: Option<ResMut<Orchestrator>>) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(mut orchestrator) = orchestrator {
        orchestrator.dispose();
    }
}
