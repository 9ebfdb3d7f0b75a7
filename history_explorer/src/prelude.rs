//! Minimal prelude for SDK consumers.

pub use crate::catalog::{Catalog, CatalogRecord, Category, Filter};
pub use crate::config::ExplorerConfig;
pub use crate::error::{ExplorerError, Result};
pub use crate::orchestrator::{DisplayEvent, Orchestrator, ViewMode};
pub use crate::scene::{GroupSettings, GroupVariant, SceneGroup};
pub use crate::sdk::ExplorerBuilder;
pub use crate::timeline::{TimelineController, TimelineSettings};
