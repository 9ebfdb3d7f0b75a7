//! Environment parsing and defaults.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::catalog::{Catalog, Category};
use crate::error::Result;
use crate::orchestrator::ViewMode;
use crate::scene::{GroupSettings, GroupVariant};
use crate::timeline::TimelineSettings;

const MODE_ENV: &str = "CHRONO_MODE";
const COMPONENT_ENV: &str = "CHRONO_COMPONENT";
const CATALOG_ENV: &str = "CHRONO_CATALOG";
const AUTOPLAY_STEP_ENV: &str = "CHRONO_AUTOPLAY_STEP";
const AUTOPLAY_TICK_ENV: &str = "CHRONO_AUTOPLAY_TICK_MS";
const TOUR_ENV: &str = "CHRONO_TOUR_MS";
const SEED_ENV: &str = "CHRONO_SEED";

const DEFAULT_AUTOPLAY_STEP: f32 = 0.5;
const DEFAULT_AUTOPLAY_TICK_MS: u64 = 100;
const DEFAULT_TOUR_MS: u64 = 10_000;
const DEFAULT_SEED: u64 = 0x5eed;

#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerConfig {
    pub mode: ViewMode,
    /// Component line shown in evolution mode.
    pub component: Category,
    /// External catalog; `None` uses the built-in one.
    pub catalog_path: Option<PathBuf>,
    pub autoplay_step: f32,
    pub autoplay_tick: Duration,
    pub tour: Duration,
    pub seed: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            mode: ViewMode::Gallery,
            component: Category::Cpu,
            catalog_path: None,
            autoplay_step: DEFAULT_AUTOPLAY_STEP,
            autoplay_tick: Duration::from_millis(DEFAULT_AUTOPLAY_TICK_MS),
            tour: Duration::from_millis(DEFAULT_TOUR_MS),
            seed: DEFAULT_SEED,
        }
    }
}

impl ExplorerConfig {
    /// Read `CHRONO_*` variables. Invalid values are reported and replaced
    /// by their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mode = read(MODE_ENV, parse_mode).unwrap_or(defaults.mode);
        let component = read(COMPONENT_ENV, parse_component).unwrap_or(defaults.component);
        let catalog_path = std::env::var(CATALOG_ENV)
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from);

        let autoplay_step = match read(AUTOPLAY_STEP_ENV, parse_number::<f32>) {
            Some(step) if (0.1..=5.0).contains(&step) => step,
            Some(step) => {
                let clamped = step.clamp(0.1, 5.0);
                eprintln!("chronoscope: {AUTOPLAY_STEP_ENV}={step} out of range, using {clamped}");
                clamped
            }
            None => defaults.autoplay_step,
        };
        let autoplay_tick = read(AUTOPLAY_TICK_ENV, parse_millis).unwrap_or(defaults.autoplay_tick);
        let tour = read(TOUR_ENV, parse_number::<u64>)
            .map(Duration::from_millis)
            .unwrap_or(defaults.tour);
        let seed = read(SEED_ENV, parse_seed).unwrap_or(defaults.seed);

        Self {
            mode,
            component,
            catalog_path,
            autoplay_step,
            autoplay_tick,
            tour,
            seed,
        }
    }

    pub fn timeline_settings(&self) -> TimelineSettings {
        TimelineSettings {
            auto_advance_step: self.autoplay_step,
            auto_advance_interval: self.autoplay_tick,
            transition: self.tour,
        }
    }

    pub fn group_settings(&self, variant: GroupVariant) -> GroupSettings {
        GroupSettings::for_variant(variant).with_seed(self.seed)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }
}

/// `None` when unset. Parse failures are reported and also yield `None`.
fn read<T>(key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        eprintln!("chronoscope: invalid value in {key}: {raw:?}, using default");
    }
    parsed
}

fn parse_mode(raw: &str) -> Option<ViewMode> {
    match raw.to_ascii_lowercase().as_str() {
        "gallery" => Some(ViewMode::Gallery),
        "evolution" => Some(ViewMode::Evolution),
        _ => None,
    }
}

fn parse_component(raw: &str) -> Option<Category> {
    match raw.to_ascii_lowercase().as_str() {
        "cpu" => Some(Category::Cpu),
        "memory" => Some(Category::Memory),
        "storage" => Some(Category::Storage),
        _ => None,
    }
}

fn parse_number<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}

fn parse_millis(raw: &str) -> Option<Duration> {
    raw.parse::<u64>()
        .ok()
        .filter(|&ms| ms > 0)
        .map(Duration::from_millis)
}

fn parse_seed(raw: &str) -> Option<u64> {
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    struct EnvGuard {
        snapshot: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn capture(keys: &[&'static str]) -> Self {
            let snapshot = keys
                .iter()
                .map(|&key| (key, std::env::var(key).ok()))
                .collect();
            for key in keys {
                std::env::remove_var(key);
            }
            Self { snapshot }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.snapshot {
                match value {
                    Some(val) => std::env::set_var(key, val),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    const ENV_KEYS: [&str; 7] = [
        MODE_ENV,
        COMPONENT_ENV,
        CATALOG_ENV,
        AUTOPLAY_STEP_ENV,
        AUTOPLAY_TICK_ENV,
        TOUR_ENV,
        SEED_ENV,
    ];

    #[test]
    fn defaults_when_nothing_is_set() {
        let _lock = lock_env();
        let _guard = EnvGuard::capture(&ENV_KEYS);

        assert_eq!(ExplorerConfig::from_env(), ExplorerConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let _lock = lock_env();
        let _guard = EnvGuard::capture(&ENV_KEYS);

        std::env::set_var(MODE_ENV, "Evolution");
        std::env::set_var(COMPONENT_ENV, "storage");
        std::env::set_var(CATALOG_ENV, "/tmp/catalog.json");
        std::env::set_var(AUTOPLAY_STEP_ENV, "1.5");
        std::env::set_var(AUTOPLAY_TICK_ENV, "50");
        std::env::set_var(TOUR_ENV, "2500");
        std::env::set_var(SEED_ENV, "0xBEEF");

        let config = ExplorerConfig::from_env();

        assert_eq!(config.mode, ViewMode::Evolution);
        assert_eq!(config.component, Category::Storage);
        assert_eq!(config.catalog_path, Some(PathBuf::from("/tmp/catalog.json")));
        assert_eq!(config.autoplay_step, 1.5);
        assert_eq!(config.autoplay_tick, Duration::from_millis(50));
        assert_eq!(config.tour, Duration::from_millis(2500));
        assert_eq!(config.seed, 0xbeef);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let _lock = lock_env();
        let _guard = EnvGuard::capture(&ENV_KEYS);

        std::env::set_var(MODE_ENV, "theatre");
        std::env::set_var(COMPONENT_ENV, "historical-node");
        std::env::set_var(AUTOPLAY_TICK_ENV, "0");
        std::env::set_var(SEED_ENV, "0xnothex");

        let config = ExplorerConfig::from_env();

        assert_eq!(config.mode, ViewMode::Gallery);
        assert_eq!(config.component, Category::Cpu);
        assert_eq!(config.autoplay_tick, Duration::from_millis(100));
        assert_eq!(config.seed, 0x5eed);
    }

    #[test]
    fn autoplay_step_is_clamped() {
        let _lock = lock_env();
        let _guard = EnvGuard::capture(&ENV_KEYS);

        std::env::set_var(AUTOPLAY_STEP_ENV, "12");
        assert_eq!(ExplorerConfig::from_env().autoplay_step, 5.0);

        std::env::set_var(AUTOPLAY_STEP_ENV, "0.01");
        assert_eq!(ExplorerConfig::from_env().autoplay_step, 0.1);
    }

    #[test]
    fn missing_catalog_file_is_an_io_error() {
        let config = ExplorerConfig {
            catalog_path: Some(PathBuf::from("/definitely/not/here.json")),
            ..ExplorerConfig::default()
        };
        assert!(matches!(
            config.load_catalog(),
            Err(crate::error::ExplorerError::CatalogIo { .. })
        ));
    }

    #[test]
    fn group_settings_carry_the_seed() {
        let config = ExplorerConfig {
            seed: 42,
            ..ExplorerConfig::default()
        };
        let evolution = config.group_settings(GroupVariant::Evolution);
        assert_eq!(evolution.seed, 42);
        assert_eq!(evolution.entity_cap, Some(5));
        assert_eq!(config.group_settings(GroupVariant::Gallery).highlight_tolerance, 5.0);
    }
}
