use crate::panel_state::PanelTab;
use crate::utils::app_paths::AppPaths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub search: SearchDefaults,
    pub panel: PanelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base address of the context-db server
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    /// Result budget per search
    pub limit: usize,

    /// Minimum similarity score, 0.0..=1.0
    pub min_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Tab restored when the panel reopens
    pub last_tab: PanelTab,

    /// How long transient status notices stay visible
    pub notice_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            search: SearchDefaults::default(),
            panel: PanelConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            limit: 5,
            min_score: 0.3,
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            last_tab: PanelTab::Add,
            notice_timeout_ms: 3000,
        }
    }
}

type Subscriber = Box<dyn Fn(&Settings)>;

/// Process-wide settings store.
///
/// Components never cache a copy across operations; they call
/// `current()` at the start of each operation so a setting changed
/// mid-session takes effect on the next operation, not retroactively.
pub struct SettingsStore {
    settings: Settings,
    path: Option<PathBuf>,
    subscribers: Vec<Subscriber>,
}

impl SettingsStore {
    /// Load from the platform config file, falling back to defaults.
    pub fn load() -> Self {
        match AppPaths::config_file() {
            Ok(path) => Self::load_from(path),
            Err(e) => {
                warn!("Cannot resolve config path: {}, using defaults", e);
                Self::in_memory(Settings::default())
            }
        }
    }

    /// Load from an explicit path, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load_from(path: PathBuf) -> Self {
        let settings = match fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Malformed config {}: {}, using defaults", path.display(), e);
                    Settings::default()
                }
            },
            Err(_) => Settings::default(),
        };

        Self {
            settings,
            path: Some(path),
            subscribers: Vec::new(),
        }
    }

    /// Store without a backing file. Used by tests and by `--server`
    /// overrides that should not outlive the session.
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            settings,
            path: None,
            subscribers: Vec::new(),
        }
    }

    /// Snapshot of the current settings. Callers re-read at the start
    /// of each operation rather than holding on to the result.
    pub fn current(&self) -> Settings {
        self.settings.clone()
    }

    /// Mutate, persist, and notify subscribers.
    pub fn update(&mut self, mutate: impl FnOnce(&mut Settings)) -> Result<()> {
        mutate(&mut self.settings);
        self.save()?;
        self.notify();
        Ok(())
    }

    /// Mutate and notify without persisting. Session-only overrides
    /// such as `--server` go through here.
    pub fn override_session(&mut self, mutate: impl FnOnce(&mut Settings)) {
        mutate(&mut self.settings);
        self.notify();
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&Settings) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    fn notify(&self) {
        for subscriber in &self.subscribers {
            subscriber(&self.settings);
        }
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = toml::to_string_pretty(&self.settings)?;
        fs::write(path, raw).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Write a default config file for `--generate-config`.
    pub fn generate_default_file() -> Result<PathBuf> {
        let path = AppPaths::config_file()
            .map_err(|e| anyhow::anyhow!("cannot resolve config path: {}", e))?;
        let raw = toml::to_string_pretty(&Settings::default())?;
        fs::write(&path, raw)?;
        info!("Generated default config at {}", path.display());
        Ok(path)
    }
}
