//! Configuration module
//!
//! Settings persistence and the process-wide settings store with
//! change notification.

pub mod settings;

pub use settings::{SearchDefaults, ServerConfig, Settings, SettingsStore};
