//! # grblstream Settings
//!
//! Persisted settings file handling and the one-shot configuration
//! snapshot handed to the streaming core.

pub mod config;

pub use config::{default_settings_path, Overrides, Settings, StreamConfig};
