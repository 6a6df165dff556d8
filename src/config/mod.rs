//! Configuration module for the slicer.
//!
//! Handles the database connection, logging defaults, and environment variables.

mod settings;

pub use settings::{
    expand_env_vars, DatabaseSettings, LoggingSettings, Settings, SettingsError, CONFIG_ENV_VAR,
};
