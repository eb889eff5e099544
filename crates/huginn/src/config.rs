//! Configuration file support for huginn.
//!
//! huginn reads `.huginn/config.toml`, searching from the current directory
//! up through its parents. Every section is optional.
//!
//! ```toml
//! [instrumentation]
//! label = "Counter"
//! sink = "collector"   # collector | log | off
//!
//! [demo]
//! actions = ["increment", "add:5", "reset"]
//! autosave_delay_ms = 5
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use huginn_middleware::InstrumentationConfig;
use serde::{Deserialize, Serialize};

use crate::demo::CounterAction;

/// The huginn data directory name.
pub const HUGINN_DIR: &str = ".huginn";
/// The config file name within the huginn directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Instrumentation label and sink.
    pub instrumentation: InstrumentationConfig,
    /// Demo pipeline settings.
    pub demo: DemoConfig,
}

/// Demo pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Actions sent into the pipeline, e.g. `"increment"` or `"add:5"`.
    pub actions: Vec<String>,
    /// How long the autosave middleware waits before saving.
    pub autosave_delay_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            actions: vec![
                "increment".to_string(),
                "increment".to_string(),
                "add:5".to_string(),
                "reset".to_string(),
            ],
            autosave_delay_ms: 5,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Find and load configuration from current or parent directories.
    pub fn find_and_load() -> Result<Option<(Self, PathBuf)>> {
        let current = std::env::current_dir()?;
        Self::find_and_load_from(&current)
    }

    /// Find and load configuration starting from a specific directory.
    ///
    /// Returns the config together with the `.huginn` directory it came from.
    pub fn find_and_load_from(start: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start.to_path_buf();

        loop {
            let huginn_dir = dir.join(HUGINN_DIR);
            let config_path = huginn_dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::from_file(&config_path)?;
                return Ok(Some((config, huginn_dir)));
            }

            if !dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Load configuration from an explicit `.huginn` directory, or search.
    pub fn load(huginn_dir: Option<&Path>) -> Result<Self> {
        if let Some(dir) = huginn_dir {
            return Self::from_file(&dir.join(CONFIG_FILE));
        }
        match Self::find_and_load()? {
            Some((config, path)) => {
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            None => {
                tracing::debug!("No .huginn/config.toml found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns a list of validation errors if any are found.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        for (index, action) in self.demo.actions.iter().enumerate() {
            if let Err(message) = action.parse::<CounterAction>() {
                errors.push(ConfigValidationError {
                    field: format!("demo.actions[{index}]"),
                    message,
                });
            }
        }

        if self.instrumentation.label.contains(['[', ']']) {
            errors.push(ConfigValidationError {
                field: "instrumentation.label".to_string(),
                message: "Label cannot contain brackets.".to_string(),
            });
        }

        errors
    }
}

/// Configuration validation error.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigValidationError {}
