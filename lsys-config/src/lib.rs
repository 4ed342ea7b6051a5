//! Configuration loader for the lsys engine.
//!
//! `defaults/lsys.default.toml` is embedded so that the documented defaults and the
//! runtime behavior cannot drift apart. Callers layer their own files and single-key
//! overrides on top with [`Loader`] before deserializing into [`LsysConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use lsys::{AdvanceConfig, ExportFormat};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/lsys.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LsysConfig {
    pub engine: EngineConfig,
    pub export: ExportConfig,
}

/// Advance strategy and limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    pub parallel_threshold: usize,
    pub workers: usize,
    pub max_modules: usize,
}

impl EngineConfig {
    pub fn advance_config(&self) -> AdvanceConfig {
        AdvanceConfig {
            parallel_threshold: self.parallel_threshold,
            workers: self.workers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub pretty: bool,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file, ignored if absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `engine.workers`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<LsysConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<LsysConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsys::DEFAULT_PARALLEL_THRESHOLD;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.engine.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert_eq!(config.engine.workers, 0);
        assert_eq!(config.engine.max_modules, 1_000_000);
        assert_eq!(config.export.format, ExportFormat::Json);
        assert!(!config.export.pretty);
    }

    #[test]
    fn defaults_match_engine_defaults() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.engine.advance_config(), AdvanceConfig::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("engine.workers", 3)
            .expect("override to apply")
            .set_override("export.format", "yaml")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.engine.workers, 3);
        assert_eq!(config.engine.advance_config().worker_count(), 3);
        assert_eq!(config.export.format, ExportFormat::Yaml);
    }

    #[test]
    fn layers_user_files() {
        let path = std::env::temp_dir().join(format!("lsys-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[engine]\nparallel_threshold = 64\n").expect("write config");

        let config = Loader::new()
            .with_file(&path)
            .build()
            .expect("config to build");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.engine.parallel_threshold, 64);
        assert_eq!(config.engine.max_modules, 1_000_000);
    }

    #[test]
    fn optional_files_may_be_missing() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/lsys.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.engine.workers, 0);
    }

    #[test]
    fn required_files_must_exist() {
        assert!(Loader::new()
            .with_file("/nonexistent/lsys.toml")
            .build()
            .is_err());
    }
}
