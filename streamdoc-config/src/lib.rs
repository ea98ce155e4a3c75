//! Shared configuration loader for the streamdoc pipeline.
//!
//! `defaults/streamdoc.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`StreamdocConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use streamdoc_pipeline::{DecoderOptions, Placement, PipelineOptions, TagVocabulary};

const DEFAULT_TOML: &str = include_str!("../defaults/streamdoc.default.toml");

/// Top-level configuration consumed by streamdoc applications.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamdocConfig {
    pub transport: TransportConfig,
    pub tags: TagsConfig,
    pub build: BuildConfig,
}

/// Server-sent event framing.
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    pub data_field: String,
    pub done_sentinel: String,
    pub normal_finish_reason: String,
}

/// Element names the scanner recognizes.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsConfig {
    pub prefix: String,
    pub option: String,
    pub container: String,
    pub viz: String,
    pub question: String,
    pub choice: String,
    pub input: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    pub placement: Placement,
    pub keep_partial_rows_when_finished: bool,
}

impl From<&TransportConfig> for DecoderOptions {
    fn from(config: &TransportConfig) -> Self {
        DecoderOptions {
            data_field: config.data_field.clone(),
            done_sentinel: config.done_sentinel.clone(),
            normal_finish_reason: config.normal_finish_reason.clone(),
        }
    }
}

impl From<&TagsConfig> for TagVocabulary {
    fn from(config: &TagsConfig) -> Self {
        TagVocabulary {
            prefix: config.prefix.clone(),
            option: config.option.clone(),
            container: config.container.clone(),
            viz: config.viz.clone(),
            question: config.question.clone(),
            choice: config.choice.clone(),
            input: config.input.clone(),
        }
    }
}

impl From<&StreamdocConfig> for PipelineOptions {
    fn from(config: &StreamdocConfig) -> Self {
        PipelineOptions {
            decoder: (&config.transport).into(),
            tags: (&config.tags).into(),
            placement: config.build.placement,
            keep_partial_rows_when_finished: config.build.keep_partial_rows_when_finished,
        }
    }
}

impl From<StreamdocConfig> for PipelineOptions {
    fn from(config: StreamdocConfig) -> Self {
        (&config).into()
    }
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

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<StreamdocConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<StreamdocConfig, ConfigError> {
    Loader::new().build()
}
