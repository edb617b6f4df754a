//! Quiz configuration
//!
//! Loaded from a TOML file (`quiz.toml` by default, all sections optional):
//!
//! ```toml
//! [stability]
//! capacity = 16
//! confidence_threshold = 0.7
//! quorum = 0.8
//!
//! [scoring]
//! correct = 10
//! harmful = -8
//! incorrect = -3
//!
//! [loop]
//! tick_interval_ms = 150
//! feedback_hold_ms = 3000
//!
//! [model]
//! metadata = "model/metadata.json"
//! weights = "model/weights.bin"
//! ```
//!
//! A `[catalog]` table with `labels`, `[[catalog.cases]]` and
//! `[[catalog.harmful]]` replaces the built-in dental catalog.

use crate::quiz::{Case, Catalog, CatalogError, HarmfulEntry, Label, LabelSet};
use crate::quiz::{ScoringRules, StabilityConfig};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "quiz.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Polling loop cadence
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub tick_interval_ms: u64,
    /// How long feedback stays up before `--plain` runs move on
    pub feedback_hold_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            tick_interval_ms: 150,
            feedback_hold_ms: 3000,
        }
    }
}

impl LoopConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Feedback hold in whole ticks
    pub fn feedback_hold_ticks(&self) -> u32 {
        let ticks = self.feedback_hold_ms / self.tick_interval_ms.max(1);
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

/// Classifier model files
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub metadata: PathBuf,
    pub weights: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        ModelPaths {
            metadata: PathBuf::from("model/metadata.json"),
            weights: PathBuf::from("model/weights.bin"),
        }
    }
}

/// User-supplied catalog
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CatalogConfig {
    pub labels: Vec<Label>,
    pub cases: Vec<Case>,
    #[serde(default)]
    pub harmful: Vec<HarmfulEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub stability: StabilityConfig,
    pub scoring: ScoringRules,
    #[serde(rename = "loop")]
    pub tick: LoopConfig,
    pub model: ModelPaths,
    pub catalog: Option<CatalogConfig>,
}

impl QuizConfig {
    /// Load and validate. An explicit path must exist; the default path
    /// falls back to built-in defaults when absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        if !explicit && !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            let config = QuizConfig::default();
            config.validate()?;
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::parse(&content)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: QuizConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.stability;
        if s.capacity == 0 {
            return Err(ConfigError::Invalid(
                "stability.capacity must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&s.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "stability.confidence_threshold {} is outside [0, 1]",
                s.confidence_threshold
            )));
        }
        // above one half, at most one label can hold the quorum
        if !(s.quorum > 0.5 && s.quorum <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "stability.quorum {} must be in (0.5, 1]",
                s.quorum
            )));
        }

        let r = &self.scoring;
        if r.correct <= 0 {
            return Err(ConfigError::Invalid(
                "scoring.correct must be positive".into(),
            ));
        }
        if r.harmful > 0 || r.incorrect > 0 {
            return Err(ConfigError::Invalid(
                "scoring penalties must not be positive".into(),
            ));
        }

        if self.tick.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "loop.tick_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Validated catalog: the configured one, or the built-in dental cases
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog {
            Some(c) => Catalog::new(
                LabelSet::new(c.labels.iter().cloned()),
                c.cases.clone(),
                c.harmful.clone(),
            ),
            None => Ok(Catalog::builtin()),
        }
    }
}
