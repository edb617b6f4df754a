//! Top-level error taxonomy
//!
//! Only startup and configuration problems surface as `QuizError`.
//! Per-frame classifier and camera hiccups are logged and swallowed by the
//! game loop.

use crate::config::ConfigError;
use crate::quiz::{CatalogError, Label};
use crate::vision::{ClassifierError, FrameError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("failed to load classifier: {0}")]
    ClassifierLoad(#[source] ClassifierError),
    #[error("classifier rejected camera frames: {0}")]
    ClassifierProbe(#[source] ClassifierError),
    #[error("camera unavailable: {0}")]
    Camera(#[source] FrameError),
    #[error("classifier cannot report tool `{0}`")]
    UnknownTool(Label),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("terminal input failed: {0}")]
    Input(#[from] std::io::Error),
}

impl QuizError {
    /// Errors that prevent the session from starting at all
    pub fn is_startup(&self) -> bool {
        !matches!(self, QuizError::Input(_))
    }
}
