//! Dental tool quiz
//!
//! Classifies a live camera feed into dental tool poses, debounces the
//! per-frame predictions into one answer per case, and scores it against
//! a case catalog.

pub mod cli;
pub mod config;
pub mod error;
pub mod game;
pub mod quiz;
pub mod vision;

pub use config::{ConfigError, QuizConfig};
pub use error::QuizError;
