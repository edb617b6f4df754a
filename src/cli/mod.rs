//! CLI Interface: terminal rendering, keyboard controls, and audio cues
//!
//! # Components
//! - `display.rs`: Terminal and plain-text presentation sinks
//! - `input.rs`: Keyboard-driven tick scheduler
//! - `audio.rs`: Terminal bell feedback sink

pub mod audio;
pub mod display;
pub mod input;

pub use audio::TerminalBell;
pub use display::{Display, PlainDisplay};
pub use input::KeyboardScheduler;
