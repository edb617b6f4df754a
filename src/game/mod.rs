//! Game loop: sinks, tick scheduling, and the runner
//!
//! # Components
//! - `sink.rs`: Presentation and audio collaborator traits
//! - `scheduler.rs`: Tick/control scheduling
//! - `runner.rs`: Start, per-tick step, and polling loop

pub mod runner;
pub mod scheduler;
pub mod sink;

pub use runner::Game;
pub use scheduler::{Control, IntervalScheduler, Scheduler, Script, Wake};
pub use sink::{Cue, FeedbackSink, PresentationSink, Silent, StatusLevel, Waveform};
