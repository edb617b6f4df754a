//! Quiz core: detection stabilization, answer evaluation, and session flow
//!
//! # Components
//! - `label.rs`: Label alphabet and per-frame detections
//! - `catalog.rs`: Validated case list and harmful-answer table
//! - `stability.rs`: Sliding-window quorum debounce
//! - `evaluator.rs`: Outcome classification and score deltas
//! - `state.rs`: Session state machine
//! - `confusion.rs`: Mistake review log

pub mod catalog;
pub mod confusion;
pub mod evaluator;
pub mod label;
pub mod stability;
pub mod state;

pub use catalog::{Case, Catalog, CatalogError, HarmfulEntry};
pub use confusion::{Confusion, ConfusionLog};
pub use evaluator::{apply_delta, Evaluator, Outcome, OutcomeKind, ScoringRules};
pub use label::{Detection, Label, LabelSet};
pub use stability::{Acceptance, StabilityBuffer, StabilityConfig};
pub use state::{Phase, Scoreboard, Session, Summary};
