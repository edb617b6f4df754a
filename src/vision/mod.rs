//! Vision: camera frames, the image classifier, and the argmax adapter
//!
//! # Components
//! - `frame.rs`: RGB frames and raw-video frame sources
//! - `adapter.rs`: Classifier trait and best-detection reduction
//! - `model.rs`: Candle linear-probe classifier

pub mod adapter;
pub mod frame;
pub mod model;

pub use adapter::{best_prediction, classify, Classifier, ClassifierError, Prediction};
pub use frame::{Frame, FrameError, FrameSource, RawVideoSource};
pub use model::{LinearProbe, ModelMetadata, ProbeWeights};
