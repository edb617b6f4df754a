//! Candle image classifier
//!
//! A linear probe over pooled pixel features:
//! - frame is average-pooled into a `grid x grid` RGB map scaled to [-1, 1]
//! - one dense layer maps the pooled map to per-class logits
//! - softmax turns logits into the probability list the adapter consumes
//!
//! Class names and input size come from `metadata.json`; the dense layer
//! is a bincode-encoded `ProbeWeights`.

use super::adapter::{Classifier, ClassifierError, Prediction};
use super::frame::Frame;
use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Model description shipped next to the weights
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    /// Class names in output order
    pub labels: Vec<String>,
    /// Expected frame edge length in pixels
    #[serde(default = "default_image_size")]
    pub image_size: usize,
    /// Pooling grid edge length
    #[serde(default = "default_pool_grid")]
    pub pool_grid: usize,
}

fn default_image_size() -> usize {
    224
}

fn default_pool_grid() -> usize {
    16
}

impl ModelMetadata {
    pub fn feature_dim(&self) -> usize {
        self.pool_grid * self.pool_grid * 3
    }
}

/// Dense layer parameters, row-major `(feature_dim, labels)`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProbeWeights {
    pub feature_dim: usize,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
}

/// Classifier backed by candle tensors
pub struct LinearProbe {
    metadata: ModelMetadata,
    device: Device,
    /// (feature_dim, labels)
    weights: Tensor,
    /// (labels,)
    bias: Tensor,
}

impl LinearProbe {
    /// Load metadata and weights from disk
    pub fn load(metadata_path: &Path, weights_path: &Path) -> Result<Self, ClassifierError> {
        let metadata_json = read(metadata_path)?;
        let metadata: ModelMetadata = serde_json::from_slice(&metadata_json)?;

        let weights_bytes = read(weights_path)?;
        let weights: ProbeWeights = bincode::deserialize(&weights_bytes)
            .map_err(|e| ClassifierError::Weights(e.to_string()))?;

        info!(
            labels = %metadata.labels.join(", "),
            image_size = metadata.image_size,
            bytes = weights_bytes.len(),
            "model loaded"
        );
        Self::from_parts(metadata, weights)
    }

    /// Build from in-memory parameters
    pub fn from_parts(
        metadata: ModelMetadata,
        weights: ProbeWeights,
    ) -> Result<Self, ClassifierError> {
        if metadata.labels.is_empty() {
            return Err(ClassifierError::Weights("metadata lists no labels".into()));
        }
        if metadata.pool_grid == 0 || metadata.image_size < metadata.pool_grid {
            return Err(ClassifierError::Weights(format!(
                "pool grid {} does not fit image size {}",
                metadata.pool_grid, metadata.image_size
            )));
        }
        let classes = metadata.labels.len();
        let dim = metadata.feature_dim();
        if weights.feature_dim != dim || weights.weights.len() != dim * classes {
            return Err(ClassifierError::Weights(format!(
                "expected {dim}x{classes} weights, got {} values for feature dim {}",
                weights.weights.len(),
                weights.feature_dim
            )));
        }
        if weights.bias.len() != classes {
            return Err(ClassifierError::Weights(format!(
                "expected {classes} biases, got {}",
                weights.bias.len()
            )));
        }

        // Use Metal GPU on macOS, fallback to CPU
        #[cfg(target_os = "macos")]
        let device = Device::new_metal(0).unwrap_or(Device::Cpu);
        #[cfg(not(target_os = "macos"))]
        let device = Device::Cpu;

        let weight_tensor = Tensor::from_vec(weights.weights, (dim, classes), &device)?;
        let bias_tensor = Tensor::from_vec(weights.bias, classes, &device)?;

        Ok(LinearProbe {
            metadata,
            device,
            weights: weight_tensor,
            bias: bias_tensor,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Average-pool the frame into grid cells, channels scaled to [-1, 1]
    fn features(&self, frame: &Frame) -> Vec<f32> {
        let grid = self.metadata.pool_grid;
        let size = self.metadata.image_size;
        let mut features = Vec::with_capacity(self.metadata.feature_dim());

        for gy in 0..grid {
            let (y0, y1) = (gy * size / grid, (gy + 1) * size / grid);
            for gx in 0..grid {
                let (x0, x1) = (gx * size / grid, (gx + 1) * size / grid);
                let mut sums = [0u64; 3];
                for y in y0..y1 {
                    for x in x0..x1 {
                        let rgb = frame.pixel(x, y);
                        for (sum, v) in sums.iter_mut().zip(rgb) {
                            *sum += u64::from(v);
                        }
                    }
                }
                let count = ((y1 - y0) * (x1 - x0)) as f32;
                for sum in sums {
                    features.push(sum as f32 / count / 127.5 - 1.0);
                }
            }
        }
        features
    }
}

impl Classifier for LinearProbe {
    fn predict(&mut self, frame: &Frame) -> Result<Vec<Prediction>, ClassifierError> {
        let size = self.metadata.image_size;
        if frame.width() != size || frame.height() != size {
            return Err(ClassifierError::FrameShape {
                got_w: frame.width(),
                got_h: frame.height(),
                want: size,
            });
        }

        let features = self.features(frame);
        let dim = features.len();
        let input = Tensor::from_vec(features, (1, dim), &self.device)?;
        let logits = input.matmul(&self.weights)?.broadcast_add(&self.bias)?;
        let probs = candle_nn::ops::softmax(&logits, 1)?
            .squeeze(0)?
            .to_vec1::<f32>()?;
        debug!(?probs, "frame classified");

        Ok(self
            .metadata
            .labels
            .iter()
            .zip(probs)
            .map(|(name, p)| Prediction::new(name.as_str(), p))
            .collect())
    }

    fn class_names(&self) -> Vec<String> {
        self.metadata.labels.clone()
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ClassifierError> {
    fs::read(path).map_err(|source| ClassifierError::Io {
        path: path.display().to_string(),
        source,
    })
}
