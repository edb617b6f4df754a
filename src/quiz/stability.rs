//! Stability buffer: debounce noisy per-frame detections
//!
//! A label only counts as the player's answer once it dominates a sliding
//! window of recent accepted detections:
//! - window capacity `N`, FIFO eviction
//! - confidence threshold `T` for a frame to be accepted
//! - quorum fraction `Q`, stable when one label holds `ceil(N * Q)` slots

use super::label::{Label, LabelSet};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Window parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Window capacity (N); 16 frames is ~2.4s at a 150ms tick
    pub capacity: usize,
    /// Minimum confidence for a frame to enter the window (T)
    pub confidence_threshold: f32,
    /// Fraction of the window one label must hold (Q)
    pub quorum: f32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        StabilityConfig {
            capacity: 16,
            confidence_threshold: 0.70,
            quorum: 0.80,
        }
    }
}

impl StabilityConfig {
    /// Number of identical labels needed for stability: `ceil(N * Q)`
    pub fn quorum_count(&self) -> usize {
        let exact = self.capacity as f64 * f64::from(self.quorum);
        // f32 -> f64 widening leaves noise like 12.800000190734863 or
        // 8.000000119; snap to the nearest 1e-4 before taking the ceiling.
        let snapped = (exact * 1e4).round() / 1e4;
        (snapped.ceil() as usize).max(1)
    }
}

/// Result of offering one frame's detection to the buffer
#[derive(Clone, Debug, PartialEq)]
pub enum Acceptance {
    /// Frame entered the window; no label has reached quorum yet
    Accumulating { progress: f32 },
    /// Frame entered the window and this label now holds quorum
    Stable(Label),
    /// Frame failed the acceptance predicate and the window was emptied
    Lost,
    /// Frame failed the acceptance predicate on an already empty window
    Rejected,
}

/// Sliding window over recently accepted labels
#[derive(Clone, Debug)]
pub struct StabilityBuffer {
    config: StabilityConfig,
    alphabet: LabelSet,
    window: VecDeque<Label>,
}

impl StabilityBuffer {
    pub fn new(config: StabilityConfig, alphabet: LabelSet) -> Self {
        let window = VecDeque::with_capacity(config.capacity + 1);
        StabilityBuffer {
            config,
            alphabet,
            window,
        }
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Whether a detection may enter the window at all
    pub fn is_acceptable(&self, label: &Label, confidence: f32) -> bool {
        self.alphabet.contains(label) && confidence >= self.config.confidence_threshold
    }

    /// Offer a detection. Callers only offer while an answer is awaited.
    pub fn accept(&mut self, label: &Label, confidence: f32) -> Acceptance {
        if !self.is_acceptable(label, confidence) {
            if self.window.is_empty() {
                return Acceptance::Rejected;
            }
            debug!(
                label = %label,
                confidence,
                held = self.window.len(),
                "detection lost, clearing stability window"
            );
            self.clear();
            return Acceptance::Lost;
        }

        self.window.push_back(label.clone());
        if self.window.len() > self.config.capacity {
            self.window.pop_front();
        }

        match self.stable() {
            Some(stable) => Acceptance::Stable(stable),
            None => Acceptance::Accumulating {
                progress: self.progress(),
            },
        }
    }

    /// Label holding quorum in the current window, if any
    pub fn stable(&self) -> Option<Label> {
        let needed = self.config.quorum_count();
        if self.window.len() < needed {
            return None;
        }

        let mut counts: FxHashMap<&Label, usize> = FxHashMap::default();
        for label in &self.window {
            *counts.entry(label).or_insert(0) += 1;
        }

        let mut holders = self.window.iter().filter(|l| counts[l] >= needed);
        let first = holders.next()?;
        debug_assert!(
            holders.all(|l| l == first),
            "two labels cannot hold a quorum above one half"
        );
        Some(first.clone())
    }

    /// Fill level of the window in [0, 1]; 1 once a label is stable
    pub fn progress(&self) -> f32 {
        if self.stable().is_some() {
            return 1.0;
        }
        (self.window.len() as f32 / self.config.capacity as f32).min(1.0)
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}
