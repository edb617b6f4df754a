//! Tool labels and the recognized label alphabet

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one recognizable tool class (e.g. `"7-8"`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Label(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label(name.to_string())
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label(name)
    }
}

/// Best (label, confidence) pair of one frame
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label: Label,
    /// Probability in [0, 1]
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<Label>, confidence: f32) -> Self {
        Detection {
            label: label.into(),
            confidence,
        }
    }
}

/// Fixed, ordered alphabet of labels eligible for stabilization.
///
/// Anything the classifier reports outside this set is treated as
/// "no detection".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    /// Build an alphabet. Order is preserved; duplicates and emptiness are
    /// rejected by catalog validation, not here.
    pub fn new<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        LabelSet {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Tool identifiers of the dental instrument kit
    pub fn dental_kit() -> Self {
        Self::new(["1-2", "7-8", "9-10", "11-12", "13-14", "17-18"])
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
