//! Case catalog: the ordered list of quiz prompts and harmful-answer table
//!
//! Loaded once and validated up front; a malformed catalog is a
//! configuration error, never a mid-session one.

use super::label::{Label, LabelSet};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Catalog construction failures
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("label alphabet is empty")]
    EmptyAlphabet,
    #[error("label `{0}` appears more than once in the alphabet")]
    DuplicateLabel(Label),
    #[error("catalog has no cases")]
    NoCases,
    #[error("case id `{0}` is defined more than once")]
    DuplicateCase(String),
    #[error("case `{case}` expects undefined label `{label}`")]
    UndefinedExpected { case: String, label: Label },
    #[error("harmful entry references unknown case `{0}`")]
    UnknownCase(String),
    #[error("harmful entry for case `{case}` uses undefined label `{label}`")]
    UndefinedHarmful { case: String, label: Label },
    #[error("harmful entry for case `{case}` names the expected answer `{label}`")]
    HarmfulIsExpected { case: String, label: Label },
    #[error("harmful entry for case `{case}` and answer `{label}` is defined more than once")]
    DuplicateHarmful { case: String, label: Label },
}

/// One quiz prompt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    /// Pathology image asset shown to the player
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    pub expected: Label,
}

impl Case {
    /// Diagram of the mouth region the expected tool is used on
    pub fn diagram(&self) -> String {
        format!("mouth-diagrams/{}.png", self.expected)
    }
}

/// A wrong answer that carries an extra penalty for one case
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmfulEntry {
    pub case: String,
    pub answer: Label,
    pub reason: String,
}

/// Validated, immutable catalog
#[derive(Clone, Debug)]
pub struct Catalog {
    labels: LabelSet,
    cases: Vec<Case>,
    harmful: Vec<HarmfulEntry>,
}

impl Catalog {
    pub fn new(
        labels: LabelSet,
        cases: Vec<Case>,
        harmful: Vec<HarmfulEntry>,
    ) -> Result<Self, CatalogError> {
        if labels.is_empty() {
            return Err(CatalogError::EmptyAlphabet);
        }
        let mut seen_labels = FxHashSet::default();
        for label in labels.iter() {
            if !seen_labels.insert(label) {
                return Err(CatalogError::DuplicateLabel(label.clone()));
            }
        }

        if cases.is_empty() {
            return Err(CatalogError::NoCases);
        }
        let mut seen_cases = FxHashSet::default();
        for case in &cases {
            if !seen_cases.insert(case.id.as_str()) {
                return Err(CatalogError::DuplicateCase(case.id.clone()));
            }
            if !labels.contains(&case.expected) {
                return Err(CatalogError::UndefinedExpected {
                    case: case.id.clone(),
                    label: case.expected.clone(),
                });
            }
        }

        let mut seen_pairs = FxHashSet::default();
        for entry in &harmful {
            let case = cases
                .iter()
                .find(|c| c.id == entry.case)
                .ok_or_else(|| CatalogError::UnknownCase(entry.case.clone()))?;
            if !labels.contains(&entry.answer) {
                return Err(CatalogError::UndefinedHarmful {
                    case: entry.case.clone(),
                    label: entry.answer.clone(),
                });
            }
            if case.expected == entry.answer {
                return Err(CatalogError::HarmfulIsExpected {
                    case: entry.case.clone(),
                    label: entry.answer.clone(),
                });
            }
            if !seen_pairs.insert((entry.case.as_str(), &entry.answer)) {
                return Err(CatalogError::DuplicateHarmful {
                    case: entry.case.clone(),
                    label: entry.answer.clone(),
                });
            }
        }

        Ok(Catalog {
            labels,
            cases,
            harmful,
        })
    }

    /// The six pathology cases of the dental tool kit
    pub fn builtin() -> Self {
        let case = |id: &str, description: &str, expected: &str| Case {
            id: id.to_string(),
            image: format!("pathology/{id}.png"),
            description: description.to_string(),
            expected: Label::from(expected),
        };
        let harmful = |case: &str, answer: &str, reason: &str| HarmfulEntry {
            case: case.to_string(),
            answer: Label::from(answer),
            reason: reason.to_string(),
        };

        let cases = vec![
            case("A", "Tartar buildup on lower molars", "7-8"),
            case("B", "Deep cavity requiring excavation", "11-12"),
            case("C", "General oral inspection needed", "1-2"),
            case("D", "Suspected occlusal decay", "9-10"),
            case("E", "Supragingival calculus", "13-14"),
            case("F", "Enamel preparation required", "17-18"),
        ];
        let entries = vec![
            harmful("A", "17-18", "Using drill on tartar can damage healthy enamel"),
            harmful("B", "7-8", "Scaler cannot treat deep cavities - excavation needed"),
            harmful("C", "11-12", "Never drill during general inspection without diagnosis"),
            harmful("D", "13-14", "Incorrect tool - explorer needed for decay detection"),
            harmful("E", "17-18", "Drill is excessive for calculus removal"),
            harmful("F", "7-8", "Scaler insufficient for enamel preparation"),
        ];

        Catalog {
            labels: LabelSet::dental_kit(),
            cases,
            harmful: entries,
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn case(&self, index: usize) -> Option<&Case> {
        self.cases.get(index)
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Harmful entry matching this case and answer exactly, if any
    pub fn harmful_lookup(&self, case_id: &str, answer: &Label) -> Option<&HarmfulEntry> {
        self.harmful
            .iter()
            .find(|entry| entry.case == case_id && &entry.answer == answer)
    }
}
