//! Answer evaluation: classify a stabilized answer against the active case

use super::catalog::{Case, Catalog};
use super::label::Label;
use serde::{Deserialize, Serialize};

/// Score deltas per outcome
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub correct: i32,
    pub harmful: i32,
    pub incorrect: i32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringRules {
            correct: 10,
            harmful: -8,
            incorrect: -3,
        }
    }
}

/// Outcome category, used for styling and audio cues
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Correct,
    HarmfulIncorrect,
    PlainIncorrect,
}

/// Evaluated answer with its score delta and feedback payload
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Correct {
        given: Label,
        delta: i32,
    },
    HarmfulIncorrect {
        given: Label,
        expected: Label,
        reason: String,
        delta: i32,
    },
    PlainIncorrect {
        given: Label,
        expected: Label,
        delta: i32,
    },
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Correct { .. } => OutcomeKind::Correct,
            Outcome::HarmfulIncorrect { .. } => OutcomeKind::HarmfulIncorrect,
            Outcome::PlainIncorrect { .. } => OutcomeKind::PlainIncorrect,
        }
    }

    pub fn delta(&self) -> i32 {
        match self {
            Outcome::Correct { delta, .. }
            | Outcome::HarmfulIncorrect { delta, .. }
            | Outcome::PlainIncorrect { delta, .. } => *delta,
        }
    }

    pub fn given(&self) -> &Label {
        match self {
            Outcome::Correct { given, .. }
            | Outcome::HarmfulIncorrect { given, .. }
            | Outcome::PlainIncorrect { given, .. } => given,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Correct { .. })
    }

    /// Player-facing feedback text
    pub fn message(&self) -> String {
        match self {
            Outcome::Correct { given, delta } => {
                format!("Correct! Tool {given} is appropriate\n{delta:+} points")
            }
            Outcome::HarmfulIncorrect {
                expected,
                reason,
                delta,
                ..
            } => {
                format!("HARMFUL CHOICE! {delta:+} points\n{reason}\nCorrect tool: {expected}")
            }
            Outcome::PlainIncorrect {
                given,
                expected,
                delta,
            } => {
                format!(
                    "Incorrect. {delta:+} points\nYou selected: Tool {given}\nCorrect tool: {expected}"
                )
            }
        }
    }
}

/// Pure evaluator over a catalog's harmful table
pub struct Evaluator<'a> {
    catalog: &'a Catalog,
    rules: &'a ScoringRules,
}

impl<'a> Evaluator<'a> {
    pub fn new(catalog: &'a Catalog, rules: &'a ScoringRules) -> Self {
        Evaluator { catalog, rules }
    }

    pub fn evaluate(&self, case: &Case, answer: &Label) -> Outcome {
        if answer == &case.expected {
            return Outcome::Correct {
                given: answer.clone(),
                delta: self.rules.correct,
            };
        }

        match self.catalog.harmful_lookup(&case.id, answer) {
            Some(entry) => Outcome::HarmfulIncorrect {
                given: answer.clone(),
                expected: case.expected.clone(),
                reason: entry.reason.clone(),
                delta: self.rules.harmful,
            },
            None => Outcome::PlainIncorrect {
                given: answer.clone(),
                expected: case.expected.clone(),
                delta: self.rules.incorrect,
            },
        }
    }
}

/// Apply a delta to a score, never going below zero
pub fn apply_delta(score: u32, delta: i32) -> u32 {
    let next = i64::from(score) + i64::from(delta);
    next.clamp(0, i64::from(u32::MAX)) as u32
}
