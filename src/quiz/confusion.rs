//! Mistake review: which tools were presented instead of the expected one
//!
//! Tracks:
//! - Confusion pairs (expected tool → presented tool)
//! - Cases answered with a harmful tool

use super::evaluator::{Outcome, OutcomeKind};
use super::label::Label;
use rustc_hash::FxHashMap;

/// One confusion pair with how often it occurred
#[derive(Clone, Debug, PartialEq)]
pub struct Confusion {
    pub expected: Label,
    pub given: Label,
    pub count: u32,
    pub harmful: bool,
}

/// Records wrong answers across a session
#[derive(Clone, Debug, Default)]
pub struct ConfusionLog {
    /// expected → (given → (count, harmful))
    pairs: FxHashMap<Label, FxHashMap<Label, (u32, bool)>>,
    /// Insertion order of pairs, for stable reporting
    order: Vec<(Label, Label)>,
    harmful_count: u32,
}

impl ConfusionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an evaluated answer; correct answers are ignored
    pub fn record(&mut self, outcome: &Outcome) {
        let (expected, given) = match outcome {
            Outcome::Correct { .. } => return,
            Outcome::HarmfulIncorrect { expected, given, .. }
            | Outcome::PlainIncorrect { expected, given, .. } => (expected, given),
        };
        let harmful = outcome.kind() == OutcomeKind::HarmfulIncorrect;
        if harmful {
            self.harmful_count += 1;
        }

        let slot = self
            .pairs
            .entry(expected.clone())
            .or_default()
            .entry(given.clone())
            .or_insert_with(|| {
                self.order.push((expected.clone(), given.clone()));
                (0, false)
            });
        slot.0 += 1;
        slot.1 |= harmful;
    }

    /// Confusions sorted by frequency, ties in first-seen order
    pub fn confusions(&self) -> Vec<Confusion> {
        let mut out: Vec<Confusion> = self
            .order
            .iter()
            .filter_map(|(expected, given)| {
                let &(count, harmful) = self.pairs.get(expected)?.get(given)?;
                Some(Confusion {
                    expected: expected.clone(),
                    given: given.clone(),
                    count,
                    harmful,
                })
            })
            .collect();
        out.sort_by(|a, b| b.count.cmp(&a.count));
        out
    }

    pub fn harmful_count(&self) -> u32 {
        self.harmful_count
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn reset(&mut self) {
        self.pairs.clear();
        self.order.clear();
        self.harmful_count = 0;
    }
}
