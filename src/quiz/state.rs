//! Game session state machine
//!
//! Sequence per case:
//! - Presenting: case shown, stability window emptied
//! - AwaitingAnswer: detections feed the stability window
//! - Evaluated: one stable answer scored; further detections ignored
//! - advance: next case, or Completed after the last one

use super::catalog::Catalog;
use super::confusion::{Confusion, ConfusionLog};
use super::evaluator::{apply_delta, Evaluator, Outcome, ScoringRules};
use super::label::{Detection, Label};
use super::stability::{Acceptance, StabilityBuffer, StabilityConfig};
use crate::game::sink::PresentationSink;
use std::sync::Arc;
use tracing::{debug, info};

/// Where the session is in its case sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Not started, or reset
    Idle,
    /// Case shown, waiting for a stable detection
    AwaitingAnswer(usize),
    /// Case answered, waiting for `advance`
    Evaluated(usize),
    /// All cases done; terminal
    Completed,
}

/// Running score and counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u32,
    pub correct: u32,
    pub mistakes: u32,
}

impl Scoreboard {
    /// Apply an outcome's delta (floored at zero) and bump its counter
    pub fn apply(&mut self, outcome: &Outcome) {
        self.score = apply_delta(self.score, outcome.delta());
        if outcome.is_correct() {
            self.correct += 1;
        } else {
            self.mistakes += 1;
        }
    }

    pub fn answered(&self) -> u32 {
        self.correct + self.mistakes
    }
}

/// Final report shown on completion
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub score: u32,
    pub correct: u32,
    pub mistakes: u32,
    pub total: usize,
    /// correct / total in [0, 1]
    pub accuracy: f32,
    /// Accuracy as a rounded percentage
    pub percentage: u32,
    pub harmful: u32,
    pub confusions: Vec<Confusion>,
}

/// One quiz run over a catalog
#[derive(Clone, Debug)]
pub struct Session {
    catalog: Arc<Catalog>,
    rules: ScoringRules,
    buffer: StabilityBuffer,
    board: Scoreboard,
    confusions: ConfusionLog,
    phase: Phase,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, stability: StabilityConfig, rules: ScoringRules) -> Self {
        let buffer = StabilityBuffer::new(stability, catalog.labels().clone());
        Session {
            catalog,
            rules,
            buffer,
            board: Scoreboard::default(),
            confusions: ConfusionLog::new(),
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Scoreboard {
        &self.board
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn buffer(&self) -> &StabilityBuffer {
        &self.buffer
    }

    /// Index of the case on screen; `None` when idle or completed
    pub fn current_case(&self) -> Option<usize> {
        match self.phase {
            Phase::AwaitingAnswer(i) | Phase::Evaluated(i) => Some(i),
            Phase::Idle | Phase::Completed => None,
        }
    }

    pub fn awaiting_answer(&self) -> bool {
        matches!(self.phase, Phase::AwaitingAnswer(_))
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    /// Reset counters and present the first case
    pub fn start(&mut self, sink: &mut dyn PresentationSink) {
        self.board = Scoreboard::default();
        self.confusions.reset();
        info!(cases = self.catalog.len(), "session started");
        sink.scoreboard(&self.board);
        self.present_case(0, sink);
    }

    /// Drop all progress and return to `Idle`
    pub fn reset(&mut self, sink: &mut dyn PresentationSink) {
        self.board = Scoreboard::default();
        self.confusions.reset();
        self.buffer.clear();
        self.phase = Phase::Idle;
        info!("session reset");
        sink.scoreboard(&self.board);
        sink.stability(0.0);
    }

    /// Show case `index` and start waiting for its answer
    pub fn present_case(&mut self, index: usize, sink: &mut dyn PresentationSink) {
        let Some(case) = self.catalog.case(index) else {
            debug!(index, "no such case, completing");
            self.complete(sink);
            return;
        };

        self.buffer.clear();
        self.phase = Phase::AwaitingAnswer(index);
        info!(index, case = %case.id, "presenting case");
        sink.case_presented(case, index, self.catalog.len());
        sink.stability(0.0);
    }

    /// Per-tick step: feed one frame's detection through the stability window.
    ///
    /// Returns the outcome when this detection completed an answer.
    pub fn observe(
        &mut self,
        detection: &Detection,
        sink: &mut dyn PresentationSink,
    ) -> Option<Outcome> {
        let known = self.catalog.labels().contains(&detection.label);
        sink.detected(known.then_some(&detection.label));

        if !self.awaiting_answer() {
            self.buffer.clear();
            sink.stability(0.0);
            return None;
        }

        match self.buffer.accept(&detection.label, detection.confidence) {
            Acceptance::Accumulating { progress } => {
                debug!(label = %detection.label, progress, "accumulating");
                sink.stability(progress);
                None
            }
            Acceptance::Stable(label) => {
                sink.stability(1.0);
                self.on_stable_detection(&label, sink)
            }
            Acceptance::Lost => {
                sink.stability(0.0);
                None
            }
            Acceptance::Rejected => None,
        }
    }

    /// Score a stabilized answer. One-shot per case: ignored unless the
    /// session is awaiting an answer.
    pub fn on_stable_detection(
        &mut self,
        label: &Label,
        sink: &mut dyn PresentationSink,
    ) -> Option<Outcome> {
        let Phase::AwaitingAnswer(index) = self.phase else {
            debug!(label = %label, phase = ?self.phase, "stable detection ignored");
            return None;
        };
        let case = self.catalog.case(index)?;

        self.phase = Phase::Evaluated(index);
        self.buffer.clear();
        sink.stability(0.0);

        let outcome = Evaluator::new(&self.catalog, &self.rules).evaluate(case, label);
        self.board.apply(&outcome);
        self.confusions.record(&outcome);
        info!(
            case = %case.id,
            answer = %label,
            kind = ?outcome.kind(),
            delta = outcome.delta(),
            score = self.board.score,
            "answer evaluated"
        );

        sink.feedback(&outcome, &case.diagram());
        sink.scoreboard(&self.board);
        Some(outcome)
    }

    /// Move to the next case, or complete after the last one.
    ///
    /// Advancing while still awaiting an answer skips the case.
    pub fn advance(&mut self, sink: &mut dyn PresentationSink) {
        let index = match self.phase {
            Phase::AwaitingAnswer(i) | Phase::Evaluated(i) => i,
            Phase::Idle | Phase::Completed => {
                debug!(phase = ?self.phase, "advance ignored");
                return;
            }
        };
        if self.phase == Phase::AwaitingAnswer(index) {
            info!(index, "case skipped");
        }

        let next = index + 1;
        if next < self.catalog.len() {
            self.present_case(next, sink);
        } else {
            self.complete(sink);
        }
    }

    fn complete(&mut self, sink: &mut dyn PresentationSink) {
        self.phase = Phase::Completed;
        self.buffer.clear();
        let summary = self.summary();
        info!(
            score = summary.score,
            correct = summary.correct,
            total = summary.total,
            "session completed"
        );
        sink.stability(0.0);
        sink.summary(&summary);
    }

    /// Current totals against the whole catalog
    pub fn summary(&self) -> Summary {
        let total = self.catalog.len();
        let accuracy = if total == 0 {
            0.0
        } else {
            self.board.correct as f32 / total as f32
        };
        Summary {
            score: self.board.score,
            correct: self.board.correct,
            mistakes: self.board.mistakes,
            total,
            accuracy,
            percentage: (accuracy * 100.0).round() as u32,
            harmful: self.confusions.harmful_count(),
            confusions: self.confusions.confusions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{Case, OutcomeKind};

    /// Sink that only counts what it is told
    #[derive(Default)]
    struct Counting {
        presented: Vec<usize>,
        feedback: Vec<OutcomeKind>,
        summaries: Vec<Summary>,
        last_progress: f32,
    }

    impl PresentationSink for Counting {
        fn status(&mut self, _message: &str, _level: crate::game::sink::StatusLevel) {}
        fn case_presented(&mut self, _case: &Case, position: usize, _total: usize) {
            self.presented.push(position);
        }
        fn detected(&mut self, _label: Option<&Label>) {}
        fn stability(&mut self, progress: f32) {
            self.last_progress = progress;
        }
        fn scoreboard(&mut self, _board: &Scoreboard) {}
        fn feedback(&mut self, outcome: &Outcome, _diagram: &str) {
            self.feedback.push(outcome.kind());
        }
        fn summary(&mut self, summary: &Summary) {
            self.summaries.push(summary.clone());
        }
    }

    fn session() -> Session {
        Session::new(
            Arc::new(Catalog::builtin()),
            StabilityConfig::default(),
            ScoringRules::default(),
        )
    }

    fn hold(session: &mut Session, sink: &mut Counting, label: &str, frames: usize) -> Option<Outcome> {
        let detection = Detection::new(label, 0.95);
        let mut result = None;
        for _ in 0..frames {
            if let Some(outcome) = session.observe(&detection, sink) {
                result = Some(outcome);
            }
        }
        result
    }

    #[test]
    fn test_start_presents_first_case() {
        let mut s = session();
        let mut sink = Counting::default();
        assert_eq!(s.phase(), Phase::Idle);
        s.start(&mut sink);
        assert_eq!(s.phase(), Phase::AwaitingAnswer(0));
        assert_eq!(sink.presented, vec![0]);
    }

    #[test]
    fn test_stable_correct_answer_scores() {
        let mut s = session();
        let mut sink = Counting::default();
        s.start(&mut sink);

        assert!(hold(&mut s, &mut sink, "7-8", 12).is_none());
        let outcome = hold(&mut s, &mut sink, "7-8", 1).expect("stable after 13 frames");
        assert_eq!(outcome.kind(), OutcomeKind::Correct);
        assert_eq!(s.phase(), Phase::Evaluated(0));
        assert_eq!(s.board().score, 10);
        assert_eq!(s.board().correct, 1);
        assert_eq!(s.board().mistakes, 0);
        assert!(s.buffer().is_empty());
        assert_eq!(sink.last_progress, 0.0);
    }

    #[test]
    fn test_second_stable_detection_is_ignored() {
        let mut s = session();
        let mut sink = Counting::default();
        s.start(&mut sink);
        s.on_stable_detection(&Label::from("7-8"), &mut sink);
        let before = *s.board();

        assert!(s.on_stable_detection(&Label::from("17-18"), &mut sink).is_none());
        assert!(hold(&mut s, &mut sink, "17-18", 20).is_none());
        assert_eq!(*s.board(), before);
        assert_eq!(sink.feedback.len(), 1);
    }

    #[test]
    fn test_score_floor_on_harmful_answer() {
        let rules = ScoringRules {
            correct: 2,
            ..ScoringRules::default()
        };
        let mut s = Session::new(Arc::new(Catalog::builtin()), StabilityConfig::default(), rules);
        let mut sink = Counting::default();
        s.start(&mut sink);
        s.on_stable_detection(&Label::from("7-8"), &mut sink);
        assert_eq!(s.board().score, 2);

        s.advance(&mut sink);
        // case B: 7-8 is the harmful scaler choice
        let outcome = s.on_stable_detection(&Label::from("7-8"), &mut sink).unwrap();
        assert_eq!(outcome.kind(), OutcomeKind::HarmfulIncorrect);
        assert_eq!(s.board().score, 0);
        assert_eq!(s.board().mistakes, 1);
    }

    #[test]
    fn test_advance_through_all_cases_completes() {
        let mut s = session();
        let mut sink = Counting::default();
        s.start(&mut sink);
        s.on_stable_detection(&Label::from("7-8"), &mut sink);
        s.advance(&mut sink);
        s.on_stable_detection(&Label::from("1-2"), &mut sink);

        for _ in 1..s.catalog().len() {
            s.advance(&mut sink);
        }
        assert!(s.is_completed());
        assert_eq!(sink.summaries.len(), 1);

        let summary = &sink.summaries[0];
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.mistakes, 1);
        assert_eq!(summary.total, 6);
        assert_eq!(summary.percentage, 17);
        assert!(summary.correct + summary.mistakes <= summary.total as u32);

        s.advance(&mut sink);
        assert_eq!(sink.summaries.len(), 1);
    }

    #[test]
    fn test_completed_ignores_detections() {
        let mut s = session();
        let mut sink = Counting::default();
        s.start(&mut sink);
        for _ in 0..s.catalog().len() {
            s.advance(&mut sink);
        }
        assert!(s.is_completed());
        assert!(hold(&mut s, &mut sink, "7-8", 20).is_none());
        assert_eq!(s.board().answered(), 0);
    }

    #[test]
    fn test_low_confidence_frame_resets_progress() {
        let mut s = session();
        let mut sink = Counting::default();
        s.start(&mut sink);
        hold(&mut s, &mut sink, "7-8", 8);
        assert_eq!(sink.last_progress, 0.5);

        s.observe(&Detection::new("7-8", 0.3), &mut sink);
        assert_eq!(sink.last_progress, 0.0);
        assert!(s.buffer().is_empty());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut s = session();
        let mut sink = Counting::default();
        s.start(&mut sink);
        s.on_stable_detection(&Label::from("7-8"), &mut sink);
        s.reset(&mut sink);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(*s.board(), Scoreboard::default());
        assert!(s.on_stable_detection(&Label::from("7-8"), &mut sink).is_none());
    }
}
