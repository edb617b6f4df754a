//! Collaborator interfaces the quiz renders through
//!
//! The state machine never touches the terminal or audio device directly;
//! it reports to a `PresentationSink`, and the runner plays cues on a
//! `FeedbackSink`.

use crate::quiz::{Case, Label, Outcome, OutcomeKind, Scoreboard, Summary};
use std::time::Duration;

/// Severity of a status line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// Everything the player sees
pub trait PresentationSink {
    fn status(&mut self, message: &str, level: StatusLevel);

    /// A new case is on screen; prior feedback and diagram are gone
    fn case_presented(&mut self, case: &Case, position: usize, total: usize);

    /// Tool currently in view, `None` when nothing recognizable is shown
    fn detected(&mut self, label: Option<&Label>);

    /// Stability indicator fill in [0, 1]
    fn stability(&mut self, progress: f32);

    fn scoreboard(&mut self, board: &Scoreboard);

    /// Evaluation result plus the diagram of the expected tool
    fn feedback(&mut self, outcome: &Outcome, diagram: &str);

    fn summary(&mut self, summary: &Summary);
}

impl<P: PresentationSink + ?Sized> PresentationSink for Box<P> {
    fn status(&mut self, message: &str, level: StatusLevel) {
        (**self).status(message, level)
    }

    fn case_presented(&mut self, case: &Case, position: usize, total: usize) {
        (**self).case_presented(case, position, total)
    }

    fn detected(&mut self, label: Option<&Label>) {
        (**self).detected(label)
    }

    fn stability(&mut self, progress: f32) {
        (**self).stability(progress)
    }

    fn scoreboard(&mut self, board: &Scoreboard) {
        (**self).scoreboard(board)
    }

    fn feedback(&mut self, outcome: &Outcome, diagram: &str) {
        (**self).feedback(outcome, diagram)
    }

    fn summary(&mut self, summary: &Summary) {
        (**self).summary(summary)
    }
}

/// Tone shape of an audio cue
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
}

/// Short tone played after an evaluation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cue {
    pub frequency_hz: f32,
    pub waveform: Waveform,
    pub duration: Duration,
}

impl Cue {
    pub const CORRECT: Cue = Cue {
        frequency_hz: 800.0,
        waveform: Waveform::Sine,
        duration: Duration::from_millis(200),
    };

    pub const WRONG: Cue = Cue {
        frequency_hz: 200.0,
        waveform: Waveform::Sawtooth,
        duration: Duration::from_millis(300),
    };

    pub fn for_outcome(kind: OutcomeKind) -> Cue {
        match kind {
            OutcomeKind::Correct => Cue::CORRECT,
            OutcomeKind::HarmfulIncorrect | OutcomeKind::PlainIncorrect => Cue::WRONG,
        }
    }
}

/// Audio output. Playback is best effort and cannot fail the game.
pub trait FeedbackSink {
    fn play(&mut self, cue: Cue);
}

impl<A: FeedbackSink + ?Sized> FeedbackSink for Box<A> {
    fn play(&mut self, cue: Cue) {
        (**self).play(cue)
    }
}

/// Feedback sink that stays silent
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl FeedbackSink for Silent {
    fn play(&mut self, _cue: Cue) {}
}
