#![allow(dead_code)]

use dental_tool_quiz::game::{Cue, FeedbackSink, PresentationSink, StatusLevel};
use dental_tool_quiz::quiz::{
    Case, Catalog, Label, LabelSet, Outcome, OutcomeKind, Scoreboard, ScoringRules, Session,
    StabilityConfig, Summary,
};
use dental_tool_quiz::vision::{Classifier, ClassifierError, Frame, FrameError, FrameSource, Prediction};
use std::collections::VecDeque;
use std::sync::Arc;

/// Full probability list with `label` on top at `confidence`
pub fn predictions(label: &str, confidence: f32) -> Vec<Prediction> {
    let mut names: Vec<String> = LabelSet::dental_kit()
        .iter()
        .map(|l| l.as_str().to_string())
        .collect();
    names.push("Background".to_string());
    let rest = (1.0 - confidence) / (names.len() - 1) as f32;
    names
        .into_iter()
        .map(|name| {
            let p = if name == label { confidence } else { rest };
            Prediction::new(name, p)
        })
        .collect()
}

/// Classifier that replays queued results, then reports background
#[derive(Default)]
pub struct ScriptedClassifier {
    pub queue: VecDeque<Result<Vec<Prediction>, ClassifierError>>,
    pub calls: usize,
    pub classes: Option<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Result consumed by the start-up probe
    pub fn probe(self) -> Self {
        self.hold("Background", 0.99, 1)
    }

    pub fn hold(mut self, label: &str, confidence: f32, frames: usize) -> Self {
        for _ in 0..frames {
            self.queue.push_back(Ok(predictions(label, confidence)));
        }
        self
    }

    pub fn fail(mut self) -> Self {
        self.queue.push_back(Err(ClassifierError::Empty));
        self
    }
}

impl Classifier for ScriptedClassifier {
    fn predict(&mut self, _frame: &Frame) -> Result<Vec<Prediction>, ClassifierError> {
        self.calls += 1;
        self.queue
            .pop_front()
            .unwrap_or_else(|| Ok(predictions("Background", 0.99)))
    }

    fn class_names(&self) -> Vec<String> {
        self.classes
            .clone()
            .unwrap_or_else(|| predictions("Background", 1.0).into_iter().map(|p| p.class_name).collect())
    }
}

/// Frame source that replays queued results, then yields gray frames
#[derive(Default)]
pub struct ScriptedFrames {
    pub queue: VecDeque<Result<Frame, FrameError>>,
}

impl ScriptedFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, result: Result<Frame, FrameError>) -> Self {
        self.queue.push_back(result);
        self
    }
}

impl FrameSource for ScriptedFrames {
    fn next_frame(&mut self) -> Result<Frame, FrameError> {
        self.queue
            .pop_front()
            .unwrap_or_else(|| Ok(Frame::filled(2, 2, [128, 128, 128])))
    }
}

/// Presentation sink that keeps everything it is told
#[derive(Default)]
pub struct Recorder {
    pub statuses: Vec<(String, StatusLevel)>,
    pub presented: Vec<usize>,
    pub detected: Vec<Option<Label>>,
    pub progress: Vec<f32>,
    pub boards: Vec<Scoreboard>,
    pub feedback: Vec<(OutcomeKind, String, String)>,
    pub summaries: Vec<Summary>,
}

impl Recorder {
    pub fn last_progress(&self) -> f32 {
        self.progress.last().copied().unwrap_or(0.0)
    }
}

impl PresentationSink for Recorder {
    fn status(&mut self, message: &str, level: StatusLevel) {
        self.statuses.push((message.to_string(), level));
    }

    fn case_presented(&mut self, _case: &Case, position: usize, _total: usize) {
        self.presented.push(position);
    }

    fn detected(&mut self, label: Option<&Label>) {
        self.detected.push(label.cloned());
    }

    fn stability(&mut self, progress: f32) {
        self.progress.push(progress);
    }

    fn scoreboard(&mut self, board: &Scoreboard) {
        self.boards.push(*board);
    }

    fn feedback(&mut self, outcome: &Outcome, diagram: &str) {
        self.feedback
            .push((outcome.kind(), outcome.message(), diagram.to_string()));
    }

    fn summary(&mut self, summary: &Summary) {
        self.summaries.push(summary.clone());
    }
}

/// Feedback sink that keeps the cues it was asked to play
#[derive(Default)]
pub struct CueLog(pub Vec<Cue>);

impl FeedbackSink for CueLog {
    fn play(&mut self, cue: Cue) {
        self.0.push(cue);
    }
}

pub fn dental_session() -> Session {
    Session::new(
        Arc::new(Catalog::builtin()),
        StabilityConfig::default(),
        ScoringRules::default(),
    )
}
