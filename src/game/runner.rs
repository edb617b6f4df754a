//! Game runner: wires camera, classifier, session, and sinks together
//!
//! One tick = pull a frame, classify it, feed the detection to the session.
//! Ticks never overlap; the running flag is checked between them.

use super::scheduler::{Control, Scheduler, Wake};
use super::sink::{Cue, FeedbackSink, PresentationSink, StatusLevel};
use crate::error::QuizError;
use crate::quiz::{Outcome, Phase, Session, Summary};
use crate::vision::{classify, Classifier, FrameSource};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct Game<C, F, P, A> {
    classifier: C,
    frames: F,
    presentation: P,
    audio: A,
    session: Session,
    running: Arc<AtomicBool>,
    /// Ticks to keep feedback up before moving on by itself; `None` waits
    /// for `Control::Next`
    auto_advance: Option<u32>,
    /// Ticks spent in `Evaluated` so far
    held: u32,
}

impl<C, F, P, A> Game<C, F, P, A>
where
    C: Classifier,
    F: FrameSource,
    P: PresentationSink,
    A: FeedbackSink,
{
    pub fn new(classifier: C, frames: F, presentation: P, audio: A, session: Session) -> Self {
        Game {
            classifier,
            frames,
            presentation,
            audio,
            session,
            running: Arc::new(AtomicBool::new(false)),
            auto_advance: None,
            held: 0,
        }
    }

    /// Advance on its own `hold_ticks` ticks after each evaluation, and stop
    /// the loop once the session completes. For runs without key controls.
    pub fn with_auto_advance(mut self, hold_ticks: u32) -> Self {
        self.auto_advance = Some(hold_ticks);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Flag that keeps the loop alive; clearing it stops the loop at the
    /// next tick boundary
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Check the classifier and camera, then present the first case.
    ///
    /// Any failure here is fatal: the session does not start.
    pub fn start(&mut self) -> Result<(), QuizError> {
        self.presentation.status("Starting game...", StatusLevel::Info);

        if let Err(e) = self.probe() {
            error!(error = %e, "game start failed");
            self.presentation
                .status(&format!("Error: {e}"), StatusLevel::Error);
            return Err(e);
        }

        self.running.store(true, Ordering::SeqCst);
        self.session.start(&mut self.presentation);
        self.presentation.status("Game started!", StatusLevel::Info);
        Ok(())
    }

    fn probe(&mut self) -> Result<(), QuizError> {
        let classes = self.classifier.class_names();
        for label in self.session.catalog().labels().iter() {
            if !classes.iter().any(|c| c == label.as_str()) {
                return Err(QuizError::UnknownTool(label.clone()));
            }
        }

        let frame = self.frames.next_frame().map_err(QuizError::Camera)?;
        debug!(
            width = frame.width(),
            height = frame.height(),
            "camera ready"
        );
        classify(&mut self.classifier, &frame).map_err(QuizError::ClassifierProbe)?;
        Ok(())
    }

    /// One polling step. Camera and classifier failures are swallowed;
    /// the next tick is the retry.
    pub fn tick(&mut self) -> Option<Outcome> {
        match self.session.phase() {
            Phase::AwaitingAnswer(_) => {}
            Phase::Evaluated(_) => {
                if self.feedback_elapsed() {
                    self.session.advance(&mut self.presentation);
                    return None;
                }
            }
            Phase::Completed if self.auto_advance.is_some() => {
                self.stop();
                return None;
            }
            Phase::Idle | Phase::Completed => return None,
        }

        let frame = match self.frames.next_frame() {
            Ok(frame) => frame,
            Err(e) if e.is_terminal() => {
                warn!(error = %e, "frame source closed, stopping");
                self.presentation
                    .status(&format!("Camera stopped: {e}"), StatusLevel::Error);
                self.stop();
                return None;
            }
            Err(e) => {
                warn!(error = %e, "frame skipped");
                return None;
            }
        };

        let detection = match classify(&mut self.classifier, &frame) {
            Ok(detection) => detection,
            Err(e) => {
                warn!(error = %e, "prediction failed");
                return None;
            }
        };

        let outcome = self.session.observe(&detection, &mut self.presentation)?;
        self.held = 0;
        self.audio.play(Cue::for_outcome(outcome.kind()));
        Some(outcome)
    }

    fn feedback_elapsed(&mut self) -> bool {
        let Some(hold) = self.auto_advance else {
            return false;
        };
        self.held += 1;
        if self.held <= hold {
            return false;
        }
        debug!(held = self.held, "feedback shown, advancing");
        self.held = 0;
        true
    }

    /// Apply a player control
    pub fn handle(&mut self, control: Control) {
        debug!(?control, "control");
        self.held = 0;
        match control {
            Control::Next => self.session.advance(&mut self.presentation),
            Control::Restart => {
                self.session.reset(&mut self.presentation);
                self.session.start(&mut self.presentation);
                self.presentation.status("Game restarted", StatusLevel::Info);
            }
            Control::Quit => self.stop(),
        }
    }

    pub fn stop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("game loop stopping");
        }
    }

    /// Poll until the running flag is cleared; returns the totals at exit
    pub fn run<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) -> Result<Summary, QuizError> {
        while self.is_running() {
            match scheduler.wait()? {
                Wake::Tick => {
                    self.tick();
                }
                Wake::Control(control) => self.handle(control),
            }
        }
        Ok(self.session.summary())
    }
}
