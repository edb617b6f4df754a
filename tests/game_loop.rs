mod common;

use common::{dental_session, CueLog, Recorder, ScriptedClassifier, ScriptedFrames};
use dental_tool_quiz::game::{Control, Cue, Game, IntervalScheduler, Script, StatusLevel};
use dental_tool_quiz::quiz::{Label, OutcomeKind, Phase};
use dental_tool_quiz::vision::{Frame, FrameError};
use dental_tool_quiz::QuizError;
use std::time::Duration;

type TestGame = Game<ScriptedClassifier, ScriptedFrames, Recorder, CueLog>;

fn game(classifier: ScriptedClassifier, frames: ScriptedFrames) -> TestGame {
    Game::new(
        classifier,
        frames,
        Recorder::default(),
        CueLog::default(),
        dental_session(),
    )
}

// ── Startup ──────────────────────────────────────────────────────────────

#[test]
fn start_presents_first_case() {
    let mut g = game(ScriptedClassifier::new().probe(), ScriptedFrames::new());
    g.start().unwrap();

    assert!(g.is_running());
    assert_eq!(g.session().phase(), Phase::AwaitingAnswer(0));
    assert_eq!(g.presentation().presented, vec![0]);
    let statuses: Vec<&str> = g
        .presentation()
        .statuses
        .iter()
        .map(|(m, _)| m.as_str())
        .collect();
    assert_eq!(statuses, vec!["Starting game...", "Game started!"]);
}

#[test]
fn camera_failure_blocks_start() {
    let frames = ScriptedFrames::new().then(Err(FrameError::EndOfStream));
    let mut g = game(ScriptedClassifier::new().probe(), frames);

    let err = g.start().unwrap_err();
    assert!(matches!(err, QuizError::Camera(_)));
    assert!(err.is_startup());
    assert!(!g.is_running());
    assert_eq!(g.session().phase(), Phase::Idle);
    let (message, level) = g.presentation().statuses.last().unwrap();
    assert_eq!(*level, StatusLevel::Error);
    assert!(message.starts_with("Error:"));
}

#[test]
fn classifier_missing_a_tool_blocks_start() {
    let mut classifier = ScriptedClassifier::new().probe();
    classifier.classes = Some(vec!["1-2".to_string(), "7-8".to_string()]);
    let mut g = game(classifier, ScriptedFrames::new());

    let err = g.start().unwrap_err();
    assert!(matches!(err, QuizError::UnknownTool(label) if label == Label::from("9-10")));
    assert_eq!(g.session().phase(), Phase::Idle);
}

#[test]
fn classifier_failing_on_probe_frame_blocks_start() {
    let mut g = game(ScriptedClassifier::new().fail(), ScriptedFrames::new());
    assert!(matches!(g.start(), Err(QuizError::ClassifierProbe(_))));
}

// ── Per-tick step ────────────────────────────────────────────────────────

#[test]
fn held_correct_tool_scores_once() {
    let classifier = ScriptedClassifier::new().probe().hold("7-8", 0.95, 20);
    let mut g = game(classifier, ScriptedFrames::new());
    g.start().unwrap();

    let outcomes: Vec<_> = (0..20).filter_map(|_| g.tick()).collect();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].kind(), OutcomeKind::Correct);
    assert_eq!(g.session().phase(), Phase::Evaluated(0));
    assert_eq!(g.session().board().score, 10);
    assert_eq!(g.session().board().correct, 1);
    assert_eq!(g.audio().0, vec![Cue::CORRECT]);

    let (_, _, diagram) = &g.presentation().feedback[0];
    assert_eq!(diagram, "mouth-diagrams/7-8.png");
}

#[test]
fn harmful_choice_after_correct_answer() {
    let classifier = ScriptedClassifier::new()
        .probe()
        .hold("7-8", 0.95, 13)
        .hold("7-8", 0.95, 13);
    let script = Script::new().ticks(13).control(Control::Next).ticks(13);
    let mut g = game(classifier, ScriptedFrames::new());
    g.start().unwrap();

    let summary = g.run(&mut script.clone()).unwrap();

    assert_eq!(summary.score, 2);
    assert_eq!(summary.correct, 1);
    assert_eq!(summary.mistakes, 1);
    assert_eq!(summary.harmful, 1);
    assert_eq!(g.audio().0, vec![Cue::CORRECT, Cue::WRONG]);

    let (kind, message, _) = &g.presentation().feedback[1];
    assert_eq!(*kind, OutcomeKind::HarmfulIncorrect);
    assert!(message.contains("Scaler cannot treat deep cavities"));
    assert!(message.contains("11-12"));
}

#[test]
fn classifier_error_leaves_window_untouched() {
    let classifier = ScriptedClassifier::new()
        .probe()
        .hold("9-10", 0.9, 6)
        .fail()
        .hold("9-10", 0.9, 7);
    let mut g = game(classifier, ScriptedFrames::new());
    g.start().unwrap();

    for _ in 0..7 {
        assert!(g.tick().is_none());
    }
    assert_eq!(g.session().buffer().len(), 6);
    assert!(g.is_running());

    let outcomes: Vec<_> = (0..7).filter_map(|_| g.tick()).collect();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].kind(), OutcomeKind::PlainIncorrect);
}

#[test]
fn transient_frame_error_is_skipped() {
    // the first frame answers the start-up probe
    let frames = ScriptedFrames::new()
        .then(Ok(Frame::filled(2, 2, [0, 0, 0])))
        .then(Err(FrameError::Io(std::io::Error::new(
            std::io::ErrorKind::WouldBlock,
            "camera busy",
        ))));
    let classifier = ScriptedClassifier::new().probe().hold("1-2", 0.9, 3);
    let mut g = game(classifier, frames);
    g.start().unwrap();

    assert!(g.tick().is_none());
    assert!(g.is_running());
    assert!(g.session().buffer().is_empty());
    g.tick();
    g.tick();
    assert_eq!(g.session().buffer().len(), 2);
}

#[test]
fn low_confidence_frame_resets_progress() {
    let classifier = ScriptedClassifier::new()
        .probe()
        .hold("13-14", 0.9, 10)
        .hold("13-14", 0.4, 1)
        .hold("13-14", 0.9, 12);
    let mut g = game(classifier, ScriptedFrames::new());
    g.start().unwrap();

    for _ in 0..11 {
        assert!(g.tick().is_none());
    }
    assert_eq!(g.presentation().last_progress(), 0.0);
    // 12 fresh frames are still one short of the quorum
    for _ in 0..12 {
        assert!(g.tick().is_none());
    }
    assert_eq!(g.presentation().last_progress(), 0.75);
}

#[test]
fn unknown_class_shows_no_tool() {
    let classifier = ScriptedClassifier::new().probe().hold("Background", 0.99, 1);
    let mut g = game(classifier, ScriptedFrames::new());
    g.start().unwrap();
    g.tick();
    assert_eq!(g.presentation().detected.last(), Some(&None));
}

// ── Controls and loop ────────────────────────────────────────────────────

#[test]
fn end_of_stream_stops_loop() {
    let frames = ScriptedFrames::new()
        .then(Ok(Frame::filled(2, 2, [0, 0, 0])))
        .then(Err(FrameError::EndOfStream));
    let mut g = game(ScriptedClassifier::new().probe(), frames);
    g.start().unwrap();

    let mut script = Script::new().ticks(5);
    g.run(&mut script).unwrap();

    assert!(!g.is_running());
    assert_eq!(script.remaining(), 4);
}

#[test]
fn quit_clears_running_flag() {
    let mut g = game(ScriptedClassifier::new().probe(), ScriptedFrames::new());
    g.start().unwrap();
    let running = g.running();

    let mut script = Script::new().ticks(2).control(Control::Quit).ticks(3);
    g.run(&mut script).unwrap();

    assert!(!running.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(script.remaining(), 3);
}

#[test]
fn skipping_every_case_completes_without_answers() {
    let mut g = game(ScriptedClassifier::new().probe(), ScriptedFrames::new());
    g.start().unwrap();

    for _ in 0..6 {
        g.handle(Control::Next);
    }
    assert_eq!(g.session().phase(), Phase::Completed);
    let summary = &g.presentation().summaries[0];
    assert_eq!(summary.correct + summary.mistakes, 0);
    assert_eq!(summary.percentage, 0);

    g.tick();
    g.tick();
    assert_eq!(g.session().board().answered(), 0);
}

#[test]
fn completed_session_stops_classifying() {
    let classifier = ScriptedClassifier::new().probe();
    let mut g = game(classifier, ScriptedFrames::new());
    g.start().unwrap();
    for _ in 0..6 {
        g.handle(Control::Next);
    }

    let before = g.presentation().detected.len();
    for _ in 0..5 {
        assert!(g.tick().is_none());
    }
    assert_eq!(g.presentation().detected.len(), before);
}

#[test]
fn restart_resets_score_and_case() {
    let classifier = ScriptedClassifier::new().probe().hold("7-8", 0.95, 13);
    let mut g = game(classifier, ScriptedFrames::new());
    g.start().unwrap();
    for _ in 0..13 {
        g.tick();
    }
    g.handle(Control::Next);
    assert_eq!(g.session().board().score, 10);

    g.handle(Control::Restart);
    assert_eq!(g.session().phase(), Phase::AwaitingAnswer(0));
    assert_eq!(g.session().board().score, 0);
    assert_eq!(g.presentation().presented, vec![0, 1, 0]);
    assert_eq!(g.presentation().boards.last().unwrap().score, 0);
}

#[test]
fn next_mid_accumulation_starts_next_case_from_empty_window() {
    let classifier = ScriptedClassifier::new()
        .probe()
        .hold("11-12", 0.9, 12)
        .hold("11-12", 0.9, 1);
    let mut g = game(classifier, ScriptedFrames::new());
    g.start().unwrap();

    for _ in 0..12 {
        assert!(g.tick().is_none());
    }
    assert_eq!(g.session().buffer().len(), 12);

    g.handle(Control::Next);
    assert!(g.session().buffer().is_empty());
    assert_eq!(g.presentation().last_progress(), 0.0);

    // case B expects 11-12, but one frame is far from the quorum
    assert!(g.tick().is_none());
    assert_eq!(g.session().phase(), Phase::AwaitingAnswer(1));
    assert_eq!(g.session().buffer().len(), 1);
}

// ── Unattended runs ──────────────────────────────────────────────────────

#[test]
fn auto_advance_walks_every_case_and_stops() {
    let mut classifier = ScriptedClassifier::new().probe();
    for tool in ["7-8", "11-12", "1-2", "9-10", "13-14", "17-18"] {
        // two feedback ticks still classify before the case moves on
        classifier = classifier
            .hold(tool, 0.95, 13)
            .hold("Background", 0.99, 2);
    }
    let mut g = game(classifier, ScriptedFrames::new()).with_auto_advance(2);
    g.start().unwrap();

    let summary = g.run(&mut IntervalScheduler::new(Duration::ZERO)).unwrap();

    assert!(!g.is_running());
    assert_eq!(g.session().phase(), Phase::Completed);
    assert_eq!(g.presentation().presented, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(summary.correct, 6);
    assert_eq!(summary.score, 60);
    assert_eq!(g.presentation().summaries.len(), 1);
}

#[test]
fn auto_advance_holds_feedback_before_moving_on() {
    let classifier = ScriptedClassifier::new().probe().hold("7-8", 0.95, 13);
    let mut g = game(classifier, ScriptedFrames::new()).with_auto_advance(3);
    g.start().unwrap();

    for _ in 0..13 {
        g.tick();
    }
    assert_eq!(g.session().phase(), Phase::Evaluated(0));
    for _ in 0..3 {
        g.tick();
        assert_eq!(g.session().phase(), Phase::Evaluated(0));
    }
    g.tick();
    assert_eq!(g.session().phase(), Phase::AwaitingAnswer(1));
}

#[test]
fn without_auto_advance_evaluated_case_waits_for_next() {
    let classifier = ScriptedClassifier::new().probe().hold("7-8", 0.95, 13);
    let mut g = game(classifier, ScriptedFrames::new());
    g.start().unwrap();

    for _ in 0..40 {
        g.tick();
    }
    assert_eq!(g.session().phase(), Phase::Evaluated(0));
    assert_eq!(g.presentation().presented, vec![0]);
}
