//! Dental Tool Quiz - camera-driven tool recognition drills
//!
//! Single-session, self-contained CLI application.
//! Uses Candle for frame classification and crossterm for the UI.

use anyhow::{Context, Result};
use clap::Parser;
use dental_tool_quiz::cli::{Display, KeyboardScheduler, PlainDisplay, TerminalBell};
use dental_tool_quiz::game::{
    FeedbackSink, Game, IntervalScheduler, PresentationSink, Scheduler, Silent, StatusLevel,
};
use dental_tool_quiz::quiz::Session;
use dental_tool_quiz::vision::{FrameSource, LinearProbe, RawVideoSource};
use dental_tool_quiz::{QuizConfig, QuizError};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "Dental Tool Quiz")]
#[command(about = "Show the right dental tool to the camera for each case")]
struct Args {
    /// Config file (defaults to ./quiz.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model metadata JSON (overrides config)
    #[arg(long)]
    model_metadata: Option<PathBuf>,

    /// Model weights (overrides config)
    #[arg(long)]
    model_weights: Option<PathBuf>,

    /// Raw RGB24 frame stream, `-` for stdin
    #[arg(short, long, default_value = "-")]
    frames: String,

    /// Write logs to this file (the full-screen UI logs nowhere otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Line-oriented output without key controls; cases advance on their own
    #[arg(long)]
    plain: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Where log lines go
#[derive(Debug, PartialEq)]
enum LogTarget {
    File(PathBuf),
    Stderr,
    /// The full-screen UI owns the terminal; stray lines would garble it
    Discard,
}

impl LogTarget {
    fn for_args(args: &Args) -> Self {
        match (&args.log_file, args.plain) {
            (Some(path), _) => LogTarget::File(path.clone()),
            (None, true) => LogTarget::Stderr,
            (None, false) => LogTarget::Discard,
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let default_level = if args.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match LogTarget::for_args(args) {
        LogTarget::File(path) => {
            let file = File::create(&path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            subscriber
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // stdout belongs to the plain UI
        LogTarget::Stderr => subscriber.with_writer(io::stderr).init(),
        LogTarget::Discard => subscriber.with_writer(io::sink).init(),
    }
    Ok(())
}

fn open_frames(path: &str, size: usize) -> Result<Box<dyn FrameSource>> {
    if path == "-" {
        return Ok(Box::new(RawVideoSource::new(
            BufReader::new(io::stdin()),
            size,
            size,
        )));
    }
    let source =
        RawVideoSource::open(PathBuf::from(path).as_path(), size, size).map_err(QuizError::Camera)?;
    Ok(Box::new(source))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut config = QuizConfig::load(args.config.as_deref()).map_err(QuizError::from)?;
    if let Some(path) = &args.model_metadata {
        config.model.metadata = path.clone();
    }
    if let Some(path) = &args.model_weights {
        config.model.weights = path.clone();
    }
    let catalog = Arc::new(config.catalog().map_err(QuizError::from)?);

    let (mut presentation, audio, mut scheduler): (
        Box<dyn PresentationSink>,
        Box<dyn FeedbackSink>,
        Box<dyn Scheduler>,
    ) = if args.plain {
        (
            Box::new(PlainDisplay::new()),
            Box::new(Silent),
            Box::new(IntervalScheduler::new(config.tick.tick_interval())),
        )
    } else {
        let display = Display::new().map_err(|e| anyhow::anyhow!("terminal setup failed: {e}"))?;
        (
            Box::new(display),
            Box::new(TerminalBell),
            Box::new(KeyboardScheduler::new(config.tick.tick_interval())),
        )
    };

    presentation.status("Loading AI model...", StatusLevel::Info);
    let classifier = match LinearProbe::load(&config.model.metadata, &config.model.weights) {
        Ok(classifier) => classifier,
        Err(e) => {
            presentation.status(
                &format!("Failed to load model: {e}"),
                StatusLevel::Error,
            );
            return Err(QuizError::ClassifierLoad(e).into());
        }
    };
    presentation.status("Model ready!", StatusLevel::Info);

    let size = classifier.metadata().image_size;
    let frames = match open_frames(&args.frames, size) {
        Ok(frames) => frames,
        Err(e) => {
            presentation.status(&format!("Error: {e}"), StatusLevel::Error);
            return Err(e);
        }
    };

    let session = Session::new(catalog, config.stability.clone(), config.scoring.clone());
    let mut game = Game::new(classifier, frames, presentation, audio, session);
    if args.plain {
        game = game.with_auto_advance(config.tick.feedback_hold_ticks());
    }
    game.start().context("failed to start")?;

    let summary = game.run(scheduler.as_mut())?;

    // Restore the terminal before the farewell lines
    drop(game);
    println!(
        "Final score: {} | {}/{} correct ({}%) | {} mistakes",
        summary.score, summary.correct, summary.total, summary.percentage, summary.mistakes
    );
    Ok(())
}
