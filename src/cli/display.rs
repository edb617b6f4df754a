//! Terminal display and UI rendering
//!
//! Features:
//! - Case prompt with pathology image asset
//! - Live detected-tool indicator and stability bar
//! - Color-coded answer feedback with the expected tool's diagram
//! - Scoreboard and final summary

use crate::game::sink::{PresentationSink, StatusLevel};
use crate::quiz::{Case, Label, Outcome, OutcomeKind, Scoreboard, Summary};
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{stdout, Write};
use tracing::warn;

const ROW_STATUS: u16 = 1;
const ROW_CASE: u16 = 3;
const ROW_DETECTED: u16 = 6;
const ROW_STABILITY: u16 = 7;
const ROW_SCORE: u16 = 9;
const ROW_FEEDBACK: u16 = 11;
const ROW_HELP: u16 = 17;
const BAR_WIDTH: usize = 30;

type DrawResult = Result<(), Box<dyn std::error::Error>>;

/// Row spans `(start, count)` a new case overwrites. The summary reaches
/// down to the help line, so after one everything above it goes.
fn case_spans(after_summary: bool) -> &'static [(u16, u16)] {
    if after_summary {
        &[(ROW_CASE, ROW_HELP - ROW_CASE)]
    } else {
        &[(ROW_CASE, 2), (ROW_FEEDBACK, 5)]
    }
}

/// Full-screen terminal renderer
pub struct Display {
    /// Whether raw mode is enabled
    raw_mode: bool,
    /// Last rendered stability cell count, to skip redundant redraws
    last_bar: Option<usize>,
    last_detected: Option<Option<Label>>,
    /// Summary rows are still on screen
    summary_shown: bool,
    /// Redrawn after the summary is wiped
    board: Scoreboard,
}

impl Display {
    /// Take over the terminal: raw mode, cleared screen
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        terminal::enable_raw_mode()?;
        let display = Display {
            raw_mode: true,
            last_bar: None,
            last_detected: None,
            summary_shown: false,
            board: Scoreboard::default(),
        };
        display.clear()?;
        display.header()?;
        Ok(display)
    }

    /// Clear screen
    pub fn clear(&self) -> DrawResult {
        let mut stdout = stdout();
        execute!(
            stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(())
    }

    fn header(&self) -> DrawResult {
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Cyan),
            Print("Dental Tool Quiz"),
            ResetColor,
            cursor::MoveTo(0, ROW_HELP),
            SetForegroundColor(Color::DarkGrey),
            Print("N next case  |  R restart  |  Q / Esc quit"),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Clear `count` rows starting at `row`, leaving the cursor at `row`
    fn clear_rows(&self, row: u16, count: u16) -> DrawResult {
        let mut stdout = stdout();
        for r in row..row + count {
            execute!(
                stdout,
                cursor::MoveTo(0, r),
                terminal::Clear(ClearType::CurrentLine)
            )?;
        }
        execute!(stdout, cursor::MoveTo(0, row))?;
        Ok(())
    }

    fn draw_status(&self, message: &str, level: StatusLevel) -> DrawResult {
        self.clear_rows(ROW_STATUS, 1)?;
        let color = match level {
            StatusLevel::Info => Color::White,
            StatusLevel::Error => Color::Red,
        };
        let mut stdout = stdout();
        execute!(stdout, SetForegroundColor(color), Print(message), ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    fn draw_case(&self, case: &Case, position: usize, total: usize) -> DrawResult {
        for &(row, count) in case_spans(self.summary_shown) {
            self.clear_rows(row, count)?;
        }
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, ROW_CASE),
            SetForegroundColor(Color::Magenta),
            Print(format!("Case {}/{}: ", position + 1, total)),
            ResetColor,
            Print(&case.description),
            Print(format!("  [{}]", case.image)),
            cursor::MoveTo(0, ROW_CASE + 1),
            Print("Present the correct tool to treat this condition"),
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn draw_detected(&self, label: Option<&Label>) -> DrawResult {
        self.clear_rows(ROW_DETECTED, 1)?;
        let mut stdout = stdout();
        match label {
            Some(label) => execute!(
                stdout,
                SetForegroundColor(Color::Yellow),
                Print(format!("Tool {label}")),
                ResetColor
            )?,
            None => execute!(
                stdout,
                SetForegroundColor(Color::DarkGrey),
                Print("Show a tool..."),
                ResetColor
            )?,
        }
        stdout.flush()?;
        Ok(())
    }

    fn draw_stability(&self, cells: usize) -> DrawResult {
        self.clear_rows(ROW_STABILITY, 1)?;
        let mut stdout = stdout();
        execute!(
            stdout,
            Print("Stability ["),
            SetForegroundColor(Color::Green),
            Print("#".repeat(cells)),
            ResetColor,
            Print(".".repeat(BAR_WIDTH - cells)),
            Print("]")
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn draw_scoreboard(&self, board: &Scoreboard) -> DrawResult {
        self.clear_rows(ROW_SCORE, 1)?;
        let mut stdout = stdout();
        execute!(
            stdout,
            SetForegroundColor(Color::Blue),
            Print("Score: "),
            ResetColor,
            Print(board.score),
            Print("  |  Correct: "),
            SetForegroundColor(Color::Green),
            Print(board.correct),
            ResetColor,
            Print("  |  Mistakes: "),
            SetForegroundColor(Color::Red),
            Print(board.mistakes),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn draw_feedback(&self, outcome: &Outcome, diagram: &str) -> DrawResult {
        self.clear_rows(ROW_FEEDBACK, 5)?;
        let color = match outcome.kind() {
            OutcomeKind::Correct => Color::Green,
            OutcomeKind::HarmfulIncorrect => Color::Red,
            OutcomeKind::PlainIncorrect => Color::Yellow,
        };
        let mut stdout = stdout();
        let mut row = ROW_FEEDBACK;
        for line in outcome.message().lines() {
            execute!(
                stdout,
                cursor::MoveTo(0, row),
                SetForegroundColor(color),
                Print(line),
                ResetColor
            )?;
            row += 1;
        }
        execute!(
            stdout,
            cursor::MoveTo(0, row),
            SetForegroundColor(Color::DarkGrey),
            Print(format!("Diagram: {diagram}")),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    fn draw_summary(&self, summary: &Summary) -> DrawResult {
        self.clear_rows(ROW_CASE, ROW_HELP - ROW_CASE)?;
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::MoveTo(0, ROW_CASE),
            SetForegroundColor(Color::Cyan),
            Print("Quiz Complete!"),
            ResetColor,
            cursor::MoveTo(0, ROW_CASE + 1),
            Print(format!("Final Score: {} points", summary.score)),
            cursor::MoveTo(0, ROW_CASE + 2),
            Print(format!(
                "Accuracy: {}/{} ({}%)",
                summary.correct, summary.total, summary.percentage
            )),
            cursor::MoveTo(0, ROW_CASE + 3),
            Print(format!("Mistakes: {}", summary.mistakes)),
        )?;

        let mut row = ROW_CASE + 5;
        for confusion in summary.confusions.iter().take(5) {
            let color = if confusion.harmful {
                Color::Red
            } else {
                Color::Yellow
            };
            execute!(
                stdout,
                cursor::MoveTo(0, row),
                SetForegroundColor(color),
                Print(format!(
                    "Expected {} but showed {} (x{})",
                    confusion.expected, confusion.given, confusion.count
                )),
                ResetColor
            )?;
            row += 1;
        }
        execute!(
            stdout,
            cursor::MoveTo(0, ROW_HELP - 1),
            SetForegroundColor(Color::DarkGrey),
            Print("Press R to play again"),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Reset terminal state and cleanup
    pub fn shutdown(&mut self) -> DrawResult {
        if self.raw_mode {
            let mut stdout = stdout();
            execute!(stdout, cursor::MoveTo(0, ROW_HELP + 1), Print("\r\n"))?;
            terminal::disable_raw_mode()?;
            self.raw_mode = false;
        }
        Ok(())
    }
}

fn logged(what: &str, result: DrawResult) {
    if let Err(e) = result {
        warn!(error = %e, "failed to draw {what}");
    }
}

impl PresentationSink for Display {
    fn status(&mut self, message: &str, level: StatusLevel) {
        logged("status", self.draw_status(message, level));
    }

    fn case_presented(&mut self, case: &Case, position: usize, total: usize) {
        logged("case", self.draw_case(case, position, total));
        if self.summary_shown {
            // the wipe took the scoreboard row with it
            logged("scoreboard", self.draw_scoreboard(&self.board));
            self.summary_shown = false;
            self.last_bar = None;
            self.last_detected = None;
        }
    }

    fn detected(&mut self, label: Option<&Label>) {
        let current = label.cloned();
        if self.last_detected.as_ref() == Some(&current) {
            return;
        }
        logged("detected tool", self.draw_detected(label));
        self.last_detected = Some(current);
    }

    fn stability(&mut self, progress: f32) {
        let cells = ((progress.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
        if self.last_bar == Some(cells) {
            return;
        }
        logged("stability bar", self.draw_stability(cells));
        self.last_bar = Some(cells);
    }

    fn scoreboard(&mut self, board: &Scoreboard) {
        self.board = *board;
        logged("scoreboard", self.draw_scoreboard(board));
    }

    fn feedback(&mut self, outcome: &Outcome, diagram: &str) {
        logged("feedback", self.draw_feedback(outcome, diagram));
    }

    fn summary(&mut self, summary: &Summary) {
        logged("summary", self.draw_summary(summary));
        // the summary overwrote the detection rows
        self.last_bar = None;
        self.last_detected = None;
        self.summary_shown = true;
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        // Best effort cleanup
        let _ = self.shutdown();
    }
}

/// Line-oriented renderer for non-interactive runs (logs, pipes)
#[derive(Default)]
pub struct PlainDisplay {
    last_detected: Option<Option<Label>>,
}

impl PlainDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSink for PlainDisplay {
    fn status(&mut self, message: &str, level: StatusLevel) {
        match level {
            StatusLevel::Info => println!("{message}"),
            StatusLevel::Error => eprintln!("{message}"),
        }
    }

    fn case_presented(&mut self, case: &Case, position: usize, total: usize) {
        println!(
            "Case {}/{}: {} [{}]",
            position + 1,
            total,
            case.description,
            case.image
        );
    }

    fn detected(&mut self, label: Option<&Label>) {
        let current = label.cloned();
        if self.last_detected.as_ref() == Some(&current) {
            return;
        }
        if let Some(label) = &current {
            println!("Detected: Tool {label}");
        }
        self.last_detected = Some(current);
    }

    fn stability(&mut self, _progress: f32) {}

    fn scoreboard(&mut self, board: &Scoreboard) {
        println!(
            "Score: {} | Correct: {} | Mistakes: {}",
            board.score, board.correct, board.mistakes
        );
    }

    fn feedback(&mut self, outcome: &Outcome, diagram: &str) {
        for line in outcome.message().lines() {
            println!("  {line}");
        }
        println!("  Diagram: {diagram}");
    }

    fn summary(&mut self, summary: &Summary) {
        println!("Quiz Complete!");
        println!("Final Score: {} points", summary.score);
        println!(
            "Accuracy: {}/{} ({}%)",
            summary.correct, summary.total, summary.percentage
        );
        println!("Mistakes: {}", summary.mistakes);
        for confusion in &summary.confusions {
            println!(
                "  Expected {} but showed {} (x{})",
                confusion.expected, confusion.given, confusion.count
            );
        }
    }
}
