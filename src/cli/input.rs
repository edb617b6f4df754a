//! Keystroke input handling using crossterm
//!
//! Features:
//! - Tick pacing: waits out the tick interval while listening for keys
//! - Quiz controls (next, restart, quit)
//! - Ctrl+C graceful exit

use crate::game::scheduler::{Control, Scheduler, Wake};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::{Duration, Instant};

/// Scheduler that paces ticks and turns keystrokes into controls
pub struct KeyboardScheduler {
    interval: Duration,
    /// When the pending tick is due; `None` right after a tick fired
    deadline: Option<Instant>,
}

impl KeyboardScheduler {
    pub fn new(interval: Duration) -> Self {
        KeyboardScheduler {
            interval,
            deadline: None,
        }
    }

    /// Map a key to a quiz control
    pub fn control_for(key: &KeyEvent) -> Option<Control> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Control::Quit)
            }
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Control::Quit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Enter | KeyCode::Char(' ') => {
                Some(Control::Next)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Control::Restart),
            _ => None,
        }
    }
}

impl Scheduler for KeyboardScheduler {
    fn wait(&mut self) -> io::Result<Wake> {
        // the interval counts from the end of the previous tick
        let deadline = *self
            .deadline
            .get_or_insert_with(|| Instant::now() + self.interval);

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.deadline = None;
                return Ok(Wake::Tick);
            }
            if event::poll(remaining)? {
                if let Event::Key(key) = event::read()? {
                    if let Some(control) = Self::control_for(&key) {
                        return Ok(Wake::Control(control));
                    }
                }
            }
        }
    }
}
