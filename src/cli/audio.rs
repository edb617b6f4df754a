//! Audio cues through the terminal bell
//!
//! Terminals cannot synthesize tones, so the cue's shape maps to bell count:
//! one ring for a correct answer, two for a wrong one.

use crate::game::sink::{Cue, FeedbackSink, Waveform};
use std::io::{stdout, Write};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalBell;

impl TerminalBell {
    fn rings(cue: &Cue) -> usize {
        match cue.waveform {
            Waveform::Sine => 1,
            Waveform::Sawtooth => 2,
        }
    }
}

impl FeedbackSink for TerminalBell {
    fn play(&mut self, cue: Cue) {
        debug!(
            frequency_hz = cue.frequency_hz,
            duration_ms = cue.duration.as_millis() as u64,
            "audio cue"
        );
        let mut stdout = stdout();
        let bells = "\x07".repeat(Self::rings(&cue));
        // Audio not available is not an error
        let _ = stdout.write_all(bells.as_bytes()).and_then(|_| stdout.flush());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rings_per_cue() {
        assert_eq!(TerminalBell::rings(&Cue::CORRECT), 1);
        assert_eq!(TerminalBell::rings(&Cue::WRONG), 2);
    }
}
