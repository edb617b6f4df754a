//! Tick scheduling
//!
//! The game loop asks a scheduler what happens next: either the next tick is
//! due, or the player pressed a control in the meantime. Keeping this behind
//! a trait lets the per-tick step run without real timers.

use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::Duration;

/// Player-initiated controls
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Go to the next case
    Next,
    /// Drop all progress and start over
    Restart,
    /// Stop the loop
    Quit,
}

/// What woke the loop up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    Tick,
    Control(Control),
}

pub trait Scheduler {
    /// Block until the next tick is due or a control arrives
    fn wait(&mut self) -> io::Result<Wake>;
}

/// Sleeps a fixed interval between ticks; no controls
#[derive(Clone, Debug)]
pub struct IntervalScheduler {
    interval: Duration,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        IntervalScheduler { interval }
    }
}

impl Scheduler for IntervalScheduler {
    fn wait(&mut self) -> io::Result<Wake> {
        thread::sleep(self.interval);
        Ok(Wake::Tick)
    }
}

/// Replays a fixed sequence of wake-ups, then quits
#[derive(Clone, Debug, Default)]
pub struct Script {
    wakes: VecDeque<Wake>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(mut self, n: usize) -> Self {
        self.wakes.extend(std::iter::repeat(Wake::Tick).take(n));
        self
    }

    pub fn control(mut self, control: Control) -> Self {
        self.wakes.push_back(Wake::Control(control));
        self
    }

    pub fn remaining(&self) -> usize {
        self.wakes.len()
    }
}

impl Scheduler for Script {
    fn wait(&mut self) -> io::Result<Wake> {
        Ok(self
            .wakes
            .pop_front()
            .unwrap_or(Wake::Control(Control::Quit)))
    }
}
