//! Bookkeeping for the host's frame loop. The host owns the timer; this only
//! turns its timestamps into `dt` and tracks whether the loop should run.

use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

/// Turns animation-frame timestamps (milliseconds) into deltas in seconds.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    state: LoopState,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Returns false if the loop was already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = LoopState::Running;
        self.last_ms = None;
        true
    }

    /// Returns false if the loop was already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = LoopState::Stopped;
        self.last_ms = None;
        true
    }

    /// Stops the loop if `err` is fatal. Returns whether it did; a recoverable
    /// error only costs the current frame.
    pub fn halt_on(&mut self, err: &RenderError) -> bool {
        err.is_fatal() && self.stop()
    }

    /// Seconds since the previous tick; 0 on the first tick after `start`.
    /// A timestamp that goes backwards also yields 0.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last_ms {
            Some(prev) if now_ms > prev => (now_ms - prev) / 1000.0,
            _ => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt
    }
}
