//! Click/tap gestures and the camera request lifecycle.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tap {
    Single,
    /// Second tap inside the window. The pair is consumed; a third tap starts over.
    Double,
}

#[derive(Debug, Clone)]
pub struct TapTracker {
    window_ms: f64,
    last_ms: Option<f64>,
}

impl TapTracker {
    pub fn new(window_ms: f64) -> Self {
        Self {
            window_ms,
            last_ms: None,
        }
    }

    pub fn register(&mut self, now_ms: f64) -> Tap {
        match self.last_ms {
            Some(prev) if now_ms >= prev && now_ms - prev <= self.window_ms => {
                self.last_ms = None;
                Tap::Double
            }
            _ => {
                self.last_ms = Some(now_ms);
                Tap::Single
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraState {
    #[default]
    Idle,
    Requesting,
    Streaming,
    Failed,
}

impl CameraState {
    /// A stream is requested at most once at a time; a denied request may be
    /// retried by the next user gesture.
    pub fn can_request(self) -> bool {
        matches!(self, CameraState::Idle | CameraState::Failed)
    }

    /// The live track went away (unplugged, revoked). Only a streaming camera
    /// moves; a late event for an abandoned stream is ignored.
    pub fn track_ended(self) -> Self {
        match self {
            CameraState::Streaming => CameraState::Failed,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taps_inside_window_are_double() {
        let mut t = TapTracker::new(300.0);
        assert_eq!(t.register(0.0), Tap::Single);
        assert_eq!(t.register(250.0), Tap::Double);
        assert_eq!(t.register(400.0), Tap::Single);
    }

    #[test]
    fn slow_taps_stay_single() {
        let mut t = TapTracker::new(300.0);
        assert_eq!(t.register(0.0), Tap::Single);
        assert_eq!(t.register(301.0), Tap::Single);
        assert_eq!(t.register(500.0), Tap::Double);
    }

    #[test]
    fn only_idle_or_failed_may_request() {
        assert!(CameraState::Idle.can_request());
        assert!(CameraState::Failed.can_request());
        assert!(!CameraState::Requesting.can_request());
        assert!(!CameraState::Streaming.can_request());
    }

    #[test]
    fn ended_track_allows_a_new_request() {
        let s = CameraState::Streaming.track_ended();
        assert_eq!(s, CameraState::Failed);
        assert!(s.can_request());
        assert_eq!(CameraState::Requesting.track_ended(), CameraState::Requesting);
        assert_eq!(CameraState::Idle.track_ended(), CameraState::Idle);
    }
}
