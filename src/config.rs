use serde::Deserialize;

use crate::error::RenderError;
use crate::geometry::UvOrientation;

/// Viewer configuration. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub video: VideoConstraints,
    pub feedback: FeedbackParams,
    /// Orientation used when sampling the camera in the feedback pass.
    pub video_orientation: UvOrientation,
    /// Orientation used when presenting to the canvas.
    pub present_orientation: UvOrientation,
    pub swap: SwapMode,
    pub double_tap_ms: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video: VideoConstraints::default(),
            feedback: FeedbackParams::default(),
            video_orientation: UvOrientation::Identity,
            present_orientation: UvOrientation::FlipY,
            swap: SwapMode::Index,
            double_tap_ms: 300.0,
        }
    }
}

/// Ideal camera constraints; the browser picks the closest it can deliver.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    pub facing_mode: String,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            frame_rate: 30.0,
            facing_mode: "user".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedbackParams {
    /// Weight of the previous frame in the blend. 0 shows the live camera only.
    pub mix: f32,
    /// Per-axis zoom applied to the feedback sample each frame.
    pub zoom: [f32; 2],
    /// Amplitude of the time-varying UV displacement on the feedback sample.
    pub noise_scale: [f32; 2],
    /// Multiplier from elapsed seconds to `u_time`.
    pub time_scale: f32,
}

impl Default for FeedbackParams {
    fn default() -> Self {
        Self {
            mix: 0.9,
            zoom: [0.995, 0.995],
            noise_scale: [0.0, 0.0],
            time_scale: 1.0,
        }
    }
}

/// How the ping-pong pair advances between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapMode {
    /// Swap which target is current.
    #[default]
    Index,
    /// Keep roles fixed and copy current back into previous with an extra pass.
    Copy,
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self, RenderError> {
        let cfg: Config = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        let fb = &self.feedback;
        if !(0.0..=1.0).contains(&fb.mix) {
            return Err(RenderError::Config(format!(
                "feedback.mix must be within [0, 1], got {}",
                fb.mix
            )));
        }
        if fb.zoom.iter().any(|z| z.is_nan() || *z <= 0.0) {
            return Err(RenderError::Config(format!(
                "feedback.zoom must be positive, got {:?}",
                fb.zoom
            )));
        }
        if self.video.width == 0 || self.video.height == 0 {
            return Err(RenderError::Config("video size must be non-zero".into()));
        }
        if self.double_tap_ms.is_nan() || self.double_tap_ms < 0.0 {
            return Err(RenderError::Config("double_tap_ms must be non-negative".into()));
        }
        Ok(())
    }
}
