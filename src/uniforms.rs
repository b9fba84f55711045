/// Value for one uniform slot. Samplers are passed as `Int` texture units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Int(i32),
}

pub const U_IMAGE: &str = "u_image";
pub const U_FEEDBACK: &str = "u_feedback";
pub const U_ASPECT: &str = "u_aspect";
pub const U_RESOLUTION: &str = "u_resolution";
pub const U_TIME: &str = "u_time";
pub const U_ZOOM: &str = "u_zoom";
pub const U_NOISE_SCALE: &str = "u_noise_scale";
pub const U_MIX: &str = "u_mix";

pub const RECOGNIZED: [&str; 8] = [
    U_IMAGE,
    U_FEEDBACK,
    U_ASPECT,
    U_RESOLUTION,
    U_TIME,
    U_ZOOM,
    U_NOISE_SCALE,
    U_MIX,
];

/// Uniforms for a single pass, applied in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassUniforms {
    values: Vec<(&'static str, UniformValue)>,
}

impl PassUniforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn float(mut self, name: &'static str, v: f32) -> Self {
        self.values.push((name, UniformValue::Float(v)));
        self
    }

    pub fn vec2(mut self, name: &'static str, v: [f32; 2]) -> Self {
        self.values.push((name, UniformValue::Vec2(v)));
        self
    }

    pub fn sampler(mut self, name: &'static str, unit: u32) -> Self {
        self.values.push((name, UniformValue::Int(unit as i32)));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, UniformValue)> + '_ {
        self.values.iter().copied()
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

/// Width over height; a degenerate size reads as square.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    width as f32 / height as f32
}

/// Per-axis UV scale (about the centre) that fits `video` over `surface`
/// without stretching, cropping whichever axis overflows.
///
/// Shaders sample the video at `(uv - 0.5) * scale + 0.5`.
pub fn cover_scale(surface: (u32, u32), video: (u32, u32)) -> [f32; 2] {
    if surface.0 == 0 || surface.1 == 0 || video.0 == 0 || video.1 == 0 {
        return [1.0, 1.0];
    }
    let s = aspect_ratio(surface.0, surface.1);
    let v = aspect_ratio(video.0, video.1);
    if s > v {
        // surface is wider: keep full width, crop top and bottom
        [1.0, v / s]
    } else {
        [s / v, 1.0]
    }
}
