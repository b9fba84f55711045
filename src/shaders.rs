//! GLSL ES 3.00 sources, embedded at compile time.

/// Full-screen quad; attribute 0 is position, 1 is UV.
pub const QUAD_VERT: &str = include_str!("shaders/quad.vert");

/// Blends the live frame with a zoomed, displaced copy of the last output.
pub const FEEDBACK_FRAG: &str = include_str!("shaders/feedback.frag");

/// Centred, aspect-scaled copy. Used for the swap copy and for presentation.
pub const BLIT_FRAG: &str = include_str!("shaders/blit.frag");
