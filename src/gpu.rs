//! The slice of a graphics API the frame renderer needs.
//!
//! The browser build implements this over `WebGl2RenderingContext`; tests
//! implement it with a recorder. All handles are owned by the renderer and
//! only touched from the frame callback.

use crate::error::RenderError;
use crate::uniforms::UniformValue;

/// A playback source whose current decoded frame can be sampled.
pub trait VideoSource {
    /// True once the element has decoded data for the current position.
    fn is_ready(&self) -> bool;
    /// Intrinsic frame size in pixels, `(0, 0)` before metadata loads.
    fn frame_size(&self) -> (u32, u32);
}

pub trait Gpu {
    type Texture;
    type Framebuffer;
    type Program;
    type Quad;
    type Video: VideoSource;

    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<Self::Program, RenderError>;

    /// Uploads interleaved `x, y, u, v` vertices as a static quad.
    fn create_quad(&mut self, vertices: &[f32]) -> Result<Self::Quad, RenderError>;

    /// An RGBA8 texture, linear filtering, clamped at the edges.
    fn create_texture(&mut self, width: u32, height: u32) -> Result<Self::Texture, RenderError>;

    /// Reallocates storage; contents become undefined.
    fn resize_texture(&mut self, texture: &Self::Texture, width: u32, height: u32) -> Result<(), RenderError>;

    /// Framebuffer with `attachment` as its only color attachment.
    fn create_framebuffer(&mut self, attachment: &Self::Texture) -> Result<Self::Framebuffer, RenderError>;

    /// Copies the video's current frame into `texture`, resizing it to the frame.
    fn upload_video(&mut self, texture: &Self::Texture, video: &Self::Video) -> Result<(), RenderError>;

    /// `None` binds the visible canvas.
    fn bind_framebuffer(&mut self, target: Option<&Self::Framebuffer>);

    fn viewport(&mut self, width: u32, height: u32);

    fn clear(&mut self, rgba: [f32; 4]);

    fn use_program(&mut self, program: &Self::Program);

    fn bind_texture(&mut self, unit: u32, texture: &Self::Texture);

    /// Names the program does not declare are ignored.
    fn set_uniform(&mut self, program: &Self::Program, name: &str, value: UniformValue);

    fn draw_quad(&mut self, quad: &Self::Quad);
}
