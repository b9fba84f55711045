//! Per-frame render loop: camera frame -> feedback pass -> canvas.

use crate::config::{Config, FeedbackParams, SwapMode};
use crate::error::RenderError;
use crate::geometry::{quad_vertices, UvOrientation};
use crate::gpu::{Gpu, VideoSource};
use crate::shaders;
use crate::targets::{OffscreenTarget, PingPong};
use crate::uniforms::{self as u, cover_scale, PassUniforms};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    VideoNotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Zero-based index among rendered frames.
    pub frame: u64,
    /// The offscreen targets were reallocated before drawing.
    pub resized: bool,
    /// Draw calls issued, including presentation.
    pub passes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameResult {
    Skipped(SkipReason),
    Rendered(FrameStats),
}

/// One static quad per distinct orientation in use.
struct Quads<Q> {
    entries: Vec<(UvOrientation, Q)>,
}

impl<Q> Quads<Q> {
    fn build<G: Gpu<Quad = Q>>(gpu: &mut G, wanted: &[UvOrientation]) -> Result<Self, RenderError> {
        let mut entries: Vec<(UvOrientation, Q)> = Vec::new();
        for &o in wanted {
            if entries.iter().any(|(have, _)| *have == o) {
                continue;
            }
            entries.push((o, gpu.create_quad(&quad_vertices(o))?));
        }
        Ok(Self { entries })
    }

    fn get(&self, o: UvOrientation) -> &Q {
        // build() is always called with every orientation the renderer asks for
        &self
            .entries
            .iter()
            .find(|(have, _)| *have == o)
            .unwrap_or(&self.entries[0])
            .1
    }
}

/// Owns every GPU resource of the pipeline. Holds no timer: the host calls
/// [`FrameRenderer::tick`] once per animation frame.
pub struct FrameRenderer<G: Gpu> {
    gpu: G,
    config: Config,
    feedback: G::Program,
    blit: G::Program,
    quads: Quads<G::Quad>,
    video_texture: G::Texture,
    targets: PingPong<OffscreenTarget<G>>,
    elapsed: f64,
    frames: u64,
    video_ready: bool,
}

impl<G: Gpu> FrameRenderer<G> {
    pub fn new(mut gpu: G, config: Config, surface: (u32, u32)) -> Result<Self, RenderError> {
        config.validate()?;
        let (w, h) = clamp_size(surface);

        let feedback = gpu.create_program(shaders::QUAD_VERT, shaders::FEEDBACK_FRAG)?;
        let blit = gpu.create_program(shaders::QUAD_VERT, shaders::BLIT_FRAG)?;
        let quads: Quads<G::Quad> = Quads::build(
            &mut gpu,
            &[
                UvOrientation::Identity,
                config.video_orientation,
                config.present_orientation,
            ],
        )?;
        let video_texture = gpu.create_texture(1, 1)?;
        let targets: PingPong<OffscreenTarget<G>> = PingPong::create(&mut gpu, w, h)?;

        log::info!(
            "frame renderer ready: {w}x{h}, swap {:?}, video {:?}, present {:?}",
            config.swap,
            config.video_orientation,
            config.present_orientation
        );

        Ok(Self {
            gpu,
            config,
            feedback,
            blit,
            quads,
            video_texture,
            targets,
            elapsed: 0.0,
            frames: 0,
            video_ready: false,
        })
    }

    /// Renders one frame, or does nothing at all if `video` has no decoded data yet.
    ///
    /// `dt` is seconds since the previous call; `surface` is the current
    /// drawable size in pixels.
    pub fn tick(&mut self, dt: f64, video: &G::Video, surface: (u32, u32)) -> Result<FrameResult, RenderError> {
        let ready = video.is_ready();
        if ready != self.video_ready {
            log::debug!("video {}", if ready { "ready" } else { "not ready" });
            self.video_ready = ready;
        }
        if !ready {
            return Ok(FrameResult::Skipped(SkipReason::VideoNotReady));
        }

        let size = clamp_size(surface);
        let resized = self.targets.resize(&mut self.gpu, size.0, size.1)?;
        if resized {
            log::debug!("feedback targets resized to {}x{}", size.0, size.1);
        }

        self.gpu.upload_video(&self.video_texture, video)?;

        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        let time = (self.elapsed * self.config.feedback.time_scale as f64) as f32;
        let mut passes = 0;

        // 1. live frame + previous output -> current
        let fb = &self.config.feedback;
        let uniforms = PassUniforms::new()
            .sampler(u::U_IMAGE, 0)
            .sampler(u::U_FEEDBACK, 1)
            .vec2(u::U_ASPECT, video_scale(size, video.frame_size(), self.config.video_orientation))
            .vec2(u::U_RESOLUTION, [size.0 as f32, size.1 as f32])
            .float(u::U_TIME, time)
            .vec2(u::U_ZOOM, fb.zoom)
            .vec2(u::U_NOISE_SCALE, fb.noise_scale)
            .float(u::U_MIX, fb.mix);
        draw_pass(
            &mut self.gpu,
            Some(&self.targets.current().framebuffer),
            size,
            &self.feedback,
            self.quads.get(self.config.video_orientation),
            &[&self.video_texture, &self.targets.previous().texture],
            &uniforms,
        );
        passes += 1;

        let blit = PassUniforms::new()
            .sampler(u::U_IMAGE, 0)
            .vec2(u::U_ASPECT, [1.0, 1.0]);

        // 2. copy mode keeps roles fixed: write current back into previous
        if self.config.swap == SwapMode::Copy {
            draw_pass(
                &mut self.gpu,
                Some(&self.targets.previous().framebuffer),
                size,
                &self.blit,
                self.quads.get(UvOrientation::Identity),
                &[&self.targets.current().texture],
                &blit,
            );
            passes += 1;
        }

        // 3. present current to the canvas
        let present = PassUniforms::new()
            .sampler(u::U_IMAGE, 0)
            .vec2(u::U_ASPECT, cover_scale(size, self.targets.size()));
        draw_pass(
            &mut self.gpu,
            None,
            size,
            &self.blit,
            self.quads.get(self.config.present_orientation),
            &[&self.targets.current().texture],
            &present,
        );
        passes += 1;

        if self.config.swap == SwapMode::Index {
            self.targets.swap();
        }

        let stats = FrameStats {
            frame: self.frames,
            resized,
            passes,
        };
        self.frames += 1;
        Ok(FrameResult::Rendered(stats))
    }

    pub fn set_feedback(&mut self, params: FeedbackParams) -> Result<(), RenderError> {
        let mut next = self.config.clone();
        next.feedback = params;
        next.validate()?;
        self.config = next;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Seconds of rendered time, before `time_scale`.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn target_size(&self) -> (u32, u32) {
        self.targets.size()
    }

    pub fn gpu(&self) -> &G {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut G {
        &mut self.gpu
    }
}

fn draw_pass<G: Gpu>(
    gpu: &mut G,
    target: Option<&G::Framebuffer>,
    size: (u32, u32),
    program: &G::Program,
    quad: &G::Quad,
    inputs: &[&G::Texture],
    uniforms: &PassUniforms,
) {
    gpu.bind_framebuffer(target);
    gpu.viewport(size.0, size.1);
    gpu.use_program(program);
    for (unit, tex) in inputs.iter().enumerate() {
        gpu.bind_texture(unit as u32, tex);
    }
    for (name, value) in uniforms.iter() {
        gpu.set_uniform(program, name, value);
    }
    gpu.draw_quad(quad);
}

fn clamp_size((w, h): (u32, u32)) -> (u32, u32) {
    (w.max(1), h.max(1))
}

/// Cover-fit scale for the camera, in the camera texture's own axes.
///
/// The fit is worked out on the surface with the video turned upright. For a
/// quarter turn the quad's `u` runs along the surface's y axis, so the two
/// components trade places before they reach the shader.
fn video_scale(surface: (u32, u32), (w, h): (u32, u32), o: UvOrientation) -> [f32; 2] {
    if o.swaps_axes() {
        let [sx, sy] = cover_scale(surface, (h, w));
        [sy, sx]
    } else {
        cover_scale(surface, (w, h))
    }
}
