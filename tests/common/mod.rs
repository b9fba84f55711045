#![allow(dead_code)]

//! Recording `Gpu` for host tests. Every call is logged, and draws are
//! simulated on solid colours so pass output can be checked without a device.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use webcam_feedback::error::RenderError;
use webcam_feedback::gpu::{Gpu, VideoSource};
use webcam_feedback::uniforms::UniformValue;

pub type Rgba = [f32; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Feedback,
    Blit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    CreateProgram(u32),
    CreateQuad(u32),
    CreateTexture { tex: u32, w: u32, h: u32 },
    ResizeTexture { tex: u32, w: u32, h: u32 },
    CreateFramebuffer { fb: u32, tex: u32 },
    Upload { tex: u32 },
    BindFramebuffer(Option<u32>),
    Viewport(u32, u32),
    Clear,
    UseProgram(u32),
    BindTexture { unit: u32, tex: u32 },
    Uniform { program: u32, name: String, value: UniformValue },
    Draw(Draw),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub kind: Kind,
    pub quad: u32,
    /// Texture written, `None` for the canvas.
    pub target: Option<u32>,
    /// Texture per unit at draw time.
    pub inputs: Vec<u32>,
}

#[derive(Debug, Default)]
pub struct Record {
    pub cmds: Vec<Cmd>,
    /// Draws that sampled the texture they were writing.
    pub hazards: u32,
    pub screen: Option<Rgba>,
    /// Makes every texture reallocation fail while set.
    pub fail_resize: bool,
}

impl Record {
    pub fn draws(&self) -> Vec<Draw> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                Cmd::Draw(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Cmd) -> bool) -> usize {
        self.cmds.iter().filter(|c| pred(c)).count()
    }

    /// Value of the last `name` uniform set on a program of `kind`.
    pub fn last_uniform(&self, programs: &HashMap<u32, Kind>, kind: Kind, name: &str) -> Option<UniformValue> {
        self.cmds.iter().rev().find_map(|c| match c {
            Cmd::Uniform { program, name: n, value } if n == name && programs.get(program) == Some(&kind) => {
                Some(*value)
            }
            _ => None,
        })
    }
}

pub struct FakeVideo {
    pub ready: bool,
    pub size: (u32, u32),
    pub color: Rgba,
    pub fail_upload: bool,
}

impl FakeVideo {
    pub fn ready(color: Rgba) -> Self {
        Self {
            ready: true,
            size: (1280, 720),
            color,
            fail_upload: false,
        }
    }

    pub fn loading() -> Self {
        Self {
            ready: false,
            ..Self::ready([0.0; 4])
        }
    }
}

impl VideoSource for FakeVideo {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn frame_size(&self) -> (u32, u32) {
        self.size
    }
}

#[derive(Default)]
pub struct RecordingGpu {
    pub record: Rc<RefCell<Record>>,
    pub fail_link: bool,
    next_id: u32,
    pub programs: HashMap<u32, Kind>,
    attachments: HashMap<u32, u32>,
    colors: HashMap<u32, Rgba>,
    uniforms: HashMap<(u32, String), UniformValue>,
    bound_fb: Option<u32>,
    program: Option<u32>,
    units: HashMap<u32, u32>,
}

impl RecordingGpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_link() -> Self {
        Self {
            fail_link: true,
            ..Self::default()
        }
    }

    pub fn handle(&self) -> Rc<RefCell<Record>> {
        self.record.clone()
    }

    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn log(&self, c: Cmd) {
        self.record.borrow_mut().cmds.push(c);
    }

    fn color(&self, tex: u32) -> Rgba {
        self.colors.get(&tex).copied().unwrap_or([0.0; 4])
    }

    fn float(&self, program: u32, name: &str) -> f32 {
        match self.uniforms.get(&(program, name.to_string())) {
            Some(UniformValue::Float(v)) => *v,
            _ => 0.0,
        }
    }
}

fn mix(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = a[i] * (1.0 - t) + b[i] * t;
    }
    out
}

impl Gpu for RecordingGpu {
    type Texture = u32;
    type Framebuffer = u32;
    type Program = u32;
    type Quad = u32;
    type Video = FakeVideo;

    fn create_program(&mut self, _vertex: &str, fragment: &str) -> Result<u32, RenderError> {
        if self.fail_link {
            return Err(RenderError::ProgramLink("forced".into()));
        }
        let id = self.id();
        let kind = if fragment.contains("u_feedback") {
            Kind::Feedback
        } else {
            Kind::Blit
        };
        self.programs.insert(id, kind);
        self.log(Cmd::CreateProgram(id));
        Ok(id)
    }

    fn create_quad(&mut self, vertices: &[f32]) -> Result<u32, RenderError> {
        assert_eq!(vertices.len(), 24);
        let id = self.id();
        self.log(Cmd::CreateQuad(id));
        Ok(id)
    }

    fn create_texture(&mut self, w: u32, h: u32) -> Result<u32, RenderError> {
        let tex = self.id();
        self.log(Cmd::CreateTexture { tex, w, h });
        Ok(tex)
    }

    fn resize_texture(&mut self, tex: &u32, w: u32, h: u32) -> Result<(), RenderError> {
        if self.record.borrow().fail_resize {
            return Err(RenderError::Allocation(format!("{w}x{h} texture")));
        }
        self.colors.remove(tex);
        self.log(Cmd::ResizeTexture { tex: *tex, w, h });
        Ok(())
    }

    fn create_framebuffer(&mut self, tex: &u32) -> Result<u32, RenderError> {
        let fb = self.id();
        self.attachments.insert(fb, *tex);
        self.log(Cmd::CreateFramebuffer { fb, tex: *tex });
        Ok(fb)
    }

    fn upload_video(&mut self, tex: &u32, video: &FakeVideo) -> Result<(), RenderError> {
        if video.fail_upload {
            return Err(RenderError::Upload("decoder stalled".into()));
        }
        self.colors.insert(*tex, video.color);
        self.log(Cmd::Upload { tex: *tex });
        Ok(())
    }

    fn bind_framebuffer(&mut self, target: Option<&u32>) {
        self.bound_fb = target.copied();
        self.log(Cmd::BindFramebuffer(target.copied()));
    }

    fn viewport(&mut self, w: u32, h: u32) {
        self.log(Cmd::Viewport(w, h));
    }

    fn clear(&mut self, rgba: [f32; 4]) {
        match self.bound_fb.and_then(|fb| self.attachments.get(&fb).copied()) {
            Some(tex) => {
                self.colors.insert(tex, rgba);
            }
            None => self.record.borrow_mut().screen = Some(rgba),
        }
        self.log(Cmd::Clear);
    }

    fn use_program(&mut self, program: &u32) {
        self.program = Some(*program);
        self.log(Cmd::UseProgram(*program));
    }

    fn bind_texture(&mut self, unit: u32, tex: &u32) {
        self.units.insert(unit, *tex);
        self.log(Cmd::BindTexture { unit, tex: *tex });
    }

    fn set_uniform(&mut self, program: &u32, name: &str, value: UniformValue) {
        self.uniforms.insert((*program, name.to_string()), value);
        self.log(Cmd::Uniform {
            program: *program,
            name: name.to_string(),
            value,
        });
    }

    fn draw_quad(&mut self, quad: &u32) {
        let program = self.program.expect("draw without program");
        let kind = self.programs[&program];
        let target = self.bound_fb.map(|fb| self.attachments[&fb]);
        let needed = if kind == Kind::Feedback { 2 } else { 1 };
        let inputs: Vec<u32> = (0..needed).map(|u| self.units[&u]).collect();

        if let Some(t) = target {
            if inputs.contains(&t) {
                self.record.borrow_mut().hazards += 1;
            }
        }

        let out = match kind {
            Kind::Feedback => mix(self.color(inputs[0]), self.color(inputs[1]), self.float(program, "u_mix")),
            Kind::Blit => self.color(inputs[0]),
        };
        match target {
            Some(t) => {
                self.colors.insert(t, out);
            }
            None => self.record.borrow_mut().screen = Some(out),
        }

        self.log(Cmd::Draw(Draw {
            kind,
            quad: *quad,
            target,
            inputs,
        }));
    }
}
