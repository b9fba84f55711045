use std::cell::RefCell;
use std::collections::HashMap;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, HtmlMediaElement, HtmlVideoElement, WebGl2RenderingContext as GL, WebGlBuffer,
    WebGlFramebuffer, WebGlProgram, WebGlShader, WebGlTexture, WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::error::{RenderError, ShaderStage};
use crate::geometry::{QUAD_VERTEX_COUNT, VERTEX_STRIDE};
use crate::gpu::{Gpu, VideoSource};
use crate::uniforms::UniformValue;

/// Acquire a WebGL2 context; anything less is fatal.
pub fn context(canvas: &HtmlCanvasElement) -> Result<GL, RenderError> {
    canvas
        .get_context("webgl2")
        .map_err(RenderError::setup)?
        .ok_or(RenderError::WebGl2Unsupported)?
        .dyn_into::<GL>()
        .map_err(|_| RenderError::WebGl2Unsupported)
}

pub struct WebGl2Gpu {
    gl: GL,
}

impl WebGl2Gpu {
    pub fn new(gl: GL) -> Self {
        Self { gl }
    }

    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, RenderError> {
        context(canvas).map(Self::new)
    }

    pub fn gl(&self) -> &GL {
        &self.gl
    }

    fn compile(&self, kind: u32, stage: ShaderStage, src: &str) -> Result<WebGlShader, RenderError> {
        let gl = &self.gl;
        let shader = gl.create_shader(kind).ok_or(RenderError::Resource("shader"))?;
        gl.shader_source(&shader, src);
        gl.compile_shader(&shader);
        let ok = gl
            .get_shader_parameter(&shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false);
        if ok {
            return Ok(shader);
        }
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(RenderError::ShaderCompile { stage, log })
    }

    fn alloc(&self, width: u32, height: u32) -> Result<(), JsValue> {
        self.gl
            .tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
                GL::TEXTURE_2D,
                0,
                GL::RGBA8 as i32,
                width as i32,
                height as i32,
                0,
                GL::RGBA,
                GL::UNSIGNED_BYTE,
                None,
            )
    }
}

/// Linked program plus its uniform locations, looked up on first use.
pub struct WebGlPass {
    program: WebGlProgram,
    locations: RefCell<HashMap<String, Option<WebGlUniformLocation>>>,
}

pub struct WebGlQuad {
    vao: WebGlVertexArrayObject,
    _vertices: WebGlBuffer,
}

impl Gpu for WebGl2Gpu {
    type Texture = WebGlTexture;
    type Framebuffer = WebGlFramebuffer;
    type Program = WebGlPass;
    type Quad = WebGlQuad;
    type Video = WebVideo;

    fn create_program(&mut self, vertex: &str, fragment: &str) -> Result<WebGlPass, RenderError> {
        let vs = self.compile(GL::VERTEX_SHADER, ShaderStage::Vertex, vertex)?;
        let fs = match self.compile(GL::FRAGMENT_SHADER, ShaderStage::Fragment, fragment) {
            Ok(fs) => fs,
            Err(e) => {
                self.gl.delete_shader(Some(&vs));
                return Err(e);
            }
        };

        let gl = &self.gl;
        let program = gl.create_program().ok_or(RenderError::Resource("program"))?;
        gl.attach_shader(&program, &vs);
        gl.attach_shader(&program, &fs);
        gl.link_program(&program);
        gl.detach_shader(&program, &vs);
        gl.detach_shader(&program, &fs);
        gl.delete_shader(Some(&vs));
        gl.delete_shader(Some(&fs));

        let linked = gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if !linked {
            let log = gl.get_program_info_log(&program).unwrap_or_default();
            gl.delete_program(Some(&program));
            return Err(RenderError::ProgramLink(log));
        }

        Ok(WebGlPass {
            program,
            locations: RefCell::new(HashMap::new()),
        })
    }

    fn create_quad(&mut self, vertices: &[f32]) -> Result<WebGlQuad, RenderError> {
        debug_assert_eq!(vertices.len(), QUAD_VERTEX_COUNT * VERTEX_STRIDE);
        let gl = &self.gl;
        let vao = gl.create_vertex_array().ok_or(RenderError::Resource("vertex array"))?;
        let buffer = gl.create_buffer().ok_or(RenderError::Resource("vertex buffer"))?;

        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let data = js_sys::Float32Array::from(vertices);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &data, GL::STATIC_DRAW);

        let stride = (VERTEX_STRIDE * std::mem::size_of::<f32>()) as i32;
        // location 0: position, location 1: uv
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 2, GL::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(1, 2, GL::FLOAT, false, stride, 2 * 4);

        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);

        Ok(WebGlQuad { vao, _vertices: buffer })
    }

    fn create_texture(&mut self, width: u32, height: u32) -> Result<WebGlTexture, RenderError> {
        let gl = &self.gl;
        let tex = gl.create_texture().ok_or(RenderError::Resource("texture"))?;
        gl.bind_texture(GL::TEXTURE_2D, Some(&tex));
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
        let res = self.alloc(width, height);
        self.gl.bind_texture(GL::TEXTURE_2D, None);
        res.map(|_| tex).map_err(|_| RenderError::Resource("texture storage"))
    }

    fn resize_texture(&mut self, texture: &WebGlTexture, width: u32, height: u32) -> Result<(), RenderError> {
        self.gl.bind_texture(GL::TEXTURE_2D, Some(texture));
        let res = self.alloc(width, height);
        self.gl.bind_texture(GL::TEXTURE_2D, None);
        res.map_err(|e| RenderError::Allocation(format!("{width}x{height} texture: {e:?}")))
    }

    fn create_framebuffer(&mut self, attachment: &WebGlTexture) -> Result<WebGlFramebuffer, RenderError> {
        let gl = &self.gl;
        let fbo = gl.create_framebuffer().ok_or(RenderError::Resource("framebuffer"))?;
        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&fbo));
        gl.framebuffer_texture_2d(
            GL::FRAMEBUFFER,
            GL::COLOR_ATTACHMENT0,
            GL::TEXTURE_2D,
            Some(attachment),
            0,
        );
        let status = gl.check_framebuffer_status(GL::FRAMEBUFFER);
        gl.bind_framebuffer(GL::FRAMEBUFFER, None);
        if status != GL::FRAMEBUFFER_COMPLETE {
            gl.delete_framebuffer(Some(&fbo));
            return Err(RenderError::IncompleteFramebuffer(status));
        }
        Ok(fbo)
    }

    fn upload_video(&mut self, texture: &WebGlTexture, video: &WebVideo) -> Result<(), RenderError> {
        let gl = &self.gl;
        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(texture));
        gl.pixel_storei(GL::UNPACK_FLIP_Y_WEBGL, 0);
        let res = gl.tex_image_2d_with_u32_and_u32_and_html_video_element(
            GL::TEXTURE_2D,
            0,
            GL::RGBA as i32,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            &video.element,
        );
        gl.bind_texture(GL::TEXTURE_2D, None);
        res.map_err(|e| RenderError::Upload(format!("{e:?}")))
    }

    fn bind_framebuffer(&mut self, target: Option<&WebGlFramebuffer>) {
        self.gl.bind_framebuffer(GL::FRAMEBUFFER, target);
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.gl.viewport(0, 0, width as i32, height as i32);
    }

    fn clear(&mut self, [r, g, b, a]: [f32; 4]) {
        self.gl.clear_color(r, g, b, a);
        self.gl.clear(GL::COLOR_BUFFER_BIT);
    }

    fn use_program(&mut self, program: &WebGlPass) {
        self.gl.use_program(Some(&program.program));
    }

    fn bind_texture(&mut self, unit: u32, texture: &WebGlTexture) {
        self.gl.active_texture(GL::TEXTURE0 + unit);
        self.gl.bind_texture(GL::TEXTURE_2D, Some(texture));
    }

    fn set_uniform(&mut self, program: &WebGlPass, name: &str, value: UniformValue) {
        let mut locations = program.locations.borrow_mut();
        if !locations.contains_key(name) {
            let loc = self.gl.get_uniform_location(&program.program, name);
            locations.insert(name.to_string(), loc);
        }
        let Some(Some(loc)) = locations.get(name) else {
            return;
        };
        match value {
            UniformValue::Float(v) => self.gl.uniform1f(Some(loc), v),
            UniformValue::Vec2([x, y]) => self.gl.uniform2f(Some(loc), x, y),
            UniformValue::Int(i) => self.gl.uniform1i(Some(loc), i),
        }
    }

    fn draw_quad(&mut self, quad: &WebGlQuad) {
        self.gl.bind_vertex_array(Some(&quad.vao));
        self.gl.draw_arrays(GL::TRIANGLES, 0, QUAD_VERTEX_COUNT as i32);
        self.gl.bind_vertex_array(None);
    }
}

/// Camera playback element as a frame source.
#[derive(Clone)]
pub struct WebVideo {
    element: HtmlVideoElement,
}

impl WebVideo {
    pub fn new(element: HtmlVideoElement) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &HtmlVideoElement {
        &self.element
    }
}

impl VideoSource for WebVideo {
    fn is_ready(&self) -> bool {
        self.element.ready_state() >= HtmlMediaElement::HAVE_CURRENT_DATA && self.element.video_width() > 0
    }

    fn frame_size(&self) -> (u32, u32) {
        (self.element.video_width(), self.element.video_height())
    }
}
