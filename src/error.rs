use thiserror::Error;

/// Which half of a program failed to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("WebGL 2.0 is not supported")]
    WebGl2Unsupported,

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("program failed to link: {0}")]
    ProgramLink(String),

    #[error("failed to create {0}")]
    Resource(&'static str),

    #[error("framebuffer incomplete (status 0x{0:04x})")]
    IncompleteFramebuffer(u32),

    #[error("video upload failed: {0}")]
    Upload(String),

    #[error("failed to reallocate {0}")]
    Allocation(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("setup failed: {0}")]
    Setup(String),

    #[error("camera unavailable: {0}")]
    Camera(String),
}

impl RenderError {
    /// Setup failures halt initialization and stop the frame loop. Upload and
    /// reallocation failures drop one frame; the next one tries again. Camera
    /// failures leave the renderer running and wait for another request.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            RenderError::Upload(_) | RenderError::Allocation(_) | RenderError::Camera(_)
        )
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        RenderError::Config(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl RenderError {
    /// A browser call that threw while building the pipeline.
    pub fn setup(v: wasm_bindgen::JsValue) -> Self {
        RenderError::Setup(format!("{v:?}"))
    }

    /// A browser call that threw while acquiring or playing the camera.
    pub fn camera(v: wasm_bindgen::JsValue) -> Self {
        RenderError::Camera(format!("{v:?}"))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<RenderError> for wasm_bindgen::JsValue {
    fn from(e: RenderError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}
