pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod renderer;
pub mod shaders;
pub mod targets;
pub mod uniforms;

pub use config::Config;
pub use error::RenderError;
pub use renderer::{FrameRenderer, FrameResult, FrameStats, SkipReason};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    pub mod camera;
    pub mod render;
    pub mod webgl;

    pub use render::Viewer;

    /// Default mount point picked up automatically on load.
    const CANVAS_ID: &str = "c";

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Debug).ok();

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        if document.get_element_by_id(CANVAS_ID).is_none() {
            log::info!("no #{CANVAS_ID} canvas, waiting for Viewer.mount()");
            return Ok(());
        }

        let viewer = Viewer::mount(CANVAS_ID).map_err(|e| {
            log::error!("setup failed: {e:?}");
            e
        })?;
        viewer.start();
        // page lifetime
        std::mem::forget(viewer);
        Ok(())
    }
}
