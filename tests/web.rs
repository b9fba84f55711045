#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;

use webcam_feedback::wasm::camera::create_video_element;
use webcam_feedback::wasm::webgl::{WebGl2Gpu, WebVideo};
use webcam_feedback::{Config, FrameRenderer, FrameResult, RenderError, SkipReason};

wasm_bindgen_test_configure!(run_in_browser);

fn canvas(w: u32, h: u32) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document.create_element("canvas").unwrap().dyn_into().unwrap();
    canvas.set_width(w);
    canvas.set_height(h);
    canvas
}

#[wasm_bindgen_test]
fn pipeline_builds_on_webgl2() {
    let c = canvas(320, 240);
    let gpu = WebGl2Gpu::from_canvas(&c).expect("webgl2");
    let r = FrameRenderer::new(gpu, Config::default(), (320, 240));
    assert!(r.is_ok(), "{:?}", r.err());
}

#[wasm_bindgen_test]
fn idle_video_element_is_skipped() {
    let c = canvas(64, 64);
    let gpu = WebGl2Gpu::from_canvas(&c).unwrap();
    let mut r = FrameRenderer::new(gpu, Config::default(), (64, 64)).unwrap();
    let video = WebVideo::new(create_video_element().unwrap());

    let res = r.tick(0.016, &video, (64, 64)).unwrap();
    assert_eq!(res, FrameResult::Skipped(SkipReason::VideoNotReady));
}

#[wasm_bindgen_test]
fn canvas_taken_by_2d_reports_missing_webgl2() {
    let c = canvas(16, 16);
    c.get_context("2d").unwrap();
    let err = WebGl2Gpu::from_canvas(&c).err().expect("must fail");
    assert!(matches!(err, RenderError::WebGl2Unsupported));
    assert!(err.is_fatal());
}
