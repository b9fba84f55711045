use js_sys::{Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, Event, HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack};

use crate::config::VideoConstraints;
use crate::error::RenderError;

/// Hidden, muted, inline playback element for the camera stream.
pub fn create_video_element() -> Result<HtmlVideoElement, RenderError> {
    let document = window()
        .and_then(|w| w.document())
        .ok_or(RenderError::Setup("no document".into()))?;
    let video = document
        .create_element("video")
        .map_err(RenderError::setup)?
        .dyn_into::<HtmlVideoElement>()
        .map_err(|_| RenderError::Resource("video element"))?;
    video.set_muted(true);
    video.set_autoplay(true);
    // iOS refuses inline playback without this attribute
    video
        .set_attribute("playsinline", "")
        .map_err(RenderError::setup)?;
    Ok(video)
}

fn ideal(v: f64) -> Result<Object, JsValue> {
    let o = Object::new();
    Reflect::set(&o, &"ideal".into(), &v.into())?;
    Ok(o)
}

fn constraints(c: &VideoConstraints) -> Result<MediaStreamConstraints, JsValue> {
    let video = Object::new();
    Reflect::set(&video, &"width".into(), &ideal(c.width as f64)?)?;
    Reflect::set(&video, &"height".into(), &ideal(c.height as f64)?)?;
    Reflect::set(&video, &"frameRate".into(), &ideal(c.frame_rate)?)?;
    Reflect::set(&video, &"facingMode".into(), &c.facing_mode.as_str().into())?;

    let out = MediaStreamConstraints::new();
    out.set_audio(&JsValue::FALSE);
    out.set_video(&video);
    Ok(out)
}

/// Request the camera once and start playback into `video`.
///
/// Permission denial surfaces as the returned error; it is not retried here.
pub async fn attach(video: &HtmlVideoElement, c: &VideoConstraints) -> Result<MediaStream, RenderError> {
    let devices = window()
        .ok_or(RenderError::Camera("no window".into()))?
        .navigator()
        .media_devices()
        .map_err(RenderError::camera)?;
    let constraints = constraints(c).map_err(RenderError::camera)?;
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(RenderError::camera)?;
    let stream: MediaStream = JsFuture::from(promise)
        .await
        .and_then(|s| s.dyn_into())
        .map_err(RenderError::camera)?;

    video.set_src_object(Some(&stream));
    let playing = video.play().map_err(RenderError::camera)?;
    JsFuture::from(playing).await.map_err(RenderError::camera)?;

    log::info!(
        "camera streaming at {}x{}",
        video.video_width(),
        video.video_height()
    );
    Ok(stream)
}

fn tracks(stream: &MediaStream) -> Vec<MediaStreamTrack> {
    stream
        .get_tracks()
        .iter()
        .filter_map(|t| t.dyn_into::<MediaStreamTrack>().ok())
        .collect()
}

/// Calls `on_ended` when any track of `stream` ends (device unplugged,
/// permission revoked). The returned closure must outlive the stream.
pub fn watch_ended(stream: &MediaStream, on_ended: impl FnMut(Event) + 'static) -> Closure<dyn FnMut(Event)> {
    let callback = Closure::wrap(Box::new(on_ended) as Box<dyn FnMut(Event)>);
    for track in tracks(stream) {
        track.set_onended(Some(callback.as_ref().unchecked_ref()));
    }
    callback
}

pub fn stop(stream: &MediaStream) {
    for track in tracks(stream) {
        track.set_onended(None);
        track.stop();
    }
}
