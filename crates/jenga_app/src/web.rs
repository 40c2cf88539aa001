//! Browser entry point
//!
//! The page provides a `<canvas id="jenga-canvas">` and optionally a
//! `<button id="reset">`; a button is created when the page has none.
//! `?variant=gentle` in the page URL selects the gentle variant.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement};
use winit::event_loop::EventLoopProxy;
use winit::platform::web::WindowAttributesExtWebSys;
use winit::window::WindowAttributes;

use crate::app::AppEvent;
use crate::boot_config::{variant_from_query, ConfigSource, HostConfig};
use crate::error::{AppError, Result};

/// Id of the canvas the tower renders into
pub const CANVAS_ID: &str = "jenga-canvas";
/// Id of the reset button
pub const RESET_BUTTON_ID: &str = "reset";

#[wasm_bindgen(start)]
pub fn start() -> std::result::Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let query = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    let config = HostConfig::resolve(None, variant_from_query(&query), ConfigSource::Defaults).map_err(to_js)?;
    config.print_summary();

    crate::run(config).map_err(to_js)
}

fn to_js(error: AppError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn js_error(context: &str, value: JsValue) -> AppError {
    AppError::Web(format!("{}: {:?}", context, value))
}

fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| AppError::Web("no document".to_string()))
}

/// Point the window at the page's canvas
pub fn attach_canvas(attrs: WindowAttributes) -> Result<WindowAttributes> {
    let canvas = document()?
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| AppError::Web(format!("canvas #{} not found", CANVAS_ID)))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| AppError::Web(format!("#{} is not a canvas", CANVAS_ID)))?;

    Ok(attrs.with_canvas(Some(canvas)))
}

/// Wire the reset button to send [`AppEvent::Reset`]
pub fn install_reset_button(proxy: EventLoopProxy<AppEvent>) -> Result<()> {
    let document = document()?;
    let button = match document.get_element_by_id(RESET_BUTTON_ID) {
        Some(button) => button,
        None => {
            let button = document
                .create_element("button")
                .map_err(|e| js_error("create button", e))?;
            button.set_id(RESET_BUTTON_ID);
            button.set_text_content(Some("reset"));
            let body = document.body().ok_or_else(|| AppError::Web("no body".to_string()))?;
            body.append_child(&button).map_err(|e| js_error("append button", e))?;
            button
        }
    };

    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        if proxy.send_event(AppEvent::Reset).is_err() {
            log::warn!("Reset ignored, event loop closed");
        }
    });
    button
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|e| js_error("listen for clicks", e))?;
    closure.forget();

    Ok(())
}
