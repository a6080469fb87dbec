//! One-shot timers on the window

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Run `f` once after `delay_ms`; returns the timeout handle
pub fn set_timeout<F>(delay_ms: u32, f: F) -> Result<i32, JsValue>
where
    F: FnOnce() + 'static,
{
    let window = web_sys::window().ok_or("No window")?;
    let callback = Closure::once_into_js(f);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms.min(i32::MAX as u32) as i32,
    )
}
