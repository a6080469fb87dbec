//! Fetch helpers
//!
//! Bodies are returned as text whatever the status code, since the server
//! reports application errors as JSON on 4xx/5xx responses too. Decoding is
//! left to `docconvert-core`.

use docconvert_core::ClientError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{FormData, Request, RequestInit, Response};

async fn fetch_text(request: Request) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let response = JsFuture::from(window.fetch_with_request(&request)).await?;
    let response: Response = response.dyn_into()?;

    if !response.ok() {
        tracing::debug!(
            url = %response.url(),
            status = response.status(),
            "non-success status"
        );
    }

    let text = JsFuture::from(response.text()?).await?;
    text.as_string()
        .ok_or_else(|| JsValue::from_str("Response body is not text"))
}

/// GET `url`
pub async fn get_text(url: &str) -> Result<String, JsValue> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Accept", "application/json")?;
    fetch_text(request).await
}

/// POST a multipart form; the browser sets the boundary header
pub async fn post_form(url: &str, form: &FormData) -> Result<String, JsValue> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_body(form);
    let request = Request::new_with_str_and_init(url, &opts)?;
    fetch_text(request).await
}

/// POST without a body
pub async fn post_empty(url: &str) -> Result<String, JsValue> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    let request = Request::new_with_str_and_init(url, &opts)?;
    fetch_text(request).await
}

/// Human-readable text of a thrown JS value
pub fn describe(err: &JsValue) -> String {
    if let Some(s) = err.as_string() {
        return s;
    }
    if let Some(e) = err.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    format!("{:?}", err)
}

pub fn transport_error(err: JsValue) -> ClientError {
    ClientError::Transport(describe(&err))
}
