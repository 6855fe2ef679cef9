//! Browser helpers: clipboard and file download

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlDocument, HtmlTextAreaElement, Url};

use crate::error::MatrixError;

/// MIME type for CSV downloads
pub const CSV_MIME: &str = "text/csv;charset=utf-8;";

/// Copy `text` to the clipboard.
///
/// Tries `navigator.clipboard.writeText` first and falls back to a hidden
/// textarea with `execCommand("copy")` when the async API is missing or refuses.
pub async fn copy_text(text: &str) -> Result<(), MatrixError> {
    match write_clipboard_api(text).await {
        Ok(()) => Ok(()),
        Err(err) => {
            log::debug!("Clipboard API unavailable ({:?}), using textarea fallback", err);
            copy_with_textarea(text)
        }
    }
}

async fn write_clipboard_api(text: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window unavailable"))?;
    let navigator = js_sys::Reflect::get(&window, &JsValue::from_str("navigator"))?;
    let clipboard = js_sys::Reflect::get(&navigator, &JsValue::from_str("clipboard"))?;
    if clipboard.is_undefined() || clipboard.is_null() {
        return Err(JsValue::from_str("navigator.clipboard unavailable"));
    }
    let write_text: js_sys::Function =
        js_sys::Reflect::get(&clipboard, &JsValue::from_str("writeText"))?.dyn_into()?;
    let promise: js_sys::Promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))?
        .dyn_into()?;
    JsFuture::from(promise).await?;
    Ok(())
}

fn copy_with_textarea(text: &str) -> Result<(), MatrixError> {
    let clipboard_err = |msg: &str| MatrixError::Clipboard(msg.to_string());

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| clipboard_err("document unavailable"))?;
    let body = document.body().ok_or_else(|| clipboard_err("missing body"))?;

    let textarea: HtmlTextAreaElement = document
        .create_element("textarea")
        .map_err(|_| clipboard_err("unable to create textarea"))?
        .dyn_into()
        .map_err(|_| clipboard_err("textarea cast failed"))?;
    textarea.set_value(text);
    let style = textarea.style();
    style.set_property("position", "fixed").ok();
    style.set_property("top", "0").ok();
    style.set_property("left", "0").ok();
    style.set_property("opacity", "0").ok();

    body.append_child(&textarea)
        .map_err(|_| clipboard_err("unable to attach textarea"))?;
    textarea.select();

    let copied = document
        .dyn_into::<HtmlDocument>()
        .ok()
        .and_then(|doc| doc.exec_command("copy").ok())
        .unwrap_or(false);
    textarea.remove();

    if copied {
        Ok(())
    } else {
        Err(clipboard_err("clipboard copy blocked"))
    }
}

/// Offer `contents` to the user as a file download
pub fn download_text(file_name: &str, mime: &str, contents: &str) -> Result<(), MatrixError> {
    let download_err = |msg: &str| MatrixError::Download(msg.to_string());

    let opts = BlobPropertyBag::new();
    opts.set_type(mime);
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(contents));
    let blob = Blob::new_with_str_sequence_and_options(&parts, &opts)
        .map_err(|_| download_err("unable to create blob"))?;
    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|_| download_err("unable to create object URL"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| download_err("document unavailable"))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|_| download_err("unable to create anchor"))?
        .dyn_into()
        .map_err(|_| download_err("anchor cast failed"))?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.style().set_property("display", "none").ok();

    document
        .body()
        .ok_or_else(|| download_err("missing body"))?
        .append_child(&anchor)
        .map_err(|_| download_err("unable to attach anchor"))?;
    anchor.click();
    anchor.remove();
    Url::revoke_object_url(&url).ok();

    Ok(())
}
