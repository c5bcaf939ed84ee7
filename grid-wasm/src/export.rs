use js_sys::Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Blob, Document, HtmlElement, Url};

use crate::state::State;

/// Export resolution: canvas px per logical unit.
const POSTER_PX_PER_UNIT: f64 = 1.2;

fn to_poster_doc(state: &State) -> poster_core::BoardDoc {
    poster_core::BoardDoc {
        theme: poster_core::Theme {
            title: state.doc.theme.title.clone(),
            axis_top: state.doc.theme.axis_top.clone(),
            axis_bottom: state.doc.theme.axis_bottom.clone(),
            axis_left: state.doc.theme.axis_left.clone(),
            axis_right: state.doc.theme.axis_right.clone(),
        },
        cards: state
            .doc
            .cards
            .iter()
            .map(|c| poster_core::CardInfo {
                id: c.id.clone(),
                title: c.title.clone(),
                year: c.year,
                image_url: c.image_url.clone(),
            })
            .collect(),
        layout: state.doc.layout.clone(),
    }
}

/// Download the current board as pretty-printed JSON.
pub fn save_board_json(state: &State) -> Result<(), JsValue> {
    let text = serde_json::to_string_pretty(&state.doc).unwrap_or_else(|_| "{}".to_string());
    save_text_as_file(&state.document, "bias_board.json", &text)
}

/// Download the poster as SVG text.
pub fn export_svg(state: &State) -> Result<(), JsValue> {
    let (svg, _w, _h) = poster_core::build_poster_svg(&to_poster_doc(state), POSTER_PX_PER_UNIT);
    save_text_as_file(&state.document, "bias_board.svg", &svg)
}

/// Rasterize the poster and download it as a deterministic PNG.
pub fn export_png(state: &State) -> Result<(), JsValue> {
    let (svg, w_px, h_px) = poster_core::build_poster_svg(&to_poster_doc(state), POSTER_PX_PER_UNIT);

    // No font database in the browser build: text layers rasterize only
    // in the native poster CLI. The SVG export keeps all text.
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(&svg, &opt)
        .map_err(|e| JsValue::from_str(&format!("SVG parse error: {e:?}")))?;
    let mut pixmap =
        tiny_skia::Pixmap::new(w_px, h_px).ok_or(JsValue::from_str("pixmap alloc failed"))?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);

    let bytes = poster_core::encode_rgba_to_png_bytes(w_px, h_px, pixmap.data())
        .map_err(|e| JsValue::from_str(&format!("encode: {e}")))?;
    save_bytes_as_file(&state.document, "bias_board.png", &bytes)
}

fn save_text_as_file(document: &Document, filename: &str, text: &str) -> Result<(), JsValue> {
    let array = Array::new();
    array.push(&JsValue::from_str(text));
    let blob = Blob::new_with_str_sequence(&array)?;
    trigger_download(document, filename, &blob)
}

fn save_bytes_as_file(document: &Document, filename: &str, bytes: &[u8]) -> Result<(), JsValue> {
    let array = Array::new();
    let u8 = js_sys::Uint8Array::from(bytes);
    array.push(&u8);
    let blob = Blob::new_with_u8_array_sequence(&array)?;
    trigger_download(document, filename, &blob)
}

fn trigger_download(document: &Document, filename: &str, blob: &Blob) -> Result<(), JsValue> {
    let url = Url::create_object_url_with_blob(blob)?;
    let a = document.create_element("a")?.dyn_into::<HtmlElement>()?;
    a.set_attribute("href", &url)?;
    a.set_attribute("download", filename)?;
    a.click();
    Url::revoke_object_url(&url)?;
    Ok(())
}
