use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, FileReader, HtmlInputElement};

use crate::models::BoardDoc;
use crate::state::State;
use crate::utils::log;
use crate::{draw, render_dock_logged, update_theme_dom};

/// Wires up the file input for loading a previously saved board JSON.
pub fn attach_file_input(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc: Document = state.borrow().document.clone();
    let Some(input) = doc.get_element_by_id("file") else {
        return Ok(());
    };
    let input: HtmlInputElement = input.dyn_into()?;
    let st = state.clone();
    let input_for_closure = input.clone();
    let onchange = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_e: Event| {
        let Some(files) = input_for_closure.files() else {
            log("no file list on input");
            return;
        };
        let Some(file) = files.item(0) else {
            log("no file selected");
            return;
        };
        let reader = match FileReader::new() {
            Ok(r) => r,
            Err(_) => return,
        };
        let st2 = st.clone();
        let reader_for_closure = reader.clone();
        let onload = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_ev: Event| {
            let text = reader_for_closure
                .result()
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default();
            if text.is_empty() {
                log("selected file is empty or unreadable");
                return;
            }
            match serde_json::from_str::<BoardDoc>(&text) {
                Ok(board) => {
                    let mut s = st2.borrow_mut();
                    s.doc = board;
                    s.initial_doc = s.doc.clone();
                    s.dragging_id = None;
                    update_theme_dom(&s);
                    render_dock_logged(&s);
                    draw(&mut s);
                }
                Err(e) => {
                    log(&format!("unrecognized board JSON: {e}"));
                    let _ = st2
                        .borrow()
                        .window
                        .alert_with_message("Could not read this board file.");
                }
            }
        }));
        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        if let Err(e) = reader.read_as_text(&file) {
            log(&format!("failed to read file: {:?}", e));
        }
        onload.forget();
    }));
    input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
    onchange.forget();
    Ok(())
}
