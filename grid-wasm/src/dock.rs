use grid_core::card_color;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{DragEvent, HtmlElement};

use crate::state::State;
use crate::utils::log;

/// Rebuild the dock strip from the catalog cards not currently placed.
/// Each tile is draggable; `dragstart` serializes the card into the
/// event's `dataTransfer` so the drop handler gets its payload
/// explicitly instead of through shared drag state.
pub fn render_dock(state: &State) -> Result<(), JsValue> {
    let doc = &state.document;
    let Some(dock) = doc.get_element_by_id("dock") else {
        log("dock element #dock not found");
        return Ok(());
    };
    dock.set_inner_html("");
    for card in state.doc.dock_cards() {
        let idx = state.doc.card_index(&card.id);
        let tile = doc.create_element("div")?.dyn_into::<HtmlElement>()?;
        tile.set_class_name("dock-card");
        tile.set_attribute("draggable", "true")?;
        tile.set_attribute(
            "style",
            &format!("border-top:4px solid {};", card_color(idx)),
        )?;
        let label = match card.year {
            Some(y) => format!("{} ({})", card.title, y),
            None => card.title.clone(),
        };
        tile.set_inner_text(&label);

        let payload = serde_json::to_string(card).unwrap_or_default();
        let ondragstart = Closure::<dyn FnMut(DragEvent)>::wrap(Box::new(move |e: DragEvent| {
            if let Some(dt) = e.data_transfer() {
                let _ = dt.set_data("application/json", &payload);
                // Some browsers refuse the drop without a text/plain entry.
                let _ = dt.set_data("text/plain", &payload);
                dt.set_effect_allowed("copyMove");
            }
        }));
        tile.set_ondragstart(Some(ondragstart.as_ref().unchecked_ref()));
        ondragstart.forget();
        dock.append_child(&tile)?;
    }
    Ok(())
}

/// Whether a client-space point is over the dock strip. Used on mouseup
/// to return a dragged card to the dock.
pub fn point_over_dock(state: &State, client_x: f64, client_y: f64) -> bool {
    let Some(dock) = state.document.get_element_by_id("dock") else {
        return false;
    };
    let rect = dock.get_bounding_client_rect();
    client_x >= rect.left()
        && client_x <= rect.right()
        && client_y >= rect.top()
        && client_y <= rect.bottom()
}
