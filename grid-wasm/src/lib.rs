use std::cell::RefCell;
use std::rc::Rc;

use grid_core::{CANVAS_SIZE, DEFAULT_CARD_H, DEFAULT_CARD_W, card_color, resolve_layout};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, DragEvent, HtmlCanvasElement, HtmlElement, MouseEvent,
    Window,
};

mod canvas;
mod dock;
mod export;
mod models;
mod state;
mod upload;
mod utils;

use models::{BoardDoc, CardInfo};
use state::{STATE, State};
use utils::{
    asset_url, fetch_text_with_fallbacks, from_screen, get_query_param, log, sync_canvas_size,
    to_screen,
};

/// Pixel margin kept around the board when fitting it to the canvas.
const VIEW_MARGIN_PX: f64 = 24.0;

fn event_canvas_coords(e: &MouseEvent, cv: &HtmlCanvasElement) -> (f64, f64) {
    // Convert client coordinates into canvas internal pixel coordinates
    // so hit testing works even if CSS scales the canvas element.
    if let Some(el) = cv.dyn_ref::<web_sys::Element>() {
        let rect = el.get_bounding_client_rect();
        let x = (e.client_x() as f64 - rect.left()) * (cv.width() as f64) / rect.width().max(1.0);
        let y = (e.client_y() as f64 - rect.top()) * (cv.height() as f64) / rect.height().max(1.0);
        (x, y)
    } else {
        (e.offset_x() as f64, e.offset_y() as f64)
    }
}

/// Fit the fixed 1000x1000 logical board to the canvas, centered.
fn update_viewport(state: &mut State) {
    let canvas_w = state.canvas.width() as f64;
    let canvas_h = state.canvas.height() as f64;
    let scale_x = (canvas_w - 2.0 * VIEW_MARGIN_PX) / CANVAS_SIZE;
    let scale_y = (canvas_h - 2.0 * VIEW_MARGIN_PX) / CANVAS_SIZE;
    let scale = scale_x.min(scale_y).max(0.05);
    let side = CANVAS_SIZE * scale;
    state.scale = scale;
    state.offset = ((canvas_w - side) / 2.0, (canvas_h - side) / 2.0);
}

/// Topmost card under a canvas-pixel point, honoring draw order.
fn hit_test_card(state: &State, px: f64, py: f64) -> Option<String> {
    let (gx, gy) = from_screen(px, py, state.scale, state.offset);
    for item in state.doc.layout.iter().rev() {
        if gx >= item.x && gx <= item.x + item.w && gy >= item.y && gy <= item.y + item.h {
            return Some(item.id.clone());
        }
    }
    None
}

pub(crate) fn draw(state: &mut State) {
    sync_canvas_size(state);
    update_viewport(state);
    let width = state.canvas.width() as f64;
    let height = state.canvas.height() as f64;
    canvas::set_fill_style(&state.ctx, "#030712");
    state.ctx.fill_rect(0.0, 0.0, width, height);

    canvas::draw_board_background(&state.ctx, state.scale, state.offset);
    let theme = &state.doc.theme;
    canvas::draw_axis_labels(
        &state.ctx,
        (
            theme.axis_top.as_str(),
            theme.axis_bottom.as_str(),
            theme.axis_left.as_str(),
            theme.axis_right.as_str(),
        ),
        state.scale,
        state.offset,
    );

    // Dragged card last so it stays on top of what it pushes around.
    let dragging = state.dragging_id.clone();
    for item in &state.doc.layout {
        if dragging.as_deref() == Some(item.id.as_str()) {
            continue;
        }
        canvas::draw_card(
            &state.ctx,
            item,
            state.doc.card_title(&item.id),
            &card_color(state.doc.card_index(&item.id)),
            false,
            state.scale,
            state.offset,
        );
    }
    if let Some(id) = &dragging
        && let Some(item) = state.doc.layout.iter().find(|l| &l.id == id)
    {
        canvas::draw_card(
            &state.ctx,
            item,
            state.doc.card_title(id),
            &card_color(state.doc.card_index(id)),
            true,
            state.scale,
            state.offset,
        );
    }
}

pub(crate) fn update_theme_dom(state: &State) {
    if let Some(el) = state.document.get_element_by_id("themeTitle")
        && let Ok(el) = el.dyn_into::<HtmlElement>()
    {
        el.set_inner_text(&state.doc.theme.title);
    }
}

pub(crate) fn render_dock_logged(state: &State) {
    if let Err(e) = dock::render_dock(state) {
        log(&format!("dock render failed: {:?}", e));
    }
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    upload::attach_file_input(state.clone())?;

    // Reset button (restore the loaded board)
    if let Some(btn) = doc.get_element_by_id("resetBoard") {
        let btn: HtmlElement = btn.dyn_into()?;
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            s.doc = s.initial_doc.clone();
            s.dragging_id = None;
            update_theme_dom(&s);
            render_dock_logged(&s);
            draw(&mut s);
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Save current board as JSON
    if let Some(btn) = doc.get_element_by_id("saveJson") {
        let btn: HtmlElement = btn.dyn_into()?;
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            if let Err(e) = export::save_board_json(&st.borrow()) {
                log(&format!("save failed: {:?}", e));
            }
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Export poster (deterministic PNG)
    if let Some(btn) = doc.get_element_by_id("exportPng") {
        let btn: HtmlElement = btn.dyn_into()?;
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            if let Err(e) = export::export_png(&st.borrow()) {
                log(&format!("PNG export failed: {:?}", e));
            }
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Export poster as SVG text
    if let Some(btn) = doc.get_element_by_id("exportSvg") {
        let btn: HtmlElement = btn.dyn_into()?;
        let st = state.clone();
        let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            if let Err(e) = export::export_svg(&st.borrow()) {
                log(&format!("SVG export failed: {:?}", e));
            }
        }));
        btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
        onclick.forget();
    }

    // Mouse events: grab, live-resolve while moving, settle on release
    {
        let st = state.clone();
        let mousedown = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let (px, py) = event_canvas_coords(&e, &s.canvas);
            if let Some(id) = hit_test_card(&s, px, py) {
                let grab = s
                    .doc
                    .layout
                    .iter()
                    .find(|l| l.id == id)
                    .map(|item| to_screen(item.x, item.y, s.scale, s.offset));
                if let Some((sx, sy)) = grab {
                    s.drag_off = (px - sx, py - sy);
                }
                s.dragging_id = Some(id);
                draw(&mut s);
            }
        }));
        state
            .borrow()
            .canvas
            .add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }
    {
        let st = state.clone();
        let mousemove = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let Some(id) = s.dragging_id.clone() else {
                return;
            };
            let (px, py) = event_canvas_coords(&e, &s.canvas);
            let (gx, gy) = from_screen(px - s.drag_off.0, py - s.drag_off.1, s.scale, s.offset);
            if let Some(mut moved) = s.doc.layout.iter().find(|l| l.id == id).cloned() {
                moved.x = gx.clamp(0.0, CANVAS_SIZE - moved.w);
                moved.y = gy.clamp(0.0, CANVAS_SIZE - moved.h);
                // Live preview: neighbors get pushed while the drag is
                // still in flight.
                s.doc.layout = resolve_layout(&s.doc.layout, &moved);
                draw(&mut s);
            }
        }));
        state
            .borrow()
            .canvas
            .add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
        mousemove.forget();
    }
    {
        let st = state.clone();
        let mouseup = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let Some(id) = s.dragging_id.take() else {
                return;
            };
            if dock::point_over_dock(&s, e.client_x() as f64, e.client_y() as f64) {
                // Dropping a card onto the dock returns it to the dock.
                s.doc.layout.retain(|l| l.id != id);
                render_dock_logged(&s);
            } else if let Some(item) = s.doc.layout.iter().find(|l| l.id == id).cloned() {
                s.doc.layout = resolve_layout(&s.doc.layout, &item);
            }
            draw(&mut s);
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }

    // HTML5 drag and drop from the dock onto the canvas
    {
        let dragover = Closure::<dyn FnMut(DragEvent)>::wrap(Box::new(move |e: DragEvent| {
            e.prevent_default();
        }));
        state
            .borrow()
            .canvas
            .add_event_listener_with_callback("dragover", dragover.as_ref().unchecked_ref())?;
        dragover.forget();
    }
    {
        let st = state.clone();
        let ondrop = Closure::<dyn FnMut(DragEvent)>::wrap(Box::new(move |e: DragEvent| {
            e.prevent_default();
            let Some(dt) = e.data_transfer() else {
                return;
            };
            let payload = dt
                .get_data("application/json")
                .or_else(|_| dt.get_data("text/plain"))
                .unwrap_or_default();
            let Ok(card) = serde_json::from_str::<CardInfo>(&payload) else {
                log("drop payload was not a card");
                return;
            };
            let mut s = st.borrow_mut();
            if s.doc.is_placed(&card.id) {
                return;
            }
            let (px, py) = event_canvas_coords(&e, &s.canvas);
            let (gx, gy) = from_screen(px, py, s.scale, s.offset);
            let mut item = grid_core::PlacedItem::new(
                card.id.clone(),
                gx - DEFAULT_CARD_W / 2.0,
                gy - DEFAULT_CARD_H / 2.0,
                DEFAULT_CARD_W,
                DEFAULT_CARD_H,
            );
            item.x = item.x.clamp(0.0, CANVAS_SIZE - item.w);
            item.y = item.y.clamp(0.0, CANVAS_SIZE - item.h);
            if !s.doc.cards.iter().any(|c| c.id == card.id) {
                s.doc.cards.push(card);
            }
            s.doc.layout = resolve_layout(&s.doc.layout, &item);
            render_dock_logged(&s);
            draw(&mut s);
        }));
        state
            .borrow()
            .canvas
            .add_event_listener_with_callback("drop", ondrop.as_ref().unchecked_ref())?;
        ondrop.forget();
    }

    // Redraw on window resize so the fit-to-canvas transform stays fresh
    {
        let st = state.clone();
        let onresize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            draw(&mut st.borrow_mut());
        }));
        state
            .borrow()
            .window
            .add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    Ok(())
}

fn init_canvas(
    document: &Document,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv = document
        .get_element_by_id("cv")
        .ok_or_else(|| JsValue::from_str("canvas #cv not found"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}

fn default_board() -> BoardDoc {
    let text = include_str!("../../themes/default.json");
    serde_json::from_str(text).unwrap_or_default()
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let (canvas, ctx) = init_canvas(&document)?;

    let doc = default_board();
    // If URL param t is set, fetch themes/<t>.json; else keep the default
    if let Ok(search) = window.location().search()
        && let Some(name) = get_query_param(&search, "t")
    {
        let win = window.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = fetch_and_load_theme(win, &name).await {
                log(&format!("failed to load theme '{}': {:?}", name, err));
            }
        });
    }

    let state = Rc::new(RefCell::new(State {
        window,
        document,
        canvas,
        ctx,
        initial_doc: doc.clone(),
        doc,
        dragging_id: None,
        drag_off: (0.0, 0.0),
        scale: 1.0,
        offset: (0.0, 0.0),
    }));

    STATE.with(|st| st.replace(Some(state.clone())));
    {
        let s = state.borrow();
        update_theme_dom(&s);
        render_dock_logged(&s);
    }
    attach_ui(state.clone())?;
    draw(&mut state.borrow_mut());
    Ok(())
}

async fn fetch_and_load_theme(window: Window, name: &str) -> Result<(), JsValue> {
    let text = fetch_text_with_fallbacks(
        &window,
        &[
            &asset_url(&format!("themes/{}.json", name)),
            &format!("/themes/{}.json", name),
            &format!("themes/{}.json", name),
        ],
    )
    .await
    .unwrap_or_default();
    let board: BoardDoc =
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;

    STATE.with(|st| {
        if let Some(st_rc) = st.borrow().as_ref() {
            let mut s = st_rc.borrow_mut();
            s.doc = board;
            s.initial_doc = s.doc.clone();
            s.dragging_id = None;
            update_theme_dom(&s);
            render_dock_logged(&s);
            draw(&mut s);
        }
    });
    Ok(())
}
