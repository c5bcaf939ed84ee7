use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use crate::models::BoardDoc;

/// Application state shared across the WASM callbacks behind an
/// `Rc<RefCell<_>>`.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub doc: BoardDoc,
    /// Id of the card being dragged on the canvas, if any.
    pub dragging_id: Option<String>,
    /// Screen-space offset from the grabbed card's top-left corner.
    pub drag_off: (f64, f64),
    // view transform: logical units -> canvas px
    pub scale: f64,
    pub offset: (f64, f64),
    /// Snapshot taken after loading, restored by the Reset button.
    pub initial_doc: BoardDoc,
}

/// Thread local storage for the single runtime state instance.
thread_local! {
    pub static STATE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
}
