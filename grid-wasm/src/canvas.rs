use grid_core::{CANVAS_SIZE, PlacedItem};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

use crate::utils::to_screen;

const GRID_STEP: f64 = 50.0;

// Non-deprecated helpers to set canvas styles via property assignment.
pub fn set_fill_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(color),
    );
}

pub fn set_stroke_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(color),
    );
}

/// Paint the board background: dark fill, light grid lines every 50
/// logical units, center axis lines and the origin mark.
pub fn draw_board_background(
    ctx: &CanvasRenderingContext2d,
    scale: f64,
    offset: (f64, f64),
) {
    let (x0, y0) = to_screen(0.0, 0.0, scale, offset);
    let side = CANVAS_SIZE * scale;
    set_fill_style(ctx, "#111827");
    ctx.fill_rect(x0, y0, side, side);

    ctx.set_line_width(1.0);
    set_stroke_style(ctx, "#374151");
    let mut t = GRID_STEP;
    while t < CANVAS_SIZE {
        let (sx, sy) = to_screen(t, t, scale, offset);
        ctx.begin_path();
        ctx.move_to(sx, y0);
        ctx.line_to(sx, y0 + side);
        ctx.stroke();
        ctx.begin_path();
        ctx.move_to(x0, sy);
        ctx.line_to(x0 + side, sy);
        ctx.stroke();
        t += GRID_STEP;
    }

    // center axes
    let (cx, cy) = to_screen(CANVAS_SIZE / 2.0, CANVAS_SIZE / 2.0, scale, offset);
    ctx.set_line_width(2.0);
    set_stroke_style(ctx, "#6b7280");
    ctx.begin_path();
    ctx.move_to(cx, y0);
    ctx.line_to(cx, y0 + side);
    ctx.stroke();
    ctx.begin_path();
    ctx.move_to(x0, cy);
    ctx.line_to(x0 + side, cy);
    ctx.stroke();
    set_fill_style(ctx, "#9ca3af");
    ctx.begin_path();
    let _ = ctx.arc(cx, cy, 3.0, 0.0, std::f64::consts::TAU);
    ctx.fill();
}

/// Draw the four axis captions just inside the board edges.
pub fn draw_axis_labels(
    ctx: &CanvasRenderingContext2d,
    labels: (&str, &str, &str, &str),
    scale: f64,
    offset: (f64, f64),
) {
    let (top, bottom, left, right) = labels;
    let size = (16.0 * scale).clamp(11.0, 22.0);
    ctx.set_font(&format!("bold {size}px sans-serif"));
    set_fill_style(ctx, "#9ca3af");
    let mid = CANVAS_SIZE / 2.0;

    ctx.set_text_align("center");
    ctx.set_text_baseline("top");
    let (x, y) = to_screen(mid, 8.0, scale, offset);
    let _ = ctx.fill_text(top, x, y);
    ctx.set_text_baseline("bottom");
    let (x, y) = to_screen(mid, CANVAS_SIZE - 8.0, scale, offset);
    let _ = ctx.fill_text(bottom, x, y);

    ctx.set_text_baseline("middle");
    ctx.set_text_align("left");
    let (x, y) = to_screen(8.0, mid, scale, offset);
    let _ = ctx.fill_text(left, x, y);
    ctx.set_text_align("right");
    let (x, y) = to_screen(CANVAS_SIZE - 8.0, mid, scale, offset);
    let _ = ctx.fill_text(right, x, y);
}

/// Draw one placed card: palette fill, border and centered title.
/// The dragged card gets a brighter border so it reads as grabbed.
pub fn draw_card(
    ctx: &CanvasRenderingContext2d,
    item: &PlacedItem,
    title: &str,
    color: &str,
    grabbed: bool,
    scale: f64,
    offset: (f64, f64),
) {
    let (sx, sy) = to_screen(item.x, item.y, scale, offset);
    let (sw, sh) = (item.w * scale, item.h * scale);
    set_fill_style(ctx, color);
    ctx.set_global_alpha(0.85);
    ctx.fill_rect(sx, sy, sw, sh);
    ctx.set_global_alpha(1.0);
    ctx.set_line_width(if grabbed { 3.0 } else { 1.5 });
    set_stroke_style(ctx, if grabbed { "#f9fafb" } else { "#1f2937" });
    ctx.stroke_rect(sx, sy, sw, sh);

    if title.is_empty() {
        return;
    }
    let size = (13.0 * scale).clamp(9.0, 18.0);
    ctx.set_font(&format!("{size}px sans-serif"));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    // Keep the label inside the card even for long titles.
    ctx.save();
    ctx.begin_path();
    ctx.rect(sx, sy, sw, sh);
    ctx.clip();
    ctx.set_line_width(3.0);
    set_stroke_style(ctx, "#111827");
    let _ = ctx.stroke_text(title, sx + sw / 2.0, sy + sh / 2.0);
    set_fill_style(ctx, "#f9fafb");
    let _ = ctx.fill_text(title, sx + sw / 2.0, sy + sh / 2.0);
    ctx.restore();
}
