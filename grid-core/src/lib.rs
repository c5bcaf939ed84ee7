use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Side length of the logical canvas. Card positions live in this square.
pub const CANVAS_SIZE: f64 = 1000.0;
/// Default card footprint for items dropped from the dock (logical units).
pub const DEFAULT_CARD_W: f64 = 120.0;
pub const DEFAULT_CARD_H: f64 = 170.0;

/// Fraction of a card's own width/height that may overlap a neighbor
/// before the pair counts as colliding. Each card contributes its own
/// margin, so two cards tolerate up to 15% + 15% of mutual overlap on
/// an axis. This keeps tightly packed boards looking like a collage
/// instead of forcing visible gaps everywhere.
pub const OVERLAP_MARGIN: f64 = 0.15;
/// Vertical clearance subtracted when pushing a card out of the way:
/// the two 15% margins combined. A pushed card lands just past the
/// tolerated-overlap threshold, not fully clear of the pusher.
pub const PUSH_ALLOWANCE: f64 = 2.0 * OVERLAP_MARGIN;
/// Hard cap on resolver queue pops. Exceeding it stops resolution and
/// returns the layout as-is rather than looping on a pathological
/// configuration.
pub const MAX_RESOLVE_STEPS: usize = 1000;

/// A positioned card rectangle on the canvas, keyed by a stable id.
/// `x`/`y` is the top-left corner in logical units; coordinates are
/// continuous, never grid-snapped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacedItem {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    // Carried through serialization for the UI; never read by the resolver.
    #[serde(default)]
    pub resizable: bool,
}

impl PlacedItem {
    pub fn new(id: impl Into<String>, x: f64, y: f64, w: f64, h: f64) -> Self {
        PlacedItem {
            id: id.into(),
            x,
            y,
            w,
            h,
            resizable: false,
        }
    }
}

/// A span shrunk inward by the card's own overlap margin on both ends.
fn shrunk_span(start: f64, size: f64) -> (f64, f64) {
    let m = OVERLAP_MARGIN * size;
    (start + m, start + size - m)
}

/// Whether two cards collide once each has been shrunk by its own
/// tolerance margin. Separating-axis test on the shrunk spans; touching
/// at a shrunk edge (equality) counts as non-overlapping so cards in
/// contact do not flap between states.
pub fn overlaps(a: &PlacedItem, b: &PlacedItem) -> bool {
    let (ax0, ax1) = shrunk_span(a.x, a.w);
    let (ay0, ay1) = shrunk_span(a.y, a.h);
    let (bx0, bx1) = shrunk_span(b.x, b.w);
    let (by0, by1) = shrunk_span(b.y, b.h);
    !(ax1 <= bx0 || ax0 >= bx1 || ay1 <= by0 || ay0 >= by1)
}

/// Re-resolve the board after `moving` has been dragged or dropped.
///
/// The moving card replaces any entry with the same id (or is appended
/// if new), then colliding neighbors are pushed strictly downward,
/// breadth-first, until nothing overlaps beyond the tolerated margin or
/// the step cap is hit. Only `y` is ever modified; ids and `x` are
/// preserved, and the result is deterministic for a given input order.
pub fn resolve_layout(current: &[PlacedItem], moving: &PlacedItem) -> Vec<PlacedItem> {
    let mut layout: Vec<PlacedItem> = current.to_vec();
    match layout.iter_mut().find(|l| l.id == moving.id) {
        Some(slot) => *slot = moving.clone(),
        None => layout.push(moving.clone()),
    }

    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(moving.id.clone());

    let mut steps = 0;
    while steps < MAX_RESOLVE_STEPS {
        let Some(id) = queue.pop_front() else { break };
        steps += 1;
        // Re-read the live rectangle: pushes applied earlier in this pass
        // must be visible here, or two pushed cards can land on top of
        // each other.
        let Some(cur) = layout.iter().find(|l| l.id == id).cloned() else {
            continue;
        };
        for other in layout.iter_mut() {
            if other.id == cur.id || !overlaps(&cur, other) {
                continue;
            }
            let new_y = cur.y + cur.h - PUSH_ALLOWANCE * cur.h;
            // Never push upward or touch a card that is already clear.
            if other.y < new_y {
                other.y = new_y;
                if !queue.contains(&other.id) {
                    queue.push_back(other.id.clone());
                }
            }
        }
    }
    layout
}

/// Stable categorical color for the card at `i`, cycling by index%16.
/// Shared by the canvas renderer and the poster export so the live view
/// and the exported image agree.
pub fn card_color(i: usize) -> String {
    const PALETTE: [&str; 16] = [
        "#ef4444", // red
        "#f97316", // orange
        "#f59e0b", // amber
        "#eab308", // yellow
        "#84cc16", // lime
        "#22c55e", // green
        "#14b8a6", // teal
        "#06b6d4", // cyan
        "#0ea5e9", // sky
        "#3b82f6", // blue
        "#8b5cf6", // violet
        "#a855f7", // purple
        "#d946ef", // fuchsia
        "#ec4899", // pink
        "#f43f5e", // rose
        "#64748b", // slate
    ];
    PALETTE[i % PALETTE.len()].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, x: f64, y: f64) -> PlacedItem {
        PlacedItem::new(id, x, y, 100.0, 100.0)
    }

    #[test]
    fn full_overlap_collides() {
        let a = item("a", 0.0, 0.0);
        let b = item("b", 50.0, 50.0);
        assert!(overlaps(&a, &b));
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = item("a", 0.0, 0.0);
        let b = item("b", 100.0, 0.0);
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn overlap_within_margin_is_tolerated() {
        // 15% vertical overlap: exactly at the combined-margin threshold.
        let a = item("a", 0.0, 0.0);
        let b = item("b", 0.0, 85.0);
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn overlap_beyond_margin_collides() {
        let a = item("a", 0.0, 0.0);
        let b = item("b", 0.0, 50.0);
        assert!(overlaps(&a, &b));
    }

    #[test]
    fn predicate_is_symmetric() {
        let cases = [
            (item("a", 0.0, 0.0), item("b", 50.0, 50.0)),
            (item("a", 0.0, 0.0), item("b", 100.0, 0.0)),
            (item("a", 0.0, 0.0), item("b", 0.0, 85.0)),
            (
                PlacedItem::new("a", 10.0, 10.0, 300.0, 40.0),
                PlacedItem::new("b", 40.0, 30.0, 60.0, 200.0),
            ),
        ];
        for (a, b) in &cases {
            assert_eq!(overlaps(a, b), overlaps(b, a));
        }
    }

    #[test]
    fn resolving_a_non_move_changes_nothing() {
        let layout = vec![item("a", 0.0, 0.0), item("b", 200.0, 0.0), item("c", 0.0, 300.0)];
        let resolved = resolve_layout(&layout, &layout[1]);
        assert_eq!(resolved, layout);
    }

    #[test]
    fn clear_drop_only_inserts_the_new_item() {
        let layout = vec![item("a", 0.0, 0.0), item("b", 300.0, 300.0)];
        let m = item("m", 600.0, 600.0);
        let resolved = resolve_layout(&layout, &m);
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0], layout[0]);
        assert_eq!(resolved[1], layout[1]);
        assert_eq!(resolved[2], m);
    }

    #[test]
    fn moving_an_existing_item_replaces_its_entry() {
        let layout = vec![item("a", 0.0, 0.0), item("b", 500.0, 0.0)];
        let moved = item("b", 700.0, 100.0);
        let resolved = resolve_layout(&layout, &moved);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1], moved);
    }

    #[test]
    fn half_overlap_pushes_down_past_the_margin() {
        let a = item("a", 0.0, 0.0);
        let b = item("b", 0.0, 50.0);
        let resolved = resolve_layout(&[a.clone(), b], &a);
        // b clears a's box minus the combined 30% allowance: 0 + 100 - 30.
        assert_eq!(resolved[1].y, 70.0);
        assert_eq!(resolved[1].x, 0.0);
    }

    #[test]
    fn settled_chain_stays_untouched() {
        // b and c already just clear their upstream neighbor.
        let layout = vec![item("a", 0.0, 0.0), item("b", 0.0, 90.0), item("c", 0.0, 180.0)];
        let resolved = resolve_layout(&layout, &layout[0].clone());
        assert_eq!(resolved, layout);
    }

    #[test]
    fn pushes_cascade_through_the_chain() {
        let a = item("a", 0.0, 0.0);
        let b = item("b", 0.0, 50.0);
        let c = item("c", 0.0, 120.0);
        let resolved = resolve_layout(&[a.clone(), b, c], &a);
        // b is pushed to 70, which newly collides with c, pushing it to 140.
        assert_eq!(resolved[1].y, 70.0);
        assert_eq!(resolved[2].y, 140.0);
    }

    #[test]
    fn cascade_reads_live_positions_not_a_snapshot() {
        // Two cards stacked exactly on the mover. Both get pushed to the
        // same y first; re-reading live state then separates them instead
        // of leaving them double-placed.
        let a = item("a", 0.0, 0.0);
        let b = item("b", 0.0, 0.0);
        let c = item("c", 0.0, 0.0);
        let resolved = resolve_layout(&[a, b, c], &item("a", 0.0, 0.0));
        assert_eq!(resolved[1].y, 70.0);
        assert_eq!(resolved[2].y, 140.0);
    }

    #[test]
    fn pushes_never_move_x_and_only_go_down() {
        let layout = vec![
            PlacedItem::new("a", 10.0, 0.0, 150.0, 120.0),
            PlacedItem::new("b", 40.0, 30.0, 90.0, 200.0),
            PlacedItem::new("c", 0.0, 60.0, 200.0, 80.0),
        ];
        let resolved = resolve_layout(&layout, &layout[0].clone());
        for (before, after) in layout.iter().zip(&resolved) {
            assert_eq!(before.x, after.x);
            assert!(after.y >= before.y, "{} moved up", after.id);
        }
    }

    #[test]
    fn id_set_is_preserved() {
        let layout = vec![item("a", 0.0, 0.0), item("b", 10.0, 10.0), item("c", 20.0, 20.0)];
        let resolved = resolve_layout(&layout, &item("d", 15.0, 15.0));
        let mut ids: Vec<&str> = resolved.iter().map(|l| l.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["a", "b", "c", "d"]);
    }

    #[test]
    fn short_card_pushed_inside_a_tall_one_still_settles() {
        // A short card pushed by a tall one lands still inside the tall
        // card's box, which pushes the tall card back down in turn. The
        // exchange must end with the pair separated, not ping-pong.
        let tall = PlacedItem::new("tall", 0.0, 0.0, 100.0, 100.0);
        let short = PlacedItem::new("short", 0.0, 20.0, 100.0, 10.0);
        let resolved = resolve_layout(&[tall.clone(), short], &tall);
        assert_eq!(resolved.len(), 2);
        // short -> 70, then tall -> 77; at that point the pair is clear.
        assert_eq!(resolved[1].y, 70.0);
        assert_eq!(resolved[0].y, 77.0);
        assert!(!overlaps(&resolved[0], &resolved[1]));
    }

    #[test]
    fn deep_stack_terminates() {
        let layout: Vec<PlacedItem> = (0..20).map(|i| item(&format!("i{i}"), 0.0, 0.0)).collect();
        let resolved = resolve_layout(&layout, &layout[0].clone());
        assert_eq!(resolved.len(), 20);
    }

    #[test]
    fn resizable_flag_rides_along_untouched() {
        let mut a = item("a", 0.0, 0.0);
        a.resizable = true;
        let b = item("b", 0.0, 50.0);
        let resolved = resolve_layout(&[a.clone(), b], &a);
        assert!(resolved[0].resizable);
        assert!(!resolved[1].resizable);
    }

    #[test]
    fn placed_item_serde_defaults_resizable() {
        let json = r#"{"id":"a","x":1.5,"y":2.5,"w":100,"h":140}"#;
        let item: PlacedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "a");
        assert!(!item.resizable);
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(card_color(0), card_color(16));
        assert_ne!(card_color(0), card_color(1));
    }
}
