use grid_core::{CANVAS_SIZE, PlacedItem, card_color};
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use serde::{Deserialize, Serialize};

/// Theme shown on a board: the title banner plus the four axis captions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Theme {
    pub title: String,
    #[serde(default)]
    pub axis_top: String,
    #[serde(default)]
    pub axis_bottom: String,
    #[serde(default)]
    pub axis_left: String,
    #[serde(default)]
    pub axis_right: String,
}

/// The visual card joined to a placement by id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CardInfo {
    pub id: String,
    pub title: String,
    pub year: Option<u32>,
    // Kept for round-tripping saved boards; the poster draws palette
    // rectangles, not remote images.
    pub image_url: Option<String>,
}

/// A complete saved board: theme, card catalog and current placements.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BoardDoc {
    pub theme: Theme,
    #[serde(default)]
    pub cards: Vec<CardInfo>,
    #[serde(default)]
    pub layout: Vec<PlacedItem>,
}

impl BoardDoc {
    /// Stable palette index for a card id: its position in the catalog.
    pub fn card_index(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    pub fn card_title(&self, id: &str) -> &str {
        self.cards
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.title.as_str())
            .unwrap_or("")
    }
}

const GRID_STEP: f64 = 50.0;
const HEADER_UNITS: f64 = 60.0;
const AXIS_INSET: f64 = 14.0;

/// Render a board as an SVG poster. Output is deterministic for
/// identical input: same element order, same fixed-precision
/// coordinates. Returns (svg text, width px, height px).
pub fn build_poster_svg(doc: &BoardDoc, px_per_unit: f64) -> (String, u32, u32) {
    let w_px = (CANVAS_SIZE * px_per_unit).ceil() as u32;
    let h_px = ((CANVAS_SIZE + HEADER_UNITS) * px_per_unit).ceil() as u32;
    let px = |v: f64| v * px_per_unit;
    // Board space starts below the title header.
    let bx = |x: f64| px(x);
    let by = |y: f64| px(y + HEADER_UNITS);

    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-family=\"sans-serif\">\n",
        w_px, h_px, w_px, h_px
    ));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#111827\"/>\n");

    // Title header
    s.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" fill=\"#e5e7eb\" font-size=\"{:.2}\" font-weight=\"bold\">{}</text>\n",
        px(20.0),
        px(HEADER_UNITS * 0.65),
        px(28.0),
        svg_escape(&doc.theme.title)
    ));

    // Background grid
    let mut t = GRID_STEP;
    while t < CANVAS_SIZE {
        s.push_str(&format!(
            "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"#374151\" stroke-width=\"1\"/>\n",
            bx(t),
            by(0.0),
            bx(t),
            by(CANVAS_SIZE)
        ));
        s.push_str(&format!(
            "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"#374151\" stroke-width=\"1\"/>\n",
            bx(0.0),
            by(t),
            bx(CANVAS_SIZE),
            by(t)
        ));
        t += GRID_STEP;
    }

    // Center axis lines
    let mid = CANVAS_SIZE / 2.0;
    s.push_str(&format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"#6b7280\" stroke-width=\"2\"/>\n",
        bx(mid),
        by(0.0),
        bx(mid),
        by(CANVAS_SIZE)
    ));
    s.push_str(&format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"#6b7280\" stroke-width=\"2\"/>\n",
        bx(0.0),
        by(mid),
        bx(CANVAS_SIZE),
        by(mid)
    ));

    // Axis captions at the four edges
    let caption = |s: &mut String, x: f64, y: f64, anchor: &str, text: &str| {
        if text.is_empty() {
            return;
        }
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"{}\" fill=\"#9ca3af\" font-size=\"{:.2}\">{}</text>\n",
            x,
            y,
            anchor,
            px(18.0),
            svg_escape(text)
        ));
    };
    caption(&mut s, bx(mid), by(AXIS_INSET + 6.0), "middle", &doc.theme.axis_top);
    caption(
        &mut s,
        bx(mid),
        by(CANVAS_SIZE - AXIS_INSET),
        "middle",
        &doc.theme.axis_bottom,
    );
    caption(&mut s, bx(AXIS_INSET), by(mid - 8.0), "start", &doc.theme.axis_left);
    caption(
        &mut s,
        bx(CANVAS_SIZE - AXIS_INSET),
        by(mid - 8.0),
        "end",
        &doc.theme.axis_right,
    );

    // Cards, in layout order; palette keyed by catalog index so the
    // poster matches the live canvas colors.
    for item in &doc.layout {
        let color = card_color(doc.card_index(&item.id).unwrap_or(0));
        s.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" fill-opacity=\"0.85\" stroke=\"#1f2937\" stroke-width=\"2\"/>\n",
            bx(item.x),
            by(item.y),
            px(item.w),
            px(item.h),
            color
        ));
        let title = doc.card_title(&item.id);
        if !title.is_empty() {
            s.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" fill=\"#f9fafb\" font-size=\"{:.2}\">{}</text>\n",
                bx(item.x + item.w / 2.0),
                by(item.y + item.h / 2.0),
                px(15.0),
                svg_escape(title)
            ));
        }
    }

    s.push_str("</svg>\n");
    (s, w_px, h_px)
}

/// Shared PNG encoder: RGBA -> PNG bytes. Filter and compression are
/// pinned so identical pixels always produce identical files.
pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, width, height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        enc.set_filter(FilterType::NoFilter);
        enc.set_compression(Compression::Default);
        let mut writer = enc.write_header()?;
        writer.write_image_data(rgba)?;
    }
    Ok(buf)
}

pub fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> BoardDoc {
        BoardDoc {
            theme: Theme {
                title: "Q4 2024 <bias>".to_string(),
                axis_top: "story heavy".to_string(),
                axis_bottom: "story light".to_string(),
                axis_left: "romance low".to_string(),
                axis_right: "romance high".to_string(),
            },
            cards: vec![
                CardInfo {
                    id: "c1".to_string(),
                    title: "Frieren".to_string(),
                    year: Some(2024),
                    image_url: None,
                },
                CardInfo {
                    id: "c2".to_string(),
                    title: "Dungeon Meshi".to_string(),
                    year: Some(2024),
                    image_url: None,
                },
            ],
            layout: vec![
                PlacedItem::new("c1", 100.0, 200.0, 120.0, 170.0),
                PlacedItem::new("c2", 400.0, 500.0, 120.0, 170.0),
            ],
        }
    }

    #[test]
    fn escapes_markup_in_titles() {
        assert_eq!(svg_escape("a<b & c>d"), "a&lt;b &amp; c&gt;d");
    }

    #[test]
    fn poster_dimensions_follow_scale() {
        let (svg, w, h) = build_poster_svg(&sample_doc(), 1.0);
        assert_eq!(w, 1000);
        assert_eq!(h, 1060);
        assert!(svg.contains("width=\"1000\""));
    }

    #[test]
    fn card_rects_land_at_scaled_positions() {
        let (svg, _, _) = build_poster_svg(&sample_doc(), 2.0);
        // c1 at (100, 200), header offset 60 units, scale 2.
        assert!(svg.contains("<rect x=\"200.00\" y=\"520.00\" width=\"240.00\" height=\"340.00\""));
        assert!(svg.contains(">Frieren</text>"));
        assert!(svg.contains("Q4 2024 &lt;bias&gt;"));
    }

    #[test]
    fn poster_output_is_deterministic() {
        let doc = sample_doc();
        assert_eq!(build_poster_svg(&doc, 1.5), build_poster_svg(&doc, 1.5));
    }

    #[test]
    fn png_encoder_emits_png_signature() {
        let rgba = vec![255u8; 4 * 4];
        let bytes = encode_rgba_to_png_bytes(2, 2, &rgba).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn board_doc_round_trips_without_layout() {
        let doc: BoardDoc =
            serde_json::from_str(r#"{"theme":{"title":"t"},"cards":[]}"#).unwrap();
        assert!(doc.layout.is_empty());
        assert_eq!(doc.theme.title, "t");
    }
}
