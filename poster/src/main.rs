use std::env;
use std::fs;
use std::process::ExitCode;

use poster_core::{BoardDoc, build_poster_svg, encode_rgba_to_png_bytes};

const DEFAULT_SCALE: f64 = 1.0;

struct Options {
    input: String,
    svg_out: Option<String>,
    png_out: Option<String>,
    scale: f64,
}

fn usage() -> &'static str {
    "usage: poster <board.json> [--svg out.svg] [--png out.png] [--scale N]\n\
     Renders a saved bias board as an SVG poster and/or a rasterized PNG."
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut input: Option<String> = None;
    let mut svg_out = None;
    let mut png_out = None;
    let mut scale = DEFAULT_SCALE;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--svg" => {
                svg_out = Some(it.next().ok_or("--svg needs a path")?.clone());
            }
            "--png" => {
                png_out = Some(it.next().ok_or("--png needs a path")?.clone());
            }
            "--scale" => {
                let v = it.next().ok_or("--scale needs a number")?;
                scale = v
                    .parse::<f64>()
                    .map_err(|_| format!("bad --scale value: {v}"))?;
                if !(scale > 0.0) {
                    return Err(format!("--scale must be positive, got {v}"));
                }
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown flag: {other}"));
            }
            other => {
                if input.replace(other.to_string()).is_some() {
                    return Err("only one input file is accepted".to_string());
                }
            }
        }
    }
    let input = input.ok_or("missing input board JSON")?;
    let mut opts = Options {
        input,
        svg_out,
        png_out,
        scale,
    };
    // No explicit outputs: write a PNG next to nothing in particular,
    // matching what the export button produces in the editor.
    if opts.svg_out.is_none() && opts.png_out.is_none() {
        opts.png_out = Some("board_poster.png".to_string());
    }
    Ok(opts)
}

fn rasterize_svg(svg: &str, w_px: u32, h_px: u32) -> Result<Vec<u8>, String> {
    let mut opt = usvg::Options::default();
    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    opt.fontdb = std::sync::Arc::new(fontdb);
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| format!("SVG parse error: {e:?}"))?;
    let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).ok_or("pixmap alloc failed")?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    encode_rgba_to_png_bytes(w_px, h_px, pixmap.data()).map_err(|e| format!("encode: {e}"))
}

fn run(opts: &Options) -> Result<(), String> {
    let text = fs::read_to_string(&opts.input)
        .map_err(|e| format!("read {}: {e}", opts.input))?;
    let doc: BoardDoc =
        serde_json::from_str(&text).map_err(|e| format!("parse {}: {e}", opts.input))?;

    let (svg, w_px, h_px) = build_poster_svg(&doc, opts.scale);
    if let Some(path) = &opts.svg_out {
        fs::write(path, &svg).map_err(|e| format!("write {path}: {e}"))?;
        eprintln!("wrote {path} ({w_px}x{h_px})");
    }
    if let Some(path) = &opts.png_out {
        let bytes = rasterize_svg(&svg, w_px, h_px)?;
        fs::write(path, &bytes).map_err(|e| format!("write {path}: {e}"))?;
        eprintln!("wrote {path} ({w_px}x{h_px})");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}\n{}", usage());
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = run(&opts) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_png_output() {
        let opts = parse_args(&argv(&["board.json"])).unwrap();
        assert_eq!(opts.input, "board.json");
        assert_eq!(opts.png_out.as_deref(), Some("board_poster.png"));
        assert!(opts.svg_out.is_none());
        assert_eq!(opts.scale, DEFAULT_SCALE);
    }

    #[test]
    fn parses_explicit_outputs_and_scale() {
        let opts = parse_args(&argv(&[
            "b.json", "--svg", "p.svg", "--png", "p.png", "--scale", "2.5",
        ]))
        .unwrap();
        assert_eq!(opts.svg_out.as_deref(), Some("p.svg"));
        assert_eq!(opts.png_out.as_deref(), Some("p.png"));
        assert_eq!(opts.scale, 2.5);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&argv(&[])).is_err());
        assert!(parse_args(&argv(&["a.json", "b.json"])).is_err());
        assert!(parse_args(&argv(&["a.json", "--scale", "-1"])).is_err());
        assert!(parse_args(&argv(&["a.json", "--wat"])).is_err());
    }
}
