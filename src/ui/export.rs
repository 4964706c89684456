//! Export utilities: turn a [`RenderList`] into SVG markup and PNG bytes.
//!
//! The PNG path goes through the SVG: usvg parses it with the system fonts,
//! resvg rasterizes it into a tiny-skia pixmap.

use crate::error::{Result, TopologyError};
use crate::render::{DrawCommand, RenderList};
use eframe::egui::{self, Color32};
use std::fmt::Write as _;
use std::sync::Arc;

/// Writes the commands as a standalone SVG document of the list's size.
pub fn render_list_to_svg(list: &RenderList) -> String {
    let width = list.size.x.round().max(1.0) as u32;
    let height = list.size.y.round().max(1.0) as u32;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );

    for command in &list.commands {
        match command {
            DrawCommand::Rect {
                rect,
                corner_radius,
                fill,
                stroke,
            } => {
                let _ = writeln!(
                    out,
                    "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"{:.1}\" {} {}/>",
                    rect.min.x,
                    rect.min.y,
                    rect.width(),
                    rect.height(),
                    corner_radius,
                    paint_attr("fill", *fill),
                    stroke_attrs(stroke.as_ref()),
                );
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let _ = writeln!(
                    out,
                    "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" {} {}/>",
                    center.x,
                    center.y,
                    radius,
                    paint_attr("fill", *fill),
                    stroke_attrs(stroke.as_ref()),
                );
            }
            DrawCommand::Line {
                from,
                to,
                stroke,
                dashed,
            } => {
                let dash = if *dashed {
                    format!(
                        " stroke-dasharray=\"{:.1} {:.1}\"",
                        stroke.width * 3.0,
                        stroke.width * 2.0
                    )
                } else {
                    String::new()
                };
                let _ = writeln!(
                    out,
                    "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" {}{dash}/>",
                    from.x,
                    from.y,
                    to.x,
                    to.y,
                    stroke_attrs(Some(stroke)),
                );
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                color,
                anchor,
            } => {
                let text_anchor = match anchor.x() {
                    egui::Align::Min => "start",
                    egui::Align::Center => "middle",
                    egui::Align::Max => "end",
                };
                let baseline = match anchor.y() {
                    egui::Align::Min => "hanging",
                    egui::Align::Center => "central",
                    egui::Align::Max => "alphabetic",
                };
                let _ = writeln!(
                    out,
                    "<text x=\"{:.1}\" y=\"{:.1}\" font-family=\"sans-serif\" font-size=\"{:.1}\" {} text-anchor=\"{text_anchor}\" dominant-baseline=\"{baseline}\">{}</text>",
                    pos.x,
                    pos.y,
                    size,
                    paint_attr("fill", *color),
                    escape_xml(text),
                );
            }
        }
    }

    let _ = writeln!(out, "</svg>");
    out
}

/// Rasterizes SVG markup to PNG bytes, scaled by `scale`.
pub fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    opt.fontdb = Arc::new(db);

    let tree = usvg::Tree::from_data(svg.as_bytes(), &opt)
        .map_err(|e| TopologyError::Render(format!("failed to parse SVG: {e}")))?;

    let scale = scale.clamp(0.25, 8.0);
    let size = tree.size();
    let out_w = (size.width() * scale).round().max(1.0) as u32;
    let out_h = (size.height() * scale).round().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(out_w, out_h)
        .ok_or_else(|| TopologyError::Render(format!("cannot allocate {out_w}x{out_h} pixmap")))?;

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| TopologyError::Render(format!("failed to encode PNG: {e}")))
}

fn paint_attr(name: &str, color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 0 {
        return format!("{name}=\"none\"");
    }
    if a == 255 {
        format!("{name}=\"#{r:02x}{g:02x}{b:02x}\"")
    } else {
        format!(
            "{name}=\"#{r:02x}{g:02x}{b:02x}\" {name}-opacity=\"{:.3}\"",
            a as f32 / 255.0
        )
    }
}

fn stroke_attrs(stroke: Option<&egui::Stroke>) -> String {
    match stroke {
        Some(stroke) if stroke.width > 0.0 => format!(
            "{} stroke-width=\"{:.1}\"",
            paint_attr("stroke", stroke.color),
            stroke.width
        ),
        _ => "stroke=\"none\"".to_string(),
    }
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2, Stroke};

    fn sample() -> RenderList {
        let mut list = RenderList::new(vec2(120.0, 80.0));
        list.push(DrawCommand::Rect {
            rect: egui::Rect::from_min_size(pos2(0.0, 0.0), vec2(120.0, 80.0)),
            corner_radius: 0.0,
            fill: Color32::WHITE,
            stroke: None,
        });
        list.push(DrawCommand::Line {
            from: pos2(10.0, 10.0),
            to: pos2(110.0, 70.0),
            stroke: Stroke::new(2.0, Color32::from_rgb(255, 0, 0)),
            dashed: true,
        });
        list.push(DrawCommand::Circle {
            center: pos2(60.0, 40.0),
            radius: 20.0,
            fill: Color32::TRANSPARENT,
            stroke: Some(Stroke::new(1.0, Color32::BLACK)),
        });
        list.push(DrawCommand::Text {
            pos: pos2(60.0, 40.0),
            text: "R&D <core>".into(),
            size: 12.0,
            color: Color32::BLACK,
            anchor: egui::Align2::CENTER_CENTER,
        });
        list
    }

    #[test]
    fn test_svg_contains_every_primitive() {
        let svg = render_list_to_svg(&sample());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("width=\"120\" height=\"80\""));
        assert!(svg.contains("<rect"));
        assert!(svg.contains("stroke-dasharray=\"6.0 4.0\""));
        assert!(svg.contains("<circle cx=\"60.0\" cy=\"40.0\" r=\"20.0\" fill=\"none\""));
        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("R&amp;D &lt;core&gt;"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_translucent_colors_get_opacity() {
        let color = Color32::from_rgba_unmultiplied(0, 0, 0, 51);
        assert_eq!(paint_attr("fill", color), "fill=\"#000000\" fill-opacity=\"0.200\"");
        assert_eq!(paint_attr("fill", Color32::WHITE), "fill=\"#ffffff\"");
    }

    #[test]
    fn test_png_has_scaled_dimensions() {
        let svg = render_list_to_svg(&sample());
        let png = svg_to_png(&svg, 2.0).unwrap();
        let pixmap = tiny_skia::Pixmap::decode_png(&png).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (240, 160));
    }

    #[test]
    fn test_invalid_svg_is_a_render_error() {
        assert!(matches!(
            svg_to_png("<not-svg", 1.0),
            Err(TopologyError::Render(_))
        ));
    }
}
