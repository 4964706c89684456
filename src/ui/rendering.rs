//! Painting of render lists onto an egui painter.
//!
//! Render lists are in canvas-local pixels; `origin` is where the canvas
//! starts in the window.

use crate::render::{DrawCommand, RenderList};
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Paints every command of `list`, offset by `origin`.
pub fn paint_render_list(painter: &egui::Painter, origin: egui::Pos2, list: &RenderList) {
    let offset = origin.to_vec2();
    for command in &list.commands {
        match command {
            DrawCommand::Rect {
                rect,
                corner_radius,
                fill,
                stroke,
            } => {
                let rect = rect.translate(offset);
                painter.rect_filled(rect, *corner_radius, *fill);
                if let Some(stroke) = stroke {
                    painter.rect_stroke(rect, *corner_radius, *stroke, StrokeKind::Inside);
                }
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                painter.circle(
                    *center + offset,
                    *radius,
                    *fill,
                    stroke.unwrap_or(egui::Stroke::NONE),
                );
            }
            DrawCommand::Line {
                from,
                to,
                stroke,
                dashed,
            } => {
                let points = [*from + offset, *to + offset];
                if *dashed {
                    painter.extend(egui::Shape::dashed_line(
                        &points,
                        *stroke,
                        stroke.width * 3.0,
                        stroke.width * 2.0,
                    ));
                } else {
                    painter.line_segment(points, *stroke);
                }
            }
            DrawCommand::Text {
                pos,
                text,
                size,
                color,
                anchor,
            } => {
                // unreadable below one pixel
                if *size < 1.0 {
                    continue;
                }
                painter.text(
                    *pos + offset,
                    *anchor,
                    text,
                    egui::FontId::proportional(*size),
                    *color,
                );
            }
        }
    }
}
