//! Backend-neutral render model.
//!
//! The scene is turned into a flat list of screen-space [`DrawCommand`]s, in
//! paint order. The egui canvas and the SVG/PNG exporter both consume the
//! same list, so what gets exported is exactly what is on screen.
//!
//! Layers, back to front: background, grid, edges, link preview, nodes, labels.

use crate::constants;
use crate::editor::{DragTarget, Selection, TopologyEditor};
use eframe::egui::{self, Color32, Stroke};

/// Highlight used for selection rings, halos and the link preview.
pub const SELECTION_COLOR: Color32 = Color32::from_rgb(0, 123, 255);

/// One primitive in screen pixels relative to the canvas origin.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled rectangle with an optional border
    Rect {
        /// Bounds
        rect: egui::Rect,
        /// Corner rounding in pixels
        corner_radius: f32,
        /// Fill color
        fill: Color32,
        /// Border, if any
        stroke: Option<Stroke>,
    },
    /// Filled circle with an optional border
    Circle {
        /// Center point
        center: egui::Pos2,
        /// Radius in pixels
        radius: f32,
        /// Fill color
        fill: Color32,
        /// Border, if any
        stroke: Option<Stroke>,
    },
    /// Straight segment
    Line {
        /// Start point
        from: egui::Pos2,
        /// End point
        to: egui::Pos2,
        /// Line stroke
        stroke: Stroke,
        /// Drawn with dashes
        dashed: bool,
    },
    /// Single line of text
    Text {
        /// Anchor point
        pos: egui::Pos2,
        /// Text
        text: String,
        /// Font size in pixels
        size: f32,
        /// Text color
        color: Color32,
        /// Which part of the text sits on `pos`
        anchor: egui::Align2,
    },
}

/// Paint-ordered commands for a surface of `size` pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderList {
    /// Surface size in pixels
    pub size: egui::Vec2,
    /// Commands, back to front
    pub commands: Vec<DrawCommand>,
}

impl RenderList {
    /// An empty list for a surface of `size` pixels.
    pub fn new(size: egui::Vec2) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Appends a command on top of the previous ones.
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing has been pushed.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// What to include when rendering the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Draw the background grid
    pub show_grid: bool,
    /// Canvas fill, `None` leaves it transparent
    pub background: Option<Color32>,
    /// Selection highlights, drag shadow and link preview
    pub show_interaction: bool,
    /// Color of node names and addresses
    pub text_color: Color32,
    /// Grid line color
    pub grid_color: Color32,
}

impl RenderOptions {
    /// Options for the live canvas.
    pub fn screen(dark_mode: bool, show_grid: bool) -> Self {
        if dark_mode {
            Self {
                show_grid,
                background: Some(Color32::from_rgb(30, 32, 36)),
                show_interaction: true,
                text_color: Color32::from_gray(220),
                grid_color: Color32::from_rgba_unmultiplied(255, 255, 255, 18),
            }
        } else {
            Self {
                show_grid,
                background: Some(Color32::from_rgb(248, 249, 250)),
                show_interaction: true,
                text_color: Color32::from_rgb(51, 51, 51),
                grid_color: Color32::from_rgba_unmultiplied(0, 0, 0, 22),
            }
        }
    }

    /// Options for image export: no interaction feedback.
    pub fn export(include_background: bool, show_grid: bool) -> Self {
        Self {
            background: include_background.then_some(Color32::WHITE),
            show_interaction: false,
            ..Self::screen(false, show_grid)
        }
    }
}

/// Renders the editor's scene at its current canvas size and viewport.
pub fn render_scene(editor: &TopologyEditor, options: &RenderOptions) -> RenderList {
    let mut list = RenderList::new(editor.canvas_size());
    let zoom = editor.viewport().zoom();
    let topology = editor.topology();
    let selection = if options.show_interaction {
        editor.selection()
    } else {
        Selection::None
    };

    if let Some(background) = options.background {
        list.push(DrawCommand::Rect {
            rect: egui::Rect::from_min_size(egui::Pos2::ZERO, list.size),
            corner_radius: 0.0,
            fill: background,
            stroke: None,
        });
    }

    if options.show_grid {
        push_grid(&mut list, editor, options.grid_color);
    }

    for edge in &topology.connections {
        let (Some(from), Some(to)) = (
            topology.node(edge.from_node_id),
            topology.node(edge.to_node_id),
        ) else {
            continue;
        };
        let from = editor.scene_to_screen(from.pos());
        let to = editor.scene_to_screen(to.pos());
        let color = edge.kind.color();
        let selected = selection == Selection::Edge(edge.id);
        if selected {
            list.push(DrawCommand::Line {
                from,
                to,
                stroke: Stroke::new(10.0 * zoom, SELECTION_COLOR.gamma_multiply(0.25)),
                dashed: false,
            });
        }
        let width = if selected { 4.0 } else { 2.0 };
        list.push(DrawCommand::Line {
            from,
            to,
            stroke: Stroke::new(width * zoom, if selected { SELECTION_COLOR } else { color }),
            dashed: edge.kind.is_dashed(),
        });
        for end in [from, to] {
            list.push(DrawCommand::Circle {
                center: end,
                radius: constants::ENDPOINT_RADIUS * zoom,
                fill: color,
                stroke: None,
            });
        }
    }

    if options.show_interaction {
        if let Some(draft) = editor.link_draft() {
            if let Some(source) = topology.node(draft.source) {
                list.push(DrawCommand::Line {
                    from: editor.scene_to_screen(source.pos()),
                    to: editor.scene_to_screen(draft.cursor),
                    stroke: Stroke::new(2.0 * zoom, SELECTION_COLOR),
                    dashed: true,
                });
            }
        }
    }

    let dragging = if options.show_interaction {
        editor.dragging()
    } else {
        None
    };
    for node in &topology.devices {
        let center = editor.scene_to_screen(node.pos());
        let radius = editor.config().node_radius * zoom;

        if dragging == Some(DragTarget::Node(node.id)) {
            list.push(DrawCommand::Circle {
                center: center + egui::vec2(3.0, 3.0) * zoom,
                radius,
                fill: Color32::from_black_alpha(60),
                stroke: None,
            });
        }
        list.push(DrawCommand::Circle {
            center,
            radius,
            fill: node.kind.color(),
            stroke: Some(Stroke::new(2.0 * zoom, Color32::WHITE)),
        });
        if selection == Selection::Node(node.id) {
            list.push(DrawCommand::Circle {
                center,
                radius: radius + 4.0 * zoom,
                fill: Color32::TRANSPARENT,
                stroke: Some(Stroke::new(3.0 * zoom, SELECTION_COLOR)),
            });
        }
        list.push(DrawCommand::Text {
            pos: center,
            text: node.kind.glyph().to_string(),
            size: 14.0 * zoom,
            color: Color32::WHITE,
            anchor: egui::Align2::CENTER_CENTER,
        });
        let below = center + egui::vec2(0.0, radius + 6.0 * zoom);
        list.push(DrawCommand::Text {
            pos: below,
            text: node.label.clone(),
            size: 12.0 * zoom,
            color: options.text_color,
            anchor: egui::Align2::CENTER_TOP,
        });
        if !node.address.is_empty() {
            list.push(DrawCommand::Text {
                pos: below + egui::vec2(0.0, 15.0 * zoom),
                text: node.address.clone(),
                size: 10.0 * zoom,
                color: options.text_color.gamma_multiply(0.7),
                anchor: egui::Align2::CENTER_TOP,
            });
        }
        list.push(DrawCommand::Circle {
            center: center + egui::vec2(radius, -radius) * std::f32::consts::FRAC_1_SQRT_2,
            radius: constants::STATUS_DOT_RADIUS * zoom,
            fill: node.status.color(),
            stroke: Some(Stroke::new(1.5 * zoom, Color32::WHITE)),
        });
    }

    for label in &topology.text_labels {
        let Some(rect) = editor.label_screen_rect(label.id) else {
            continue;
        };
        let highlighted = options.show_interaction
            && (label.is_editing || selection == Selection::Label(label.id));
        let border = if highlighted {
            Stroke::new(2.0 * zoom, SELECTION_COLOR)
        } else {
            Stroke::new(1.0 * zoom, Color32::from_gray(200))
        };
        list.push(DrawCommand::Rect {
            rect,
            corner_radius: 4.0 * zoom,
            fill: label.background_color.0,
            stroke: Some(border),
        });
        // The inline editor draws the text while it is open.
        if !label.is_editing {
            list.push(DrawCommand::Text {
                pos: rect.center(),
                text: label.text.clone(),
                size: label.font_size * zoom,
                color: label.color.0,
                anchor: egui::Align2::CENTER_CENTER,
            });
        }
    }

    list
}

fn push_grid(list: &mut RenderList, editor: &TopologyEditor, color: Color32) {
    let grid = constants::GRID_SIZE;
    if grid * editor.viewport().zoom() < constants::MIN_GRID_SCREEN_SPACING {
        return;
    }
    let visible = editor.viewport().visible_scene_rect(list.size);
    let stroke = Stroke::new(1.0, color);

    let mut x = (visible.min.x / grid).floor() * grid;
    while x <= visible.max.x {
        let sx = editor.scene_to_screen(egui::pos2(x, 0.0)).x;
        list.push(DrawCommand::Line {
            from: egui::pos2(sx, 0.0),
            to: egui::pos2(sx, list.size.y),
            stroke,
            dashed: false,
        });
        x += grid;
    }
    let mut y = (visible.min.y / grid).floor() * grid;
    while y <= visible.max.y {
        let sy = editor.scene_to_screen(egui::pos2(0.0, y)).y;
        list.push(DrawCommand::Line {
            from: egui::pos2(0.0, sy),
            to: egui::pos2(list.size.x, sy),
            stroke,
            dashed: false,
        });
        y += grid;
    }
}

/// Maps between scene coordinates and a fixed-size overview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjection {
    /// Scene area shown, centered in the minimap
    pub bounds: egui::Rect,
    /// Minimap pixels per scene unit
    pub scale: f32,
    /// Minimap size in pixels
    pub size: egui::Vec2,
}

impl MinimapProjection {
    /// Fits every node and the visible part of the scene into `size`.
    pub fn fit(editor: &TopologyEditor, size: egui::Vec2) -> Self {
        let radius = editor.config().node_radius;
        let bounds = editor
            .topology()
            .devices
            .iter()
            .fold(
                editor.viewport().visible_scene_rect(editor.canvas_size()),
                |acc, node| acc.union(egui::Rect::from_center_size(node.pos(), egui::Vec2::splat(2.0 * radius))),
            );
        let scale = (size.x / bounds.width().max(1.0)).min(size.y / bounds.height().max(1.0)) * 0.9;
        Self {
            bounds,
            scale,
            size,
        }
    }

    /// Scene position to minimap pixels.
    pub fn to_minimap(&self, scene: egui::Pos2) -> egui::Pos2 {
        (self.size / 2.0).to_pos2() + (scene - self.bounds.center()) * self.scale
    }

    /// Minimap pixels to scene position.
    pub fn to_scene(&self, minimap: egui::Pos2) -> egui::Pos2 {
        self.bounds.center() + (minimap - (self.size / 2.0).to_pos2()) / self.scale
    }
}

/// Renders the overview: every node as a dot plus the visible-viewport rectangle.
pub fn render_minimap(editor: &TopologyEditor, size: egui::Vec2, dark_mode: bool) -> RenderList {
    let projection = MinimapProjection::fit(editor, size);
    let mut list = RenderList::new(size);
    let (fill, border) = if dark_mode {
        (Color32::from_rgba_unmultiplied(20, 22, 26, 230), Color32::from_gray(90))
    } else {
        (Color32::from_rgba_unmultiplied(255, 255, 255, 230), Color32::from_gray(190))
    };
    list.push(DrawCommand::Rect {
        rect: egui::Rect::from_min_size(egui::Pos2::ZERO, size),
        corner_radius: 4.0,
        fill,
        stroke: Some(Stroke::new(1.0, border)),
    });

    let radius = (editor.config().node_radius * projection.scale).max(2.0);
    for node in &editor.topology().devices {
        list.push(DrawCommand::Circle {
            center: projection.to_minimap(node.pos()),
            radius,
            fill: node.kind.color(),
            stroke: None,
        });
    }

    let visible = editor.viewport().visible_scene_rect(editor.canvas_size());
    list.push(DrawCommand::Rect {
        rect: egui::Rect::from_min_max(
            projection.to_minimap(visible.min),
            projection.to_minimap(visible.max),
        ),
        corner_radius: 0.0,
        fill: SELECTION_COLOR.gamma_multiply(0.08),
        stroke: Some(Stroke::new(1.5, SELECTION_COLOR)),
    });
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ToolMode;
    use crate::types::{EdgeKind, NodeKind};
    use eframe::egui::{pos2, vec2};

    fn lines(list: &RenderList) -> Vec<(&Stroke, bool)> {
        list.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { stroke, dashed, .. } => Some((stroke, *dashed)),
                _ => None,
            })
            .collect()
    }

    fn texts(list: &RenderList) -> Vec<&str> {
        list.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_scene_without_grid_is_only_background() {
        let editor = TopologyEditor::default();
        let list = render_scene(&editor, &RenderOptions::screen(false, false));
        assert_eq!(list.len(), 1);
        assert!(matches!(list.commands[0], DrawCommand::Rect { .. }));

        let list = render_scene(&editor, &RenderOptions::export(false, false));
        assert!(list.is_empty());
    }

    #[test]
    fn grid_is_skipped_when_too_dense() {
        let mut editor = TopologyEditor::default();
        let with_grid = render_scene(&editor, &RenderOptions::export(false, true));
        // 800x600 canvas, 20 unit spacing: 41 + 31 lines
        assert_eq!(with_grid.len(), 72);

        editor.zoom_at(pos2(0.0, 0.0), 0.1);
        let zoomed_out = render_scene(&editor, &RenderOptions::export(false, true));
        assert!(zoomed_out.is_empty());
    }

    #[test]
    fn wireless_and_vpn_edges_are_dashed() {
        let mut editor = TopologyEditor::default();
        let a = editor.add_node(NodeKind::Router, pos2(100.0, 100.0));
        let b = editor.add_node(NodeKind::Cloud, pos2(300.0, 100.0));
        let c = editor.add_node(NodeKind::Server, pos2(300.0, 300.0));
        editor.add_edge(a, b, EdgeKind::Wireless).unwrap();
        editor.add_edge(a, c, EdgeKind::Ethernet).unwrap();

        let list = render_scene(&editor, &RenderOptions::export(false, false));
        let dashed: Vec<bool> = lines(&list).into_iter().map(|(_, d)| d).collect();
        assert_eq!(dashed, vec![true, false]);
    }

    #[test]
    fn selected_edge_gets_a_halo() {
        let mut editor = TopologyEditor::default();
        let a = editor.add_node(NodeKind::Router, pos2(100.0, 100.0));
        let b = editor.add_node(NodeKind::Switch, pos2(300.0, 100.0));
        editor.add_edge(a, b, EdgeKind::Fiber).unwrap();
        editor.set_tool(ToolMode::Select);
        editor.pointer_down(pos2(200.0, 100.0), egui::PointerButton::Primary);
        editor.pointer_up();

        let list = render_scene(&editor, &RenderOptions::screen(false, false));
        let strokes = lines(&list);
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].0.width, 10.0);
        assert_eq!(strokes[1].0.color, SELECTION_COLOR);

        // exports never show the selection
        let export = render_scene(&editor, &RenderOptions::export(false, false));
        assert_eq!(lines(&export).len(), 1);
    }

    #[test]
    fn node_draws_glyph_label_and_scales_with_zoom() {
        let mut editor = TopologyEditor::default();
        editor.add_node(NodeKind::Database, pos2(100.0, 100.0));
        editor.zoom_at(pos2(0.0, 0.0), 2.0);

        let list = render_scene(&editor, &RenderOptions::export(false, false));
        assert_eq!(texts(&list), vec!["DB", "Database-1"]);
        let body = list
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Circle { center, radius, .. } if *radius > 10.0 => Some((*center, *radius)),
                _ => None,
            })
            .unwrap();
        assert_eq!(body, (pos2(200.0, 200.0), 60.0));
    }

    #[test]
    fn editing_label_draws_box_without_text() {
        let mut editor = TopologyEditor::default();
        let id = editor.add_label(pos2(50.0, 50.0), "uplink");
        let list = render_scene(&editor, &RenderOptions::export(false, false));
        assert_eq!(texts(&list), vec!["uplink"]);

        editor.begin_text_edit(id).unwrap();
        let list = render_scene(&editor, &RenderOptions::screen(false, false));
        assert!(texts(&list).is_empty());
        assert!(list.commands.iter().any(|c| matches!(
            c,
            DrawCommand::Rect { stroke: Some(s), .. } if s.color == SELECTION_COLOR
        )));
    }

    #[test]
    fn link_preview_follows_pointer() {
        let mut editor = TopologyEditor::default();
        editor.add_node(NodeKind::Router, pos2(100.0, 100.0));
        editor.set_tool(ToolMode::Link);
        editor.pointer_down(pos2(100.0, 100.0), egui::PointerButton::Primary);
        editor.pointer_move(pos2(250.0, 180.0));

        let list = render_scene(&editor, &RenderOptions::screen(false, false));
        let preview = list.commands.iter().find_map(|c| match c {
            DrawCommand::Line { from, to, dashed: true, .. } => Some((*from, *to)),
            _ => None,
        });
        assert_eq!(preview, Some((pos2(100.0, 100.0), pos2(250.0, 180.0))));
    }

    #[test]
    fn minimap_fits_nodes_and_viewport() {
        let mut editor = TopologyEditor::default();
        editor.add_node(NodeKind::Router, pos2(-1000.0, 0.0));
        editor.add_node(NodeKind::Router, pos2(2000.0, 1000.0));
        let size = vec2(200.0, 140.0);

        let projection = MinimapProjection::fit(&editor, size);
        let frame = egui::Rect::from_min_size(egui::Pos2::ZERO, size);
        for node in &editor.topology().devices {
            assert!(frame.contains(projection.to_minimap(node.pos())));
        }
        let back = projection.to_scene(projection.to_minimap(pos2(123.0, 45.0)));
        assert!((back - pos2(123.0, 45.0)).length() < 1e-2);

        let list = render_minimap(&editor, size, false);
        // frame, two nodes, viewport rectangle
        assert_eq!(list.len(), 4);
    }
}
