//! Canvas interaction: routing egui input to the editor, the inline text
//! field, the context menu and the minimap.
//!
//! The editor works in canvas-local pixels, so every window position is
//! shifted by the canvas origin before it is handed over.

use super::rendering::paint_render_list;
use super::state::TopologyApp;
use crate::constants;
use crate::editor::ToolMode;
use crate::hit_test::{Hit, TextMetrics};
use crate::render::{self, MinimapProjection, RenderOptions};
use crate::types::NodeKind;
use eframe::egui;

/// Text measurement backed by egui's loaded fonts.
pub struct EguiTextMetrics {
    ctx: egui::Context,
}

impl EguiTextMetrics {
    /// Measures with the fonts loaded in `ctx`.
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl TextMetrics for EguiTextMetrics {
    fn measure(&self, text: &str, font_size: f32) -> egui::Vec2 {
        let galley = self.ctx.fonts_mut(|f| {
            f.layout_no_wrap(
                text.to_owned(),
                egui::FontId::proportional(font_size),
                egui::Color32::BLACK,
            )
        });
        egui::vec2(galley.size().x, font_size)
    }
}

impl TopologyApp {
    /// Renders the canvas and feeds it the frame's pointer input.
    pub(super) fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let canvas_rect = response.rect;
        self.canvas_origin = canvas_rect.min;
        self.editor.set_canvas_size(canvas_rect.size());

        self.handle_canvas_input(ui, &response);
        self.handle_toolbox_drop(&response);

        if response.contains_pointer() {
            ui.ctx().set_cursor_icon(self.editor.tool().cursor());
        }

        let options = RenderOptions::screen(self.settings.dark_mode, self.settings.show_grid);
        let list = render::render_scene(&self.editor, &options);
        paint_render_list(&painter.with_clip_rect(canvas_rect), canvas_rect.min, &list);

        self.draw_text_overlay(ui.ctx());
        self.draw_context_menu(ui.ctx());
        if self.settings.show_minimap {
            self.draw_minimap(ui.ctx(), canvas_rect);
        }
    }

    fn handle_canvas_input(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let origin = self.canvas_origin.to_vec2();
        let over_canvas = response.contains_pointer();
        let events = ui.input(|i| i.events.clone());

        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => self.editor.pointer_move(pos - origin),
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed: true,
                    ..
                } if over_canvas && response.rect.contains(pos) => {
                    self.editor.pointer_down(pos - origin, button);
                }
                egui::Event::PointerButton { pressed: false, .. } => self.editor.pointer_up(),
                _ => {}
            }
        }

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.editor.double_click(pos - origin);
            }
        }

        if over_canvas {
            let (scroll, hover) = ui.input(|i| (i.raw_scroll_delta.y, i.pointer.hover_pos()));
            if let Some(pos) = hover {
                self.editor.wheel(pos - origin, scroll);
            }
        }
    }

    /// Adds a node where a device dragged from the toolbox is released.
    fn handle_toolbox_drop(&mut self, response: &egui::Response) {
        if let Some(kind) = response.dnd_release_payload::<NodeKind>() {
            if let Some(pos) = response.hover_pos() {
                let scene = self.editor.screen_to_scene(pos - self.canvas_origin.to_vec2());
                self.editor.add_node(*kind, scene);
            }
        }
    }

    /// Places a single-line text field over the label being edited.
    fn draw_text_overlay(&mut self, ctx: &egui::Context) {
        let Some(overlay) = self.editor.text_overlay() else {
            self.text_field.focused = None;
            return;
        };
        let rect = overlay.rect.translate(self.canvas_origin.to_vec2());
        let field_id = egui::Id::new(("label_editor", overlay.label));
        let placeholder = self.editor.config().default_label_text.clone();

        let area = egui::Area::new(egui::Id::new("label_editor_area"))
            .fixed_pos(rect.min)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let Some(buffer) = self.editor.edit_buffer_mut() else {
                    return None;
                };
                let edit = egui::TextEdit::singleline(buffer)
                    .id(field_id)
                    .font(egui::FontId::proportional(overlay.font_size.max(6.0)))
                    .hint_text(placeholder)
                    .horizontal_align(egui::Align::Center)
                    .desired_width(rect.width().max(40.0));
                Some(ui.add(edit))
            });
        let Some(response) = area.inner else {
            return;
        };

        if self.text_field.focused != Some(overlay.label) {
            response.request_focus();
            self.text_field.focused = Some(overlay.label);
            let len = self.editor.text_edit().map_or(0, |s| s.buffer.chars().count());
            select_all_text_in_field(ctx, field_id, len);
        }

        if response.lost_focus() {
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.editor.cancel_text_edit();
            } else {
                self.editor.commit_text_edit();
            }
            self.text_field.focused = None;
        }
    }

    fn draw_context_menu(&mut self, ctx: &egui::Context) {
        let Some(menu) = self.editor.context_menu().copied() else {
            return;
        };
        let pos = menu.screen_pos + self.canvas_origin.to_vec2();

        egui::Area::new(egui::Id::new("context_menu"))
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(120.0);
                    match menu.target {
                        Hit::Node(id) => {
                            if ui.button("Edit properties").clicked() {
                                self.editor.open_property_panel();
                                self.editor.close_context_menu();
                            }
                            if ui.button("Duplicate").clicked() {
                                self.editor.duplicate_node(id);
                                self.editor.close_context_menu();
                            }
                            if ui.button("Start link").clicked() {
                                self.editor.set_tool(ToolMode::Link);
                                let scene = self.editor.topology().node(id).map(|n| n.pos());
                                if let Some(scene) = scene {
                                    let screen = self.editor.scene_to_screen(scene);
                                    self.editor.pointer_down(screen, egui::PointerButton::Primary);
                                    self.editor.pointer_up();
                                }
                            }
                        }
                        Hit::Edge(_) => {
                            if ui.button("Edit properties").clicked() {
                                self.editor.open_property_panel();
                                self.editor.close_context_menu();
                            }
                        }
                        Hit::Label(id) => {
                            if ui.button("Edit text").clicked() {
                                self.editor.close_context_menu();
                                if let Err(err) = self.editor.begin_text_edit(id) {
                                    log::warn!("cannot edit label: {err}");
                                }
                            }
                            if ui.button("Style").clicked() {
                                self.editor.open_property_panel();
                                self.editor.close_context_menu();
                            }
                        }
                    }
                    ui.separator();
                    if ui.button("Delete").clicked() {
                        self.editor.request_delete_selection();
                    }
                });
            });
    }

    /// Overview in the canvas' bottom-right corner; clicking it recenters the view.
    fn draw_minimap(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        let size = egui::vec2(constants::MINIMAP_WIDTH, constants::MINIMAP_HEIGHT);
        let pos = canvas_rect.max - size - egui::vec2(12.0, 12.0);
        let list = render::render_minimap(&self.editor, size, self.settings.dark_mode);
        let projection = MinimapProjection::fit(&self.editor, size);

        egui::Area::new(egui::Id::new("minimap"))
            .fixed_pos(pos)
            .order(egui::Order::Middle)
            .show(ctx, |ui| {
                let (response, painter) = ui.allocate_painter(size, egui::Sense::click_and_drag());
                paint_render_list(&painter, response.rect.min, &list);
                if response.clicked() || response.dragged() {
                    if let Some(at) = response.interact_pointer_pos() {
                        let scene = projection.to_scene(at - response.rect.min.to_vec2());
                        self.editor.center_view_on(scene);
                    }
                }
            });
    }
}

/// Selects all text in a text edit field using egui's internal state.
fn select_all_text_in_field(ctx: &egui::Context, field_id: egui::Id, len: usize) {
    ctx.memory_mut(|mem| {
        let state = mem
            .data
            .get_temp_mut_or_default::<egui::text_edit::TextEditState>(field_id);
        state
            .cursor
            .set_char_range(Some(egui::text::CCursorRange::two(
                egui::text::CCursor::new(0),
                egui::text::CCursor::new(len),
            )));
    });
}
