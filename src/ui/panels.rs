//! Side panels: the device toolbox and the property panel.

use super::state::TopologyApp;
use crate::editor::{LabelStyle, NodePatch, Selection};
use crate::types::{EdgeId, EdgeKind, HexColor, LabelId, NodeId, NodeKind, NodeStatus};
use eframe::egui;

const LABEL_FIELD: &str = "panel_node_label";
const ADDRESS_FIELD: &str = "panel_node_address";

/// Colors offered for label text and backgrounds.
const PALETTE: [egui::Color32; 8] = [
    egui::Color32::from_rgb(51, 51, 51),
    egui::Color32::WHITE,
    egui::Color32::from_rgb(0, 123, 255),
    egui::Color32::from_rgb(40, 167, 69),
    egui::Color32::from_rgb(255, 193, 7),
    egui::Color32::from_rgb(220, 53, 69),
    egui::Color32::from_rgb(111, 66, 193),
    egui::Color32::from_rgb(248, 249, 250),
];

impl TopologyApp {
    /// Device buttons: click adds at the canvas center, drag drops onto the canvas.
    pub(super) fn draw_toolbox(&mut self, ui: &mut egui::Ui) {
        ui.heading("Devices");
        ui.separator();
        for kind in NodeKind::ALL {
            let text = format!("{}  {}", kind.glyph(), kind.display_name());
            let response = ui.add(
                egui::Button::new(text)
                    .sense(egui::Sense::click_and_drag())
                    .min_size(egui::vec2(ui.available_width(), 28.0)),
            );
            response.dnd_set_drag_payload(kind);
            if response.clicked() {
                self.editor.add_node_at_center(kind);
            }
        }
        ui.separator();
        ui.small("Click to add, or drag onto the canvas.");
    }

    pub(super) fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Properties");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("✖").clicked() {
                    self.editor.close_property_panel();
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| match self.editor.selection() {
                Selection::Node(id) => self.draw_node_properties(ui, id),
                Selection::Edge(id) => self.draw_edge_properties(ui, id),
                Selection::Label(id) => self.draw_label_properties(ui, id),
                Selection::None => {
                    ui.label("Nothing selected");
                }
            });
    }

    fn draw_node_properties(&mut self, ui: &mut egui::Ui, id: NodeId) {
        let Some(node) = self.editor.topology().node(id).cloned() else {
            return;
        };

        // Reload the draft unless one of its fields is being typed into
        let label_field = egui::Id::new(LABEL_FIELD);
        let address_field = egui::Id::new(ADDRESS_FIELD);
        let typing = ui.memory(|m| m.has_focus(label_field) || m.has_focus(address_field));
        if self.panel.node != Some(id) || !typing {
            self.panel.node = Some(id);
            self.panel.label = node.label.clone();
            self.panel.address = node.address.clone();
        }

        ui.label(format!("Device #{}", id.0));
        ui.separator();

        let mut patch = NodePatch::default();

        ui.label("Type:");
        let mut kind = node.kind;
        egui::ComboBox::from_id_salt("node_kind_combo")
            .selected_text(kind.display_name())
            .show_ui(ui, |ui| {
                for option in NodeKind::ALL {
                    ui.selectable_value(&mut kind, option, option.display_name());
                }
            });
        if kind != node.kind {
            patch.kind = Some(kind);
        }

        ui.label("Label:");
        let response = ui.add(egui::TextEdit::singleline(&mut self.panel.label).id(label_field));
        if response.lost_focus() {
            patch.label = Some(self.panel.label.clone());
        }

        ui.label("Address:");
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.panel.address)
                .id(address_field)
                .hint_text("e.g. 10.0.0.1"),
        );
        if response.lost_focus() {
            patch.address = Some(self.panel.address.clone());
        }

        ui.label("Status:");
        let mut status = node.status;
        egui::ComboBox::from_id_salt("node_status_combo")
            .selected_text(status.display_name())
            .show_ui(ui, |ui| {
                for option in NodeStatus::ALL {
                    ui.selectable_value(&mut status, option, option.display_name());
                }
            });
        if status != node.status {
            patch.status = Some(status);
        }

        if patch != NodePatch::default() {
            if let Err(err) = self.editor.update_node(id, patch) {
                self.notify_error(format!("Could not update device: {err}"));
            }
        }

        let links = self
            .editor
            .topology()
            .connections
            .iter()
            .filter(|e| e.touches(id))
            .count();
        ui.separator();
        ui.label(format!("Connections: {links}"));
        ui.label(format!("Position: ({:.0}, {:.0})", node.x, node.y));

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Duplicate").clicked() {
                self.editor.duplicate_node(id);
            }
            if ui.button("Delete").clicked() {
                self.editor.request_delete_selection();
            }
        });
    }

    fn draw_edge_properties(&mut self, ui: &mut egui::Ui, id: EdgeId) {
        let topology = self.editor.topology();
        let Some(edge) = topology.edge(id).cloned() else {
            return;
        };
        let name = |node: NodeId| {
            topology
                .node(node)
                .map_or_else(|| format!("#{}", node.0), |n| n.label.clone())
        };
        let (from, to) = (name(edge.from_node_id), name(edge.to_node_id));

        ui.label(format!("Connection #{}", id.0));
        ui.label(format!("{from} ↔ {to}"));
        ui.separator();

        ui.label("Type:");
        let mut kind = edge.kind;
        egui::ComboBox::from_id_salt("edge_kind_combo")
            .selected_text(kind.display_name())
            .show_ui(ui, |ui| {
                for option in EdgeKind::ALL {
                    ui.selectable_value(&mut kind, option, option.display_name());
                }
            });
        if kind != edge.kind {
            if let Err(err) = self.editor.set_edge_kind(id, kind) {
                self.notify_error(format!("Could not update connection: {err}"));
            }
        }

        ui.separator();
        if ui.button("Delete").clicked() {
            self.editor.request_delete_selection();
        }
    }

    fn draw_label_properties(&mut self, ui: &mut egui::Ui, id: LabelId) {
        let Some(label) = self.editor.topology().label(id).cloned() else {
            return;
        };
        if self.panel.text_label != Some(id) {
            self.panel.text_label = Some(id);
            self.panel.font_size = label.font_size;
        }

        ui.label(format!("Label #{}", id.0));
        ui.separator();

        ui.horizontal(|ui| {
            ui.label(format!("\"{}\"", label.text));
            if ui.small_button("Edit").clicked() {
                if let Err(err) = self.editor.begin_text_edit(id) {
                    log::warn!("cannot edit label: {err}");
                }
            }
        });

        let mut style = LabelStyle::default();

        ui.label("Font size:");
        let response = ui.add(
            egui::DragValue::new(&mut self.panel.font_size)
                .range(6.0..=96.0)
                .speed(0.5),
        );
        if response.drag_stopped() || response.lost_focus() {
            style.font_size = Some(self.panel.font_size);
        } else if !response.dragged() && !response.has_focus() {
            self.panel.font_size = label.font_size;
        }

        ui.label("Text color:");
        if let Some(color) = palette_row(ui, label.color.0) {
            style.color = Some(HexColor(color));
        }
        ui.label("Background:");
        if let Some(color) = palette_row(ui, label.background_color.0) {
            style.background_color = Some(HexColor(color));
        }

        if style != LabelStyle::default() {
            if let Err(err) = self.editor.update_label_style(id, style) {
                self.notify_error(format!("Could not update label: {err}"));
            }
        }

        ui.separator();
        if ui.button("Delete").clicked() {
            self.editor.request_delete_selection();
        }
    }
}

/// A row of color swatches. Returns the clicked color.
fn palette_row(ui: &mut egui::Ui, current: egui::Color32) -> Option<egui::Color32> {
    let mut picked = None;
    ui.horizontal_wrapped(|ui| {
        for color in PALETTE {
            let stroke = if color == current {
                egui::Stroke::new(2.0, ui.visuals().selection.stroke.color)
            } else {
                egui::Stroke::new(1.0, egui::Color32::GRAY)
            };
            let swatch = egui::Button::new("")
                .fill(color)
                .stroke(stroke)
                .min_size(egui::vec2(18.0, 18.0));
            if ui.add(swatch).clicked() && color != current {
                picked = Some(color);
            }
        }
    });
    picked
}
