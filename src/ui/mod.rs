//! Desktop shell for the topology editor.
//!
//! The editor core does all the work; this module lays out the window, turns
//! egui input into editor events and shows dialogs and notifications.
//!
//! # Module Organization
//!
//! - `state` - Shell state structures and the main `TopologyApp`
//! - `canvas` - Canvas input routing, inline text field, context menu, minimap
//! - `panels` - Device toolbox and property panel
//! - `rendering` - Painting render lists with the egui painter
//! - `export` - SVG serialization and PNG rasterization
//! - `file_ops` - Native file dialogs and storage save/load

mod canvas;
mod export;
mod file_ops;
mod panels;
mod rendering;
mod state;

#[cfg(test)]
mod tests;

pub use export::{render_list_to_svg, svg_to_png};
pub use state::{AppSettings, ExportOptions, TopologyApp};

use self::state::{NotificationLevel, PendingConfirmAction, PendingFileOperation};
use crate::constants::APP_STATE_KEY;
use crate::editor::{Alignment, DeleteTarget, ToolMode};
use eframe::egui;

/// Seconds a notification stays on screen.
const NOTIFICATION_SECONDS: f64 = 4.0;

impl eframe::App for TopologyApp {
    /// Persist shell settings between restarts. The scene itself is only
    /// written by an explicit Save.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.settings.to_json() {
            Ok(json) => storage.set_string(APP_STATE_KEY, json),
            Err(err) => log::error!("failed to serialize app settings: {err}"),
        }
    }

    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let visuals = if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx, frame);
        self.handle_keyboard(ctx);

        // Intercept native window close requests (titlebar X)
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.editor.is_dirty() && !self.file.allow_close {
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                self.file.pending_confirm = Some(PendingConfirmAction::Quit);
            } else {
                self.file.allow_close = false;
            }
        }

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        egui::SidePanel::left("device_toolbox")
            .resizable(false)
            .default_width(130.0)
            .show(ctx, |ui| {
                self.draw_toolbox(ui);
            });

        if self.editor.property_panel_open() {
            egui::SidePanel::right("properties_panel")
                .resizable(true)
                .default_width(220.0)
                .show(ctx, |ui| {
                    self.draw_properties_panel(ui);
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_canvas(ui);
            });

        self.draw_delete_dialog(ctx);
        self.draw_unsaved_dialog(ctx);
        self.draw_notifications(ctx);
    }
}

impl TopologyApp {
    /// Routes key presses to the editor unless a text field has focus.
    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let presses: Vec<(egui::Key, egui::Modifiers)> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|ev| match ev {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => Some((*key, *modifiers)),
                    _ => None,
                })
                .collect()
        });

        for (key, modifiers) in presses {
            if modifiers.command && self.handle_file_shortcut(key) {
                continue;
            }
            if self.editor.key_pressed(key, modifiers) {
                log::debug!("editor handled {key:?}");
            }
        }
    }

    /// Ctrl/Cmd+N, O and S.
    fn handle_file_shortcut(&mut self, key: egui::Key) -> bool {
        match key {
            egui::Key::N => self.request_new(),
            egui::Key::O => self.request_open(),
            egui::Key::S => self.file.pending = Some(PendingFileOperation::SaveToStorage),
            _ => return false,
        }
        true
    }

    fn request_new(&mut self) {
        if self.editor.is_dirty() {
            self.file.pending_confirm = Some(PendingConfirmAction::New);
        } else {
            self.new_topology();
        }
    }

    fn request_open(&mut self) {
        if self.editor.is_dirty() {
            self.file.pending_confirm = Some(PendingConfirmAction::Open);
        } else {
            self.file.pending = Some(PendingFileOperation::Open);
        }
    }

    fn new_topology(&mut self) {
        self.editor.new_topology();
        self.editor.mark_saved();
        self.file.current_path = None;
        self.panel = Default::default();
        self.notify("New topology");
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("New").clicked() {
                self.request_new();
            }
            if ui.button("Open").clicked() {
                self.request_open();
            }
            if ui.button("Export JSON").clicked() {
                self.file.pending = Some(PendingFileOperation::ExportJson);
            }
            if ui.button("Save").clicked() {
                self.file.pending = Some(PendingFileOperation::SaveToStorage);
            }
            if ui.button("Load").clicked() {
                self.file.pending = Some(PendingFileOperation::LoadFromStorage);
            }
            ui.menu_button("Export image", |ui| {
                ui.checkbox(&mut self.settings.export.include_background, "Background");
                ui.checkbox(&mut self.settings.export.include_grid, "Grid");
                ui.add(
                    egui::Slider::new(&mut self.settings.export.png_scale, 0.5..=4.0)
                        .text("PNG scale"),
                );
                if ui.button("PNG…").clicked() {
                    self.file.pending = Some(PendingFileOperation::ExportPng);
                    ui.close();
                }
                if ui.button("SVG…").clicked() {
                    self.file.pending = Some(PendingFileOperation::ExportSvg);
                    ui.close();
                }
            });

            ui.separator();

            let mut tool = self.editor.tool();
            for mode in ToolMode::ALL {
                ui.selectable_value(&mut tool, mode, mode.display_name());
            }
            if tool != self.editor.tool() {
                self.editor.set_tool(tool);
            }

            ui.separator();

            ui.add_enabled_ui(self.editor.can_undo(), |ui| {
                if ui.button("⟲ Undo").clicked() {
                    self.editor.undo();
                }
            });
            ui.add_enabled_ui(self.editor.can_redo(), |ui| {
                if ui.button("⟳ Redo").clicked() {
                    self.editor.redo();
                }
            });

            ui.separator();

            if ui.button("−").on_hover_text("Zoom out").clicked() {
                self.editor.zoom_out();
            }
            let percent = format!("{:.0}%", self.editor.viewport().zoom() * 100.0);
            if ui.button(percent).on_hover_text("Reset view").clicked() {
                self.editor.reset_view();
            }
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.editor.zoom_in();
            }

            ui.separator();

            ui.menu_button("Align", |ui| {
                for alignment in Alignment::ALL {
                    if ui.button(alignment.display_name()).clicked() {
                        self.editor.align(alignment);
                        ui.close();
                    }
                }
            });
            if ui.button("Arrange grid").clicked() {
                self.editor.arrange_grid();
            }

            ui.separator();

            ui.checkbox(&mut self.settings.show_grid, "Grid");
            ui.checkbox(&mut self.settings.show_minimap, "Minimap");
            let theme = if self.settings.dark_mode { "☀ Light" } else { "🌙 Dark" };
            if ui.button(theme).clicked() {
                self.settings.dark_mode = !self.settings.dark_mode;
            }
        });
    }

    fn draw_delete_dialog(&mut self, ctx: &egui::Context) {
        let Some(target) = self.editor.pending_delete() else {
            return;
        };
        let topology = self.editor.topology();
        let message = match target {
            DeleteTarget::Node(id) => {
                let name = topology.node(id).map_or("device", |n| n.label.as_str());
                let links = topology.connections.iter().filter(|e| e.touches(id)).count();
                format!("Delete \"{name}\" and its {links} connection(s)?")
            }
            DeleteTarget::Edge(_) => "Delete this connection?".to_owned(),
            DeleteTarget::Label(id) => {
                let text = topology.label(id).map_or("label", |l| l.text.as_str());
                format!("Delete label \"{text}\"?")
            }
        };

        egui::Window::new("Confirm delete")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        if let Err(err) = self.editor.confirm_delete() {
                            self.notify_error(format!("Delete failed: {err}"));
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        self.editor.cancel_delete();
                    }
                });
            });
    }

    fn draw_unsaved_dialog(&mut self, ctx: &egui::Context) {
        let Some(action) = self.file.pending_confirm else {
            return;
        };
        let (title, confirm_label) = match action {
            PendingConfirmAction::Quit => ("Unsaved changes: quit?", "Discard and Quit"),
            PendingConfirmAction::New => ("Unsaved changes: new topology?", "Discard and Create New"),
            PendingConfirmAction::Open => ("Unsaved changes: open file?", "Discard and Open"),
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label("You have unsaved changes. Are you sure you want to continue?");
                ui.horizontal(|ui| {
                    if ui.button(confirm_label).clicked() {
                        match action {
                            PendingConfirmAction::New => self.new_topology(),
                            PendingConfirmAction::Open => {
                                self.file.pending = Some(PendingFileOperation::Open);
                            }
                            PendingConfirmAction::Quit => {
                                self.file.allow_close = true;
                                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                            }
                        }
                        self.file.pending_confirm = None;
                    }
                    if ui.button("Cancel").clicked() {
                        self.file.pending_confirm = None;
                    }
                });
            });
    }

    /// Stacks notifications in the bottom-left corner and drops expired ones.
    fn draw_notifications(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        self.notifications.retain_mut(|n| {
            let shown_at = *n.shown_at.get_or_insert(now);
            now - shown_at < NOTIFICATION_SECONDS
        });
        if self.notifications.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(140.0, -12.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                for notification in &self.notifications {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        let color = match notification.level {
                            NotificationLevel::Info => ui.visuals().text_color(),
                            NotificationLevel::Error => ui.visuals().error_fg_color,
                        };
                        ui.colored_label(color, &notification.message);
                    });
                }
            });
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
