//! Tool-mode state machine: pointer, wheel and keyboard events.
//!
//! All positions passed in are screen pixels relative to the canvas origin.

use super::{ContextMenu, DragTarget, Gesture, LinkDraft, Selection, ToolMode, TopologyEditor};
use crate::hit_test::{self, Hit};
use crate::types::EdgeKind;
use eframe::egui;

impl TopologyEditor {
    /// Switches tool. Every in-progress interaction and the selection are dropped.
    pub fn set_tool(&mut self, tool: ToolMode) {
        self.cancel_text_edit();
        self.reset_interaction();
        if self.tool != tool {
            log::debug!("tool {:?} -> {:?}", self.tool, tool);
        }
        self.tool = tool;
    }

    /// Handles a pointer press on the canvas.
    pub fn pointer_down(&mut self, screen: egui::Pos2, button: egui::PointerButton) {
        self.context_menu = None;
        // A click anywhere on the canvas blurs the inline text field.
        self.commit_text_edit();

        if button == egui::PointerButton::Middle {
            self.gesture = Gesture::Panning { last: screen };
            return;
        }

        let scene = self.screen_to_scene(screen);
        match (self.tool, button) {
            (ToolMode::Select, egui::PointerButton::Primary) => self.select_at(scene),
            (ToolMode::Select, egui::PointerButton::Secondary) => {
                if let Some(hit) = self.hit(scene) {
                    self.selection = hit.into();
                    self.context_menu = Some(ContextMenu {
                        screen_pos: screen,
                        target: hit,
                    });
                }
            }
            (ToolMode::Pan, egui::PointerButton::Primary) => {
                self.gesture = Gesture::Panning { last: screen };
            }
            (ToolMode::Zoom, egui::PointerButton::Primary) => {
                self.zoom_at(screen, self.config.zoom_in_step);
            }
            (ToolMode::Zoom, egui::PointerButton::Secondary) => {
                self.zoom_at(screen, self.config.zoom_out_step);
            }
            (ToolMode::Link, egui::PointerButton::Primary) => self.link_click(scene),
            (ToolMode::Text, egui::PointerButton::Primary) => {
                match hit_test::label_at(
                    &self.topology,
                    scene,
                    self.metrics.as_ref(),
                    self.config.label_padding,
                ) {
                    Some(id) => {
                        if let Err(err) = self.begin_text_edit(id) {
                            log::warn!("cannot edit label: {err}");
                        }
                    }
                    None => {
                        self.start_new_label(scene);
                    }
                }
            }
            _ => {}
        }
    }

    fn select_at(&mut self, scene: egui::Pos2) {
        let Some(hit) = self.hit(scene) else {
            self.selection = Selection::None;
            self.property_panel_open = false;
            return;
        };
        self.selection = hit.into();
        let drag = match hit {
            Hit::Node(id) => {
                self.property_panel_open = true;
                self.topology
                    .node(id)
                    .map(|n| (DragTarget::Node(id), n.pos()))
            }
            Hit::Label(id) => self
                .topology
                .label(id)
                .map(|l| (DragTarget::Label(id), l.pos())),
            Hit::Edge(_) => {
                self.property_panel_open = true;
                None
            }
        };
        if let Some((target, anchor)) = drag {
            self.gesture = Gesture::Dragging {
                target,
                grab_offset: anchor - scene,
                moved: false,
            };
        }
    }

    fn link_click(&mut self, scene: egui::Pos2) {
        let clicked = hit_test::node_at(&self.topology, scene, self.config.node_radius);
        match (self.link_draft.take(), clicked) {
            (None, Some(source)) => {
                self.link_draft = Some(LinkDraft {
                    source,
                    cursor: scene,
                });
            }
            (Some(draft), Some(target)) if target != draft.source => {
                if let Err(err) = self.add_edge(draft.source, target, EdgeKind::default()) {
                    log::info!("link not created: {err}");
                }
            }
            // Empty space or the source node again cancels the draft.
            _ => {}
        }
    }

    /// Handles pointer motion over the canvas.
    pub fn pointer_move(&mut self, screen: egui::Pos2) {
        let scene = self.screen_to_scene(screen);
        match self.gesture {
            Gesture::Panning { last } => {
                self.viewport.pan_by_screen(screen - last);
                self.gesture = Gesture::Panning { last: screen };
            }
            Gesture::Dragging {
                target,
                grab_offset,
                moved,
            } => {
                let bounds = self.viewport.visible_scene_rect(self.canvas_size);
                let pos = (scene + grab_offset).clamp(bounds.min, bounds.max);
                let changed = match target {
                    DragTarget::Node(id) => self.topology.node_mut(id).map(|n| {
                        let changed = n.pos() != pos;
                        n.set_pos(pos);
                        changed
                    }),
                    DragTarget::Label(id) => self.topology.label_mut(id).map(|l| {
                        let changed = l.pos() != pos;
                        l.set_pos(pos);
                        changed
                    }),
                };
                match changed {
                    Some(changed) => {
                        self.gesture = Gesture::Dragging {
                            target,
                            grab_offset,
                            moved: moved || changed,
                        };
                    }
                    None => self.gesture = Gesture::Idle,
                }
            }
            Gesture::Idle => {}
        }
        if let Some(draft) = self.link_draft.as_mut() {
            draft.cursor = scene;
        }
    }

    /// Handles a pointer release. A drag that moved its object is committed.
    pub fn pointer_up(&mut self) {
        if let Gesture::Dragging { moved: true, .. } = self.gesture {
            self.commit("move");
        }
        self.gesture = Gesture::Idle;
    }

    /// Double click in select mode opens an inline edit on a label.
    pub fn double_click(&mut self, screen: egui::Pos2) {
        if self.tool != ToolMode::Select {
            return;
        }
        let scene = self.screen_to_scene(screen);
        if let Some(Hit::Label(id)) = self.hit(scene) {
            if let Err(err) = self.begin_text_edit(id) {
                log::warn!("cannot edit label: {err}");
            }
        }
    }

    /// Wheel zoom anchored at the pointer. Positive `delta_y` scrolls up and zooms in.
    pub fn wheel(&mut self, screen: egui::Pos2, delta_y: f32) {
        let factor = if delta_y > 0.0 {
            self.config.wheel_zoom_in
        } else if delta_y < 0.0 {
            self.config.wheel_zoom_out
        } else {
            return;
        };
        self.zoom_at(screen, factor);
    }

    /// Handles a key press. Returns `true` when the editor consumed the key.
    pub fn key_pressed(&mut self, key: egui::Key, modifiers: egui::Modifiers) -> bool {
        if self.text_edit.is_some() {
            return match key {
                egui::Key::Enter => {
                    self.commit_text_edit();
                    true
                }
                egui::Key::Escape => {
                    self.cancel_text_edit();
                    true
                }
                _ => false,
            };
        }

        if modifiers.command {
            return match key {
                egui::Key::Z if modifiers.shift => self.redo(),
                egui::Key::Z => self.undo(),
                egui::Key::Y => self.redo(),
                egui::Key::D => match self.selection {
                    Selection::Node(id) => self.duplicate_node(id).is_some(),
                    _ => false,
                },
                _ => false,
            };
        }

        let step = if modifiers.shift {
            self.config.nudge_step_large
        } else {
            self.config.nudge_step
        };
        match key {
            egui::Key::Delete | egui::Key::Backspace => self.request_delete_selection(),
            egui::Key::Escape => {
                self.reset_interaction();
                true
            }
            egui::Key::ArrowLeft => self.nudge_selection(egui::vec2(-step, 0.0)),
            egui::Key::ArrowRight => self.nudge_selection(egui::vec2(step, 0.0)),
            egui::Key::ArrowUp => self.nudge_selection(egui::vec2(0.0, -step)),
            egui::Key::ArrowDown => self.nudge_selection(egui::vec2(0.0, step)),
            _ => false,
        }
    }

    /// Moves the selected node or label by a scene-space offset.
    pub fn nudge_selection(&mut self, delta: egui::Vec2) -> bool {
        let moved = match self.selection {
            Selection::Node(id) => self
                .topology
                .node_mut(id)
                .map(|n| n.set_pos(n.pos() + delta))
                .is_some(),
            Selection::Label(id) => self
                .topology
                .label_mut(id)
                .map(|l| l.set_pos(l.pos() + delta))
                .is_some(),
            _ => false,
        };
        if moved {
            self.commit("nudge");
        }
        moved
    }
}
