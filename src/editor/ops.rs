//! Structural mutations of the scene. Each successful one commits a snapshot.

use super::{DeleteTarget, Selection, TopologyEditor};
use crate::constants;
use crate::error::{Result, TopologyError};
use crate::types::{
    Edge, EdgeId, EdgeKind, HexColor, LabelId, Node, NodeId, NodeKind, NodeStatus, TextLabel,
};
use eframe::egui;

/// Property-panel edit of a node. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    /// New device type
    pub kind: Option<NodeKind>,
    /// New name, trimmed
    pub label: Option<String>,
    /// New address, trimmed
    pub address: Option<String>,
    /// New status
    pub status: Option<NodeStatus>,
}

/// Visual properties of a text label. `None` leaves a field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabelStyle {
    /// Font size, clamped to a readable range
    pub font_size: Option<f32>,
    /// Text color
    pub color: Option<HexColor>,
    /// Box fill
    pub background_color: Option<HexColor>,
}

/// How [`TopologyEditor::align`] lines up the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Same left-most x
    Left,
    /// Same right-most x
    Right,
    /// Same top-most y
    Top,
    /// Same bottom-most y
    Bottom,
    /// Same x, the mean of all nodes
    CenterHorizontal,
    /// Same y, the mean of all nodes
    CenterVertical,
    /// Equal horizontal spacing between leftmost and rightmost
    DistributeHorizontal,
    /// Equal vertical spacing between topmost and bottommost
    DistributeVertical,
}

impl Alignment {
    /// Every alignment, in menu order.
    pub const ALL: [Alignment; 8] = [
        Alignment::Left,
        Alignment::Right,
        Alignment::Top,
        Alignment::Bottom,
        Alignment::CenterHorizontal,
        Alignment::CenterVertical,
        Alignment::DistributeHorizontal,
        Alignment::DistributeVertical,
    ];

    /// Menu label.
    pub fn display_name(self) -> &'static str {
        match self {
            Alignment::Left => "Align left",
            Alignment::Right => "Align right",
            Alignment::Top => "Align top",
            Alignment::Bottom => "Align bottom",
            Alignment::CenterHorizontal => "Center horizontally",
            Alignment::CenterVertical => "Center vertically",
            Alignment::DistributeHorizontal => "Distribute horizontally",
            Alignment::DistributeVertical => "Distribute vertically",
        }
    }
}

impl TopologyEditor {
    /// Places a new node of `kind` at a scene position and selects it.
    pub fn add_node(&mut self, kind: NodeKind, pos: egui::Pos2) -> NodeId {
        let id = self.allocate_node_id();
        self.topology.add_node(Node::new(id, kind, pos));
        self.selection = Selection::Node(id);
        log::info!("added {kind:?} node {id} at ({:.1}, {:.1})", pos.x, pos.y);
        self.commit("add node");
        id
    }

    /// Places a node at the center of the visible canvas.
    pub fn add_node_at_center(&mut self, kind: NodeKind) -> NodeId {
        let center = self.viewport.visible_scene_rect(self.canvas_size).center();
        self.add_node(kind, center)
    }

    /// Connects two nodes unless they are already connected in either direction.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind) -> Result<EdgeId> {
        let id = self.current_edge_id();
        self.topology.add_connection(Edge {
            id,
            from_node_id: from,
            to_node_id: to,
            kind,
        })?;
        self.next_edge_id += 1;
        log::info!("connected {from} -> {to} as {id}");
        self.commit("add edge");
        Ok(id)
    }

    /// Places a text label with fixed text (no inline edit).
    pub fn add_label(&mut self, pos: egui::Pos2, text: &str) -> LabelId {
        let id = self.allocate_label_id();
        self.topology.add_label(TextLabel::new(
            id,
            pos,
            text,
            self.config.default_label_font_size,
        ));
        self.commit("add label");
        id
    }

    /// Removes a node and its incident connections.
    pub fn delete_node(&mut self, id: NodeId) -> Result<Node> {
        let edges_before = self.topology.connections.len();
        let node = self
            .topology
            .remove_node(id)
            .ok_or(TopologyError::UnknownNode(id))?;
        if self.link_draft.is_some_and(|d| d.source == id) {
            self.link_draft = None;
        }
        self.prune_selection();
        log::info!(
            "deleted node {id} and {} connection(s)",
            edges_before - self.topology.connections.len()
        );
        self.commit("delete node");
        Ok(node)
    }

    /// Removes a connection.
    pub fn delete_edge(&mut self, id: EdgeId) -> Result<Edge> {
        let edge = self
            .topology
            .remove_connection(id)
            .ok_or(TopologyError::UnknownEdge(id))?;
        self.prune_selection();
        log::info!("deleted connection {id}");
        self.commit("delete edge");
        Ok(edge)
    }

    /// Removes a text label, closing its edit if one is open.
    pub fn delete_label(&mut self, id: LabelId) -> Result<TextLabel> {
        if self.text_edit.as_ref().is_some_and(|s| s.label == id) {
            self.text_edit = None;
        }
        let label = self
            .topology
            .remove_label(id)
            .ok_or(TopologyError::UnknownLabel(id))?;
        self.prune_selection();
        log::info!("deleted text label {id}");
        self.commit("delete label");
        Ok(label)
    }

    /// Stages deletion of the current selection until the user confirms.
    ///
    /// Returns `false` when nothing is selected.
    pub fn request_delete_selection(&mut self) -> bool {
        self.pending_delete = match self.selection {
            Selection::None => None,
            Selection::Node(id) => Some(DeleteTarget::Node(id)),
            Selection::Label(id) => Some(DeleteTarget::Label(id)),
            Selection::Edge(id) => Some(DeleteTarget::Edge(id)),
        };
        self.context_menu = None;
        self.pending_delete.is_some()
    }

    /// Runs the staged deletion.
    pub fn confirm_delete(&mut self) -> Result<()> {
        let Some(target) = self.pending_delete.take() else {
            return Ok(());
        };
        match target {
            DeleteTarget::Node(id) => self.delete_node(id).map(|_| ()),
            DeleteTarget::Label(id) => self.delete_label(id).map(|_| ()),
            DeleteTarget::Edge(id) => self.delete_edge(id).map(|_| ()),
        }
    }

    /// Drops the staged deletion.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Copies a node next to the original and selects the copy.
    pub fn duplicate_node(&mut self, id: NodeId) -> Option<NodeId> {
        let original = self.topology.node(id)?.clone();
        let new_id = self.allocate_node_id();
        let copy = Node {
            id: new_id,
            x: original.x + constants::DUPLICATE_OFFSET,
            y: original.y + constants::DUPLICATE_OFFSET,
            label: format!("{} (copy)", original.label),
            ..original
        };
        self.topology.add_node(copy);
        self.selection = Selection::Node(new_id);
        log::info!("duplicated node {id} as {new_id}");
        self.commit("duplicate node");
        Some(new_id)
    }

    /// Applies a property-panel edit to a node.
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> Result<()> {
        let node = self
            .topology
            .node_mut(id)
            .ok_or(TopologyError::UnknownNode(id))?;
        let before = node.clone();
        if let Some(kind) = patch.kind {
            node.kind = kind;
        }
        if let Some(label) = patch.label {
            node.label = label.trim().to_string();
        }
        if let Some(address) = patch.address {
            node.address = address.trim().to_string();
        }
        if let Some(status) = patch.status {
            node.status = status;
        }
        if *node != before {
            self.commit("edit node");
        }
        Ok(())
    }

    /// Changes the type of a connection.
    pub fn set_edge_kind(&mut self, id: EdgeId, kind: EdgeKind) -> Result<()> {
        let edge = self
            .topology
            .edge_mut(id)
            .ok_or(TopologyError::UnknownEdge(id))?;
        if edge.kind != kind {
            edge.kind = kind;
            self.commit("edit edge");
        }
        Ok(())
    }

    /// Applies a style change to a label.
    pub fn update_label_style(&mut self, id: LabelId, style: LabelStyle) -> Result<()> {
        let label = self
            .topology
            .label_mut(id)
            .ok_or(TopologyError::UnknownLabel(id))?;
        let before = label.clone();
        if let Some(size) = style.font_size {
            label.font_size = size.clamp(6.0, 96.0);
        }
        if let Some(color) = style.color {
            label.color = color;
        }
        if let Some(bg) = style.background_color {
            label.background_color = bg;
        }
        if *label != before {
            self.commit("edit label style");
        }
        Ok(())
    }

    /// Lines up all nodes. Needs at least two nodes.
    pub fn align(&mut self, alignment: Alignment) -> bool {
        let nodes = &mut self.topology.devices;
        if nodes.len() < 2 {
            return false;
        }
        let before: Vec<(f32, f32)> = nodes.iter().map(|n| (n.x, n.y)).collect();
        let xs = || nodes.iter().map(|n| n.x);
        let (min_x, max_x) = xs().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), x| {
            (lo.min(x), hi.max(x))
        });
        let ys = || nodes.iter().map(|n| n.y);
        let (min_y, max_y) = ys().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
        let count = nodes.len() as f32;
        let mean_x = xs().sum::<f32>() / count;
        let mean_y = ys().sum::<f32>() / count;

        match alignment {
            Alignment::Left => nodes.iter_mut().for_each(|n| n.x = min_x),
            Alignment::Right => nodes.iter_mut().for_each(|n| n.x = max_x),
            Alignment::Top => nodes.iter_mut().for_each(|n| n.y = min_y),
            Alignment::Bottom => nodes.iter_mut().for_each(|n| n.y = max_y),
            Alignment::CenterHorizontal => nodes.iter_mut().for_each(|n| n.x = mean_x),
            Alignment::CenterVertical => nodes.iter_mut().for_each(|n| n.y = mean_y),
            Alignment::DistributeHorizontal => {
                let mut order: Vec<usize> = (0..nodes.len()).collect();
                order.sort_by(|&a, &b| nodes[a].x.total_cmp(&nodes[b].x));
                let step = (max_x - min_x) / (count - 1.0);
                for (rank, &i) in order.iter().enumerate() {
                    nodes[i].x = min_x + step * rank as f32;
                }
            }
            Alignment::DistributeVertical => {
                let mut order: Vec<usize> = (0..nodes.len()).collect();
                order.sort_by(|&a, &b| nodes[a].y.total_cmp(&nodes[b].y));
                let step = (max_y - min_y) / (count - 1.0);
                for (rank, &i) in order.iter().enumerate() {
                    nodes[i].y = min_y + step * rank as f32;
                }
            }
        }

        let changed = nodes
            .iter()
            .zip(&before)
            .any(|(n, &(x, y))| n.x != x || n.y != y);
        if changed {
            self.commit("align");
        }
        changed
    }

    /// Places all nodes on a square grid starting at the top-left-most node.
    pub fn arrange_grid(&mut self) -> bool {
        let nodes = &mut self.topology.devices;
        if nodes.is_empty() {
            return false;
        }
        let origin = nodes.iter().fold(
            egui::pos2(f32::INFINITY, f32::INFINITY),
            |acc, n| egui::pos2(acc.x.min(n.x), acc.y.min(n.y)),
        );
        let columns = (nodes.len() as f32).sqrt().ceil().max(1.0) as usize;
        let mut changed = false;
        for (i, node) in nodes.iter_mut().enumerate() {
            let pos = origin
                + egui::vec2(
                    (i % columns) as f32 * constants::ARRANGE_SPACING,
                    (i / columns) as f32 * constants::ARRANGE_SPACING,
                );
            if node.pos() != pos {
                node.set_pos(pos);
                changed = true;
            }
        }
        if changed {
            self.commit("arrange grid");
        }
        changed
    }

    /// Restores the previous snapshot. No-op at the oldest one.
    pub fn undo(&mut self) -> bool {
        self.text_edit = None;
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.topology = snapshot.clone();
        self.reset_interaction();
        self.dirty = true;
        log::debug!("undo -> snapshot {:?}", self.history.index());
        true
    }

    /// Re-applies the next snapshot. No-op at the newest one.
    pub fn redo(&mut self) -> bool {
        self.text_edit = None;
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.topology = snapshot.clone();
        self.reset_interaction();
        self.dirty = true;
        log::debug!("redo -> snapshot {:?}", self.history.index());
        true
    }

    /// Forgets every snapshot; the current scene becomes the only entry.
    pub fn reset_history(&mut self) {
        self.history.clear();
        self.history.commit(&self.settled_topology());
    }

    /// Whether undo would change the scene.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo would change the scene.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Zooms by `factor` keeping the scene point under `anchor` (screen) in place.
    pub fn zoom_at(&mut self, anchor: egui::Pos2, factor: f32) -> bool {
        self.viewport.zoom_at(anchor, factor)
    }

    /// One zoom-tool step in, anchored at the canvas center.
    pub fn zoom_in(&mut self) -> bool {
        let center = (self.canvas_size / 2.0).to_pos2();
        self.viewport.zoom_at(center, self.config.zoom_in_step)
    }

    /// Zooms out one step around the canvas center.
    pub fn zoom_out(&mut self) -> bool {
        let center = (self.canvas_size / 2.0).to_pos2();
        self.viewport.zoom_at(center, self.config.zoom_out_step)
    }

    /// Back to zoom 1 with no pan.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Pans by a screen-space pixel delta.
    pub fn pan_by(&mut self, delta_px: egui::Vec2) {
        self.viewport.pan_by_screen(delta_px);
    }

    /// Pans so that a scene point sits at the canvas center.
    pub fn center_view_on(&mut self, scene: egui::Pos2) {
        self.viewport.pan = self.canvas_size / 2.0 / self.viewport.zoom() - scene.to_vec2();
    }
}
