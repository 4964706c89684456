//! Hit testing of scene objects in scene coordinates.
//!
//! Priority when several objects overlap: text labels, then nodes, then edges.
//! Within one class the most recently created object wins, since it is drawn on top.

use crate::config::EditorConfig;
use crate::types::{EdgeId, LabelId, NodeId, TextLabel, Topology};
use eframe::egui;

/// Measures rendered text. The shell backs this with egui's font metrics.
pub trait TextMetrics {
    /// Size of `text` laid out on a single line at `font_size`.
    fn measure(&self, text: &str, font_size: f32) -> egui::Vec2;
}

/// Fixed-advance approximation used when no real font is at hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMetrics;

impl TextMetrics for ApproxTextMetrics {
    fn measure(&self, text: &str, font_size: f32) -> egui::Vec2 {
        egui::vec2(text.chars().count() as f32 * font_size * 0.6, font_size)
    }
}

/// The object found under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A text label
    Label(LabelId),
    /// A device
    Node(NodeId),
    /// A connection
    Edge(EdgeId),
}

/// Distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: egui::Pos2, a: egui::Pos2, b: egui::Pos2) -> f32 {
    let ab = b - a;
    let ap = point - a;
    let len_sq = ab.length_sq();
    if len_sq < 1e-6 {
        return ap.length();
    }
    let t = (ap.dot(ab) / len_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).length()
}

/// The label's box in scene coordinates: centered on its position, text size plus padding.
pub fn label_rect(label: &TextLabel, metrics: &dyn TextMetrics, padding: f32) -> egui::Rect {
    let text_size = metrics.measure(&label.text, label.font_size);
    let size = egui::vec2(text_size.x + 2.0 * padding, label.font_size + 2.0 * padding);
    egui::Rect::from_center_size(label.pos(), size)
}

/// Topmost node whose circle contains `pos`.
pub fn node_at(topology: &Topology, pos: egui::Pos2, radius: f32) -> Option<NodeId> {
    topology
        .devices
        .iter()
        .rev()
        .find(|n| n.pos().distance(pos) <= radius)
        .map(|n| n.id)
}

/// Topmost edge within `threshold` of `pos`.
pub fn edge_at(topology: &Topology, pos: egui::Pos2, threshold: f32) -> Option<EdgeId> {
    topology
        .connections
        .iter()
        .rev()
        .find(|edge| {
            match (topology.node(edge.from_node_id), topology.node(edge.to_node_id)) {
                (Some(from), Some(to)) => {
                    distance_to_segment(pos, from.pos(), to.pos()) <= threshold
                }
                _ => false,
            }
        })
        .map(|e| e.id)
}

/// Labels currently in inline edit are never hit.
pub fn label_at(
    topology: &Topology,
    pos: egui::Pos2,
    metrics: &dyn TextMetrics,
    padding: f32,
) -> Option<LabelId> {
    topology
        .text_labels
        .iter()
        .rev()
        .filter(|l| !l.is_editing)
        .find(|l| label_rect(l, metrics, padding).contains(pos))
        .map(|l| l.id)
}

/// Top-priority object at `pos`.
pub fn pick(
    topology: &Topology,
    pos: egui::Pos2,
    metrics: &dyn TextMetrics,
    config: &EditorConfig,
) -> Option<Hit> {
    label_at(topology, pos, metrics, config.label_padding)
        .map(Hit::Label)
        .or_else(|| node_at(topology, pos, config.node_radius).map(Hit::Node))
        .or_else(|| edge_at(topology, pos, config.edge_hit_threshold).map(Hit::Edge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, EdgeKind, Node, NodeKind};

    fn scene() -> Topology {
        let mut t = Topology::new();
        t.add_node(Node::new(NodeId(1), NodeKind::Router, egui::pos2(0.0, 0.0)));
        t.add_node(Node::new(NodeId(2), NodeKind::Switch, egui::pos2(200.0, 0.0)));
        t.add_connection(Edge {
            id: EdgeId(1),
            from_node_id: NodeId(1),
            to_node_id: NodeId(2),
            kind: EdgeKind::Ethernet,
        })
        .unwrap();
        t
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = egui::pos2(0.0, 0.0);
        let b = egui::pos2(10.0, 0.0);
        assert_eq!(distance_to_segment(egui::pos2(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(egui::pos2(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(egui::pos2(-3.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(egui::pos2(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn node_hit_uses_radius() {
        let t = scene();
        assert_eq!(node_at(&t, egui::pos2(30.0, 0.0), 30.0), Some(NodeId(1)));
        assert_eq!(node_at(&t, egui::pos2(30.1, 0.0), 30.0), None);
    }

    #[test]
    fn edge_hit_uses_threshold() {
        let t = scene();
        assert_eq!(edge_at(&t, egui::pos2(100.0, 8.0), 8.0), Some(EdgeId(1)));
        assert_eq!(edge_at(&t, egui::pos2(100.0, 9.0), 8.0), None);
        // beyond the segment end the distance is measured to the endpoint
        assert_eq!(edge_at(&t, egui::pos2(207.0, 0.0), 8.0), Some(EdgeId(1)));
    }

    #[test]
    fn pick_prefers_labels_then_nodes_then_edges() {
        let mut t = scene();
        let config = EditorConfig::default();
        let metrics = ApproxTextMetrics;

        assert_eq!(pick(&t, egui::pos2(100.0, 2.0), &metrics, &config), Some(Hit::Edge(EdgeId(1))));
        assert_eq!(pick(&t, egui::pos2(10.0, 2.0), &metrics, &config), Some(Hit::Node(NodeId(1))));

        t.add_label(TextLabel::new(LabelId(1), egui::pos2(5.0, 0.0), "core", 14.0));
        assert_eq!(pick(&t, egui::pos2(10.0, 2.0), &metrics, &config), Some(Hit::Label(LabelId(1))));

        t.text_labels[0].is_editing = true;
        assert_eq!(pick(&t, egui::pos2(10.0, 2.0), &metrics, &config), Some(Hit::Node(NodeId(1))));

        assert_eq!(pick(&t, egui::pos2(100.0, 100.0), &metrics, &config), None);
    }

    #[test]
    fn label_rect_is_centered_and_padded() {
        let label = TextLabel::new(LabelId(1), egui::pos2(100.0, 50.0), "abcd", 10.0);
        let rect = label_rect(&label, &ApproxTextMetrics, 5.0);
        assert_eq!(rect.center(), egui::pos2(100.0, 50.0));
        assert!((rect.width() - (4.0 * 6.0 + 10.0)).abs() < 1e-4);
        assert_eq!(rect.height(), 20.0);
    }
}
