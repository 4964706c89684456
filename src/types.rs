//! Core data types of the topology scene.
//!
//! This module defines the scene graph the editor works on: devices (nodes),
//! connections (edges) and free-floating text labels, plus the [`Topology`]
//! container that is snapshotted for undo and serialized for save/export.

use crate::error::{Result, TopologyError};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! scene_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

scene_id!(
    /// Unique identifier of a device node.
    NodeId
);
scene_id!(
    /// Unique identifier of a connection.
    EdgeId
);
scene_id!(
    /// Unique identifier of a text label.
    LabelId
);

/// The kind of network device a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Router
    Router,
    /// Switch
    Switch,
    /// Server
    Server,
    /// Firewall
    Firewall,
    /// Database
    Database,
    /// Cloud service
    Cloud,
    /// Workstation
    Workstation,
    /// Anything the editor does not know how to draw specially.
    #[serde(other)]
    Other,
}

impl NodeKind {
    /// All kinds offered in the device toolbox, in display order.
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Router,
        NodeKind::Switch,
        NodeKind::Server,
        NodeKind::Firewall,
        NodeKind::Database,
        NodeKind::Cloud,
        NodeKind::Workstation,
        NodeKind::Other,
    ];

    /// Human readable name, also used as the default node label.
    pub fn display_name(self) -> &'static str {
        match self {
            NodeKind::Router => "Router",
            NodeKind::Switch => "Switch",
            NodeKind::Server => "Server",
            NodeKind::Firewall => "Firewall",
            NodeKind::Database => "Database",
            NodeKind::Cloud => "Cloud",
            NodeKind::Workstation => "Workstation",
            NodeKind::Other => "Device",
        }
    }

    /// Short glyph drawn inside the node circle.
    pub fn glyph(self) -> &'static str {
        match self {
            NodeKind::Router => "R",
            NodeKind::Switch => "SW",
            NodeKind::Server => "SV",
            NodeKind::Firewall => "FW",
            NodeKind::Database => "DB",
            NodeKind::Cloud => "CL",
            NodeKind::Workstation => "PC",
            NodeKind::Other => "?",
        }
    }

    /// Fill color of the node circle.
    pub fn color(self) -> egui::Color32 {
        match self {
            NodeKind::Router => egui::Color32::from_rgb(74, 144, 226),
            NodeKind::Switch => egui::Color32::from_rgb(80, 200, 120),
            NodeKind::Server => egui::Color32::from_rgb(245, 166, 35),
            NodeKind::Firewall => egui::Color32::from_rgb(208, 2, 27),
            NodeKind::Database => egui::Color32::from_rgb(144, 19, 254),
            NodeKind::Cloud => egui::Color32::from_rgb(80, 227, 194),
            NodeKind::Workstation => egui::Color32::from_rgb(139, 87, 42),
            NodeKind::Other => egui::Color32::from_rgb(155, 155, 155),
        }
    }
}

/// Operational status shown as a small colored dot on the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Reachable and healthy
    #[default]
    Online,
    /// Unreachable
    Offline,
    /// Degraded
    Warning,
    /// Failing
    Error,
}

impl NodeStatus {
    /// Every status, in menu order.
    pub const ALL: [NodeStatus; 4] = [
        NodeStatus::Online,
        NodeStatus::Offline,
        NodeStatus::Warning,
        NodeStatus::Error,
    ];

    /// Name shown in menus.
    pub fn display_name(self) -> &'static str {
        match self {
            NodeStatus::Online => "Online",
            NodeStatus::Offline => "Offline",
            NodeStatus::Warning => "Warning",
            NodeStatus::Error => "Error",
        }
    }

    /// Color of the status dot.
    pub fn color(self) -> egui::Color32 {
        match self {
            NodeStatus::Online => egui::Color32::from_rgb(82, 196, 26),
            NodeStatus::Offline => egui::Color32::from_rgb(140, 140, 140),
            NodeStatus::Warning => egui::Color32::from_rgb(250, 173, 20),
            NodeStatus::Error => egui::Color32::from_rgb(245, 34, 45),
        }
    }
}

/// Physical or logical medium of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Copper ethernet
    #[default]
    Ethernet,
    /// Optical fiber
    Fiber,
    /// Drawn dashed
    Wireless,
    /// Drawn dashed
    Vpn,
}

impl EdgeKind {
    /// Every connection type, in menu order.
    pub const ALL: [EdgeKind; 4] = [
        EdgeKind::Ethernet,
        EdgeKind::Fiber,
        EdgeKind::Wireless,
        EdgeKind::Vpn,
    ];

    /// Name shown in menus.
    pub fn display_name(self) -> &'static str {
        match self {
            EdgeKind::Ethernet => "Ethernet",
            EdgeKind::Fiber => "Fiber",
            EdgeKind::Wireless => "Wireless",
            EdgeKind::Vpn => "VPN",
        }
    }

    /// Stroke color of the connection.
    pub fn color(self) -> egui::Color32 {
        match self {
            EdgeKind::Ethernet => egui::Color32::from_rgb(102, 102, 102),
            EdgeKind::Fiber => egui::Color32::from_rgb(250, 140, 22),
            EdgeKind::Wireless => egui::Color32::from_rgb(24, 144, 255),
            EdgeKind::Vpn => egui::Color32::from_rgb(114, 46, 209),
        }
    }

    /// Wireless and tunnelled links are drawn dashed.
    pub fn is_dashed(self) -> bool {
        matches!(self, EdgeKind::Wireless | EdgeKind::Vpn)
    }
}

/// A color stored as a `#rrggbb` / `#rrggbbaa` string in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub egui::Color32);

impl HexColor {
    /// Default label text color.
    pub const BLACK: HexColor = HexColor(egui::Color32::from_rgb(51, 51, 51));
    /// Default label background.
    pub const WHITE: HexColor = HexColor(egui::Color32::WHITE);
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let hex = value.trim().trim_start_matches('#');
        let byte = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| format!("invalid color '{value}'"))
        };
        match hex.len() {
            6 => Ok(HexColor(egui::Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?))),
            8 => Ok(HexColor(egui::Color32::from_rgba_unmultiplied(
                byte(0)?,
                byte(2)?,
                byte(4)?,
                byte(6)?,
            ))),
            _ => Err(format!("invalid color '{value}'")),
        }
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        let [r, g, b, a] = color.0.to_srgba_unmultiplied();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// A network device placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique within the session
    pub id: NodeId,
    /// What kind of device this is
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Center position in scene coordinates
    pub x: f32,
    /// Scene y coordinate
    pub y: f32,
    /// Name drawn beneath the node
    #[serde(default)]
    pub label: String,
    /// Management address (free text, usually an IP)
    #[serde(default)]
    pub address: String,
    /// Health shown by the status dot
    #[serde(default)]
    pub status: NodeStatus,
}

impl Node {
    /// Creates a node of the given kind, labelled after the kind.
    pub fn new(id: NodeId, kind: NodeKind, pos: egui::Pos2) -> Self {
        Self {
            id,
            kind,
            x: pos.x,
            y: pos.y,
            label: format!("{}-{}", kind.display_name(), id.0),
            address: String::new(),
            status: NodeStatus::default(),
        }
    }

    /// Center in scene coordinates.
    pub fn pos(&self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }

    /// Moves it to a scene position.
    pub fn set_pos(&mut self, pos: egui::Pos2) {
        self.x = pos.x;
        self.y = pos.y;
    }
}

/// A link between two devices. Direction is kept but ignored for duplicate checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique within the session
    pub id: EdgeId,
    /// Node the link was drawn from
    pub from_node_id: NodeId,
    /// Node the link was drawn to
    pub to_node_id: NodeId,
    /// Link medium
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
}

impl Edge {
    /// Whether this edge touches the given node.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from_node_id == node || self.to_node_id == node
    }

    /// Whether this edge joins `a` and `b`, in either direction.
    pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
        (self.from_node_id == a && self.to_node_id == b)
            || (self.from_node_id == b && self.to_node_id == a)
    }
}

/// A free-floating piece of text on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLabel {
    /// Unique within the session
    pub id: LabelId,
    /// Center position in scene coordinates
    pub x: f32,
    /// Scene y coordinate
    pub y: f32,
    /// Committed text
    pub text: String,
    /// Font size in scene units
    pub font_size: f32,
    /// Text color
    pub color: HexColor,
    /// Box fill
    pub background_color: HexColor,
    /// Set while the inline editor owns this label
    #[serde(default)]
    pub is_editing: bool,
}

impl TextLabel {
    /// A label that is not being edited.
    pub fn new(id: LabelId, pos: egui::Pos2, text: impl Into<String>, font_size: f32) -> Self {
        Self {
            id,
            x: pos.x,
            y: pos.y,
            text: text.into(),
            font_size,
            color: HexColor::BLACK,
            background_color: HexColor::WHITE,
            is_editing: false,
        }
    }

    /// Anchor, the center of the label box.
    pub fn pos(&self) -> egui::Pos2 {
        egui::pos2(self.x, self.y)
    }

    /// Moves it to a scene position.
    pub fn set_pos(&mut self, pos: egui::Pos2) {
        self.x = pos.x;
        self.y = pos.y;
    }
}

/// The whole scene graph: what gets snapshotted, saved and exported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    /// Devices in creation (and drawing) order
    #[serde(default)]
    pub devices: Vec<Node>,
    /// Connections in creation order
    #[serde(default)]
    pub connections: Vec<Edge>,
    /// Text labels in creation order
    #[serde(default)]
    pub text_labels: Vec<TextLabel>,
}

impl Topology {
    /// Creates a new empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the topology to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a topology from a JSON string.
    ///
    /// Connections whose endpoints are missing are dropped and labels are
    /// reset to non-editing, so the result always satisfies the scene invariants.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut topology: Topology = serde_json::from_str(json)?;
        let before = topology.connections.len();
        let devices = &topology.devices;
        topology.connections.retain(|edge| {
            edge.from_node_id != edge.to_node_id
                && devices.iter().any(|n| n.id == edge.from_node_id)
                && devices.iter().any(|n| n.id == edge.to_node_id)
        });
        let dropped = before - topology.connections.len();
        if dropped > 0 {
            log::warn!("dropped {dropped} connection(s) with missing endpoints while loading");
        }
        for label in &mut topology.text_labels {
            label.is_editing = false;
        }
        Ok(topology)
    }

    /// No devices, connections or labels.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.connections.is_empty() && self.text_labels.is_empty()
    }

    /// Device by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.devices.iter().find(|n| n.id == id)
    }

    /// Mutable device by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.devices.iter_mut().find(|n| n.id == id)
    }

    /// Connection by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.connections.iter().find(|e| e.id == id)
    }

    /// Mutable connection by id.
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.connections.iter_mut().find(|e| e.id == id)
    }

    /// Text label by id.
    pub fn label(&self, id: LabelId) -> Option<&TextLabel> {
        self.text_labels.iter().find(|l| l.id == id)
    }

    /// Mutable text label by id.
    pub fn label_mut(&mut self, id: LabelId) -> Option<&mut TextLabel> {
        self.text_labels.iter_mut().find(|l| l.id == id)
    }

    /// Adds a node to the topology.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.devices.push(node);
        id
    }

    /// Whether `a` and `b` are connected, in either direction.
    pub fn has_edge_between(&self, a: NodeId, b: NodeId) -> bool {
        self.connections.iter().any(|e| e.joins(a, b))
    }

    /// Adds a connection between two existing, distinct, not yet connected nodes.
    pub fn add_connection(&mut self, edge: Edge) -> Result<EdgeId> {
        let (from, to) = (edge.from_node_id, edge.to_node_id);
        if self.node(from).is_none() {
            return Err(TopologyError::UnknownNode(from));
        }
        if self.node(to).is_none() {
            return Err(TopologyError::UnknownNode(to));
        }
        if from == to {
            return Err(TopologyError::SelfLoop(from));
        }
        if self.has_edge_between(from, to) {
            return Err(TopologyError::DuplicateEdge(from, to));
        }
        let id = edge.id;
        self.connections.push(edge);
        Ok(id)
    }

    /// Removes a node and every connection touching it.
    ///
    /// Returns the removed node, or `None` if it didn't exist.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let index = self.devices.iter().position(|n| n.id == id)?;
        let node = self.devices.remove(index);
        self.connections.retain(|e| !e.touches(id));
        Some(node)
    }

    /// Removes one connection.
    pub fn remove_connection(&mut self, id: EdgeId) -> Option<Edge> {
        let index = self.connections.iter().position(|e| e.id == id)?;
        Some(self.connections.remove(index))
    }

    /// Appends a label on top of the others.
    pub fn add_label(&mut self, label: TextLabel) -> LabelId {
        let id = label.id;
        self.text_labels.push(label);
        id
    }

    /// Removes one label.
    pub fn remove_label(&mut self, id: LabelId) -> Option<TextLabel> {
        let index = self.text_labels.iter().position(|l| l.id == id)?;
        Some(self.text_labels.remove(index))
    }

    /// Smallest node id guaranteed not to clash with any existing node.
    pub fn next_node_id(&self) -> u64 {
        self.devices.iter().map(|n| n.id.0).max().map_or(1, |m| m + 1)
    }

    /// Smallest edge id guaranteed not to clash.
    pub fn next_edge_id(&self) -> u64 {
        self.connections.iter().map(|e| e.id.0).max().map_or(1, |m| m + 1)
    }

    /// Smallest label id guaranteed not to clash.
    pub fn next_label_id(&self) -> u64 {
        self.text_labels.iter().map(|l| l.id.0).max().map_or(1, |m| m + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, x: f32, y: f32) -> Node {
        Node::new(NodeId(id), NodeKind::Router, egui::pos2(x, y))
    }

    fn edge(id: u64, from: u64, to: u64) -> Edge {
        Edge {
            id: EdgeId(id),
            from_node_id: NodeId(from),
            to_node_id: NodeId(to),
            kind: EdgeKind::Ethernet,
        }
    }

    fn three_nodes() -> Topology {
        let mut topology = Topology::new();
        topology.add_node(node(1, 0.0, 0.0));
        topology.add_node(node(2, 100.0, 0.0));
        topology.add_node(node(3, 200.0, 0.0));
        topology
    }

    #[test]
    fn test_node_default_label_uses_kind_and_id() {
        let n = Node::new(NodeId(7), NodeKind::Server, egui::pos2(1.0, 2.0));
        assert_eq!(n.label, "Server-7");
        assert_eq!(n.pos(), egui::pos2(1.0, 2.0));
        assert_eq!(n.status, NodeStatus::Online);
    }

    #[test]
    fn test_add_connection_rejects_unknown_endpoints() {
        let mut topology = three_nodes();
        let err = topology.add_connection(edge(1, 9, 1)).unwrap_err();
        assert!(matches!(err, TopologyError::UnknownNode(NodeId(9))));
        let err = topology.add_connection(edge(1, 1, 9)).unwrap_err();
        assert!(matches!(err, TopologyError::UnknownNode(NodeId(9))));
        assert!(topology.connections.is_empty());
    }

    #[test]
    fn test_add_connection_rejects_self_loop() {
        let mut topology = three_nodes();
        let err = topology.add_connection(edge(1, 2, 2)).unwrap_err();
        assert!(matches!(err, TopologyError::SelfLoop(NodeId(2))));
    }

    #[test]
    fn test_add_connection_rejects_reverse_duplicate() {
        let mut topology = three_nodes();
        topology.add_connection(edge(1, 1, 2)).unwrap();
        let err = topology.add_connection(edge(2, 2, 1)).unwrap_err();
        assert!(matches!(err, TopologyError::DuplicateEdge(_, _)));
        assert_eq!(topology.connections.len(), 1);
    }

    #[test]
    fn test_remove_node_cascades_only_incident_edges() {
        let mut topology = three_nodes();
        topology.add_connection(edge(1, 1, 2)).unwrap();
        topology.add_connection(edge(2, 2, 3)).unwrap();
        topology.add_connection(edge(3, 1, 3)).unwrap();

        let removed = topology.remove_node(NodeId(2));

        assert_eq!(removed.map(|n| n.id), Some(NodeId(2)));
        assert_eq!(topology.connections.len(), 1);
        assert_eq!(topology.connections[0].id, EdgeId(3));
    }

    #[test]
    fn test_remove_nonexistent_node() {
        let mut topology = three_nodes();
        assert!(topology.remove_node(NodeId(42)).is_none());
        assert_eq!(topology.devices.len(), 3);
    }

    #[test]
    fn test_json_layout_uses_dashboard_field_names() {
        let mut topology = three_nodes();
        topology.add_connection(edge(1, 1, 2)).unwrap();
        topology.add_label(TextLabel::new(LabelId(1), egui::pos2(5.0, 5.0), "core", 14.0));

        let value: serde_json::Value = serde_json::from_str(&topology.to_json().unwrap()).unwrap();

        assert_eq!(value["devices"][0]["type"], "router");
        assert_eq!(value["connections"][0]["fromNodeId"], 1);
        assert_eq!(value["connections"][0]["toNodeId"], 2);
        assert_eq!(value["textLabels"][0]["fontSize"], 14.0);
        assert_eq!(value["textLabels"][0]["backgroundColor"], "#ffffff");
        assert_eq!(value["textLabels"][0]["isEditing"], false);
    }

    #[test]
    fn test_from_json_drops_dangling_edges_and_editing_flags() {
        let json = r##"{
            "devices": [{"id": 4, "type": "switch", "x": 0, "y": 0}],
            "connections": [{"id": 1, "fromNodeId": 4, "toNodeId": 5}],
            "textLabels": [{"id": 2, "x": 1, "y": 1, "text": "a", "fontSize": 12,
                            "color": "#000000", "backgroundColor": "#ffffffcc", "isEditing": true}]
        }"##;

        let topology = Topology::from_json(json).unwrap();

        assert_eq!(topology.devices[0].kind, NodeKind::Switch);
        assert!(topology.connections.is_empty());
        assert!(!topology.text_labels[0].is_editing);
        assert_eq!(topology.text_labels[0].background_color.0.a(), 0xcc);
    }

    #[test]
    fn test_unknown_device_type_maps_to_other() {
        let json = r#"{"devices": [{"id": 1, "type": "toaster", "x": 0, "y": 0}]}"#;
        let topology = Topology::from_json(json).unwrap();
        assert_eq!(topology.devices[0].kind, NodeKind::Other);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Topology::from_json("{ not json"),
            Err(TopologyError::Json(_))
        ));
    }

    #[test]
    fn test_next_ids_follow_max_existing() {
        let mut topology = Topology::new();
        assert_eq!(topology.next_node_id(), 1);
        topology.add_node(node(3, 0.0, 0.0));
        topology.add_node(node(10, 0.0, 0.0));
        assert_eq!(topology.next_node_id(), 11);
        assert_eq!(topology.next_edge_id(), 1);
        assert_eq!(topology.next_label_id(), 1);
    }

    #[test]
    fn test_hex_color_parsing() {
        let c = HexColor::try_from("#1890ff".to_string()).unwrap();
        assert_eq!(c.0, egui::Color32::from_rgb(0x18, 0x90, 0xff));
        assert_eq!(String::from(c), "#1890ff");
        assert!(HexColor::try_from("blue".to_string()).is_err());
    }
}
