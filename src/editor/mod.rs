//! The topology editor instance.
//!
//! [`TopologyEditor`] owns everything one editable diagram needs: the scene,
//! the viewport, the active tool, the selection, the gesture in progress, the
//! id counters and the snapshot history. It knows nothing about windows or
//! painting; the shell feeds it pointer/keyboard events in screen pixels and
//! reads its state back to draw.
//!
//! # Module Organization
//!
//! - `input` - tool-mode state machine, pointer and keyboard handling
//! - `ops` - structural mutations, alignment, undo/redo, viewport commands
//! - `text` - inline text editing sessions and overlay placement
//! - `io` - JSON import/export and storage persistence

mod input;
mod io;
mod ops;
mod text;


pub use ops::{Alignment, LabelStyle, NodePatch};
pub use text::{TextEditSession, TextOverlay};

use crate::config::EditorConfig;
use crate::hit_test::{ApproxTextMetrics, Hit, TextMetrics};
use crate::history::History;
use crate::types::{EdgeId, LabelId, NodeId, Topology};
use crate::viewport::Viewport;
use eframe::egui;

/// The mutually exclusive tools of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Pick, drag and delete objects
    #[default]
    Select,
    /// Drag the canvas
    Pan,
    /// Click to zoom in, secondary click to zoom out
    Zoom,
    /// Click two nodes to connect them
    Link,
    /// Click to place or edit text labels
    Text,
}

impl ToolMode {
    /// Every tool, in toolbar order.
    pub const ALL: [ToolMode; 5] = [
        ToolMode::Select,
        ToolMode::Pan,
        ToolMode::Zoom,
        ToolMode::Link,
        ToolMode::Text,
    ];

    /// Toolbar label.
    pub fn display_name(self) -> &'static str {
        match self {
            ToolMode::Select => "Select",
            ToolMode::Pan => "Pan",
            ToolMode::Zoom => "Zoom",
            ToolMode::Link => "Link",
            ToolMode::Text => "Text",
        }
    }

    /// Cursor shown over the canvas; depends on nothing but the mode.
    pub fn cursor(self) -> egui::CursorIcon {
        match self {
            ToolMode::Select => egui::CursorIcon::Default,
            ToolMode::Pan => egui::CursorIcon::Grab,
            ToolMode::Zoom => egui::CursorIcon::ZoomIn,
            ToolMode::Link => egui::CursorIcon::Crosshair,
            ToolMode::Text => egui::CursorIcon::Text,
        }
    }
}

/// What is currently selected. At most one object at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected
    #[default]
    None,
    /// A device
    Node(NodeId),
    /// A text label
    Label(LabelId),
    /// A connection
    Edge(EdgeId),
}

impl Selection {
    /// The selected device, if a device is selected.
    pub fn node(self) -> Option<NodeId> {
        match self {
            Selection::Node(id) => Some(id),
            _ => None,
        }
    }

    /// The selected label, if a label is selected.
    pub fn label(self) -> Option<LabelId> {
        match self {
            Selection::Label(id) => Some(id),
            _ => None,
        }
    }

    /// The selected connection, if a connection is selected.
    pub fn edge(self) -> Option<EdgeId> {
        match self {
            Selection::Edge(id) => Some(id),
            _ => None,
        }
    }

    /// Whether nothing is selected.
    pub fn is_none(self) -> bool {
        matches!(self, Selection::None)
    }
}

impl From<Hit> for Selection {
    fn from(hit: Hit) -> Self {
        match hit {
            Hit::Label(id) => Selection::Label(id),
            Hit::Node(id) => Selection::Node(id),
            Hit::Edge(id) => Selection::Edge(id),
        }
    }
}

/// Object that can be dragged in select mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    /// A device, dragged by its center
    Node(NodeId),
    /// A text label, dragged by its anchor
    Label(LabelId),
}

/// Pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    Idle,
    Dragging {
        target: DragTarget,
        /// Object anchor minus pointer, in scene units
        grab_offset: egui::Vec2,
        moved: bool,
    },
    Panning {
        /// Last pointer position in screen pixels
        last: egui::Pos2,
    },
}

/// A connection being drawn in link mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkDraft {
    /// Node the link starts from
    pub source: NodeId,
    /// Floating endpoint following the pointer, in scene coordinates
    pub cursor: egui::Pos2,
}

/// A deletion waiting for the user's confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    /// Delete a device and its connections
    Node(NodeId),
    /// Delete a text label
    Label(LabelId),
    /// Delete a connection
    Edge(EdgeId),
}

/// Context menu opened by a secondary click in select mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenu {
    /// Where the menu opens, in canvas pixels
    pub screen_pos: egui::Pos2,
    /// Object the menu acts on
    pub target: Hit,
}

/// One editable topology diagram.
pub struct TopologyEditor {
    config: EditorConfig,
    topology: Topology,
    viewport: Viewport,
    tool: ToolMode,
    selection: Selection,
    gesture: Gesture,
    link_draft: Option<LinkDraft>,
    text_edit: Option<TextEditSession>,
    pending_delete: Option<DeleteTarget>,
    context_menu: Option<ContextMenu>,
    property_panel_open: bool,
    history: History<Topology>,
    next_node_id: u64,
    next_edge_id: u64,
    next_label_id: u64,
    canvas_size: egui::Vec2,
    metrics: Box<dyn TextMetrics>,
    dirty: bool,
}

impl Default for TopologyEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for TopologyEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologyEditor")
            .field("tool", &self.tool)
            .field("selection", &self.selection)
            .field("nodes", &self.topology.devices.len())
            .field("edges", &self.topology.connections.len())
            .field("labels", &self.topology.text_labels.len())
            .finish_non_exhaustive()
    }
}

impl TopologyEditor {
    /// Creates an editor with an empty scene. The empty scene is the first history entry.
    pub fn new(config: EditorConfig) -> Self {
        let mut history = History::new(config.history_cap);
        let topology = Topology::new();
        history.commit(&topology);
        Self {
            viewport: Viewport::new(config.min_zoom, config.max_zoom),
            config,
            topology,
            tool: ToolMode::default(),
            selection: Selection::None,
            gesture: Gesture::Idle,
            link_draft: None,
            text_edit: None,
            pending_delete: None,
            context_menu: None,
            property_panel_open: false,
            history,
            next_node_id: 1,
            next_edge_id: 1,
            next_label_id: 1,
            canvas_size: egui::vec2(800.0, 600.0),
            metrics: Box::new(ApproxTextMetrics),
            dirty: false,
        }
    }

    /// Settings the editor was created with.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The live scene, including any label being edited.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Current zoom and pan.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Active tool.
    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    /// Current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Connection being drawn, in link mode.
    pub fn link_draft(&self) -> Option<&LinkDraft> {
        self.link_draft.as_ref()
    }

    /// Open inline edit, if any.
    pub fn text_edit(&self) -> Option<&TextEditSession> {
        self.text_edit.as_ref()
    }

    /// Deletion waiting for confirmation.
    pub fn pending_delete(&self) -> Option<DeleteTarget> {
        self.pending_delete
    }

    /// Open context menu, if any.
    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    /// Dismisses the context menu.
    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    /// Whether the shell should show the property panel.
    pub fn property_panel_open(&self) -> bool {
        self.property_panel_open
    }

    /// Shows the property panel for the current selection, if any.
    pub fn open_property_panel(&mut self) {
        self.property_panel_open = !self.selection.is_none();
    }

    /// Hides the property panel.
    pub fn close_property_panel(&mut self) {
        self.property_panel_open = false;
    }

    /// Undo history of settled scenes.
    pub fn history(&self) -> &History<Topology> {
        &self.history
    }

    /// Object currently being dragged, if any.
    pub fn dragging(&self) -> Option<DragTarget> {
        match self.gesture {
            Gesture::Dragging { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Whether a pan drag is in progress.
    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    /// Drawing surface size in pixels.
    pub fn canvas_size(&self) -> egui::Vec2 {
        self.canvas_size
    }

    /// Updates the drawing surface size, e.g. after a window resize.
    pub fn set_canvas_size(&mut self, size: egui::Vec2) {
        self.canvas_size = size;
    }

    /// Text measurer used for label hit boxes.
    pub fn text_metrics(&self) -> &dyn TextMetrics {
        self.metrics.as_ref()
    }

    /// Replaces the text measurer used for label hit boxes.
    pub fn set_text_metrics(&mut self, metrics: Box<dyn TextMetrics>) {
        self.metrics = metrics;
    }

    /// Whether the scene changed since it was last saved or loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the unsaved-changes flag.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Scene position of a screen position under the current viewport.
    pub fn screen_to_scene(&self, screen: egui::Pos2) -> egui::Pos2 {
        self.viewport.screen_to_scene(screen)
    }

    /// Screen position of a scene position under the current viewport.
    pub fn scene_to_screen(&self, scene: egui::Pos2) -> egui::Pos2 {
        self.viewport.scene_to_screen(scene)
    }

    /// Top-priority object at a scene position.
    pub fn hit(&self, scene: egui::Pos2) -> Option<Hit> {
        crate::hit_test::pick(&self.topology, scene, self.metrics.as_ref(), &self.config)
    }

    /// Screen-space box of a label, using the same projection as hit testing.
    pub fn label_screen_rect(&self, id: LabelId) -> Option<egui::Rect> {
        let label = self.topology.label(id)?;
        let rect =
            crate::hit_test::label_rect(label, self.metrics.as_ref(), self.config.label_padding);
        Some(self.viewport.scene_rect_to_screen(rect))
    }

    /// The scene as it would be with no inline edit open.
    ///
    /// A label placed by an uncommitted edit is left out and every label is
    /// flagged as not editing; an edited label keeps its committed text.
    pub fn settled_topology(&self) -> Topology {
        let mut topology = self.topology.clone();
        if let Some(session) = self.text_edit.as_ref().filter(|s| s.is_new()) {
            topology.remove_label(session.label);
        }
        for label in &mut topology.text_labels {
            label.is_editing = false;
        }
        topology
    }

    /// Records the current scene as a new history entry.
    fn commit(&mut self, reason: &str) {
        self.history.commit(&self.settled_topology());
        self.dirty = true;
        log::debug!(
            "committed snapshot ({reason}); history {}/{}",
            self.history.len(),
            self.history.cap()
        );
    }

    /// Drops every in-progress interaction and the selection.
    fn reset_interaction(&mut self) {
        self.selection = Selection::None;
        self.gesture = Gesture::Idle;
        self.link_draft = None;
        self.pending_delete = None;
        self.context_menu = None;
        self.property_panel_open = false;
    }

    /// Clears the selection if it refers to an object that no longer exists.
    fn prune_selection(&mut self) {
        let exists = match self.selection {
            Selection::None => true,
            Selection::Node(id) => self.topology.node(id).is_some(),
            Selection::Label(id) => self.topology.label(id).is_some(),
            Selection::Edge(id) => self.topology.edge(id).is_some(),
        };
        if !exists {
            self.selection = Selection::None;
            self.property_panel_open = false;
        }
    }

    fn allocate_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    fn allocate_label_id(&mut self) -> LabelId {
        let id = LabelId(self.next_label_id);
        self.next_label_id += 1;
        id
    }

    fn current_edge_id(&self) -> EdgeId {
        EdgeId(self.next_edge_id)
    }
}
