//! Shared application-wide constants.
//! Centralizes tweakable values used across hit testing, rendering and interactions.
//! Most of them are defaults for [`crate::config::EditorConfig`].

// Hit testing
/// Radius (in scene units) around a node center that counts as a hit.
pub const NODE_RADIUS: f32 = 30.0;
/// Maximum distance (in scene units) from an edge segment that counts as a hit.
pub const EDGE_HIT_THRESHOLD: f32 = 8.0;
/// Padding (in scene units) around label text on each side.
pub const LABEL_PADDING: f32 = 6.0;

// Viewport
/// Smallest allowed zoom level.
pub const MIN_ZOOM: f32 = 0.1;
/// Largest allowed zoom level.
pub const MAX_ZOOM: f32 = 5.0;
/// Zoom multiplier for a primary click with the zoom tool.
pub const ZOOM_IN_STEP: f32 = 1.2;
/// Zoom multiplier for a secondary click with the zoom tool.
pub const ZOOM_OUT_STEP: f32 = 0.8;
/// Zoom multiplier per wheel notch towards the user.
pub const WHEEL_ZOOM_IN: f32 = 1.1;
/// Zoom multiplier per wheel notch away from the user.
pub const WHEEL_ZOOM_OUT: f32 = 0.9;

// Grid/drawing
/// Grid cell size in scene units.
pub const GRID_SIZE: f32 = 20.0;
/// Grids whose cells are smaller than this on screen are not drawn.
pub const MIN_GRID_SCREEN_SPACING: f32 = 4.0;
/// Radius of the status dot drawn on each node (scene units).
pub const STATUS_DOT_RADIUS: f32 = 6.0;
/// Radius of the connection endpoint markers (scene units).
pub const ENDPOINT_RADIUS: f32 = 4.0;

// Keyboard
/// Arrow-key nudge distance in scene units.
pub const NUDGE_STEP: f32 = 1.0;
/// Arrow-key nudge distance with Shift held.
pub const NUDGE_STEP_LARGE: f32 = 10.0;

// Editing
/// Text given to a freshly placed label before the user types anything.
pub const DEFAULT_LABEL_TEXT: &str = "Text";
/// Default font size for new labels.
pub const DEFAULT_LABEL_FONT_SIZE: f32 = 14.0;
/// Offset applied to duplicated nodes.
pub const DUPLICATE_OFFSET: f32 = 40.0;
/// Spacing between cells of the grid arrangement.
pub const ARRANGE_SPACING: f32 = 150.0;

// Minimap
/// Fixed pixel size of the miniature overview.
pub const MINIMAP_WIDTH: f32 = 200.0;
/// Fixed pixel size of the miniature overview.
pub const MINIMAP_HEIGHT: f32 = 140.0;

// Undo/redo
/// Maximum number of scene snapshots to retain.
pub const MAX_UNDO_HISTORY: usize = 50;

// Persistence
/// Storage key under which the scene is saved.
pub const STORAGE_KEY: &str = "network_topology";
/// Storage key under which the shell settings are saved.
pub const APP_STATE_KEY: &str = "app_state";
