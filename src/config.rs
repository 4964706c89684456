//! Tunable editor settings.

use crate::constants;
use serde::{Deserialize, Serialize};

/// Settings an editor instance is constructed with.
///
/// Every field falls back to its default from [`crate::constants`] when missing,
/// so persisted settings from older versions keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum number of snapshots kept by the undo history.
    pub history_cap: usize,
    /// Node hit radius in scene units.
    pub node_radius: f32,
    /// Edge hit distance in scene units.
    pub edge_hit_threshold: f32,
    /// Label padding in scene units.
    pub label_padding: f32,
    /// Smallest allowed zoom factor.
    pub min_zoom: f32,
    /// Largest allowed zoom factor.
    pub max_zoom: f32,
    /// Factor applied by the zoom tool and the zoom-in button.
    pub zoom_in_step: f32,
    /// Factor applied by a secondary zoom-tool click and the zoom-out button.
    pub zoom_out_step: f32,
    /// Factor applied per wheel step towards the user.
    pub wheel_zoom_in: f32,
    /// Factor applied per wheel step away from the user.
    pub wheel_zoom_out: f32,
    /// Arrow-key nudge distance.
    pub nudge_step: f32,
    /// Arrow-key nudge distance with Shift held.
    pub nudge_step_large: f32,
    /// Placeholder text of freshly placed labels.
    pub default_label_text: String,
    /// Font size of freshly placed labels.
    pub default_label_font_size: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_cap: constants::MAX_UNDO_HISTORY,
            node_radius: constants::NODE_RADIUS,
            edge_hit_threshold: constants::EDGE_HIT_THRESHOLD,
            label_padding: constants::LABEL_PADDING,
            min_zoom: constants::MIN_ZOOM,
            max_zoom: constants::MAX_ZOOM,
            zoom_in_step: constants::ZOOM_IN_STEP,
            zoom_out_step: constants::ZOOM_OUT_STEP,
            wheel_zoom_in: constants::WHEEL_ZOOM_IN,
            wheel_zoom_out: constants::WHEEL_ZOOM_OUT,
            nudge_step: constants::NUDGE_STEP,
            nudge_step_large: constants::NUDGE_STEP_LARGE,
            default_label_text: constants::DEFAULT_LABEL_TEXT.to_string(),
            default_label_font_size: constants::DEFAULT_LABEL_FONT_SIZE,
        }
    }
}

impl EditorConfig {
    /// Returns the default configuration with a different history cap.
    pub fn with_history_cap(cap: usize) -> Self {
        Self {
            history_cap: cap.max(1),
            ..Default::default()
        }
    }
}
