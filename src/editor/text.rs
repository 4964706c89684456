//! Inline editing of text labels.
//!
//! While a session is open the label is flagged `is_editing`: it is not hit
//! tested and the renderer draws only its box, the shell places a text field
//! over it at [`TopologyEditor::text_overlay`]. The edited text lives in the
//! session buffer until the edit is committed.

use super::{Selection, TopologyEditor};
use crate::error::{Result, TopologyError};
use crate::types::{LabelId, TextLabel};
use eframe::egui;

/// An open inline edit.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditSession {
    /// Label being edited
    pub label: LabelId,
    /// Text as currently typed
    pub buffer: String,
    /// Label text when the session started
    original: String,
    /// The label was placed by this session and has never been committed
    is_new: bool,
}

impl TextEditSession {
    /// Whether the label was placed by this session.
    pub fn is_new(&self) -> bool {
        self.is_new
    }
}

/// Where the shell should put its text field, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOverlay {
    /// Label being edited
    pub label: LabelId,
    /// Field bounds
    pub rect: egui::Rect,
    /// Font size already multiplied by the zoom
    pub font_size: f32,
}

impl TopologyEditor {
    /// Opens an inline edit on an existing label.
    pub fn begin_text_edit(&mut self, id: LabelId) -> Result<()> {
        if self.text_edit.as_ref().is_some_and(|s| s.label == id) {
            return Ok(());
        }
        self.commit_text_edit();
        let label = self
            .topology
            .label_mut(id)
            .ok_or(TopologyError::UnknownLabel(id))?;
        label.is_editing = true;
        self.text_edit = Some(TextEditSession {
            label: id,
            buffer: label.text.clone(),
            original: label.text.clone(),
            is_new: false,
        });
        self.selection = Selection::Label(id);
        self.gesture = super::Gesture::Idle;
        Ok(())
    }

    /// Places a placeholder label at a scene position and opens an edit on it.
    ///
    /// The label is not committed to history until the edit is.
    pub fn start_new_label(&mut self, pos: egui::Pos2) -> LabelId {
        self.commit_text_edit();
        let id = self.allocate_label_id();
        let mut label = TextLabel::new(
            id,
            pos,
            self.config.default_label_text.clone(),
            self.config.default_label_font_size,
        );
        label.is_editing = true;
        self.topology.add_label(label);
        self.text_edit = Some(TextEditSession {
            label: id,
            buffer: String::new(),
            original: self.config.default_label_text.clone(),
            is_new: true,
        });
        self.selection = Selection::Label(id);
        id
    }

    /// The buffer of the open edit, for the shell's text field.
    pub fn edit_buffer_mut(&mut self) -> Option<&mut String> {
        self.text_edit.as_mut().map(|s| &mut s.buffer)
    }

    /// Replaces the text typed so far.
    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        if let Some(session) = self.text_edit.as_mut() {
            session.buffer = text.into();
        }
    }

    /// Ends the open edit keeping the typed text.
    ///
    /// Blank text (or the untouched placeholder) removes the label instead.
    /// Returns the label if it still exists afterwards.
    pub fn commit_text_edit(&mut self) -> Option<LabelId> {
        let session = self.text_edit.take()?;
        let text = session.buffer.trim().to_string();
        let Some(label) = self.topology.label_mut(session.label) else {
            log::warn!("text edit ended on missing label {}", session.label);
            return None;
        };
        label.is_editing = false;

        if text.is_empty() || text == self.config.default_label_text {
            self.topology.remove_label(session.label);
            self.prune_selection();
            if !session.is_new {
                log::info!("removed text label {} left blank", session.label);
                self.commit("remove blank label");
            }
            return None;
        }

        let changed = label.text != text;
        label.text = text;
        if session.is_new || changed {
            self.commit("edit label text");
        }
        Some(session.label)
    }

    /// Ends the open edit discarding the typed text.
    pub fn cancel_text_edit(&mut self) {
        let Some(session) = self.text_edit.take() else {
            return;
        };
        if session.is_new || session.original == self.config.default_label_text {
            self.topology.remove_label(session.label);
            self.prune_selection();
            if !session.is_new {
                self.commit("remove placeholder label");
            }
            return;
        }
        if let Some(label) = self.topology.label_mut(session.label) {
            label.is_editing = false;
            label.text = session.original;
        }
    }

    /// Screen placement of the inline text field, sized to the text being typed.
    pub fn text_overlay(&self) -> Option<TextOverlay> {
        let session = self.text_edit.as_ref()?;
        let label = self.topology.label(session.label)?;
        let shown = if session.buffer.is_empty() {
            &self.config.default_label_text
        } else {
            &session.buffer
        };
        let measured = TextLabel {
            text: shown.clone(),
            ..label.clone()
        };
        let rect = crate::hit_test::label_rect(
            &measured,
            self.metrics.as_ref(),
            self.config.label_padding,
        );
        Some(TextOverlay {
            label: session.label,
            rect: self.viewport.scene_rect_to_screen(rect),
            font_size: label.font_size * self.viewport.zoom(),
        })
    }
}
