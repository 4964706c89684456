//! Application state management structures.
//!
//! The editor core owns the scene and every interaction; this module holds
//! what only the desktop shell needs: persisted view settings, property-panel
//! drafts, the async file-operation channel and user notifications.

use crate::config::EditorConfig;
use crate::constants::APP_STATE_KEY;
use crate::editor::TopologyEditor;
use crate::types::{LabelId, NodeId};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Options for PNG/SVG export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Fill the image with white instead of leaving it transparent
    pub include_background: bool,
    /// Draw the background grid into the image
    pub include_grid: bool,
    /// Pixel scale of the PNG relative to the canvas
    pub png_scale: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_background: true,
            include_grid: false,
            png_scale: 1.0,
        }
    }
}

/// Shell settings persisted between runs under [`APP_STATE_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Use the dark egui theme
    pub dark_mode: bool,
    /// Draw the grid on the canvas
    pub show_grid: bool,
    /// Show the overview in the canvas corner
    pub show_minimap: bool,
    /// Image export choices
    pub export: ExportOptions,
    /// Editor tuning, applied at startup
    pub editor: EditorConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            show_grid: true,
            show_minimap: true,
            export: ExportOptions::default(),
            editor: EditorConfig::default(),
        }
    }
}

impl AppSettings {
    /// Serializes for the eframe storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses settings; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads settings from storage, falling back to defaults.
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        let Some(json) = storage.and_then(|s| s.get_string(APP_STATE_KEY)) else {
            return Self::default();
        };
        Self::from_json(&json).unwrap_or_else(|err| {
            log::warn!("ignoring unreadable app settings: {err}");
            Self::default()
        })
    }
}

/// Text typed into the property panel, applied on Enter or focus loss.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelDraft {
    /// Node the draft was loaded from
    pub node: Option<NodeId>,
    /// Device name being typed
    pub label: String,
    /// Device address being typed
    pub address: String,
    /// Label whose font size is being edited
    pub text_label: Option<LabelId>,
    /// Label font size being dragged
    pub font_size: f32,
}

/// Focus bookkeeping for the inline text field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextFieldState {
    /// Label whose field already received focus this session
    pub focused: Option<LabelId>,
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Routine outcome
    Info,
    /// Failed operation
    Error,
}

/// A transient message shown in the corner of the window.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Text shown
    pub message: String,
    /// Severity
    pub level: NotificationLevel,
    /// `egui` input time when it was raised; `None` until first shown
    pub shown_at: Option<f64>,
}

/// File operations waiting to be started on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingFileOperation {
    /// Pick a JSON file and replace the scene with it
    Open,
    /// Write the scene as JSON to a picked file
    ExportJson,
    /// Rasterize the scene to a picked PNG file
    ExportPng,
    /// Write the scene as SVG to a picked file
    ExportSvg,
    /// Write the scene to the eframe storage
    SaveToStorage,
    /// Replace the scene with the one in the eframe storage
    LoadFromStorage,
}

/// Messages sent from async file operations back to the app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// A file was picked and read: path and content
    Opened(String, String),
    /// The scene JSON was written at the given path
    SceneSaved(String),
    /// An image was written at the given path
    Saved(String),
    /// Operation failed with an error message
    Failed(String),
}

/// Actions that need confirmation when the scene has unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmAction {
    /// Replace the scene with an empty one
    New,
    /// Replace the scene with a file
    Open,
    /// Close the window
    Quit,
}

/// State related to file operations and unsaved-change handling.
pub struct FileState {
    /// Operation to start on the next frame
    pub pending: Option<PendingFileOperation>,
    /// Handed to async dialogs
    pub sender: Sender<FileOperationResult>,
    /// Drained every frame
    pub receiver: Receiver<FileOperationResult>,
    /// Path of the last opened or exported JSON file
    pub current_path: Option<String>,
    /// Action waiting on the unsaved-changes dialog
    pub pending_confirm: Option<PendingConfirmAction>,
    /// One-shot permission for the next window close request
    pub allow_close: bool,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            pending: None,
            sender,
            receiver,
            current_path: None,
            pending_confirm: None,
            allow_close: false,
        }
    }
}

/// The desktop application: an editor instance plus shell state.
pub struct TopologyApp {
    /// The diagram being edited
    pub editor: TopologyEditor,
    /// Persisted shell settings
    pub settings: AppSettings,
    /// Dialogs and unsaved-change state
    pub file: FileState,
    /// Property-panel text fields
    pub panel: PanelDraft,
    /// Inline text field focus
    pub text_field: TextFieldState,
    /// Messages on screen, oldest first
    pub notifications: Vec<Notification>,
    /// Top-left of the canvas in window coordinates, from the last frame
    pub canvas_origin: egui::Pos2,
}

impl Default for TopologyApp {
    fn default() -> Self {
        Self::with_settings(AppSettings::default())
    }
}

impl TopologyApp {
    /// Creates the app from persisted settings and restores the last saved scene.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load(cc.storage);
        let mut app = Self::with_settings(settings);
        app.editor
            .set_text_metrics(Box::new(super::canvas::EguiTextMetrics::new(cc.egui_ctx.clone())));
        if let Some(storage) = cc.storage {
            match app.editor.load_from_storage(storage) {
                Ok(()) => {
                    app.editor.reset_history();
                    log::info!("restored saved topology");
                }
                Err(crate::error::TopologyError::StorageEmpty) => {}
                Err(err) => log::warn!("could not restore saved topology: {err}"),
            }
        }
        app
    }

    /// Creates the app without storage or egui fonts, as tests do.
    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            editor: TopologyEditor::new(settings.editor.clone()),
            settings,
            file: FileState::default(),
            panel: PanelDraft::default(),
            text_field: TextFieldState::default(),
            notifications: Vec::new(),
            canvas_origin: egui::Pos2::ZERO,
        }
    }

    /// Shows and logs an informational message.
    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.notifications.push(Notification {
            message,
            level: NotificationLevel::Info,
            shown_at: None,
        });
    }

    /// Shows and logs an error.
    pub fn notify_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.notifications.push(Notification {
            message,
            level: NotificationLevel::Error,
            shown_at: None,
        });
    }
}
