//! # Topology Editor
//!
//! An editor for network topology diagrams: devices (routers, switches,
//! servers and so on) connected by links and annotated with free text labels,
//! drawn on a zoomable, pannable canvas.
//!
//! The crate has two layers:
//! - [`TopologyEditor`], a headless editor core that owns the scene, viewport,
//!   tool modes, selection and undo history and is driven by plain input events
//! - a desktop shell built on `eframe` that feeds it egui input and paints
//!   its [`render::RenderList`]
//!
//! ## Features
//! - Select, pan, zoom, link and text tools
//! - Drag-and-drop device toolbox and a property panel
//! - Snapshot undo/redo with a bounded history
//! - Alignment and grid arrangement
//! - Minimap overview
//! - JSON open/export, local save/load, PNG and SVG export

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod history;
pub mod hit_test;
pub mod render;
pub mod types;
mod ui;
pub mod viewport;

pub use config::EditorConfig;
pub use editor::{Alignment, LabelStyle, NodePatch, Selection, ToolMode, TopologyEditor};
pub use error::{Result, TopologyError};
pub use types::*;
pub use ui::{render_list_to_svg, svg_to_png, AppSettings, ExportOptions, TopologyApp};

/// Runs the topology editor window.
///
/// File dialogs are spawned onto tokio, so the caller must have entered a
/// tokio runtime.
///
/// # Example
///
/// ```no_run
/// fn main() -> Result<(), eframe::Error> {
///     let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
///     let _guard = runtime.enter();
///     topology_editor::run_app()
/// }
/// ```
pub fn run_app() -> std::result::Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Network Topology Editor")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Network Topology Editor",
        options,
        Box::new(|cc| Ok(Box::new(TopologyApp::new(cc)))),
    )
}
