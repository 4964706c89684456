//! File operations: native dialogs for JSON/PNG/SVG and the eframe storage.
//!
//! Dialogs run on the tokio runtime entered by `main` and report back through
//! the [`FileState`](super::state::FileState) channel; results are applied on
//! the next frame.

use super::export::{render_list_to_svg, svg_to_png};
use super::state::{FileOperationResult, PendingFileOperation, TopologyApp};
use crate::render::{self, RenderOptions};
use eframe::egui;

impl TopologyApp {
    /// Applies finished async operations and starts the pending one.
    pub(super) fn handle_pending_operations(
        &mut self,
        ctx: &egui::Context,
        frame: &mut eframe::Frame,
    ) {
        while let Ok(result) = self.file.receiver.try_recv() {
            match result {
                FileOperationResult::Opened(path, content) => {
                    match self.editor.import_json(&content) {
                        Ok(()) => {
                            self.editor.mark_saved();
                            self.notify(format!("Opened {path}"));
                            self.file.current_path = Some(path);
                        }
                        Err(err) => self.notify_error(format!("Could not open {path}: {err}")),
                    }
                }
                FileOperationResult::SceneSaved(path) => {
                    self.editor.mark_saved();
                    self.notify(format!("Saved {path}"));
                    self.file.current_path = Some(path);
                }
                FileOperationResult::Saved(path) => self.notify(format!("Exported {path}")),
                FileOperationResult::Failed(error) => self.notify_error(error),
            }
        }

        let Some(operation) = self.file.pending.take() else {
            return;
        };
        match operation {
            PendingFileOperation::Open => self.spawn_open_dialog(ctx),
            PendingFileOperation::ExportJson => match self.editor.export_json() {
                Ok(json) => self.spawn_save_dialog(
                    ctx,
                    ("JSON", "json", "topology.json"),
                    json.into_bytes(),
                    FileOperationResult::SceneSaved,
                ),
                Err(err) => self.notify_error(format!("Export failed: {err}")),
            },
            PendingFileOperation::ExportSvg => {
                let svg = self.export_svg();
                self.spawn_save_dialog(
                    ctx,
                    ("SVG", "svg", "topology.svg"),
                    svg.into_bytes(),
                    FileOperationResult::Saved,
                );
            }
            PendingFileOperation::ExportPng => self.spawn_png_export(ctx),
            PendingFileOperation::SaveToStorage => match frame.storage_mut() {
                Some(storage) => match self.editor.save_to_storage(storage) {
                    Ok(()) => self.notify("Topology saved"),
                    Err(err) => self.notify_error(format!("Save failed: {err}")),
                },
                None => self.notify_error("No persistent storage available"),
            },
            PendingFileOperation::LoadFromStorage => match frame.storage() {
                Some(storage) => match self.editor.load_from_storage(storage) {
                    Ok(()) => self.notify("Topology loaded"),
                    Err(err) => self.notify_error(format!("Load failed: {err}")),
                },
                None => self.notify_error("No persistent storage available"),
            },
        }
    }

    /// The scene as it would be exported, at the current canvas size and viewport.
    pub(super) fn export_svg(&self) -> String {
        let options = RenderOptions::export(
            self.settings.export.include_background,
            self.settings.export.include_grid,
        );
        render_list_to_svg(&render::render_scene(&self.editor, &options))
    }

    fn spawn_open_dialog(&self, ctx: &egui::Context) {
        let ctx = ctx.clone();
        let sender = self.file.sender.clone();
        tokio::spawn(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("JSON", &["json"])
                .pick_file()
                .await
            {
                let path = handle.path();
                let result = match std::fs::read_to_string(path) {
                    Ok(content) => FileOperationResult::Opened(path.display().to_string(), content),
                    Err(e) => FileOperationResult::Failed(format!("Failed to read file: {e}")),
                };
                let _ = sender.send(result);
            }
            ctx.request_repaint();
        });
    }

    fn spawn_save_dialog(
        &self,
        ctx: &egui::Context,
        (filter, extension, file_name): (&'static str, &'static str, &'static str),
        bytes: Vec<u8>,
        on_success: fn(String) -> FileOperationResult,
    ) {
        let ctx = ctx.clone();
        let sender = self.file.sender.clone();
        tokio::spawn(async move {
            if let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter(filter, &[extension])
                .set_file_name(file_name)
                .save_file()
                .await
            {
                let path = handle.path();
                let result = match std::fs::write(path, bytes) {
                    Ok(()) => on_success(path.display().to_string()),
                    Err(e) => FileOperationResult::Failed(format!("Failed to save file: {e}")),
                };
                let _ = sender.send(result);
            }
            ctx.request_repaint();
        });
    }

    /// Rasterizes after the user picked a destination, off the UI thread.
    fn spawn_png_export(&self, ctx: &egui::Context) {
        let svg = self.export_svg();
        let scale = self.settings.export.png_scale;
        let ctx = ctx.clone();
        let sender = self.file.sender.clone();
        tokio::spawn(async move {
            let Some(handle) = rfd::AsyncFileDialog::new()
                .add_filter("PNG", &["png"])
                .set_file_name("topology.png")
                .save_file()
                .await
            else {
                return;
            };
            let path = handle.path().to_path_buf();
            let written = tokio::task::spawn_blocking(move || -> crate::error::Result<()> {
                let png = svg_to_png(&svg, scale)?;
                std::fs::write(&path, png)?;
                Ok(())
            })
            .await;
            let result = match written {
                Ok(Ok(())) => FileOperationResult::Saved(handle.path().display().to_string()),
                Ok(Err(err)) => FileOperationResult::Failed(format!("PNG export failed: {err}")),
                Err(err) => FileOperationResult::Failed(format!("PNG export task failed: {err}")),
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }
}
