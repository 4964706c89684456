//! # Viewport
//!
//! Zoom and pan of the editor canvas, and the conversion between screen
//! pixels and scene coordinates.
//!
//! Formula: `scene = screen / zoom - pan`, hence `screen = (scene + pan) * zoom`.
//! The pan offset is stored in scene units.

use eframe::egui;

/// Current camera state of one editor instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Scale factor: 1.0 is 100%, larger zooms in
    zoom: f32,
    /// Translation in scene units
    pub pan: egui::Vec2,
    min_zoom: f32,
    max_zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(crate::constants::MIN_ZOOM, crate::constants::MAX_ZOOM)
    }
}

impl Viewport {
    /// Creates an identity viewport whose zoom is kept within `[min_zoom, max_zoom]`.
    pub fn new(min_zoom: f32, max_zoom: f32) -> Self {
        Self {
            zoom: 1.0_f32.clamp(min_zoom, max_zoom),
            pan: egui::Vec2::ZERO,
            min_zoom,
            max_zoom,
        }
    }

    /// Current zoom factor.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Sets the zoom level directly, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Converts a screen position (pixels) to scene coordinates.
    pub fn screen_to_scene(&self, screen: egui::Pos2) -> egui::Pos2 {
        (screen.to_vec2() / self.zoom - self.pan).to_pos2()
    }

    /// Converts a scene position to screen pixels.
    pub fn scene_to_screen(&self, scene: egui::Pos2) -> egui::Pos2 {
        ((scene.to_vec2() + self.pan) * self.zoom).to_pos2()
    }

    /// Converts a scene rectangle to a screen rectangle.
    pub fn scene_rect_to_screen(&self, rect: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_max(self.scene_to_screen(rect.min), self.scene_to_screen(rect.max))
    }

    /// The part of the scene visible on a canvas of the given pixel size.
    pub fn visible_scene_rect(&self, canvas_size: egui::Vec2) -> egui::Rect {
        egui::Rect::from_min_max(
            self.screen_to_scene(egui::Pos2::ZERO),
            self.screen_to_scene(canvas_size.to_pos2()),
        )
    }

    /// Multiplies the zoom by `factor` while keeping the scene point under
    /// `anchor` (screen pixels) at the same screen position.
    ///
    /// Returns `false` when the zoom was already at the clamp limit.
    pub fn zoom_at(&mut self, anchor: egui::Pos2, factor: f32) -> bool {
        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - old_zoom).abs() <= f32::EPSILON {
            return false;
        }
        let scene_before = self.screen_to_scene(anchor);
        self.zoom = new_zoom;
        self.pan = anchor.to_vec2() / new_zoom - scene_before.to_vec2();
        true
    }

    /// Pans by a screen-space pixel delta.
    pub fn pan_by_screen(&mut self, delta_px: egui::Vec2) {
        self.pan += delta_px / self.zoom;
    }

    /// Back to 100% with no pan.
    pub fn reset(&mut self) {
        self.zoom = 1.0_f32.clamp(self.min_zoom, self.max_zoom);
        self.pan = egui::Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: egui::Pos2, b: egui::Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn screen_and_scene_are_inverse() {
        let mut vp = Viewport::default();
        vp.set_zoom(2.0);
        vp.pan = egui::vec2(10.0, -5.0);
        let p = egui::pos2(123.0, 45.0);
        assert!(approx(vp.scene_to_screen(vp.screen_to_scene(p)), p));
        assert_eq!(vp.screen_to_scene(egui::pos2(20.0, 10.0)), egui::pos2(0.0, 10.0));
    }

    #[test]
    fn zoom_at_keeps_anchor_fixed() {
        let mut vp = Viewport::default();
        let anchor = egui::pos2(50.0, 50.0);
        let scene_before = vp.screen_to_scene(anchor);

        assert!(vp.zoom_at(anchor, 1.2));

        assert!((vp.zoom() - 1.2).abs() < 1e-6);
        assert!(approx(vp.scene_to_screen(scene_before), anchor));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = Viewport::default();
        for _ in 0..100 {
            vp.zoom_at(egui::pos2(10.0, 10.0), 1.2);
        }
        assert_eq!(vp.zoom(), 5.0);
        assert!(!vp.zoom_at(egui::pos2(10.0, 10.0), 1.2));
        for _ in 0..100 {
            vp.zoom_at(egui::pos2(10.0, 10.0), 0.8);
        }
        assert!((vp.zoom() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn pan_is_divided_by_zoom() {
        let mut vp = Viewport::default();
        vp.set_zoom(2.0);
        vp.pan_by_screen(egui::vec2(10.0, 20.0));
        assert_eq!(vp.pan, egui::vec2(5.0, 10.0));
    }

    #[test]
    fn visible_rect_accounts_for_zoom_and_pan() {
        let mut vp = Viewport::default();
        vp.set_zoom(2.0);
        vp.pan = egui::vec2(-100.0, 0.0);
        let rect = vp.visible_scene_rect(egui::vec2(800.0, 600.0));
        assert_eq!(rect.min, egui::pos2(100.0, 0.0));
        assert_eq!(rect.max, egui::pos2(500.0, 300.0));
    }
}
