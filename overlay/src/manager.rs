//! Overlay window: a platform window paired with its renderer
//!
//! `OverlayWindow` is the only type that touches both the native window and
//! the software renderer; everything above it draws through these methods.

use meetclock_core::Geometry;

use crate::platform::{NativeOverlay, OverlayConfig, OverlayPlatform, PlatformError};
use crate::renderer::{self, FontWeight, Renderer, Surface};
use crate::utils::Bounds;
use tiny_skia::Color;

/// A managed overlay window with its own renderer
pub struct OverlayWindow {
    platform: NativeOverlay,
    renderer: Renderer,
}

impl OverlayWindow {
    /// Create a new overlay window
    pub fn new(config: OverlayConfig) -> Result<Self, PlatformError> {
        let platform = NativeOverlay::new(config)?;
        let renderer = Renderer::new();

        Ok(Self { platform, renderer })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Geometry
    // ─────────────────────────────────────────────────────────────────────────

    pub fn width(&self) -> u32 {
        self.platform.width()
    }

    pub fn height(&self) -> u32 {
        self.platform.height()
    }

    pub fn x(&self) -> i32 {
        self.platform.x()
    }

    pub fn y(&self) -> i32 {
        self.platform.y()
    }

    pub fn geometry(&self) -> Geometry {
        self.platform.geometry()
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.platform.set_geometry(geometry);
    }

    /// True once after the user moved or resized the window
    pub fn take_geometry_dirty(&mut self) -> bool {
        self.platform.take_geometry_dirty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Window state
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_visible(&mut self, visible: bool) {
        self.platform.set_visible(visible);
    }

    pub fn is_visible(&self) -> bool {
        self.platform.is_visible()
    }

    pub fn set_topmost(&mut self, topmost: bool) {
        self.platform.set_topmost(topmost);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// Poll for events (non-blocking)
    /// Returns false if the window should close
    pub fn poll_events(&mut self) -> bool {
        self.platform.poll_events()
    }

    /// Take a pending click position in window coordinates
    pub fn take_click(&mut self) -> Option<(f32, f32)> {
        self.platform.take_click()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drawing
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `draw` against the current pixel buffer, if there is one
    fn paint(&mut self, draw: impl FnOnce(&mut Renderer, &mut Surface)) {
        let (width, height) = (self.platform.width(), self.platform.height());
        if let Some(buffer) = self.platform.pixel_buffer() {
            draw(&mut self.renderer, &mut Surface::new(buffer, width, height));
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.paint(|_, surface| renderer::clear(surface, color));
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let area = Bounds::new(x, y, w, h);
        self.paint(|_, surface| renderer::fill_rect(surface, area, color));
    }

    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        let area = Bounds::new(x, y, w, h);
        self.paint(|_, surface| renderer::fill_rounded_rect(surface, area, radius, color));
    }

    pub fn stroke_rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        stroke_width: f32,
        color: Color,
    ) {
        let area = Bounds::new(x, y, w, h);
        self.paint(|_, surface| {
            renderer::stroke_rounded_rect(surface, area, radius, stroke_width, color)
        });
    }

    /// Draw text with its baseline at `y`
    pub fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        weight: FontWeight,
        color: Color,
    ) {
        self.paint(|renderer, surface| {
            renderer.draw_text(surface, text, x, y, font_size, weight, color)
        });
    }

    /// Measure text dimensions
    pub fn measure_text(&mut self, text: &str, font_size: f32, weight: FontWeight) -> (f32, f32) {
        self.renderer.measure_text(text, font_size, weight)
    }

    /// Commit the current frame to the screen
    pub fn commit(&mut self) {
        self.platform.commit();
    }
}
