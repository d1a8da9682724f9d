//! Overlay frame abstraction
//!
//! `OverlayFrame` owns the window and handles what every repaint shares:
//! - Clearing to transparent
//! - The rounded background, either across the whole window or behind a
//!   single region (simple mode paints only behind the readout)
//! - Scaling calculations based on window dimensions
//!
//! The countdown overlay only decides what goes inside.

#![allow(clippy::too_many_arguments)]
use crate::manager::OverlayWindow;
use crate::platform::{OverlayConfig, PlatformError};
use crate::renderer::FontWeight;
use crate::utils::Bounds;
use crate::widgets::colors;
use tiny_skia::Color;

/// Base corner radius at the reference size
const BASE_CORNER_RADIUS: f32 = 10.0;

/// Scale of a `width` x `height` window against a reference size
///
/// Geometric mean of the two ratios, so stretching one axis grows content
/// less than growing both.
pub fn scale_for(width: f32, height: f32, base_width: f32, base_height: f32) -> f32 {
    if base_width <= 0.0 || base_height <= 0.0 {
        return 1.0;
    }
    ((width / base_width) * (height / base_height)).sqrt()
}

/// A frame wrapper around an overlay window that handles common rendering
pub struct OverlayFrame {
    window: OverlayWindow,
    base_width: f32,
    base_height: f32,
}

impl OverlayFrame {
    /// Create a new overlay frame
    ///
    /// `base_width`/`base_height` are the reference dimensions every layout
    /// constant is expressed at.
    pub fn new(
        config: OverlayConfig,
        base_width: f32,
        base_height: f32,
    ) -> Result<Self, PlatformError> {
        let window = OverlayWindow::new(config)?;

        Ok(Self {
            window,
            base_width,
            base_height,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scaling
    // ─────────────────────────────────────────────────────────────────────────

    pub fn scale_factor(&self) -> f32 {
        scale_for(
            self.window.width() as f32,
            self.window.height() as f32,
            self.base_width,
            self.base_height,
        )
    }

    /// Scale a base value by the current scale factor
    #[inline]
    pub fn scaled(&self, base_value: f32) -> f32 {
        base_value * self.scale_factor()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame rendering
    // ─────────────────────────────────────────────────────────────────────────

    /// Begin a new frame: clear, then paint `background` behind `area`
    ///
    /// `area` of `None` covers the whole window. Call this at the start of a
    /// repaint, draw content, then call `end_frame()`.
    pub fn begin_frame(&mut self, area: Option<Bounds>, background: Color) {
        let area = area.unwrap_or_else(|| {
            Bounds::new(
                0.0,
                0.0,
                self.window.width() as f32,
                self.window.height() as f32,
            )
        });
        let corner_radius = self.scaled(BASE_CORNER_RADIUS);

        self.window.clear(colors::transparent());
        if background.alpha() > 0.0 {
            self.window
                .fill_rounded_rect(area.x, area.y, area.w, area.h, corner_radius, background);
        }
    }

    /// End the frame: commit the buffer to the screen
    pub fn end_frame(&mut self) {
        self.window.commit();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Drawing helpers (delegate to window)
    // ─────────────────────────────────────────────────────────────────────────

    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
        self.window
            .draw_text(text, x, y, font_size, FontWeight::Normal, color);
    }

    pub fn draw_text_bold(&mut self, text: &str, x: f32, y: f32, font_size: f32, color: Color) {
        self.window
            .draw_text(text, x, y, font_size, FontWeight::Bold, color);
    }

    pub fn measure_text(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.window.measure_text(text, font_size, FontWeight::Normal)
    }

    pub fn measure_text_bold(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        self.window.measure_text(text, font_size, FontWeight::Bold)
    }

    /// Draw `text` centred inside `bounds` (baseline placed a third of the
    /// font size below the vertical centre)
    pub fn draw_text_centered(&mut self, text: &str, bounds: Bounds, font_size: f32, color: Color) {
        let (text_width, _) = self.measure_text(text, font_size);
        let x = bounds.x + (bounds.w - text_width) / 2.0;
        let y = bounds.y + bounds.h / 2.0 + font_size / 3.0;
        self.draw_text(text, x, y, font_size, color);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.window.fill_rect(x, y, w, h, color);
    }

    pub fn fill_rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        self.window.fill_rounded_rect(x, y, w, h, radius, color);
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
        self.window
            .stroke_rounded_rect(x, y, w, h, radius, stroke_width, color);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Window access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn window(&self) -> &OverlayWindow {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut OverlayWindow {
        &mut self.window
    }

    pub fn width(&self) -> u32 {
        self.window.width()
    }

    pub fn height(&self) -> u32 {
        self.window.height()
    }
}
