//! Flat push button

use crate::frame::OverlayFrame;
use crate::utils::Bounds;
use crate::widgets::colors::Palette;

/// A rounded, outlined button with a centred label
#[derive(Debug, Clone)]
pub struct Button<'a> {
    pub label: &'a str,
    pub bounds: Bounds,
    /// Draw the border only (used for the title-bar buttons)
    pub flat: bool,
}

impl<'a> Button<'a> {
    pub fn new(label: &'a str, bounds: Bounds) -> Self {
        Self {
            label,
            bounds,
            flat: false,
        }
    }

    pub fn flat(mut self) -> Self {
        self.flat = true;
        self
    }

    pub fn render(&self, frame: &mut OverlayFrame, palette: &Palette, font_size: f32) {
        let b = self.bounds;
        if b.w <= 0.0 || b.h <= 0.0 {
            return;
        }
        let radius = frame.scaled(5.0);
        if !self.flat {
            frame.fill_rounded_rect(b.x, b.y, b.w, b.h, radius, palette.button_bg);
            frame.stroke_rounded_rect(
                b.x + 0.5,
                b.y + 0.5,
                b.w - 1.0,
                b.h - 1.0,
                radius,
                1.0,
                palette.button_border,
            );
        }
        frame.draw_text_centered(self.label, b, font_size, palette.button_text);
    }
}
