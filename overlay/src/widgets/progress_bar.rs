//! Progress bar showing the share of the countdown still remaining

use tiny_skia::Color;

use crate::frame::OverlayFrame;
use crate::utils::Bounds;
use crate::widgets::colors::Palette;

/// A horizontal bar filled from the left in proportion to `progress`
#[derive(Debug, Clone)]
pub struct ProgressBar {
    pub progress: f32,
    pub fill_color: Color,
    pub bg_color: Color,
}

impl ProgressBar {
    pub fn new(progress: f32, palette: &Palette) -> Self {
        Self {
            progress: if progress.is_finite() {
                progress.clamp(0.0, 1.0)
            } else {
                0.0
            },
            fill_color: palette.progress_fill,
            bg_color: palette.progress_bg,
        }
    }

    /// Width of the filled part for a bar `width` wide
    pub fn fill_width(&self, width: f32) -> f32 {
        width * self.progress
    }

    pub fn render(&self, frame: &mut OverlayFrame, bounds: Bounds) {
        let radius = bounds.h / 2.0;
        frame.fill_rounded_rect(bounds.x, bounds.y, bounds.w, bounds.h, radius, self.bg_color);

        let fill_width = self.fill_width(bounds.w);
        // Below the corner diameter the rounded path degenerates
        if fill_width >= 1.0 {
            frame.fill_rounded_rect(
                bounds.x,
                bounds.y,
                fill_width,
                bounds.h,
                radius.min(fill_width / 2.0),
                self.fill_color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_clamped() {
        let palette = Palette::light();
        assert_eq!(ProgressBar::new(1.5, &palette).progress, 1.0);
        assert_eq!(ProgressBar::new(-0.2, &palette).progress, 0.0);
        assert_eq!(ProgressBar::new(f32::NAN, &palette).progress, 0.0);
    }

    #[test]
    fn test_fill_width() {
        let bar = ProgressBar::new(0.25, &Palette::dark());
        assert_eq!(bar.fill_width(200.0), 50.0);
    }
}
