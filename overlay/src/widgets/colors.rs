//! Theme palettes
//!
//! Colours are resolved once per theme change; widgets only ever read from a
//! [`Palette`].

use meetclock_core::types::Theme;
use tiny_skia::Color;

#[inline]
pub fn transparent() -> Color {
    Color::from_rgba8(0, 0, 0, 0)
}

#[inline]
pub fn white() -> Color {
    Color::from_rgba8(255, 255, 255, 255)
}

/// Every colour the countdown overlay paints with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Window background in normal mode (opaque)
    pub background: Color,
    /// Readout background in simple mode; alpha is replaced by the opacity
    pub simple_background: Color,
    pub readout: Color,
    pub label: Color,
    pub notice: Color,
    pub progress_bg: Color,
    pub progress_fill: Color,
    pub button_bg: Color,
    pub button_border: Color,
    pub button_text: Color,
    pub menu_bg: Color,
    pub border: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self::light(),
            Theme::Dark => Self::dark(),
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color::from_rgba8(245, 245, 245, 255),
            simple_background: Color::from_rgba8(245, 245, 245, 255),
            readout: Color::from_rgba8(33, 33, 33, 255),
            label: Color::from_rgba8(90, 90, 90, 255),
            notice: Color::from_rgba8(198, 40, 40, 255),
            progress_bg: Color::from_rgba8(224, 224, 224, 255),
            progress_fill: Color::from_rgba8(76, 175, 80, 255),
            button_bg: Color::from_rgba8(255, 255, 255, 255),
            button_border: Color::from_rgba8(189, 189, 189, 255),
            button_text: Color::from_rgba8(33, 33, 33, 255),
            menu_bg: Color::from_rgba8(255, 255, 255, 250),
            border: Color::from_rgba8(200, 200, 200, 255),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::from_rgba8(43, 43, 43, 255),
            simple_background: Color::from_rgba8(30, 30, 30, 255),
            readout: Color::from_rgba8(240, 240, 240, 255),
            label: Color::from_rgba8(180, 180, 180, 255),
            notice: Color::from_rgba8(239, 154, 154, 255),
            progress_bg: Color::from_rgba8(70, 70, 70, 255),
            progress_fill: Color::from_rgba8(102, 187, 106, 255),
            button_bg: Color::from_rgba8(60, 60, 60, 255),
            button_border: Color::from_rgba8(90, 90, 90, 255),
            button_text: Color::from_rgba8(230, 230, 230, 255),
            menu_bg: Color::from_rgba8(55, 55, 55, 250),
            border: Color::from_rgba8(70, 70, 70, 255),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}

/// Copy of `color` with its alpha replaced
pub fn with_alpha(color: Color, alpha: u8) -> Color {
    let mut out = color;
    out.set_alpha(alpha as f32 / 255.0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_follows_theme() {
        assert_eq!(Palette::for_theme(Theme::Light), Palette::light());
        assert_eq!(Palette::for_theme(Theme::Dark), Palette::dark());
        assert_ne!(Palette::light().background, Palette::dark().background);
    }

    #[test]
    fn test_with_alpha_keeps_rgb() {
        let c = with_alpha(Color::from_rgba8(10, 20, 30, 255), 51);
        let rgba = c.to_color_u8();
        assert_eq!((rgba.red(), rgba.green(), rgba.blue()), (10, 20, 30));
        assert!((c.alpha() - 0.2).abs() < 1e-3);
    }
}
