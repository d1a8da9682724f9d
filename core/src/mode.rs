//! View modes and per-mode window geometry
//!
//! Normal mode shows the full control surface; simple mode shrinks the
//! window to the time readout over a translucent background. Each mode
//! remembers the geometry it was last left with.

use meetclock_types::{MAX_OPACITY, MIN_OPACITY, WindowSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Normal,
    Simple,
}

/// Window position and size in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl From<&WindowSettings> for Geometry {
    fn from(window: &WindowSettings) -> Self {
        Self {
            x: window.x,
            y: window.y,
            width: window.width,
            height: window.height,
        }
    }
}

impl Geometry {
    /// Write this geometry back into the persisted window settings
    pub fn store(&self, window: &mut WindowSettings) {
        window.x = self.x;
        window.y = self.y;
        window.width = self.width;
        window.height = self.height;
    }
}

/// Tracks the active mode and the geometry last used in each mode
#[derive(Debug, Clone, Default)]
pub struct ModeGeometry {
    mode: ViewMode,
    normal: Option<Geometry>,
    simple: Option<Geometry>,
}

impl ModeGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Geometry remembered for `mode`, if it has been left before
    pub fn remembered(&self, mode: ViewMode) -> Option<Geometry> {
        match mode {
            ViewMode::Normal => self.normal,
            ViewMode::Simple => self.simple,
        }
    }

    /// Leave the current mode with `current` geometry and enter `to`.
    ///
    /// Returns the geometry to apply for the new mode, or `None` when the
    /// mode is unchanged or has never been entered before.
    pub fn switch(&mut self, current: Geometry, to: ViewMode) -> Option<Geometry> {
        if self.mode == to {
            return None;
        }
        match self.mode {
            ViewMode::Normal => self.normal = Some(current),
            ViewMode::Simple => self.simple = Some(current),
        }
        self.mode = to;
        self.remembered(to)
    }
}

/// Step opacity by `delta` (a multiple of 0.1), clamped to the allowed range.
/// A value between two tenths first snaps to the neighbour in the step
/// direction, so every press lands on the 0.1 grid and moves at most one step.
pub fn adjust_opacity(current: f32, delta: f32) -> f32 {
    let tenths = current * 10.0;
    let steps = (delta * 10.0).round();
    let base = if steps > 0.0 {
        (tenths + 1e-3).floor()
    } else {
        (tenths - 1e-3).ceil()
    };
    ((base + steps) / 10.0).clamp(MIN_OPACITY, MAX_OPACITY)
}

/// Alpha of the simple-mode background for an opacity
pub fn background_alpha(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(x: i32, width: u32) -> Geometry {
        Geometry {
            x,
            y: 0,
            width,
            height: 100,
        }
    }

    #[test]
    fn test_first_switch_has_no_memory() {
        let mut modes = ModeGeometry::new();
        assert_eq!(modes.switch(geo(10, 350), ViewMode::Simple), None);
        assert_eq!(modes.mode(), ViewMode::Simple);
        assert_eq!(modes.remembered(ViewMode::Normal), Some(geo(10, 350)));
    }

    #[test]
    fn test_round_trip_restores_geometry() {
        let mut modes = ModeGeometry::new();
        modes.switch(geo(10, 350), ViewMode::Simple);
        // User resizes the simple window, then goes back
        assert_eq!(modes.switch(geo(40, 200), ViewMode::Normal), Some(geo(10, 350)));
        assert_eq!(modes.switch(geo(12, 360), ViewMode::Simple), Some(geo(40, 200)));
    }

    #[test]
    fn test_switch_to_same_mode_is_noop() {
        let mut modes = ModeGeometry::new();
        assert_eq!(modes.switch(geo(10, 350), ViewMode::Normal), None);
        assert_eq!(modes.remembered(ViewMode::Normal), None);
    }

    #[test]
    fn test_adjust_opacity_clamps() {
        assert_eq!(adjust_opacity(1.0, 0.1), 1.0);
        assert_eq!(adjust_opacity(0.2, -0.1), 0.2);
        assert_eq!(adjust_opacity(0.7, -0.1), 0.6);
        assert_eq!(adjust_opacity(0.6, 0.1), 0.7);
    }

    #[test]
    fn test_adjust_opacity_snaps_off_grid_values() {
        // Hand-edited config values between tenths move a single step
        assert_eq!(adjust_opacity(0.25, 0.1), 0.3);
        assert_eq!(adjust_opacity(0.25, -0.1), 0.2);
        assert_eq!(adjust_opacity(0.71, 0.1), 0.8);
        assert_eq!(adjust_opacity(0.79, -0.1), 0.7);
    }

    #[test]
    fn test_background_alpha() {
        assert_eq!(background_alpha(1.0), 255);
        assert_eq!(background_alpha(0.2), 51);
    }

    #[test]
    fn test_geometry_store() {
        let mut window = WindowSettings::default();
        geo(5, 420).store(&mut window);
        assert_eq!(window.x, 5);
        assert_eq!(window.width, 420);
        assert_eq!(Geometry::from(&window), geo(5, 420));
    }
}
