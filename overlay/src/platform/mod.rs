//! Platform abstraction for the overlay window
//!
//! This module defines the trait the platform backends implement, so the
//! countdown overlay and the application loop stay platform-agnostic.
//! Linux uses X11 (which also covers XWayland sessions); Windows uses a
//! layered popup window.

use meetclock_core::Geometry;

pub mod pointer;

#[cfg(all(unix, not(target_os = "macos")))]
pub mod x11;

#[cfg(target_os = "windows")]
pub mod windows;

pub use pointer::{CursorShape, PointerAction, PointerTracker, ResizeEdge};

/// Information about a connected monitor
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    /// Platform-specific identifier
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Virtual Screen (Multi-Monitor) Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Bounding box of the virtual screen (all monitors combined)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualScreenBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl VirtualScreenBounds {
    pub fn from_monitors(monitors: &[MonitorInfo]) -> Option<Self> {
        let first = monitors.first()?;
        let init = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x + first.width as i32,
            max_y: first.y + first.height as i32,
        };
        Some(monitors.iter().skip(1).fold(init, |b, m| Self {
            min_x: b.min_x.min(m.x),
            min_y: b.min_y.min(m.y),
            max_x: b.max_x.max(m.x + m.width as i32),
            max_y: b.max_y.max(m.y + m.height as i32),
        }))
    }

    /// Clamp a window position so the window stays inside the bounds
    pub fn clamp_position(&self, x: i32, y: i32, width: u32, height: u32) -> (i32, i32) {
        let clamped_x = x.clamp(self.min_x, (self.max_x - width as i32).max(self.min_x));
        let clamped_y = y.clamp(self.min_y, (self.max_y - height as i32).max(self.min_y));
        (clamped_x, clamped_y)
    }
}

/// Clamp a window position to the virtual screen. Positions pass through
/// unchanged when no monitor information is available.
pub fn clamp_to_virtual_screen(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    monitors: &[MonitorInfo],
) -> (i32, i32) {
    VirtualScreenBounds::from_monitors(monitors)
        .map(|bounds| bounds.clamp_position(x, y, width, height))
        .unwrap_or((x, y))
}

/// Configuration for creating the overlay window
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Initial X position in virtual screen coordinates
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Window title / class name
    pub title: String,
    /// Keep the window above all others
    pub topmost: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 350,
            height: 250,
            title: "MeetClock".to_string(),
            topmost: false,
        }
    }
}

impl OverlayConfig {
    pub fn from_geometry(geometry: Geometry, topmost: bool) -> Self {
        Self {
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
            topmost,
            ..Default::default()
        }
    }
}

/// Errors that can occur in platform operations
#[derive(Debug)]
pub enum PlatformError {
    /// Failed to connect to display server
    ConnectionFailed(String),
    /// Required protocol/feature not available
    UnsupportedFeature(String),
    /// Buffer/memory allocation failed
    BufferError(String),
    /// Generic platform error
    Other(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::ConnectionFailed(s) => write!(f, "Connection failed: {}", s),
            PlatformError::UnsupportedFeature(s) => write!(f, "Unsupported feature: {}", s),
            PlatformError::BufferError(s) => write!(f, "Buffer error: {}", s),
            PlatformError::Other(s) => write!(f, "Platform error: {}", s),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Trait that all platform backends must implement
pub trait OverlayPlatform: Sized {
    /// Create and show the overlay window
    fn new(config: OverlayConfig) -> Result<Self, PlatformError>;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn x(&self) -> i32;

    fn y(&self) -> i32;

    fn geometry(&self) -> Geometry {
        Geometry {
            x: self.x(),
            y: self.y(),
            width: self.width(),
            height: self.height(),
        }
    }

    /// Check if the user moved or resized the window since the last check
    /// (clears the dirty flag)
    fn take_geometry_dirty(&mut self) -> bool;

    /// Move the window (clamped to the virtual screen)
    fn set_position(&mut self, x: i32, y: i32);

    /// Resize the window and its pixel buffer
    fn set_size(&mut self, width: u32, height: u32);

    fn set_geometry(&mut self, geometry: Geometry) {
        self.set_size(geometry.width, geometry.height);
        self.set_position(geometry.x, geometry.y);
    }

    /// Take the last click (press + release without movement), in window
    /// coordinates. Consumed on read.
    fn take_click(&mut self) -> Option<(f32, f32)>;

    /// Show or hide the window
    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Keep the window above other windows
    fn set_topmost(&mut self, topmost: bool);

    /// Get mutable access to the pixel buffer (RGBA format)
    /// Returns None if buffer is not ready
    fn pixel_buffer(&mut self) -> Option<&mut [u8]>;

    /// Commit the current pixel buffer to the screen
    fn commit(&mut self);

    /// Process pending platform events (non-blocking)
    /// Returns false if the window was closed by the system
    fn poll_events(&mut self) -> bool;

    /// Get information about all connected monitors
    fn get_monitors(&self) -> Vec<MonitorInfo>;
}

/// Re-export the appropriate platform for the current target
#[cfg(all(unix, not(target_os = "macos")))]
pub use x11::X11Overlay as NativeOverlay;

#[cfg(target_os = "windows")]
pub use windows::WindowsOverlay as NativeOverlay;

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor(id: &str, x: i32, y: i32, width: u32, height: u32) -> MonitorInfo {
        MonitorInfo {
            id: id.to_string(),
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_virtual_bounds_span_all_monitors() {
        let monitors = vec![
            monitor("left", -1920, 0, 1920, 1080),
            monitor("main", 0, 0, 2560, 1440),
        ];
        let bounds = VirtualScreenBounds::from_monitors(&monitors).unwrap();
        assert_eq!(
            bounds,
            VirtualScreenBounds {
                min_x: -1920,
                min_y: 0,
                max_x: 2560,
                max_y: 1440
            }
        );
        assert!(VirtualScreenBounds::from_monitors(&[]).is_none());
    }

    #[test]
    fn test_clamp_keeps_window_on_screen() {
        let monitors = vec![monitor("main", 0, 0, 1920, 1080)];
        assert_eq!(clamp_to_virtual_screen(-50, 20, 350, 250, &monitors), (0, 20));
        assert_eq!(clamp_to_virtual_screen(1800, 1000, 350, 250, &monitors), (1570, 830));
        assert_eq!(clamp_to_virtual_screen(500, 500, 350, 250, &[]), (500, 500));
    }
}
