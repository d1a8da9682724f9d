//! MeetClock overlay window
//!
//! Frameless, software-rendered countdown window.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    overlays/                        │
//! │          CountdownOverlay (layout, hit-testing)     │
//! ├─────────────────────────────────────────────────────┤
//! │                    widgets/                         │
//! │          ProgressBar, Button, Palette               │
//! ├─────────────────────────────────────────────────────┤
//! │                 frame / manager                     │
//! │      OverlayFrame (chrome, scaling) over            │
//! │      OverlayWindow (window + renderer)              │
//! ├─────────────────────────────────────────────────────┤
//! │                    renderer                         │
//! │            tiny-skia + cosmic-text                  │
//! ├─────────────────────────────────────────────────────┤
//! │                    platform/                        │
//! │     x11, windows, pointer (drag/resize/click)       │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod frame;
pub mod manager;
pub mod overlays;
pub mod platform;
pub mod renderer;
pub mod utils;
pub mod widgets;

pub use frame::OverlayFrame;
pub use manager::OverlayWindow;
pub use overlays::{CountdownData, CountdownOverlay, CountdownStyle, OverlayAction};
pub use platform::{NativeOverlay, OverlayConfig, OverlayPlatform, PlatformError};
pub use renderer::{FontWeight, Renderer};
pub use widgets::Palette;

// Re-export tiny_skia Color for external use
pub use tiny_skia::Color;
