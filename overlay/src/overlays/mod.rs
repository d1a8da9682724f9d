//! Overlay implementations
//!
//! MeetClock has a single overlay, the countdown window. It uses the
//! `OverlayFrame` for the shared chrome and the platform layer for window
//! management.

mod countdown;

pub use countdown::{
    BASE_HEIGHT, BASE_WIDTH, CountdownData, CountdownLayout, CountdownOverlay, CountdownStyle,
    Hit, NOTICE_DURATION, OverlayAction, fit_font_size,
};
