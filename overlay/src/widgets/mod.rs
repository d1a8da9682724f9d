//! Reusable UI widgets for the countdown overlay
//!
//! Each widget renders to an `OverlayFrame`.
//!
//! - [`ProgressBar`] - Remaining-time bar
//! - [`Button`] - Labelled push button
//! - [`Palette`] - Theme colours

mod button;
pub mod colors;
mod progress_bar;

pub use button::Button;
pub use colors::Palette;
pub use progress_bar::ProgressBar;
