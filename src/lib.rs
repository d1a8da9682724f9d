//! MeetClock: a countdown timer overlay for meetings
//!
//! The binary opens a borderless always-available window (meetclock-overlay)
//! driven by the countdown and fade state machines in meetclock-core. This
//! crate wires them together: the application loop, the audio thread,
//! global shortcuts, logging and the configuration subcommands.

pub mod app;
pub mod audio;
pub mod commands;
pub mod error;
pub mod hotkeys;
pub mod logging;
