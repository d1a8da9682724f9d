//! Countdown state machine
//!
//! The countdown tracks remaining time against a preset duration and reports
//! threshold crossings as [`CountdownEvent`]s:
//! - **Alert**: fired once when remaining time drops to the alert offset
//! - **Flash**: the readout starts blinking at the flash offset
//! - **Finished**: remaining time reached zero, the countdown paused itself
//!
//! Time is injected as [`std::time::Instant`] so the machine never reads the
//! clock itself. The application drives it every [`TICK_INTERVAL`].

mod machine;


pub use machine::{
    Countdown, CountdownConfig, CountdownEvent, FLASH_INTERVAL, TICK_INTERVAL,
};
