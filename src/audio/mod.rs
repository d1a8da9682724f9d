//! Audio subsystem for alert music and meeting prompts
//!
//! A dedicated thread owns the output device and applies volume fades;
//! the rest of the application talks to it through an [`AudioHandle`].

mod events;
mod service;

#[cfg(test)]
mod service_tests;

pub use events::AudioCommand;
pub use service::{AudioHandle, AudioOutput, AudioService, RodioOutput, spawn};
