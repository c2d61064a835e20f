//! video-mirror library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod camera;
pub mod cli;
pub mod config;
pub mod dialogs;
pub mod display;
pub mod pipeline;
pub mod preflight;
pub mod session;
