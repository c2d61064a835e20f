//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::VariantArg;

/// Full-screen horizontally mirrored webcam view
#[derive(Parser, Debug)]
#[command(name = "video-mirror")]
#[command(version, about = "Show a webcam as a full-screen mirror", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Frame pipeline
    #[arg(long, default_value = "sync")]
    pub variant: VariantArg,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Probe video inputs and print the ones that respond
    ListDevices,
}
