//! CLI enum types.

use clap::ValueEnum;

use crate::pipeline::Variant;

/// Frame pipeline to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VariantArg {
    /// Read, transform and draw on one thread every 10 ms
    #[default]
    Sync,
    /// Capture on a background thread, draw the latest frame every 5 ms
    Threaded,
}

impl From<VariantArg> for Variant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Sync => Variant::Synchronous,
            VariantArg::Threaded => Variant::Threaded,
        }
    }
}
