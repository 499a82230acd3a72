//! Threshold-based peak calling from bedGraph signal tracks.
//!
//! Records scoring at least the threshold are merged into peaks, filtered by
//! length, and close peaks are either merged or reduced to the highest one.
//! Peaks overlapping a blacklist can be dropped before the sorted peaks are
//! written as BED.

pub mod bed;
pub mod error;
pub mod peak;

pub use error::{Error, Result};
pub use peak::{default_output_path, CloseMode, Peak, PeakCaller, PeakCallerBuilder};
