//! # Sync Engine
//!
//! Multi-stream timestamp synchronizer for RGB-D rigs.
//!
//! Responsibilities:
//! - bounded per-channel lookback buffers with oldest-first eviction
//! - exact and bounded-skew approximate matching
//! - one tagged synchronizer per input topology
//!
//! ## Usage
//!
//! ```ignore
//! use sync_engine::{ChannelInput, RigSynchronizer, RigTopology};
//!
//! let mut sync = RigSynchronizer::new(RigTopology::DualRgbd, &config.sync);
//!
//! // Push messages as they arrive
//! if let Some(group) = sync.push(ChannelInput::Rgbd { index: 0, image })? {
//!     // Assemble the composite frame
//! }
//! ```

mod buffer;
mod error;
mod policy;
mod rig;
mod synchronizer;

pub use buffer::{Candidate, ChannelBuffer, Stamped};
pub use error::SyncError;
pub use policy::{best_match, spread, MatchPolicy};
pub use rig::{
    ChannelInput, PassThrough, RigSynchronizer, RigTopology, SyncGroup, DEPTH_IMAGE,
    RGBD_IMAGE, RGBD_IMAGE0, RGBD_IMAGE1, RGBD_IMAGE_UNKNOWN, RGB_CAMERA_INFO, RGB_IMAGE,
};
pub use synchronizer::{PairSynchronizer, Synchronizer, TripleSynchronizer};

// Re-export contracts types
pub use contracts::{BufferStats, ChannelDepth, SyncConfig, SyncMode};
