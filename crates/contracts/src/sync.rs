//! Synchronization policy and buffer diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Stamp;

/// Timestamp matching policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// All stamps in a group must be identical
    Exact,
    /// All stamps in a group must lie within `max_interval` of each other
    #[default]
    Approximate,
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncMode::Exact => f.write_str("exact"),
            SyncMode::Approximate => f.write_str("approx"),
        }
    }
}

/// Depth of one synchronizer input channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelDepth {
    pub channel: &'static str,
    pub depth: usize,
    pub evicted: u64,
}

/// Synchronizer buffer status (for diagnostics)
#[derive(Debug, Clone, Default)]
pub struct BufferStats {
    /// Buffer depth per active channel, in channel order
    pub channels: Vec<ChannelDepth>,

    /// Total buffered messages
    pub total_buffered: usize,

    /// Messages evicted unmatched because a buffer was full
    pub evicted: u64,

    /// Groups emitted since construction
    pub groups_emitted: u64,

    /// Oldest buffered stamp
    pub oldest_stamp: Option<Stamp>,

    /// Newest buffered stamp
    pub newest_stamp: Option<Stamp>,
}
