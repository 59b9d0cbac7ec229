//! Node counters.

use std::collections::BTreeMap;

/// Counters since node construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStats {
    /// Messages handed to the node
    pub messages_received: u64,

    /// Messages refused by the synchronizer (inactive channel, bad rig index)
    pub messages_rejected: u64,

    /// Groups completed by the synchronizer
    pub groups_synced: u64,

    /// Groups not processed because the node was paused
    pub groups_skipped_paused: u64,

    /// Groups abandoned during assembly, per error kind
    pub groups_dropped: BTreeMap<&'static str, u64>,

    /// Frames handed to the engine
    pub frames_dispatched: u64,

    /// Frames the engine failed to process
    pub engine_errors: u64,

    /// Synchronizer rebuilds
    pub flushes: u64,
}

impl NodeStats {
    pub fn total_dropped(&self) -> u64 {
        self.groups_dropped.values().sum()
    }

    pub(crate) fn record_drop(&mut self, kind: &'static str) {
        *self.groups_dropped.entry(kind).or_insert(0) += 1;
    }
}
