//! Synchronizer input errors.

use thiserror::Error;

/// Rejected synchronizer input
///
/// Never fatal: the caller logs and drops the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The active topology does not subscribe to this channel
    #[error("channel '{channel}' is not subscribed in {topology} topology")]
    InactiveChannel {
        channel: &'static str,
        topology: &'static str,
    },

    /// Combined rig message for a rig the topology does not have
    #[error("rig index {index} out of range, topology has {rigs} rig(s)")]
    RigIndexOutOfRange { index: usize, rigs: usize },
}
