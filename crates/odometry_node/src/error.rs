//! Controller errors.
//!
//! Only startup can fail; per-message problems are reported as
//! [`NodeEvent`](crate::NodeEvent)s instead.

use contracts::{ContractError, REG_STRATEGY_KEY};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    /// Rig count outside {1, 2}
    #[error("rgbd_cameras = {count} is not supported, expected 1 or 2")]
    InvalidRigCount { count: i64 },

    /// The engine was asked for a registration strategy composite frames cannot feed
    #[error(
        "odometry parameter {key} = \"{value}\" is incompatible with composite frames, only \"0\" is supported",
        key = REG_STRATEGY_KEY
    )]
    IncompatibleRegistration { value: String },

    /// Engine configuration failed
    #[error(transparent)]
    Contract(#[from] ContractError),
}
