//! # Odometry Node
//!
//! Pipeline controller of the RGB-D odometry front-end.
//!
//! Responsibilities:
//! - topology selection and startup preconditions
//! - synchronizer ownership, pause/resume and flush
//! - per-group assembly and dispatch to the [`OdometryEngine`]
//! - missing-input watchdog and node statistics
//!
//! ## Usage
//!
//! ```ignore
//! use odometry_node::{RgbdOdometryNode, StaticTransformTree};
//!
//! let tf = StaticTransformTree::from_config(&config.static_transforms);
//! let mut node = RgbdOdometryNode::new(&config, engine, tf)?;
//!
//! for input in messages {
//!     node.handle(input);
//! }
//! ```
//!
//! [`OdometryEngine`]: contracts::OdometryEngine

mod error;
mod node;
mod static_tf;
mod stats;
mod topology;
mod watchdog;

pub use error::NodeError;
pub use node::{NodeEvent, RgbdOdometryNode};
pub use static_tf::StaticTransformTree;
pub use stats::NodeStats;
pub use topology::{enforce_registration, select_topology};
pub use watchdog::CallbackMonitor;

// Re-export the input surface
pub use sync_engine::{ChannelInput, RigTopology};
