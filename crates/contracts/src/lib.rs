//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace:
//! message types arriving from the transport, the composite frame handed to
//! the odometry engine, node configuration, and the collaborator traits.
//! All business crates depend on this crate, never the other way around.
//!
//! ## Time Model
//! - Capture time is a [`Stamp`] in integer nanoseconds, so exact matching is
//!   bit-exact and approximate matching never accumulates float error.
//! - A camera's effective stamp is the later of its color and depth stamps.

mod calibration;
mod error;
mod frame;
mod frame_id;
mod image;
mod node_config;
mod odometry;
mod rgbd;
mod stamp;
mod sync;
mod transform;

pub use calibration::*;
pub use error::*;
pub use frame::*;
pub use frame_id::FrameId;
pub use image::*;
pub use node_config::*;
pub use odometry::OdometryEngine;
pub use rgbd::*;
pub use stamp::Stamp;
pub use sync::*;
pub use transform::TransformLookup;
