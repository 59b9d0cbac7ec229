//! OdometryEngine trait - consumer of composite frames
//!
//! Defines the abstract interface of the downstream pose estimator.

use crate::{CompositeFrame, ContractError, ParametersMap, Stamp};

/// Downstream odometry engine
///
/// The node hands over each composite frame exactly once, in sequence order.
pub trait OdometryEngine: Send {
    /// Engine name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Apply parameters before the first frame
    ///
    /// The map always carries `Reg/Strategy = "0"`.
    fn configure(&mut self, params: &ParametersMap) -> Result<(), ContractError>;

    /// Process one composite frame
    ///
    /// # Errors
    /// Returns processing error (should include the frame sequence)
    fn process_data(&mut self, frame: CompositeFrame, stamp: Stamp) -> Result<(), ContractError>;
}

impl<E: OdometryEngine + ?Sized> OdometryEngine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn configure(&mut self, params: &ParametersMap) -> Result<(), ContractError> {
        (**self).configure(params)
    }

    fn process_data(&mut self, frame: CompositeFrame, stamp: Stamp) -> Result<(), ContractError> {
        (**self).process_data(frame, stamp)
    }
}
