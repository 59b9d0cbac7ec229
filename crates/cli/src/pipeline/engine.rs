//! Stand-in odometry engine that logs what it receives.

use contracts::{CompositeFrame, ContractError, OdometryEngine, ParametersMap, Stamp};
use tracing::{debug, info};

/// Logs every composite frame and keeps the last one for statistics.
#[derive(Debug, Default)]
pub struct LoggingOdometry {
    frames: u64,
    last_frame: Option<CompositeFrame>,
}

impl LoggingOdometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&CompositeFrame> {
        self.last_frame.as_ref()
    }
}

impl OdometryEngine for LoggingOdometry {
    fn name(&self) -> &str {
        "logging"
    }

    fn configure(&mut self, params: &ParametersMap) -> Result<(), ContractError> {
        info!(params = ?params, "odometry engine configured");
        Ok(())
    }

    fn process_data(&mut self, frame: CompositeFrame, stamp: Stamp) -> Result<(), ContractError> {
        if frame.camera_models.is_empty() {
            return Err(ContractError::engine_process(
                self.name(),
                frame.sequence,
                "frame carries no camera model",
            ));
        }

        self.frames += 1;
        debug!(
            sequence = frame.sequence,
            %stamp,
            cameras = frame.camera_count(),
            width = frame.color.width,
            height = frame.color.height,
            depth_type = %frame.depth.pixel_type,
            "composite frame received"
        );
        self.last_frame = Some(frame);
        Ok(())
    }
}
