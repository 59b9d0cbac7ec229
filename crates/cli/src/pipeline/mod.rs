//! Node driver: simulated rig, stand-in engine and run loop.

mod engine;
mod mock_rig;
mod orchestrator;
mod stats;

pub use engine::LoggingOdometry;
pub use mock_rig::{default_camera_frames, MockRig, MockRigConfig};
pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::PipelineStats;
