//! Startup decisions: topology selection and engine parameter enforcement.

use contracts::{
    is_registration_disabled, NodeConfig, ParametersMap, SubscriptionMode, REG_STRATEGY_KEY,
    REG_STRATEGY_NONE,
};
use sync_engine::RigTopology;
use tracing::warn;

use crate::NodeError;

/// Pick the input topology for `config`.
///
/// Split subscription always runs one camera; asking for two there is
/// ignored with a warning.
pub fn select_topology(config: &NodeConfig) -> Result<RigTopology, NodeError> {
    if let Some(legacy) = config.depth_cameras {
        warn!(
            depth_cameras = legacy,
            "\"depth_cameras\" is ignored, it has been replaced by \"rgbd_cameras\" with \"subscribe_rgbd = true\""
        );
    }

    let count = config.rgbd_cameras;
    if !(1..=2).contains(&count) {
        return Err(NodeError::InvalidRigCount { count });
    }

    let topology = match (config.subscription_mode(), count) {
        (SubscriptionMode::Rgbd, 1) => RigTopology::SingleRgbd,
        (SubscriptionMode::Rgbd, _) => RigTopology::DualRgbd,
        (SubscriptionMode::Split, 1) => RigTopology::Split,
        (SubscriptionMode::Split, _) => {
            warn!(
                rgbd_cameras = count,
                "rgbd_cameras > 1 requires subscribe_rgbd = true, using a single split camera"
            );
            RigTopology::Split
        }
    };
    Ok(topology)
}

/// Odometry parameters as handed to the engine.
///
/// The registration strategy must be absent or `"0"`; the returned map always
/// carries it explicitly.
pub fn enforce_registration(params: &ParametersMap) -> Result<ParametersMap, NodeError> {
    if let Some(value) = params.get(REG_STRATEGY_KEY) {
        if !is_registration_disabled(value) {
            return Err(NodeError::IncompatibleRegistration {
                value: value.trim().to_string(),
            });
        }
    }

    let mut enforced = params.clone();
    enforced.insert(REG_STRATEGY_KEY.to_string(), REG_STRATEGY_NONE.to_string());
    Ok(enforced)
}
