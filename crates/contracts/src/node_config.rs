//! Node configuration contracts shared by the config loader, the controller
//! and the CLI.

use nalgebra::{Isometry3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use validator::Validate;

use crate::SyncMode;

/// Odometry engine parameters, keyed by `Group/Name`.
pub type ParametersMap = BTreeMap<String, String>;

/// Registration strategy parameter; this front-end only works with `"0"`.
pub const REG_STRATEGY_KEY: &str = "Reg/Strategy";

/// The only registration strategy the composite frame supports.
pub const REG_STRATEGY_NONE: &str = "0";

/// Whether a `Reg/Strategy` value selects no registration (surrounding whitespace ignored).
pub fn is_registration_disabled(value: &str) -> bool {
    value.trim() == REG_STRATEGY_NONE
}

/// Complete node configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NodeConfig {
    /// Fixed reference frame camera transforms are resolved into
    #[serde(default = "default_frame_id")]
    #[validate(length(min = 1))]
    pub frame_id: String,

    /// Number of RGB-D rigs (1 or 2)
    #[serde(default = "default_rgbd_cameras")]
    pub rgbd_cameras: i64,

    /// Subscribe to combined rig messages instead of split image/depth/info
    #[serde(default)]
    pub subscribe_rgbd: bool,

    /// Synchronizer settings
    #[serde(default)]
    #[validate(nested)]
    pub sync: SyncConfig,

    /// Missing-input watchdog
    #[serde(default)]
    #[validate(nested)]
    pub watchdog: WatchdogConfig,

    /// Parameters forwarded to the odometry engine
    #[serde(default)]
    pub odometry: ParametersMap,

    /// Static transforms used to resolve camera frames into `frame_id`
    #[serde(default)]
    pub static_transforms: Vec<StaticTransformConfig>,

    /// Legacy option, superseded by `rgbd_cameras`; only reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_cameras: Option<i64>,
}

fn default_frame_id() -> String {
    "base_link".to_string()
}

fn default_rgbd_cameras() -> i64 {
    1
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            frame_id: default_frame_id(),
            rgbd_cameras: default_rgbd_cameras(),
            subscribe_rgbd: false,
            sync: SyncConfig::default(),
            watchdog: WatchdogConfig::default(),
            odometry: ParametersMap::new(),
            static_transforms: Vec::new(),
            depth_cameras: None,
        }
    }
}

impl NodeConfig {
    pub fn subscription_mode(&self) -> SubscriptionMode {
        if self.subscribe_rgbd {
            SubscriptionMode::Rgbd
        } else {
            SubscriptionMode::Split
        }
    }
}

/// How camera data reaches the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionMode {
    /// Separate color, depth and calibration channels
    Split,
    /// One combined channel per rig
    Rgbd,
}

/// Saturating seconds to `Duration`; NaN and negatives become zero.
fn seconds_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
}

/// Synchronizer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    /// Exact or approximate stamp matching
    #[serde(default)]
    pub mode: SyncMode,

    /// Per-channel lookback depth
    #[serde(default = "default_queue_size")]
    #[validate(range(min = 1, max = 1000))]
    pub queue_size: usize,

    /// Maximum stamp spread inside one approximate group (seconds)
    #[serde(default = "default_max_interval_s")]
    #[validate(range(exclusive_min = 0.0, max = 3600.0))]
    pub max_interval_s: f64,
}

fn default_queue_size() -> usize {
    5
}

fn default_max_interval_s() -> f64 {
    0.01
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            mode: SyncMode::default(),
            queue_size: default_queue_size(),
            max_interval_s: default_max_interval_s(),
        }
    }
}

impl SyncConfig {
    pub fn max_interval(&self) -> Duration {
        seconds_to_duration(self.max_interval_s)
    }
}

/// Watchdog configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WatchdogConfig {
    /// Warn when no synchronized group arrived for this long (seconds)
    #[serde(default = "default_warn_after_s")]
    #[validate(range(exclusive_min = 0.0, max = 3600.0))]
    pub warn_after_s: f64,
}

fn default_warn_after_s() -> f64 {
    5.0
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            warn_after_s: default_warn_after_s(),
        }
    }
}

impl WatchdogConfig {
    pub fn warn_after(&self) -> Duration {
        seconds_to_duration(self.warn_after_s)
    }
}

/// A fixed parent-to-child transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTransformConfig {
    pub parent: String,

    pub child: String,

    /// Child origin expressed in the parent frame (meters)
    #[serde(default)]
    pub translation: [f64; 3],

    /// Roll, pitch, yaw (radians)
    #[serde(default)]
    pub rotation_rpy: [f64; 3],
}

impl StaticTransformConfig {
    /// Transform mapping child-frame coordinates into the parent frame.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let [x, y, z] = self.translation;
        let [roll, pitch, yaw] = self.rotation_rpy;
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.frame_id, "base_link");
        assert_eq!(config.rgbd_cameras, 1);
        assert_eq!(config.subscription_mode(), SubscriptionMode::Split);
        assert_eq!(config.sync.mode, SyncMode::Approximate);
        assert_eq!(config.sync.queue_size, 5);
        assert_eq!(config.sync.max_interval(), Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_queue_size_fails_validation() {
        let mut config = NodeConfig::default();
        config.sync.queue_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_periods_fail_validation_without_panicking() {
        let mut config = NodeConfig::default();
        config.sync.max_interval_s = f64::INFINITY;
        config.watchdog.warn_after_s = 1e30;
        assert!(config.validate().is_err());
        assert_eq!(config.sync.max_interval(), Duration::MAX);
        assert_eq!(config.watchdog.warn_after(), Duration::MAX);

        config.sync.max_interval_s = f64::NAN;
        assert_eq!(config.sync.max_interval(), Duration::ZERO);
    }

    #[test]
    fn test_registration_value_ignores_whitespace() {
        assert!(is_registration_disabled("0"));
        assert!(is_registration_disabled(" 0 "));
        assert!(!is_registration_disabled("1"));
        assert!(!is_registration_disabled(""));
    }

    #[test]
    fn test_static_transform_to_isometry() {
        let tf = StaticTransformConfig {
            parent: "base_link".into(),
            child: "camera_link".into(),
            translation: [1.0, 2.0, 3.0],
            rotation_rpy: [0.0, 0.0, std::f64::consts::FRAC_PI_2],
        };
        let p = tf.to_isometry() * Point3::new(1.0, 0.0, 0.0);
        assert!((p.x - 1.0).abs() < 1e-9);
        assert!((p.y - 3.0).abs() < 1e-9);
        assert!((p.z - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_deserialize_json_with_defaults() {
        let config: NodeConfig =
            serde_json::from_str(r#"{ "rgbd_cameras": 2, "subscribe_rgbd": true }"#).unwrap();
        assert_eq!(config.rgbd_cameras, 2);
        assert_eq!(config.subscription_mode(), SubscriptionMode::Rgbd);
        assert_eq!(config.sync.queue_size, 5);
    }
}
