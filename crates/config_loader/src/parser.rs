//! Config parsing
//!
//! TOML is the primary format; JSON is accepted for generated configs.

use contracts::{ContractError, NodeConfig};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn parse_toml(content: &str) -> Result<NodeConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse_json(content: &str) -> Result<NodeConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

pub fn parse(content: &str, format: ConfigFormat) -> Result<NodeConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SyncMode;

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
frame_id = "odom_base"
rgbd_cameras = 2
subscribe_rgbd = true

[sync]
mode = "exact"
queue_size = 10

[odometry]
"Odom/Strategy" = "1"

[[static_transforms]]
parent = "odom_base"
child = "camera_link"
translation = [0.1, 0.0, 0.2]
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.frame_id, "odom_base");
        assert_eq!(config.rgbd_cameras, 2);
        assert!(config.subscribe_rgbd);
        assert_eq!(config.sync.mode, SyncMode::Exact);
        assert_eq!(config.sync.queue_size, 10);
        assert_eq!(config.sync.max_interval_s, 0.01);
        assert_eq!(config.odometry["Odom/Strategy"], "1");
        assert_eq!(config.static_transforms[0].rotation_rpy, [0.0; 3]);
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let config = parse_toml("").unwrap();
        assert_eq!(config.frame_id, "base_link");
        assert_eq!(config.rgbd_cameras, 1);
        assert!(config.static_transforms.is_empty());
    }

    #[test]
    fn test_parse_json() {
        let content = r#"{
            "rgbd_cameras": 1,
            "sync": { "mode": "approximate", "max_interval_s": 0.02 },
            "watchdog": { "warn_after_s": 2.5 },
            "depth_cameras": 1
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.sync.max_interval_s, 0.02);
        assert_eq!(config.watchdog.warn_after_s, 2.5);
        assert_eq!(config.depth_cameras, Some(1));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let err = parse_toml("rgbd_cameras = [[[").unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_unknown_sync_mode_rejected() {
        let err = parse_toml("[sync]\nmode = \"nearest\"").unwrap_err();
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("toml"), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_extension("JSON"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
