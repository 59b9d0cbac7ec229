//! Config validation
//!
//! Rules:
//! - field ranges declared on the config types (`validator` derive)
//! - periods and tolerances are finite
//! - rgbd_cameras is 1 or 2
//! - odometry `Reg/Strategy` is absent or "0"
//! - static transforms name distinct, non-empty frames with finite values
//! - every child frame has a single parent

use std::collections::HashSet;

use contracts::{
    is_registration_disabled, ContractError, NodeConfig, REG_STRATEGY_KEY, REG_STRATEGY_NONE,
};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate a parsed node configuration.
///
/// Returns the first error encountered.
pub fn validate(config: &NodeConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_periods(config)?;
    validate_rig_count(config)?;
    validate_registration(config)?;
    validate_static_transforms(config)?;
    Ok(())
}

fn validate_fields(config: &NodeConfig) -> Result<(), ContractError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };
    let mut flat = Vec::new();
    flatten(String::new(), &errors, &mut flat);
    flat.sort();
    let (field, message) = flat
        .into_iter()
        .next()
        .unwrap_or_else(|| ("config".to_string(), errors.to_string()));
    Err(ContractError::config_validation(field, message))
}

fn flatten(prefix: String, errors: &ValidationErrors, out: &mut Vec<(String, String)>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| (path.clone(), e.to_string())));
            }
            ValidationErrorsKind::Struct(inner) => flatten(path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}

fn validate_periods(config: &NodeConfig) -> Result<(), ContractError> {
    for (field, value) in [
        ("sync.max_interval_s", config.sync.max_interval_s),
        ("watchdog.warn_after_s", config.watchdog.warn_after_s),
    ] {
        if !value.is_finite() {
            return Err(ContractError::config_validation(
                field,
                format!("must be a finite number of seconds, got {value}"),
            ));
        }
    }
    Ok(())
}

fn validate_rig_count(config: &NodeConfig) -> Result<(), ContractError> {
    if !(1..=2).contains(&config.rgbd_cameras) {
        return Err(ContractError::config_validation(
            "rgbd_cameras",
            format!("must be 1 or 2, got {}", config.rgbd_cameras),
        ));
    }
    if let Some(depth_cameras) = config.depth_cameras {
        if depth_cameras < 0 {
            return Err(ContractError::config_validation(
                "depth_cameras",
                format!("must not be negative, got {depth_cameras}"),
            ));
        }
    }
    Ok(())
}

fn validate_registration(config: &NodeConfig) -> Result<(), ContractError> {
    match config.odometry.get(REG_STRATEGY_KEY) {
        Some(value) if !is_registration_disabled(value) => Err(ContractError::config_validation(
            format!("odometry.\"{REG_STRATEGY_KEY}\""),
            format!(
                "composite frames only support registration strategy {REG_STRATEGY_NONE}, got {value:?}"
            ),
        )),
        _ => Ok(()),
    }
}

fn validate_static_transforms(config: &NodeConfig) -> Result<(), ContractError> {
    let mut children = HashSet::new();
    for (idx, tf) in config.static_transforms.iter().enumerate() {
        let parent = tf.parent.trim_start_matches('/');
        let child = tf.child.trim_start_matches('/');
        if parent.is_empty() || child.is_empty() {
            return Err(ContractError::config_validation(
                format!("static_transforms[{idx}]"),
                "parent and child frames cannot be empty",
            ));
        }
        if parent == child {
            return Err(ContractError::config_validation(
                format!("static_transforms[{idx}]"),
                format!("frame '{child}' cannot be its own parent"),
            ));
        }
        if !children.insert(child) {
            return Err(ContractError::config_validation(
                format!("static_transforms[{idx}].child"),
                format!("duplicate child frame '{child}'"),
            ));
        }
        if tf
            .translation
            .iter()
            .chain(tf.rotation_rpy.iter())
            .any(|v| !v.is_finite())
        {
            return Err(ContractError::config_validation(
                format!("static_transforms[{idx}]"),
                "translation and rotation must be finite",
            ));
        }
    }
    Ok(())
}
