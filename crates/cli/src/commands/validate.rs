//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{NodeConfig, SubscriptionMode, SyncMode};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    frame_id: String,
    topology: String,
    sync_mode: String,
    queue_size: usize,
    static_transform_count: usize,
    odometry_param_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    let loaded = config_loader::ConfigLoader::load_from_path(&args.config)
        .map_err(|e| e.to_string())
        .and_then(|config| {
            odometry_node::select_topology(&config)
                .map(|topology| (config, topology))
                .map_err(|e| e.to_string())
        });

    match loaded {
        Ok((config, topology)) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    frame_id: config.frame_id.clone(),
                    topology: topology.to_string(),
                    sync_mode: config.sync.mode.to_string(),
                    queue_size: config.sync.queue_size,
                    static_transform_count: config.static_transforms.len(),
                    odometry_param_count: config.odometry.len(),
                }),
            }
        }
        Err(error) => ValidationResult {
            valid: false,
            config_path,
            error: Some(error),
            warnings: None,
            summary: None,
        },
    }
}

/// Non-fatal issues
fn collect_warnings(config: &NodeConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.depth_cameras.is_some() {
        warnings.push(
            "depth_cameras is ignored, it has been replaced by rgbd_cameras with subscribe_rgbd = true"
                .to_string(),
        );
    }

    if config.subscription_mode() == SubscriptionMode::Split && config.rgbd_cameras > 1 {
        warnings.push(format!(
            "rgbd_cameras = {} requires subscribe_rgbd = true, a single split camera will be used",
            config.rgbd_cameras
        ));
    }

    if config.sync.mode == SyncMode::Exact {
        warnings.push(
            "exact synchronization needs identical stamps on every channel; \
             consider approximate synchronization for independent sensors"
                .to_string(),
        );
    }

    if config.static_transforms.is_empty() {
        warnings.push(format!(
            "no static transforms configured - camera frames must be '{}' to resolve",
            config.frame_id
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Base frame: {}", summary.frame_id);
            println!("  Topology: {}", summary.topology);
            println!("  Sync: {} (queue {})", summary.sync_mode, summary.queue_size);
            println!("  Static transforms: {}", summary.static_transform_count);
            println!("  Odometry parameters: {}", summary.odometry_param_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
