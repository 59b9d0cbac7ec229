//! `run` command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use contracts::NodeConfig;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{default_camera_frames, MockRigConfig, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        frame_id = %config.frame_id,
        rgbd_cameras = config.rgbd_cameras,
        subscribe_rgbd = config.subscribe_rgbd,
        sync_mode = %config.sync.mode,
        static_transforms = config.static_transforms.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let pipeline_config = build_pipeline_config(args, config);
    let pipeline = Pipeline::new(pipeline_config);

    info!("Starting odometry front-end...");
    let stats = pipeline
        .run(shutdown_signal())
        .await
        .context("Odometry front-end failed")?;

    info!(
        frames_dispatched = stats.node.frames_dispatched,
        groups_dropped = stats.node.total_dropped(),
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Run finished"
    );
    stats.print_summary();

    Ok(())
}

fn build_pipeline_config(args: &RunArgs, node: NodeConfig) -> PipelineConfig {
    let camera_frames = if args.camera_frames.is_empty() {
        default_camera_frames(&node)
    } else {
        args.camera_frames.clone()
    };

    PipelineConfig {
        rig: MockRigConfig {
            rate_hz: args.rate_hz,
            width: args.width,
            height: args.height,
            rig_skew: Duration::from_micros((args.rig_skew_ms.max(0.0) * 1000.0).round() as u64),
            camera_frames,
        },
        node,
        max_frames: (args.max_frames > 0).then_some(args.max_frames),
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        buffer_size: args.buffer_size,
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &NodeConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Node:");
    println!("  Base frame: {}", config.frame_id);
    println!("  RGB-D cameras: {}", config.rgbd_cameras);
    println!("  Subscription: {:?}", config.subscription_mode());

    println!("\nSync Settings:");
    println!("  Mode: {}", config.sync.mode);
    println!("  Queue size: {}", config.sync.queue_size);
    println!("  Max interval: {:.3}s", config.sync.max_interval_s);
    println!("  Watchdog: {:.1}s", config.watchdog.warn_after_s);

    if !config.static_transforms.is_empty() {
        println!("\nStatic Transforms ({}):", config.static_transforms.len());
        for tf in &config.static_transforms {
            println!("  - {} -> {}", tf.parent, tf.child);
        }
    }

    println!();
}
