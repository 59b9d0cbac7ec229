//! `info` command implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use contracts::NodeConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::pipeline::default_camera_frames;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    node: NodeInfo,
    sync: SyncInfo,
    watchdog_warn_after_s: f64,
    camera_frames: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    static_transforms: Vec<TransformInfo>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    odometry_params: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct NodeInfo {
    frame_id: String,
    rgbd_cameras: i64,
    subscribe_rgbd: bool,
    topology: String,
    subscribed_channels: Vec<&'static str>,
}

#[derive(Serialize)]
struct SyncInfo {
    mode: String,
    queue_size: usize,
    max_interval_s: f64,
}

#[derive(Serialize)]
struct TransformInfo {
    parent: String,
    child: String,
    translation: [f64; 3],
    rotation_rpy: [f64; 3],
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let info = build_config_info(&config, args)?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(config: &NodeConfig, args: &InfoArgs) -> Result<ConfigInfo> {
    let topology = odometry_node::select_topology(config)?;
    let subscribed_channels = topology.channels().to_vec();

    let static_transforms = if args.transforms {
        config
            .static_transforms
            .iter()
            .map(|tf| TransformInfo {
                parent: tf.parent.clone(),
                child: tf.child.clone(),
                translation: tf.translation,
                rotation_rpy: tf.rotation_rpy,
            })
            .collect()
    } else {
        Vec::new()
    };

    let odometry_params = if args.params {
        odometry_node::enforce_registration(&config.odometry)?
    } else {
        BTreeMap::new()
    };

    Ok(ConfigInfo {
        node: NodeInfo {
            frame_id: config.frame_id.clone(),
            rgbd_cameras: config.rgbd_cameras,
            subscribe_rgbd: config.subscribe_rgbd,
            topology: topology.to_string(),
            subscribed_channels,
        },
        sync: SyncInfo {
            mode: config.sync.mode.to_string(),
            queue_size: config.sync.queue_size,
            max_interval_s: config.sync.max_interval_s,
        },
        watchdog_warn_after_s: config.watchdog.warn_after_s,
        camera_frames: default_camera_frames(config),
        static_transforms,
        odometry_params,
    })
}

fn print_config_info(info: &ConfigInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║             RGB-D Odometry Front-End Configuration           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📍 Node");
    println!("   ├─ Base frame: {}", info.node.frame_id);
    println!("   ├─ RGB-D cameras: {}", info.node.rgbd_cameras);
    println!("   ├─ Combined rig messages: {}", info.node.subscribe_rgbd);
    println!("   ├─ Topology: {}", info.node.topology);
    println!("   └─ Channels: {}", info.node.subscribed_channels.join(", "));

    println!("\n⚙️  Sync Settings");
    println!("   ├─ Mode: {}", info.sync.mode);
    println!("   ├─ Queue size: {}", info.sync.queue_size);
    println!("   ├─ Max interval: {:.3}s", info.sync.max_interval_s);
    println!("   └─ Watchdog: {:.1}s", info.watchdog_warn_after_s);

    println!("\n📷 Camera frames: {}", info.camera_frames.join(", "));

    if !info.static_transforms.is_empty() {
        println!("\n🔗 Static Transforms ({})", info.static_transforms.len());
        for (i, tf) in info.static_transforms.iter().enumerate() {
            let prefix = if i + 1 == info.static_transforms.len() { "└─" } else { "├─" };
            println!(
                "   {} {} -> {} (xyz {:?}, rpy {:?})",
                prefix, tf.parent, tf.child, tf.translation, tf.rotation_rpy
            );
        }
    }

    if !info.odometry_params.is_empty() {
        println!("\n🧭 Odometry Parameters");
        for (i, (key, value)) in info.odometry_params.iter().enumerate() {
            let prefix = if i + 1 == info.odometry_params.len() { "└─" } else { "├─" };
            println!("   {} {} = {}", prefix, key, value);
        }
    }

    println!();
}
