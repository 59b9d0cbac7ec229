//! Run loop: one task drives the node from the simulated rig.

use std::future::Future;
use std::time::{Duration, Instant};

use anyhow::Result;
use contracts::NodeConfig;
use odometry_node::{NodeEvent, RgbdOdometryNode, StaticTransformTree};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::{LoggingOdometry, MockRig, MockRigConfig, PipelineStats};
use crate::error::CliError;

const WATCHDOG_TICK: Duration = Duration::from_secs(1);
const PROGRESS_EVERY: u64 = 100;

/// Run configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub node: NodeConfig,

    pub rig: MockRigConfig,

    /// Stop after this many dispatched frames (None = unlimited)
    pub max_frames: Option<u64>,

    /// Stop after this long (None = no timeout)
    pub timeout: Option<Duration>,

    /// Rig to node channel capacity
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Node driver
pub struct Pipeline {
    config: PipelineConfig,
}

type Node = RgbdOdometryNode<LoggingOdometry, StaticTransformTree>;

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `shutdown` resolves, the frame limit or the timeout is hit.
    pub async fn run<F>(self, shutdown: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let lookup = StaticTransformTree::from_config(&self.config.node.static_transforms);
        info!(transforms = lookup.len(), "Static transform tree loaded");

        let mut node: Node = RgbdOdometryNode::new(&self.config.node, LoggingOdometry::new(), lookup)
            .map_err(CliError::from)?;
        let rig = MockRig::new(node.topology(), self.config.rig.clone())?;
        info!(
            topology = %rig.topology(),
            period_ms = rig.period().as_secs_f64() * 1000.0,
            "{}",
            node.subscription_summary()
        );

        let (mut rx, rig_task) = rig.start(self.config.buffer_size);

        let mut watchdog = tokio::time::interval(WATCHDOG_TICK);
        watchdog.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let deadline = self.config.timeout;
        let timeout = async move {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(timeout);
        tokio::pin!(shutdown);

        let mut stats = PipelineStats {
            topology: node.topology().to_string(),
            ..Default::default()
        };

        loop {
            tokio::select! {
                biased;

                _ = &mut timeout => {
                    warn!(timeout_secs = deadline.map(|d| d.as_secs_f64()), "Run timed out");
                    break;
                }
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping...");
                    break;
                }
                message = rx.recv() => {
                    let Some(message) = message else {
                        warn!("Simulated rig stopped publishing");
                        break;
                    };
                    let started = Instant::now();
                    let event = node.handle(message);
                    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                    record_event(&mut stats, &node, &event, elapsed_ms);

                    let dispatched = node.stats().frames_dispatched;
                    if matches!(event, NodeEvent::Dispatched { .. }) {
                        if dispatched % PROGRESS_EVERY == 0 {
                            info!(
                                frames = dispatched,
                                fps = format!("{:.2}", dispatched as f64 / start_time.elapsed().as_secs_f64()),
                                "Odometry front-end running"
                            );
                        }
                        if self.config.max_frames.is_some_and(|max| dispatched >= max) {
                            info!(frames = dispatched, "Reached max frames limit");
                            break;
                        }
                    }
                }
                _ = watchdog.tick() => {
                    if node.check_watchdog(Instant::now()).is_some() {
                        stats.watchdog_warnings += 1;
                    }
                }
            }
        }

        info!("Shutting down...");
        drop(rx);
        match tokio::time::timeout(Duration::from_secs(1), rig_task).await {
            Ok(Ok(published)) => debug!(published, "Simulated rig joined"),
            Ok(Err(e)) => warn!(error = %e, "Simulated rig task failed"),
            Err(_) => warn!("Simulated rig did not stop in time"),
        }

        stats.node = node.stats().clone();
        stats.buffers = node.buffer_stats();
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            frames = stats.node.frames_dispatched,
            engine_frames = node.engine().frames(),
            fps = format!("{:.2}", stats.fps()),
            "Shutdown complete"
        );

        Ok(stats)
    }
}

fn record_event(stats: &mut PipelineStats, node: &Node, event: &NodeEvent, elapsed_ms: f64) {
    match event {
        NodeEvent::Dispatched { .. } => {
            if let Some(frame) = node.engine().last_frame() {
                stats.frame_metrics.update(frame, elapsed_ms);
            }
        }
        NodeEvent::EngineFailed { .. } => stats.frame_metrics.record_engine_failure(),
        NodeEvent::Dropped(err) => stats.frame_metrics.record_drop(err.kind()),
        NodeEvent::Buffered | NodeEvent::Rejected(_) | NodeEvent::SkippedPaused => {}
    }
}
