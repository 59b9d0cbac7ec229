//! Run statistics.

use std::time::Duration;

use contracts::BufferStats;
use observability::FrameMetricsAggregator;
use odometry_node::NodeStats;

/// Statistics from one run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Topology the node ran with
    pub topology: String,

    /// Node counters at shutdown
    pub node: NodeStats,

    /// Synchronizer buffers at shutdown
    pub buffers: BufferStats,

    /// Dispatched frames and drops, with latency and period statistics
    pub frame_metrics: FrameMetricsAggregator,

    /// Watchdog warnings emitted
    pub watchdog_warnings: u64,

    pub duration: Duration,
}

impl PipelineStats {
    /// Dispatched frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.node.frames_dispatched as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of synchronized groups that never reached the engine, in percent
    pub fn drop_rate(&self) -> f64 {
        if self.node.groups_synced > 0 {
            self.node.total_dropped() as f64 / self.node.groups_synced as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                   Odometry Front-End Run                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Topology: {}", self.topology);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Messages received: {}", self.node.messages_received);
        println!("   ├─ Messages rejected: {}", self.node.messages_rejected);
        println!("   ├─ Groups synchronized: {}", self.node.groups_synced);
        println!("   ├─ Frames dispatched: {}", self.node.frames_dispatched);
        println!("   ├─ FPS: {:.2}", self.fps());
        println!("   └─ Watchdog warnings: {}", self.watchdog_warnings);

        let summary = self.frame_metrics.summary();
        println!("\n📈 Frame Metrics");
        println!(
            "   ├─ Groups dropped: {} ({:.2}%)",
            self.node.total_dropped(),
            self.drop_rate()
        );
        println!("   ├─ Skipped while paused: {}", self.node.groups_skipped_paused);
        println!("   ├─ Engine errors: {}", self.node.engine_errors);
        println!("   ├─ Assembly + dispatch (ms): {}", summary.assembly_latency_ms);
        println!("   └─ Frame period (ms): {}", summary.frame_period_ms);

        if !self.node.groups_dropped.is_empty() {
            println!("\n⚠️  Drop Reasons");
            for (reason, count) in &self.node.groups_dropped {
                println!("   ├─ {reason}: {count}");
            }
        }

        println!("\n🗃  Synchronizer Buffers");
        println!("   ├─ Evicted unmatched: {}", self.buffers.evicted);
        for channel in &self.buffers.channels {
            println!("   ├─ {}: {} buffered", channel.channel, channel.depth);
        }
        println!("   └─ Total buffered: {}", self.buffers.total_buffered);

        println!();
    }
}
