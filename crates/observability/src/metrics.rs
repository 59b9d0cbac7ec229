//! Front-end metrics
//!
//! Prometheus-facing recorders plus an in-memory aggregator for run summaries.

use std::collections::BTreeMap;

use contracts::{CompositeFrame, Stamp};
use metrics::{counter, gauge, histogram};

/// Record a completed synchronizer group
///
/// `skew_ms` is the spread of all stamps inside the group.
pub fn record_group_synced(skew_ms: f64) {
    counter!("rgbd_odom_groups_synced_total").increment(1);
    histogram!("rgbd_odom_stamp_skew_ms").record(skew_ms);
}

/// Record a composite frame handed to the odometry engine
pub fn record_frame_dispatched(engine: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "rgbd_odom_frames_dispatched_total",
        "engine" => engine.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record a group abandoned before dispatch
pub fn record_group_dropped(reason: &'static str) {
    counter!("rgbd_odom_groups_dropped_total", "reason" => reason).increment(1);
}

/// Record validate + normalize + resolve + assemble time for one group
pub fn record_assembly_latency_ms(latency_ms: f64) {
    histogram!("rgbd_odom_assembly_latency_ms").record(latency_ms);
}

/// Record synchronizer buffer depth
pub fn record_buffer_depth(channel: &'static str, depth: usize) {
    gauge!("rgbd_odom_buffer_depth", "channel" => channel).set(depth as f64);
}

/// Record messages evicted unmatched from full synchronizer buffers
pub fn record_messages_evicted(count: u64) {
    counter!("rgbd_odom_messages_evicted_total").increment(count);
}

/// In-memory aggregation of dispatched frames and drops
#[derive(Debug, Clone, Default)]
pub struct FrameMetricsAggregator {
    /// Frames handed to the engine
    pub total_frames: u64,

    /// Groups abandoned before dispatch
    pub total_dropped: u64,

    /// Frames the engine rejected
    pub engine_failures: u64,

    /// Drops per reason label
    pub drop_reasons: BTreeMap<String, u64>,

    /// Assembly latency (ms)
    pub latency_stats: RunningStats,

    /// Interval between consecutive frame stamps (ms)
    pub period_stats: RunningStats,

    last_stamp: Option<Stamp>,
}

impl FrameMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one dispatched frame.
    pub fn update(&mut self, frame: &CompositeFrame, latency_ms: f64) {
        self.total_frames += 1;
        self.latency_stats.push(latency_ms);

        if let Some(last) = self.last_stamp {
            if frame.stamp >= last {
                self.period_stats
                    .push(frame.stamp.abs_diff(last).as_secs_f64() * 1000.0);
            }
        }
        self.last_stamp = Some(frame.stamp);
    }

    /// Account for a frame the engine refused.
    pub fn record_engine_failure(&mut self) {
        self.engine_failures += 1;
    }

    /// Account for one abandoned group.
    pub fn record_drop(&mut self, reason: &str) {
        self.total_dropped += 1;
        *self.drop_reasons.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn summary(&self) -> MetricsSummary {
        let attempted = self.total_frames + self.total_dropped;
        MetricsSummary {
            total_frames: self.total_frames,
            total_dropped: self.total_dropped,
            engine_failures: self.engine_failures,
            drop_rate: if attempted > 0 {
                self.total_dropped as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            assembly_latency_ms: StatsSummary::from(&self.latency_stats),
            frame_period_ms: StatsSummary::from(&self.period_stats),
            drop_reasons: self.drop_reasons.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Run summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub total_dropped: u64,
    pub engine_failures: u64,
    pub drop_rate: f64,
    pub assembly_latency_ms: StatsSummary,
    pub frame_period_ms: StatsSummary,
    pub drop_reasons: BTreeMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Frame Metrics Summary ===")?;
        writeln!(f, "Frames dispatched: {}", self.total_frames)?;
        writeln!(
            f,
            "Groups dropped: {} ({:.2}%)",
            self.total_dropped, self.drop_rate
        )?;
        writeln!(f, "Engine failures: {}", self.engine_failures)?;
        writeln!(f, "Assembly latency (ms): {}", self.assembly_latency_ms)?;
        writeln!(f, "Frame period (ms): {}", self.frame_period_ms)?;

        if !self.drop_reasons.is_empty() {
            writeln!(f, "Drop reasons:")?;
            for (reason, count) in &self.drop_reasons {
                writeln!(f, "  {}: {}", reason, count)?;
            }
        }

        Ok(())
    }
}

/// Summary of one [`RunningStats`]
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online mean/variance (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{PixelBuffer, PixelType};

    fn frame(sequence: u64, secs: f64) -> CompositeFrame {
        CompositeFrame {
            sequence,
            stamp: Stamp::from_secs_f64(secs),
            color: PixelBuffer::zeroed(PixelType::U8C1, 1, 1),
            depth: PixelBuffer::zeroed(PixelType::U16C1, 1, 1),
            camera_models: Vec::new(),
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_tracks_frame_period() {
        let mut aggregator = FrameMetricsAggregator::new();
        aggregator.update(&frame(0, 1.0), 2.0);
        aggregator.update(&frame(1, 1.1), 4.0);
        aggregator.record_engine_failure();

        let summary = aggregator.summary();
        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.engine_failures, 1);
        assert_eq!(summary.frame_period_ms.count, 1);
        assert!((summary.frame_period_ms.mean - 100.0).abs() < 1e-6);
        assert!((summary.assembly_latency_ms.mean - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_drop_rate() {
        let mut aggregator = FrameMetricsAggregator::new();
        aggregator.update(&frame(0, 1.0), 1.0);
        aggregator.record_drop("unsupported_encoding");
        aggregator.record_drop("unsupported_encoding");
        aggregator.record_drop("transform_unavailable");

        let summary = aggregator.summary();
        assert_eq!(summary.total_dropped, 3);
        assert!((summary.drop_rate - 75.0).abs() < 1e-10);
        assert_eq!(summary.drop_reasons.get("unsupported_encoding"), Some(&2));

        let report = summary.to_string();
        assert!(report.contains("transform_unavailable: 1"));

        aggregator.reset();
        assert_eq!(aggregator.summary().total_frames, 0);
    }

    #[test]
    fn test_empty_stats_display() {
        assert_eq!(StatsSummary::default().to_string(), "N/A");
    }
}
