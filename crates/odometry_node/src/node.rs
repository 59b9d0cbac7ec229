//! Pipeline controller.

use std::time::Instant;

use contracts::{BufferStats, NodeConfig, OdometryEngine, Stamp, TransformLookup};
use frame_assembly::{assemble_group, FrameError};
use sync_engine::{ChannelInput, RigSynchronizer, RigTopology, SyncError, SyncGroup};
use tracing::{debug, info, instrument, warn};

use crate::topology::{enforce_registration, select_topology};
use crate::{CallbackMonitor, NodeError, NodeStats};

/// What one inbound message led to
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// Buffered, no group completed yet
    Buffered,
    /// Refused by the synchronizer
    Rejected(SyncError),
    /// A group completed while paused and was discarded
    SkippedPaused,
    /// A group completed but could not be assembled
    Dropped(FrameError),
    /// A composite frame reached the engine
    Dispatched { sequence: u64, stamp: Stamp },
    /// The engine returned an error for this frame
    EngineFailed { sequence: u64, stamp: Stamp },
}

/// RGB-D odometry front-end
///
/// Owns the synchronizer and drives every completed group through assembly
/// into the engine. All entry points take `&mut self`, so a flush can never
/// interleave with a message.
pub struct RgbdOdometryNode<E, L> {
    base_frame: String,
    sync: RigSynchronizer,
    engine: E,
    lookup: L,
    paused: bool,
    next_sequence: u64,
    stats: NodeStats,
    monitor: CallbackMonitor,
}

impl<E, L> RgbdOdometryNode<E, L>
where
    E: OdometryEngine,
    L: TransformLookup,
{
    /// Build the node and configure the engine.
    ///
    /// # Errors
    /// Rig count outside {1, 2}, a registration strategy other than `"0"`,
    /// or an engine that rejects its parameters.
    pub fn new(config: &NodeConfig, mut engine: E, lookup: L) -> Result<Self, NodeError> {
        let topology = select_topology(config)?;
        let params = enforce_registration(&config.odometry)?;
        engine.configure(&params)?;

        let sync = RigSynchronizer::new(topology, &config.sync);
        let summary = subscription_summary(&sync);
        let monitor = CallbackMonitor::new(
            config.watchdog.warn_after(),
            summary.clone(),
            config.sync.mode,
            Instant::now(),
        );

        info!(
            topology = %topology,
            engine = engine.name(),
            frame_id = %config.frame_id,
            queue_size = config.sync.queue_size,
            "{}",
            summary
        );

        Ok(Self {
            base_frame: config.frame_id.clone(),
            sync,
            engine,
            lookup,
            paused: false,
            next_sequence: 0,
            stats: NodeStats::default(),
            monitor,
        })
    }

    /// Feed one inbound message.
    #[instrument(
        level = "debug",
        name = "odometry_node_handle",
        skip(self, input),
        fields(channel = input.channel_in(self.topology()))
    )]
    pub fn handle(&mut self, input: ChannelInput) -> NodeEvent {
        self.stats.messages_received += 1;

        let group = match self.sync.push(input) {
            Ok(Some(group)) => group,
            Ok(None) => return NodeEvent::Buffered,
            Err(err) => {
                warn!(error = %err, "message rejected");
                self.stats.messages_rejected += 1;
                return NodeEvent::Rejected(err);
            }
        };

        self.stats.groups_synced += 1;
        self.monitor.record_callback(Instant::now());

        if self.paused {
            debug!("node paused, group skipped");
            self.stats.groups_skipped_paused += 1;
            return NodeEvent::SkippedPaused;
        }

        self.process_group(group)
    }

    fn process_group(&mut self, group: SyncGroup) -> NodeEvent {
        let started = Instant::now();
        let sequence = self.next_sequence;

        let frame = match assemble_group(sequence, group.cameras, &self.base_frame, &self.lookup) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(
                    error = %err,
                    kind = err.kind(),
                    camera = ?err.camera(),
                    "composite frame assembly failed, dropping group"
                );
                self.stats.record_drop(err.kind());
                observability::record_group_dropped(err.kind());
                return NodeEvent::Dropped(err);
            }
        };
        observability::record_assembly_latency_ms(started.elapsed().as_secs_f64() * 1000.0);

        self.next_sequence += 1;
        let stamp = frame.stamp;
        debug!(
            sequence,
            %stamp,
            cameras = frame.camera_count(),
            width = frame.color.width,
            height = frame.color.height,
            "dispatching composite frame"
        );

        match self.engine.process_data(frame, stamp) {
            Ok(()) => {
                self.stats.frames_dispatched += 1;
                observability::record_frame_dispatched(self.engine.name(), true);
                NodeEvent::Dispatched { sequence, stamp }
            }
            Err(err) => {
                warn!(error = %err, sequence, "odometry engine failed");
                self.stats.engine_errors += 1;
                observability::record_frame_dispatched(self.engine.name(), false);
                NodeEvent::EngineFailed { sequence, stamp }
            }
        }
    }

    /// Stop producing frames; inbound messages keep being synchronized.
    pub fn pause(&mut self) {
        if !self.paused {
            info!("odometry paused");
            self.paused = true;
        }
    }

    pub fn resume(&mut self) {
        if self.paused {
            info!("odometry resumed");
            self.paused = false;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Replace the synchronizer with an empty one of the same settings.
    pub fn flush(&mut self) {
        let fresh = self.sync.fresh();
        let discarded = std::mem::replace(&mut self.sync, fresh);
        self.stats.flushes += 1;
        info!(
            discarded = discarded.stats().total_buffered,
            "synchronizer flushed"
        );
    }

    /// Warn when input has been missing for too long.
    pub fn check_watchdog(&mut self, now: Instant) -> Option<String> {
        self.monitor.check(now)
    }

    pub fn subscription_summary(&self) -> String {
        subscription_summary(&self.sync)
    }

    pub fn topology(&self) -> RigTopology {
        self.sync.topology()
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    pub fn buffer_stats(&self) -> BufferStats {
        self.sync.stats()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}

fn subscription_summary(sync: &RigSynchronizer) -> String {
    let policy = sync.policy();
    let mode = match policy.mode {
        contracts::SyncMode::Exact => "exact".to_string(),
        contracts::SyncMode::Approximate => format!(
            "approx, max interval {:.3}s",
            policy.max_interval.as_secs_f64()
        ),
    };
    format!(
        "Subscribed to ({} topology, {} sync): {}",
        sync.topology(),
        mode,
        sync.subscribed_channels().join(", ")
    )
}
