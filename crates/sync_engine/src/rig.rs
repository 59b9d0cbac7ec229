//! Topology-tagged synchronizer for one or two RGB-D rigs.

use std::fmt;

use contracts::{BufferStats, CameraInfo, CameraInput, ChannelDepth, Image, RgbdImage, SyncConfig};
use tracing::{debug, instrument, trace};

use crate::buffer::Stamped;
use crate::policy::{spread, MatchPolicy};
use crate::synchronizer::{PairSynchronizer, Synchronizer, TripleSynchronizer};
use crate::SyncError;

pub const RGBD_IMAGE: &str = "rgbd_image";
pub const RGBD_IMAGE0: &str = "rgbd_image0";
pub const RGBD_IMAGE1: &str = "rgbd_image1";
/// Combined message for a rig index no topology has
pub const RGBD_IMAGE_UNKNOWN: &str = "rgbd_image_unknown";
pub const RGB_IMAGE: &str = "rgb/image";
pub const DEPTH_IMAGE: &str = "depth/image";
pub const RGB_CAMERA_INFO: &str = "rgb/camera_info";

/// Input wiring, fixed for the lifetime of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigTopology {
    /// One combined channel
    SingleRgbd,
    /// Two combined channels
    DualRgbd,
    /// Separate color, depth and calibration channels for one camera
    Split,
}

impl RigTopology {
    pub fn name(self) -> &'static str {
        match self {
            Self::SingleRgbd => "single_rgbd",
            Self::DualRgbd => "dual_rgbd",
            Self::Split => "split",
        }
    }

    /// Cameras per synchronized group
    pub fn camera_count(self) -> usize {
        match self {
            Self::DualRgbd => 2,
            Self::SingleRgbd | Self::Split => 1,
        }
    }

    /// Channel names this topology listens on
    pub fn channels(self) -> &'static [&'static str] {
        match self {
            Self::SingleRgbd => &[RGBD_IMAGE],
            Self::DualRgbd => &[RGBD_IMAGE0, RGBD_IMAGE1],
            Self::Split => &[RGB_IMAGE, DEPTH_IMAGE, RGB_CAMERA_INFO],
        }
    }
}

impl fmt::Display for RigTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One inbound message, tagged with the channel it arrived on
#[derive(Debug, Clone)]
pub enum ChannelInput {
    Color(Image),
    Depth(Image),
    CameraInfo(CameraInfo),
    Rgbd { index: usize, image: RgbdImage },
}

impl ChannelInput {
    /// Channel label without topology context; combined rigs are numbered.
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Color(_) => RGB_IMAGE,
            Self::Depth(_) => DEPTH_IMAGE,
            Self::CameraInfo(_) => RGB_CAMERA_INFO,
            Self::Rgbd { index: 0, .. } => RGBD_IMAGE0,
            Self::Rgbd { index: 1, .. } => RGBD_IMAGE1,
            Self::Rgbd { .. } => RGBD_IMAGE_UNKNOWN,
        }
    }

    /// Channel label as subscribed by `topology`
    pub fn channel_in(&self, topology: RigTopology) -> &'static str {
        match (topology, self) {
            (RigTopology::SingleRgbd, Self::Rgbd { index: 0, .. }) => RGBD_IMAGE,
            _ => self.channel(),
        }
    }

    pub fn stamp(&self) -> contracts::Stamp {
        match self {
            Self::Color(image) | Self::Depth(image) => image.stamp(),
            Self::CameraInfo(info) => Stamped::stamp(info),
            Self::Rgbd { image, .. } => image.stamp(),
        }
    }
}

/// Time-aligned cameras, in placement order
#[derive(Debug, Clone)]
pub struct SyncGroup {
    pub cameras: Vec<CameraInput>,
}

/// Single combined channel: every message is a complete group
#[derive(Debug, Clone)]
pub struct PassThrough {
    policy: MatchPolicy,
    queue_size: usize,
    groups_emitted: u64,
}

/// Multi-stream synchronizer, one variant per topology
#[derive(Debug)]
pub enum RigSynchronizer {
    SingleRgbd(PassThrough),
    DualRgbd(PairSynchronizer<RgbdImage, RgbdImage>),
    Split(TripleSynchronizer<Image, Image, CameraInfo>),
}

impl RigSynchronizer {
    /// Build the synchronizer for `topology`.
    pub fn new(topology: RigTopology, config: &SyncConfig) -> Self {
        let policy = MatchPolicy::from_config(config);
        let queue_size = config.queue_size;
        match topology {
            RigTopology::SingleRgbd => Self::SingleRgbd(PassThrough {
                policy,
                queue_size,
                groups_emitted: 0,
            }),
            RigTopology::DualRgbd => Self::DualRgbd(PairSynchronizer::new(
                policy,
                queue_size,
                [RGBD_IMAGE0, RGBD_IMAGE1],
            )),
            RigTopology::Split => Self::Split(TripleSynchronizer::new(
                policy,
                queue_size,
                [RGB_IMAGE, DEPTH_IMAGE, RGB_CAMERA_INFO],
            )),
        }
    }

    pub fn topology(&self) -> RigTopology {
        match self {
            Self::SingleRgbd(_) => RigTopology::SingleRgbd,
            Self::DualRgbd(_) => RigTopology::DualRgbd,
            Self::Split(_) => RigTopology::Split,
        }
    }

    pub fn policy(&self) -> &MatchPolicy {
        match self {
            Self::SingleRgbd(pass) => &pass.policy,
            Self::DualRgbd(sync) => sync.policy(),
            Self::Split(sync) => sync.policy(),
        }
    }

    /// Channel names this topology listens on
    pub fn subscribed_channels(&self) -> &[&'static str] {
        match self {
            Self::SingleRgbd(_) => &[RGBD_IMAGE],
            Self::DualRgbd(sync) => sync.channels(),
            Self::Split(sync) => sync.channels(),
        }
    }

    /// Empty synchronizer of the same topology and settings
    pub fn fresh(&self) -> Self {
        match self {
            Self::SingleRgbd(pass) => Self::SingleRgbd(PassThrough {
                policy: pass.policy,
                queue_size: pass.queue_size,
                groups_emitted: 0,
            }),
            Self::DualRgbd(sync) => Self::DualRgbd(sync.fresh()),
            Self::Split(sync) => Self::Split(sync.fresh()),
        }
    }

    /// Feed one message; returns a group when it completes one.
    #[instrument(
        level = "trace",
        name = "rig_sync_push",
        skip(self, input),
        fields(channel = input.channel_in(self.topology()), stamp = %input.stamp())
    )]
    pub fn push(&mut self, input: ChannelInput) -> Result<Option<SyncGroup>, SyncError> {
        let topology = self.topology();
        let evicted_before = self.stats().evicted;

        let group = match (&mut *self, input) {
            (Self::SingleRgbd(pass), ChannelInput::Rgbd { index: 0, image }) => {
                pass.groups_emitted += 1;
                Some(SyncGroup {
                    cameras: vec![image.into_camera_input()],
                })
            }
            (Self::SingleRgbd(_), ChannelInput::Rgbd { index, .. }) => {
                return Err(SyncError::RigIndexOutOfRange { index, rigs: 1 });
            }
            (Self::DualRgbd(sync), ChannelInput::Rgbd { index, image }) => {
                let matched = match index {
                    0 => sync.push_first(image),
                    1 => sync.push_second(image),
                    _ => return Err(SyncError::RigIndexOutOfRange { index, rigs: 2 }),
                };
                matched.map(|(first, second)| SyncGroup {
                    cameras: vec![first.into_camera_input(), second.into_camera_input()],
                })
            }
            (Self::Split(sync), ChannelInput::Color(image)) => {
                sync.push_first(image).map(into_split_group)
            }
            (Self::Split(sync), ChannelInput::Depth(image)) => {
                sync.push_second(image).map(into_split_group)
            }
            (Self::Split(sync), ChannelInput::CameraInfo(info)) => {
                sync.push_third(info).map(into_split_group)
            }
            (_, input) => {
                return Err(SyncError::InactiveChannel {
                    channel: input.channel_in(topology),
                    topology: topology.name(),
                });
            }
        };

        let stats = self.stats();
        for channel in &stats.channels {
            observability::record_buffer_depth(channel.channel, channel.depth);
        }
        if stats.evicted > evicted_before {
            debug!(
                evicted = stats.evicted - evicted_before,
                total_evicted = stats.evicted,
                "synchronizer buffer full, oldest message evicted"
            );
            observability::record_messages_evicted(stats.evicted - evicted_before);
        }

        if let Some(group) = &group {
            let skew = spread(group.cameras.iter().flat_map(|camera| {
                [camera.color.stamp(), camera.depth.stamp(), camera.info.header.stamp]
            }));
            trace!(
                cameras = group.cameras.len(),
                skew_ms = skew.as_secs_f64() * 1000.0,
                "group synchronized"
            );
            observability::record_group_synced(skew.as_secs_f64() * 1000.0);
        }

        Ok(group)
    }

    /// Current buffer status
    pub fn stats(&self) -> BufferStats {
        match self {
            Self::SingleRgbd(pass) => BufferStats {
                channels: vec![ChannelDepth {
                    channel: RGBD_IMAGE,
                    depth: 0,
                    evicted: 0,
                }],
                total_buffered: 0,
                evicted: 0,
                groups_emitted: pass.groups_emitted,
                oldest_stamp: None,
                newest_stamp: None,
            },
            Self::DualRgbd(sync) => sync.stats(),
            Self::Split(sync) => sync.stats(),
        }
    }
}

fn into_split_group((color, depth, info): (Image, Image, CameraInfo)) -> SyncGroup {
    SyncGroup {
        cameras: vec![CameraInput { color, depth, info }],
    }
}
