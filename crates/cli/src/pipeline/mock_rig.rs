//! Simulated camera rig
//!
//! Publishes synthetic color/depth/calibration messages for the node's
//! topology so a configuration can be run without cameras.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use contracts::{CameraInfo, Header, Image, ImageEncoding, NodeConfig, RgbdImage, Stamp};
use odometry_node::{ChannelInput, RigTopology};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::CliError;

/// Simulated rig settings
#[derive(Debug, Clone)]
pub struct MockRigConfig {
    pub rate_hz: f64,

    pub width: u32,

    pub height: u32,

    /// Stamp offset of rig 1 relative to rig 0
    pub rig_skew: Duration,

    /// Frame id per camera; the last one is reused for extra cameras
    pub camera_frames: Vec<String>,
}

impl Default for MockRigConfig {
    fn default() -> Self {
        Self {
            rate_hz: 30.0,
            width: 640,
            height: 480,
            rig_skew: Duration::from_millis(2),
            camera_frames: Vec::new(),
        }
    }
}

/// Camera frames implied by a node configuration: static transform children
/// that are nobody's parent, in config order, or the base frame.
pub fn default_camera_frames(config: &NodeConfig) -> Vec<String> {
    let normalize = |frame: &str| frame.trim_start_matches('/').to_string();
    let parents: Vec<String> = config
        .static_transforms
        .iter()
        .map(|tf| normalize(&tf.parent))
        .collect();

    let leaves: Vec<String> = config
        .static_transforms
        .iter()
        .map(|tf| normalize(&tf.child))
        .filter(|child| !parents.contains(child))
        .collect();

    if leaves.is_empty() {
        vec![config.frame_id.clone()]
    } else {
        leaves
    }
}

/// Synthetic message source for one topology
#[derive(Debug, Clone)]
pub struct MockRig {
    topology: RigTopology,
    config: MockRigConfig,
    start: Stamp,
    tick: u64,
}

impl MockRig {
    pub fn new(topology: RigTopology, config: MockRigConfig) -> Result<Self, CliError> {
        if !(config.rate_hz.is_finite() && config.rate_hz > 0.0) {
            return Err(CliError::mock_rig(format!(
                "rate must be > 0 Hz, got {}",
                config.rate_hz
            )));
        }
        if config.width == 0 || config.height == 0 {
            return Err(CliError::mock_rig(format!(
                "image size must be non-zero, got {}x{}",
                config.width, config.height
            )));
        }
        if config.camera_frames.is_empty() {
            return Err(CliError::mock_rig("no camera frame ids"));
        }

        let start = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| Stamp::from_nanos(d.as_nanos() as u64))
            .unwrap_or(Stamp::ZERO);

        Ok(Self {
            topology,
            config,
            start,
            tick: 0,
        })
    }

    pub fn topology(&self) -> RigTopology {
        self.topology
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.config.rate_hz)
    }

    /// Messages of the next capture, in publication order.
    pub fn next_messages(&mut self) -> Vec<ChannelInput> {
        let offset = Duration::from_secs_f64(self.tick as f64 / self.config.rate_hz);
        let stamp = self.start.saturating_add(offset);
        let tick = self.tick;
        self.tick += 1;

        match self.topology {
            RigTopology::SingleRgbd => vec![ChannelInput::Rgbd {
                index: 0,
                image: self.capture(0, stamp, tick),
            }],
            RigTopology::DualRgbd => vec![
                ChannelInput::Rgbd {
                    index: 0,
                    image: self.capture(0, stamp, tick),
                },
                ChannelInput::Rgbd {
                    index: 1,
                    image: self.capture(1, stamp.saturating_add(self.config.rig_skew), tick),
                },
            ],
            RigTopology::Split => {
                let capture = self.capture(0, stamp, tick);
                vec![
                    ChannelInput::Color(capture.rgb),
                    ChannelInput::Depth(capture.depth),
                    ChannelInput::CameraInfo(capture.camera_info),
                ]
            }
        }
    }

    fn camera_frame(&self, camera: usize) -> &str {
        let frames = &self.config.camera_frames;
        frames
            .get(camera)
            .or_else(|| frames.last())
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn capture(&self, camera: usize, stamp: Stamp, tick: u64) -> RgbdImage {
        let (width, height) = (self.config.width, self.config.height);
        let header = Header::new(stamp, self.camera_frame(camera));
        let pixels = (width * height) as usize;

        // Horizontal gradient that scrolls one column per tick
        let mut rgb = Vec::with_capacity(pixels * 3);
        for _y in 0..height {
            for x in 0..width {
                let v = ((x as u64 + tick) % 256) as u8;
                rgb.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }

        // Depth in millimeters, a tilted plane from 1 m to 3 m
        let mut depth = Vec::with_capacity(pixels * 2);
        for y in 0..height {
            let mm = 1000 + (2000 * y / height.max(1)) as u16;
            for _x in 0..width {
                depth.extend_from_slice(&mm.to_ne_bytes());
            }
        }

        let f = width as f64;
        RgbdImage {
            header: header.clone(),
            rgb: Image::new(header.clone(), width, height, ImageEncoding::Rgb8, rgb),
            depth: Image::new(header.clone(), width, height, ImageEncoding::Type16UC1, depth),
            camera_info: CameraInfo::pinhole(
                header,
                width,
                height,
                f,
                f,
                width as f64 / 2.0,
                height as f64 / 2.0,
            ),
        }
    }

    /// Publish captures at the configured rate until the receiver is dropped.
    pub fn start(mut self, capacity: usize) -> (mpsc::Receiver<ChannelInput>, JoinHandle<u64>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.period());
            let mut published = 0u64;
            debug!(
                topology = %self.topology,
                rate_hz = self.config.rate_hz,
                width = self.config.width,
                height = self.config.height,
                "simulated rig started"
            );

            'capture: loop {
                interval.tick().await;
                for message in self.next_messages() {
                    trace!(channel = message.channel_in(self.topology), stamp = %message.stamp(), "publish");
                    if tx.send(message).await.is_err() {
                        break 'capture;
                    }
                    published += 1;
                }
            }

            debug!(published, "simulated rig stopped");
            published
        });

        (rx, task)
    }
}
