//! # Integration Tests
//!
//! Cross-crate and end-to-end tests of the odometry front-end.
//!
//! - configuration contract (loader output drives the node)
//! - scenario tests through `RgbdOdometryNode` with a recording engine
//! - async e2e run: simulated publisher task feeding the node

#[cfg(test)]
mod support {
    use contracts::{
        CameraInfo, CompositeFrame, ContractError, Header, Image, ImageEncoding, NodeConfig,
        OdometryEngine, ParametersMap, RgbdImage, Stamp, SyncMode,
    };
    use odometry_node::{ChannelInput, RgbdOdometryNode, StaticTransformTree};

    /// Engine that keeps every frame it receives
    #[derive(Debug, Default)]
    pub struct RecordingEngine {
        pub params: ParametersMap,
        pub frames: Vec<CompositeFrame>,
    }

    impl OdometryEngine for RecordingEngine {
        fn name(&self) -> &str {
            "recording"
        }

        fn configure(&mut self, params: &ParametersMap) -> Result<(), ContractError> {
            self.params = params.clone();
            Ok(())
        }

        fn process_data(&mut self, frame: CompositeFrame, stamp: Stamp) -> Result<(), ContractError> {
            assert_eq!(frame.stamp, stamp);
            self.frames.push(frame);
            Ok(())
        }
    }

    pub type TestNode = RgbdOdometryNode<RecordingEngine, StaticTransformTree>;

    pub fn rig_config(cameras: i64, mode: SyncMode) -> NodeConfig {
        let mut config = NodeConfig {
            rgbd_cameras: cameras,
            subscribe_rgbd: true,
            ..NodeConfig::default()
        };
        config.sync.mode = mode;
        config
    }

    pub fn node(config: &NodeConfig) -> TestNode {
        let lookup = StaticTransformTree::from_config(&config.static_transforms);
        RgbdOdometryNode::new(config, RecordingEngine::default(), lookup).unwrap()
    }

    pub fn image(stamp: Stamp, frame: &str, w: u32, h: u32, encoding: ImageEncoding, fill: u8) -> Image {
        let len = (w * h) as usize * encoding.bytes_per_pixel().unwrap_or(1);
        Image::new(Header::new(stamp, frame), w, h, encoding, vec![fill; len])
    }

    pub fn rgbd_with(
        secs: f64,
        frame: &str,
        w: u32,
        h: u32,
        color: ImageEncoding,
        depth: ImageEncoding,
        fill: u8,
    ) -> RgbdImage {
        let stamp = Stamp::from_secs_f64(secs);
        let header = Header::new(stamp, frame);
        RgbdImage {
            header: header.clone(),
            rgb: image(stamp, frame, w, h, color, fill),
            depth: image(stamp, frame, w, h, depth, fill),
            camera_info: CameraInfo::pinhole(
                header,
                w,
                h,
                w as f64,
                w as f64,
                w as f64 / 2.0,
                h as f64 / 2.0,
            ),
        }
    }

    pub fn rgbd(secs: f64, frame: &str, fill: u8) -> ChannelInput {
        ChannelInput::Rgbd {
            index: 0,
            image: rgbd_with(secs, frame, 4, 3, ImageEncoding::Mono8, ImageEncoding::Type16UC1, fill),
        }
    }

    pub fn rig(index: usize, secs: f64, fill: u8) -> ChannelInput {
        ChannelInput::Rgbd {
            index,
            image: rgbd_with(secs, "base_link", 4, 3, ImageEncoding::Mono8, ImageEncoding::Type16UC1, fill),
        }
    }
}

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ParametersMap, SyncMode, REG_STRATEGY_KEY};
    use nalgebra::Point3;
    use odometry_node::{NodeError, NodeEvent, RgbdOdometryNode, RigTopology, StaticTransformTree};

    use crate::support::{node, rgbd, RecordingEngine};

    const NODE_TOML: &str = r#"
frame_id = "base_link"
rgbd_cameras = 1
subscribe_rgbd = true

[sync]
mode = "approximate"
queue_size = 5
max_interval_s = 0.01

[odometry]
"Odom/Strategy" = "0"

[[static_transforms]]
parent = "base_link"
child = "camera_link"
translation = [0.1, 0.0, 0.2]
rotation_rpy = [0.0, 0.0, 0.0]
"#;

    #[test]
    fn test_loaded_config_drives_node() {
        let config = ConfigLoader::load_from_str(NODE_TOML, ConfigFormat::Toml).unwrap();
        let mut node = node(&config);
        assert_eq!(node.topology(), RigTopology::SingleRgbd);
        assert_eq!(node.engine().params[REG_STRATEGY_KEY], "0");
        assert_eq!(node.engine().params["Odom/Strategy"], "0");

        let event = node.handle(rgbd(1.0, "camera_link", 9));
        assert!(matches!(event, NodeEvent::Dispatched { sequence: 0, .. }));

        let model = &node.engine().frames[0].camera_models[0];
        assert_eq!(model.name, "camera_link");
        let origin = model.local_transform * Point3::origin();
        assert!((origin.x - 0.1).abs() < 1e-12);
        assert!((origin.z - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_registration_strategy_other_than_zero_fails_startup() {
        let mut config = crate::support::rig_config(1, SyncMode::Approximate);
        config
            .odometry
            .insert(REG_STRATEGY_KEY.to_string(), "1".to_string());

        let result = RgbdOdometryNode::new(
            &config,
            RecordingEngine::default(),
            StaticTransformTree::new(),
        );
        assert!(matches!(
            result.err(),
            Some(NodeError::IncompatibleRegistration { ref value }) if value == "1"
        ));
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_rig_count_three_fails_startup() {
        let config = crate::support::rig_config(3, SyncMode::Approximate);
        let result = RgbdOdometryNode::new(
            &config,
            RecordingEngine::default(),
            StaticTransformTree::new(),
        );
        assert!(matches!(
            result.err(),
            Some(NodeError::InvalidRigCount { count: 3 })
        ));
    }

    #[test]
    fn test_engine_receives_enforced_params() {
        let config = crate::support::rig_config(1, SyncMode::Exact);
        let node = node(&config);
        let mut expected = ParametersMap::new();
        expected.insert(REG_STRATEGY_KEY.to_string(), "0".to_string());
        assert_eq!(node.engine().params, expected);
        assert!(node.engine().frames.is_empty());
        assert_eq!(node.stats().messages_received, 0);
    }
}

#[cfg(test)]
mod scenario_tests {
    use contracts::{ImageEncoding, PixelType, Stamp, SyncMode};
    use odometry_node::{ChannelInput, NodeEvent};

    use crate::support::{node, rgbd_with, rig, rig_config};

    #[test]
    fn test_single_camera_400x300() {
        let config = rig_config(1, SyncMode::Approximate);
        let mut node = node(&config);
        let input = rgbd_with(
            12.5,
            "base_link",
            400,
            300,
            ImageEncoding::Mono8,
            ImageEncoding::Type16UC1,
            77,
        );

        let event = node.handle(ChannelInput::Rgbd { index: 0, image: input });
        assert_eq!(
            event,
            NodeEvent::Dispatched {
                sequence: 0,
                stamp: Stamp::from_secs_f64(12.5)
            }
        );

        let frame = &node.engine().frames[0];
        assert_eq!((frame.color.width, frame.color.height), (400, 300));
        assert_eq!((frame.depth.width, frame.depth.height), (400, 300));
        assert_eq!(frame.color.pixel_type, PixelType::U8C1);
        assert_eq!(frame.depth.pixel_type, PixelType::U16C1);
        assert_eq!(frame.camera_models.len(), 1);
        assert_eq!(frame.stamp, Stamp::from_secs_f64(12.5));
        assert_eq!(frame.camera_models[0].local_transform, nalgebra::Isometry3::identity());
    }

    #[test]
    fn test_two_rigs_within_tolerance_match() {
        let mut node = node(&rig_config(2, SyncMode::Approximate));

        assert_eq!(node.handle(rig(0, 10.000, 1)), NodeEvent::Buffered);
        let event = node.handle(rig(1, 10.005, 2));
        assert_eq!(
            event,
            NodeEvent::Dispatched {
                sequence: 0,
                stamp: Stamp::from_secs_f64(10.005)
            }
        );

        let frame = &node.engine().frames[0];
        assert_eq!(frame.color.width, 8);
        assert_eq!(frame.camera_width(), 4);
        assert_eq!(frame.color.pixel(0, 0), Some(&[1u8][..]));
        assert_eq!(frame.color.pixel(4, 0), Some(&[2u8][..]));
        assert_eq!(frame.depth.pixel(3, 2), Some(&[1u8, 1][..]));
        assert_eq!(frame.depth.pixel(4, 2), Some(&[2u8, 2][..]));
        assert_eq!(node.buffer_stats().total_buffered, 0);
    }

    #[test]
    fn test_two_rigs_outside_tolerance_stay_buffered() {
        let mut node = node(&rig_config(2, SyncMode::Approximate));

        assert_eq!(node.handle(rig(0, 10.000, 1)), NodeEvent::Buffered);
        assert_eq!(node.handle(rig(1, 10.020, 2)), NodeEvent::Buffered);
        assert!(node.engine().frames.is_empty());

        let buffers = node.buffer_stats();
        assert_eq!(buffers.total_buffered, 2);
        assert_eq!(buffers.channels.len(), 2);
        assert!(buffers.channels.iter().all(|c| c.depth == 1));
    }

    #[test]
    fn test_exact_mode_only_emits_identical_stamps() {
        let mut node = node(&rig_config(2, SyncMode::Exact));
        node.handle(rig(0, 1.000, 1));
        node.handle(rig(1, 1.001, 1));
        node.handle(rig(0, 2.000, 1));
        node.handle(rig(1, 2.000, 1));
        node.handle(rig(1, 3.000, 1));

        let frames = &node.engine().frames;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].stamp, Stamp::from_secs_f64(2.0));
    }

    #[test]
    fn test_approximate_groups_respect_tolerance() {
        let mut node = node(&rig_config(2, SyncMode::Approximate));
        let stamps = [
            (0, 1.000),
            (1, 1.004),
            (0, 1.050),
            (1, 1.070),
            (0, 1.100),
            (1, 1.108),
        ];
        for (index, secs) in stamps {
            node.handle(rig(index, secs, 1));
        }
        let frames = &node.engine().frames;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].stamp, Stamp::from_secs_f64(1.004));
        assert_eq!(frames[1].stamp, Stamp::from_secs_f64(1.108));
    }

    #[test]
    fn test_equal_spread_prefers_earliest_arrival() {
        let mut node = node(&rig_config(2, SyncMode::Approximate));
        node.handle(rig(0, 5.000, 10));
        node.handle(rig(0, 5.010, 20));
        // 5.005 is 5 ms from both buffered rig-0 messages
        node.handle(rig(1, 5.005, 30));

        let frame = &node.engine().frames[0];
        assert_eq!(frame.color.pixel(0, 0), Some(&[10u8][..]));
        assert_eq!(node.buffer_stats().total_buffered, 1);
    }

    #[test]
    fn test_unsupported_color_abandons_group_only() {
        let mut node = node(&rig_config(1, SyncMode::Approximate));
        let rgba = rgbd_with(1.0, "base_link", 4, 3, ImageEncoding::Rgba8, ImageEncoding::Type16UC1, 5);
        let event = node.handle(ChannelInput::Rgbd { index: 0, image: rgba });
        assert!(matches!(event, NodeEvent::Dropped(ref e) if e.kind() == "unsupported_encoding"));
        assert!(node.engine().frames.is_empty());

        let event = node.handle(rig(0, 2.0, 5));
        assert!(matches!(event, NodeEvent::Dispatched { sequence: 0, .. }));
        assert_eq!(node.stats().groups_dropped["unsupported_encoding"], 1);
    }

    #[test]
    fn test_depth_pixel_type_mismatch_across_cameras() {
        let mut node = node(&rig_config(2, SyncMode::Approximate));
        let left = rgbd_with(1.0, "base_link", 4, 3, ImageEncoding::Mono8, ImageEncoding::Type16UC1, 1);
        let right = rgbd_with(1.0, "base_link", 4, 3, ImageEncoding::Mono8, ImageEncoding::Type32FC1, 1);

        node.handle(ChannelInput::Rgbd { index: 0, image: left });
        let event = node.handle(ChannelInput::Rgbd { index: 1, image: right });
        assert!(matches!(event, NodeEvent::Dropped(ref e) if e.kind() == "pixel_type_mismatch"));
        assert!(node.engine().frames.is_empty());
    }

    #[test]
    fn test_rgb_color_is_normalized() {
        let mut node = node(&rig_config(1, SyncMode::Approximate));
        let rgb = rgbd_with(1.0, "base_link", 4, 3, ImageEncoding::Rgb8, ImageEncoding::Type16UC1, 100);
        node.handle(ChannelInput::Rgbd { index: 0, image: rgb });

        let frame = &node.engine().frames[0];
        assert_eq!(frame.color.pixel_type, PixelType::U8C1);
        assert!(frame.color.data.iter().all(|&v| v == 100));
    }

    #[test]
    fn test_capacity_eviction_is_counted() {
        let mut config = rig_config(2, SyncMode::Approximate);
        config.sync.queue_size = 2;
        let mut node = node(&config);

        node.handle(rig(0, 1.0, 1));
        node.handle(rig(0, 2.0, 2));
        node.handle(rig(0, 3.0, 3));
        assert_eq!(node.buffer_stats().evicted, 1);
        assert_eq!(node.buffer_stats().oldest_stamp, Some(Stamp::from_secs_f64(2.0)));

        // The evicted 1.0 can no longer match
        node.handle(rig(1, 1.0, 9));
        assert!(node.engine().frames.is_empty());
    }

    #[test]
    fn test_pause_synchronizes_without_dispatch() {
        let mut node = node(&rig_config(2, SyncMode::Approximate));
        node.pause();
        assert!(node.is_paused());

        node.handle(rig(0, 1.0, 1));
        assert_eq!(node.handle(rig(1, 1.0, 1)), NodeEvent::SkippedPaused);
        assert!(node.engine().frames.is_empty());
        assert_eq!(node.stats().groups_synced, 1);
        assert_eq!(node.buffer_stats().total_buffered, 0);

        node.resume();
        node.handle(rig(0, 2.0, 1));
        assert!(matches!(
            node.handle(rig(1, 2.0, 1)),
            NodeEvent::Dispatched { sequence: 0, .. }
        ));
    }

    #[test]
    fn test_flush_discards_buffered_state() {
        let mut node = node(&rig_config(2, SyncMode::Approximate));
        node.handle(rig(0, 1.0, 1));
        assert_eq!(node.buffer_stats().total_buffered, 1);

        node.flush();
        assert_eq!(node.buffer_stats().total_buffered, 0);
        assert_eq!(node.stats().flushes, 1);

        // The discarded rig-0 message cannot complete a group
        assert_eq!(node.handle(rig(1, 1.0, 1)), NodeEvent::Buffered);
        assert!(node.engine().frames.is_empty());
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut node = node(&rig_config(1, SyncMode::Approximate));
        for i in 0..3 {
            node.handle(rig(0, 1.0 + i as f64, 1));
        }
        let sequences: Vec<u64> = node.engine().frames.iter().map(|f| f.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use contracts::{ImageEncoding, Stamp, StaticTransformConfig, SyncMode};
    use odometry_node::{ChannelInput, NodeEvent};
    use tokio::sync::mpsc;

    use crate::support::{node, rgbd_with, rig_config};

    /// Publisher task -> channel -> node, the way the CLI drives it
    #[tokio::test]
    async fn test_e2e_dual_rig_publisher() {
        let mut config = rig_config(2, SyncMode::Approximate);
        config.static_transforms = vec![
            StaticTransformConfig {
                parent: "base_link".into(),
                child: "cam_left".into(),
                translation: [0.0, 0.1, 0.0],
                rotation_rpy: [0.0; 3],
            },
            StaticTransformConfig {
                parent: "base_link".into(),
                child: "cam_right".into(),
                translation: [0.0, -0.1, 0.0],
                rotation_rpy: [0.0; 3],
            },
        ];
        let mut node = node(&config);

        let (tx, mut rx) = mpsc::channel::<ChannelInput>(8);
        let target_frames = 5u64;

        let publisher = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(2));
            for i in 0..target_frames {
                interval.tick().await;
                let t = 100.0 + i as f64 * 0.1;
                let left = rgbd_with(t, "cam_left", 8, 6, ImageEncoding::Bgr8, ImageEncoding::Type16UC1, 50);
                let right = rgbd_with(t + 0.003, "cam_right", 8, 6, ImageEncoding::Bgr8, ImageEncoding::Type16UC1, 50);
                if tx.send(ChannelInput::Rgbd { index: 1, image: right }).await.is_err() {
                    break;
                }
                if tx.send(ChannelInput::Rgbd { index: 0, image: left }).await.is_err() {
                    break;
                }
            }
        });

        let consumer = tokio::spawn(async move {
            let mut dispatched = Vec::new();
            while let Some(message) = rx.recv().await {
                if let NodeEvent::Dispatched { stamp, .. } = node.handle(message) {
                    dispatched.push(stamp);
                }
            }
            (node, dispatched)
        });

        let result = tokio::time::timeout(Duration::from_secs(5), async {
            publisher.await.unwrap();
            consumer.await.unwrap()
        })
        .await;
        assert!(result.is_ok(), "pipeline timed out");

        let (node, dispatched) = result.unwrap();
        assert_eq!(dispatched.len() as u64, target_frames);
        assert_eq!(dispatched[0], Stamp::from_secs_f64(100.003));
        assert_eq!(node.stats().frames_dispatched, target_frames);
        assert_eq!(node.stats().messages_received, target_frames * 2);

        let frame = &node.engine().frames[0];
        assert_eq!(frame.color.width, 16);
        assert_eq!(frame.camera_models[0].name, "cam_left");
        assert_eq!(frame.camera_models[1].name, "cam_right");
        assert!((frame.camera_models[0].local_transform.translation.y - 0.1).abs() < 1e-12);
        assert!((frame.camera_models[1].local_transform.translation.y + 0.1).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_e2e_watchdog_reports_missing_input() {
        let mut config = rig_config(1, SyncMode::Exact);
        config.watchdog.warn_after_s = 0.05;
        let mut node = node(&config);

        tokio::time::sleep(Duration::from_millis(80)).await;
        let warning = node.check_watchdog(std::time::Instant::now()).unwrap();
        assert!(warning.contains("rgbd_image"));
        assert!(warning.contains("Exact synchronization"));
        assert!(node.check_watchdog(std::time::Instant::now()).is_none());
    }
}

#[cfg(test)]
mod stack_tests {
    use contracts::{ImageEncoding, Stamp, SyncConfig, SyncMode};
    use frame_assembly::assemble_group;
    use observability::FrameMetricsAggregator;
    use odometry_node::StaticTransformTree;
    use sync_engine::{ChannelInput, RigSynchronizer, RigTopology};

    use crate::support::{node, rgbd_with, rig, rig_config};

    /// Synchronizer output assembled by hand matches what the node dispatches
    #[test]
    fn test_synchronizer_and_assembly_compose() {
        let config = SyncConfig {
            mode: SyncMode::Approximate,
            ..SyncConfig::default()
        };
        let mut sync = RigSynchronizer::new(RigTopology::DualRgbd, &config);
        let left = rgbd_with(3.0, "base_link", 4, 3, ImageEncoding::Mono8, ImageEncoding::Type16UC1, 1);
        let right = rgbd_with(3.002, "base_link", 4, 3, ImageEncoding::Mono8, ImageEncoding::Type16UC1, 2);

        assert!(sync
            .push(ChannelInput::Rgbd { index: 0, image: left })
            .unwrap()
            .is_none());
        let group = sync
            .push(ChannelInput::Rgbd { index: 1, image: right })
            .unwrap()
            .unwrap();

        let frame = assemble_group(0, group.cameras, "base_link", &StaticTransformTree::new()).unwrap();
        assert_eq!(frame.stamp, Stamp::from_secs_f64(3.002));
        assert_eq!(frame.camera_count(), 2);
    }

    #[test]
    fn test_metrics_aggregate_dispatched_frames() {
        let mut node = node(&rig_config(1, SyncMode::Approximate));
        for i in 0..4 {
            node.handle(rig(0, 1.0 + i as f64 * 0.05, 1));
        }

        let mut metrics = FrameMetricsAggregator::new();
        for frame in &node.engine().frames {
            metrics.update(frame, 1.0);
        }
        metrics.record_drop("transform_unavailable");

        let summary = metrics.summary();
        assert_eq!(summary.total_frames, 4);
        assert_eq!(summary.total_dropped, 1);
        assert_eq!(summary.frame_period_ms.count, 3);
        assert!((summary.frame_period_ms.mean - 50.0).abs() < 1e-3);
    }
}
