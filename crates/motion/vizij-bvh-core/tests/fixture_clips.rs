use approx::assert_abs_diff_eq;
use vizij_bvh_core::{parse_bvh, to_bvh_string, Bvh, BvhConfig, RotationOrder};

#[test]
fn fixture_clips_match_recorded_shapes() {
    for name in vizij_test_fixtures::clips::keys() {
        let text = vizij_test_fixtures::clips::text(&name).expect("load fixture");
        let (skeleton, motion) = parse_bvh(&text).unwrap_or_else(|e| panic!("{name}: {e}"));

        for frame in motion.frames() {
            assert_eq!(frame.len(), skeleton.total_channels(), "{name}");
        }
        let summed: usize = skeleton.joints().map(|(_, joint)| joint.channels).sum();
        assert_eq!(summed, skeleton.total_channels(), "{name}");

        if let Some(expect) = vizij_test_fixtures::clips::expectations(&name).unwrap() {
            assert_eq!(skeleton.len(), expect.joints, "{name}");
            assert_eq!(skeleton.total_channels(), expect.channels, "{name}");
            assert_eq!(motion.num_frames(), expect.frames, "{name}");
        }
    }
}

#[test]
fn fixture_clips_survive_a_round_trip() {
    for name in vizij_test_fixtures::clips::keys() {
        let text = vizij_test_fixtures::clips::text(&name).unwrap();
        let (skeleton, motion) = parse_bvh(&text).unwrap();

        let written = to_bvh_string(&skeleton, &motion, None).unwrap();
        let (skeleton2, motion2) = parse_bvh(&written).unwrap();
        assert_eq!(skeleton, skeleton2, "{name}");
        assert_eq!(motion, motion2, "{name}");

        // Fixed precision still reproduces values within tolerance.
        let rounded = to_bvh_string(&skeleton, &motion, Some(4)).unwrap();
        let (skeleton3, motion3) = parse_bvh(&rounded).unwrap();
        assert_eq!(skeleton3.len(), skeleton.len());
        assert_eq!(motion3.num_frames(), motion.num_frames());
        for (a, b) in motion.frames().zip(motion3.frames()) {
            for (x, y) in a.iter().zip(b) {
                assert_abs_diff_eq!(*x, *y, epsilon = 1e-4);
            }
        }
    }
}

#[test]
fn upper_body_layout() {
    let text = vizij_test_fixtures::clips::text("upper-body").unwrap();
    let (skeleton, _) = parse_bvh(&text).unwrap();

    let names: Vec<&str> = skeleton
        .joints()
        .map(|(_, joint)| joint.name.as_str())
        .collect();
    assert_eq!(
        names,
        ["Hips", "Spine", "Neck", "Site", "Left Shoulder", "LeftElbow", "Site"]
    );

    let shoulder = skeleton.joint_by_name("Left Shoulder").unwrap();
    assert_eq!(shoulder.rotation_order, Some(RotationOrder::YXZ));
    assert_eq!(shoulder.channel_range(), 12..15);
    assert_eq!(shoulder.depth, 2);
    let elbow = skeleton.joint_by_name("LeftElbow").unwrap();
    assert_eq!(elbow.rotation_order, Some(RotationOrder::ZXY));
    assert!(skeleton.find("Site").is_none());
}

#[test]
fn configured_clip_writes_with_fixed_precision() {
    let config: BvhConfig = vizij_test_fixtures::configs::load("clamped-half-speed").unwrap();
    config.validate().unwrap();
    assert!(!config.looping);

    let mut clip = Bvh::with_config(config);
    clip.load_file(vizij_test_fixtures::clips::path("minimal").unwrap())
        .unwrap();
    assert_eq!(clip.rate(), 0.5);
    assert!(!clip.is_loop());

    let text = clip.to_bvh_string().unwrap();
    assert!(text.contains("OFFSET 0.0000 10.0000 0.0000"));
    assert!(text.contains("1.5000 2.0000 -3.0000 0.0000 0.0000 0.0000"));
}

#[test]
fn save_and_open_through_the_filesystem() {
    let clip = Bvh::open(vizij_test_fixtures::clips::path("upper-body").unwrap()).unwrap();
    let path = std::env::temp_dir().join(format!("vizij-bvh-{}.bvh", std::process::id()));
    clip.save(&path).unwrap();

    let reopened = Bvh::open(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(reopened.motion(), clip.motion());
    assert_eq!(reopened.skeleton(), clip.skeleton());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = Bvh::open("/nonexistent/clip.bvh").unwrap_err();
    assert_eq!(err.category(), "io");
}
