//! Full spawn, detect, refresh and persist cycle on the headless host.

use std::time::Duration;

use glam::Vec3;
use synthcap::capture::persist::RenderTargetAsset;
use synthcap::capture::{
    AssetPath, CaptureBufferOrchestrator, CaptureChannel, FsAssetStore,
    OrchestratorState, PixelFormat, TimerOutcome,
};
use synthcap::host::headless::HeadlessHost;
use synthcap::host::{ActorClass, World};
use synthcap::options::Options;
use synthcap::spawner::CameraArraySpawner;

const OPTIONS: &str = r#"
[spawn]
count = 3
offset = [0.0, 250.0, 0.0]

[capture]
width = 64
height = 32
update_interval_secs = 0.5
max_depth_distance = 50.0

[capture.channels]
normal = true
"#;

fn run_frames(
    host: &mut HeadlessHost,
    orchestrator: &mut CaptureBufferOrchestrator,
    frames: u32,
) -> Vec<TimerOutcome> {
    let mut outcomes = Vec::new();
    for _ in 0..frames {
        for handle in host.advance(Duration::from_millis(100)) {
            outcomes.push(orchestrator.on_timer(host, handle));
        }
    }
    outcomes
}

#[test]
fn spawn_detect_refresh_persist() {
    let options = Options::from_toml_str(OPTIONS).unwrap();
    let rig = ActorClass::new("CameraRig");
    let out = std::env::temp_dir()
        .join(format!("synthcap-pipeline-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&out);

    let mut host = HeadlessHost::new();
    host.register_template(rig.clone(), 3);
    host.block_region(Vec3::new(0.0, 250.0, 0.0), 1.0);

    let mut spawner = CameraArraySpawner::from_options(&options.spawn, Vec3::ZERO);
    let request = CameraArraySpawner::request(&options.spawn, Some(rig.clone()));
    let spawned = spawner.spawn_array(&mut host, &request);
    assert_eq!(spawned.len(), 2);
    assert_eq!(spawned[1].position, Vec3::new(0.0, 500.0, 0.0));

    let mut orchestrator = CaptureBufferOrchestrator::new(options.capture)
        .with_target_class(rig.clone())
        .with_asset_store(Box::new(FsAssetStore::new(out.clone())));
    orchestrator.begin_play(&mut host);
    assert!(orchestrator.is_periodic_active());

    // Detection fires at 5s; periodic ticks run every 0.5s but every
    // component captures each frame, so nothing is forced.
    let outcomes = run_frames(&mut host, &mut orchestrator, 50);
    assert!(outcomes.contains(&TimerOutcome::Detected(8)));
    assert!(outcomes.iter().all(|o| matches!(
        o,
        TimerOutcome::Detected(_) | TimerOutcome::ForcedUpdate(0)
    )));
    assert_eq!(orchestrator.state(), OrchestratorState::PeriodicActive);
    assert_eq!(host.allocator().live_count(), 8);

    let counts = orchestrator.channel_counts();
    assert_eq!(
        (counts.rgb, counts.raw_depth, counts.normalized_depth, counts.normal),
        (2, 2, 2, 2)
    );

    // Depth range is clamped before it reaches the capture source.
    let ml = orchestrator
        .buffers_for(CaptureChannel::NormalizedDepth)
        .next()
        .unwrap();
    assert_eq!(ml.format(), PixelFormat::R8);
    let component = ml.bound_component.unwrap();
    assert_eq!(
        host.capture_state(component).unwrap().source,
        synthcap::capture::CaptureSource::NormalizedDepth {
            max_distance: 100.0
        }
    );

    // Only the one-shot post-configure refresh fires once periodic is off.
    assert!(orchestrator.stop_periodic_updates(&mut host));
    assert_eq!(
        run_frames(&mut host, &mut orchestrator, 20),
        vec![TimerOutcome::ForcedUpdate(0)]
    );
    assert_eq!(orchestrator.state(), OrchestratorState::PeriodicStopped);

    let summary = orchestrator.persist_buffers();
    assert_eq!(summary.persisted, 8);
    assert_eq!(summary.failed, 0);

    let store = FsAssetStore::new(out.clone());
    let rgb = store
        .load(&AssetPath::render_target(CaptureChannel::Rgb, 2))
        .unwrap();
    assert_eq!(
        rgb,
        RenderTargetAsset {
            name: "RT_RGB_Camera_2".to_owned(),
            channel: CaptureChannel::Rgb,
            format: PixelFormat::Rgba8,
            width: 64,
            height: 32,
            camera_index: 2,
        }
    );
    assert!(store
        .file_path(&AssetPath::render_target(CaptureChannel::Normal, 1))
        .exists());

    for instance in spawner.live_instances(&host) {
        assert!(host.is_actor_alive(instance.handle));
    }
    let _ = std::fs::remove_dir_all(&out);
}

#[test]
fn on_demand_cameras_refresh_after_configuration() {
    let mut options = Options::default();
    options.spawn.count = 2;
    options.capture.force_every_frame = false;
    options.capture.initial_detection_delay_secs = 0.0;
    let rig = ActorClass::new("CameraRig");

    let mut host = HeadlessHost::new();
    host.register_template(rig.clone(), 2);
    let mut spawner = CameraArraySpawner::new(Vec3::ZERO);
    let _ = spawner.spawn_array(
        &mut host,
        &CameraArraySpawner::request(&options.spawn, Some(rig.clone())),
    );

    let mut orchestrator =
        CaptureBufferOrchestrator::new(options.capture).with_target_class(rig);
    orchestrator.begin_play(&mut host);
    // Detected immediately: RGB + raw depth + ML depth per camera.
    assert_eq!(orchestrator.buffers().len(), 6);
    assert_eq!(orchestrator.state(), OrchestratorState::Configured);

    let outcomes = run_frames(&mut host, &mut orchestrator, 10);
    assert_eq!(outcomes, vec![TimerOutcome::ForcedUpdate(6)]);

    for buffer in orchestrator.buffers() {
        let component = buffer.bound_component.unwrap();
        assert_eq!(host.capture_state(component).unwrap().capture_count, 1);
    }
}
