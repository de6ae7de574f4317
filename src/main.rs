//! Headless capture run: spawn a camera array, bind render buffers, refresh
//! them on a virtual clock and write asset descriptors to disk.
//!
//! ```text
//! synthcap [OPTIONS.toml] [--out DIR] [--seconds N] [--gpu]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use glam::Vec3;
use synthcap::capture::{
    CaptureBufferOrchestrator, FsAssetStore, TimerOutcome,
};
use synthcap::gpu::{GpuBufferAllocator, GpuContext};
use synthcap::host::headless::HeadlessHost;
use synthcap::host::{ActorClass, BufferAllocator, CpuBufferAllocator};
use synthcap::options::Options;
use synthcap::spawner::CameraArraySpawner;
use web_time::Instant;

/// Simulated frame step.
const FRAME: Duration = Duration::from_millis(33);

/// Capture components on each spawned rig (RGB, raw depth, normal).
const RIG_CAPTURE_COMPONENTS: usize = 3;

struct Args {
    options: Option<PathBuf>,
    out_dir: PathBuf,
    seconds: f32,
    gpu: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        options: None,
        out_dir: PathBuf::from("synthcap-out"),
        seconds: 10.0,
        gpu: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--gpu" => args.gpu = true,
            "--out" => {
                args.out_dir = it
                    .next()
                    .map(PathBuf::from)
                    .ok_or("--out needs a directory")?;
            }
            "--seconds" => {
                let value = it.next().ok_or("--seconds needs a value")?;
                args.seconds = value
                    .parse()
                    .map_err(|e| format!("bad --seconds '{value}': {e}"))?;
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown flag {other}"));
            }
            path => args.options = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

fn allocator(gpu: bool) -> Box<dyn BufferAllocator> {
    if gpu {
        match pollster::block_on(GpuContext::new_headless()) {
            Ok(context) => return Box::new(GpuBufferAllocator::new(context)),
            Err(e) => {
                log::warn!("{e}; falling back to CPU buffers");
            }
        }
    }
    Box::new(CpuBufferAllocator::new())
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            log::error!(
                "Usage: synthcap [OPTIONS.toml] [--out DIR] [--seconds N] [--gpu]"
            );
            std::process::exit(1);
        }
    };

    let options = match &args.options {
        Some(path) => match Options::load(path) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Options::default(),
    };

    let started = Instant::now();
    let rig = ActorClass::new(options.spawn.name_prefix.as_str());

    let mut host = HeadlessHost::with_allocator(allocator(args.gpu));
    host.register_template(rig.clone(), RIG_CAPTURE_COMPONENTS);

    let mut spawner = CameraArraySpawner::from_options(&options.spawn, Vec3::ZERO);
    let request = CameraArraySpawner::request(&options.spawn, Some(rig.clone()));
    let spawned = spawner.spawn_array(&mut host, &request);
    if spawned.is_empty() {
        log::error!("no camera rigs spawned");
        std::process::exit(1);
    }

    let mut orchestrator = CaptureBufferOrchestrator::new(options.capture)
        .with_target_class(rig)
        .with_asset_store(Box::new(FsAssetStore::new(args.out_dir.clone())));
    orchestrator.begin_play(&mut host);

    let frames = (args.seconds.max(0.0) / FRAME.as_secs_f32()).ceil() as u32;
    let mut forced = 0;
    for _ in 0..frames {
        for handle in host.advance(FRAME) {
            if let TimerOutcome::ForcedUpdate(n) =
                orchestrator.on_timer(&mut host, handle)
            {
                forced += n;
            }
        }
    }
    let _ = orchestrator.stop_periodic_updates(&mut host);

    let counts = orchestrator.channel_counts();
    log::info!(
        "{} rigs, {} buffers ({} RGB, {} raw depth, {} ML depth, {} normal), \
         {forced} forced captures over {:.1}s simulated",
        spawned.len(),
        counts.total(),
        counts.rgb,
        counts.raw_depth,
        counts.normalized_depth,
        counts.normal,
        host.timers().now().as_secs_f32(),
    );

    let summary = orchestrator.persist_buffers();
    log::info!(
        "wrote {} assets to {} ({} failed) in {:.2?}",
        summary.persisted,
        args.out_dir.display(),
        summary.failed,
        started.elapsed()
    );
    if summary.failed > 0 {
        std::process::exit(2);
    }
}
