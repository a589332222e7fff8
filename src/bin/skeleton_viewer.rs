use anyhow::Result;
use std::time::{Duration, Instant};

use bevy::app::{App, AppExit, ScheduleRunnerPlugin, Update};
use bevy::ecs::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use skeleton_mapper::body::BodyFrame;
use skeleton_mapper::config::{Config, SourceKind};
use skeleton_mapper::controls::{ControlInputs, TrackingControls};
use skeleton_mapper::logging::init_logging;
use skeleton_mapper::skeleton::{FrameReport, SkeletonMapper};
use skeleton_mapper::source::{BridgeSource, FrameSource, ReplaySource, SourceEvent};
use skeleton_mapper::telemetry::Telemetry;

#[cfg(feature = "viewer")]
use skeleton_mapper::render::MinifbRenderer;

const CONFIG_PATH: &str = "config.toml";
/// 1tick で読む記録済みUI入力の上限
const MAX_CONTROL_EVENTS_PER_TICK: usize = 16;

// --- Bevy Resources ---

/// フレーム供給元 (BridgeSource の受信側は Sync でないので NonSend)
struct ActiveSource(Box<dyn FrameSource>);

#[derive(Resource)]
struct MapperState {
    mapper: SkeletonMapper,
    pending: Option<BodyFrame>,
    report: Option<FrameReport>,
    finished: bool,
}

#[derive(Resource)]
struct ControlState {
    controls: TrackingControls,
    inputs: ControlInputs,
}

#[derive(Resource)]
struct TelemetryRes(Telemetry);

#[derive(Resource)]
struct FpsCounter {
    frame_count: u32,
    mapped_count: u32,
    timer: Instant,
}

#[cfg(feature = "viewer")]
struct DebugView {
    renderer: MinifbRenderer,
}

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);
    let log_path = init_logging("viewer", &config.debug.log_dir)?;

    info!("Skeleton Viewer");
    info!("Version: {}", env!("GIT_VERSION"));
    info!("Log: {}", log_path.display());
    info!("Source: {:?}", config.source.kind);
    info!("Target FPS: {}", config.app.target_fps);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let shutdown = CancellationToken::new();

    let source: Box<dyn FrameSource> = match config.source.kind {
        SourceKind::Replay => {
            let replay = ReplaySource::open(&config.source.replay_path, config.source.looping)?;
            info!("Replay: {} ({} records)", config.source.replay_path, replay.len());
            Box::new(replay)
        }
        SourceKind::Bridge => {
            info!("Bridge: {}", config.source.bridge_addr);
            Box::new(BridgeSource::connect(
                runtime.handle(),
                config.source.bridge_addr.clone(),
                &shutdown,
            ))
        }
    };
    let telemetry = Telemetry::new(&config.telemetry, runtime.handle().clone(), &shutdown);
    // App::run は App を手放すので、終了待ちのハンドルは外に持っておく
    let telemetry_shutdown = telemetry.shutdown_handle();

    let frame_duration = Duration::from_secs_f64(1.0 / config.app.target_fps.max(1) as f64);

    let mut app = App::new();
    app.add_plugins(ScheduleRunnerPlugin::run_loop(frame_duration))
        .insert_non_send_resource(ActiveSource(source))
        .insert_resource(MapperState {
            mapper: SkeletonMapper::from_config(&config.mapper),
            pending: None,
            report: None,
            finished: false,
        })
        .insert_resource(ControlState {
            controls: TrackingControls::new(),
            inputs: ControlInputs::connected(),
        })
        .insert_resource(TelemetryRes(telemetry))
        .insert_resource(FpsCounter {
            frame_count: 0,
            mapped_count: 0,
            timer: Instant::now(),
        });

    #[cfg(feature = "viewer")]
    let debug_view = if config.debug.view {
        let renderer = MinifbRenderer::new(
            "Skeleton Viewer",
            config.debug.view_width,
            config.debug.view_height,
            config.debug.pixels_per_meter,
        )?;
        info!("操作: [1/2/3] 機能  [F/U/B] プロファイル  [A/S/M] プリセット  [Up/Down] 最適化  [Esc] 終了");
        Some(DebugView { renderer })
    } else {
        None
    };
    #[cfg(not(feature = "viewer"))]
    {
        if config.debug.view {
            warn!("debug.view requires the `viewer` feature, running headless");
        }
    }

    #[cfg(feature = "viewer")]
    {
        if let Some(dv) = debug_view {
            app.insert_non_send_resource(dv).add_systems(
                Update,
                (
                    poll_source_system,
                    map_system,
                    controls_system,
                    telemetry_system,
                    fps_system,
                    debug_view_system,
                )
                    .chain(),
            );
        } else {
            add_headless_systems(&mut app);
        }
    }
    #[cfg(not(feature = "viewer"))]
    add_headless_systems(&mut app);

    app.run();

    info!("Shutting down...");
    shutdown.cancel();
    runtime.block_on(telemetry_shutdown.wait(Duration::from_secs(2)));
    Ok(())
}

fn add_headless_systems(app: &mut App) {
    app.add_systems(
        Update,
        (
            poll_source_system,
            map_system,
            controls_system,
            telemetry_system,
            fps_system,
        )
            .chain(),
    );
}

// --- Systems ---

/// 1tick に1フレームだけ取り出す。記録済みUI入力はその前にまとめて反映
fn poll_source_system(
    mut source: NonSendMut<ActiveSource>,
    mut state: ResMut<MapperState>,
    mut control: ResMut<ControlState>,
) {
    state.pending = None;
    if state.finished {
        return;
    }

    for _ in 0..MAX_CONTROL_EVENTS_PER_TICK {
        match source.0.poll_event() {
            Ok(Some(SourceEvent::Frame(frame))) => {
                state.pending = Some(frame);
                break;
            }
            Ok(Some(SourceEvent::Controls(recorded))) => control.inputs.overlay(&recorded),
            Ok(Some(SourceEvent::Finished)) => {
                state.finished = true;
                break;
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Source error: {:#}", e);
                break;
            }
        }
    }
}

fn map_system(mut state: ResMut<MapperState>) {
    let state = &mut *state;
    state.report = match state.pending.take() {
        Some(frame) => state.mapper.on_frame(&frame),
        None => None,
    };
}

/// UI入力は有効な新しいフレームを写像した tick だけ評価する
fn controls_system(
    mut source: NonSendMut<ActiveSource>,
    state: Res<MapperState>,
    mut control: ResMut<ControlState>,
) {
    let Some(report) = &state.report else {
        return;
    };

    let control = &mut *control;
    match control.controls.update(&control.inputs, &report.tracked_bodies, &mut *source.0) {
        Ok(view) => control.inputs.sync_view(&view),
        Err(e) => {
            warn!("Failed to apply tracking settings: {:#}", e);
            let view = control.controls.view();
            control.inputs.sync_view(&view);
        }
    }
}

fn telemetry_system(state: Res<MapperState>, telemetry: Res<TelemetryRes>) {
    if let Some(report) = &state.report {
        for id in &report.new_bodies {
            telemetry.0.report_new_body(*id);
        }
    }
}

fn fps_system(
    mut fps: ResMut<FpsCounter>,
    state: Res<MapperState>,
    control: Res<ControlState>,
    mut exit: EventWriter<AppExit>,
) {
    fps.frame_count += 1;
    if state.report.is_some() {
        fps.mapped_count += 1;
    }

    let elapsed = fps.timer.elapsed().as_secs_f32();
    if elapsed >= 1.0 {
        let view = control.controls.view();
        let bodies: Vec<String> = state
            .mapper
            .bodies()
            .map(|b| {
                format!(
                    "{}[j{} b{}]",
                    b.id,
                    b.visible_joints().count(),
                    b.visible_bones().count()
                )
            })
            .collect();
        info!(
            "FPS: {:.1} (mapped: {}) | {:?} {:?} {} | {}",
            fps.frame_count as f32 / elapsed,
            fps.mapped_count,
            view.features,
            view.profile,
            view.optimization,
            if bodies.is_empty() { "no body".to_string() } else { bodies.join(" ") },
        );
        fps.frame_count = 0;
        fps.mapped_count = 0;
        fps.timer = Instant::now();
    }

    if state.finished {
        info!(
            "Source finished (last frame: {:?}, bodies: {})",
            state.mapper.last_frame_index(),
            state.mapper.body_count()
        );
        exit.send(AppExit::Success);
    }
}

#[cfg(feature = "viewer")]
fn debug_view_system(
    state: Res<MapperState>,
    mut control: ResMut<ControlState>,
    mut debug_view: NonSendMut<DebugView>,
    mut exit: EventWriter<AppExit>,
) {
    let renderer = &mut debug_view.renderer;
    if !renderer.is_open() {
        exit.send(AppExit::Success);
        return;
    }

    for key in renderer.control_keys() {
        key.apply(&mut control.inputs);
    }

    renderer.draw_skeletons(&state.mapper);
    if let Err(e) = renderer.update() {
        warn!("Debug view update failed: {:#}", e);
    }
}
