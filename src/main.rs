use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use skeleton_mapper::config::Config;
use skeleton_mapper::controls::{ControlInputs, TrackingControls};
use skeleton_mapper::logging::init_logging;
use skeleton_mapper::skeleton::{FrameSnapshot, SkeletonMapper};
use skeleton_mapper::source::{FrameSource, ReplaySource, SourceEvent};
use skeleton_mapper::telemetry::Telemetry;

/// 記録済みフレームを写像し、表示中のトランスフォームを JSON Lines で書き出す
#[derive(Parser, Debug)]
#[command(name = "skeleton_mapper", version = env!("GIT_VERSION"))]
struct Cli {
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,
    /// 記録ファイル (省略時は [source].replay_path)
    #[arg(long)]
    input: Option<PathBuf>,
    /// 出力先 (省略時は標準出力)
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// このフレーム数を書き出したら終了 ([source].looping はこの指定があるときだけ有効)
    #[arg(long)]
    max_frames: Option<usize>,
}

#[derive(Debug, Default)]
struct ExportStats {
    frames: usize,
    skipped: usize,
    new_bodies: usize,
    evicted_bodies: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);
    let log_path = init_logging("mapper", &config.debug.log_dir)?;

    info!("=== Skeleton Mapper ===");
    info!("Version: {}", env!("GIT_VERSION"));
    info!("Log: {}", log_path.display());

    let input = cli
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.source.replay_path));
    let looping = config.source.looping && cli.max_frames.is_some();
    let mut source = ReplaySource::open(&input, looping)?;
    info!("Replay: {} ({} records, loop: {})", input.display(), source.len(), looping);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let shutdown = CancellationToken::new();
    let telemetry = Telemetry::new(&config.telemetry, runtime.handle().clone(), &shutdown);

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut mapper = SkeletonMapper::from_config(&config.mapper);
    let mut controls = TrackingControls::new();
    let mut inputs = ControlInputs::default();
    let mut stats = ExportStats::default();
    let started = Instant::now();

    while let Some(event) = source.poll_event()? {
        match event {
            SourceEvent::Frame(frame) => {
                let Some(report) = mapper.on_frame(&frame) else {
                    stats.skipped += 1;
                    continue;
                };
                for id in &report.new_bodies {
                    telemetry.report_new_body(*id);
                }
                stats.new_bodies += report.new_bodies.len();
                stats.evicted_bodies += report.evicted_bodies.len();

                match controls.update(&inputs, &report.tracked_bodies, &mut source) {
                    Ok(view) => inputs.sync_view(&view),
                    Err(e) => {
                        warn!("Failed to apply tracking settings: {:#}", e);
                        inputs.sync_view(&controls.view());
                    }
                }

                FrameSnapshot::capture(report.frame_index, &mapper).write_json_line(&mut out)?;
                stats.frames += 1;
                if cli.max_frames.is_some_and(|max| stats.frames >= max) {
                    break;
                }
            }
            SourceEvent::Controls(recorded) => inputs.overlay(&recorded),
            SourceEvent::Finished => break,
        }
    }
    out.flush()?;

    info!(
        "Done: {} frames written, {} skipped, {} new bodies, {} evicted ({:.2}s)",
        stats.frames,
        stats.skipped,
        stats.new_bodies,
        stats.evicted_bodies,
        started.elapsed().as_secs_f64()
    );
    info!("Applied settings: {:?}", source.applied());

    shutdown.cancel();
    runtime.block_on(telemetry.shutdown(Duration::from_secs(2)));
    Ok(())
}
