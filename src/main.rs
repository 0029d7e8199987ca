use std::process::ExitCode;

use clap::Parser;
use log::info;

use yolo_annotate::cli::Args;
use yolo_annotate::config::{RunConfig, WINDOW_NAME};
use yolo_annotate::video::{CaptureSource, HighguiDisplay, MjpgRecorder};
use yolo_annotate::{FrameLoop, Result, RunSummary, YoloDetector};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.into_run_config().and_then(run) {
        Ok(summary) => {
            println!("{}", summary.fps_line());
            ExitCode::SUCCESS
        }
        Err(err) => {
            // 配置错误只报原因，运行中的错误注明已中止
            if err.is_configuration() {
                eprintln!("ERROR: {}", err);
            } else {
                eprintln!("ERROR: run aborted: {}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(config: RunConfig) -> Result<RunSummary> {
    let source = CaptureSource::open(&config.source_path)?;
    let detector = YoloDetector::from_path(&config.model_path)?;

    let recorder = match (config.record, config.resolution) {
        (true, Some(resolution)) => Some(MjpgRecorder::create(&config.record_path, resolution)?),
        _ => None,
    };
    let display = HighguiDisplay::open(WINDOW_NAME)?;

    info!(
        "Processing {} (threshold {:.2}, resolution {})",
        config.source_path.display(),
        config.confidence_threshold,
        config
            .resolution
            .map(|r| r.to_string())
            .unwrap_or_else(|| "native".to_string())
    );

    let mut frame_loop = FrameLoop::new(config, detector, source, display, recorder);
    let summary = frame_loop.run()?;
    info!(
        "Processed {} frames, drew {} objects, saved {} snapshots",
        summary.frames, summary.objects, summary.snapshots
    );
    Ok(summary)
}
