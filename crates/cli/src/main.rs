use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use framewise_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use framewise_core::pipeline::process_options::{ProcessOptions, ProcessReport};
use framewise_core::pipeline::process_video_use_case::ProcessVideoUseCase;
use framewise_core::shared::constants::{
    CANCEL_KEY, DEFAULT_FFMPEG_PROGRAM, DEFAULT_FOURCC, DEFAULT_OUTPUT, DEFAULT_PROGRESS_EVERY,
};
use framewise_core::shared::fourcc::FourCc;
use framewise_core::transform::infrastructure::transform_factory::create_transform;
use framewise_core::video::domain::video_reader::VideoReader;
use framewise_core::video::infrastructure::ffmpeg_cli_remuxer::FfmpegCliRemuxer;
use framewise_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use framewise_core::video::infrastructure::ffmpeg_writer::{encoder_for, FfmpegWriter};
use framewise_core::video::infrastructure::key_watcher;
use framewise_core::video::infrastructure::snapshot_display::SnapshotDisplay;

/// Apply a per-frame transform to a video.
#[derive(Parser)]
#[command(name = "framewise")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Output video file.
    #[arg(default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Four-character encoding tag for the output (e.g. XVID, MJPG, H264, FFV1).
    #[arg(long, default_value = DEFAULT_FOURCC)]
    fourcc: FourCc,

    /// Transform to apply: identity, invert, grayscale, swap-rb, stretch, scale:<factor>.
    #[arg(long, default_value = "identity")]
    transform: String,

    /// Process every frame without writing an output file.
    #[arg(long)]
    dry_run: bool,

    /// Copy the input's audio track into the output (requires the ffmpeg binary).
    #[arg(long)]
    preserve_audio: bool,

    /// Write a side-by-side preview image here while processing. Type q and
    /// Enter to stop early.
    #[arg(long)]
    preview: Option<PathBuf>,

    /// ffmpeg binary used for --preserve-audio.
    #[arg(long, default_value = DEFAULT_FFMPEG_PROGRAM)]
    ffmpeg: PathBuf,

    /// Log progress every N frames.
    #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
    progress_every: usize,

    /// Print the input's properties and exit.
    #[arg(long)]
    info: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    if cli.info {
        return print_info(&cli.input);
    }

    let report = run_process(&cli)?;

    if cli.dry_run {
        log::info!("Dry run finished: {} frames", report.frames_processed);
    } else {
        log::info!(
            "Output written to {} ({} frames{})",
            cli.output.display(),
            report.frames_written,
            if report.audio_remuxed {
                ", with audio"
            } else {
                ""
            }
        );
    }
    if report.cancelled {
        log::warn!("Stopped early at the user's request");
    }
    Ok(())
}

fn run_process(cli: &Cli) -> Result<ProcessReport, Box<dyn std::error::Error>> {
    let transform = create_transform(&cli.transform)?;
    let options = ProcessOptions {
        write_changes: !cli.dry_run,
        preserve_audio: cli.preserve_audio,
        view_while_processing: cli.preview.is_some(),
    };

    let mut use_case = ProcessVideoUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(FfmpegWriter::new(cli.fourcc)),
        transform,
        options,
    )
    .with_logger(Box::new(StdoutPipelineLogger::new(cli.progress_every)))
    .with_remuxer(Box::new(FfmpegCliRemuxer::with_program(&cli.ffmpeg)));

    if let Some(preview) = &cli.preview {
        log::info!(
            "Live preview at {}; type {CANCEL_KEY} and Enter to stop",
            preview.display()
        );
        let display = SnapshotDisplay::new(preview).with_keys(key_watcher::spawn());
        use_case = use_case.with_display(Box::new(display));
    }

    use_case.execute(&cli.input, &cli.output)
}

fn print_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = FfmpegReader::new();
    let metadata = reader.open(input)?;
    reader.close();
    println!("{metadata}");
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if cli.info {
        return Ok(());
    }
    if cli.progress_every == 0 {
        return Err("--progress-every must be at least 1".into());
    }
    if let Some(preview) = &cli.preview {
        if same_file(preview, &cli.output) || same_file(preview, &cli.input) {
            return Err("--preview must not point at the input or output video".into());
        }
    }
    if cli.dry_run {
        if cli.preserve_audio {
            log::warn!("--preserve-audio has no effect with --dry-run");
        }
        return Ok(());
    }
    encoder_for(cli.fourcc)?;
    if same_file(&cli.input, &cli.output) {
        return Err("Output must differ from the input".into());
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("framewise").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_dry_run_rejects_preview_over_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"video").unwrap();
        let input = input.to_str().unwrap();

        let cli = parse(&[input, "--dry-run", "--preview", input]);
        let err = validate(&cli).unwrap_err();
        assert!(err.to_string().contains("--preview"));
    }

    #[test]
    fn test_dry_run_accepts_separate_preview() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"video").unwrap();
        let preview = dir.path().join("preview.png");

        let cli = parse(&[
            input.to_str().unwrap(),
            "--dry-run",
            "--preview",
            preview.to_str().unwrap(),
        ]);
        assert!(validate(&cli).is_ok());
    }

    #[test]
    fn test_output_matching_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.avi");
        std::fs::write(&input, b"video").unwrap();
        let input = input.to_str().unwrap();

        let cli = parse(&[input, input]);
        let err = validate(&cli).unwrap_err();
        assert!(err.to_string().contains("Output must differ"));
    }

    #[test]
    fn test_zero_progress_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"video").unwrap();

        let cli = parse(&[input.to_str().unwrap(), "--progress-every", "0"]);
        assert!(validate(&cli).is_err());
    }
}
