use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_FFMPEG_PROGRAM, REMUX_AUDIO_BITRATE, REMUX_AUDIO_CHANNELS, REMUX_AUDIO_FORMAT,
    REMUX_AUDIO_SAMPLE_RATE,
};
use crate::video::domain::audio_remuxer::AudioRemuxer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemuxStage {
    ExtractAudio,
    CombineStreams,
    ReplaceOutput,
}

impl fmt::Display for RemuxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemuxStage::ExtractAudio => "extract audio",
            RemuxStage::CombineStreams => "combine streams",
            RemuxStage::ReplaceOutput => "replace output",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum RemuxError {
    #[error("{stage}: failed to run {program}: {source}")]
    Spawn {
        stage: RemuxStage,
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage}: {program} exited with {status}: {stderr}")]
    StageFailed {
        stage: RemuxStage,
        program: String,
        status: String,
        stderr: String,
    },
    #[error("{stage}: {source}")]
    Io {
        stage: RemuxStage,
        #[source]
        source: std::io::Error,
    },
}

/// Temporary files used while reattaching audio, kept beside the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemuxPaths {
    pub audio: PathBuf,
    pub combined: PathBuf,
}

impl RemuxPaths {
    /// `<dir>/<stem>.audio.mp3` and `<dir>/<stem>.remux.<ext>` for `output`.
    pub fn for_output(output: &Path) -> Self {
        let stem = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let ext = output
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "avi".to_string());
        Self {
            audio: output.with_file_name(format!("{stem}.audio.{REMUX_AUDIO_FORMAT}")),
            combined: output.with_file_name(format!("{stem}.remux.{ext}")),
        }
    }
}

/// Reattaches source audio by shelling out to the `ffmpeg` binary in three
/// stages: extract the audio track, mux it with the silent output, then
/// swap the muxed file into place.
///
/// Each stage's exit status is checked. A failing stage stops the sequence,
/// removes the intermediate audio file and leaves the silent output intact.
pub struct FfmpegCliRemuxer {
    program: PathBuf,
}

impl FfmpegCliRemuxer {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_FFMPEG_PROGRAM)
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for the audio extraction stage.
    pub fn extract_args(source: &Path, audio: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), source.into()];
        args.extend(
            [
                "-vn".to_string(),
                "-ac".to_string(),
                REMUX_AUDIO_CHANNELS.to_string(),
                "-ar".to_string(),
                REMUX_AUDIO_SAMPLE_RATE.to_string(),
                "-ab".to_string(),
                REMUX_AUDIO_BITRATE.to_string(),
                "-f".to_string(),
                REMUX_AUDIO_FORMAT.to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(audio.into());
        args
    }

    /// Arguments for the stage that muxes extracted audio into the output.
    pub fn combine_args(output: &Path, audio: &Path, combined: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-i".into(),
            output.into(),
            "-i".into(),
            audio.into(),
        ];
        args.extend(
            ["-map", "0", "-map", "1", "-codec", "copy", "-shortest"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(combined.into());
        args
    }

    fn run_stage(&self, stage: RemuxStage, args: &[OsString]) -> Result<(), RemuxError> {
        log::debug!(
            "{stage}: {} {}",
            self.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| RemuxError::Spawn {
                stage,
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(RemuxError::StageFailed {
                stage,
                program: self.program.display().to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn run_stages(
        &self,
        source: &Path,
        output: &Path,
        paths: &RemuxPaths,
    ) -> Result<(), RemuxError> {
        self.run_stage(
            RemuxStage::ExtractAudio,
            &Self::extract_args(source, &paths.audio),
        )?;
        self.run_stage(
            RemuxStage::CombineStreams,
            &Self::combine_args(output, &paths.audio, &paths.combined),
        )?;
        std::fs::rename(&paths.combined, output).map_err(|source| RemuxError::Io {
            stage: RemuxStage::ReplaceOutput,
            source,
        })
    }
}

impl Default for FfmpegCliRemuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioRemuxer for FfmpegCliRemuxer {
    fn remux(&self, source: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let paths = RemuxPaths::for_output(output);
        let result = self.run_stages(source, output, &paths);

        for leftover in [&paths.audio, &paths.combined] {
            if leftover.exists() {
                if let Err(e) = std::fs::remove_file(leftover) {
                    log::warn!("Could not remove {}: {e}", leftover.display());
                }
            }
        }

        result?;
        log::info!("Audio from {} attached to {}", source.display(), output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_paths_sit_beside_output() {
        let paths = RemuxPaths::for_output(Path::new("/videos/clip.avi"));
        assert_eq!(paths.audio, PathBuf::from("/videos/clip.audio.mp3"));
        assert_eq!(paths.combined, PathBuf::from("/videos/clip.remux.avi"));
    }

    #[test]
    fn test_paths_without_extension() {
        let paths = RemuxPaths::for_output(Path::new("clip"));
        assert_eq!(paths.combined, PathBuf::from("clip.remux.avi"));
    }

    #[test]
    fn test_extract_args() {
        let args = FfmpegCliRemuxer::extract_args(Path::new("in.mp4"), Path::new("a.mp3"));
        assert_eq!(
            strings(&args),
            vec![
                "-y", "-i", "in.mp4", "-vn", "-ac", "2", "-ar", "44100", "-ab", "320k", "-f",
                "mp3", "a.mp3"
            ]
        );
    }

    #[test]
    fn test_combine_args() {
        let args = FfmpegCliRemuxer::combine_args(
            Path::new("out.avi"),
            Path::new("a.mp3"),
            Path::new("out.remux.avi"),
        );
        assert_eq!(
            strings(&args),
            vec![
                "-y",
                "-i",
                "out.avi",
                "-i",
                "a.mp3",
                "-map",
                "0",
                "-map",
                "1",
                "-codec",
                "copy",
                "-shortest",
                "out.remux.avi"
            ]
        );
    }

    #[test]
    fn test_missing_program_fails_at_first_stage() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.avi");
        std::fs::write(&output, b"silent video").unwrap();

        let remuxer = FfmpegCliRemuxer::with_program(dir.path().join("no-such-ffmpeg"));
        let paths = RemuxPaths::for_output(&output);
        let err = remuxer
            .run_stages(Path::new("in.mp4"), &output, &paths)
            .unwrap_err();
        assert!(matches!(
            err,
            RemuxError::Spawn {
                stage: RemuxStage::ExtractAudio,
                ..
            }
        ));

        assert!(remuxer.remux(Path::new("in.mp4"), &output).is_err());
        assert_eq!(std::fs::read(&output).unwrap(), b"silent video");
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Writes an executable shell script standing in for ffmpeg.
        fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-ffmpeg");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_successful_stages_replace_output_and_clean_up() {
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("out.avi");
            std::fs::write(&output, b"silent video").unwrap();

            // Each stage writes its last argument, like ffmpeg writing its output file.
            let program = fake_ffmpeg(
                dir.path(),
                r#"for last; do :; done; printf 'written by %s' "$(basename "$last")" > "$last""#,
            );
            let remuxer = FfmpegCliRemuxer::with_program(program);
            remuxer.remux(Path::new("in.mp4"), &output).unwrap();

            assert_eq!(
                std::fs::read_to_string(&output).unwrap(),
                "written by out.remux.avi"
            );
            let paths = RemuxPaths::for_output(&output);
            assert!(!paths.audio.exists());
            assert!(!paths.combined.exists());
        }

        #[test]
        fn test_failing_extract_stops_later_stages() {
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("out.avi");
            std::fs::write(&output, b"silent video").unwrap();

            let marker = dir.path().join("calls");
            let program = fake_ffmpeg(
                dir.path(),
                &format!(
                    "echo call >> '{}'; echo 'no audio stream' >&2; exit 1",
                    marker.display()
                ),
            );
            let remuxer = FfmpegCliRemuxer::with_program(program);
            let paths = RemuxPaths::for_output(&output);
            let err = remuxer
                .run_stages(Path::new("in.mp4"), &output, &paths)
                .unwrap_err();

            match err {
                RemuxError::StageFailed { stage, stderr, .. } => {
                    assert_eq!(stage, RemuxStage::ExtractAudio);
                    assert_eq!(stderr, "no audio stream");
                }
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(std::fs::read_to_string(&marker).unwrap(), "call\n");
            assert_eq!(std::fs::read(&output).unwrap(), b"silent video");
        }

        #[test]
        fn test_failing_combine_removes_extracted_audio() {
            let dir = tempfile::tempdir().unwrap();
            let output = dir.path().join("out.avi");
            std::fs::write(&output, b"silent video").unwrap();

            // Succeeds for the extract stage (which passes -vn), fails otherwise.
            let program = fake_ffmpeg(
                dir.path(),
                r#"for last; do :; done; case " $* " in *" -vn "*) echo audio > "$last"; exit 0;; esac; exit 2"#,
            );
            let remuxer = FfmpegCliRemuxer::with_program(program);
            let err = remuxer.remux(Path::new("in.mp4"), &output).unwrap_err();

            let message = err.to_string();
            assert!(message.starts_with("combine streams"));
            assert!(message.contains("fake-ffmpeg exited with"));
            let paths = RemuxPaths::for_output(&output);
            assert!(!paths.audio.exists());
            assert_eq!(std::fs::read(&output).unwrap(), b"silent video");
        }
    }
}
