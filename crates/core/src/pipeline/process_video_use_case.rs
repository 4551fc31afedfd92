use std::path::Path;
use std::time::Instant;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::transform::domain::frame_transform::FrameTransform;
use crate::video::domain::audio_remuxer::AudioRemuxer;
use crate::video::domain::frame_display::{DisplayEvent, FrameDisplay};
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use super::process_options::{ProcessOptions, ProcessReport};

/// Reads every frame of a video, applies a transform and writes the result.
///
/// Frames flow one at a time: decode, transform, then optionally encode and
/// show. A preview may cancel the run after the current frame; the output
/// is still finalized and, when requested, gets the source audio back.
///
/// This is a single-use struct: `execute` consumes the owned components, so
/// calling it twice will fail.
pub struct ProcessVideoUseCase {
    reader: Option<Box<dyn VideoReader>>,
    writer: Option<Box<dyn VideoWriter>>,
    transform: Option<Box<dyn FrameTransform>>,
    display: Option<Box<dyn FrameDisplay>>,
    remuxer: Option<Box<dyn AudioRemuxer>>,
    logger: Box<dyn PipelineLogger>,
    options: ProcessOptions,
}

impl ProcessVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        transform: Box<dyn FrameTransform>,
        options: ProcessOptions,
    ) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            transform: Some(transform),
            display: None,
            remuxer: None,
            logger: Box::new(NullPipelineLogger),
            options,
        }
    }

    pub fn with_display(mut self, display: Box<dyn FrameDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_remuxer(mut self, remuxer: Box<dyn AudioRemuxer>) -> Self {
        self.remuxer = Some(remuxer);
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn execute(
        &mut self,
        input: &Path,
        output: &Path,
    ) -> Result<ProcessReport, Box<dyn std::error::Error>> {
        let mut reader = self.reader.take().ok_or("Pipeline already executed")?;
        let mut writer = self.writer.take().ok_or("Pipeline already executed")?;
        let mut transform = self.transform.take().ok_or("Pipeline already executed")?;

        let mut display = if self.options.view_while_processing {
            Some(
                self.display
                    .take()
                    .ok_or("Live preview requested but no display configured")?,
            )
        } else {
            None
        };
        let remuxer = if self.options.remux_requested() {
            Some(
                self.remuxer
                    .take()
                    .ok_or("Audio preservation requested but no remuxer configured")?,
            )
        } else {
            None
        };

        let metadata = reader.open(input)?;
        self.logger.info(&format!(
            "Processing {} ({}x{}, {:.2} fps{}, {} frames)",
            input.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            if metadata.fps_is_fallback {
                ", fallback"
            } else {
                ""
            },
            frame_count_label(&metadata)
        ));

        let mut sink = None;
        if self.options.write_changes {
            if let Err(e) = writer.open(output, &metadata) {
                reader.close();
                return Err(e);
            }
            sink = Some(&mut writer);
        } else {
            self.logger.info("Dry run: output will not be written");
        }

        let result = self.process_frames(
            reader.as_mut(),
            sink,
            transform.as_mut(),
            display.as_mut(),
            &metadata,
        );

        reader.close();
        if let Some(display) = display.as_mut() {
            display.close();
        }
        let finalized = if self.options.write_changes {
            writer.close()
        } else {
            Ok(())
        };

        let mut report = result?;
        finalized?;

        if report.cancelled {
            self.logger.info(&format!(
                "Cancelled after {} frames",
                report.frames_processed
            ));
        }

        if let Some(remuxer) = remuxer {
            remuxer.remux(input, output)?;
            report.audio_remuxed = true;
        }

        self.logger.summary();
        Ok(report)
    }

    fn process_frames(
        &mut self,
        reader: &mut dyn VideoReader,
        mut sink: Option<&mut Box<dyn VideoWriter>>,
        transform: &mut dyn FrameTransform,
        mut display: Option<&mut Box<dyn FrameDisplay>>,
        metadata: &VideoMetadata,
    ) -> Result<ProcessReport, Box<dyn std::error::Error>> {
        let mut report = ProcessReport::default();
        let mut frames = reader.frames();

        loop {
            let t = Instant::now();
            let Some(frame) = frames.next() else {
                break;
            };
            let frame = frame?;
            self.logger.timing("read", elapsed_ms(t));

            let t = Instant::now();
            let transformed = apply_transform(transform, &frame)?;
            self.logger.timing("transform", elapsed_ms(t));
            report.frames_processed += 1;

            if let Some(sink) = sink.as_mut() {
                let t = Instant::now();
                sink.write(&transformed)?;
                self.logger.timing("write", elapsed_ms(t));
                report.frames_written += 1;
            }

            self.logger
                .progress(report.frames_processed, metadata.total_frames);

            if let Some(display) = display.as_mut() {
                let t = Instant::now();
                let event = display.show(&frame, &transformed)?;
                self.logger.timing("display", elapsed_ms(t));
                if event == DisplayEvent::Cancel {
                    report.cancelled = true;
                    break;
                }
            }
        }

        Ok(report)
    }
}

/// Runs `transform` on one frame and checks its output can be written in
/// place of the input. Single-channel output is widened to RGB.
fn apply_transform(
    transform: &mut dyn FrameTransform,
    frame: &Frame,
) -> Result<Frame, Box<dyn std::error::Error>> {
    let output = transform.apply(frame.as_ndarray())?;
    let (height, width, channels) = output.dim();

    if (height, width) != (frame.height() as usize, frame.width() as usize) {
        return Err(format!(
            "Transform changed frame {} from {}x{} to {width}x{height}",
            frame.index(),
            frame.width(),
            frame.height()
        )
        .into());
    }

    if channels != 1 && channels != 3 {
        return Err(format!(
            "Transform produced {channels} channels for frame {}, expected 1 or 3",
            frame.index()
        )
        .into());
    }

    let transformed = Frame::from_array(output.view(), frame.index());
    if channels == 3 {
        return Ok(transformed);
    }
    transformed
        .to_rgb()
        .ok_or_else(|| "Failed to widen grayscale frame".into())
}

fn frame_count_label(metadata: &VideoMetadata) -> String {
    if metadata.total_frames == 0 {
        "unknown number of".to_string()
    } else {
        metadata.total_frames.to_string()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
