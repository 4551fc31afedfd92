use std::path::Path;

use crate::shared::constants::FALLBACK_FPS;
use crate::shared::fourcc::{FourCc, FourCcError};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes RGB frames via ffmpeg-next with the compressor named by a
/// [`FourCc`] tag.
///
/// The container format follows the output path's extension. The output
/// carries video only; audio is reattached separately.
pub struct FfmpegWriter {
    fourcc: FourCc,
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    width: u32,
    height: u32,
    fps: i32,
    frame_count: usize,
    video_stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new(fourcc: FourCc) -> Self {
        Self {
            fourcc,
            octx: None,
            encoder: None,
            scaler: None,
            width: 0,
            height: 0,
            fps: 0,
            frame_count: 0,
            video_stream_index: 0,
        }
    }

    /// Moves every packet the encoder has ready into the container.
    fn drain_packets(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) else {
            return Err("FfmpegWriter: not opened".into());
        };

        let ost_time_base = octx
            .stream(self.video_stream_index)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(self.video_stream_index);
            encoded.rescale_ts(ffmpeg_next::Rational(1, self.fps), ost_time_base);
            encoded.write_interleaved(octx)?;
        }
        Ok(())
    }
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let codec_id = encoder_for(self.fourcc)?;
        let codec = ffmpeg_next::encoder::find(codec_id)
            .ok_or_else(|| format!("No {codec_id:?} encoder available for tag {}", self.fourcc))?;
        let pixel_format = preferred_pixel_format(codec);

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let mut ost = octx.add_stream(Some(codec))?;
        let video_stream_index = ost.index();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        let fps = encoder_fps(metadata.fps);

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(pixel_format);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            metadata.width,
            metadata.height,
            pixel_format,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Writing {} with {} ({codec_id:?}, {pixel_format:?}) at {}x{} {fps} fps",
            path.display(),
            self.fourcc,
            metadata.width,
            metadata.height
        );

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.width = metadata.width;
        self.height = metadata.height;
        self.fps = fps;
        self.frame_count = 0;
        self.video_stream_index = video_stream_index;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler)) = (self.encoder.as_mut(), self.scaler.as_mut()) else {
            return Err("FfmpegWriter: not opened".into());
        };

        if frame.width() != self.width || frame.height() != self.height || frame.channels() != 3 {
            return Err(format!(
                "Frame {} is {}x{}x{}, writer expects {}x{}x3",
                frame.index(),
                frame.width(),
                frame.height(),
                frame.channels(),
                self.width,
                self.height
            )
            .into());
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
            ffmpeg_next::format::Pixel::RGB24,
            self.width,
            self.height,
        );

        let row_bytes = self.width as usize * 3;
        let stride = rgb_frame.stride(0);
        let dst = rgb_frame.data_mut(0);
        for (row, src_row) in frame.data().chunks_exact(row_bytes).enumerate() {
            let start = row * stride;
            dst[start..start + row_bytes].copy_from_slice(src_row);
        }

        let mut converted = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&rgb_frame, &mut converted)?;
        converted.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&converted)?;
        self.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.send_eof()?;
            self.drain_packets()?;
            if let Some(octx) = self.octx.as_mut() {
                octx.write_trailer()?;
            }
            log::debug!("Encoder finalized after {} frames", self.frame_count);
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        Ok(())
    }
}

/// Resolves an encoding tag to the FFmpeg encoder that implements it.
pub fn encoder_for(fourcc: FourCc) -> Result<ffmpeg_next::codec::Id, FourCcError> {
    use ffmpeg_next::codec::Id;

    let id = match fourcc.as_bytes() {
        b"XVID" | b"DIVX" | b"DX50" | b"FMP4" | b"MP4V" | b"MPG4" => Id::MPEG4,
        b"MJPG" => Id::MJPEG,
        b"H264" | b"X264" | b"AVC1" => Id::H264,
        b"FFV1" => Id::FFV1,
        b"HFYU" => Id::HUFFYUV,
        b"MPG1" | b"PIM1" => Id::MPEG1VIDEO,
        b"MPG2" => Id::MPEG2VIDEO,
        b"VP80" => Id::VP8,
        b"VP90" => Id::VP9,
        b"PNG " => Id::PNG,
        _ => return Err(FourCcError::UnsupportedTag(fourcc)),
    };
    Ok(id)
}

/// First pixel format the encoder advertises, which FFmpeg lists in order
/// of preference.
fn preferred_pixel_format(codec: ffmpeg_next::Codec) -> ffmpeg_next::format::Pixel {
    codec
        .video()
        .ok()
        .and_then(|video| video.formats())
        .and_then(|mut formats| formats.next())
        .unwrap_or(ffmpeg_next::format::Pixel::YUV420P)
}

/// Encoders take an integral rate; non-positive rates use the fallback.
fn encoder_fps(fps: f64) -> i32 {
    let rounded = fps.round() as i32;
    if rounded <= 0 {
        FALLBACK_FPS as i32
    } else {
        rounded
    }
}
