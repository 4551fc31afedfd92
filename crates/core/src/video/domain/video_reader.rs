use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Source side of the pipeline: decodes a video file into [`Frame`]s.
///
/// `open` probes the container once and reports its properties; `frames`
/// then yields every decodable frame in presentation order, each exactly
/// once. The reader is released with `close` when the stream is exhausted.
pub trait VideoReader: Send {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    fn close(&mut self);
}
