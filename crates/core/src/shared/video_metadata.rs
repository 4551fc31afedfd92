use std::fmt;
use std::path::PathBuf;

/// Properties of an opened video source, read once at open time.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// `true` when the container reported no usable rate and `fps` holds
    /// the fallback value.
    pub fps_is_fallback: bool,
    /// Zero when the container does not report a frame count.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl fmt::Display for VideoMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.source_path {
            writeln!(f, "source:       {}", path.display())?;
        }
        writeln!(f, "dimensions:   {}x{}", self.width, self.height)?;
        if self.fps_is_fallback {
            writeln!(f, "frame rate:   {:.2} fps (fallback)", self.fps)?;
        } else {
            writeln!(f, "frame rate:   {:.2} fps", self.fps)?;
        }
        if self.total_frames > 0 {
            writeln!(f, "total frames: {}", self.total_frames)?;
        } else {
            writeln!(f, "total frames: unknown")?;
        }
        write!(f, "codec:        {}", self.codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            width: 1920,
            height: 1080,
            fps: 30.0,
            fps_is_fallback: false,
            total_frames: 900,
            codec: "h264".to_string(),
            source_path: Some(PathBuf::from("/tmp/test.mp4")),
        }
    }

    #[test]
    fn test_display_lists_properties() {
        let text = metadata().to_string();
        assert!(text.contains("/tmp/test.mp4"));
        assert!(text.contains("1920x1080"));
        assert!(text.contains("30.00 fps"));
        assert!(text.contains("total frames: 900"));
        assert!(text.contains("h264"));
        assert!(!text.contains("fallback"));
    }

    #[test]
    fn test_display_marks_fallback_rate_and_unknown_count() {
        let meta = VideoMetadata {
            fps: 24.0,
            fps_is_fallback: true,
            total_frames: 0,
            source_path: None,
            ..metadata()
        };
        let text = meta.to_string();
        assert!(text.contains("24.00 fps (fallback)"));
        assert!(text.contains("total frames: unknown"));
        assert!(!text.contains("source:"));
    }
}
