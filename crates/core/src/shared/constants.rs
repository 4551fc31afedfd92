/// Frame rate assumed when the container does not report a usable one.
pub const FALLBACK_FPS: f64 = 24.0;

pub const DEFAULT_FOURCC: &str = "XVID";
pub const DEFAULT_OUTPUT: &str = "out.avi";

/// Largest sample value `normalize` maps onto by default.
pub const DEFAULT_CEILING: u8 = 255;

/// Key that stops a run while the live preview is active.
pub const CANCEL_KEY: char = 'q';

pub const DEFAULT_FFMPEG_PROGRAM: &str = "ffmpeg";

// Audio extraction parameters for the remux step.
pub const REMUX_AUDIO_CHANNELS: u32 = 2;
pub const REMUX_AUDIO_SAMPLE_RATE: u32 = 44100;
pub const REMUX_AUDIO_BITRATE: &str = "320k";
pub const REMUX_AUDIO_FORMAT: &str = "mp3";

/// Log progress every N frames by default.
pub const DEFAULT_PROGRESS_EVERY: usize = 1;
