pub mod ffmpeg_cli_remuxer;
pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod key_watcher;
pub mod snapshot_display;
#[cfg(test)]
pub(crate) mod test_video;
