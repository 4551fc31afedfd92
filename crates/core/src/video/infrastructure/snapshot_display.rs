use std::path::PathBuf;

use crossbeam_channel::Receiver;

use crate::shared::constants::CANCEL_KEY;
use crate::shared::frame::Frame;
use crate::video::domain::frame_display::{DisplayEvent, FrameDisplay};

/// Live preview that writes the original and transformed frames side by side
/// into a single image file, overwritten on every frame.
///
/// Any image viewer that reloads on change shows the run as it happens.
/// Keys arrive on an optional channel (see
/// [`crate::video::infrastructure::key_watcher`]) and are drained once per
/// frame; [`CANCEL_KEY`] stops the run.
pub struct SnapshotDisplay {
    path: PathBuf,
    keys: Option<Receiver<char>>,
    frames_shown: usize,
}

impl SnapshotDisplay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            keys: None,
            frames_shown: 0,
        }
    }

    pub fn with_keys(mut self, keys: Receiver<char>) -> Self {
        self.keys = Some(keys);
        self
    }

    fn cancel_requested(&self) -> bool {
        let Some(keys) = &self.keys else {
            return false;
        };
        keys.try_iter().any(|key| key.eq_ignore_ascii_case(&CANCEL_KEY))
    }
}

impl FrameDisplay for SnapshotDisplay {
    fn show(
        &mut self,
        original: &Frame,
        transformed: &Frame,
    ) -> Result<DisplayEvent, Box<dyn std::error::Error>> {
        let composite = side_by_side(original, transformed)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write beside the target and rename so viewers never read a partial file.
        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let staging = self.path.with_extension(format!("partial.{ext}"));
        composite.save(&staging)?;
        std::fs::rename(&staging, &self.path)?;
        self.frames_shown += 1;

        if self.cancel_requested() {
            log::info!("Cancel key pressed after frame {}", original.index());
            return Ok(DisplayEvent::Cancel);
        }
        Ok(DisplayEvent::Continue)
    }

    fn close(&mut self) {
        log::debug!(
            "Preview closed after {} frames ({})",
            self.frames_shown,
            self.path.display()
        );
    }
}

/// Places `left` and `right` next to each other on a black canvas tall enough
/// for both.
fn side_by_side(
    left: &Frame,
    right: &Frame,
) -> Result<image::RgbImage, Box<dyn std::error::Error>> {
    let left = to_image(left)?;
    let right = to_image(right)?;

    let mut canvas = image::RgbImage::new(
        left.width() + right.width(),
        left.height().max(right.height()),
    );
    image::imageops::replace(&mut canvas, &left, 0, 0);
    image::imageops::replace(&mut canvas, &right, i64::from(left.width()), 0);
    Ok(canvas)
}

fn to_image(frame: &Frame) -> Result<image::RgbImage, Box<dyn std::error::Error>> {
    let rgb = frame
        .to_rgb()
        .ok_or_else(|| format!("Cannot preview a {}-channel frame", frame.channels()))?;
    let (width, height) = (rgb.width(), rgb.height());
    image::RgbImage::from_raw(width, height, rgb.data().to_vec())
        .ok_or_else(|| "Failed to create image from frame data".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, channels: u8, value: u8) -> Frame {
        Frame::new(
            vec![value; (width * height * channels as u32) as usize],
            width,
            height,
            channels,
            0,
        )
    }

    #[test]
    fn test_show_writes_side_by_side_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        let mut display = SnapshotDisplay::new(&path);

        let event = display
            .show(&solid(4, 3, 3, 10), &solid(4, 3, 3, 200))
            .unwrap();
        assert_eq!(event, DisplayEvent::Continue);

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (8, 3));
        assert_eq!(img.get_pixel(0, 0).0, [10, 10, 10]);
        assert_eq!(img.get_pixel(7, 2).0, [200, 200, 200]);
    }

    #[test]
    fn test_show_widens_grayscale_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preview.png");
        let mut display = SnapshotDisplay::new(&path);

        display
            .show(&solid(2, 2, 3, 0), &solid(2, 2, 1, 99))
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(3, 1).0, [99, 99, 99]);
    }

    #[test]
    fn test_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        let mut display = SnapshotDisplay::new(&path);

        display.show(&solid(2, 2, 3, 1), &solid(2, 2, 3, 1)).unwrap();
        display.show(&solid(2, 2, 3, 50), &solid(2, 2, 3, 50)).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(0, 0).0, [50, 50, 50]);
        assert!(!dir.path().join("preview.partial.png").exists());
    }

    #[test]
    fn test_cancel_key_stops() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut display = SnapshotDisplay::new(dir.path().join("p.png")).with_keys(rx);

        tx.send('x').unwrap();
        let first = display.show(&solid(1, 1, 3, 0), &solid(1, 1, 3, 0)).unwrap();
        assert_eq!(first, DisplayEvent::Continue);

        tx.send('Q').unwrap();
        let second = display.show(&solid(1, 1, 3, 0), &solid(1, 1, 3, 0)).unwrap();
        assert_eq!(second, DisplayEvent::Cancel);
    }

    #[test]
    fn test_rejects_two_channel_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut display = SnapshotDisplay::new(dir.path().join("p.png"));
        assert!(display
            .show(&solid(1, 1, 2, 0), &solid(1, 1, 3, 0))
            .is_err());
    }
}
