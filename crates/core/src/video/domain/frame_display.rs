use crate::shared::frame::Frame;

/// What the pipeline should do after a frame has been shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayEvent {
    Continue,
    /// The viewer pressed the cancel key.
    Cancel,
}

/// Live preview of the original and transformed frame side by side.
///
/// `show` is called once per frame and is also where the cancel key is
/// polled.
pub trait FrameDisplay: Send {
    fn show(
        &mut self,
        original: &Frame,
        transformed: &Frame,
    ) -> Result<DisplayEvent, Box<dyn std::error::Error>>;

    fn close(&mut self) {}
}
