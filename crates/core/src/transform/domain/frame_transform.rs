use ndarray::{Array3, ArrayView3};

/// Domain interface for the per-frame function applied by the pipeline.
///
/// Receives the decoded frame as a `(height, width, channels)` view and
/// returns a new array. The output must keep the input's height and width;
/// it may have 1 or 3 channels.
pub trait FrameTransform: Send {
    fn apply(
        &mut self,
        frame: ArrayView3<'_, u8>,
    ) -> Result<Array3<u8>, Box<dyn std::error::Error>>;
}

/// Adapts a closure to [`FrameTransform`].
pub struct FnTransform<F> {
    f: F,
}

impl<F> FrameTransform for FnTransform<F>
where
    F: FnMut(ArrayView3<'_, u8>) -> Result<Array3<u8>, Box<dyn std::error::Error>> + Send,
{
    fn apply(
        &mut self,
        frame: ArrayView3<'_, u8>,
    ) -> Result<Array3<u8>, Box<dyn std::error::Error>> {
        (self.f)(frame)
    }
}

/// Wraps a closure as a boxed transform.
///
/// ```
/// use framewise_core::transform::domain::frame_transform::from_fn;
///
/// let mut double = from_fn(|frame| Ok(frame.mapv(|v| v.saturating_mul(2))));
/// # let _ = &mut double;
/// ```
pub fn from_fn<F>(f: F) -> Box<dyn FrameTransform>
where
    F: FnMut(ArrayView3<'_, u8>) -> Result<Array3<u8>, Box<dyn std::error::Error>>
        + Send
        + 'static,
{
    Box::new(FnTransform { f })
}
