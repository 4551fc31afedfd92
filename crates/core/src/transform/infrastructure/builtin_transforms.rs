use ndarray::{Array3, ArrayView3, Axis, Zip};

use crate::shared::constants::DEFAULT_CEILING;
use crate::transform::domain::channels::{combine_rgb, extract_rgb, normalize};
use crate::transform::domain::frame_transform::FrameTransform;

/// Passes every frame through unchanged.
pub struct IdentityTransform;

impl FrameTransform for IdentityTransform {
    fn apply(
        &mut self,
        frame: ArrayView3<'_, u8>,
    ) -> Result<Array3<u8>, Box<dyn std::error::Error>> {
        Ok(frame.to_owned())
    }
}

/// Photographic negative: `255 - v` for every sample.
pub struct InvertTransform;

impl FrameTransform for InvertTransform {
    fn apply(
        &mut self,
        frame: ArrayView3<'_, u8>,
    ) -> Result<Array3<u8>, Box<dyn std::error::Error>> {
        Ok(frame.mapv(|v| u8::MAX - v))
    }
}

/// Rec.601 luma as a single-channel frame.
pub struct GrayscaleTransform;

impl FrameTransform for GrayscaleTransform {
    fn apply(
        &mut self,
        frame: ArrayView3<'_, u8>,
    ) -> Result<Array3<u8>, Box<dyn std::error::Error>> {
        let (r, g, b) = extract_rgb(frame.into_dyn())?;
        let mut luma = ndarray::Array2::<u8>::zeros(r.raw_dim());
        Zip::from(&mut luma)
            .and(&r)
            .and(&g)
            .and(&b)
            .for_each(|y, &r, &g, &b| {
                let v = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
                *y = v.round().min(255.0) as u8;
            });
        Ok(luma.insert_axis(Axis(2)))
    }
}

/// Exchanges the first and third channels (RGB <-> BGR).
pub struct SwapRedBlueTransform;

impl FrameTransform for SwapRedBlueTransform {
    fn apply(
        &mut self,
        frame: ArrayView3<'_, u8>,
    ) -> Result<Array3<u8>, Box<dyn std::error::Error>> {
        let (r, g, b) = extract_rgb(frame.into_dyn())?;
        Ok(combine_rgb(
            b.view().into_dyn(),
            g.view().into_dyn(),
            r.view().into_dyn(),
        )?)
    }
}

/// Multiplies every sample by `factor`, saturating at the sample range.
pub struct ScaleTransform {
    factor: f32,
}

impl ScaleTransform {
    pub fn new(factor: f32) -> Self {
        Self { factor }
    }
}

impl FrameTransform for ScaleTransform {
    fn apply(
        &mut self,
        frame: ArrayView3<'_, u8>,
    ) -> Result<Array3<u8>, Box<dyn std::error::Error>> {
        let factor = self.factor;
        Ok(frame.mapv(|v| (f32::from(v) * factor).round().clamp(0.0, 255.0) as u8))
    }
}

/// Stretches contrast so the brightest sample of each frame reaches the
/// ceiling.
pub struct StretchTransform {
    ceiling: u8,
}

impl StretchTransform {
    pub fn new(ceiling: u8) -> Self {
        Self { ceiling }
    }
}

impl Default for StretchTransform {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING)
    }
}

impl FrameTransform for StretchTransform {
    fn apply(
        &mut self,
        frame: ArrayView3<'_, u8>,
    ) -> Result<Array3<u8>, Box<dyn std::error::Error>> {
        let samples = frame.mapv(f32::from);
        Ok(normalize(&samples, self.ceiling, true))
    }
}
