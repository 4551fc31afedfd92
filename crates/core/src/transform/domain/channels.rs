//! Stateless helpers for splitting, merging and rescaling frame arrays.

use ndarray::{Array, Array2, Array3, ArrayBase, ArrayViewD, Axis, Data, Dimension, Ix2, Ix3};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ChannelError {
    #[error("expected a {expected}-dimensional array, got {found} dimensions")]
    WrongDimensions { expected: usize, found: usize },
    #[error("expected at least 3 channels, got {0}")]
    NotEnoughChannels(usize),
    #[error("channel shapes differ: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),
    #[error(transparent)]
    Layout(#[from] ndarray::ShapeError),
}

/// Splits a `(height, width, channels)` array into its first three channel
/// planes.
pub fn extract_rgb<T: Clone>(
    frame: ArrayViewD<'_, T>,
) -> Result<(Array2<T>, Array2<T>, Array2<T>), ChannelError> {
    let found = frame.ndim();
    let frame = frame
        .into_dimensionality::<Ix3>()
        .map_err(|_| ChannelError::WrongDimensions { expected: 3, found })?;

    let channels = frame.len_of(Axis(2));
    if channels < 3 {
        return Err(ChannelError::NotEnoughChannels(channels));
    }

    let plane = |c: usize| frame.index_axis(Axis(2), c).to_owned();
    Ok((plane(0), plane(1), plane(2)))
}

/// Stacks three equally shaped 2-D planes into a `(height, width, 3)` array.
pub fn combine_rgb<T: Clone>(
    r: ArrayViewD<'_, T>,
    g: ArrayViewD<'_, T>,
    b: ArrayViewD<'_, T>,
) -> Result<Array3<T>, ChannelError> {
    let r = as_plane(r)?;
    let g = as_plane(g)?;
    let b = as_plane(b)?;

    for other in [&g, &b] {
        if other.shape() != r.shape() {
            return Err(ChannelError::ShapeMismatch(
                r.shape().to_vec(),
                other.shape().to_vec(),
            ));
        }
    }

    Ok(ndarray::stack(Axis(2), &[r, g, b])?)
}

/// Replicates one 2-D plane into all three channels.
pub fn combine_single<T: Clone>(channel: ArrayViewD<'_, T>) -> Result<Array3<T>, ChannelError> {
    combine_rgb(channel.clone(), channel.clone(), channel)
}

fn as_plane<T>(plane: ArrayViewD<'_, T>) -> Result<ndarray::ArrayView2<'_, T>, ChannelError> {
    let found = plane.ndim();
    plane
        .into_dimensionality::<Ix2>()
        .map_err(|_| ChannelError::WrongDimensions { expected: 2, found })
}

/// Rescales `array` so its largest absolute value maps to `ceiling`, then
/// converts to `u8`.
///
/// Negative samples clip to zero. With `replace_non_finite`, NaN and
/// infinite samples are zeroed before the maximum is taken; otherwise an
/// infinite maximum collapses every finite sample to zero and positive
/// infinities land on `ceiling`. An array whose
/// maximum is zero is returned as zeros.
pub fn normalize<S, D>(
    array: &ArrayBase<S, D>,
    ceiling: u8,
    replace_non_finite: bool,
) -> Array<u8, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    let cleaned = if replace_non_finite {
        array.mapv(|v| if v.is_finite() { v } else { 0.0 })
    } else {
        array.to_owned()
    };

    let max_abs = cleaned
        .iter()
        .filter(|v| !v.is_nan())
        .fold(0.0f32, |acc, v| acc.max(v.abs()));

    if max_abs == 0.0 || !max_abs.is_finite() {
        return cleaned.mapv(|v| if v == f32::INFINITY { ceiling } else { 0 });
    }

    let scale = f32::from(ceiling) / max_abs;
    cleaned.mapv(|v| (v * scale).round().clamp(0.0, f32::from(ceiling)) as u8)
}
