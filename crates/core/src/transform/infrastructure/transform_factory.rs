use thiserror::Error;

use crate::transform::domain::frame_transform::FrameTransform;

use super::builtin_transforms::{
    GrayscaleTransform, IdentityTransform, InvertTransform, ScaleTransform, StretchTransform,
    SwapRedBlueTransform,
};

/// Names accepted by [`create_transform`]. `scale` takes a factor: `scale:2.0`.
pub const TRANSFORM_NAMES: &[&str] = &[
    "identity",
    "invert",
    "grayscale",
    "swap-rb",
    "scale:<factor>",
    "stretch",
];

#[derive(Error, Debug, PartialEq)]
pub enum TransformSpecError {
    #[error("unknown transform '{0}', expected one of: {names}", names = TRANSFORM_NAMES.join(", "))]
    Unknown(String),
    #[error("invalid scale factor '{0}', expected a finite number")]
    InvalidFactor(String),
}

/// Builds a named built-in transform.
pub fn create_transform(expr: &str) -> Result<Box<dyn FrameTransform>, TransformSpecError> {
    let expr = expr.trim();
    let (name, arg) = match expr.split_once(':') {
        Some((name, arg)) => (name, Some(arg)),
        None => (expr, None),
    };

    let transform: Box<dyn FrameTransform> = match (name.to_ascii_lowercase().as_str(), arg) {
        ("identity", None) => Box::new(IdentityTransform),
        ("invert", None) => Box::new(InvertTransform),
        ("grayscale", None) => Box::new(GrayscaleTransform),
        ("swap-rb", None) => Box::new(SwapRedBlueTransform),
        ("stretch", None) => Box::new(StretchTransform::default()),
        ("scale", Some(arg)) => {
            let factor: f32 = arg
                .parse()
                .ok()
                .filter(|f: &f32| f.is_finite())
                .ok_or_else(|| TransformSpecError::InvalidFactor(arg.to_string()))?;
            Box::new(ScaleTransform::new(factor))
        }
        _ => return Err(TransformSpecError::Unknown(expr.to_string())),
    };

    log::debug!("Using transform: {expr}");
    Ok(transform)
}
