pub mod builtin_transforms;
pub mod transform_factory;
