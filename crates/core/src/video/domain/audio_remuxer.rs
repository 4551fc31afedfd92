use std::path::Path;

/// Reattaches the audio track of `source` to the silent video at `output`,
/// replacing `output` in place.
pub trait AudioRemuxer: Send {
    fn remux(&self, source: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>>;
}
