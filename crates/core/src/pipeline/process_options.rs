/// Switches controlling one processing run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Encode transformed frames to the output. When false the run is a dry
    /// run and no output file is created.
    pub write_changes: bool,
    /// Reattach the source's audio track after writing. Ignored on dry runs.
    pub preserve_audio: bool,
    /// Show original and transformed frames while processing.
    pub view_while_processing: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            write_changes: true,
            preserve_audio: false,
            view_while_processing: false,
        }
    }
}

impl ProcessOptions {
    pub fn remux_requested(&self) -> bool {
        self.write_changes && self.preserve_audio
    }
}

/// Outcome of a processing run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub frames_processed: usize,
    pub frames_written: usize,
    pub cancelled: bool,
    pub audio_remuxed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_writes_without_audio_or_preview() {
        let options = ProcessOptions::default();
        assert!(options.write_changes);
        assert!(!options.preserve_audio);
        assert!(!options.view_while_processing);
    }

    #[rstest]
    #[case::both(true, true, true)]
    #[case::dry_run(false, true, false)]
    #[case::no_audio(true, false, false)]
    #[case::neither(false, false, false)]
    fn test_remux_requested(#[case] write: bool, #[case] audio: bool, #[case] expected: bool) {
        let options = ProcessOptions {
            write_changes: write,
            preserve_audio: audio,
            ..Default::default()
        };
        assert_eq!(options.remux_requested(), expected);
    }
}
