/// Builds the visible transcript from recognizer segments.
///
/// Each update the recognizer emits carries either a finalized segment
/// or the current interim guess. The visible text is always the
/// concatenation of all finalized segments plus the latest interim
/// one; interim text is replaced on every update rather than appended.
#[derive(Debug, Clone, Default)]
pub struct TranscriptAssembler {
    finalized: String,
}

impl TranscriptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears finalized text; called when a new recording begins.
    pub fn reset(&mut self) {
        self.finalized.clear();
    }

    /// Applies one segment and returns the full visible transcript.
    pub fn apply(&mut self, text: &str, is_final: bool) -> String {
        if is_final {
            self.finalized.push_str(text);
            self.finalized.clone()
        } else {
            format!("{}{}", self.finalized, text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interim_updates_replace_rather_than_append() {
        let mut assembler = TranscriptAssembler::new();
        assert_eq!(assembler.apply("pla", false), "pla");
        assert_eq!(assembler.apply("plants", false), "plants");
        assert_eq!(assembler.apply("plants eat", false), "plants eat");
    }

    #[test]
    fn finalized_segments_accumulate_before_the_interim() {
        let mut assembler = TranscriptAssembler::new();
        assembler.apply("plants absorb ", true);
        assert_eq!(assembler.apply("sun", false), "plants absorb sun");
        assert_eq!(assembler.apply("sunlight", false), "plants absorb sunlight");
        assert_eq!(
            assembler.apply("sunlight and water", true),
            "plants absorb sunlight and water"
        );
    }

    #[test]
    fn reset_drops_prior_recording() {
        let mut assembler = TranscriptAssembler::new();
        assembler.apply("old take ", true);
        assembler.reset();
        assert_eq!(assembler.apply("fresh", false), "fresh");
    }
}
