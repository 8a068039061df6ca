use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeechError {
    /// No dictation command is configured or resolvable; decided once
    /// at startup.
    #[error("speech capture is not available in this environment")]
    Unavailable,

    /// `start()` while already recording. Callers treat this as an
    /// ignored press, not a failure.
    #[error("capture is already recording")]
    AlreadyActive,

    #[error("failed to launch dictation command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("dictation command error: {0}")]
    Io(#[from] std::io::Error),
}
