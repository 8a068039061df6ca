//! Speech capture for the FeynMind terminal client.
//!
//! Wraps a continuous, interim-result-capable dictation command behind
//! a small state machine: Unavailable / Idle / Recording. Availability
//! is decided once at startup (can the configured command be resolved
//! at all?), never probed mid-flight. Transcript updates are full
//! replacements, never appends, so interim fragments are never
//! duplicated.

pub mod capture;
pub mod error;
pub mod recognizer;
pub mod transcript;

pub use capture::{CaptureEvent, CaptureState, SpeechCapture};
pub use error::SpeechError;
pub use recognizer::{CommandRecognizer, Recognizer, RecognizerEvent};
pub use transcript::TranscriptAssembler;
