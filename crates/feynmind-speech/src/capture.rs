//! The capture state machine the view layer talks to.

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::SpeechError;
use crate::recognizer::{Recognizer, RecognizerEvent};
use crate::transcript::TranscriptAssembler;

/// Capture capability and activity, decided once at construction:
/// a capture built without a recognizer stays `Unavailable` for the
/// whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Unavailable,
    Idle,
    Recording,
}

/// High-level events for the view layer, drained on the tick loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Recognition actually began; start the mic timer now.
    Started,
    /// Full replacement for the visible transcript.
    Transcript(String),
    /// Recognition actually ended; stop the mic timer now.
    Stopped,
    Error(String),
}

/// Owns a recognizer and assembles its raw segments into whole
/// transcripts. Strictly sequential: `start()` while recording is
/// rejected, `stop()` while idle is a no-op.
pub struct SpeechCapture {
    recognizer: Option<Box<dyn Recognizer>>,
    state: CaptureState,
    assembler: TranscriptAssembler,
    events_rx: Option<mpsc::Receiver<RecognizerEvent>>,
    /// Events already consumed from a finished recording, waiting for
    /// the next `drain_events` call. Guarantees the trailing `Stopped`
    /// survives a stop-then-restart between ticks.
    pending: Vec<CaptureEvent>,
}

impl SpeechCapture {
    /// `recognizer: None` means the capability was not detected at
    /// startup; the capture then reports unavailability up front
    /// instead of failing at start-time.
    pub fn new(recognizer: Option<Box<dyn Recognizer>>) -> Self {
        let state = if recognizer.is_some() {
            CaptureState::Idle
        } else {
            CaptureState::Unavailable
        };
        Self {
            recognizer,
            state,
            assembler: TranscriptAssembler::new(),
            events_rx: None,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_available(&self) -> bool {
        self.state != CaptureState::Unavailable
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    /// Idle -> Recording. Each recording starts a fresh transcript.
    pub async fn start(&mut self) -> Result<(), SpeechError> {
        match self.state {
            CaptureState::Unavailable => Err(SpeechError::Unavailable),
            CaptureState::Recording => Err(SpeechError::AlreadyActive),
            CaptureState::Idle => {
                let recognizer = self
                    .recognizer
                    .as_mut()
                    .ok_or(SpeechError::Unavailable)?;
                self.assembler.reset();
                let (tx, rx) = mpsc::channel(64);
                recognizer.start(tx).await?;
                self.events_rx = Some(rx);
                self.state = CaptureState::Recording;
                Ok(())
            }
        }
    }

    /// Recording -> Idle. Harmless no-op when already idle. The rest
    /// of the recording, its trailing `Stopped` included, is consumed
    /// here and held until the next `drain_events` call, so a restart
    /// before the next tick cannot lose it.
    pub async fn stop(&mut self) -> Result<(), SpeechError> {
        if self.state != CaptureState::Recording {
            return Ok(());
        }
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop().await?;
        }
        self.state = CaptureState::Idle;

        if let Some(mut rx) = self.events_rx.take() {
            let mut pending = std::mem::take(&mut self.pending);
            let mut stopped = false;
            while let Some(event) = rx.recv().await {
                if self.translate(event, &mut pending) {
                    stopped = true;
                    break;
                }
            }
            if !stopped {
                // The reader went away without a Stopped; synthesize
                // one so every start still has a matching stop.
                pending.push(CaptureEvent::Stopped);
            }
            self.pending = pending;
        }
        Ok(())
    }

    /// Drains pending recognizer events without blocking, translating
    /// segments into full-transcript replacements. Called from the
    /// view layer's tick loop.
    pub fn drain_events(&mut self) -> Vec<CaptureEvent> {
        // Collect raw events first to keep the receiver borrow short.
        let mut raw = Vec::new();
        if let Some(rx) = self.events_rx.as_mut() {
            while let Ok(event) = rx.try_recv() {
                raw.push(event);
            }
        }

        let mut out = std::mem::take(&mut self.pending);
        let mut ended = false;
        for event in raw {
            if self.translate(event, &mut out) {
                ended = true;
            }
        }

        // Covers the command ending on its own, without a stop().
        if ended {
            debug!("recognition ended");
            self.events_rx = None;
            if self.state == CaptureState::Recording {
                self.state = CaptureState::Idle;
            }
        }

        out
    }

    /// Maps one raw recognizer event onto the view-layer event stream.
    /// Returns true for `Stopped`.
    fn translate(&mut self, event: RecognizerEvent, out: &mut Vec<CaptureEvent>) -> bool {
        match event {
            RecognizerEvent::Started => out.push(CaptureEvent::Started),
            RecognizerEvent::Segment { text, is_final } => {
                let visible = self.assembler.apply(&text, is_final);
                out.push(CaptureEvent::Transcript(visible));
            }
            RecognizerEvent::Stopped => {
                out.push(CaptureEvent::Stopped);
                return true;
            }
            RecognizerEvent::Error(message) => {
                out.push(CaptureEvent::Error(message));
            }
        }
        false
    }
}
