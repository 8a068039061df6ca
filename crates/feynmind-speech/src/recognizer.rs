//! The seam over the actual dictation facility.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::SpeechError;

/// Events a recognizer backend emits while a recording is live.
///
/// `Started` and `Stopped` mark the moments recognition actually
/// begins and ends, which can lag the user's keypress; the caller
/// drives mic-timer accumulation off these, not off the keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerEvent {
    Started,
    Segment { text: String, is_final: bool },
    Stopped,
    Error(String),
}

/// A continuous dictation session. `start` begins emitting events on
/// the supplied channel; `stop` ends the session (a trailing `Stopped`
/// event is still delivered through the channel).
#[async_trait]
pub trait Recognizer: Send {
    async fn start(&mut self, events: mpsc::Sender<RecognizerEvent>) -> Result<(), SpeechError>;
    async fn stop(&mut self) -> Result<(), SpeechError>;
}

/// One line of dictation command output.
#[derive(Debug, Deserialize)]
struct SegmentLine {
    text: String,
    #[serde(rename = "final", default)]
    is_final: bool,
}

/// Runs an external dictation command and parses its stdout as JSON
/// lines of `{"text": ..., "final": bool}`. The command is expected to
/// stream interim results continuously until killed.
pub struct CommandRecognizer {
    program: PathBuf,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandRecognizer {
    /// Resolves `command` against `PATH` (or as an absolute path).
    /// Returns `None` when it cannot be resolved; callers treat that
    /// as capture being unavailable for the whole run.
    pub fn detect(command: &str, args: &[String]) -> Option<Self> {
        let program = resolve_program(command)?;
        debug!(?program, "dictation command resolved");
        Some(Self {
            program,
            args: args.to_vec(),
            child: None,
        })
    }
}

#[async_trait]
impl Recognizer for CommandRecognizer {
    async fn start(&mut self, events: mpsc::Sender<RecognizerEvent>) -> Result<(), SpeechError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(SpeechError::Spawn)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpeechError::Spawn(std::io::Error::other("no stdout pipe")))?;
        self.child = Some(child);

        tokio::spawn(async move {
            // Recognition is live once the pipe is up.
            if events.send(RecognizerEvent::Started).await.is_err() {
                return;
            }

            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<SegmentLine>(line) {
                            Ok(segment) => {
                                let event = RecognizerEvent::Segment {
                                    text: segment.text,
                                    is_final: segment.is_final,
                                };
                                if events.send(event).await.is_err() {
                                    return;
                                }
                            }
                            Err(e) => {
                                warn!(error = %e, line, "unparseable dictation output");
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = events.send(RecognizerEvent::Error(e.to_string())).await;
                        break;
                    }
                }
            }

            // EOF: the command exited (killed by stop or on its own).
            let _ = events.send(RecognizerEvent::Stopped).await;
        });

        Ok(())
    }

    async fn stop(&mut self) -> Result<(), SpeechError> {
        if let Some(mut child) = self.child.take() {
            // Killing the process closes stdout; the reader task then
            // emits the Stopped event at the true end of recognition.
            child.start_kill()?;
            let _ = child.wait().await;
        }
        Ok(())
    }
}

fn resolve_program(command: &str) -> Option<PathBuf> {
    let candidate = Path::new(command);
    if candidate.is_absolute() || candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(command))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_fails_for_missing_commands() {
        assert!(CommandRecognizer::detect("feynmind-no-such-dictation-cmd", &[]).is_none());
        assert!(CommandRecognizer::detect("/nonexistent/path/dictate", &[]).is_none());
    }

    #[test]
    fn detect_resolves_absolute_paths() {
        // /bin/sh exists on every supported platform this runs on.
        let recognizer = CommandRecognizer::detect("/bin/sh", &[]);
        assert!(recognizer.is_some());
    }

    #[test]
    fn segment_lines_default_to_interim() {
        let line: SegmentLine = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert!(!line.is_final);
        let line: SegmentLine =
            serde_json::from_str(r#"{"text":"hello","final":true}"#).unwrap();
        assert!(line.is_final);
    }

    #[tokio::test]
    async fn command_recognizer_streams_segments_until_eof() {
        // A stand-in dictation command that emits two segments.
        let script = r#"printf '{"text":"plants ","final":true}\n{"text":"grow"}\n'"#;
        let mut recognizer = CommandRecognizer {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".into(), script.into()],
            child: None,
        };

        let (tx, mut rx) = mpsc::channel(16);
        recognizer.start(tx).await.unwrap();

        assert_eq!(rx.recv().await, Some(RecognizerEvent::Started));
        assert_eq!(
            rx.recv().await,
            Some(RecognizerEvent::Segment {
                text: "plants ".into(),
                is_final: true
            })
        );
        assert_eq!(
            rx.recv().await,
            Some(RecognizerEvent::Segment {
                text: "grow".into(),
                is_final: false
            })
        );
        assert_eq!(rx.recv().await, Some(RecognizerEvent::Stopped));
    }

    #[tokio::test]
    async fn stop_ends_a_long_running_command() {
        let mut recognizer = CommandRecognizer {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".into(), "sleep 30".into()],
            child: None,
        };

        let (tx, mut rx) = mpsc::channel(16);
        recognizer.start(tx).await.unwrap();
        assert_eq!(rx.recv().await, Some(RecognizerEvent::Started));

        recognizer.stop().await.unwrap();
        assert_eq!(rx.recv().await, Some(RecognizerEvent::Stopped));

        // stop on an already-stopped recognizer is a no-op
        recognizer.stop().await.unwrap();
    }
}
