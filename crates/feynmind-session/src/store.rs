use feynmind_core::{ChatMessage, Difficulty, Quiz};
use tracing::debug;

use crate::mic_timer::MicTimer;

/// The single shared state container for a client run: current topic,
/// difficulty, draft transcript, chat history, mic timer, and the most
/// recently generated quiz.
///
/// `last_quiz`, once set, is the sole source of truth for whether
/// there is a quiz to resume.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    topic: String,
    difficulty: Difficulty,
    transcript: String,
    chat_history: Vec<ChatMessage>,
    mic_timer: MicTimer,
    last_quiz: Option<Quiz>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.topic = topic.into();
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn set_transcript(&mut self, transcript: impl Into<String>) {
        self.transcript = transcript.into();
    }

    pub fn chat_history(&self) -> &[ChatMessage] {
        &self.chat_history
    }

    /// Appends to the history. Growth is unbounded by design; the
    /// history only shrinks via [`SessionStore::clear_chat_history`].
    pub fn add_chat_message(&mut self, message: ChatMessage) {
        self.chat_history.push(message);
    }

    /// Empties the history. Topic, quiz, and timer are untouched.
    pub fn clear_chat_history(&mut self) {
        debug!(messages = self.chat_history.len(), "clearing chat history");
        self.chat_history.clear();
    }

    pub fn mic_timer(&self) -> &MicTimer {
        &self.mic_timer
    }

    pub fn start_mic_timer(&mut self) {
        self.mic_timer.start();
    }

    pub fn stop_mic_timer(&mut self) {
        self.mic_timer.stop();
    }

    pub fn reset_mic_timer(&mut self) {
        self.mic_timer.reset();
    }

    pub fn last_quiz(&self) -> Option<&Quiz> {
        self.last_quiz.as_ref()
    }

    /// Replaces the stored quiz wholesale.
    pub fn set_last_quiz(&mut self, quiz: Option<Quiz>) {
        self.last_quiz = quiz;
    }
}
