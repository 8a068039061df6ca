use feynmind_client::{ApiClient, TutorReply};
use feynmind_core::{ChatMessage, Quiz, QuizFlow};
use feynmind_session::SessionStore;
use feynmind_speech::{CaptureEvent, SpeechCapture, SpeechError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// The three navigable screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Chat,
    Quiz,
}

impl Screen {
    pub fn next(self) -> Self {
        match self {
            Screen::Home => Screen::Chat,
            Screen::Chat => Screen::Quiz,
            Screen::Quiz => Screen::Home,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Chat => "Tutor",
            Screen::Quiz => "Quiz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Connecting,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "● Connected"),
            ConnectionStatus::Disconnected => write!(f, "○ Disconnected"),
            ConnectionStatus::Connecting => write!(f, "◐ Connecting"),
        }
    }
}

/// Results of spawned backend calls, delivered back to the event loop.
/// Foreground results carry the request generation current when they
/// were issued; results from an older generation are dropped on
/// arrival (the user navigated away, nothing left to update).
#[derive(Debug)]
pub enum AppEvent {
    QuizLoaded {
        generation: u64,
        result: Result<Quiz, String>,
    },
    TutorReplied {
        generation: u64,
        sent: String,
        result: Result<TutorReply, String>,
    },
    MinutesSaved {
        generation: u64,
        minutes: u64,
        result: Result<(), String>,
    },
    AttemptSaved {
        result: Result<(), String>,
    },
}

pub struct App {
    client: ApiClient,
    pub store: SessionStore,
    pub speech: SpeechCapture,
    pub screen: Screen,
    pub quiz_flow: QuizFlow,
    pub followups: Vec<String>,
    pub suggest_quiz: bool,
    pub status: ConnectionStatus,
    /// Inline message on the chat screen: gateway failures, save
    /// outcomes, dictation problems. Plain text, never a code.
    pub notice: Option<String>,
    pub topic_input: String,
    pub selected_question: usize,
    pub scroll_offset: usize,
    pub chat_pending: bool,
    pub quiz_pending: bool,
    pub minutes_pending: bool,
    generation: u64,
    events_tx: mpsc::Sender<AppEvent>,
    events_rx: mpsc::Receiver<AppEvent>,
}

impl App {
    pub fn new(client: ApiClient, speech: SpeechCapture) -> Self {
        let (events_tx, events_rx) = mpsc::channel(100);
        Self {
            client,
            store: SessionStore::new(),
            speech,
            screen: Screen::Home,
            quiz_flow: QuizFlow::NoTopic,
            followups: Vec::new(),
            suggest_quiz: false,
            status: ConnectionStatus::Disconnected,
            notice: None,
            topic_input: String::new(),
            selected_question: 0,
            scroll_offset: 0,
            chat_pending: false,
            quiz_pending: false,
            minutes_pending: false,
            generation: 0,
            events_tx,
            events_rx,
        }
    }

    pub async fn check_connection(&mut self) {
        self.status = ConnectionStatus::Connecting;
        if self.client.health_check().await {
            self.status = ConnectionStatus::Connected;
        } else {
            self.status = ConnectionStatus::Disconnected;
            warn!(base_url = self.client.base_url(), "backend unreachable");
        }
    }

    // --- navigation -------------------------------------------------

    /// Switches screens. Pending foreground calls are abandoned: their
    /// results arrive tagged with the old generation and are dropped.
    pub fn set_screen(&mut self, screen: Screen) {
        if screen == self.screen {
            return;
        }
        self.generation += 1;
        self.chat_pending = false;
        self.quiz_pending = false;
        self.minutes_pending = false;
        self.notice = None;
        self.screen = screen;
        if screen == Screen::Quiz {
            self.enter_quiz();
        }
    }

    pub fn cycle_screen(&mut self) {
        self.set_screen(self.screen.next());
    }

    /// Settles the quiz screen state on entry: resume an on-screen or
    /// cached quiz, otherwise load one on demand.
    fn enter_quiz(&mut self) {
        self.selected_question = 0;
        if self.store.topic().trim().is_empty() {
            self.quiz_flow = QuizFlow::NoTopic;
            return;
        }
        match self.quiz_flow {
            QuizFlow::Ready { .. } | QuizFlow::Submitted { .. } | QuizFlow::Failed { .. } => {}
            _ => {
                if let Some(quiz) = self.store.last_quiz().cloned() {
                    self.quiz_flow.loaded(quiz);
                } else {
                    self.load_quiz();
                }
            }
        }
    }

    // --- home screen ------------------------------------------------

    pub fn push_topic_char(&mut self, c: char) {
        self.topic_input.push(c);
    }

    pub fn pop_topic_char(&mut self) {
        self.topic_input.pop();
    }

    pub fn cycle_difficulty(&mut self) {
        let next = self.store.difficulty().cycle();
        self.store.set_difficulty(next);
    }

    /// Commits the edited topic. Changing topic invalidates the cached
    /// quiz (it was generated for the old topic) and moves to the chat
    /// screen, mirroring the topic-entry flow.
    pub fn confirm_topic(&mut self) {
        let topic = self.topic_input.trim().to_string();
        if topic.is_empty() {
            return;
        }
        if topic != self.store.topic() {
            self.store.set_topic(topic);
            self.store.set_last_quiz(None);
            self.quiz_flow = QuizFlow::NoTopic;
            self.followups.clear();
            self.suggest_quiz = false;
        }
        self.set_screen(Screen::Chat);
    }

    // --- chat screen ------------------------------------------------

    pub fn push_transcript_char(&mut self, c: char) {
        let mut transcript = self.store.transcript().to_string();
        transcript.push(c);
        self.store.set_transcript(transcript);
    }

    pub fn pop_transcript_char(&mut self) {
        let mut transcript = self.store.transcript().to_string();
        transcript.pop();
        self.store.set_transcript(transcript);
    }

    pub fn can_analyze(&self) -> bool {
        !self.chat_pending
            && !self.store.topic().trim().is_empty()
            && !self.store.transcript().trim().is_empty()
    }

    /// Sends the current explanation to the tutor. Disabled (no-op)
    /// while a reply is pending or while topic/transcript are empty.
    pub fn analyze(&mut self) {
        if !self.can_analyze() {
            return;
        }
        self.chat_pending = true;
        self.notice = None;

        let client = self.client.clone();
        let topic = self.store.topic().trim().to_string();
        let transcript = self.store.transcript().trim().to_string();
        let history = self.store.chat_history().to_vec();
        let generation = self.generation;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client
                .tutor_chat(&topic, &transcript, &history)
                .await
                .map_err(|e| e.to_string());
            let _ = tx
                .send(AppEvent::TutorReplied {
                    generation,
                    sent: transcript,
                    result,
                })
                .await;
        });
    }

    /// Copies a suggested followup into the transcript box for the
    /// user to answer.
    pub fn pick_followup(&mut self, index: usize) {
        if let Some(followup) = self.followups.get(index).cloned() {
            self.store.set_transcript(followup);
            self.followups.clear();
        }
    }

    pub fn clear_history(&mut self) {
        self.store.clear_chat_history();
        self.scroll_offset = 0;
    }

    pub fn can_save_minutes(&self) -> bool {
        !self.minutes_pending && self.store.mic_timer().whole_minutes() >= 1
    }

    /// Persists the accumulated listening minutes. The timer is reset
    /// only after the backend acknowledges, so a failure leaves the
    /// measured time intact for a retry.
    pub fn save_minutes(&mut self) {
        if !self.can_save_minutes() {
            return;
        }
        let minutes = self.store.mic_timer().whole_minutes();
        self.minutes_pending = true;

        let client = self.client.clone();
        let topic = self.store.topic().trim().to_string();
        let generation = self.generation;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client
                .save_minutes(&topic, minutes)
                .await
                .map_err(|e| e.to_string());
            let _ = tx
                .send(AppEvent::MinutesSaved {
                    generation,
                    minutes,
                    result,
                })
                .await;
        });
    }

    pub async fn toggle_mic(&mut self) {
        if !self.speech.is_available() {
            self.notice = Some("Dictation is not available on this system".to_string());
            return;
        }
        let result = if self.speech.is_recording() {
            self.speech.stop().await
        } else {
            self.speech.start().await
        };
        match result {
            Ok(()) => {}
            // A second start while live is an ignored press.
            Err(SpeechError::AlreadyActive) => {}
            Err(e) => {
                warn!(error = %e, "speech capture failed");
                self.notice = Some(format!("Dictation error: {}", e));
            }
        }
    }

    // --- quiz screen ------------------------------------------------

    /// Issues a quiz generation request. Also used for regenerate and
    /// for retry after failure. No-op while one is already in flight.
    pub fn load_quiz(&mut self) {
        if self.quiz_pending || self.store.topic().trim().is_empty() {
            return;
        }
        self.quiz_pending = true;
        self.quiz_flow.begin_loading();
        self.selected_question = 0;

        let client = self.client.clone();
        let topic = self.store.topic().trim().to_string();
        let difficulty = self.store.difficulty();
        let generation = self.generation;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client
                .generate_quiz(&topic, difficulty)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::QuizLoaded { generation, result }).await;
        });
    }

    pub fn select_previous_question(&mut self) {
        self.selected_question = self.selected_question.saturating_sub(1);
    }

    pub fn select_next_question(&mut self) {
        if let Some(quiz) = self.quiz_flow.quiz() {
            if self.selected_question + 1 < quiz.questions.len() {
                self.selected_question += 1;
            }
        }
    }

    /// Records a choice for the highlighted question. Inert once
    /// submitted (the flow ignores it).
    pub fn choose(&mut self, choice: usize) {
        let id = self
            .quiz_flow
            .quiz()
            .and_then(|quiz| quiz.questions.get(self.selected_question))
            .map(|q| q.id.clone());
        if let Some(id) = id {
            self.quiz_flow.select(&id, choice);
        }
    }

    /// Scores the quiz locally and kicks off the best-effort attempt
    /// save. The displayed result never depends on the save outcome.
    pub fn submit_quiz(&mut self) {
        let already_submitted = self.quiz_flow.is_submitted();
        let Some(record) = self.quiz_flow.submit() else {
            return;
        };
        if already_submitted {
            return;
        }

        let Some(quiz) = self.quiz_flow.quiz() else {
            return;
        };
        let client = self.client.clone();
        let topic = quiz.topic.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client
                .save_attempt(&topic, record.questions, record.score, record.accuracy)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::AttemptSaved { result }).await;
        });
    }

    // --- event pump -------------------------------------------------

    /// Drains speech and backend events. Called once per tick from the
    /// main loop; everything here is non-blocking.
    pub fn process_events(&mut self) {
        for event in self.speech.drain_events() {
            match event {
                // The timer follows actual recognition boundaries, not
                // the keypress that requested them.
                CaptureEvent::Started => self.store.start_mic_timer(),
                CaptureEvent::Stopped => self.store.stop_mic_timer(),
                CaptureEvent::Transcript(text) => self.store.set_transcript(text),
                CaptureEvent::Error(message) => {
                    warn!(message, "dictation reported an error");
                    self.notice = Some(format!("Dictation error: {}", message));
                }
            }
        }

        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::QuizLoaded { generation, result } => {
                if generation != self.generation {
                    debug!("dropping stale quiz result");
                    return;
                }
                self.quiz_pending = false;
                match result {
                    Ok(quiz) => {
                        self.store.set_last_quiz(Some(quiz.clone()));
                        self.quiz_flow.loaded(quiz);
                        self.selected_question = 0;
                    }
                    Err(message) => self.quiz_flow.failed(message),
                }
            }
            AppEvent::TutorReplied {
                generation,
                sent,
                result,
            } => {
                if generation != self.generation {
                    debug!("dropping stale tutor reply");
                    return;
                }
                self.chat_pending = false;
                match result {
                    Ok(reply) => {
                        self.store.add_chat_message(ChatMessage::user(sent));
                        self.store
                            .add_chat_message(ChatMessage::assistant(reply.response));
                        self.followups = reply.followups;
                        self.suggest_quiz = reply.suggest_quiz;
                        self.store.set_transcript("");
                    }
                    Err(message) => self.notice = Some(message),
                }
            }
            AppEvent::MinutesSaved {
                generation,
                minutes,
                result,
            } => {
                let current = generation == self.generation;
                if current {
                    self.minutes_pending = false;
                }
                match result {
                    Ok(()) => {
                        // The store outlives navigation: a late ack
                        // still resets the timer, otherwise the same
                        // minutes could be saved twice.
                        self.store.reset_mic_timer();
                        if current {
                            self.notice = Some(format!("Saved {} minutes", minutes));
                        }
                    }
                    Err(message) => {
                        // Best effort: keep the measured time so the
                        // user can retry.
                        warn!(message, "failed to save minutes");
                        if current {
                            self.notice = Some(format!("Could not save minutes: {}", message));
                        }
                    }
                }
            }
            AppEvent::AttemptSaved { result } => {
                if let Err(message) = result {
                    warn!(message, "failed to save quiz attempt");
                }
            }
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset += 1;
    }

    pub async fn shutdown(&mut self) {
        if let Err(e) = self.speech.stop().await {
            warn!(error = %e, "failed to stop dictation on exit");
        }
    }
}
