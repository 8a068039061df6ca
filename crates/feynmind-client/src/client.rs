use feynmind_core::{ChatMessage, Difficulty, Quiz};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Client for the FeynMind backend HTTP surface. Cheap to clone; the
/// underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

/// Tutor reply for one analyzed explanation. `suggest_quiz` is a
/// backend signal that the learner is ready to be tested; the client
/// never grades explanations itself.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TutorReply {
    pub response: String,
    pub followups: Vec<String>,
    pub suggest_quiz: bool,
}

#[derive(Debug, Serialize)]
struct QuizRequest<'a> {
    topic: &'a str,
    difficulty: Difficulty,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    topic: &'a str,
    transcript: &'a str,
    history: &'a [ChatMessage],
}

#[derive(Debug, Serialize)]
struct MinutesRequest<'a> {
    topic: &'a str,
    minutes: u64,
}

#[derive(Debug, Serialize)]
struct AttemptRequest<'a> {
    topic: &'a str,
    questions: usize,
    score: usize,
    accuracy: u32,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/health`. Used for the startup connection badge only.
    pub async fn health_check(&self) -> bool {
        match self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// `POST /api/quiz`. Used for fresh generation and for "redo".
    /// The returned quiz is checked against the backend contract
    /// before it reaches scoring.
    pub async fn generate_quiz(&self, topic: &str, difficulty: Difficulty) -> ApiResult<Quiz> {
        let response = self
            .client
            .post(format!("{}/api/quiz", self.base_url))
            .json(&QuizRequest { topic, difficulty })
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let quiz: Quiz = response.json().await?;
        quiz.validate()?;
        debug!(topic, questions = quiz.questions.len(), "quiz generated");
        Ok(quiz)
    }

    /// `POST /api/chat`. Sends the learner's explanation plus the
    /// prior history and returns the tutor's reply.
    pub async fn tutor_chat(
        &self,
        topic: &str,
        transcript: &str,
        history: &[ChatMessage],
    ) -> ApiResult<TutorReply> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&ChatRequest {
                topic,
                transcript,
                history,
            })
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// `POST /api/minutes`. Acknowledgement body is opaque and
    /// ignored. Callers only invoke this with `minutes >= 1`.
    pub async fn save_minutes(&self, topic: &str, minutes: u64) -> ApiResult<()> {
        let response = self
            .client
            .post(format!("{}/api/minutes", self.base_url))
            .json(&MinutesRequest { topic, minutes })
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// `POST /api/attempt`. Best effort: the quiz result is already on
    /// screen before this is called, so callers log failures instead
    /// of surfacing them.
    pub async fn save_attempt(
        &self,
        topic: &str,
        questions: usize,
        score: usize,
        accuracy: u32,
    ) -> ApiResult<()> {
        let response = self
            .client
            .post(format!("{}/api/attempt", self.base_url))
            .json(&AttemptRequest {
                topic,
                questions,
                score,
                accuracy,
            })
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Passes 2xx responses through; anything else becomes a single
    /// `ApiError::Backend` message built by [`failure_message`].
    async fn check_status(response: Response) -> ApiResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::Backend(failure_message(response).await))
        }
    }
}

/// Reduces a non-2xx response to its user-facing text, in priority
/// order: a machine-readable `detail` field, the raw body when it is
/// not JSON, then the numeric status code.
async fn failure_message(response: Response) -> String {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        return format!("Failed: {}", status);
    }
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => match value.get("detail").and_then(|d| d.as_str()) {
            Some(detail) => format!("Failed: {}", detail),
            None => format!("Failed: {}", status),
        },
        Err(_) => format!("Failed: {}", body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feynmind_core::Role;

    fn quiz_body() -> String {
        serde_json::json!({
            "topic": "Photosynthesis",
            "difficulty": "easy",
            "questions": [
                {
                    "id": "q1",
                    "prompt": "What gas do plants absorb?",
                    "choices": ["CO2", "O2", "N2", "He"],
                    "answerIndex": 0,
                    "explanation": "Plants take in carbon dioxide.",
                    "bloom": "remember"
                }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn generate_quiz_round_trips_topic_and_difficulty() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/quiz")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "topic": "Photosynthesis",
                "difficulty": "easy"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(quiz_body())
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let quiz = client
            .generate_quiz("Photosynthesis", Difficulty::Easy)
            .await
            .unwrap();

        assert_eq!(quiz.topic, "Photosynthesis");
        assert_eq!(quiz.difficulty, Difficulty::Easy);
        assert!(!quiz.questions.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn detail_field_wins_over_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/quiz")
            .with_status(429)
            .with_body(r#"{"detail":"rate limited"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client
            .generate_quiz("Photosynthesis", Difficulty::Easy)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed: rate limited");
    }

    #[tokio::test]
    async fn empty_body_falls_back_to_status_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/quiz")
            .with_status(500)
            .with_body("")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client
            .generate_quiz("Photosynthesis", Difficulty::Easy)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed: 500");
    }

    #[tokio::test]
    async fn non_json_body_is_passed_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(502)
            .with_body("upstream gone")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client
            .tutor_chat("Photosynthesis", "plants eat light", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed: upstream gone");
    }

    #[tokio::test]
    async fn json_body_without_detail_falls_back_to_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(422)
            .with_body(r#"{"errors":["topic"]}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client
            .tutor_chat("Photosynthesis", "plants eat light", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed: 422");
    }

    #[tokio::test]
    async fn empty_quiz_is_a_contract_violation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/quiz")
            .with_status(200)
            .with_body(r#"{"topic":"Photosynthesis","difficulty":"easy","questions":[]}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let err = client
            .generate_quiz("Photosynthesis", Difficulty::Easy)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Contract(_)));
    }

    #[tokio::test]
    async fn tutor_chat_sends_history_and_parses_reply() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "topic": "Photosynthesis",
                "transcript": "plants eat light",
                "history": [{"role": "user", "content": "earlier attempt"}]
            })))
            .with_status(200)
            .with_body(
                r#"{"response":"Close. What powers it?","followups":["What is ATP?"],"suggest_quiz":true}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let history = vec![ChatMessage {
            role: Role::User,
            content: "earlier attempt".into(),
        }];
        let reply = client
            .tutor_chat("Photosynthesis", "plants eat light", &history)
            .await
            .unwrap();

        assert_eq!(reply.response, "Close. What powers it?");
        assert_eq!(reply.followups, vec!["What is ATP?".to_string()]);
        assert!(reply.suggest_quiz);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn save_minutes_and_attempt_ignore_ack_bodies() {
        let mut server = mockito::Server::new_async().await;
        let minutes = server
            .mock("POST", "/api/minutes")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "topic": "Photosynthesis",
                "minutes": 3
            })))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;
        let attempt = server
            .mock("POST", "/api/attempt")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "topic": "Photosynthesis",
                "questions": 5,
                "score": 4,
                "accuracy": 80
            })))
            .with_status(200)
            .with_body("whatever")
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        client.save_minutes("Photosynthesis", 3).await.unwrap();
        client
            .save_attempt("Photosynthesis", 5, 4, 80)
            .await
            .unwrap();
        minutes.assert_async().await;
        attempt.assert_async().await;
    }

    #[tokio::test]
    async fn health_check_reflects_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        assert!(client.health_check().await);

        let unreachable = ApiClient::new("http://127.0.0.1:1");
        assert!(!unreachable.health_check().await);
    }

    #[tokio::test]
    async fn generated_quiz_answered_perfectly_scores_one_hundred() {
        use feynmind_core::{score_quiz, AnswerSet};

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/quiz")
            .with_status(200)
            .with_body(quiz_body())
            .create_async()
            .await;

        let client = ApiClient::new(server.url());
        let quiz = client
            .generate_quiz("Photosynthesis", Difficulty::Easy)
            .await
            .unwrap();

        let mut answers = AnswerSet::new();
        for question in &quiz.questions {
            answers.select(question.id.clone(), question.answer_index);
        }
        let record = score_quiz(&quiz, &answers);
        assert_eq!(record.score, quiz.questions.len());
        assert_eq!(record.accuracy, 100);
    }

    #[test]
    fn trailing_slashes_are_trimmed_from_base_url() {
        let client = ApiClient::new("http://localhost:8000///");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
