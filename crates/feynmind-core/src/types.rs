use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Requested quiz difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Next difficulty in the picker order, wrapping around.
    pub fn cycle(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single tutoring exchange entry. Immutable once appended to the
/// session history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One multiple-choice question. Identity is `id`; `answer_index` must
/// be a valid index into `choices` (checked by [`Quiz::validate`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    #[serde(rename = "answerIndex")]
    pub answer_index: usize,
    pub explanation: String,
    /// Bloom's taxonomy label, e.g. "remember" or "apply".
    pub bloom: String,
}

/// A generated quiz. Replaced wholesale on regeneration, never
/// partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub topic: String,
    pub difficulty: Difficulty,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Checks the backend contract: at least one question, and every
    /// answer index in range. A quiz that fails here must not reach
    /// scoring.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.questions.is_empty() {
            return Err(QuizError::Empty);
        }
        for question in &self.questions {
            if question.answer_index >= question.choices.len() {
                return Err(QuizError::AnswerIndexOutOfRange {
                    id: question.id.clone(),
                    index: question.answer_index,
                    choices: question.choices.len(),
                });
            }
        }
        Ok(())
    }
}

/// Violation of the quiz shape the backend promises.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("quiz has no questions")]
    Empty,

    #[error("question {id}: answer index {index} out of range ({choices} choices)")]
    AnswerIndexOutOfRange {
        id: String,
        index: usize,
        choices: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, answer_index: usize) -> QuizQuestion {
        QuizQuestion {
            id: id.to_string(),
            prompt: format!("prompt {id}"),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer_index,
            explanation: "because".into(),
            bloom: "remember".into(),
        }
    }

    #[test]
    fn difficulty_wire_format_is_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Easy).unwrap(), "\"easy\"");
        let parsed: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(parsed, Difficulty::Hard);
    }

    #[test]
    fn difficulty_cycles_through_all_levels() {
        let start = Difficulty::Easy;
        assert_eq!(start.cycle(), Difficulty::Medium);
        assert_eq!(start.cycle().cycle(), Difficulty::Hard);
        assert_eq!(start.cycle().cycle().cycle(), Difficulty::Easy);
    }

    #[test]
    fn quiz_question_uses_camel_case_answer_index() {
        let json = r#"{
            "id": "q1",
            "prompt": "What is 2+2?",
            "choices": ["3", "4", "5", "6"],
            "answerIndex": 1,
            "explanation": "basic arithmetic",
            "bloom": "remember"
        }"#;
        let q: QuizQuestion = serde_json::from_str(json).unwrap();
        assert_eq!(q.answer_index, 1);

        let out = serde_json::to_value(&q).unwrap();
        assert_eq!(out["answerIndex"], 1);
    }

    #[test]
    fn validate_rejects_empty_quiz() {
        let quiz = Quiz {
            topic: "Photosynthesis".into(),
            difficulty: Difficulty::Easy,
            questions: vec![],
        };
        assert_eq!(quiz.validate(), Err(QuizError::Empty));
    }

    #[test]
    fn validate_rejects_out_of_range_answer() {
        let quiz = Quiz {
            topic: "Photosynthesis".into(),
            difficulty: Difficulty::Easy,
            questions: vec![question("q1", 4)],
        };
        assert!(matches!(
            quiz.validate(),
            Err(QuizError::AnswerIndexOutOfRange { index: 4, .. })
        ));
    }

    #[test]
    fn validate_accepts_well_formed_quiz() {
        let quiz = Quiz {
            topic: "Photosynthesis".into(),
            difficulty: Difficulty::Easy,
            questions: vec![question("q1", 0), question("q2", 3)],
        };
        assert!(quiz.validate().is_ok());
    }

    #[test]
    fn chat_message_roles_serialize_lowercase() {
        let msg = ChatMessage::user("hello");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"], "hello");
    }
}
