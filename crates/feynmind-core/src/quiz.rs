//! Quiz-taking state machine and local scoring.
//!
//! The flow mirrors what the user sees: no topic yet, a quiz being
//! generated, a quiz being answered, a submitted result, or a failed
//! load waiting for retry. Scoring happens exactly once at submission
//! and is never recomputed afterwards.

use std::collections::HashMap;

use crate::types::Quiz;

/// The user's chosen answers for the current quiz, keyed by question
/// id. Cleared whenever a new quiz loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    chosen: HashMap<String, usize>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a choice for a question, replacing any earlier one.
    pub fn select(&mut self, question_id: impl Into<String>, choice: usize) {
        self.chosen.insert(question_id.into(), choice);
    }

    pub fn chosen(&self, question_id: &str) -> Option<usize> {
        self.chosen.get(question_id).copied()
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }
}

/// The frozen outcome of one quiz submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    pub questions: usize,
    pub score: usize,
    /// Percentage of correct answers, rounded to the nearest integer.
    pub accuracy: u32,
}

/// Scores a quiz against an answer set: one point per exact index
/// match. Callers must not pass an empty quiz; the gateway rejects
/// those as contract violations before they get here.
pub fn score_quiz(quiz: &Quiz, answers: &AnswerSet) -> AttemptRecord {
    let total = quiz.questions.len();
    let score = quiz
        .questions
        .iter()
        .filter(|q| answers.chosen(&q.id) == Some(q.answer_index))
        .count();
    let accuracy = if total == 0 {
        0
    } else {
        ((score * 100) as f64 / total as f64).round() as u32
    };
    AttemptRecord {
        questions: total,
        score,
        accuracy,
    }
}

/// States of the quiz screen.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizFlow {
    /// No topic entered yet; the only exit is the user setting one.
    NoTopic,
    /// A generation request is in flight.
    Loading,
    /// A quiz is on screen and answers may still change.
    Ready { quiz: Quiz, answers: AnswerSet },
    /// Answers are locked and the score is frozen.
    Submitted {
        quiz: Quiz,
        answers: AnswerSet,
        record: AttemptRecord,
    },
    /// Generation failed; `message` is shown with a retry affordance.
    Failed { message: String },
}

impl QuizFlow {
    pub fn begin_loading(&mut self) {
        *self = QuizFlow::Loading;
    }

    /// Installs a freshly generated quiz with a cleared answer set.
    pub fn loaded(&mut self, quiz: Quiz) {
        *self = QuizFlow::Ready {
            quiz,
            answers: AnswerSet::new(),
        };
    }

    pub fn failed(&mut self, message: impl Into<String>) {
        *self = QuizFlow::Failed {
            message: message.into(),
        };
    }

    /// Records a choice. Only effective in `Ready`; after submission
    /// selection attempts are ignored, not errors.
    pub fn select(&mut self, question_id: &str, choice: usize) {
        if let QuizFlow::Ready { quiz, answers } = self {
            let valid = quiz
                .questions
                .iter()
                .any(|q| q.id == question_id && choice < q.choices.len());
            if valid {
                answers.select(question_id, choice);
            }
        }
    }

    /// Submit gate: every question has a recorded answer.
    pub fn all_answered(&self) -> bool {
        match self {
            QuizFlow::Ready { quiz, answers } => quiz
                .questions
                .iter()
                .all(|q| answers.chosen(&q.id).is_some()),
            QuizFlow::Submitted { .. } => true,
            _ => false,
        }
    }

    /// Scores and locks the quiz. Submitting an already-submitted quiz
    /// returns the recorded result unchanged; submitting an incomplete
    /// or absent quiz does nothing.
    pub fn submit(&mut self) -> Option<AttemptRecord> {
        let state = std::mem::replace(self, QuizFlow::NoTopic);
        match state {
            QuizFlow::Ready { quiz, answers }
                if quiz
                    .questions
                    .iter()
                    .all(|q| answers.chosen(&q.id).is_some()) =>
            {
                let record = score_quiz(&quiz, &answers);
                *self = QuizFlow::Submitted {
                    quiz,
                    answers,
                    record,
                };
                Some(record)
            }
            QuizFlow::Submitted {
                quiz,
                answers,
                record,
            } => {
                *self = QuizFlow::Submitted {
                    quiz,
                    answers,
                    record,
                };
                Some(record)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// The quiz currently on screen, if any.
    pub fn quiz(&self) -> Option<&Quiz> {
        match self {
            QuizFlow::Ready { quiz, .. } | QuizFlow::Submitted { quiz, .. } => Some(quiz),
            _ => None,
        }
    }

    /// The current answer set, if a quiz is on screen.
    pub fn answers(&self) -> Option<&AnswerSet> {
        match self {
            QuizFlow::Ready { answers, .. } | QuizFlow::Submitted { answers, .. } => Some(answers),
            _ => None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, QuizFlow::Submitted { .. })
    }

    pub fn record(&self) -> Option<AttemptRecord> {
        match self {
            QuizFlow::Submitted { record, .. } => Some(*record),
            _ => None,
        }
    }
}
