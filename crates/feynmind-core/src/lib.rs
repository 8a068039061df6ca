//! Core domain types for the FeynMind terminal client.
//!
//! Everything in this crate is pure data and pure logic: the quiz and
//! chat types shared across the workspace, plus the quiz-taking state
//! machine. No I/O lives here.

pub mod quiz;
pub mod types;

pub use quiz::{score_quiz, AnswerSet, AttemptRecord, QuizFlow};
pub use types::{ChatMessage, Difficulty, Quiz, QuizError, QuizQuestion, Role};
