//! HTTP gateway to the FeynMind backend.
//!
//! One request/response method per backend operation: quiz
//! generation, tutor chat, minute persistence, and attempt
//! persistence. Non-2xx responses are mapped to a single descriptive
//! failure message; nothing is silently swallowed.

pub mod client;
pub mod error;

pub use client::{ApiClient, TutorReply};
pub use error::{ApiError, ApiResult};
