//! Session state for the FeynMind terminal client.
//!
//! One [`SessionStore`] instance lives for the whole application run
//! and is mutated only through its named operations. Readers borrow
//! fields directly; the event loop is single-threaded. None of the
//! operations panic for well-typed input.

pub mod mic_timer;
pub mod store;

pub use mic_timer::MicTimer;
pub use store::SessionStore;
