//! Payload fixtures.

use morais_events::EventArgs;
use serde::Serialize;
use serde_json::{Value, json};

/// Single-argument payload.
///
/// # Panics
///
/// Panics if `value` cannot be represented as JSON.
#[must_use]
pub fn payload<T: Serialize>(value: T) -> EventArgs {
    vec![serde_json::to_value(value).expect("payload must serialize to JSON")]
}

/// Multi-argument payload.
#[must_use]
pub fn payloads<I>(values: I) -> EventArgs
where
    I: IntoIterator<Item = Value>,
{
    values.into_iter().collect()
}

/// Payload of a `quiz:answered` emission.
#[must_use]
pub fn quiz_answer(question: u32, choice: &str, correct: bool) -> EventArgs {
    vec![json!({
        "question": question,
        "choice": choice,
        "correct": correct,
    })]
}

/// Payload of an `auth:login` emission.
#[must_use]
pub fn login(user: &str) -> EventArgs {
    vec![json!({ "user": user, "remember": false })]
}
