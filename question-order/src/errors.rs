//! Crate-wide error hierarchy for question-order.
//!
//! Goals:
//! - `OrderError` for everything the ordering engine can reject.
//! - `CacheError` only for the final cache write (reads never fail).
//! - Ergonomic `?` via `From` impls.

use thiserror::Error;

use crate::question::QuestionId;

/// Convenient alias for ordering results.
pub type OrderResult<T> = Result<T, OrderError>;

/// Errors produced while assigning sort keys to questions.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Two distinct questions received the same random value.
    #[error(transparent)]
    Collision(#[from] CollisionError),

    /// The run holds more questions than the bit width was sized for.
    #[error("too many questions ({count}), maximum is {max}")]
    TooManyQuestions { count: usize, max: usize },

    /// The provider returned a different number of values than requested.
    #[error("expected {expected} random values, got {actual}")]
    DrawCountMismatch { expected: usize, actual: usize },

    /// A question was not part of the plan it is finalized with.
    #[error("question {0} has no planned value")]
    Unplanned(QuestionId),

    /// A drawn value does not fit in the configured bit width.
    #[error("random value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: u64, bits: u32 },
}

/// Random value collision among distinct question identifiers.
///
/// Each entry is a value and every identifier that received it (always two
/// or more). Values are listed in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("random value collision detected: {}", describe(.collisions))]
pub struct CollisionError {
    pub collisions: Vec<(u64, Vec<QuestionId>)>,
}

fn describe(collisions: &[(u64, Vec<QuestionId>)]) -> String {
    collisions
        .iter()
        .map(|(value, ids)| {
            let ids: Vec<&str> = ids.iter().map(QuestionId::as_str).collect();
            format!("{value} <- [{}]", ids.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Cache write failures. Loading never produces these.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serde error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("cache persist error: {0}")]
    Persist(#[from] tempfile::PersistError),
}
