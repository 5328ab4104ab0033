//! Ordering engine: cache lookup, draw plan, collision check, stable sort.
//!
//! The engine is split in two pure halves around the only I/O it needs (the
//! random draw), so it can be exercised without network or filesystem:
//!
//! 1. [`plan`] partitions the run's identifiers into cache hits and misses.
//! 2. The caller draws `plan.draw_count()` values from a provider.
//! 3. [`finalize`] zips the draws onto the misses, rejects collisions and
//!    sorts the questions ascending by value.

use std::collections::BTreeMap;

use tracing::{debug, error};

use crate::bits::{self, BITS, MAX_QUESTIONS};
use crate::cache::{Assignments, Lookup, RandomCache};
use crate::errors::{CollisionError, OrderError, OrderResult};
use crate::question::{Question, QuestionId};

/// What has to be drawn for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawPlan {
    /// Values reused from the cache.
    pub hits: Assignments,
    /// Identifiers that need a fresh value, in first-appearance order.
    pub misses: Vec<QuestionId>,
}

impl DrawPlan {
    /// Number of values the provider must return.
    pub fn draw_count(&self) -> usize {
        self.misses.len()
    }
}

impl From<Lookup> for DrawPlan {
    fn from(l: Lookup) -> Self {
        Self {
            hits: l.hits,
            misses: l.misses,
        }
    }
}

/// A question with its final sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedQuestion {
    pub question: Question,
    pub value: u64,
}

/// Final output of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedQuestions {
    /// Questions sorted ascending by value; identical texts keep input order.
    pub ranked: Vec<RankedQuestion>,
    /// Every identifier of this run mapped to its value.
    pub assignment: Assignments,
    /// Newly drawn entries, to be merged into the cache.
    pub fresh: Assignments,
}

impl OrderedQuestions {
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}

/// Builds the draw plan for `questions` against `cache`.
pub fn plan(questions: &[Question], cache: &RandomCache) -> OrderResult<DrawPlan> {
    if questions.len() >= MAX_QUESTIONS {
        return Err(OrderError::TooManyQuestions {
            count: questions.len(),
            max: MAX_QUESTIONS - 1,
        });
    }

    let plan = DrawPlan::from(cache.lookup(questions.iter().map(|q| &q.id)));
    debug!(
        questions = questions.len(),
        hits = plan.hits.len(),
        misses = plan.misses.len(),
        "draw plan ready"
    );
    Ok(plan)
}

/// Combines cached and freshly drawn values and sorts the questions.
///
/// `drawn[i]` is assigned to `plan.misses[i]`. Fails without producing an
/// order when the draw count is wrong, a value exceeds [`BITS`], or two
/// distinct identifiers share a value.
pub fn finalize(
    questions: &[Question],
    plan: DrawPlan,
    drawn: Vec<u64>,
) -> OrderResult<OrderedQuestions> {
    if drawn.len() != plan.misses.len() {
        return Err(OrderError::DrawCountMismatch {
            expected: plan.misses.len(),
            actual: drawn.len(),
        });
    }
    if let Some(&value) = drawn.iter().find(|v| !bits::fits(**v, BITS)) {
        return Err(OrderError::ValueOutOfRange { value, bits: BITS });
    }

    let fresh: Assignments = plan.misses.into_iter().zip(drawn).collect();
    let mut assignment = plan.hits;
    assignment.extend(fresh.iter().map(|(k, v)| (k.clone(), *v)));

    check_collisions(&assignment)?;

    let mut ranked = Vec::with_capacity(questions.len());
    for q in questions {
        let Some(&value) = assignment.get(&q.id) else {
            return Err(OrderError::Unplanned(q.id.clone()));
        };
        ranked.push(RankedQuestion {
            question: q.clone(),
            value,
        });
    }
    ranked.sort_by_key(|r| r.value);

    debug!(
        ranked = ranked.len(),
        fresh = fresh.len(),
        "questions ordered"
    );
    Ok(OrderedQuestions {
        ranked,
        assignment,
        fresh,
    })
}

/// Fails if two distinct identifiers map to the same value.
pub fn check_collisions(assignment: &Assignments) -> Result<(), CollisionError> {
    let mut by_value: BTreeMap<u64, Vec<QuestionId>> = BTreeMap::new();
    for (id, value) in assignment {
        by_value.entry(*value).or_default().push(id.clone());
    }

    let collisions: Vec<(u64, Vec<QuestionId>)> = by_value
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .collect();
    if collisions.is_empty() {
        return Ok(());
    }

    error!(count = collisions.len(), "random value collision detected");
    Err(CollisionError { collisions })
}
