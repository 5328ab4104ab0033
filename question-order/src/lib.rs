//! Core of the quantum AMA ordering pipeline.
//!
//! 1) **Identify**: every [`Question`] carries a [`QuestionId`], the SHA-1
//!    of its text. Identical texts share an id (and a value) on purpose.
//!
//! 2) **Lookup**: [`RandomCache`] holds previously drawn values per bit width
//!    and partitions the run's ids into hits and misses.
//!
//! 3) **Draw**: the caller asks a random provider for exactly
//!    `plan.draw_count()` values of [`BITS`] bits (done outside this crate).
//!
//! 4) **Finalize**: [`ordering::finalize`] assigns the draws, rejects any
//!    collision between distinct ids, and stable-sorts ascending by value.
//!
//! 5) **Persist**: the fresh entries go back into the cache with
//!    [`RandomCache::merge_and_save`] (whole-file atomic rewrite).
//!
//! Nothing here touches the network; only the cache module touches disk.

pub mod bits;
pub mod cache;
pub mod errors;
pub mod ordering;
pub mod question;

pub use bits::{BITS, MAX_QUESTIONS};
pub use cache::{Assignments, Lookup, RandomCache};
pub use errors::{CacheError, CollisionError, OrderError, OrderResult};
pub use ordering::{DrawPlan, OrderedQuestions, RankedQuestion, finalize, plan};
pub use question::{Question, QuestionId, UNKNOWN_AUTHOR};
