//! Lane compiler for casematch match statements.
//!
//! Turns a [`MatchStatement`] into a [`MatchPlan`]: an evaluation order
//! that groups adjacent sequence and mapping clauses into lanes, so the
//! executor can dispatch on a realized view instead of re-checking every
//! clause against it.
//!
//! # Pipeline Position
//!
//! ```text
//! Parse (external) → MatchStatement → **compile_plan** → cm_eval lane executor
//!                                   ↘ naive matcher (reference semantics)
//! ```
//!
//! # What Happens During Compilation
//!
//! 1. **Validation** (`validate`): structural malformations are reported,
//!    and clauses that have any stay out of lanes.
//! 2. **Grouping** (`lanes`): maximal runs of same-shape clauses become
//!    lane candidates.
//! 3. **Sequence dispatch** (`sequence`): length → candidate clauses.
//! 4. **Mapping dispatch** (`mapping`): decision tree over key presence
//!    and mapping size.
//!
//! Every step only removes checks that are pure once the view exists, so
//! plans are observably equivalent to naive left-to-right evaluation.
//!
//! [`MatchStatement`]: cm_ir::MatchStatement
//! [`MatchPlan`]: cm_ir::MatchPlan

mod lanes;
mod mapping;
mod sequence;
mod validate;

pub use lanes::{compile_plan, LaneConfig};
pub use mapping::{build_key_tree, key_tests, KeyTests};
pub use sequence::{build_length_dispatch, LengthConstraint};
pub use validate::{validate, PatternProblem, ProblemKind};
