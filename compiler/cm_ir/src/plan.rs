//! Compiled dispatch plans.
//!
//! A [`MatchPlan`] is an alternative evaluation order for a match statement,
//! produced by the lane compiler in `cm_canon` and walked by the lane
//! executor in `cm_eval`. The plan keeps clause order: its steps cover the
//! clauses left to right, and inside a lane the candidates for a given
//! subject are still tried in source order.
//!
//! # Lanes
//!
//! A lane is a run of adjacent clauses whose top-level patterns all need the
//! same shape. The executor resolves the subject's kind once, skips the whole
//! lane if the shape is wrong, realizes the view once, and then only tries
//! the clauses that can structurally match that view:
//!
//! - [`SequenceLane`]: dispatch on the sequence length.
//! - [`MappingLane`]: a decision tree over key presence and mapping size
//!   that never re-tests a fact it already knows.
//!
//! Both lanes only skip checks that are pure once the view exists, so the
//! count and order of host calls match naive left-to-right evaluation.

use smallvec::SmallVec;

use crate::host::MapKey;

/// Clause candidates for one dispatch outcome, in source order.
pub type Candidates = SmallVec<[usize; 4]>;

/// An evaluation plan for one match statement.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchPlan {
    pub steps: Vec<PlanStep>,
}

impl MatchPlan {
    /// Number of clauses the plan routes into lanes.
    pub fn laned_clauses(&self) -> usize {
        self.steps
            .iter()
            .map(|step| match step {
                PlanStep::Clause(_) => 0,
                PlanStep::Sequence(lane) => lane.clauses.len(),
                PlanStep::Mapping(lane) => lane.clauses.len(),
            })
            .sum()
    }
}

/// One step of a plan.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanStep {
    /// Try one clause with the general matcher.
    Clause(usize),
    Sequence(SequenceLane),
    Mapping(MappingLane),
}

/// Adjacent clauses whose top-level pattern is a sequence pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceLane {
    /// Every clause in the lane, in source order.
    pub clauses: Vec<usize>,
    pub dispatch: LengthDispatch,
}

/// Length → candidate clauses.
///
/// `exact` holds one entry per length some clause requires exactly; its
/// candidates are those clauses plus every star clause short enough. For any
/// other length, the candidates are the star clauses of the last `at_least`
/// entry whose threshold does not exceed it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LengthDispatch {
    /// Sorted by length.
    pub exact: Vec<(usize, Candidates)>,
    /// Sorted by threshold; the first threshold is always 0.
    pub at_least: Vec<(usize, Candidates)>,
}

impl LengthDispatch {
    /// Clauses that can match a sequence of length `len`.
    pub fn candidates(&self, len: usize) -> &[usize] {
        if let Ok(i) = self.exact.binary_search_by_key(&len, |(l, _)| *l) {
            return &self.exact[i].1;
        }
        let ranges = self.at_least.partition_point(|(lo, _)| *lo <= len);
        match ranges.checked_sub(1) {
            Some(i) => &self.at_least[i].1,
            None => &[],
        }
    }
}

/// Adjacent clauses whose top-level pattern is a mapping pattern with
/// literal keys.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MappingLane {
    pub clauses: Vec<usize>,
    pub tree: KeyTree,
}

/// A structural test on a realized mapping view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyTest {
    HasKey(MapKey),
    LenEq(usize),
}

/// Decision tree over [`KeyTest`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyTree {
    Test {
        test: KeyTest,
        pass: Box<KeyTree>,
        fail: Box<KeyTree>,
    },
    /// Every structural test of `clause` passed: match its entries and guard.
    /// If that fails, continue with `next`.
    Candidate { clause: usize, next: Box<KeyTree> },
    /// No clause in the lane can match.
    Exhausted,
}

impl KeyTree {
    /// Number of test nodes in the tree.
    pub fn test_count(&self) -> usize {
        match self {
            KeyTree::Test { pass, fail, .. } => 1 + pass.test_count() + fail.test_count(),
            KeyTree::Candidate { next, .. } => next.test_count(),
            KeyTree::Exhausted => 0,
        }
    }
}
