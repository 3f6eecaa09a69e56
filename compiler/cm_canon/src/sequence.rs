//! Length dispatch for sequence lanes.

use cm_ir::{Candidates, LengthDispatch, Pattern};

/// What a top-level sequence pattern requires of the view's length.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LengthConstraint {
    Exact(usize),
    /// Star patterns: at least the number of non-star items.
    AtLeast(usize),
}

impl LengthConstraint {
    /// Constraint of a sequence pattern; `None` for anything else or for a
    /// star index outside the item list.
    pub fn of(pattern: &Pattern) -> Option<Self> {
        match pattern {
            Pattern::Sequence { items, star: None } => Some(LengthConstraint::Exact(items.len())),
            Pattern::Sequence {
                items,
                star: Some(star),
            } if *star < items.len() => Some(LengthConstraint::AtLeast(items.len() - 1)),
            _ => None,
        }
    }

    #[inline]
    pub fn admits(self, len: usize) -> bool {
        match self {
            LengthConstraint::Exact(n) => len == n,
            LengthConstraint::AtLeast(n) => len >= n,
        }
    }
}

/// Build the length table for a lane.
///
/// `clauses` pairs each clause index with its constraint, in source order.
/// Every candidate list keeps that order.
pub fn build_length_dispatch(clauses: &[(usize, LengthConstraint)]) -> LengthDispatch {
    let mut exact_lengths: Vec<usize> = clauses
        .iter()
        .filter_map(|(_, c)| match c {
            LengthConstraint::Exact(n) => Some(*n),
            LengthConstraint::AtLeast(_) => None,
        })
        .collect();
    exact_lengths.sort_unstable();
    exact_lengths.dedup();

    let mut thresholds: Vec<usize> = clauses
        .iter()
        .filter_map(|(_, c)| match c {
            LengthConstraint::AtLeast(n) => Some(*n),
            LengthConstraint::Exact(_) => None,
        })
        .collect();
    thresholds.push(0);
    thresholds.sort_unstable();
    thresholds.dedup();

    let admitted = |len: usize| -> Candidates {
        clauses
            .iter()
            .filter(|(_, c)| c.admits(len))
            .map(|(clause, _)| *clause)
            .collect()
    };

    // Between two thresholds no exact clause is admitted (exact lengths
    // have their own entries), so the star clauses admitted at the
    // threshold are the ones admitted for the whole range.
    let star_only = |len: usize| -> Candidates {
        clauses
            .iter()
            .filter(|(_, c)| matches!(c, LengthConstraint::AtLeast(n) if *n <= len))
            .map(|(clause, _)| *clause)
            .collect()
    };

    LengthDispatch {
        exact: exact_lengths
            .into_iter()
            .map(|len| (len, admitted(len)))
            .collect(),
        at_least: thresholds
            .into_iter()
            .map(|lo| (lo, star_only(lo)))
            .collect(),
    }
}
