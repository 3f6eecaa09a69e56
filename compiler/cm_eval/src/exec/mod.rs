//! Statement executors.
//!
//! Both executors drive the same [`Matcher`] over the same scratch state;
//! they differ only in which clauses they offer it, and in which order.
//!
//! - `naive`: every clause, left to right. This is the reference semantics.
//! - `lanes`: the compiled [`MatchPlan`], which skips clauses a realized view
//!   already rules out.
//!
//! [`MatchPlan`]: cm_ir::MatchPlan

mod lanes;
mod naive;

pub use lanes::run_lanes;
pub use naive::run_naive;

use cm_ir::{Bindings, BodyRef, MatchStatement, Name, ObjectModel};

use crate::errors::MatchError;
use crate::matcher::Matcher;

/// Result of a whole match statement.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchOutcome<V> {
    /// The first clause whose pattern and guard both succeeded.
    Matched {
        clause: usize,
        body: BodyRef,
        bindings: Bindings<V>,
    },
    NoMatch,
}

impl<V> MatchOutcome<V> {
    pub fn clause(&self) -> Option<usize> {
        match self {
            MatchOutcome::Matched { clause, .. } => Some(*clause),
            MatchOutcome::NoMatch => None,
        }
    }

    pub fn body(&self) -> Option<BodyRef> {
        match self {
            MatchOutcome::Matched { body, .. } => Some(*body),
            MatchOutcome::NoMatch => None,
        }
    }

    /// Value bound to `name` by the winning clause.
    pub fn binding(&self, name: Name) -> Option<&V> {
        match self {
            MatchOutcome::Matched { bindings, .. } => bindings.get(name),
            MatchOutcome::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched { .. })
    }
}

/// Try one clause: pattern, then guard. Bindings start empty for each
/// clause, and a failed clause leaves none behind.
fn try_clause<H: ObjectModel + ?Sized>(
    matcher: &mut Matcher<'_, H>,
    statement: &MatchStatement,
    index: usize,
    subject: &H::Value,
) -> Result<Option<MatchOutcome<H::Value>>, MatchError> {
    let Some(clause) = statement.clauses.get(index) else {
        return Ok(None);
    };
    matcher.reset_bindings();
    if !matcher.match_subject(&clause.pattern, subject)? {
        tracing::trace!(clause = index, "pattern failed");
        return Ok(None);
    }
    if !matcher.check_guard(clause.guard)? {
        tracing::trace!(clause = index, "guard rejected");
        matcher.reset_bindings();
        return Ok(None);
    }
    Ok(Some(MatchOutcome::Matched {
        clause: index,
        body: clause.body,
        bindings: matcher.take_bindings(),
    }))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
