//! Plan walker.
//!
//! A lane is entered only if the subject has the lane's shape; otherwise
//! none of its clauses could match and they are skipped without a host
//! call. On entry the subject's view is realized through the shared scratch
//! (the same memo slot the matcher uses), and only the clauses the length
//! dispatch or key tree leave standing are run through the full matcher.

use cm_ir::{
    KeyTest, KeyTree, MappingLane, MatchPlan, MatchStatement, ObjectModel, PlanStep, SequenceLane,
};

use super::{try_clause, MatchOutcome};
use crate::errors::MatchError;
use crate::matcher::Matcher;

pub fn run_lanes<H: ObjectModel + ?Sized>(
    matcher: &mut Matcher<'_, H>,
    statement: &MatchStatement,
    plan: &MatchPlan,
    subject: &H::Value,
) -> Result<MatchOutcome<H::Value>, MatchError> {
    for step in &plan.steps {
        let found = match step {
            PlanStep::Clause(index) => try_clause(matcher, statement, *index, subject)?,
            PlanStep::Sequence(lane) => sequence_lane(matcher, statement, lane, subject)?,
            PlanStep::Mapping(lane) => mapping_lane(matcher, statement, lane, subject)?,
        };
        if let Some(outcome) = found {
            return Ok(outcome);
        }
    }
    Ok(MatchOutcome::NoMatch)
}

fn sequence_lane<H: ObjectModel + ?Sized>(
    matcher: &mut Matcher<'_, H>,
    statement: &MatchStatement,
    lane: &SequenceLane,
    subject: &H::Value,
) -> Result<Option<MatchOutcome<H::Value>>, MatchError> {
    if !matcher.kind_of(subject).is_sequence() {
        tracing::trace!(clauses = ?lane.clauses, "sequence lane skipped");
        return Ok(None);
    }
    let len = matcher.subject_sequence(subject)?.len();
    let candidates = lane.dispatch.candidates(len);
    tracing::trace!(len, ?candidates, "sequence lane");
    for &index in candidates {
        if let Some(outcome) = try_clause(matcher, statement, index, subject)? {
            return Ok(Some(outcome));
        }
    }
    Ok(None)
}

fn mapping_lane<H: ObjectModel + ?Sized>(
    matcher: &mut Matcher<'_, H>,
    statement: &MatchStatement,
    lane: &MappingLane,
    subject: &H::Value,
) -> Result<Option<MatchOutcome<H::Value>>, MatchError> {
    if !matcher.kind_of(subject).is_mapping() {
        tracing::trace!(clauses = ?lane.clauses, "mapping lane skipped");
        return Ok(None);
    }
    let view = matcher.subject_mapping(subject)?;
    let mut node = &lane.tree;
    loop {
        match node {
            KeyTree::Test { test, pass, fail } => {
                let holds = match test {
                    KeyTest::HasKey(key) => view.contains_key(key),
                    KeyTest::LenEq(n) => view.len() == *n,
                };
                node = if holds { pass } else { fail };
            }
            KeyTree::Candidate { clause, next } => {
                if let Some(outcome) = try_clause(matcher, statement, *clause, subject)? {
                    return Ok(Some(outcome));
                }
                node = next;
            }
            KeyTree::Exhausted => return Ok(None),
        }
    }
}
