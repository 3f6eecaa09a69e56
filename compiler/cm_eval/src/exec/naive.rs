use cm_ir::{MatchStatement, ObjectModel};

use super::{try_clause, MatchOutcome};
use crate::errors::MatchError;
use crate::matcher::Matcher;

/// Evaluate clauses strictly left to right; the first success wins.
pub fn run_naive<H: ObjectModel + ?Sized>(
    matcher: &mut Matcher<'_, H>,
    statement: &MatchStatement,
    subject: &H::Value,
) -> Result<MatchOutcome<H::Value>, MatchError> {
    for index in 0..statement.clauses.len() {
        if let Some(outcome) = try_clause(matcher, statement, index, subject)? {
            return Ok(outcome);
        }
    }
    Ok(MatchOutcome::NoMatch)
}
