//! Structural validation of match statements.
//!
//! The parser should never hand over these shapes, but the engine does not
//! trust it to: problems are reported here, and the lane compiler keeps any
//! clause with a structural problem out of its lanes. The general matcher
//! still gives such clauses a well-defined (if useless) meaning.

use cm_ir::{MapKey, MappingKey, MatchStatement, Name, Pattern};
use rustc_hash::FxHashSet;

/// A problem found in one clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternProblem {
    pub clause: usize,
    pub kind: ProblemKind,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProblemKind {
    #[error("mapping pattern repeats key {0:?}")]
    DuplicateKey(MapKey),
    #[error("star index {star} is outside a sequence pattern of {len} items")]
    StarOutOfRange { star: usize, len: usize },
    #[error("star sub-pattern at {star} is neither a capture nor a wildcard")]
    StarNotCapture { star: usize },
    #[error("name {0:?} is bound more than once")]
    DuplicateBinding(Name),
    #[error("alternatives of an or-pattern bind different names")]
    OrBindingMismatch,
    #[error("clause is unreachable after irrefutable clause {shadowed_by}")]
    Unreachable { shadowed_by: usize },
}

impl ProblemKind {
    /// Whether the problem is in the pattern's own shape (as opposed to its
    /// position in the statement).
    pub fn is_structural(&self) -> bool {
        !matches!(self, ProblemKind::Unreachable { .. })
    }
}

/// Report every problem in `stmt`, ordered by clause.
pub fn validate(stmt: &MatchStatement) -> Vec<PatternProblem> {
    let mut problems = Vec::new();
    let mut irrefutable = None;

    for (clause, case) in stmt.clauses.iter().enumerate() {
        let mut kinds = Vec::new();
        check_pattern(&case.pattern, &mut kinds);

        let names = case.pattern.bound_names();
        let mut seen = FxHashSet::default();
        for name in &names {
            if !seen.insert(*name) {
                kinds.push(ProblemKind::DuplicateBinding(*name));
            }
        }

        if let Some(shadowed_by) = irrefutable {
            kinds.push(ProblemKind::Unreachable { shadowed_by });
        } else if case.guard.is_none() && case.pattern.is_irrefutable() {
            irrefutable = Some(clause);
        }

        problems.extend(kinds.into_iter().map(|kind| PatternProblem { clause, kind }));
    }

    if !problems.is_empty() {
        tracing::debug!(count = problems.len(), "match statement has pattern problems");
    }
    problems
}

fn check_pattern(pattern: &Pattern, out: &mut Vec<ProblemKind>) {
    match pattern {
        Pattern::Wildcard | Pattern::Capture(_) | Pattern::Literal(_) | Pattern::ValueRef(_) => {}
        Pattern::Sequence { items, star } => {
            if let Some(star) = *star {
                match items.get(star) {
                    None => out.push(ProblemKind::StarOutOfRange {
                        star,
                        len: items.len(),
                    }),
                    Some(Pattern::Wildcard | Pattern::Capture(_)) => {}
                    Some(_) => out.push(ProblemKind::StarNotCapture { star }),
                }
            }
            for item in items {
                check_pattern(item, out);
            }
        }
        Pattern::Mapping { entries, .. } => {
            let mut keys = FxHashSet::default();
            for entry in entries {
                if let MappingKey::Literal(lit) = entry.key {
                    let key = lit.map_key();
                    if !keys.insert(key) {
                        out.push(ProblemKind::DuplicateKey(key));
                    }
                }
                check_pattern(&entry.pattern, out);
            }
        }
        Pattern::Class {
            positional,
            keywords,
            ..
        } => {
            for p in positional {
                check_pattern(p, out);
            }
            for kw in keywords {
                check_pattern(&kw.pattern, out);
            }
        }
        Pattern::As { pattern, .. } => check_pattern(pattern, out),
        Pattern::Or(alts) => {
            let mut expected: Option<FxHashSet<Name>> = None;
            let mut mismatch = false;
            for alt in alts {
                check_pattern(alt, out);
                let names: FxHashSet<Name> = alt.bound_names().into_iter().collect();
                match &expected {
                    None => expected = Some(names),
                    Some(first) => mismatch |= *first != names,
                }
            }
            if mismatch {
                out.push(ProblemKind::OrBindingMismatch);
            }
        }
    }
}
