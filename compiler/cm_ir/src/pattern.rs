//! Pattern trees and match statements.
//!
//! These are the immutable trees the (external) parser produces. The engine
//! traverses them read-only: the naive matcher interprets them directly, and
//! the lane compiler in `cm_canon` reads them to build a `MatchPlan`.

use smallvec::SmallVec;

use crate::host::MapKey;
use crate::{BodyRef, ExprRef, GuardRef, Name, TypeId};

/// A literal pattern constant.
///
/// Floats are stored as `u64` bits so literals can be hashed and compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    /// The absence singleton.
    None,
    /// The `true`/`false` singletons.
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(Name),
}

impl Literal {
    pub fn float(value: f64) -> Self {
        Literal::Float(value.to_bits())
    }

    /// Singletons are compared by identity, everything else by equality.
    #[inline]
    pub fn is_singleton(self) -> bool {
        matches!(self, Literal::None | Literal::Bool(_))
    }

    /// Hash key this literal occupies when used as a mapping key.
    pub fn map_key(self) -> MapKey {
        match self {
            Literal::None => MapKey::None,
            Literal::Bool(b) => MapKey::from_bool(b),
            Literal::Int(n) => MapKey::Int(n),
            Literal::Float(bits) => MapKey::from_float(f64::from_bits(bits)),
            Literal::Str(name) => MapKey::Str(name),
        }
    }
}

/// Key of a mapping pattern entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MappingKey {
    Literal(Literal),
    /// Computed by the host each time the entry is checked.
    Value(ExprRef),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MappingEntry {
    pub key: MappingKey,
    pub pattern: Pattern,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeywordPattern {
    pub name: Name,
    pub pattern: Pattern,
}

/// A pattern node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pattern {
    /// `_`: matches anything, binds nothing.
    Wildcard,
    /// `name`: matches anything, binds the value.
    Capture(Name),
    Literal(Literal),
    /// Dotted-name value pattern; compared by equality with the current
    /// value of the expression.
    ValueRef(ExprRef),
    /// `[p0, p1, *star, pn]`. When `star` is set, `items[star]` matches the
    /// middle slice (a fresh host sequence) instead of a single element.
    Sequence {
        items: Vec<Pattern>,
        star: Option<usize>,
    },
    /// `{k0: p0, k1: p1, **rest}`.
    Mapping {
        entries: Vec<MappingEntry>,
        rest: Option<Name>,
    },
    /// `Cls(p0, p1, kw=p2)`.
    Class {
        cls: TypeId,
        positional: Vec<Pattern>,
        keywords: Vec<KeywordPattern>,
    },
    /// `p as name`.
    As { pattern: Box<Pattern>, name: Name },
    /// `p0 | p1 | ...`: first matching alternative wins.
    Or(Vec<Pattern>),
}

impl Pattern {
    pub fn seq(items: Vec<Pattern>) -> Self {
        Pattern::Sequence { items, star: None }
    }

    pub fn seq_with_star(items: Vec<Pattern>, star: usize) -> Self {
        Pattern::Sequence {
            items,
            star: Some(star),
        }
    }

    pub fn mapping(entries: Vec<(Literal, Pattern)>, rest: Option<Name>) -> Self {
        Pattern::Mapping {
            entries: entries
                .into_iter()
                .map(|(key, pattern)| MappingEntry {
                    key: MappingKey::Literal(key),
                    pattern,
                })
                .collect(),
            rest,
        }
    }

    pub fn class(cls: TypeId, positional: Vec<Pattern>, keywords: Vec<(Name, Pattern)>) -> Self {
        Pattern::Class {
            cls,
            positional,
            keywords: keywords
                .into_iter()
                .map(|(name, pattern)| KeywordPattern { name, pattern })
                .collect(),
        }
    }

    pub fn as_name(self, name: Name) -> Self {
        Pattern::As {
            pattern: Box::new(self),
            name,
        }
    }

    /// Matches every value without consulting the host.
    pub fn is_irrefutable(&self) -> bool {
        match self {
            Pattern::Wildcard | Pattern::Capture(_) => true,
            Pattern::As { pattern, .. } => pattern.is_irrefutable(),
            Pattern::Or(alts) => alts.iter().any(Pattern::is_irrefutable),
            _ => false,
        }
    }

    /// Names this pattern binds on success, in binding order.
    ///
    /// For `Or` patterns, the names of the first alternative.
    pub fn bound_names(&self) -> SmallVec<[Name; 4]> {
        let mut names = SmallVec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, out: &mut SmallVec<[Name; 4]>) {
        match self {
            Pattern::Wildcard | Pattern::Literal(_) | Pattern::ValueRef(_) => {}
            Pattern::Capture(name) => out.push(*name),
            Pattern::Sequence { items, .. } => {
                for item in items {
                    item.collect_names(out);
                }
            }
            Pattern::Mapping { entries, rest } => {
                for entry in entries {
                    entry.pattern.collect_names(out);
                }
                out.extend(rest.iter().copied());
            }
            Pattern::Class {
                positional,
                keywords,
                ..
            } => {
                for p in positional {
                    p.collect_names(out);
                }
                for kw in keywords {
                    kw.pattern.collect_names(out);
                }
            }
            Pattern::As { pattern, name } => {
                pattern.collect_names(out);
                out.push(*name);
            }
            Pattern::Or(alts) => {
                if let Some(first) = alts.first() {
                    first.collect_names(out);
                }
            }
        }
    }
}

/// One `case` of a match statement.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaseClause {
    pub pattern: Pattern,
    pub guard: Option<GuardRef>,
    pub body: BodyRef,
}

impl CaseClause {
    pub fn new(pattern: Pattern, body: BodyRef) -> Self {
        CaseClause {
            pattern,
            guard: None,
            body,
        }
    }

    #[must_use]
    pub fn with_guard(mut self, guard: GuardRef) -> Self {
        self.guard = Some(guard);
        self
    }
}

/// A subject expression plus its clauses, in source order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchStatement {
    pub subject: ExprRef,
    pub clauses: Vec<CaseClause>,
}

impl MatchStatement {
    pub fn new(subject: ExprRef, clauses: Vec<CaseClause>) -> Self {
        MatchStatement { subject, clauses }
    }
}

#[cfg(test)]
mod tests;
