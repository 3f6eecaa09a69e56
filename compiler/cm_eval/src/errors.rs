//! Hard errors of a match statement.
//!
//! A clause that simply does not match is not an error: it is the
//! fail-clause signal, and evaluation moves on to the next clause. A
//! `MatchError` aborts the whole statement and reaches the caller. Most
//! variants mean the pattern and the class's declared matching protocol
//! disagree; `Host` wraps anything a host capability or guard raised.

use cm_ir::{ExprRef, HostError, Name, StringLookup, TypeId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// A keyword sub-pattern names no entry of the class's `match_args`.
    #[error("keyword {name:?} is not among the declared attributes of {class:?}")]
    UnknownKeyword { name: Name, class: TypeId },

    /// A keyword resolved to a slot already bound positionally.
    #[error("keyword {name:?} resolves to slot {index}, already consumed by {consumed} positional sub-patterns")]
    KeywordRebindsPositional {
        name: Name,
        index: usize,
        consumed: usize,
    },

    /// A keyword resolved past the end of the deconstructed components.
    #[error("keyword {name:?} resolves to component {index}, but deconstruction produced {len}")]
    ComponentOutOfRange { name: Name, index: usize, len: usize },

    /// More positional sub-patterns than `match_args` entries.
    #[error("{class:?} accepts {declared} positional sub-patterns ({given} given)")]
    TooManyPositional {
        class: TypeId,
        declared: usize,
        given: usize,
    },

    /// The same attribute is matched twice in one class pattern.
    #[error("attribute {name:?} is matched by more than one sub-pattern")]
    KeywordCollision { name: Name },

    /// A computed mapping key has no hash identity.
    #[error("mapping key computed by {expr:?} is unhashable")]
    UnhashableKey { expr: ExprRef },

    #[error("pattern nesting exceeds the depth limit of {limit}")]
    DepthLimit { limit: usize },

    #[error(transparent)]
    Host(#[from] HostError),
}

impl MatchError {
    /// Render the error with names resolved through `names`.
    pub fn describe(&self, names: &dyn StringLookup) -> String {
        match self {
            MatchError::UnknownKeyword { name, class } => format!(
                "keyword `{}` is not among the declared attributes of {class:?}",
                names.lookup(*name)
            ),
            MatchError::KeywordRebindsPositional {
                name,
                index,
                consumed,
            } => format!(
                "keyword `{}` resolves to slot {index}, already consumed by {consumed} positional sub-patterns",
                names.lookup(*name)
            ),
            MatchError::ComponentOutOfRange { name, index, len } => format!(
                "keyword `{}` resolves to component {index}, but deconstruction produced {len}",
                names.lookup(*name)
            ),
            MatchError::KeywordCollision { name } => format!(
                "attribute `{}` is matched by more than one sub-pattern",
                names.lookup(*name)
            ),
            MatchError::TooManyPositional { .. }
            | MatchError::UnhashableKey { .. }
            | MatchError::DepthLimit { .. }
            | MatchError::Host(_) => self.to_string(),
        }
    }

    /// Whether the error came from the host rather than from a pattern/class
    /// protocol mismatch.
    pub fn is_host_error(&self) -> bool {
        matches!(self, MatchError::Host(_))
    }
}
