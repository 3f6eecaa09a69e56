//! Match kinds.
//!
//! Every type carries a kind with two independent axes:
//!
//! - **Shape**: can the value match sequence or mapping patterns?
//! - **Class mode**: how does a class pattern with positional sub-patterns
//!   find the values to match them against?
//!
//! Hosts declare kinds as raw [`KindFlags`]. The flags are decoded into a
//! [`MatchKind`] at the registration boundary, where the four exclusivity
//! rules are checked. A declaration that breaks them is still decodable
//! through [`MatchKind::lenient`], but the engine makes no promises about
//! such types.

use bitflags::bitflags;

bitflags! {
    /// Raw kind declaration, as a host type announces it.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct KindFlags: u8 {
        // Shape axis.

        /// Matches sequence patterns.
        const SEQUENCE = 1 << 0;
        /// Matches mapping patterns.
        const MAPPING = 1 << 1;

        // Class-matching axis.

        /// Positional sub-patterns name attributes through `match_args`.
        const DEFAULT = 1 << 2;
        /// Positional sub-patterns match the items of `deconstruct()`.
        const POSITIONAL = 1 << 3;
        /// A single positional sub-pattern matches the value itself.
        const SELF = 1 << 4;
    }
}

/// Shape axis of a match kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shape {
    #[default]
    None,
    Sequence,
    Mapping,
}

/// Class-matching axis of a match kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClassMode {
    /// Declared no class mode: class patterns with sub-patterns never match.
    Opaque,
    /// Positional sub-patterns resolve through `match_args` to attributes.
    #[default]
    Default,
    /// Positional sub-patterns bind the deconstructed items.
    Positional,
    /// One positional sub-pattern binds the value itself.
    SelfValue,
}

/// A violated exclusivity rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum KindConflict {
    #[error("kind declares both SEQUENCE and MAPPING")]
    SequenceAndMapping,
    #[error("kind declares both DEFAULT and POSITIONAL")]
    DefaultAndPositional,
    #[error("kind declares both DEFAULT and SELF")]
    DefaultAndSelf,
    #[error("kind declares both POSITIONAL and SELF")]
    PositionalAndSelf,
}

/// Validated match kind.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MatchKind {
    pub shape: Shape,
    pub class_mode: ClassMode,
}

impl MatchKind {
    /// Kind of a type that declares nothing.
    pub const UNDECLARED: MatchKind = MatchKind {
        shape: Shape::None,
        class_mode: ClassMode::Default,
    };

    pub const fn new(shape: Shape, class_mode: ClassMode) -> Self {
        MatchKind { shape, class_mode }
    }

    /// Decode a declaration, rejecting any that breaks an exclusivity rule.
    ///
    /// Rules are checked in a fixed order, so the reported conflict is
    /// deterministic when several are broken at once.
    pub fn from_flags(flags: KindFlags) -> Result<Self, KindConflict> {
        let rules = [
            (
                KindFlags::SEQUENCE | KindFlags::MAPPING,
                KindConflict::SequenceAndMapping,
            ),
            (
                KindFlags::DEFAULT | KindFlags::POSITIONAL,
                KindConflict::DefaultAndPositional,
            ),
            (
                KindFlags::DEFAULT | KindFlags::SELF,
                KindConflict::DefaultAndSelf,
            ),
            (
                KindFlags::POSITIONAL | KindFlags::SELF,
                KindConflict::PositionalAndSelf,
            ),
        ];
        for (pair, conflict) in rules {
            if flags.contains(pair) {
                return Err(conflict);
            }
        }
        Ok(Self::lenient(flags))
    }

    /// Decode a declaration without checking exclusivity.
    ///
    /// Precedence when bits collide: SEQUENCE over MAPPING, then POSITIONAL
    /// over SELF over DEFAULT. The result for a conflicting declaration is
    /// the documented escape hatch: the engine runs, but which clause wins
    /// is unspecified.
    pub fn lenient(flags: KindFlags) -> Self {
        let shape = if flags.contains(KindFlags::SEQUENCE) {
            Shape::Sequence
        } else if flags.contains(KindFlags::MAPPING) {
            Shape::Mapping
        } else {
            Shape::None
        };
        let class_mode = if flags.contains(KindFlags::POSITIONAL) {
            ClassMode::Positional
        } else if flags.contains(KindFlags::SELF) {
            ClassMode::SelfValue
        } else if flags.contains(KindFlags::DEFAULT) {
            ClassMode::Default
        } else {
            ClassMode::Opaque
        };
        MatchKind { shape, class_mode }
    }

    /// Encode back into flags.
    pub fn to_flags(self) -> KindFlags {
        let shape = match self.shape {
            Shape::None => KindFlags::empty(),
            Shape::Sequence => KindFlags::SEQUENCE,
            Shape::Mapping => KindFlags::MAPPING,
        };
        let class = match self.class_mode {
            ClassMode::Opaque => KindFlags::empty(),
            ClassMode::Default => KindFlags::DEFAULT,
            ClassMode::Positional => KindFlags::POSITIONAL,
            ClassMode::SelfValue => KindFlags::SELF,
        };
        shape | class
    }

    #[inline]
    pub fn is_sequence(self) -> bool {
        self.shape == Shape::Sequence
    }

    #[inline]
    pub fn is_mapping(self) -> bool {
        self.shape == Shape::Mapping
    }
}

#[cfg(test)]
mod tests;
