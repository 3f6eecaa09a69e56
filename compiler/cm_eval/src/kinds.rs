//! Kind resolver: type → validated match kind, memoized.
//!
//! This cache is the only state shared between concurrent evaluations.
//! A type's declaration never changes, so racing writers compute the same
//! entry and the second insert is harmless.

use cm_ir::{MatchKind, ObjectModel, TypeId};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// A resolved kind plus whether the declaration obeyed the exclusivity rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResolvedKind {
    pub kind: MatchKind,
    /// `false` for a declaration that breaks an exclusivity rule. Such types
    /// get a lenient decoding and no equivalence guarantees.
    pub conforming: bool,
}

#[derive(Default)]
pub struct KindResolver {
    cache: RwLock<FxHashMap<TypeId, ResolvedKind>>,
}

impl KindResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<H: ObjectModel + ?Sized>(&self, host: &H, ty: TypeId) -> ResolvedKind {
        if let Some(resolved) = self.cache.read().get(&ty) {
            return *resolved;
        }
        let resolved = match host.declared_kind(ty) {
            None => ResolvedKind {
                kind: MatchKind::UNDECLARED,
                conforming: true,
            },
            Some(flags) => match MatchKind::from_flags(flags) {
                Ok(kind) => ResolvedKind {
                    kind,
                    conforming: true,
                },
                Err(conflict) => {
                    tracing::warn!(?ty, ?flags, %conflict, "nonconforming match kind");
                    ResolvedKind {
                        kind: MatchKind::lenient(flags),
                        conforming: false,
                    }
                }
            },
        };
        self.cache.write().insert(ty, resolved);
        resolved
    }

    /// Kind of a value's runtime type.
    #[inline]
    pub fn kind_of<H: ObjectModel + ?Sized>(&self, host: &H, value: &H::Value) -> MatchKind {
        self.resolve(host, host.type_of(value)).kind
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}
