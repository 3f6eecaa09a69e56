//! The host object-model contract.
//!
//! The engine is polymorphic over [`ObjectModel`]: everything it learns
//! about a value (its type, kind, views, attributes, equality) comes through
//! this trait. Calls that may have observable side effects take `&mut self`;
//! the engine guarantees how often and in which order it makes them.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{ExprRef, GuardRef, KindFlags, Literal, Name, TypeId};

/// An error raised by a host capability (an exception, in dynamic-language
/// terms). Always propagated to the caller of the match statement.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        HostError {
            message: message.into(),
        }
    }
}

/// Hash identity of a mapping key.
///
/// Numeric keys are normalized so that equal numbers share one key:
/// `true`, `1` and `1.0` all map to `Int(1)`. Hosts should build keys through
/// [`MapKey::from_bool`] and [`MapKey::from_float`] to stay consistent with
/// literal pattern keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MapKey {
    None,
    Int(i64),
    /// Non-integral float, as bits.
    Float(u64),
    Str(Name),
    /// Host-defined hashable value (identity hash, tuples, ...).
    Opaque(u64),
}

impl MapKey {
    #[inline]
    pub fn from_bool(b: bool) -> Self {
        MapKey::Int(i64::from(b))
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "integral floats inside the i64 range convert exactly"
    )]
    pub fn from_float(f: f64) -> Self {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            MapKey::Int(f as i64)
        } else {
            MapKey::Float(f.to_bits())
        }
    }
}

/// A realized mapping: entries in host order plus a key index.
#[derive(Clone, Debug)]
pub struct MappingView<V> {
    entries: Vec<(V, V)>,
    index: FxHashMap<MapKey, usize>,
}

impl<V: Clone> MappingView<V> {
    /// Index `entries` by the hash identity `key_of` assigns.
    ///
    /// Entries whose key has no hash identity stay in the view (they count
    /// towards `len` and show up in rest captures) but cannot be looked up.
    pub fn new(entries: Vec<(V, V)>, key_of: impl Fn(&V) -> Option<MapKey>) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(entries.len());
        for (i, (key, _)) in entries.iter().enumerate() {
            if let Some(k) = key_of(key) {
                index.insert(k, i);
            }
        }
        MappingView { entries, index }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains_key(&self, key: &MapKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &MapKey) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn entries(&self) -> &[(V, V)] {
        &self.entries
    }

    /// Entries whose key is not in `taken`, in host order.
    pub fn remaining(&self, taken: &[MapKey]) -> Vec<(V, V)> {
        let taken_slots: Vec<usize> = taken
            .iter()
            .filter_map(|k| self.index.get(k).copied())
            .collect();
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !taken_slots.contains(i))
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

/// Name → value bindings produced by a successful match, in binding order.
#[derive(Clone, Debug, PartialEq)]
pub struct Bindings<V> {
    slots: Vec<(Name, V)>,
}

impl<V> Bindings<V> {
    pub fn new() -> Self {
        Bindings { slots: Vec::new() }
    }

    pub fn bind(&mut self, name: Name, value: V) {
        self.slots.push((name, value));
    }

    /// The most recent value bound to `name`.
    pub fn get(&self, name: Name) -> Option<&V> {
        self.slots
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Name, &V)> {
        self.slots.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Position to roll back to with [`Bindings::truncate`].
    pub fn mark(&self) -> usize {
        self.slots.len()
    }

    /// Drop every binding made after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.slots.truncate(mark);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn into_vec(self) -> Vec<(Name, V)> {
        self.slots
    }
}

impl<V> Default for Bindings<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FromIterator<(Name, V)> for Bindings<V> {
    fn from_iter<I: IntoIterator<Item = (Name, V)>>(iter: I) -> Self {
        Bindings {
            slots: iter.into_iter().collect(),
        }
    }
}

/// What the engine needs from the host language's object model.
///
/// # Call discipline
///
/// Within one match statement evaluation the engine calls
/// `sequence_view`, `mapping_entries`, `deconstruct` and `match_args` at most
/// once per value, and `get_attribute` at most once per (value, name).
/// `is_instance`, `equals`, `eval_value` and `eval_guard` are called every
/// time the pattern structure reaches them, in source order.
pub trait ObjectModel {
    type Value: Clone + fmt::Debug;

    /// Runtime type of a value.
    fn type_of(&self, value: &Self::Value) -> TypeId;

    /// Raw kind declaration of a type; `None` for a type that declares
    /// nothing. Must not change over the type's lifetime.
    fn declared_kind(&self, ty: TypeId) -> Option<KindFlags>;

    /// Subtype check of `value` against the class named by a class pattern.
    fn is_instance(&mut self, value: &Self::Value, cls: TypeId) -> Result<bool, HostError>;

    /// The type's declared attribute names for positional sub-patterns.
    fn match_args(&mut self, ty: TypeId) -> Result<Vec<Name>, HostError>;

    /// Attribute fetch. `Ok(None)` means "not found".
    fn get_attribute(
        &mut self,
        value: &Self::Value,
        name: Name,
    ) -> Result<Option<Self::Value>, HostError>;

    /// Ordered components of a POSITIONAL-kind value.
    fn deconstruct(&mut self, value: &Self::Value) -> Result<Vec<Self::Value>, HostError>;

    /// Realize a SEQUENCE-kind value as its elements.
    fn sequence_view(&mut self, value: &Self::Value) -> Result<Vec<Self::Value>, HostError>;

    /// Realize a MAPPING-kind value as its (key, value) entries.
    fn mapping_entries(
        &mut self,
        value: &Self::Value,
    ) -> Result<Vec<(Self::Value, Self::Value)>, HostError>;

    /// Hash identity of a value used as a mapping key; `None` if unhashable.
    fn map_key(&self, value: &Self::Value) -> Option<MapKey>;

    /// Host value of a literal constant.
    fn literal(&self, literal: Literal) -> Self::Value;

    /// Identity comparison (used for singleton literals).
    fn identical(&self, a: &Self::Value, b: &Self::Value) -> bool;

    /// Equality comparison (used for other literals and value references).
    fn equals(&mut self, a: &Self::Value, b: &Self::Value) -> Result<bool, HostError>;

    /// Current value of a value expression.
    fn eval_value(&mut self, expr: ExprRef) -> Result<Self::Value, HostError>;

    /// Evaluate a guard with the clause's tentative bindings in scope.
    fn eval_guard(
        &mut self,
        guard: GuardRef,
        bindings: &Bindings<Self::Value>,
    ) -> Result<bool, HostError>;

    /// Fresh sequence for a star capture.
    fn new_sequence(&mut self, items: Vec<Self::Value>) -> Self::Value;

    /// Fresh mapping for a rest capture.
    fn new_mapping(&mut self, entries: Vec<(Self::Value, Self::Value)>) -> Self::Value;
}
