//! The pattern matcher.
//!
//! Matches one pattern node against one value, recursing into sub-patterns
//! with the decomposed components. Success leaves the pattern's bindings in
//! the matcher's binding list; failure (`Ok(false)`) is the fail-clause
//! signal. `Err` is a hard error that aborts the whole statement.
//!
//! Everything the matcher learns about a value goes through the host or the
//! per-evaluation [`Scratch`], so view realizations and attribute fetches
//! happen at most once per value, however many clauses look at them.

use std::rc::Rc;

use cm_ir::{
    Bindings, ClassMode, GuardRef, KeywordPattern, MapKey, MappingEntry, MappingKey, MappingView,
    MatchKind, Name, ObjectModel, Pattern, TypeId,
};
use smallvec::SmallVec;

use crate::errors::MatchError;
use crate::guard;
use crate::kinds::KindResolver;
use crate::scratch::{child, AccessPath, PathStep, Scratch};
use crate::stack::ensure_sufficient_stack;

/// Why a keyword list could not be mapped onto declared attribute slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeywordError {
    /// The name is not declared at all.
    Unknown(Name),
    /// The name resolves to a slot below the minimum index.
    BelowMinimum { name: Name, index: usize },
    /// Two keywords resolve to the same slot.
    Duplicate(Name),
}

/// Map each keyword name to its first index in `attrs`.
///
/// Indices below `min_index` belong to slots already consumed positionally
/// and are rejected.
pub fn resolve_keywords(
    names: &[Name],
    attrs: &[Name],
    min_index: usize,
) -> Result<SmallVec<[usize; 4]>, KeywordError> {
    let mut slots = SmallVec::with_capacity(names.len());
    for &name in names {
        let index = attrs
            .iter()
            .position(|a| *a == name)
            .ok_or(KeywordError::Unknown(name))?;
        if index < min_index {
            return Err(KeywordError::BelowMinimum { name, index });
        }
        if slots.contains(&index) {
            return Err(KeywordError::Duplicate(name));
        }
        slots.push(index);
    }
    Ok(slots)
}

/// Matcher state for one match statement evaluation.
pub struct Matcher<'a, H: ObjectModel + ?Sized> {
    host: &'a mut H,
    kinds: &'a KindResolver,
    scratch: Scratch<H::Value>,
    bindings: Bindings<H::Value>,
    depth: usize,
    max_depth: Option<usize>,
}

impl<'a, H: ObjectModel + ?Sized> Matcher<'a, H> {
    /// `max_depth` of `Some(0)` is unlimited; a zero cap would fail the
    /// top level, which the lane walker may never enter.
    pub fn new(host: &'a mut H, kinds: &'a KindResolver, max_depth: Option<usize>) -> Self {
        let max_depth = max_depth.filter(|&limit| limit > 0);
        Matcher {
            host,
            kinds,
            scratch: Scratch::new(),
            bindings: Bindings::new(),
            depth: 0,
            max_depth,
        }
    }

    pub fn bindings(&self) -> &Bindings<H::Value> {
        &self.bindings
    }

    pub fn take_bindings(&mut self) -> Bindings<H::Value> {
        std::mem::take(&mut self.bindings)
    }

    pub fn reset_bindings(&mut self) {
        self.bindings.clear();
    }

    pub fn kind_of(&self, value: &H::Value) -> MatchKind {
        self.kinds.kind_of(&*self.host, value)
    }

    /// Sequence view of the subject, shared with every clause.
    pub fn subject_sequence(&mut self, subject: &H::Value) -> Result<Rc<[H::Value]>, MatchError> {
        Ok(self
            .scratch
            .sequence_view(&mut *self.host, &AccessPath::new(), subject)?)
    }

    /// Mapping view of the subject, shared with every clause.
    pub fn subject_mapping(
        &mut self,
        subject: &H::Value,
    ) -> Result<Rc<MappingView<H::Value>>, MatchError> {
        Ok(self
            .scratch
            .mapping_view(&mut *self.host, &AccessPath::new(), subject)?)
    }

    /// Match a clause's top-level pattern against the subject.
    pub fn match_subject(&mut self, pattern: &Pattern, subject: &H::Value) -> Result<bool, MatchError> {
        self.match_pattern(pattern, subject, &AccessPath::new())
    }

    /// Evaluate a clause guard with the current bindings.
    pub fn check_guard(&mut self, guard: Option<GuardRef>) -> Result<bool, MatchError> {
        guard::check_guard(&mut *self.host, guard, &self.bindings)
    }

    pub fn match_pattern(
        &mut self,
        pattern: &Pattern,
        value: &H::Value,
        path: &AccessPath,
    ) -> Result<bool, MatchError> {
        if let Some(limit) = self.max_depth {
            if self.depth >= limit {
                return Err(MatchError::DepthLimit { limit });
            }
        }
        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.match_node(pattern, value, path));
        self.depth -= 1;
        result
    }

    fn match_node(
        &mut self,
        pattern: &Pattern,
        value: &H::Value,
        path: &AccessPath,
    ) -> Result<bool, MatchError> {
        match pattern {
            Pattern::Wildcard => Ok(true),
            Pattern::Capture(name) => {
                self.bindings.bind(*name, value.clone());
                Ok(true)
            }
            Pattern::Literal(lit) => {
                let expected = self.host.literal(*lit);
                if lit.is_singleton() {
                    Ok(self.host.identical(value, &expected))
                } else {
                    Ok(self.host.equals(value, &expected)?)
                }
            }
            Pattern::ValueRef(expr) => {
                let expected = self.host.eval_value(*expr)?;
                Ok(self.host.equals(value, &expected)?)
            }
            Pattern::Sequence { items, star } => self.match_sequence(items, *star, value, path),
            Pattern::Mapping { entries, rest } => self.match_mapping(entries, *rest, value, path),
            Pattern::Class {
                cls,
                positional,
                keywords,
            } => self.match_class(*cls, positional, keywords, value, path),
            Pattern::As { pattern, name } => {
                if !self.match_pattern(pattern, value, path)? {
                    return Ok(false);
                }
                self.bindings.bind(*name, value.clone());
                Ok(true)
            }
            Pattern::Or(alts) => {
                for alt in alts {
                    let mark = self.bindings.mark();
                    if self.match_pattern(alt, value, path)? {
                        return Ok(true);
                    }
                    self.bindings.truncate(mark);
                }
                Ok(false)
            }
        }
    }

    fn match_sequence(
        &mut self,
        items: &[Pattern],
        star: Option<usize>,
        value: &H::Value,
        path: &AccessPath,
    ) -> Result<bool, MatchError> {
        if !self.kind_of(value).is_sequence() {
            return Ok(false);
        }
        let view = self
            .scratch
            .sequence_view(&mut *self.host, path, value)?;
        let len = view.len();

        let Some(star) = star else {
            if len != items.len() {
                return Ok(false);
            }
            for (i, item) in items.iter().enumerate() {
                if !self.match_pattern(item, &view[i], &child(path, PathStep::Index(i)))? {
                    return Ok(false);
                }
            }
            return Ok(true);
        };

        // A star outside the item list never matches.
        if star >= items.len() || len < items.len() - 1 {
            return Ok(false);
        }
        let end = len - (items.len() - star - 1);
        for (i, item) in items.iter().enumerate() {
            let matched = match i.cmp(&star) {
                std::cmp::Ordering::Less => {
                    self.match_pattern(item, &view[i], &child(path, PathStep::Index(i)))?
                }
                std::cmp::Ordering::Equal => {
                    if matches!(item, Pattern::Wildcard) {
                        continue;
                    }
                    let slice = self.host.new_sequence(view[star..end].to_vec());
                    let step = PathStep::Slice { start: star, end };
                    self.match_pattern(item, &slice, &child(path, step))?
                }
                std::cmp::Ordering::Greater => {
                    let j = end + (i - star - 1);
                    self.match_pattern(item, &view[j], &child(path, PathStep::Index(j)))?
                }
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn match_mapping(
        &mut self,
        entries: &[MappingEntry],
        rest: Option<Name>,
        value: &H::Value,
        path: &AccessPath,
    ) -> Result<bool, MatchError> {
        if !self.kind_of(value).is_mapping() {
            return Ok(false);
        }
        let view = self.scratch.mapping_view(&mut *self.host, path, value)?;
        let size_ok = match rest {
            None => view.len() == entries.len(),
            Some(_) => view.len() >= entries.len(),
        };
        if !size_ok {
            return Ok(false);
        }

        let mut keys: SmallVec<[MapKey; 4]> = SmallVec::with_capacity(entries.len());
        for entry in entries {
            let key = match entry.key {
                MappingKey::Literal(lit) => lit.map_key(),
                MappingKey::Value(expr) => {
                    let key_value = self.host.eval_value(expr)?;
                    self.host
                        .map_key(&key_value)
                        .ok_or(MatchError::UnhashableKey { expr })?
                }
            };
            if !view.contains_key(&key) {
                return Ok(false);
            }
            keys.push(key);
        }

        for (entry, key) in entries.iter().zip(&keys) {
            let Some(item) = view.get(key) else {
                return Ok(false);
            };
            if !self.match_pattern(&entry.pattern, item, &child(path, PathStep::Key(*key)))? {
                return Ok(false);
            }
        }

        if let Some(rest) = rest {
            let remaining = self.host.new_mapping(view.remaining(&keys));
            self.bindings.bind(rest, remaining);
        }
        Ok(true)
    }

    fn match_class(
        &mut self,
        cls: TypeId,
        positional: &[Pattern],
        keywords: &[KeywordPattern],
        value: &H::Value,
        path: &AccessPath,
    ) -> Result<bool, MatchError> {
        if !self.host.is_instance(value, cls)? {
            return Ok(false);
        }
        if positional.is_empty() && keywords.is_empty() {
            return Ok(true);
        }

        match self.kind_of(value).class_mode {
            ClassMode::SelfValue if positional.len() == 1 => {
                if !self.match_pattern(&positional[0], value, path)? {
                    return Ok(false);
                }
                let names = keyword_names(keywords, SmallVec::new())?;
                let patterns = keywords.iter().map(|kw| &kw.pattern);
                self.match_attributes(&names, patterns, value, path)
            }
            ClassMode::Positional => self.match_components(positional, keywords, value, path),
            ClassMode::Default => {
                let mut names: SmallVec<[Name; 4]> = SmallVec::new();
                if !positional.is_empty() {
                    let declared = self.scratch.declared_attrs(&mut *self.host, path, value)?;
                    if positional.len() > declared.len() {
                        return Err(MatchError::TooManyPositional {
                            class: cls,
                            declared: declared.len(),
                            given: positional.len(),
                        });
                    }
                    names.extend(declared[..positional.len()].iter().copied());
                }
                let names = keyword_names(keywords, names)?;
                let patterns = positional
                    .iter()
                    .chain(keywords.iter().map(|kw| &kw.pattern));
                self.match_attributes(&names, patterns, value, path)
            }
            ClassMode::SelfValue | ClassMode::Opaque => Ok(false),
        }
    }

    /// Positional class mode: sub-patterns match deconstructed components.
    fn match_components(
        &mut self,
        positional: &[Pattern],
        keywords: &[KeywordPattern],
        value: &H::Value,
        path: &AccessPath,
    ) -> Result<bool, MatchError> {
        let items = self
            .scratch
            .deconstructed_items(&mut *self.host, path, value)?;
        let consumed = positional.len();
        if items.len() < consumed {
            return Ok(false);
        }

        let mut slots = SmallVec::<[usize; 4]>::new();
        if !keywords.is_empty() {
            let declared = self.scratch.declared_attrs(&mut *self.host, path, value)?;
            let names: SmallVec<[Name; 4]> = keywords.iter().map(|kw| kw.name).collect();
            slots = resolve_keywords(&names, &declared, consumed).map_err(|err| match err {
                KeywordError::Unknown(name) => MatchError::UnknownKeyword {
                    name,
                    class: self.host.type_of(value),
                },
                KeywordError::BelowMinimum { name, index } => {
                    MatchError::KeywordRebindsPositional {
                        name,
                        index,
                        consumed,
                    }
                }
                KeywordError::Duplicate(name) => MatchError::KeywordCollision { name },
            })?;
            for (kw, &index) in keywords.iter().zip(&slots) {
                if index >= items.len() {
                    return Err(MatchError::ComponentOutOfRange {
                        name: kw.name,
                        index,
                        len: items.len(),
                    });
                }
            }
        }

        let targets = (0..consumed).chain(slots.iter().copied());
        let patterns = positional
            .iter()
            .chain(keywords.iter().map(|kw| &kw.pattern));
        for (index, pattern) in targets.zip(patterns) {
            if !self.match_pattern(pattern, &items[index], &child(path, PathStep::Component(index)))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Fetch every named attribute (a missing one fails the clause), then
    /// match each against its pattern.
    fn match_attributes<'p>(
        &mut self,
        names: &[Name],
        patterns: impl Iterator<Item = &'p Pattern>,
        value: &H::Value,
        path: &AccessPath,
    ) -> Result<bool, MatchError> {
        let mut values: SmallVec<[H::Value; 4]> = SmallVec::with_capacity(names.len());
        for &name in names {
            match self.scratch.attribute(&mut *self.host, path, value, name)? {
                Some(v) => values.push(v),
                None => return Ok(false),
            }
        }
        for ((pattern, name), attr) in patterns.zip(names).zip(&values) {
            if !self.match_pattern(pattern, attr, &child(path, PathStep::Attr(*name)))? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Append keyword names to `names`, rejecting any attribute named twice.
fn keyword_names(
    keywords: &[KeywordPattern],
    mut names: SmallVec<[Name; 4]>,
) -> Result<SmallVec<[Name; 4]>, MatchError> {
    for kw in keywords {
        if names.contains(&kw.name) {
            return Err(MatchError::KeywordCollision { name: kw.name });
        }
        names.push(kw.name);
    }
    Ok(names)
}
