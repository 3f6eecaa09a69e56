//! Per-evaluation scratch state: the deconstruction service.
//!
//! Every value the matcher reaches is identified by its [`AccessPath`]
//! from the subject. For each path the scratch keeps the lazily realized
//! views of that value: sequence view, mapping view, deconstructed items,
//! declared attribute names, and fetched attributes. Each is computed at
//! most once per evaluation, no matter how many clauses ask for it, and
//! only when some pattern actually needs it.
//!
//! A path always denotes the same value within one evaluation, because
//! every projection step reads from an already-memoized view.

use std::rc::Rc;

use cm_ir::{HostError, MapKey, MappingView, Name, ObjectModel};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// One projection from a value to a sub-value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Element of the sequence view.
    Index(usize),
    /// Star slice `[start, end)` of the sequence view.
    Slice { start: usize, end: usize },
    /// Entry of the mapping view.
    Key(MapKey),
    /// Item of the deconstruction.
    Component(usize),
    Attr(Name),
}

pub type AccessPath = SmallVec<[PathStep; 4]>;

/// Extend `path` by one step.
pub fn child(path: &AccessPath, step: PathStep) -> AccessPath {
    let mut out = path.clone();
    out.push(step);
    out
}

struct NodeCache<V> {
    sequence: Option<Rc<[V]>>,
    mapping: Option<Rc<MappingView<V>>>,
    items: Option<Rc<[V]>>,
    declared: Option<Rc<[Name]>>,
    attrs: FxHashMap<Name, Option<V>>,
}

impl<V> Default for NodeCache<V> {
    fn default() -> Self {
        NodeCache {
            sequence: None,
            mapping: None,
            items: None,
            declared: None,
            attrs: FxHashMap::default(),
        }
    }
}

/// Memo table for one match statement evaluation.
pub struct Scratch<V> {
    nodes: FxHashMap<AccessPath, NodeCache<V>>,
}

impl<V: Clone> Scratch<V> {
    pub fn new() -> Self {
        Scratch {
            nodes: FxHashMap::default(),
        }
    }

    fn node(&mut self, path: &AccessPath) -> &mut NodeCache<V> {
        self.nodes.entry(path.clone()).or_default()
    }

    pub fn sequence_view<H>(
        &mut self,
        host: &mut H,
        path: &AccessPath,
        value: &V,
    ) -> Result<Rc<[V]>, HostError>
    where
        H: ObjectModel<Value = V> + ?Sized,
    {
        let node = self.node(path);
        if let Some(view) = &node.sequence {
            return Ok(Rc::clone(view));
        }
        let view: Rc<[V]> = host.sequence_view(value)?.into();
        node.sequence = Some(Rc::clone(&view));
        Ok(view)
    }

    pub fn mapping_view<H>(
        &mut self,
        host: &mut H,
        path: &AccessPath,
        value: &V,
    ) -> Result<Rc<MappingView<V>>, HostError>
    where
        H: ObjectModel<Value = V> + ?Sized,
    {
        let node = self.node(path);
        if let Some(view) = &node.mapping {
            return Ok(Rc::clone(view));
        }
        let entries = host.mapping_entries(value)?;
        let view = Rc::new(MappingView::new(entries, |k| host.map_key(k)));
        node.mapping = Some(Rc::clone(&view));
        Ok(view)
    }

    pub fn deconstructed_items<H>(
        &mut self,
        host: &mut H,
        path: &AccessPath,
        value: &V,
    ) -> Result<Rc<[V]>, HostError>
    where
        H: ObjectModel<Value = V> + ?Sized,
    {
        let node = self.node(path);
        if let Some(items) = &node.items {
            return Ok(Rc::clone(items));
        }
        let items: Rc<[V]> = host.deconstruct(value)?.into();
        node.items = Some(Rc::clone(&items));
        Ok(items)
    }

    /// `match_args` of the value's runtime type.
    pub fn declared_attrs<H>(
        &mut self,
        host: &mut H,
        path: &AccessPath,
        value: &V,
    ) -> Result<Rc<[Name]>, HostError>
    where
        H: ObjectModel<Value = V> + ?Sized,
    {
        let node = self.node(path);
        if let Some(names) = &node.declared {
            return Ok(Rc::clone(names));
        }
        let ty = host.type_of(value);
        let names: Rc<[Name]> = host.match_args(ty)?.into();
        node.declared = Some(Rc::clone(&names));
        Ok(names)
    }

    /// Attribute fetch; `None` means "not found".
    pub fn attribute<H>(
        &mut self,
        host: &mut H,
        path: &AccessPath,
        value: &V,
        name: Name,
    ) -> Result<Option<V>, HostError>
    where
        H: ObjectModel<Value = V> + ?Sized,
    {
        let node = self.node(path);
        if let Some(found) = node.attrs.get(&name) {
            return Ok(found.clone());
        }
        let found = host.get_attribute(value, name)?;
        node.attrs.insert(name, found.clone());
        Ok(found)
    }

    /// Number of values with at least one memo slot touched.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<V: Clone> Default for Scratch<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
