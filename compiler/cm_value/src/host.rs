//! The instrumented reference host.
//!
//! `RefHost` answers every [`ObjectModel`] call from its registry and value
//! slots, and appends a [`HostEvent`] for each call with observable effects.
//! Tests compare event logs to check call counts and ordering.

use std::hash::{Hash, Hasher};

use cm_ir::{
    Bindings, ExprRef, GuardRef, HostError, KindFlags, Literal, MapKey, Name, ObjectModel,
    SharedInterner, TypeId,
};
use rustc_hash::FxHasher;

use crate::registry::{builtin, ClassDef, RegistryError, TypeRegistry};
use crate::value::Value;

/// One observable host call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostEvent {
    IsInstance { ty: TypeId, class: TypeId },
    MatchArgs(TypeId),
    GetAttr { ty: TypeId, name: Name },
    Deconstruct(TypeId),
    SequenceView(TypeId),
    MappingEntries(TypeId),
    Equals,
    EvalValue(ExprRef),
    Guard(GuardRef),
}

/// Guard conditions understood by the reference host.
#[derive(Clone, Debug, PartialEq)]
pub enum Guard {
    Const(bool),
    /// `name > bound`; raises if `name` is unbound or not an int.
    IntAbove { name: Name, bound: i64 },
    /// `name` is bound to a truthy value.
    Bound(Name),
    /// Raises with the given message.
    Raise(String),
}

#[derive(Clone)]
pub struct RefHost {
    names: SharedInterner,
    types: TypeRegistry,
    slots: Vec<Value>,
    guards: Vec<Guard>,
    events: Vec<HostEvent>,
}

impl RefHost {
    pub fn new() -> Self {
        Self::with_interner(SharedInterner::new())
    }

    pub fn with_interner(names: SharedInterner) -> Self {
        let types = TypeRegistry::new(&names);
        RefHost {
            names,
            types,
            slots: Vec::new(),
            guards: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn names(&self) -> &SharedInterner {
        &self.names
    }

    pub fn intern(&self, s: &str) -> Name {
        self.names.intern(s)
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn define_class(&mut self, def: ClassDef) -> Result<TypeId, RegistryError> {
        self.types.register(def)
    }

    /// Define a class whose kind declaration may break the exclusivity rules.
    pub fn define_class_unchecked(&mut self, def: ClassDef) -> Result<TypeId, RegistryError> {
        self.types.register_unchecked(def)
    }

    /// Build an instance of `class` with named attributes and
    /// deconstruction components.
    pub fn instance(&self, class: TypeId, attrs: &[(&str, Value)], components: Vec<Value>) -> Value {
        let attrs = attrs
            .iter()
            .map(|(name, value)| (self.intern(name), value.clone()))
            .collect();
        Value::object(class, attrs, components)
    }

    /// Store a value in a fresh slot and return the expression reading it.
    pub fn add_value(&mut self, value: Value) -> ExprRef {
        let id = ExprRef::new(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
        self.slots.push(value);
        id
    }

    /// Reassign a slot. Unknown slots are ignored.
    pub fn set_value(&mut self, expr: ExprRef, value: Value) {
        if let Some(slot) = self.slots.get_mut(expr.index()) {
            *slot = value;
        }
    }

    pub fn add_guard(&mut self, guard: Guard) -> GuardRef {
        let id = GuardRef::new(u32::try_from(self.guards.len()).unwrap_or(u32::MAX));
        self.guards.push(guard);
        id
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of logged events satisfying `pred`.
    pub fn count(&self, pred: impl Fn(&HostEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    fn record(&mut self, event: HostEvent) {
        tracing::trace!(?event, "host call");
        self.events.push(event);
    }

    fn raise(&self, what: &str, value: &Value) -> HostError {
        HostError::new(format!(
            "{what} not supported by {}",
            self.type_name(self.type_of(value))
        ))
    }

    fn type_name(&self, ty: TypeId) -> &str {
        self.types
            .get(ty)
            .map_or("<unknown>", |def| self.names.lookup(def.name))
    }

    fn check_guard(&self, guard: &Guard, bindings: &Bindings<Value>) -> Result<bool, HostError> {
        match guard {
            Guard::Const(b) => Ok(*b),
            Guard::IntAbove { name, bound } => match bindings.get(*name).and_then(Value::as_int) {
                Some(n) => Ok(n > *bound),
                None => Err(HostError::new(format!(
                    "guard needs an int bound to `{}`",
                    self.names.lookup(*name)
                ))),
            },
            Guard::Bound(name) => Ok(bindings.get(*name).is_some_and(Value::truthy)),
            Guard::Raise(message) => Err(HostError::new(message.clone())),
        }
    }
}

impl Default for RefHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectModel for RefHost {
    type Value = Value;

    fn type_of(&self, value: &Value) -> TypeId {
        match value {
            Value::None => builtin::NONE,
            Value::Bool(_) => builtin::BOOL,
            Value::Int(_) => builtin::INT,
            Value::Float(_) => builtin::FLOAT,
            Value::Str(_) => builtin::STR,
            Value::List(_) => builtin::LIST,
            Value::Tuple(_) => builtin::TUPLE,
            Value::Dict(_) => builtin::DICT,
            Value::Object(obj) => obj.class,
        }
    }

    fn declared_kind(&self, ty: TypeId) -> Option<KindFlags> {
        self.types.declared_kind(ty)
    }

    fn is_instance(&mut self, value: &Value, class: TypeId) -> Result<bool, HostError> {
        let ty = self.type_of(value);
        self.record(HostEvent::IsInstance { ty, class });
        Ok(self.types.is_subtype(ty, class))
    }

    fn match_args(&mut self, ty: TypeId) -> Result<Vec<Name>, HostError> {
        self.record(HostEvent::MatchArgs(ty));
        Ok(self.types.match_args(ty).to_vec())
    }

    fn get_attribute(&mut self, value: &Value, name: Name) -> Result<Option<Value>, HostError> {
        let ty = self.type_of(value);
        self.record(HostEvent::GetAttr { ty, name });
        if self.types.raises(ty, name) {
            return Err(HostError::new(format!(
                "{}.{} raised",
                self.type_name(ty),
                self.names.lookup(name)
            )));
        }
        Ok(match value {
            Value::Object(obj) => obj.attr(name).cloned(),
            _ => None,
        })
    }

    fn deconstruct(&mut self, value: &Value) -> Result<Vec<Value>, HostError> {
        self.record(HostEvent::Deconstruct(self.type_of(value)));
        match value {
            Value::Object(obj) => Ok(obj.components.clone()),
            _ => Err(self.raise("deconstruct", value)),
        }
    }

    fn sequence_view(&mut self, value: &Value) -> Result<Vec<Value>, HostError> {
        self.record(HostEvent::SequenceView(self.type_of(value)));
        match value.as_items() {
            Some(items) => Ok(items.to_vec()),
            None => Err(self.raise("sequence view", value)),
        }
    }

    fn mapping_entries(&mut self, value: &Value) -> Result<Vec<(Value, Value)>, HostError> {
        self.record(HostEvent::MappingEntries(self.type_of(value)));
        match value.as_entries() {
            Some(entries) => Ok(entries.to_vec()),
            None => Err(self.raise("mapping view", value)),
        }
    }

    /// Strings already interned key as [`MapKey::Str`], so they meet
    /// literal pattern keys; any other string keys by a content hash
    /// and is never interned. Tuples and objects key by a 64-bit digest
    /// tagged with the key's kind, so two distinct keys of the same kind
    /// whose digests collide compare as one key.
    fn map_key(&self, value: &Value) -> Option<MapKey> {
        match value {
            Value::None => Some(MapKey::None),
            Value::Bool(b) => Some(MapKey::from_bool(*b)),
            Value::Int(n) => Some(MapKey::Int(*n)),
            Value::Float(x) => Some(MapKey::from_float(*x)),
            Value::Str(s) => Some(match self.names.get(s.as_str()) {
                Some(name) => MapKey::Str(name),
                None => opaque_key(OpaqueTag::Str, |h| s.as_str().hash(h)),
            }),
            Value::Tuple(items) => {
                let keys = items
                    .iter()
                    .map(|item| self.map_key(item))
                    .collect::<Option<Vec<_>>>()?;
                Some(opaque_key(OpaqueTag::Tuple, |h| keys.hash(h)))
            }
            Value::Object(obj) => Some(opaque_key(OpaqueTag::Object, |h| obj.addr().hash(h))),
            Value::List(_) | Value::Dict(_) => None,
        }
    }

    fn literal(&self, literal: Literal) -> Value {
        match literal {
            Literal::None => Value::None,
            Literal::Bool(b) => Value::Bool(b),
            Literal::Int(n) => Value::Int(n),
            Literal::Float(bits) => Value::Float(f64::from_bits(bits)),
            Literal::Str(name) => Value::string(self.names.lookup(name)),
        }
    }

    fn identical(&self, a: &Value, b: &Value) -> bool {
        a.is(b)
    }

    fn equals(&mut self, a: &Value, b: &Value) -> Result<bool, HostError> {
        self.record(HostEvent::Equals);
        Ok(a.loose_eq(b))
    }

    fn eval_value(&mut self, expr: ExprRef) -> Result<Value, HostError> {
        self.record(HostEvent::EvalValue(expr));
        self.slots
            .get(expr.index())
            .cloned()
            .ok_or_else(|| HostError::new(format!("undefined value {expr:?}")))
    }

    fn eval_guard(&mut self, guard: GuardRef, bindings: &Bindings<Value>) -> Result<bool, HostError> {
        self.record(HostEvent::Guard(guard));
        match self.guards.get(guard.index()) {
            Some(g) => self.check_guard(g, bindings),
            None => Err(HostError::new(format!("undefined guard {guard:?}"))),
        }
    }

    fn new_sequence(&mut self, items: Vec<Value>) -> Value {
        Value::list(items)
    }

    fn new_mapping(&mut self, entries: Vec<(Value, Value)>) -> Value {
        Value::dict(entries)
    }
}

/// Kind prefix mixed into every opaque key digest.
#[derive(Clone, Copy, Hash)]
enum OpaqueTag {
    Str,
    Tuple,
    Object,
}

fn opaque_key(tag: OpaqueTag, feed: impl FnOnce(&mut FxHasher)) -> MapKey {
    let mut hasher = FxHasher::default();
    tag.hash(&mut hasher);
    feed(&mut hasher);
    MapKey::Opaque(hasher.finish())
}
