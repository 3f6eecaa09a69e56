//! Class registry for the reference host.
//!
//! Classes are stored once and looked up by `TypeId` (a dense index) or by
//! name. Kind declarations are validated here, at registration, so the
//! engine only ever sees nonconforming kinds when a test asks for one
//! explicitly through [`TypeRegistry::register_unchecked`].

use cm_ir::{KindConflict, KindFlags, MatchKind, Name, StringInterner, TypeId};
use rustc_hash::FxHashMap;

/// Built-in types, registered by [`TypeRegistry::new`] in this order.
pub mod builtin {
    use cm_ir::TypeId;

    pub const OBJECT: TypeId = TypeId::new(0);
    pub const NONE: TypeId = TypeId::new(1);
    /// Subtype of `INT`.
    pub const BOOL: TypeId = TypeId::new(2);
    pub const INT: TypeId = TypeId::new(3);
    pub const FLOAT: TypeId = TypeId::new(4);
    pub const STR: TypeId = TypeId::new(5);
    pub const LIST: TypeId = TypeId::new(6);
    pub const TUPLE: TypeId = TypeId::new(7);
    pub const DICT: TypeId = TypeId::new(8);
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown base class {0:?}")]
    UnknownBase(TypeId),
    #[error("class {class:?} declares an invalid match kind")]
    Kind {
        class: Name,
        #[source]
        source: KindConflict,
    },
    #[error("class {0:?} is already registered")]
    Duplicate(Name),
}

/// A class definition, built with the `with_*` methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDef {
    pub name: Name,
    /// `None` means `builtin::OBJECT`.
    pub base: Option<TypeId>,
    /// `None` inherits the base's declaration.
    pub kind: Option<KindFlags>,
    pub match_args: Vec<Name>,
    /// Attributes whose access raises.
    pub raising_attrs: Vec<Name>,
}

impl ClassDef {
    pub fn new(name: Name) -> Self {
        ClassDef {
            name,
            base: None,
            kind: None,
            match_args: Vec::new(),
            raising_attrs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: KindFlags) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn with_match_args(mut self, names: impl IntoIterator<Item = Name>) -> Self {
        self.match_args = names.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_raising_attr(mut self, name: Name) -> Self {
        self.raising_attrs.push(name);
        self
    }
}

#[derive(Clone, Debug)]
struct ClassEntry {
    def: ClassDef,
    /// Own declaration, or the nearest ancestor's.
    kind: Option<KindFlags>,
}

#[derive(Clone, Debug)]
pub struct TypeRegistry {
    classes: Vec<ClassEntry>,
    by_name: FxHashMap<Name, TypeId>,
}

impl TypeRegistry {
    /// A registry holding the built-in types.
    pub fn new(names: &StringInterner) -> Self {
        let mut registry = TypeRegistry {
            classes: Vec::new(),
            by_name: FxHashMap::default(),
        };
        let scalar = KindFlags::SELF;
        let builtins = [
            ("object", None, None),
            ("NoneType", Some(builtin::OBJECT), None),
            ("bool", Some(builtin::INT), Some(scalar)),
            ("int", Some(builtin::OBJECT), Some(scalar)),
            ("float", Some(builtin::OBJECT), Some(scalar)),
            ("str", Some(builtin::OBJECT), Some(scalar)),
            (
                "list",
                Some(builtin::OBJECT),
                Some(KindFlags::SEQUENCE | KindFlags::SELF),
            ),
            (
                "tuple",
                Some(builtin::OBJECT),
                Some(KindFlags::SEQUENCE | KindFlags::SELF),
            ),
            (
                "dict",
                Some(builtin::OBJECT),
                Some(KindFlags::MAPPING | KindFlags::SELF),
            ),
        ];
        for (name, base, kind) in builtins {
            // bool names int as its base before int exists; entries are
            // pushed directly so the forward reference is fine.
            let name = names.intern(name);
            let id = registry.next_id();
            registry.by_name.insert(name, id);
            registry.classes.push(ClassEntry {
                def: ClassDef {
                    name,
                    base,
                    kind,
                    match_args: Vec::new(),
                    raising_attrs: Vec::new(),
                },
                kind,
            });
        }
        registry
    }

    /// Register a class, rejecting kind declarations that break an
    /// exclusivity rule.
    pub fn register(&mut self, def: ClassDef) -> Result<TypeId, RegistryError> {
        if let Some(flags) = def.kind {
            MatchKind::from_flags(flags).map_err(|source| RegistryError::Kind {
                class: def.name,
                source,
            })?;
        }
        self.register_unchecked(def)
    }

    /// Register a class without validating its kind declaration.
    pub fn register_unchecked(&mut self, def: ClassDef) -> Result<TypeId, RegistryError> {
        let base = def.base.unwrap_or(builtin::OBJECT);
        let Some(base_entry) = self.classes.get(base.index()) else {
            return Err(RegistryError::UnknownBase(base));
        };
        if self.by_name.contains_key(&def.name) {
            return Err(RegistryError::Duplicate(def.name));
        }
        let kind = def.kind.or(base_entry.kind);
        let id = self.next_id();
        tracing::trace!(?id, ?kind, "registered class");
        self.by_name.insert(def.name, id);
        self.classes.push(ClassEntry {
            def: ClassDef {
                base: Some(base),
                ..def
            },
            kind,
        });
        Ok(id)
    }

    pub fn lookup(&self, name: Name) -> Option<TypeId> {
        self.by_name.get(&name).copied()
    }

    pub fn get(&self, ty: TypeId) -> Option<&ClassDef> {
        self.classes.get(ty.index()).map(|entry| &entry.def)
    }

    /// Effective kind declaration (own or inherited).
    pub fn declared_kind(&self, ty: TypeId) -> Option<KindFlags> {
        self.classes.get(ty.index()).and_then(|entry| entry.kind)
    }

    /// Positional attribute names, from the nearest class in the base
    /// chain that declares any.
    pub fn match_args(&self, ty: TypeId) -> &[Name] {
        let mut current = Some(ty);
        while let Some(t) = current {
            let Some(def) = self.get(t) else { break };
            if !def.match_args.is_empty() {
                return &def.match_args;
            }
            current = def.base;
        }
        &[]
    }

    /// Whether accessing `name` on instances of `ty` raises.
    pub fn raises(&self, ty: TypeId, name: Name) -> bool {
        let mut current = Some(ty);
        while let Some(t) = current {
            let Some(def) = self.get(t) else { break };
            if def.raising_attrs.contains(&name) {
                return true;
            }
            current = def.base;
        }
        false
    }

    /// Walk `ty`'s base chain looking for `ancestor`.
    pub fn is_subtype(&self, ty: TypeId, ancestor: TypeId) -> bool {
        let mut current = Some(ty);
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            current = self.get(t).and_then(|def| def.base);
        }
        false
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn next_id(&self) -> TypeId {
        TypeId::new(u32::try_from(self.classes.len()).unwrap_or(u32::MAX))
    }
}
