//! casematch reference host.
//!
//! A small dynamic object model implementing [`cm_ir::ObjectModel`]:
//!
//! - `Value`: none, bools, ints, floats, strings, lists, tuples, dicts and
//!   user objects, with Python-like equality and hashing
//! - `TypeRegistry`: classes with base chains, declared match kinds
//!   (validated at registration), `match_args`, and attributes that raise
//! - `RefHost`: the object model itself, with value-reference slots, a tiny
//!   guard language, and a `HostEvent` log of every observable call
//!
//! The event log is what makes the engine's call discipline testable: two
//! evaluation strategies are equivalent exactly when they produce the same
//! outcome *and* the same log.

mod host;
mod registry;
mod value;

pub use host::{Guard, HostEvent, RefHost};
pub use registry::{builtin, ClassDef, RegistryError, TypeRegistry};
pub use value::{Heap, Object, Value};
