//! casematch IR - shared types for the structural pattern-matching engine.
//!
//! This crate contains everything the other casematch crates agree on:
//! - Interned names (`Name`, `StringInterner`)
//! - Host handles (`TypeId`, `ExprRef`, `GuardRef`, `BodyRef`)
//! - Match kinds (`KindFlags` declarations, validated `MatchKind`)
//! - The pattern tree (`Pattern`, `CaseClause`, `MatchStatement`)
//! - The host object-model contract (`ObjectModel`, `HostError`)
//! - Compiled dispatch plans (`MatchPlan` and its lanes)
//!
//! # Design Philosophy
//!
//! - **Immutable trees**: patterns and statements are built once by the
//!   (external) parser and only ever traversed read-only.
//! - **Opaque host units**: literals are plain data, but value references,
//!   guards, and bodies are handles the host evaluates.
//! - **Closed kinds**: a type's kind is two small enums, never a raw bitmask
//!   past the registration boundary.

mod ids;
mod interner;
mod name;

pub mod host;
pub mod kind;
pub mod pattern;
pub mod plan;

pub use host::{Bindings, HostError, MapKey, MappingView, ObjectModel};
pub use ids::{BodyRef, ExprRef, GuardRef, TypeId};
pub use interner::{SharedInterner, StringInterner, StringLookup};
pub use kind::{ClassMode, KindConflict, KindFlags, MatchKind, Shape};
pub use name::Name;
pub use pattern::{
    CaseClause, KeywordPattern, Literal, MappingEntry, MappingKey, MatchStatement, Pattern,
};
pub use plan::{
    Candidates, KeyTest, KeyTree, LengthDispatch, MappingLane, MatchPlan, PlanStep, SequenceLane,
};
