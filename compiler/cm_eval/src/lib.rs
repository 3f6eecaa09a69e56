//! casematch evaluator - runs match statements against host values.
//!
//! This crate provides the runtime half of the engine:
//! - `kinds`: type → validated match kind, cached per engine
//! - `scratch`: per-evaluation memo of realized views and attributes
//! - `matcher`: recursive pattern matching over the host protocol
//! - `guard`: guard evaluation with tentative bindings
//! - `exec`: the naive (reference) and lane (compiled plan) executors
//! - `engine`: the `MatchEngine` facade tying them together
//!
//! # Usage
//!
//! ```text
//! let engine = MatchEngine::new(EngineConfig::from_env()?);
//! let compiled = engine.compile(statement);
//! match engine.execute(&mut host, &compiled)? {
//!     MatchOutcome::Matched { body, bindings, .. } => { /* run body */ }
//!     MatchOutcome::NoMatch => {}
//! }
//! ```
//!
//! Both strategies are observably equivalent for types with conforming
//! kinds: same clause, same bindings, same host calls in the same order.

use std::sync::Once;

pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod guard;
pub mod kinds;
pub mod matcher;
pub mod scratch;
mod stack;

pub use config::{ConfigError, EngineConfig, MatchStrategy};
pub use engine::{CompiledMatch, MatchEngine};
pub use errors::MatchError;
pub use exec::MatchOutcome;
pub use kinds::{KindResolver, ResolvedKind};
pub use matcher::{resolve_keywords, KeywordError, Matcher};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=cm_eval=debug` or `RUST_LOG=cm_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
