//! Engine configuration.
//!
//! `MatchStrategy` selects how a compiled statement is walked; both
//! strategies are observably equivalent for conforming kinds, so the
//! choice only affects speed. `EngineConfig::from_env` lets a host flip it
//! without recompiling (`CM_MATCH_STRATEGY=naive`).

use std::fmt;
use std::str::FromStr;

use cm_canon::LaneConfig;

/// How clauses are offered to the matcher.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchStrategy {
    /// Left to right through every clause: the reference semantics.
    Naive,
    /// Through the compiled lane plan.
    #[default]
    Lanes,
}

impl MatchStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStrategy::Naive => "naive",
            MatchStrategy::Lanes => "lanes",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" => Ok(MatchStrategy::Naive),
            "lanes" | "optimized" => Ok(MatchStrategy::Lanes),
            _ => Err(ConfigError::Strategy(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown match strategy `{0}` (expected `naive` or `lanes`)")]
    Strategy(String),
    #[error("invalid depth limit `{0}`")]
    Depth(String),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub strategy: MatchStrategy,
    pub lanes: LaneConfig,
    /// Deepest pattern nesting the matcher accepts, or `None` for
    /// unlimited (the stack grows on demand). `Some(0)` is treated as
    /// unlimited.
    pub max_depth: Option<usize>,
}

impl EngineConfig {
    /// Variable selecting the strategy.
    pub const STRATEGY_VAR: &'static str = "CM_MATCH_STRATEGY";
    /// Variable setting `max_depth`; `0` or `none` means unlimited.
    pub const MAX_DEPTH_VAR: &'static str = "CM_MAX_DEPTH";

    #[must_use]
    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Cap pattern nesting at `limit`; `0` means unlimited, as with
    /// `CM_MAX_DEPTH`.
    #[must_use]
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = (limit > 0).then_some(limit);
        self
    }

    /// Defaults, overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults, overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = EngineConfig::default();
        if let Some(raw) = lookup(Self::STRATEGY_VAR) {
            config.strategy = raw.parse()?;
        }
        if let Some(raw) = lookup(Self::MAX_DEPTH_VAR) {
            config.max_depth = parse_depth(&raw)?;
        }
        Ok(config)
    }
}

fn parse_depth(raw: &str) -> Result<Option<usize>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match trimmed.parse::<usize>() {
        Ok(0) => Ok(None),
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(ConfigError::Depth(raw.to_owned())),
    }
}
