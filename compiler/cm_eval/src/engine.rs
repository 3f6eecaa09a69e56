//! The engine facade.
//!
//! A `MatchEngine` compiles statements once and evaluates them any number
//! of times, from any number of threads. Its only mutable state is the kind
//! cache, so one engine serves one host type universe: two hosts that give
//! the same `TypeId` different kinds need two engines.

use cm_canon::{compile_plan, validate, PatternProblem};
use cm_ir::{MatchPlan, MatchStatement, ObjectModel};

use crate::config::{EngineConfig, MatchStrategy};
use crate::errors::MatchError;
use crate::exec::{run_lanes, run_naive, MatchOutcome};
use crate::kinds::KindResolver;
use crate::matcher::Matcher;

/// A statement with its compiled plan.
#[derive(Clone, Debug)]
pub struct CompiledMatch {
    statement: MatchStatement,
    plan: MatchPlan,
    problems: Vec<PatternProblem>,
}

impl CompiledMatch {
    pub fn statement(&self) -> &MatchStatement {
        &self.statement
    }

    pub fn plan(&self) -> &MatchPlan {
        &self.plan
    }

    /// Problems found by validation. Clauses with structural problems still
    /// run, but never inside a lane.
    pub fn problems(&self) -> &[PatternProblem] {
        &self.problems
    }
}

#[derive(Default)]
pub struct MatchEngine {
    config: EngineConfig,
    kinds: KindResolver,
}

impl MatchEngine {
    pub fn new(config: EngineConfig) -> Self {
        MatchEngine {
            config,
            kinds: KindResolver::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn kinds(&self) -> &KindResolver {
        &self.kinds
    }

    #[tracing::instrument(level = "debug", skip_all, fields(clauses = statement.clauses.len()))]
    pub fn compile(&self, statement: MatchStatement) -> CompiledMatch {
        let problems = validate(&statement);
        for problem in &problems {
            tracing::debug!(clause = problem.clause, problem = %problem.kind, "pattern problem");
        }
        let plan = compile_plan(&statement, &self.config.lanes);
        tracing::debug!(
            steps = plan.steps.len(),
            laned = plan.laned_clauses(),
            "compiled match plan"
        );
        CompiledMatch {
            statement,
            plan,
            problems,
        }
    }

    /// Evaluate the statement's subject expression once, then match it.
    pub fn execute<H: ObjectModel + ?Sized>(
        &self,
        host: &mut H,
        compiled: &CompiledMatch,
    ) -> Result<MatchOutcome<H::Value>, MatchError> {
        let subject = host.eval_value(compiled.statement.subject)?;
        self.match_value(host, compiled, &subject)
    }

    /// Match an already-evaluated subject with the configured strategy.
    pub fn match_value<H: ObjectModel + ?Sized>(
        &self,
        host: &mut H,
        compiled: &CompiledMatch,
        subject: &H::Value,
    ) -> Result<MatchOutcome<H::Value>, MatchError> {
        self.match_value_with(self.config.strategy, host, compiled, subject)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(%strategy))]
    pub fn match_value_with<H: ObjectModel + ?Sized>(
        &self,
        strategy: MatchStrategy,
        host: &mut H,
        compiled: &CompiledMatch,
        subject: &H::Value,
    ) -> Result<MatchOutcome<H::Value>, MatchError> {
        let mut matcher = Matcher::new(host, &self.kinds, self.config.max_depth);
        let outcome = match strategy {
            MatchStrategy::Naive => run_naive(&mut matcher, &compiled.statement, subject),
            MatchStrategy::Lanes => {
                run_lanes(&mut matcher, &compiled.statement, &compiled.plan, subject)
            }
        };
        match &outcome {
            Ok(found) => tracing::debug!(clause = ?found.clause(), "match finished"),
            Err(err) => tracing::debug!(%err, "match aborted"),
        }
        outcome
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
