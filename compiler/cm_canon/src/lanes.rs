//! Lane grouping: from a clause list to a `MatchPlan`.

use cm_ir::{MappingLane, MatchPlan, MatchStatement, PlanStep, SequenceLane};
use rustc_hash::FxHashSet;

use crate::mapping::{build_key_tree, key_tests, KeyTests};
use crate::sequence::{build_length_dispatch, LengthConstraint};
use crate::validate::validate;

/// Limits on lane formation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaneConfig {
    /// Shortest run of clauses worth turning into a lane.
    pub min_lane_len: usize,
    /// Most distinct key tests one mapping lane may carry. Longer runs are
    /// split into several lanes.
    pub max_key_tests: usize,
}

impl Default for LaneConfig {
    fn default() -> Self {
        LaneConfig {
            min_lane_len: 2,
            max_key_tests: 8,
        }
    }
}

/// Lane membership of one clause.
enum Lane {
    Sequence(LengthConstraint),
    Mapping(KeyTests),
}

/// Compile a plan for `stmt`.
///
/// Clauses with structural problems, and clauses whose top-level pattern
/// is neither a sequence nor an all-literal mapping pattern, become
/// single-clause steps.
#[tracing::instrument(level = "debug", skip_all, fields(clauses = stmt.clauses.len()))]
pub fn compile_plan(stmt: &MatchStatement, config: &LaneConfig) -> MatchPlan {
    let unsound: FxHashSet<usize> = validate(stmt)
        .into_iter()
        .filter(|p| p.kind.is_structural())
        .map(|p| p.clause)
        .collect();

    let lanes: Vec<Option<Lane>> = stmt
        .clauses
        .iter()
        .enumerate()
        .map(|(i, case)| {
            if unsound.contains(&i) {
                return None;
            }
            LengthConstraint::of(&case.pattern)
                .map(Lane::Sequence)
                .or_else(|| key_tests(&case.pattern).map(Lane::Mapping))
        })
        .collect();

    let mut builder = PlanBuilder {
        config,
        steps: Vec::new(),
    };
    let mut i = 0;
    while i < lanes.len() {
        match &lanes[i] {
            None => {
                builder.steps.push(PlanStep::Clause(i));
                i += 1;
            }
            Some(Lane::Sequence(_)) => {
                let mut run = Vec::new();
                while let Some(Some(Lane::Sequence(c))) = lanes.get(i) {
                    run.push((i, *c));
                    i += 1;
                }
                builder.sequence_run(&run);
            }
            Some(Lane::Mapping(_)) => {
                let mut run = Vec::new();
                while let Some(Some(Lane::Mapping(tests))) = lanes.get(i) {
                    run.push((i, tests.clone()));
                    i += 1;
                }
                builder.mapping_run(run);
            }
        }
    }

    let plan = MatchPlan {
        steps: builder.steps,
    };
    tracing::debug!(
        steps = plan.steps.len(),
        laned = plan.laned_clauses(),
        "compiled match plan"
    );
    plan
}

struct PlanBuilder<'a> {
    config: &'a LaneConfig,
    steps: Vec<PlanStep>,
}

impl PlanBuilder<'_> {
    fn singles(&mut self, clauses: impl IntoIterator<Item = usize>) {
        self.steps.extend(clauses.into_iter().map(PlanStep::Clause));
    }

    fn sequence_run(&mut self, run: &[(usize, LengthConstraint)]) {
        if run.len() < self.config.min_lane_len {
            self.singles(run.iter().map(|(i, _)| *i));
            return;
        }
        self.steps.push(PlanStep::Sequence(SequenceLane {
            clauses: run.iter().map(|(i, _)| *i).collect(),
            dispatch: build_length_dispatch(run),
        }));
    }

    /// Split the run into chunks within the key-test budget.
    fn mapping_run(&mut self, run: Vec<(usize, KeyTests)>) {
        let mut chunk: Vec<(usize, KeyTests)> = Vec::new();
        let mut tests = FxHashSet::default();
        for row in run {
            let added = row.1.iter().filter(|t| !tests.contains(*t)).count();
            if !chunk.is_empty() && tests.len() + added > self.config.max_key_tests {
                self.mapping_chunk(std::mem::take(&mut chunk));
                tests.clear();
            }
            tests.extend(row.1.iter().copied());
            chunk.push(row);
        }
        if !chunk.is_empty() {
            self.mapping_chunk(chunk);
        }
    }

    fn mapping_chunk(&mut self, chunk: Vec<(usize, KeyTests)>) {
        if chunk.len() < self.config.min_lane_len {
            self.singles(chunk.iter().map(|(i, _)| *i));
            return;
        }
        let tree = build_key_tree(&chunk);
        tracing::trace!(
            clauses = chunk.len(),
            tests = tree.test_count(),
            "mapping lane"
        );
        self.steps.push(PlanStep::Mapping(MappingLane {
            clauses: chunk.into_iter().map(|(i, _)| i).collect(),
            tree,
        }));
    }
}
