use pretty_assertions::assert_eq;

use super::*;
use crate::kinds::KindResolver;
use cm_canon::{compile_plan, LaneConfig};
use cm_ir::{BodyRef, CaseClause, ExprRef, Literal, Pattern, PlanStep};
use cm_value::{Guard, HostEvent, RefHost, Value};

fn statement(patterns: Vec<Pattern>) -> MatchStatement {
    let clauses = patterns
        .into_iter()
        .enumerate()
        .map(|(i, p)| CaseClause::new(p, BodyRef::new(u32::try_from(i).unwrap())))
        .collect();
    MatchStatement::new(ExprRef::new(0), clauses)
}

/// Run both executors on fresh copies of `host`; return both outcomes and
/// both event logs.
fn both(
    host: &RefHost,
    stmt: &MatchStatement,
    subject: &Value,
) -> [(Result<MatchOutcome<Value>, MatchError>, Vec<HostEvent>); 2] {
    let plan = compile_plan(stmt, &LaneConfig::default());
    let kinds = KindResolver::new();

    let mut naive_host = host.clone();
    let naive = {
        let mut m = Matcher::new(&mut naive_host, &kinds, None);
        run_naive(&mut m, stmt, subject)
    };
    let mut lane_host = host.clone();
    let lanes = {
        let mut m = Matcher::new(&mut lane_host, &kinds, None);
        run_lanes(&mut m, stmt, &plan, subject)
    };
    [
        (naive, naive_host.take_events()),
        (lanes, lane_host.take_events()),
    ]
}

fn int_seq(n: usize) -> Pattern {
    Pattern::seq(vec![Pattern::Wildcard; n])
}

#[test]
fn first_successful_clause_wins() {
    let host = RefHost::new();
    let x = host.intern("x");
    let stmt = statement(vec![
        Pattern::Literal(Literal::Int(1)),
        Pattern::Capture(x),
        Pattern::Wildcard,
    ]);
    let [(naive, _), (lanes, _)] = both(&host, &stmt, &Value::int(2));
    let naive = naive.unwrap();
    assert_eq!(naive.clause(), Some(1));
    assert_eq!(naive.body(), Some(BodyRef::new(1)));
    assert_eq!(naive.binding(x), Some(&Value::int(2)));
    assert_eq!(lanes.unwrap(), naive);
}

#[test]
fn sequence_lane_dispatches_on_length() {
    let host = RefHost::new();
    let stmt = statement(vec![int_seq(1), int_seq(2), int_seq(3)]);
    assert!(matches!(
        compile_plan(&stmt, &LaneConfig::default()).steps.as_slice(),
        [PlanStep::Sequence(_)]
    ));

    let subject = Value::list(vec![Value::int(0); 3]);
    let [(naive, naive_events), (lanes, lane_events)] = both(&host, &stmt, &subject);
    assert_eq!(naive.unwrap().clause(), Some(2));
    assert_eq!(lanes.unwrap().clause(), Some(2));
    assert_eq!(naive_events, lane_events);
}

#[test]
fn lanes_are_skipped_for_other_shapes() {
    let host = RefHost::new();
    let stmt = statement(vec![int_seq(1), int_seq(2), Pattern::Wildcard]);
    let [(naive, naive_events), (lanes, lane_events)] = both(&host, &stmt, &Value::int(0));
    assert_eq!(naive.unwrap().clause(), Some(2));
    assert_eq!(lanes.unwrap().clause(), Some(2));
    assert!(naive_events.is_empty());
    assert!(lane_events.is_empty());
}

#[test]
fn mapping_lane_matches_naive_order() {
    let host = RefHost::new();
    let (a, b, v) = (host.intern("a"), host.intern("b"), host.intern("v"));
    let stmt = statement(vec![
        Pattern::mapping(vec![(Literal::Str(a), Pattern::Literal(Literal::Int(0)))], None),
        Pattern::mapping(vec![(Literal::Str(b), Pattern::Wildcard)], None),
        Pattern::mapping(vec![(Literal::Str(a), Pattern::Capture(v))], None),
    ]);
    let subject = Value::dict(vec![(Value::string("a"), Value::int(5))]);
    let [(naive, naive_events), (lanes, lane_events)] = both(&host, &stmt, &subject);
    let naive = naive.unwrap();
    assert_eq!(naive.clause(), Some(2));
    assert_eq!(naive.binding(v), Some(&Value::int(5)));
    assert_eq!(lanes.unwrap(), naive);
    assert_eq!(naive_events, lane_events);
    assert_eq!(
        naive_events,
        vec![HostEvent::MappingEntries(cm_value::builtin::DICT), HostEvent::Equals]
    );
}

#[test]
fn guard_failure_moves_to_next_clause() {
    let mut host = RefHost::new();
    let n = host.intern("n");
    let big = host.add_guard(Guard::IntAbove { name: n, bound: 10 });
    let clauses = vec![
        CaseClause::new(Pattern::seq(vec![Pattern::Capture(n)]), BodyRef::new(0)).with_guard(big),
        CaseClause::new(Pattern::seq(vec![Pattern::Capture(n)]), BodyRef::new(1)),
    ];
    let stmt = MatchStatement::new(ExprRef::new(0), clauses);
    let subject = Value::list(vec![Value::int(3)]);
    let [(naive, naive_events), (lanes, lane_events)] = both(&host, &stmt, &subject);
    let naive = naive.unwrap();
    assert_eq!(naive.clause(), Some(1));
    assert_eq!(naive.binding(n), Some(&Value::int(3)));
    assert_eq!(lanes.unwrap(), naive);
    assert_eq!(naive_events, lane_events);
}

#[test]
fn hard_errors_abort_the_statement() {
    let mut host = RefHost::new();
    let guard = host.add_guard(Guard::Raise("guard blew up".to_owned()));
    let clauses = vec![
        CaseClause::new(Pattern::Wildcard, BodyRef::new(0)).with_guard(guard),
        CaseClause::new(Pattern::Wildcard, BodyRef::new(1)),
    ];
    let stmt = MatchStatement::new(ExprRef::new(0), clauses);
    let [(naive, _), (lanes, _)] = both(&host, &stmt, &Value::None);
    assert!(naive.unwrap_err().is_host_error());
    assert!(lanes.unwrap_err().is_host_error());
}

#[test]
fn no_match() {
    let host = RefHost::new();
    let stmt = statement(vec![int_seq(1), int_seq(2)]);
    let subject = Value::list(vec![]);
    let [(naive, naive_events), (lanes, lane_events)] = both(&host, &stmt, &subject);
    assert_eq!(naive.unwrap(), MatchOutcome::NoMatch);
    assert_eq!(lanes.unwrap(), MatchOutcome::NoMatch);
    assert_eq!(naive_events, lane_events);
}
