use pretty_assertions::assert_eq;

use super::*;
use cm_canon::ProblemKind;
use cm_ir::{BodyRef, CaseClause, ExprRef, KindFlags, Literal, Name, Pattern};
use cm_value::{ClassDef, Guard, HostEvent, RefHost, Value};

const STRATEGIES: [MatchStrategy; 2] = [MatchStrategy::Naive, MatchStrategy::Lanes];

fn clauses(patterns: Vec<Pattern>) -> Vec<CaseClause> {
    patterns
        .into_iter()
        .enumerate()
        .map(|(i, p)| CaseClause::new(p, BodyRef::new(u32::try_from(i).unwrap())))
        .collect()
}

/// Evaluate under both strategies; both must agree on outcome and host
/// events. Returns the outcome and the event log.
fn agree(
    host: &RefHost,
    compiled: &CompiledMatch,
    subject: &Value,
) -> (MatchOutcome<Value>, Vec<HostEvent>) {
    let mut results = STRATEGIES.map(|strategy| {
        let engine = MatchEngine::default();
        let mut host = host.clone();
        let outcome = engine
            .match_value_with(strategy, &mut host, compiled, subject)
            .unwrap();
        (outcome, host.take_events())
    });
    assert_eq!(results[0], results[1]);
    std::mem::replace(&mut results[0], (MatchOutcome::NoMatch, Vec::new()))
}

fn binding(outcome: &MatchOutcome<Value>, name: Name) -> Value {
    outcome.binding(name).cloned().unwrap()
}

#[test]
fn execute_evaluates_subject_once() {
    let mut host = RefHost::new();
    let subject = host.add_value(Value::int(4));
    let engine = MatchEngine::new(EngineConfig::default());
    let compiled = engine.compile(MatchStatement::new(
        subject,
        clauses(vec![Pattern::Literal(Literal::Int(3)), Pattern::Wildcard]),
    ));
    let outcome = engine.execute(&mut host, &compiled).unwrap();
    assert_eq!(outcome.clause(), Some(1));
    assert_eq!(host.count(|e| matches!(e, HostEvent::EvalValue(_))), 1);
}

#[test]
fn star_binding() {
    let host = RefHost::new();
    let [a, b, c] = ["a", "b", "c"].map(|s| host.intern(s));
    let pattern = Pattern::seq_with_star(
        vec![Pattern::Capture(a), Pattern::Capture(b), Pattern::Capture(c)],
        1,
    );
    let compiled = MatchEngine::default().compile(MatchStatement::new(
        ExprRef::new(0),
        clauses(vec![pattern]),
    ));
    let subject = Value::list([1, 2, 3, 4].map(Value::int).to_vec());
    let (outcome, _) = agree(&host, &compiled, &subject);
    assert_eq!(binding(&outcome, a), Value::int(1));
    assert_eq!(binding(&outcome, b), Value::list(vec![Value::int(2), Value::int(3)]));
    assert_eq!(binding(&outcome, c), Value::int(4));
}

#[test]
fn mapping_rest_capture() {
    let host = RefHost::new();
    let [x, y, rest] = ["x", "y", "rest"].map(|s| host.intern(s));
    let pattern = Pattern::mapping(
        vec![
            (Literal::Str(x), Pattern::Capture(x)),
            (Literal::Str(y), Pattern::Capture(y)),
        ],
        Some(rest),
    );
    let compiled = MatchEngine::default().compile(MatchStatement::new(
        ExprRef::new(0),
        clauses(vec![pattern]),
    ));
    let subject = Value::dict(vec![
        (Value::string("x"), Value::int(1)),
        (Value::string("y"), Value::int(2)),
        (Value::string("z"), Value::int(3)),
    ]);
    let (outcome, _) = agree(&host, &compiled, &subject);
    assert_eq!(binding(&outcome, x), Value::int(1));
    assert_eq!(binding(&outcome, y), Value::int(2));
    assert_eq!(
        binding(&outcome, rest),
        Value::dict(vec![(Value::string("z"), Value::int(3))])
    );
}

#[test]
fn guard_short_circuit_does_not_leak_bindings() {
    let mut host = RefHost::new();
    let [x, y, other] = ["x", "y", "other"].map(|s| host.intern(s));
    let guard = host.add_guard(Guard::IntAbove { name: x, bound: 2 });
    let first = Pattern::mapping(
        vec![
            (Literal::Str(x), Pattern::Capture(x)),
            (Literal::Str(y), Pattern::Capture(y)),
        ],
        None,
    );
    let stmt = MatchStatement::new(
        ExprRef::new(0),
        vec![
            CaseClause::new(first, BodyRef::new(0)).with_guard(guard),
            CaseClause::new(Pattern::Capture(other), BodyRef::new(1)),
        ],
    );
    let compiled = MatchEngine::default().compile(stmt);
    let subject = Value::dict(vec![
        (Value::string("x"), Value::int(1)),
        (Value::string("y"), Value::int(5)),
    ]);
    let (outcome, events) = agree(&host, &compiled, &subject);
    assert_eq!(outcome.clause(), Some(1));
    assert_eq!(outcome.binding(x), None);
    assert_eq!(outcome.binding(y), None);
    assert_eq!(binding(&outcome, other), subject);
    assert_eq!(events.iter().filter(|e| matches!(e, HostEvent::Guard(_))).count(), 1);
}

#[test]
fn positional_class_never_fetches_attributes() {
    let mut host = RefHost::new();
    let [a, b] = ["a", "b"].map(|s| host.intern(s));
    let cls = host
        .define_class(ClassDef::new(host.intern("Cls")).with_kind(KindFlags::POSITIONAL))
        .unwrap();
    let compiled = MatchEngine::default().compile(MatchStatement::new(
        ExprRef::new(0),
        clauses(vec![Pattern::class(
            cls,
            vec![Pattern::Capture(a), Pattern::Capture(b)],
            vec![],
        )]),
    ));
    let subject = host.instance(cls, &[], vec![Value::int(1), Value::int(2)]);
    let (outcome, events) = agree(&host, &compiled, &subject);
    assert_eq!(binding(&outcome, a), Value::int(1));
    assert_eq!(binding(&outcome, b), Value::int(2));
    assert!(!events.iter().any(|e| matches!(e, HostEvent::GetAttr { .. })));
}

#[test]
fn default_class_fetches_attribute_once_across_clauses() {
    let mut host = RefHost::new();
    let [x, p] = ["x", "p"].map(|s| host.intern(s));
    let cls = host.define_class(ClassDef::new(host.intern("Cls"))).unwrap();
    let compiled = MatchEngine::default().compile(MatchStatement::new(
        ExprRef::new(0),
        clauses(vec![
            Pattern::class(cls, vec![], vec![(x, Pattern::Literal(Literal::Int(0)))]),
            Pattern::class(cls, vec![], vec![(x, Pattern::Capture(p))]),
        ]),
    ));
    let subject = host.instance(cls, &[("x", Value::int(1))], vec![]);
    let (outcome, events) = agree(&host, &compiled, &subject);
    assert_eq!(outcome.clause(), Some(1));
    assert_eq!(binding(&outcome, p), Value::int(1));
    assert_eq!(
        events.iter().filter(|e| matches!(e, HostEvent::GetAttr { .. })).count(),
        1
    );
}

#[test]
fn views_are_realized_once_per_statement() {
    let host = RefHost::new();
    let n = host.intern("n");
    let compiled = MatchEngine::default().compile(MatchStatement::new(
        ExprRef::new(0),
        clauses(vec![
            Pattern::seq(vec![Pattern::Literal(Literal::Int(9))]),
            Pattern::seq(vec![Pattern::Wildcard, Pattern::Wildcard]),
            Pattern::Literal(Literal::Int(0)),
            Pattern::seq(vec![Pattern::Capture(n)]),
        ]),
    ));
    let subject = Value::tuple(vec![Value::int(1)]);
    let (outcome, events) = agree(&host, &compiled, &subject);
    assert_eq!(outcome.clause(), Some(3));
    assert_eq!(
        events.iter().filter(|e| matches!(e, HostEvent::SequenceView(_))).count(),
        1
    );
}

#[test]
fn compile_reports_problems_and_keeps_running() {
    let host = RefHost::new();
    let a = host.intern("a");
    let engine = MatchEngine::default();
    let compiled = engine.compile(MatchStatement::new(
        ExprRef::new(0),
        clauses(vec![
            Pattern::seq(vec![Pattern::Capture(a), Pattern::Capture(a)]),
            Pattern::Wildcard,
            Pattern::Literal(Literal::Int(1)),
        ]),
    ));
    let kinds: Vec<_> = compiled.problems().iter().map(|p| p.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            ProblemKind::DuplicateBinding(a),
            ProblemKind::Unreachable { shadowed_by: 1 }
        ]
    );
    let (outcome, _) = agree(&host, &compiled, &Value::int(1));
    assert_eq!(outcome.clause(), Some(1));
}

#[test]
fn hard_errors_reach_the_caller() {
    let mut host = RefHost::new();
    let z = host.intern("z");
    let cls = host
        .define_class(ClassDef::new(host.intern("Cls")).with_kind(KindFlags::POSITIONAL))
        .unwrap();
    let compiled = MatchEngine::default().compile(MatchStatement::new(
        ExprRef::new(0),
        clauses(vec![
            Pattern::class(cls, vec![], vec![(z, Pattern::Wildcard)]),
            Pattern::Wildcard,
        ]),
    ));
    let subject = host.instance(cls, &[], vec![]);
    for strategy in STRATEGIES {
        let engine = MatchEngine::default();
        let err = engine
            .match_value_with(strategy, &mut host.clone(), &compiled, &subject)
            .unwrap_err();
        assert_eq!(err, MatchError::UnknownKeyword { name: z, class: cls });
        assert_eq!(
            err.describe(host.names()),
            format!("keyword `z` is not among the declared attributes of {cls:?}")
        );
    }
}

#[test]
fn depth_limit_from_config() {
    let host = RefHost::new();
    let engine = MatchEngine::new(EngineConfig::default().with_max_depth(1));
    let compiled = engine.compile(MatchStatement::new(
        ExprRef::new(0),
        clauses(vec![Pattern::seq(vec![Pattern::Wildcard])]),
    ));
    let subject = Value::list(vec![Value::int(1)]);
    assert_eq!(
        engine.match_value(&mut host.clone(), &compiled, &subject),
        Err(MatchError::DepthLimit { limit: 1 })
    );
}

#[test]
fn zero_depth_limit_is_unlimited_for_both_strategies() {
    let host = RefHost::new();
    let a = host.intern("a");
    let compiled = MatchEngine::default().compile(MatchStatement::new(
        ExprRef::new(0),
        clauses(vec![
            Pattern::seq(vec![Pattern::Capture(a)]),
            Pattern::seq(vec![Pattern::Capture(a), Pattern::Wildcard]),
        ]),
    ));
    let subject = Value::int(3);

    let built = MatchEngine::new(EngineConfig::default().with_max_depth(0));
    assert_eq!(built.config().max_depth, None);
    let raw = MatchEngine::new(EngineConfig {
        max_depth: Some(0),
        ..EngineConfig::default()
    });
    for engine in [built, raw] {
        let outcomes = STRATEGIES.map(|strategy| {
            let mut host = host.clone();
            let outcome = engine.match_value_with(strategy, &mut host, &compiled, &subject);
            (outcome, host.take_events())
        });
        assert_eq!(outcomes[0], outcomes[1]);
        assert_eq!(outcomes[0].0, Ok(MatchOutcome::NoMatch));
    }
}
