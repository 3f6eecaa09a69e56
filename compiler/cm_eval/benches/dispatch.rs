#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Dispatch benchmarks for casematch.
//!
//! Compares naive clause-by-clause evaluation against the lane plan for
//! statements made of many sequence or mapping clauses.

use cm_eval::{CompiledMatch, MatchEngine, MatchStrategy};
use cm_ir::{BodyRef, CaseClause, ExprRef, Literal, MatchStatement, Pattern};
use cm_value::{RefHost, Value};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn statement(patterns: Vec<Pattern>) -> MatchStatement {
    let clauses = patterns
        .into_iter()
        .enumerate()
        .map(|(i, p)| CaseClause::new(p, BodyRef::new(u32::try_from(i).unwrap())))
        .collect();
    MatchStatement::new(ExprRef::new(0), clauses)
}

/// `[_]`, `[_, _]`, ... one clause per length, then a catch-all.
fn sequence_clauses(n: usize) -> Vec<Pattern> {
    (1..=n)
        .map(|len| Pattern::seq(vec![Pattern::Wildcard; len]))
        .chain(std::iter::once(Pattern::Wildcard))
        .collect()
}

/// `{"k0": _}`, `{"k1": _}`, ... one clause per key, then a catch-all.
fn mapping_clauses(host: &RefHost, n: usize) -> Vec<Pattern> {
    (0..n)
        .map(|i| {
            let key = host.intern(&format!("k{i}"));
            Pattern::mapping(vec![(Literal::Str(key), Pattern::Wildcard)], None)
        })
        .chain(std::iter::once(Pattern::Wildcard))
        .collect()
}

fn run(
    engine: &MatchEngine,
    strategy: MatchStrategy,
    host: &mut RefHost,
    compiled: &CompiledMatch,
    subject: &Value,
) {
    let outcome = engine
        .match_value_with(strategy, host, compiled, subject)
        .unwrap();
    black_box(outcome);
    host.take_events();
}

fn bench_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_dispatch");
    let engine = MatchEngine::default();
    let mut host = RefHost::new();

    for n in [4, 16, 64] {
        let compiled = engine.compile(statement(sequence_clauses(n)));
        let subject = Value::list(vec![Value::int(0); n]);
        for strategy in [MatchStrategy::Naive, MatchStrategy::Lanes] {
            group.bench_with_input(BenchmarkId::new(strategy.as_str(), n), &n, |b, _| {
                b.iter(|| run(&engine, strategy, &mut host, &compiled, black_box(&subject)));
            });
        }
    }
    group.finish();
}

fn bench_mappings(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping_dispatch");
    let engine = MatchEngine::default();
    let mut host = RefHost::new();

    for n in [4, 16, 64] {
        let compiled = engine.compile(statement(mapping_clauses(&host, n)));
        let subject = Value::dict(vec![(Value::string(format!("k{}", n - 1)), Value::int(1))]);
        for strategy in [MatchStrategy::Naive, MatchStrategy::Lanes] {
            group.bench_with_input(BenchmarkId::new(strategy.as_str(), n), &n, |b, _| {
                b.iter(|| run(&engine, strategy, &mut host, &compiled, black_box(&subject)));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_sequences, bench_mappings);
criterion_main!(benches);
