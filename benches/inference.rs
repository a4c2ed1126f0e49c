//! Benchmark suite for the inference engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lexlog::{Atom, ConditionSet, Evaluator, FactStore, Rule, Term};

fn transitive_closure_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "R-reach-base",
            Atom::new("reach", vec![Term::var("X"), Term::var("Y")]),
            vec![Atom::new("edge", vec![Term::var("X"), Term::var("Y")])],
        ),
        Rule::new(
            "R-reach-step",
            Atom::new("reach", vec![Term::var("X"), Term::var("Z")]),
            vec![
                Atom::new("edge", vec![Term::var("X"), Term::var("Y")]),
                Atom::new("reach", vec![Term::var("Y"), Term::var("Z")]),
            ],
        ),
    ]
}

fn chain_facts(len: usize) -> FactStore {
    let mut facts = FactStore::new();
    for i in 0..len {
        facts.insert("edge", vec![format!("n{}", i), format!("n{}", i + 1)]);
    }
    facts
}

fn bench_transitive_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_closure");

    for size in [10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut evaluator = Evaluator::new(
                    transitive_closure_rules(),
                    chain_facts(size),
                    &ConditionSet::new(),
                )
                .unwrap();
                black_box(evaluator.evaluate().unwrap().len())
            });
        });
    }

    group.finish();
}

fn bench_stratified_negation(c: &mut Criterion) {
    let rules = vec![Rule::new(
        "R-single",
        Atom::new("single", vec![Term::var("X")]),
        vec![
            Atom::new("person", vec![Term::var("X")]),
            Atom::negative("married", vec![Term::var("X")]),
        ],
    )];

    let mut facts = FactStore::new();
    for i in 0..1000 {
        facts.insert("person", vec![format!("p{}", i)]);
        if i % 2 == 0 {
            facts.insert("married", vec![format!("p{}", i)]);
        }
    }

    c.bench_function("stratified_negation_1000", |b| {
        b.iter(|| {
            let mut evaluator =
                Evaluator::new(rules.clone(), facts.clone(), &ConditionSet::new()).unwrap();
            black_box(evaluator.evaluate().unwrap().len())
        });
    });
}

fn bench_goal_query(c: &mut Criterion) {
    let mut evaluator = Evaluator::new(
        transitive_closure_rules(),
        chain_facts(100),
        &ConditionSet::new(),
    )
    .unwrap();
    evaluator.evaluate().unwrap();

    c.bench_function("goal_query_chain_100", |b| {
        b.iter(|| {
            black_box(evaluator.query("reach", &[Term::constant("n0"), Term::var("Z")]).len())
        });
    });
}

criterion_group!(
    benches,
    bench_transitive_closure,
    bench_stratified_negation,
    bench_goal_query
);
criterion_main!(benches);
