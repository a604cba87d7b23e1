extern crate formula_core;

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use formula_core::operators::{OpKind, Operator};
use formula_core::plugins::PluginRegistry;
use formula_core::symbols::table::SymbolTable;
use formula_core::symbols::BaseSortKind;
use formula_core::terms::{Term, TermIndex};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn index() -> TermIndex {
    let table = SymbolTable::new("bench", Arc::new(PluginRegistry::empty()));
    TermIndex::new(table, &mut Vec::new()).expect("an empty program has no undefined names")
}

/// A union of `n` disjoint short ranges and a sort.
fn wide_union(index: &TermIndex, n: i64) -> Term {
    (0..n).fold(index.mk_sort(BaseSortKind::NegInteger), |acc, i| {
        let r = index.mk_range((i * 10).into(), (i * 10 + 3).into());
        index.mk_union(&acc, &r)
    })
}

fn criterion_bench_numeric_up(c: &mut Criterion) {
    init();
    let index = index();
    let small = [wide_union(&index, 4), wide_union(&index, 6)];
    let wide = [wide_union(&index, 40), wide_union(&index, 40)];
    for kind in [OpKind::Add, OpKind::Mul, OpKind::Qtnt].iter() {
        c.bench_function(&format!("{} up, small unions", kind), |b| {
            b.iter(|| kind.approximate_up(&index, black_box(&small)))
        });
        c.bench_function(&format!("{} up, widened unions", kind), |b| {
            b.iter(|| kind.approximate_up(&index, black_box(&wide)))
        });
    }
}

fn criterion_bench_string_up(c: &mut Criterion) {
    init();
    let index = index();
    let words = ["alpha", "beta", "gamma", "delta"]
        .iter()
        .fold(index.mk_string(""), |acc, w| {
            index.mk_union(&acc, &index.mk_string(w))
        });
    let args = [words.clone(), words];
    c.bench_function("strJoin up", |b| {
        b.iter(|| OpKind::StrJoin.approximate_up(&index, black_box(&args)))
    });
}

fn criterion_bench_down(c: &mut Criterion) {
    init();
    let index = index();
    let expected = wide_union(&index, 20);
    c.bench_function("+ down", |b| {
        b.iter(|| OpKind::Add.approximate_down(&index, black_box(&expected), &[]))
    });
}

criterion_group!(
    benches,
    criterion_bench_numeric_up,
    criterion_bench_string_up,
    criterion_bench_down
);
criterion_main!(benches);
