use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use freesql::prelude::*;
use freesql::{meltdown, render};

/// Build `SELECT ... WHERE (c0 = ? OR c1 = ?) AND ...` with `n` bracketed
/// predicate pairs, every other predicate nullable without a value.
fn build_search(n: usize) -> SqlBuilder {
    let mut b = SqlBuilder::new();
    b.select(["id", "name"]).from("t").where_(Vec::<Token>::new());
    for i in 0..n {
        let value = Value::try_from(i).unwrap();
        if i > 0 {
            b.and();
        }
        b.left_bracket()
            .equal(format!("a{i}"))
            .nullable((i % 2 == 0).then(|| value.clone()))
            .or()
            .equal(format!("b{i}"))
            .bind(value)
            .right_bracket();
    }
    b
}

fn bench_meltdown(c: &mut Criterion) {
    let mut group = c.benchmark_group("meltdown/tokens");

    for n in [1, 10, 50, 100, 500] {
        let b = build_search(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), b.tokens(), |bench, tokens| {
            bench.iter(|| black_box(meltdown(tokens)));
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("meltdown/build_and_render");

    for n in [1, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |bench, &n| {
            bench.iter(|| {
                let b = build_search(n);
                black_box(b.build())
            });
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("meltdown/render_melted");

    for n in [10, 100] {
        let b = build_search(n);
        let melted = meltdown(b.tokens()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &melted, |bench, melted| {
            bench.iter(|| black_box(render(melted, b.context())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_meltdown, bench_build, bench_render);
criterion_main!(benches);
