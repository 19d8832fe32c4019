use ch_engine::cch::Cch;
use ch_engine::constants::INFINITY;
use ch_engine::graph::VertexId;
use ch_engine::node_contraction::NodeContractor;
use ch_engine::search::dijkstra::Dijkstra;
use ch_engine::util::test_graphs::grid_graph;
use criterion::{criterion_group, criterion_main, Criterion};
use rand::prelude::*;

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn criterion_benchmark(c: &mut Criterion) {
    const WIDTH: i64 = 20;
    const HEIGHT: i64 = 20;

    let g = grid_graph(WIDTH, HEIGHT);
    let num_vertices = WIDTH * HEIGHT;

    let ch = NodeContractor::new(&g).run();

    let order: Vec<VertexId> = (0..num_vertices).collect();
    let mut cch = Cch::preprocess(&g, &order).unwrap();
    cch.customize(&g);

    let mut rng = rand::thread_rng();
    let pairs: Vec<(VertexId, VertexId)> = (0..64)
        .map(|_| {
            (
                rng.gen_range(0..num_vertices),
                rng.gen_range(0..num_vertices),
            )
        })
        .collect();

    let mut group = c.benchmark_group("query_time");

    group.bench_function("dijkstra", |b| {
        b.iter(|| {
            for &(source, target) in &pairs {
                let _ = Dijkstra::new(&g).search(source, target, INFINITY, None);
            }
        })
    });

    group.bench_function("ch", |b| {
        b.iter(|| {
            for &(source, target) in &pairs {
                let _ = ch.query(source, target);
            }
        })
    });

    group.bench_function("cch", |b| {
        b.iter(|| {
            for &(source, target) in &pairs {
                let _ = cch.query(source, target);
            }
        })
    });

    group.finish();
}
