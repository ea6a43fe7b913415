// Performance benchmarks for graph construction, chain search and region ranking
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kbnpath::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_random_nodes(n: usize, seed: u64) -> Vec<Node> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let category = ["A", "B", "C"][rng.random_range(0..3)];
            let (x, y) = (rng.random::<f64>(), rng.random::<f64>());
            Node::new(i as i64, x, y, rng.random_range(0.0..100.0)).with_property("cat", category)
        })
        .collect()
}

fn graph_config() -> GraphConfig {
    GraphConfig {
        max_cost: Some(0.2),
        ..Default::default()
    }
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [100, 1000, 3000].iter() {
        let nodes = generate_random_nodes(*size, 42);
        group.bench_with_input(BenchmarkId::new("pairwise_edges", size), size, |b, _| {
            b.iter(|| {
                let graph = SpatialGraph::build(black_box(nodes.clone()), &graph_config()).unwrap();
                black_box(graph.edge_count());
            });
        });
    }

    group.finish();
}

fn benchmark_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");
    let nodes = generate_random_nodes(1000, 7);
    let template = SpatialGraph::build(nodes.clone(), &graph_config()).unwrap();

    for k in [5, 10, 20].iter() {
        group.bench_with_input(BenchmarkId::new("from_max_score", k), k, |b, &k| {
            b.iter_batched(
                || SpatialGraph::build(nodes.clone(), &graph_config()).unwrap(),
                |mut graph| {
                    let mut constraints = ConstraintSet::new();
                    let chain =
                        get_k_best_nodes_from_max_score(&mut graph, k, &mut constraints).unwrap();
                    black_box(chain);
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.bench_function("from_max_score_with_ratio", |b| {
        b.iter_batched(
            || SpatialGraph::build(nodes.clone(), &graph_config()).unwrap(),
            |mut graph| {
                let ratio = CategoricalRatioConstraint::new(
                    CategoricalRatioConfig {
                        property: "cat".to_string(),
                        objectives: [("A".to_string(), 0.5), ("B".to_string(), 0.5)].into(),
                        k: 10,
                    },
                    &template,
                )
                .unwrap();
                let mut constraints = ConstraintSet::new().with(ratio);
                let chain = get_k_best_nodes_from_max_score(&mut graph, 10, &mut constraints);
                black_box(chain.unwrap());
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn benchmark_regions(c: &mut Criterion) {
    let mut group = c.benchmark_group("regions");
    let graph = SpatialGraph::build(generate_random_nodes(3000, 11), &graph_config()).unwrap();

    for overlap in [0.5, 0.75, 0.9].iter() {
        let config = WindowConfig {
            overlap: *overlap,
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::new("rank", overlap), &config, |b, config| {
            b.iter(|| black_box(rank_regions(&graph, 10, config).unwrap().remaining()));
        });
    }

    group.finish();
}

fn benchmark_groups(c: &mut Criterion) {
    let nodes = generate_random_nodes(1000, 3);

    c.bench_function("groups_10_in_5", |b| {
        b.iter_batched(
            || SpatialGraph::build(nodes.clone(), &graph_config()).unwrap(),
            |mut graph| {
                let config = GroupSearchConfig::default();
                let mut constraints = ConstraintSet::new();
                let groups =
                    get_groups_of_k_best_nodes(&mut graph, &config, &mut constraints).unwrap();
                black_box(groups);
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, benchmark_build, benchmark_chain, benchmark_regions, benchmark_groups);
criterion_main!(benches);
