use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shannon_insight::core::graph::{betweenness, louvain, pagerank, tarjan_scc, BetweennessConfig, Csr};

fn build_chain_graph(n: usize) -> Csr {
    let edges: Vec<(usize, usize, f64)> = (0..n.saturating_sub(1)).map(|i| (i, i + 1, 1.0)).collect();
    Csr::build(n, &edges)
}

fn bench_pagerank(c: &mut Criterion) {
    let mut group = c.benchmark_group("pagerank");
    for size in [100, 1_000, 10_000] {
        let graph = build_chain_graph(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &graph, |b, g| {
            b.iter(|| pagerank(black_box(g)));
        });
    }
    group.finish();
}

fn bench_betweenness(c: &mut Criterion) {
    let mut group = c.benchmark_group("betweenness");
    let config = BetweennessConfig::default();
    for size in [100, 1_000] {
        let graph = build_chain_graph(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &graph, |b, g| {
            b.iter(|| betweenness(black_box(g), &config));
        });
    }
    group.finish();
}

fn bench_louvain_and_tarjan(c: &mut Criterion) {
    let mut group = c.benchmark_group("community_and_cycles");
    for size in [100, 1_000] {
        let graph = build_chain_graph(size);
        group.bench_with_input(BenchmarkId::new("louvain", size), &graph, |b, g| {
            b.iter(|| louvain(black_box(g)));
        });
        group.bench_with_input(BenchmarkId::new("tarjan_scc", size), &graph, |b, g| {
            b.iter(|| tarjan_scc(black_box(g)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pagerank, bench_betweenness, bench_louvain_and_tarjan);
criterion_main!(benches);
