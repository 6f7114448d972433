use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shannon_insight::core::blackboard::{Entity, EntityId, FactStore, RelationKind, SignalId, Value};
use shannon_insight::core::config::Config;
use shannon_insight::core::fusion;

fn populated_store(file_count: usize) -> FactStore {
    let mut store = FactStore::new();
    for i in 0..file_count {
        let path = format!("src/file_{i}.rs");
        store.add_entity(Entity::new(EntityId::file(&path), None));
        store.set(&EntityId::file(&path), SignalId::PageRank, Value::Float((i as f64 + 1.0) / file_count as f64));
        store.set(&EntityId::file(&path), SignalId::BlastRadiusSize, Value::Int((i % 7) as i64));
        store.set(&EntityId::file(&path), SignalId::CognitiveLoad, Value::Float((i % 5) as f64 / 5.0));
        store.set(&EntityId::file(&path), SignalId::BusFactor, Value::Float(1.0 + (i % 3) as f64));
        store.set(&EntityId::file(&path), SignalId::StubRatio, Value::Float(0.0));
        store.set(&EntityId::file(&path), SignalId::IsOrphan, Value::Bool(i % 11 == 0));
        if i > 0 {
            let prev = format!("src/file_{}.rs", i - 1);
            store.relations_mut(RelationKind::Imports).add(
                EntityId::file(&path),
                EntityId::file(&prev),
                RelationKind::Imports,
                1.0,
            );
        }
    }
    store
}

fn bench_fusion_analyze(c: &mut Criterion) {
    let config = Config::default();
    let mut group = c.benchmark_group("fusion_analyze");
    for size in [100, 1_000, 5_000] {
        group.bench_with_input(BenchmarkId::new("files", size), &size, |b, &size| {
            b.iter_batched(
                || populated_store(size),
                |mut store| fusion::analyze(black_box(&mut store), black_box(&config)),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fusion_analyze);
criterion_main!(benches);
