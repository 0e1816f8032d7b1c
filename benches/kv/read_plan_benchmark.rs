use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use storekit::kv::{Key, MemoryTransport, ReadPlan, ReadShape, Reply, StoreClient};
use std::sync::Arc;

// ========== 辅助函数 ==========

fn generate_keys(n: usize) -> Vec<Key> {
    (0..n)
        .map(|i| Key::build(&["items", format!("{:08}", i).as_str(), "basic"]))
        .collect()
}

fn generate_shapes(n: usize) -> Vec<ReadShape> {
    let cycle = [ReadShape::String, ReadShape::None, ReadShape::Hash, ReadShape::Set];
    (0..n).map(|i| cycle[i % cycle.len()]).collect()
}

fn reply_for(shape: ReadShape, i: usize) -> Reply {
    match shape {
        ReadShape::String => Reply::Text(format!("value_{}", i)),
        ReadShape::Hash => Reply::Array(vec![
            Reply::Text("name".to_string()),
            Reply::Text(format!("item_{}", i)),
        ]),
        ReadShape::Set => Reply::Array(vec![Reply::Text("a".to_string()), Reply::Text("b".to_string())]),
        ReadShape::None => Reply::Nil,
    }
}

// ========== 1. 构建读取计划 ==========

fn benchmark_build_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_plan_build");

    for size in [10, 100, 1000] {
        let keys = generate_keys(size);
        let shapes = generate_shapes(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let plan = ReadPlan::build(black_box(&keys), black_box(&shapes)).unwrap();
                black_box(plan.into_commands())
            })
        });
    }

    group.finish();
}

// ========== 2. 还原结果顺序 ==========

fn benchmark_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_plan_assemble");

    for size in [10, 100, 1000] {
        let keys = generate_keys(size);
        let shapes = generate_shapes(size);
        let replies: Vec<Reply> = shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| **shape != ReadShape::None)
            .map(|(i, shape)| reply_for(*shape, i))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let (_, mapping) = ReadPlan::build(&keys, &shapes).unwrap().into_commands();
                black_box(mapping.assemble(replies.clone()).unwrap())
            })
        });
    }

    group.finish();
}

// ========== 3. 内存传输层上的批量读取 ==========

fn benchmark_pipeline_read(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let client = StoreClient::with_transport(Arc::new(MemoryTransport::new()));

    let size = 100;
    let keys = generate_keys(size);
    let shapes = generate_shapes(size);
    runtime.block_on(async {
        for i in 0..size {
            let id = format!("{:08}", i);
            client
                .set_hash_field(&["items", id.as_str(), "basic"], "name", format!("item_{}", i))
                .await
                .unwrap();
        }
    });

    let hash_shapes = vec![ReadShape::Hash; size];
    c.bench_function("pipeline_read_memory_hash", |b| {
        b.iter(|| {
            runtime.block_on(async {
                black_box(client.pipeline_read(&keys, &hash_shapes).await.unwrap())
            })
        })
    });

    let mixed_keys: Vec<Key> = (0..size).map(|i| Key::raw(format!("missing_{}", i))).collect();
    c.bench_function("pipeline_read_memory_mixed_missing", |b| {
        b.iter(|| {
            runtime.block_on(async {
                black_box(client.pipeline_read(&mixed_keys, &shapes).await.unwrap())
            })
        })
    });
}

criterion_group!(
    benches,
    benchmark_build_plan,
    benchmark_assemble,
    benchmark_pipeline_read
);
criterion_main!(benches);
