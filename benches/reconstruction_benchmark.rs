use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stream_path_engine::reconstruction::engine::PathReconstructor;
use stream_path_engine::simulation::generator::{generate_stream, StreamConfig};

fn bench_stream(c: &mut Criterion, name: &str, config: StreamConfig) {
    let snapshot = generate_stream(&config);
    let reconstructor = PathReconstructor::default();

    c.bench_function(name, |b| {
        b.iter(|| reconstructor.reconstruct_transaction(black_box(&snapshot)))
    });
}

fn bench_reconstruct_5_paths(c: &mut Criterion) {
    let config = StreamConfig {
        path_count: 5,
        max_hops: 4,
        seed: Some(1),
        ..Default::default()
    };
    bench_stream(c, "reconstruct_5_paths", config);
}

fn bench_reconstruct_50_paths(c: &mut Criterion) {
    let config = StreamConfig {
        path_count: 50,
        max_hops: 8,
        intermediary_count: 100,
        seed: Some(2),
        ..Default::default()
    };
    bench_stream(c, "reconstruct_50_paths", config);
}

fn bench_reconstruct_capped(c: &mut Criterion) {
    let config = StreamConfig {
        path_count: 250,
        max_hops: 6,
        intermediary_count: 500,
        seed: Some(3),
        ..Default::default()
    };
    bench_stream(c, "reconstruct_250_paths_capped", config);
}

fn bench_reconstruct_circular(c: &mut Criterion) {
    let config = StreamConfig {
        path_count: 20,
        max_hops: 6,
        circular: true,
        seed: Some(4),
        ..Default::default()
    };
    bench_stream(c, "reconstruct_circular_20_paths", config);
}

criterion_group!(
    benches,
    bench_reconstruct_5_paths,
    bench_reconstruct_50_paths,
    bench_reconstruct_capped,
    bench_reconstruct_circular
);
criterion_main!(benches);
