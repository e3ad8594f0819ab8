use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use workmap_core::prelude::*;

fn generate_items(count: u64, max_hours: f64) -> Vec<WorkItem> {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    (0..count)
        .map(|i| {
            let kind = if rng.gen_bool(0.8) { "Task" } else { "Bug" };
            WorkItem::new(
                i,
                kind,
                rng.gen_range(0.0..max_hours),
                rng.gen_range(0.0..max_hours / 2.0),
            )
        })
        .collect()
}

fn bench_layouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_strategies");
    let cfg = LayoutConfig::default();

    for count in [50u64, 200, 1000] {
        let items = generate_items(count, 8.0);
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("Treemap", count), &items, |b, items| {
            b.iter(|| black_box(layout_treemap(items, 800.0, 600.0, &cfg)));
        });

        group.bench_with_input(BenchmarkId::new("Blocks", count), &items, |b, items| {
            b.iter(|| black_box(layout_blocks(items, 800.0, Some(60.0), &cfg)));
        });
    }

    group.finish();
}

fn bench_boards(c: &mut Criterion) {
    let mut group = c.benchmark_group("board_batches");
    let boards: Vec<Board> = (0..64)
        .map(|i| Board::new(format!("board_{i}"), generate_items(120, 6.0)))
        .collect();
    group.throughput(Throughput::Elements(boards.len() as u64));

    let seq = LayoutConfig::default();
    group.bench_function("sequential", |b| {
        b.iter(|| black_box(layout_boards(&boards, &seq)));
    });

    let par = LayoutConfig::builder().parallel(true).build();
    group.bench_function("parallel_flag", |b| {
        b.iter(|| black_box(layout_boards(&boards, &par)));
    });

    group.finish();
}

criterion_group!(benches, bench_layouts, bench_boards);
criterion_main!(benches);
