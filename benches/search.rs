//! Benchmarks for the packing search engine.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use blockpack::{footprint::Cell, order_blocks, search, CarrierGrid, Footprint, SearchOptions};

fn solid(id: &str, w: i32, h: i32) -> Footprint {
    let mut cells: Vec<Cell> = Vec::new();
    for x in 0..w {
        for y in 0..h {
            cells.push((x, y, (0, 1, 0)));
        }
    }
    Footprint::new(id, &cells).unwrap()
}

fn sample_blocks() -> Vec<Footprint> {
    order_blocks(vec![
        solid("A", 6, 4),
        solid("B", 5, 5),
        solid("C", 4, 3),
        solid("D", 3, 3),
        solid("E", 2, 6),
        solid("F", 3, 2),
    ])
}

fn bench_search(c: &mut Criterion) {
    c.bench_function("search_small_fleet", |b| {
        b.iter(|| {
            let grid = CarrierGrid::new(20, 10, 0, 0, 0, 1).unwrap();
            let blocks = sample_blocks();
            black_box(search(grid, "bench", &blocks, SearchOptions::default()))
        })
    });
}

fn bench_candidate_generation(c: &mut Criterion) {
    let grid = CarrierGrid::new(20, 10, 0, 0, 0, 1).unwrap();
    let fp = solid("A", 6, 4);
    c.bench_function("candidate_generate_first_block", |b| {
        b.iter(|| black_box(blockpack::candidate::generate(&grid, &fp, None, true)))
    });
}

criterion_group!(benches, bench_search, bench_candidate_generation);
criterion_main!(benches);
