//! Benchmarks for bag stacking queries.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::IVec3;
use packline_core::ItemId;
use packline_grid::{GridOccupancy3d, Shape};

fn half_full_bag() -> GridOccupancy3d {
    let size = IVec3::new(16, 16, 16);
    let mut grid = GridOccupancy3d::new(size).unwrap();
    let mut id = 0;
    for z in 0..size.z {
        for x in 0..size.x {
            for y in 0..(x + z) % 8 {
                id += 1;
                grid.occupy_cells(&[IVec3::new(x, y, z)], ItemId(id));
            }
        }
    }
    grid
}

fn stacking_benchmark(c: &mut Criterion) {
    let grid = half_full_bag();
    let shape = Shape::cuboid(IVec3::new(3, 2, 2)).unwrap();

    c.bench_function("lowest_y_3x2x2_sweep", |b| {
        b.iter(|| {
            let mut found = 0;
            for z in 0..14 {
                for x in 0..14 {
                    if grid.find_lowest_available_y(x, z, black_box(&shape)).is_some() {
                        found += 1;
                    }
                }
            }
            black_box(found)
        })
    });

    let cells = shape.cells_at(IVec3::new(4, 9, 4));
    c.bench_function("can_remove_3x2x2", |b| {
        b.iter(|| black_box(grid.can_remove(ItemId(u64::MAX), black_box(&cells))))
    });
}

criterion_group!(benches, stacking_benchmark);
criterion_main!(benches);
