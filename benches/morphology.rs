use criterion::{criterion_group, criterion_main, Criterion, black_box};

use voxcube::core::ProgressChannel;
use voxcube::ops::Direction;
use voxcube::voxel::VoxelGrid;

fn create_test_sphere(size: usize, radius: f32) -> VoxelGrid {
    let c = size as f32 / 2.0;
    VoxelGrid::from_fn(size, size, size, |x, y, z| {
        let (dx, dy, dz) = (x as f32 - c, y as f32 - c, z as f32 - c);
        dx * dx + dy * dy + dz * dz <= radius * radius
    })
    .unwrap()
}

fn bench_dilate_64(c: &mut Criterion) {
    let channel = ProgressChannel::silent();
    let sphere = create_test_sphere(64, 24.0);

    c.bench_function("dilate_r2_64", |b| {
        b.iter(|| black_box(&sphere).dilate(black_box(2), 0, false, &channel));
    });
}

fn bench_erode_64(c: &mut Criterion) {
    let channel = ProgressChannel::silent();
    let sphere = create_test_sphere(64, 28.0);

    c.bench_function("erode_r2_64", |b| {
        b.iter(|| black_box(&sphere).erode(black_box(2), 0, false, &channel));
    });
}

fn bench_erode_pyramid_128(c: &mut Criterion) {
    let channel = ProgressChannel::silent();
    let sphere = create_test_sphere(128, 56.0);

    c.bench_function("erode_r4_128_direct", |b| {
        b.iter(|| black_box(&sphere).erode(4, 0, false, &channel));
    });
    c.bench_function("erode_r2_128_scale1", |b| {
        b.iter(|| black_box(&sphere).erode(2, 1, true, &channel));
    });
}

fn bench_projection_128(c: &mut Criterion) {
    let channel = ProgressChannel::silent();
    let sphere = create_test_sphere(128, 56.0);

    c.bench_function("projection_top_128", |b| {
        b.iter(|| black_box(&sphere).projection(Direction::TopBottom, &channel));
    });
    c.bench_function("projection_side_128", |b| {
        b.iter(|| black_box(&sphere).projection(Direction::RightLeft, &channel));
    });
}

criterion_group!(
    benches,
    bench_dilate_64,
    bench_erode_64,
    bench_erode_pyramid_128,
    bench_projection_128,
);
criterion_main!(benches);
