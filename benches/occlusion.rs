use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use softcull::prelude::*;
use softcull::render::{EdgeRounding, Rasterizer, ScanlineRasterizer, Triangle};

const BUFFER_WIDTH: u32 = 256;
const BUFFER_HEIGHT: u32 = 128;

fn small_triangle() -> Triangle {
    Triangle::new([
        Vec3::new(100.0, 50.0, 2.0),
        Vec3::new(120.0, 50.0, 2.0),
        Vec3::new(110.0, 70.0, 2.0),
    ])
}

fn large_triangle() -> Triangle {
    Triangle::new([
        Vec3::new(10.0, 5.0, 2.0),
        Vec3::new(250.0, 20.0, 3.0),
        Vec3::new(120.0, 125.0, 4.0),
    ])
}

fn camera() -> Camera {
    let mut camera = Camera::perspective(
        60f32.to_radians(),
        BUFFER_WIDTH as f32 / BUFFER_HEIGHT as f32,
        0.1,
        100.0,
    );
    camera.look_at(Vec3::new(0.0, 1.5, 8.0), Vec3::new(0.0, 1.0, 0.0), Vec3::UP);
    camera
}

fn scene() -> (Vec<Entity>, Vec<Entity>) {
    let occluders = (0..8)
        .map(|i| {
            let position = Vec3::new(i as f32 * 2.0 - 7.0, 1.0, -(i % 3) as f32);
            Entity::new(format!("wall_{i}"), Transform::from_position(position))
                .with_occluder(OccluderMesh::cuboid(Vec3::new(0.8, 1.0, 0.2)))
        })
        .collect();

    let occludees = (0..200)
        .map(|i| {
            let position = Vec3::new((i % 20) as f32 - 10.0, 0.5, -2.0 - (i / 20) as f32);
            let entity = Entity::new(format!("prop_{i}"), Transform::from_position(position));
            if i % 2 == 0 {
                entity.with_bound(BoundingVolume::sphere(0.4))
            } else {
                entity.with_bound(BoundingVolume::cuboid(Vec3::new(0.3, 0.3, 0.3)))
            }
        })
        .collect();

    (occluders, occludees)
}

fn benchmark_single_triangle(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_triangle");

    for rounding in [EdgeRounding::Nearest, EdgeRounding::Shrink] {
        let rasterizer = ScanlineRasterizer::with_occluder_rounding(rounding);
        for (name, triangle) in [("small", small_triangle()), ("large", large_triangle())] {
            let id = BenchmarkId::new(format!("fill_{rounding:?}"), name);
            group.bench_with_input(id, &triangle, |b, tri| {
                let mut depth = DepthBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT).unwrap();
                b.iter(|| {
                    let mut target = depth.target();
                    rasterizer.fill_triangle(black_box(tri), &mut target);
                });
            });
        }
    }

    let rasterizer = ScanlineRasterizer::new();
    let mut depth = DepthBuffer::new(BUFFER_WIDTH, BUFFER_HEIGHT).unwrap();
    rasterizer.fill_triangle(&large_triangle(), &mut depth.target());
    group.bench_function("test_occluded", |b| {
        let view = depth.view();
        let behind = Triangle::new(small_triangle().points.map(|p| Vec3::new(p.x, p.y, 10.0)));
        b.iter(|| rasterizer.is_triangle_occluded(black_box(&behind), &view));
    });

    group.finish();
}

fn benchmark_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let camera = camera();
    let (occluders, occludees) = scene();

    for box_test in [BoxTest::Rasterized, BoxTest::ClippedRectangle] {
        let config = OcclusionConfig::new(BUFFER_WIDTH, BUFFER_HEIGHT).with_box_test(box_test);
        let mut renderer = SoftwareRenderer::new(config).unwrap();

        group.bench_function(BenchmarkId::new("render_and_cull", box_test), |b| {
            b.iter(|| {
                let mut visible = occludees.clone();
                let pass = renderer.render(black_box(&camera), &occluders);
                pass.perform_occlusion_culling(&mut visible)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_single_triangle, benchmark_frame);
criterion_main!(benches);
