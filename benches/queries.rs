use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::{Point3, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use reef::geometry::primitives::Box3;
use reef::spatial_partitioning::{KdTree, Octree, SplitPolicy};

fn criterion_benchmark(c: &mut Criterion) {
    let groups = [10_000, 100_000];

    for count in groups {
        let mut rng = StdRng::seed_from_u64(42);

        let points: Vec<Point3<f32>> = (0..count)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                )
            })
            .collect();

        let boxes: Vec<Box3> = points
            .iter()
            .map(|center| {
                let half = Vector3::new(
                    rng.gen_range(0.1..2.0),
                    rng.gen_range(0.1..2.0),
                    rng.gen_range(0.1..2.0),
                );
                Box3::new(center - half, center + half)
            })
            .collect();

        let queries: Vec<Point3<f32>> = (0..1000)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                )
            })
            .collect();

        let mut kd_tree = KdTree::new();
        kd_tree.build(&points, 16, 24);

        let mut octree = Octree::new();
        octree.build(&boxes, SplitPolicy::default(), 32, 10);

        let mut group = c.benchmark_group(format!("{} elements", count));

        group.bench_function("kd_tree knn", |b| {
            let mut result = Vec::new();
            b.iter(|| {
                for query in &queries {
                    kd_tree.query_knn(query, 8, &mut result);
                }
            });
        });

        group.bench_function("kd_tree radius", |b| {
            let mut result = Vec::new();
            b.iter(|| {
                for query in &queries {
                    kd_tree.query_radius(query, 5.0, &mut result);
                }
            });
        });

        group.bench_function("octree box query", |b| {
            let mut result = Vec::new();
            b.iter(|| {
                for query in &queries {
                    let region = Box3::new(
                        query - Vector3::new(5.0, 5.0, 5.0),
                        query + Vector3::new(5.0, 5.0, 5.0),
                    );
                    octree.query_box3(&region, &mut result);
                }
            });
        });

        group.bench_function("octree knn", |b| {
            let mut result = Vec::new();
            b.iter(|| {
                for query in &queries {
                    octree.query_knn(query, 8, &mut result);
                }
            });
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
