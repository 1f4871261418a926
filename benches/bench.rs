use criterion::{Criterion, criterion_group, criterion_main};
use meshpds::{
    DistanceNorm, Mesh, Point3, SurfaceParams, VolumeDenseParams, VolumeRandomParams,
};
use std::hint::black_box;

fn sphere() -> Mesh {
    Mesh::create_sphere(1.0, 64, 32)
}

fn surface(c: &mut Criterion) {
    let mesh = sphere();
    let euclidean = SurfaceParams::new(0.05, 10, 40.0, DistanceNorm::Euclidean).with_seed(1);
    let geodesic = SurfaceParams::new(0.05, 10, 40.0, DistanceNorm::Geodesic).with_seed(1);

    c.bench_function("surface_sphere_euclidean", |b| {
        b.iter(|| mesh.sample_poisson_surface(black_box(&euclidean)))
    });
    c.bench_function("surface_sphere_geodesic", |b| {
        b.iter(|| mesh.sample_poisson_surface(black_box(&geodesic)))
    });
}

fn volume(c: &mut Criterion) {
    let mesh = Mesh::create_box(&Point3::origin(), &Point3::new(1.0, 1.0, 1.0));
    let random = VolumeRandomParams::defaults(0.03).with_seed(1);
    let dense = VolumeDenseParams::defaults(0.02);

    c.bench_function("volume_random_box", |b| {
        b.iter(|| mesh.sample_volume_random(black_box(&random)))
    });
    c.bench_function("volume_dense_box", |b| {
        b.iter(|| mesh.sample_volume_dense(black_box(&dense)))
    });
}

criterion_group!(benches, surface, volume);
criterion_main!(benches);
