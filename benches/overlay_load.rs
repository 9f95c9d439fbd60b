//! Benchmarks for loading mappings and detecting conflicts.
//!
//! These benchmarks run against `MemoryFS` so they measure tree expansion
//! and conflict graph maintenance, not disk access.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use repo_overlay::filesystem::MemoryFS;
use repo_overlay::mapping::PathMapping;
use repo_overlay::overlay::Overlay;
use repo_overlay::package::{Package, PackageRegistry};

/// Creates `packages` packages, each holding `files` files under `resources/`.
fn create_packages(packages: usize, files: usize) -> (MemoryFS, PackageRegistry) {
    let mut fs = MemoryFS::new();
    let mut list = Vec::with_capacity(packages);
    for p in 0..packages {
        let base = format!("/packages/p{}", p);
        for i in 0..files {
            fs.add_file(format!("{}/resources/dir{}/file{}.txt", base, i / 20, i))
                .unwrap();
        }
        list.push(Package::new(format!("vendor/p{}", p), base).unwrap());
    }
    (fs, PackageRegistry::from_packages(list).unwrap())
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping_load");

    for files in [10, 100, 1000] {
        let (fs, registry) = create_packages(1, files);
        let package = registry.lookup("vendor/p0").unwrap().clone();
        group.bench_with_input(BenchmarkId::new("files", files), &files, |b, _| {
            b.iter(|| {
                let mut mapping = PathMapping::new("/app", vec!["resources", "missing"]).unwrap();
                mapping
                    .load(black_box(&package), &registry, &fs)
                    .unwrap();
                mapping
            })
        });
    }

    group.finish();
}

fn bench_detect_conflicts(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_conflicts");

    for packages in [2, 10, 50] {
        let (fs, registry) = create_packages(packages, 10);
        group.bench_with_input(
            BenchmarkId::new("packages", packages),
            &packages,
            |b, _| {
                b.iter(|| {
                    let mut overlay = Overlay::new();
                    for package in registry.iter() {
                        let id = overlay.insert_mapping(PathMapping::new("/app", "resources").unwrap());
                        overlay.load(id, package, &registry, &fs).unwrap();
                    }
                    black_box(overlay.detect_conflicts().unwrap())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_detect_conflicts);
criterion_main!(benches);
