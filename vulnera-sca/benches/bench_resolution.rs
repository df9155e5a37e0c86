//! Benchmarks for dependency resolution and fix resolution

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vulnera_sca::{DependencyGraph, Package, RawVulnerability, resolve_dependencies, resolve_fixed_versions};

/// Layered graph: every package depends on the next `fan_out` packages
fn layered(count: usize, fan_out: usize) -> (Vec<Package>, DependencyGraph) {
    let packages: Vec<Package> = (0..count)
        .map(|i| {
            let p = Package::new(format!("pkg-{}", i), "1.0.0");
            if i % 50 == 0 { p.as_root() } else { p }
        })
        .collect();

    let mut graph = DependencyGraph::new(count);
    for from in 0..count {
        for to in (from + 1)..(from + 1 + fan_out).min(count) {
            let _ = graph.add_edge(from, to);
        }
    }
    (packages, graph)
}

fn bench_dependency_resolution(c: &mut Criterion) {
    let (packages, graph) = layered(2_000, 4);
    let vulnerabilities: Vec<RawVulnerability> = (0..2_000)
        .step_by(7)
        .map(|i| RawVulnerability::new(format!("pkg-{}", i), "1.0.0", format!("CVE-2024-{}", i)))
        .collect();

    c.bench_function("resolve_dependencies_2000", |b| {
        b.iter(|| {
            let _ = resolve_dependencies(
                black_box(&packages),
                Some(black_box(&graph)),
                black_box(&vulnerabilities),
            );
        });
    });
}

fn bench_fix_resolution(c: &mut Criterion) {
    let status = "fixed in 1.2.4, 1.3.0, 2.0.0-rc.1, 0.9.9";

    c.bench_function("resolve_fixed_versions", |b| {
        b.iter(|| resolve_fixed_versions(black_box("1.2.3"), Some(black_box(status))));
    });
}

criterion_group!(benches, bench_dependency_resolution, bench_fix_resolution);
criterion_main!(benches);
