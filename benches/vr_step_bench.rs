//! Benchmarks for VR reconstruction, RHS evaluation and time stepping.
//!
//! Run with: `cargo bench --bench vr_step_bench`

use std::f64::consts::PI;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vr_fv::boundary::{BoundaryManager, EdgeCouplings};
use vr_fv::flux::LinearUpwind2D;
use vr_fv::mesh::Mesh2D;
use vr_fv::operators::{RelaxationConfig, VrConfig, VrOperators2D};
use vr_fv::solver::{VrRhsConfig, VrSolution2D, compute_rhs_vr_2d, relax_coefficients};
use vr_fv::time::ssp_rk3_vr_step;

#[cfg(feature = "parallel")]
use vr_fv::time::ssp_rk3_vr_step_parallel;

/// Periodic unit square with a smooth initial state.
fn setup_problem(n: usize, degree: usize) -> (Mesh2D, EdgeCouplings, VrOperators2D, VrSolution2D<f64>) {
    let mesh = Mesh2D::uniform_triangles(0.0, 1.0, 0.0, 1.0, n, n).unwrap();
    let couplings = BoundaryManager::periodic_box(&mesh)
        .unwrap()
        .finalize(&mesh)
        .unwrap();
    let ops = VrOperators2D::assemble(&mesh, &couplings, &VrConfig::new(degree)).unwrap();
    let mut q = VrSolution2D::for_operators(&ops);
    for cell in mesh.cells() {
        let p = cell.centroid;
        q.set_average(cell.id, (2.0 * PI * p.x).sin() * (2.0 * PI * p.y).cos());
    }
    (mesh, couplings, ops, q)
}

/// Benchmark operator assembly per degree.
fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");

    for degree in [1, 2, 3] {
        let (mesh, couplings, _, _) = setup_problem(16, degree);
        group.bench_with_input(BenchmarkId::new("degree", degree), &degree, |b, &d| {
            b.iter(|| {
                VrOperators2D::assemble(black_box(&mesh), black_box(&couplings), &VrConfig::new(d))
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark one relaxation pass and one RHS evaluation.
fn bench_rhs(c: &mut Criterion) {
    let mut group = c.benchmark_group("rhs");
    let solver = LinearUpwind2D::new((1.0, 0.5));

    for n in [8, 16, 32] {
        let (mesh, couplings, ops, q) = setup_problem(n, 3);
        let config = VrRhsConfig::new(&couplings, &solver);
        let n_cells = mesh.n_cells();

        group.bench_with_input(BenchmarkId::new("relax", n_cells), &n_cells, |b, _| {
            b.iter(|| {
                let mut coefficients = q.coefficients.clone();
                relax_coefficients(
                    black_box(&ops),
                    black_box(&couplings),
                    black_box(q.averages()),
                    &mut coefficients,
                    &RelaxationConfig::default(),
                );
                coefficients
            });
        });

        group.bench_with_input(BenchmarkId::new("fluxes", n_cells), &n_cells, |b, _| {
            b.iter(|| {
                compute_rhs_vr_2d(
                    black_box(&mesh),
                    black_box(&ops),
                    black_box(q.averages()),
                    black_box(&q.coefficients),
                    black_box(&config),
                )
            });
        });
    }

    group.finish();
}

/// Benchmark a full SSP-RK3 step.
fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("ssp_rk3_step");
    group.sample_size(30);
    let solver = LinearUpwind2D::new((1.0, 0.5));

    for n in [8, 16, 32] {
        let (mesh, couplings, ops, q) = setup_problem(n, 3);
        let config = VrRhsConfig::new(&couplings, &solver);
        let n_cells = mesh.n_cells();
        let dt = 0.1 / n as f64;

        group.bench_with_input(BenchmarkId::new("serial", n_cells), &n_cells, |b, _| {
            let mut state = q.clone();
            b.iter(|| ssp_rk3_vr_step(&mut state, black_box(&mesh), black_box(&ops), &config, dt));
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel", n_cells), &n_cells, |b, _| {
            let mut state = q.clone();
            b.iter(|| {
                ssp_rk3_vr_step_parallel(&mut state, black_box(&mesh), black_box(&ops), &config, dt)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_assembly, bench_rhs, bench_step);
criterion_main!(benches);
