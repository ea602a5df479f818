//! Benchmarks for the flux-form advection kernels.
//!
//! Run with: `cargo bench --bench advection_bench`
//!
//! Times the ρ/ρθ pass followed by the scalar pass for every reconstruction
//! scheme, and the full slow tendency at several grid sizes.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dycore_rs::advection::{AdvectionScheme, FluxAccumulator};
use dycore_rs::boundary::{BoundaryFill, DomainBoundary};
use dycore_rs::config::{SolverConfig, SolverParams};
use dycore_rs::field::{Field, MapFactors};
use dycore_rs::rhs::{DycoreRhs, RhsMode};
use dycore_rs::state::{BaseState, ConsVar, StateVector};
use dycore_rs::time::Integrable;
use dycore_rs::types::{Geometry, Staggering};

const NGHOST: [usize; 3] = [4, 4, 1];

/// Stratified atmosphere with a sheared, wavy flow.
fn setup_problem(n: usize, nz: usize) -> (Geometry, BaseState, StateVector) {
    let geom = Geometry::uniform([n, n, nz], [500.0, 500.0, 100.0]);
    let base = BaseState::isentropic(&geom, NGHOST, None, 300.0, 1.0e5);
    let mut state = StateVector::new(geom.domain, ConsVar::NUM_DRY, NGHOST);
    base.initialize(&mut state);

    let kx = 2.0 * std::f64::consts::PI / n as f64;
    let g = state.xmom.grown_box();
    state
        .xmom
        .for_each_mut(&g, 0..1, |_, j, k, _, v| *v = 10.0 + 0.1 * k as f64 + (kx * j as f64).sin());
    let g = state.ymom.grown_box();
    state.ymom.for_each_mut(&g, 0..1, |i, _, _, _, v| *v = 2.0 * (kx * i as f64).cos());
    let top = geom.domain.hi[2] + 1;
    let g = state.zmom.grown_box();
    state.zmom.for_each_mut(&g, 0..1, |i, j, k, _, v| {
        *v = if k <= 0 || k >= top {
            0.0
        } else {
            0.2 * (kx * (i + j) as f64).sin()
        }
    });
    let g = state.cons.grown_box();
    let sc = ConsVar::RhoScalar.index();
    state
        .cons
        .for_each_mut(&g, sc..sc + 1, |i, j, _, _, v| *v = if (i + j) % 7 == 0 { 1.0 } else { 0.0 });
    let _ = DomainBoundary::periodic().fill(&mut state, 0.0, false);

    (geom, base, state)
}

fn config_for(dycore: AdvectionScheme, scalar: AdvectionScheme) -> SolverConfig {
    let params = SolverParams {
        use_gravity: true,
        dycore_horiz_adv_type: dycore.name().to_string(),
        dycore_vert_adv_type: dycore.name().to_string(),
        dryscal_horiz_adv_type: scalar.name().to_string(),
        dryscal_vert_adv_type: scalar.name().to_string(),
        ..Default::default()
    };
    SolverConfig::from_params(&params).expect("valid benchmark configuration")
}

/// Benchmark the scalar transport passes per scheme.
fn bench_scalar_schemes(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar_advection");
    group.sample_size(30);

    let (geom, base, state) = setup_problem(32, 20);
    let mf = MapFactors::unity(&geom.domain, [NGHOST[0], NGHOST[1]]);

    for scheme in AdvectionScheme::ALL {
        let dycore = if scheme.is_weno() {
            AdvectionScheme::Upwind5th
        } else {
            scheme
        };
        let config = config_for(dycore, scheme);
        let rhs = DycoreRhs::new(&config, &geom, &base, &mf);
        let mut avg = FluxAccumulator::new(&geom.domain, [0, 0, 0]);
        let mut src = Field::new(geom.domain, Staggering::CellCentered, ConsVar::NUM_DRY, [0, 0, 0]);

        group.bench_with_input(BenchmarkId::new("scheme", scheme.name()), &scheme, |b, _| {
            b.iter(|| {
                avg.reset();
                let _ = rhs.rho_theta_pass(black_box(&state), 1.0, &mut avg, &mut src);
                let _ = rhs.scalar_pass(black_box(&state), &avg, &mut src);
            });
        });
    }

    group.finish();
}

/// Benchmark the full slow tendency at different grid sizes.
fn bench_full_tendency(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_tendency");
    group.sample_size(20);

    let config = config_for(AdvectionScheme::Upwind3rd, AdvectionScheme::Weno5);
    for n in [16, 32, 64] {
        let (geom, base, state) = setup_problem(n, 20);
        let mf = MapFactors::unity(&geom.domain, [NGHOST[0], NGHOST[1]]);
        let rhs = DycoreRhs::new(&config, &geom, &base, &mf);
        let mut avg = FluxAccumulator::new(&geom.domain, [0, 0, 0]);
        let mut tendency = state.zeros_like();

        group.bench_with_input(BenchmarkId::new("cells", format!("{n}x{n}x20")), &n, |b, _| {
            b.iter(|| {
                let _ = rhs.evaluate(black_box(&state), RhsMode::Full, 1.0, &mut avg, &mut tendency);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scalar_schemes, bench_full_tendency);
criterion_main!(benches);
