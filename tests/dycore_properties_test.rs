//! End-to-end properties of the advection operators and the split
//! integrator.
//!
//! Each test exercises the public API the way a driver would: build a
//! configuration, a state and a right-hand side, then advance or evaluate.

use dycore_rs::advection::{
    AdvectionGrid, AdvectionScheme, FluxAccumulator, Interpolator, advection_src_for_rho_and_theta,
    advection_src_for_scalars,
};
use dycore_rs::equations::{
    EquationOfState, pressure_given_rhotheta, rhotheta_given_pressure, temperature_given_rho_rhotheta,
    theta_given_rho_temperature,
};
use dycore_rs::state::primitives;
use dycore_rs::time::{Integrable, TerrainStep, no_substep_update};
use dycore_rs::types::Direction;
use dycore_rs::{
    BaseState, BoundaryFill, ConsVar, DomainBoundary, DycoreRhs, Field, Geometry, IndexBox, MapFactors,
    RhsMode, SolverConfig, SolverParams, SplitIntegrator, Staggering, StateVector, TerrainMetrics,
};

const NGHOST: [usize; 3] = [4, 4, 1];

/// 1-D flow with u = 1, ρ = 1, θ = 300 and a passive scalar of 1.
fn uniform_flow(geom: &Geometry) -> StateVector {
    let mut s = StateVector::new(geom.domain, ConsVar::NUM_DRY, NGHOST);
    s.cons.fill_comp(ConsVar::Rho.index(), 1.0);
    s.cons.fill_comp(ConsVar::RhoTheta.index(), 300.0);
    s.cons.fill_comp(ConsVar::RhoScalar.index(), 1.0);
    s.xmom.fill(1.0);
    s
}

#[test]
fn test_uniform_flow_is_steady_for_every_scheme() {
    let geom = Geometry::uniform([10, 1, 4], [100.0, 100.0, 100.0]);
    let mf = MapFactors::unity(&geom.domain, [NGHOST[0], NGHOST[1]]);
    let dt = 0.5 * 100.0 / 1.0;

    for scheme in AdvectionScheme::ALL {
        let dycore = if scheme.is_weno() {
            String::new()
        } else {
            scheme.name().to_string()
        };
        for no_substepping in [true, false] {
            let config = SolverConfig::from_params(&SolverParams {
                no_substepping,
                dycore_horiz_adv_type: dycore.clone(),
                dycore_vert_adv_type: dycore.clone(),
                dryscal_horiz_adv_type: scheme.name().to_string(),
                dryscal_vert_adv_type: scheme.name().to_string(),
                ..Default::default()
            })
            .unwrap();
            let mut state = uniform_flow(&geom);
            let base = BaseState::from_state(&state, &config.eos);
            let before = state.clone();

            let rhs = DycoreRhs::new(&config, &geom, &base, &mf);
            let mut bc = DomainBoundary::periodic();
            SplitIntegrator::new(&config)
                .advance(&rhs, &mut bc, &mut state, 0.0, dt)
                .unwrap();

            let diff = state.max_abs_diff(&before);
            assert!(diff < 1e-10, "{scheme} (no_substepping = {no_substepping}): {diff}");
        }
    }
}

#[test]
fn test_uniform_field_has_zero_tendency_with_any_operator() {
    let cells = IndexBox::cells(6, 5, 6);
    let ng = [3, 3, 1];
    let rho_u = Field::filled(cells, Staggering::XFace, 1, ng, 2.0);
    let rho_v = Field::filled(cells, Staggering::YFace, 1, ng, -1.0);
    let rho_w = Field::filled(cells, Staggering::ZFace, 1, ng, 0.0);
    let prim = Field::filled(cells, Staggering::CellCentered, 3, ng, 280.0);
    let mf = MapFactors::unity(&cells, [3, 3]);
    let grid = AdvectionGrid {
        inv_cell_size: [0.01, 0.02, 0.05],
        metrics: None,
        map_factors: Some(&mf),
    };

    for h in AdvectionScheme::ALL {
        for v in AdvectionScheme::ALL {
            let interp = Interpolator::new(h, v);
            let mut avg = FluxAccumulator::new(&cells, [0, 0, 0]);
            let mut src = Field::new(cells, Staggering::CellCentered, 4, [0, 0, 0]);
            advection_src_for_rho_and_theta(&cells, 1.0, &rho_u, &rho_v, &rho_w, &prim, &interp, &grid, &mut src, &mut avg)
                .unwrap();
            advection_src_for_scalars(&cells, 2, 2, &avg, &prim, &interp, &grid, &mut src).unwrap();
            let max = src.as_slice().iter().fold(0.0f64, |m, x| m.max(x.abs()));
            assert!(max < 1e-10, "{h}/{v}: {max}");
        }
    }
}

#[test]
fn test_scalar_pass_reproduces_mass_fluxes_exactly() {
    let geom = Geometry::uniform([8, 6, 5], [200.0, 150.0, 80.0]);
    let mf = MapFactors::unity(&geom.domain, [NGHOST[0], NGHOST[1]]);
    let config = SolverConfig::from_params(&SolverParams {
        dycore_horiz_adv_type: "Upwind_5th".to_string(),
        dycore_vert_adv_type: "Upwind_3rd".to_string(),
        dryscal_horiz_adv_type: "Upwind_5th".to_string(),
        dryscal_vert_adv_type: "Upwind_3rd".to_string(),
        ..Default::default()
    })
    .unwrap();
    let base = BaseState::isentropic(&geom, NGHOST, None, 300.0, 1.0e5);
    let mut state = StateVector::new(geom.domain, ConsVar::NUM_DRY, NGHOST);
    base.initialize(&mut state);
    let g = state.xmom.grown_box();
    state.xmom.for_each_mut(&g, 0..1, |i, j, k, _, v| *v = 3.0 + ((i * 3 + j + k) as f64 * 0.7).sin());
    let g = state.ymom.grown_box();
    state.ymom.for_each_mut(&g, 0..1, |i, j, _, _, v| *v = ((i - j) as f64 * 0.4).cos());
    // a scalar carrying exactly the same primitive as θ
    let (rt, sc) = (ConsVar::RhoTheta.index(), ConsVar::RhoScalar.index());
    let cons = state.cons.clone();
    let g = state.cons.grown_box();
    state.cons.for_each_mut(&g, sc..sc + 1, |i, j, k, _, v| *v = cons[(i, j, k, rt)]);
    DomainBoundary::periodic().fill(&mut state, 0.0, false).unwrap();

    let rhs = DycoreRhs::new(&config, &geom, &base, &mf);
    let mut avg = FluxAccumulator::new(&geom.domain, [0, 0, 0]);
    let mut src = Field::new(geom.domain, Staggering::CellCentered, ConsVar::NUM_DRY, [0, 0, 0]);
    rhs.rho_theta_pass(&state, 1.0, &mut avg, &mut src).unwrap();
    rhs.scalar_pass(&state, &avg, &mut src).unwrap();

    // same fluxes and same reconstruction, so identical to the last bit
    for (i, j, k) in geom.domain.iter() {
        assert_eq!(src[(i, j, k, sc)], src[(i, j, k, rt)], "cell ({i}, {j}, {k})");
    }
}

#[test]
fn test_mass_tendency_sums_to_zero_on_periodic_domain() {
    let geom = Geometry::uniform([9, 7, 6], [100.0, 100.0, 50.0]);
    let mf = MapFactors::unity(&geom.domain, [NGHOST[0], NGHOST[1]]);
    let config = SolverConfig::from_params(&SolverParams {
        use_gravity: true,
        dycore_horiz_adv_type: "Centered_4th".to_string(),
        ..Default::default()
    })
    .unwrap();
    let base = BaseState::isentropic(&geom, NGHOST, None, 300.0, 1.0e5);
    let mut state = StateVector::new(geom.domain, ConsVar::NUM_DRY, NGHOST);
    base.initialize(&mut state);
    let g = state.xmom.grown_box();
    // the last x-face is the periodic image of the first
    state.xmom.for_each_mut(&g, 0..1, |i, j, k, _, v| {
        *v = ((i.rem_euclid(9) + 2 * j) as f64).sin() * (1.0 + 0.1 * k as f64)
    });
    let top = geom.domain.hi[2] + 1;
    let g = state.zmom.grown_box();
    state.zmom.for_each_mut(&g, 0..1, |i, j, k, _, v| {
        *v = if k <= 0 || k >= top { 0.0 } else { 0.3 * ((i * j + k) as f64).cos() }
    });
    DomainBoundary::periodic().fill(&mut state, 0.0, false).unwrap();

    let rhs = DycoreRhs::new(&config, &geom, &base, &mf);
    let mut avg = FluxAccumulator::new(&geom.domain, [0, 0, 0]);
    let mut tendency = state.zeros_like();
    rhs.evaluate(&state, RhsMode::Full, 1.0, &mut avg, &mut tendency).unwrap();

    let net = tendency.cons.sum(&geom.domain, ConsVar::Rho.index());
    let scale = geom.domain.iter().map(|(i, j, k)| tendency.cons[(i, j, k, 0)].abs()).sum::<f64>();
    assert!(scale > 0.0);
    assert!(net.abs() < 1e-12 * scale, "net mass tendency {net}");
}

#[test]
fn test_flat_terrain_degenerates_to_cartesian() {
    let geom = Geometry::uniform([5, 4, 6], [100.0, 100.0, 40.0]);
    let m = TerrainMetrics::flat(&geom, [1, 1, 1]);
    for (i, j, k) in geom.domain.iter() {
        assert!((m.detj()[(i, j, k)] - 1.0).abs() < 1e-14);
        assert!((m.h_zeta_at_iface(i, j, k) - 1.0).abs() < 1e-14);
        assert!((m.h_zeta_at_jface(i, j, k) - 1.0).abs() < 1e-14);
        assert!(m.h_xi_at_kface(i, j, k).abs() < 1e-14);
        assert!(m.h_eta_at_kface(i, j, k).abs() < 1e-14);
        assert!(m.h_xi_at_iface(i, j, k).abs() < 1e-14);
        assert!(m.h_eta_at_jface(i, j, k).abs() < 1e-14);
    }
}

#[test]
fn test_no_substep_update_is_additive_on_static_terrain() {
    let geom = Geometry::uniform([6, 3, 5], [100.0, 100.0, 100.0]);
    let mut old = StateVector::new(geom.domain, ConsVar::NUM_MOIST, [1, 1, 1]);
    let g = old.cons.grown_box();
    old.cons.for_each_mut(&g, 0..ConsVar::NUM_MOIST, |i, j, k, n, v| {
        *v = 1.0 + 0.01 * (i + 2 * j + 3 * k) as f64 + n as f64
    });
    old.xmom.fill(4.0);
    let mut tendency = old.zeros_like();
    let g = tendency.cons.grown_box();
    tendency.cons.for_each_mut(&g, 0..ConsVar::NUM_MOIST, |i, j, k, n, v| {
        *v = 1e-3 * ((i * j + k) as f64 + 0.5 * n as f64).sin()
    });
    let dt = 0.73;

    let flat = TerrainMetrics::flat(&geom, [1, 1, 1]);
    let z_t = Field::new(geom.domain, Staggering::ZFace, 1, [1, 1, 1]);
    let step = TerrainStep {
        old: &flat,
        new: &flat,
        z_t: &z_t,
    };
    for terrain in [None, Some(&step)] {
        let mut new = old.zeros_like();
        no_substep_update(&old, &tendency, dt, terrain, &mut new).unwrap();
        for (i, j, k) in geom.domain.iter() {
            for n in 0..ConsVar::NUM_MOIST {
                assert_eq!(
                    new.cons[(i, j, k, n)],
                    old.cons[(i, j, k, n)] + dt * tendency.cons[(i, j, k, n)]
                );
            }
        }
        for (i, j, k) in geom.domain.surrounding_nodes(Direction::X).iter() {
            assert_eq!(new.xmom[(i, j, k)], 4.0);
        }
    }
}

#[test]
fn test_weno_step_reconstruction_is_bounded() {
    let cells = IndexBox::cells(12, 1, 1);
    let ng = [3, 0, 0];
    let mut q = Field::new(cells, Staggering::CellCentered, 1, ng);
    let g = q.grown_box();
    q.for_each_mut(&g, 0..1, |i, _, _, _, v| *v = if i < 6 { 1.0 } else { 0.0 });

    for scheme in AdvectionScheme::ALL.into_iter().filter(|s| s.is_weno()) {
        let interp = Interpolator::new(scheme, AdvectionScheme::Centered2nd);
        for i in 0..=12 {
            for upw in [1.0, -1.0] {
                let f = interp.face_value_x(&q, i, 0, 0, 0, upw);
                assert!((-1e-12..=1.0 + 1e-12).contains(&f), "{scheme} face {i} upw {upw}: {f}");
            }
        }
    }
}

#[test]
fn test_eos_round_trip() {
    let (rho, theta) = (1.2, 300.0);
    let p = pressure_given_rhotheta(rho * theta);
    let recovered = rhotheta_given_pressure(p) / rho;
    assert!(((recovered - theta) / theta).abs() < 1e-10);

    let eos = EquationOfState::new();
    let t = temperature_given_rho_rhotheta(rho, rho * theta);
    let via_temperature = theta_given_rho_temperature(rho, t, eos.rd_over_cp);
    assert!(((via_temperature - theta) / theta).abs() < 1e-10);
    assert!(((eos.pressure(rho * theta, 0.0) - p) / p).abs() < 1e-12);
}

#[test]
fn test_primitives_divide_by_density() {
    let cells = IndexBox::cells(2, 2, 2);
    let mut cons = Field::new(cells, Staggering::CellCentered, 3, [1, 1, 1]);
    cons.fill_comp(0, 2.0);
    cons.fill_comp(1, 600.0);
    cons.fill_comp(2, 0.5);
    let prim = primitives(&cons);
    assert_eq!(prim[(1, 1, 1, 0)], 300.0);
    assert_eq!(prim[(0, 0, 0, 1)], 0.25);
}
