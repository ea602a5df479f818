//! Reference state about which the acoustic tendencies are linearised.

use crate::constants::{C_P_D, GRAVITY, P_0, R_D};
use crate::equations::EquationOfState;
use crate::field::Field;
use crate::types::{Geometry, Staggering};
use crate::vertical::{TerrainMetrics, z_at_cell_center};

use super::{ConsVar, StateVector};

/// Base-state density, pressure and potential temperature on cells.
///
/// The pressure gradient and buoyancy act on deviations from this state,
/// so a state equal to its base state feels no fast forcing.
#[derive(Clone, Debug)]
pub struct BaseState {
    rho0: Field,
    p0: Field,
    theta0: Field,
}

impl BaseState {
    /// Base state equal to `state` itself, ghosts included.
    pub fn from_state(state: &StateVector, eos: &EquationOfState) -> Self {
        let cons = &state.cons;
        let mut rho0 = Field::new(cons.valid_box(), Staggering::CellCentered, 1, cons.nghost());
        let mut p0 = rho0.zeros_like();
        let mut theta0 = rho0.zeros_like();
        let grown = rho0.grown_box();
        let rho = ConsVar::Rho.index();
        let rt = ConsVar::RhoTheta.index();
        let qv = (cons.ncomp() > ConsVar::RhoQ1.index()).then_some(ConsVar::RhoQ1.index());

        rho0.for_each_mut(&grown, 0..1, |i, j, k, _, v| *v = cons[(i, j, k, rho)]);
        theta0.for_each_mut(&grown, 0..1, |i, j, k, _, v| {
            *v = cons[(i, j, k, rt)] / cons[(i, j, k, rho)]
        });
        p0.for_each_mut(&grown, 0..1, |i, j, k, _, v| {
            let q = qv.map_or(0.0, |n| cons[(i, j, k, n)] / cons[(i, j, k, rho)]);
            *v = eos.pressure(cons[(i, j, k, rt)], q);
        });
        Self { rho0, p0, theta0 }
    }

    /// Dry isentropic atmosphere of constant θ in hydrostatic balance.
    ///
    /// The Exner function decreases linearly with height,
    /// `π(z) = π_s − g z / (c_p θ)`, starting from the surface pressure
    /// `p_surface` at `z = 0`.
    pub fn isentropic(
        geom: &Geometry,
        nghost: [usize; 3],
        metrics: Option<&TerrainMetrics>,
        theta: f64,
        p_surface: f64,
    ) -> Self {
        let mut rho0 = Field::new(geom.domain, Staggering::CellCentered, 1, nghost);
        let mut p0 = rho0.zeros_like();
        let mut theta0 = rho0.zeros_like();
        theta0.fill(theta);
        let grown = rho0.grown_box();
        let rd_over_cp = R_D / C_P_D;
        let pi_s = (p_surface / P_0).powf(rd_over_cp);
        let height = |i: i32, j: i32, k: i32| match metrics {
            Some(m) => z_at_cell_center(i, j, k, m.z_nd()),
            None => geom.cell_coord(2, k),
        };
        let exner = |z: f64| pi_s - GRAVITY * z / (C_P_D * theta);

        p0.for_each_mut(&grown, 0..1, |i, j, k, _, v| {
            *v = P_0 * exner(height(i, j, k)).powf(1.0 / rd_over_cp);
        });
        rho0.for_each_mut(&grown, 0..1, |i, j, k, _, v| {
            let pi = exner(height(i, j, k));
            *v = P_0 * pi.powf(1.0 / rd_over_cp) / (R_D * pi * theta);
        });
        Self { rho0, p0, theta0 }
    }

    /// Write the base state into the density and ρθ components of `state`
    /// and zero its momentum.
    pub fn initialize(&self, state: &mut StateVector) {
        let grown = state.cons.grown_box().intersect(&self.rho0.grown_box());
        let (rho0, theta0) = (&self.rho0, &self.theta0);
        state.cons.for_each_mut(&grown, 0..2, |i, j, k, n, v| {
            *v = if n == 0 {
                rho0[(i, j, k)]
            } else {
                rho0[(i, j, k)] * theta0[(i, j, k)]
            };
        });
        state.xmom.fill(0.0);
        state.ymom.fill(0.0);
        state.zmom.fill(0.0);
    }

    /// Base-state density.
    #[inline]
    pub fn rho0(&self) -> &Field {
        &self.rho0
    }

    /// Base-state pressure.
    #[inline]
    pub fn p0(&self) -> &Field {
        &self.p0
    }

    /// Base-state potential temperature.
    #[inline]
    pub fn theta0(&self) -> &Field {
        &self.theta0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::pressure_given_rhotheta;

    #[test]
    fn test_isentropic_profile_is_consistent_with_eos() {
        let geom = Geometry::uniform([2, 2, 20], [100.0, 100.0, 100.0]);
        let base = BaseState::isentropic(&geom, [1, 1, 1], None, 300.0, 1.0e5);
        for k in 0..20 {
            let rho = base.rho0()[(0, 0, k)];
            let p = pressure_given_rhotheta(rho * 300.0);
            assert!(((p - base.p0()[(0, 0, k)]) / p).abs() < 1e-10);
        }
        assert!(base.p0()[(0, 0, 19)] < base.p0()[(0, 0, 0)]);
    }

    #[test]
    fn test_isentropic_profile_is_hydrostatic() {
        let dz = 50.0;
        let geom = Geometry::uniform([1, 1, 40], [100.0, 100.0, dz]);
        let base = BaseState::isentropic(&geom, [1, 1, 1], None, 300.0, 1.0e5);
        for k in 1..40 {
            let dpdz = (base.p0()[(0, 0, k)] - base.p0()[(0, 0, k - 1)]) / dz;
            let rho_face = 0.5 * (base.rho0()[(0, 0, k)] + base.rho0()[(0, 0, k - 1)]);
            assert!((dpdz + rho_face * GRAVITY).abs() / (rho_face * GRAVITY) < 1e-3);
        }
    }

    #[test]
    fn test_from_state_round_trip() {
        let geom = Geometry::uniform([2, 2, 4], [100.0, 100.0, 100.0]);
        let base = BaseState::isentropic(&geom, [1, 1, 1], None, 300.0, 1.0e5);
        let mut state = StateVector::new(geom.domain, ConsVar::NUM_DRY, [1, 1, 1]);
        base.initialize(&mut state);
        let again = BaseState::from_state(&state, &EquationOfState::new());
        assert!(again.p0().max_abs_diff(base.p0(), &geom.domain) < 1e-6);
        assert!(again.theta0().max_abs_diff(base.theta0(), &geom.domain) < 1e-10);
    }
}
