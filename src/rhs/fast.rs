//! Fast (acoustic and gravity-wave) tendencies of the momentum equations.
//!
//! Both terms act on perturbations from the hydrostatic [`BaseState`]:
//!
//! ```text
//! ∂(ρu)/∂t = −m_u ∂p'/∂x|_z            ∂(ρw)/∂t = −∂p'/∂z + B
//! ```
//!
//! Over terrain the horizontal derivative at constant height picks up the
//! slope correction `− h_xi / h_zeta · ∂p'/∂ζ`.

use crate::advection::AdvectionGrid;
use crate::config::BuoyancyType;
use crate::constants::GAMMA;
use crate::equations::{EquationOfState, MoistureModel};
use crate::error::Result;
use crate::field::Field;
use crate::state::{BaseState, ConsVar, StateVector};
use crate::types::{Direction, IndexBox, Staggering};

/// Everything the fast tendencies read besides the state.
#[derive(Clone, Copy, Debug)]
pub struct FastContext<'a> {
    pub base: &'a BaseState,
    pub eos: EquationOfState,
    /// Zero disables buoyancy.
    pub gravity: f64,
    pub buoyancy: BuoyancyType,
    pub grid: AdvectionGrid<'a>,
}

/// Ghost cells read around the updated region.
pub const FAST_HALO: [usize; 3] = [1, 1, 1];

#[inline]
fn vapour(cons: &Field, moisture: MoistureModel, i: i32, j: i32, k: i32) -> f64 {
    let q1 = ConsVar::RhoQ1.index();
    if moisture == MoistureModel::Dry || cons.ncomp() <= q1 {
        0.0
    } else {
        cons[(i, j, k, q1)] / cons[(i, j, k, 0)]
    }
}

/// Pressure perturbation `p(ρθ, q_v) − p₀` on `cells` grown by one.
fn pressure_perturbation(cells: &IndexBox, state: &StateVector, ctx: &FastContext<'_>) -> Field {
    let cons = &state.cons;
    let p0 = ctx.base.p0();
    let mut pp = Field::new(*cells, Staggering::CellCentered, 1, FAST_HALO);
    let region = cells.grow(FAST_HALO);
    let rt = ConsVar::RhoTheta.index();
    pp.for_each_mut(&region, 0..1, |i, j, k, _, v| {
        let qv = vapour(cons, ctx.eos.moisture, i, j, k);
        *v = ctx.eos.pressure(cons[(i, j, k, rt)], qv) - p0[(i, j, k)];
    });
    pp
}

/// Add the pressure-gradient tendency on the faces of `region`.
///
/// Vertical momentum only changes on interior z-faces.
pub fn add_pressure_gradient(
    region: &IndexBox,
    state: &StateVector,
    ctx: &FastContext<'_>,
    rhs: &mut StateVector,
) -> Result<()> {
    let cells = state.cells();
    state.cons.ensure_halo(region, FAST_HALO, "cons")?;
    ctx.base.p0().ensure_halo(region, FAST_HALO, "p0")?;
    let pp = pressure_perturbation(&cells, state, ctx);
    let [dx_inv, dy_inv, dz_inv] = ctx.grid.inv_cell_size;
    let metrics = ctx.grid.metrics;
    let grid = &ctx.grid;

    rhs.xmom.for_each_mut(&region.surrounding_nodes(Direction::X), 0..1, |i, j, k, _, s| {
        let mut gpx = dx_inv * (pp[(i, j, k)] - pp[(i - 1, j, k)]);
        if let Some(m) = metrics {
            let gpz = 0.25
                * dz_inv
                * (pp[(i, j, k + 1)] + pp[(i - 1, j, k + 1)] - pp[(i, j, k - 1)] - pp[(i - 1, j, k - 1)]);
            gpx -= m.h_xi_at_iface(i, j, k) * gpz / m.h_zeta_at_iface(i, j, k);
        }
        *s -= gpx * grid.mf_u(i, j);
    });
    rhs.ymom.for_each_mut(&region.surrounding_nodes(Direction::Y), 0..1, |i, j, k, _, s| {
        let mut gpy = dy_inv * (pp[(i, j, k)] - pp[(i, j - 1, k)]);
        if let Some(m) = metrics {
            let gpz = 0.25
                * dz_inv
                * (pp[(i, j, k + 1)] + pp[(i, j - 1, k + 1)] - pp[(i, j, k - 1)] - pp[(i, j - 1, k - 1)]);
            gpy -= m.h_eta_at_jface(i, j, k) * gpz / m.h_zeta_at_jface(i, j, k);
        }
        *s -= gpy * grid.mf_v(i, j);
    });
    let (bottom, top) = (cells.lo[2], cells.hi[2]);
    rhs.zmom.for_each_mut(&region.surrounding_nodes(Direction::Z), 0..1, |i, j, k, _, s| {
        if k <= bottom || k > top {
            return;
        }
        let mut gpz = dz_inv * (pp[(i, j, k)] - pp[(i, j, k - 1)]);
        if let Some(m) = metrics {
            gpz /= m.detj_at_kface(i, j, k);
        }
        *s -= gpz;
    });
    Ok(())
}

/// Add the buoyancy tendency on the interior z-faces of `region`.
pub fn add_buoyancy(region: &IndexBox, state: &StateVector, ctx: &FastContext<'_>, rhs_z: &mut Field) -> Result<()> {
    if ctx.gravity == 0.0 {
        return Ok(());
    }
    let cells = state.cells();
    state.cons.ensure_halo(region, FAST_HALO, "cons")?;
    let cons = &state.cons;
    let (rho0, p0, theta0) = (ctx.base.rho0(), ctx.base.p0(), ctx.base.theta0());
    let g = ctx.gravity;
    let rt = ConsVar::RhoTheta.index();

    // Cell-centred buoyancy per unit volume
    let cell_b = |i: i32, j: i32, k: i32| -> f64 {
        let rho = cons[(i, j, k, 0)];
        match ctx.buoyancy {
            BuoyancyType::Density => -g * (rho - rho0[(i, j, k)]),
            BuoyancyType::PressurePerturbation | BuoyancyType::VirtualTheta => {
                let qv = vapour(cons, ctx.eos.moisture, i, j, k);
                let p_prime = ctx.eos.pressure(cons[(i, j, k, rt)], qv) - p0[(i, j, k)];
                let mut theta = cons[(i, j, k, rt)] / rho;
                if ctx.buoyancy == BuoyancyType::VirtualTheta {
                    theta *= 1.0 + 0.61 * qv;
                }
                let th0 = theta0[(i, j, k)];
                -g * rho0[(i, j, k)] * (p_prime / (GAMMA * p0[(i, j, k)]) - (theta - th0) / th0)
            }
        }
    };
    let (bottom, top) = (cells.lo[2], cells.hi[2]);
    rhs_z.for_each_mut(&region.surrounding_nodes(Direction::Z), 0..1, |i, j, k, _, s| {
        if k > bottom && k <= top {
            *s += 0.5 * (cell_b(i, j, k) + cell_b(i, j, k - 1));
        }
    });
    Ok(())
}
