//! Eddy viscosities and diffusivities.
//!
//! All coefficients are dynamic (density-weighted, kg/(m·s)) and
//! non-negative. Horizontal and vertical components are stored separately
//! so a boundary-layer scheme can supply the vertical mixing while an LES
//! closure supplies the horizontal one.

use crate::constants::GRAVITY;
use crate::error::Result;
use crate::field::Field;
use crate::state::{ConsVar, StateVector};
use crate::types::{Direction, IndexBox, Staggering};

use super::models::{DiffusionParams, LesType, PblType};

/// Components of the eddy-diffusivity field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum EddyDiff {
    MomH = 0,
    MomV = 1,
    ThetaH = 2,
    ThetaV = 3,
    ScalarH = 4,
    ScalarV = 5,
    /// Turbulent kinetic energy (Deardorff) and QKE (MYNN), horizontal.
    KeH = 6,
    KeV = 7,
    /// Master length scale of the turbulence closure (m).
    Lengthscale = 8,
}

impl EddyDiff {
    /// Number of components.
    pub const COUNT: usize = 9;

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// von Kármán constant.
const KAPPA: f64 = 0.4;

/// Staggered velocities from face momentum and cell density.
#[derive(Debug)]
pub(crate) struct CellVelocity {
    pub u: Field,
    pub v: Field,
    pub w: Field,
}

impl CellVelocity {
    /// Velocities wherever both the momentum and the density halo reach.
    pub fn from_state(state: &StateVector) -> Self {
        let rho = &state.cons;
        let face = |mom: &Field, di: i32, dj: i32, dk: i32| {
            let mut vel = mom.zeros_like();
            let region = mom
                .grown_box()
                .intersect(&rho.grown_box().convert(mom.location()))
                .grow_dir(Direction::X, -di)
                .grow_dir(Direction::Y, -dj)
                .grow_dir(Direction::Z, -dk);
            vel.for_each_mut(&region, 0..1, |i, j, k, _, v| {
                let r = 0.5 * (rho[(i, j, k, 0)] + rho[(i - di, j - dj, k - dk, 0)]);
                *v = mom[(i, j, k)] / r;
            });
            vel
        };
        Self {
            u: face(&state.xmom, 1, 0, 0),
            v: face(&state.ymom, 0, 1, 0),
            w: face(&state.zmom, 0, 0, 1),
        }
    }

    /// Strain-rate tensor invariant `S_mn S_mn` at cell `(i, j, k)`.
    pub fn strain_sq(&self, i: i32, j: i32, k: i32, inv_dx: &[f64; 3]) -> f64 {
        let (u, v, w) = (&self.u, &self.v, &self.w);
        let s11 = (u[(i + 1, j, k)] - u[(i, j, k)]) * inv_dx[0];
        let s22 = (v[(i, j + 1, k)] - v[(i, j, k)]) * inv_dx[1];
        let s33 = (w[(i, j, k + 1)] - w[(i, j, k)]) * inv_dx[2];
        let ux = |i: i32, j: i32, k: i32| 0.5 * (u[(i, j, k)] + u[(i + 1, j, k)]);
        let vy = |i: i32, j: i32, k: i32| 0.5 * (v[(i, j, k)] + v[(i, j + 1, k)]);
        let wz = |i: i32, j: i32, k: i32| 0.5 * (w[(i, j, k)] + w[(i, j, k + 1)]);
        let dudy = 0.5 * (ux(i, j + 1, k) - ux(i, j - 1, k)) * inv_dx[1];
        let dudz = 0.5 * (ux(i, j, k + 1) - ux(i, j, k - 1)) * inv_dx[2];
        let dvdx = 0.5 * (vy(i + 1, j, k) - vy(i - 1, j, k)) * inv_dx[0];
        let dvdz = 0.5 * (vy(i, j, k + 1) - vy(i, j, k - 1)) * inv_dx[2];
        let dwdx = 0.5 * (wz(i + 1, j, k) - wz(i - 1, j, k)) * inv_dx[0];
        let dwdy = 0.5 * (wz(i, j + 1, k) - wz(i, j - 1, k)) * inv_dx[1];
        let s12 = 0.5 * (dudy + dvdx);
        let s13 = 0.5 * (dudz + dwdx);
        let s23 = 0.5 * (dvdz + dwdy);
        s11 * s11 + s22 * s22 + s33 * s33 + 2.0 * (s12 * s12 + s13 * s13 + s23 * s23)
    }
}

/// Fill the eddy-diffusivity field over `region`.
///
/// `region` must lie one cell inside the halo of `state` horizontally. The
/// vertical extent is clipped to the valid layers; `domain` gives the
/// valid column for the boundary-layer length scale.
pub fn compute_eddy_diffusivity(
    region: &IndexBox,
    domain: &IndexBox,
    state: &StateVector,
    prim: &Field,
    inv_cell_size: &[f64; 3],
    params: &DiffusionParams,
    k_turb: &mut Field,
) -> Result<()> {
    let region = IndexBox::new(
        [region.lo[0], region.lo[1], region.lo[2].max(domain.lo[2])],
        [region.hi[0], region.hi[1], region.hi[2].min(domain.hi[2])],
    );
    state.cons.ensure_halo(&region, [2, 2, 1], "cons")?;
    k_turb.ensure_contains(&region, "eddy diffusivity")?;
    k_turb.fill(0.0);

    let delta = (1.0 / (inv_cell_size[0] * inv_cell_size[1] * inv_cell_size[2])).cbrt();
    let rho = &state.cons;
    let theta = ConsVar::RhoTheta.index() - 1;
    let vel = CellVelocity::from_state(state);

    match params.les_type {
        LesType::None => {}
        LesType::Smagorinsky => {
            let cs_delta_sq = (params.cs * delta) * (params.cs * delta);
            k_turb.for_each_mut(&region, 0..EddyDiff::COUNT, |i, j, k, n, kt| {
                let mu = cs_delta_sq * rho[(i, j, k, 0)] * (2.0 * vel.strain_sq(i, j, k, inv_cell_size)).sqrt();
                *kt = smagorinsky_component(n, mu, delta, params);
            });
        }
        LesType::Deardorff => {
            let ke = ConsVar::RhoKE.index();
            let ke_ok = rho.ncomp() > ke;
            k_turb.for_each_mut(&region, 0..EddyDiff::COUNT, |i, j, k, n, kt| {
                let r = rho[(i, j, k, 0)];
                let e = if ke_ok { (rho[(i, j, k, ke)] / r).max(0.0) } else { 0.0 };
                let l = deardorff_length(i, j, k, e, delta, prim, theta, inv_cell_size[2], domain, params.theta_ref);
                let mu = r * params.ck * l * e.sqrt();
                *kt = match n {
                    n if n == EddyDiff::MomH.index() || n == EddyDiff::MomV.index() => mu,
                    n if n == EddyDiff::ThetaH.index() || n == EddyDiff::ThetaV.index() => {
                        mu * (1.0 + 2.0 * l / delta)
                    }
                    n if n == EddyDiff::ScalarH.index() || n == EddyDiff::ScalarV.index() => {
                        mu * params.sc_t_inv
                    }
                    n if n == EddyDiff::KeH.index() || n == EddyDiff::KeV.index() => mu / params.sigma_k,
                    _ => l,
                };
            });
        }
    }

    if params.pbl_type == PblType::Mynn25 {
        mynn25_vertical(&region, domain, state, inv_cell_size, params, k_turb);
    }
    Ok(())
}

fn smagorinsky_component(n: usize, mu: f64, delta: f64, params: &DiffusionParams) -> f64 {
    match n {
        n if n == EddyDiff::MomH.index() || n == EddyDiff::MomV.index() => mu,
        n if n == EddyDiff::ThetaH.index() || n == EddyDiff::ThetaV.index() => mu * params.pr_t_inv,
        n if n == EddyDiff::ScalarH.index() || n == EddyDiff::ScalarV.index() => mu * params.sc_t_inv,
        n if n == EddyDiff::KeH.index() || n == EddyDiff::KeV.index() => mu,
        _ => delta,
    }
}

/// Stability-limited Deardorff length scale.
#[allow(clippy::too_many_arguments)]
fn deardorff_length(
    i: i32,
    j: i32,
    k: i32,
    e: f64,
    delta: f64,
    prim: &Field,
    theta: usize,
    dz_inv: f64,
    domain: &IndexBox,
    theta_ref: f64,
) -> f64 {
    let dthetadz = vertical_derivative(prim, theta, i, j, k, dz_inv, domain);
    let n2 = GRAVITY / theta_ref * dthetadz;
    if n2 > 0.0 && e > 0.0 {
        (0.76 * e.sqrt() / n2.sqrt()).min(delta)
    } else {
        delta
    }
}

/// Centred vertical derivative, one-sided at the bottom and top layers.
#[inline]
pub(crate) fn vertical_derivative(
    q: &Field,
    n: usize,
    i: i32,
    j: i32,
    k: i32,
    dz_inv: f64,
    domain: &IndexBox,
) -> f64 {
    if k >= domain.hi[2] {
        (q[(i, j, k, n)] - q[(i, j, k - 1, n)]) * dz_inv
    } else if k <= domain.lo[2] {
        (q[(i, j, k + 1, n)] - q[(i, j, k, n)]) * dz_inv
    } else {
        0.5 * (q[(i, j, k + 1, n)] - q[(i, j, k - 1, n)]) * dz_inv
    }
}

/// Vertical eddy diffusivities of the MYNN 2.5 closure with neutral
/// stability functions and the Blackadar length scale.
fn mynn25_vertical(
    region: &IndexBox,
    domain: &IndexBox,
    state: &StateVector,
    inv_cell_size: &[f64; 3],
    params: &DiffusionParams,
    k_turb: &mut Field,
) {
    let cons = &state.cons;
    let qke = ConsVar::RhoQKE.index();
    if cons.ncomp() <= qke {
        return;
    }
    let dz = 1.0 / inv_cell_size[2];
    let q_at = |i: i32, j: i32, k: i32| (cons[(i, j, k, qke)] / cons[(i, j, k, 0)]).max(0.0).sqrt();

    // Asymptotic length scale from the column-integrated turbulence
    let columns = IndexBox::new([region.lo[0], region.lo[1], 0], [region.hi[0], region.hi[1], 0]);
    let mut l0 = Field::new(columns, Staggering::CellCentered, 1, [0, 0, 0]);
    let col_box = l0.valid_box();
    l0.for_each_mut(&col_box, 0..1, |i, j, _, _, v| {
        let (mut qz, mut qs) = (0.0, 0.0);
        for k in domain.lo[2]..=domain.hi[2] {
            let z = (k - domain.lo[2]) as f64 * dz + 0.5 * dz;
            let q = q_at(i, j, k);
            qz += q * z;
            qs += q;
        }
        *v = if qs > 0.0 { 0.23 * qz / qs } else { dz };
    });

    let sm = params.pbl.sm_neutral();
    let sh = params.pbl.sh_neutral();
    k_turb.for_each_mut(region, EddyDiff::MomV.index()..EddyDiff::COUNT, |i, j, k, n, kt| {
        let z = (k - domain.lo[2]) as f64 * dz + 0.5 * dz;
        let lb = l0[(i, j, 0)];
        let l = KAPPA * z * lb / (KAPPA * z + lb);
        let rlq = cons[(i, j, k, 0)] * l * q_at(i, j, k);
        match n {
            n if n == EddyDiff::MomV.index() => *kt = rlq * sm,
            n if n == EddyDiff::ThetaV.index() || n == EddyDiff::ScalarV.index() => *kt = rlq * sh,
            n if n == EddyDiff::KeV.index() => *kt = rlq * sm,
            n if n == EddyDiff::Lengthscale.index() => *kt = l,
            _ => {}
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::models::MolecDiffType;

    fn shear_state(ncons: usize) -> StateVector {
        let cells = IndexBox::cells(4, 4, 6);
        let mut s = StateVector::new(cells, ncons, [3, 3, 1]);
        let g = s.cons.grown_box();
        s.cons.for_each_mut(&g, 0..ncons, |_, _, k, n, v| {
            *v = match n {
                0 => 1.0,
                1 => 300.0 + 0.5 * k as f64,
                3 => 0.2,
                _ => 0.0,
            }
        });
        let gx = s.xmom.grown_box();
        s.xmom.for_each_mut(&gx, 0..1, |_, _, k, _, v| *v = 2.0 * k as f64);
        s
    }

    #[test]
    fn test_smagorinsky_vanishes_without_shear() {
        let cells = IndexBox::cells(4, 4, 6);
        let mut s = StateVector::new(cells, 2, [3, 3, 1]);
        s.cons.fill_comp(0, 1.0);
        s.cons.fill_comp(1, 300.0);
        s.xmom.fill(5.0);
        let prim = crate::state::primitives(&s.cons);
        let params = DiffusionParams {
            les_type: LesType::Smagorinsky,
            cs: 0.2,
            ..Default::default()
        };
        let mut kt = Field::new(cells, Staggering::CellCentered, EddyDiff::COUNT, [1, 1, 0]);
        compute_eddy_diffusivity(&cells, &cells, &s, &prim, &[0.1, 0.1, 0.1], &params, &mut kt).unwrap();
        for (i, j, k) in cells.iter() {
            assert!(kt[(i, j, k, EddyDiff::MomH.index())].abs() < 1e-12);
            assert!(kt[(i, j, k, EddyDiff::ThetaV.index())].abs() < 1e-12);
        }
    }

    #[test]
    fn test_smagorinsky_with_shear() {
        let s = shear_state(2);
        let cells = s.cells();
        let prim = crate::state::primitives(&s.cons);
        let params = DiffusionParams {
            les_type: LesType::Smagorinsky,
            molec_diff_type: MolecDiffType::None,
            cs: 0.2,
            pr_t_inv: 3.0,
            ..Default::default()
        };
        let mut kt = Field::new(cells, Staggering::CellCentered, EddyDiff::COUNT, [0, 0, 0]);
        let inv = [0.1, 0.1, 0.1];
        compute_eddy_diffusivity(&cells, &cells, &s, &prim, &inv, &params, &mut kt).unwrap();
        // du/dz = 2 / dz = 0.2 1/s in the interior; S13 = 0.1
        let mu = kt[(1, 1, 2, EddyDiff::MomH.index())];
        let expected = (0.2 * 10.0f64).powi(2) * (2.0 * 2.0 * 0.01f64).sqrt();
        assert!((mu - expected).abs() < 1e-10, "{} vs {}", mu, expected);
        assert!((kt[(1, 1, 2, EddyDiff::ThetaV.index())] - 3.0 * expected).abs() < 1e-10);
    }

    #[test]
    fn test_mynn_length_scale_grows_with_height() {
        let s = shear_state(ConsVar::NUM_DRY);
        let cells = s.cells();
        let prim = crate::state::primitives(&s.cons);
        let params = DiffusionParams {
            pbl_type: PblType::Mynn25,
            ..Default::default()
        };
        let mut kt = Field::new(cells, Staggering::CellCentered, EddyDiff::COUNT, [0, 0, 0]);
        compute_eddy_diffusivity(&cells, &cells, &s, &prim, &[0.1, 0.1, 0.1], &params, &mut kt).unwrap();
        let l = EddyDiff::Lengthscale.index();
        assert!(kt[(0, 0, 1, l)] > kt[(0, 0, 0, l)]);
        assert!(kt[(0, 0, 3, EddyDiff::MomV.index())] > 0.0);
        assert_eq!(kt[(0, 0, 3, EddyDiff::MomH.index())], 0.0);
    }
}
