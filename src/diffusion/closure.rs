//! Diffusive tendencies added into the slow right-hand side.

use crate::error::Result;
use crate::field::Field;
use crate::state::{ConsVar, StateVector};
use crate::types::{Direction, IndexBox, Staggering};

use super::eddy::{CellVelocity, EddyDiff, compute_eddy_diffusivity};
use super::models::{DiffusionParams, LesType, PblType};
use super::qke::{ke_source_term, qke_source_term};

/// Read-only inputs of a diffusion closure.
#[derive(Clone, Copy, Debug)]
pub struct DiffusionInputs<'a> {
    pub state: &'a StateVector,
    /// Primitive variables of `state`.
    pub prim: &'a Field,
    /// 1/dx, 1/dy, 1/dζ
    pub inv_cell_size: [f64; 3],
    /// Valid cells of the whole domain. Vertical fluxes vanish through its
    /// bottom and top faces.
    pub domain: IndexBox,
}

/// A collaborator that adds diffusive and turbulent tendencies into the
/// slow right-hand side.
pub trait DiffusionClosure: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Ghost cells the closure reads around the region it updates.
    fn halo(&self) -> [usize; 3] {
        [2, 2, 1]
    }

    /// Add tendencies for every cell and face of `region` into `rhs`.
    fn add_tendency(&self, region: &IndexBox, inputs: &DiffusionInputs<'_>, rhs: &mut StateVector) -> Result<()>;
}

/// Second-order flux-form diffusion with molecular and eddy coefficients.
///
/// Eddy coefficients come from the configured LES and PBL closures, the
/// molecular ones from [`DiffusionParams::molecular`]. Turbulence variables
/// receive their source terms here as well.
#[derive(Clone, Debug)]
pub struct TurbulentDiffusion {
    params: DiffusionParams,
}

impl TurbulentDiffusion {
    pub fn new(params: DiffusionParams) -> Self {
        Self { params }
    }

    /// Closure parameters.
    pub fn params(&self) -> &DiffusionParams {
        &self.params
    }
}

/// Horizontal and vertical coefficient components used for conserved comp `n`.
fn coefficient_components(n: usize) -> (usize, usize, usize) {
    // (horizontal eddy, vertical eddy, molecular slot)
    match n {
        n if n == ConsVar::RhoTheta.index() => (EddyDiff::ThetaH.index(), EddyDiff::ThetaV.index(), 1),
        n if n == ConsVar::RhoKE.index() || n == ConsVar::RhoQKE.index() => {
            (EddyDiff::KeH.index(), EddyDiff::KeV.index(), 0)
        }
        _ => (EddyDiff::ScalarH.index(), EddyDiff::ScalarV.index(), 2),
    }
}

impl DiffusionClosure for TurbulentDiffusion {
    fn name(&self) -> &'static str {
        match (self.params.les_type, self.params.pbl_type) {
            (LesType::Smagorinsky, _) => "Smagorinsky",
            (LesType::Deardorff, _) => "Deardorff",
            (LesType::None, PblType::Mynn25) => "MYNN2.5",
            _ => "molecular",
        }
    }

    fn add_tendency(&self, region: &IndexBox, inputs: &DiffusionInputs<'_>, rhs: &mut StateVector) -> Result<()> {
        let state = inputs.state;
        let prim = inputs.prim;
        let domain = inputs.domain;
        let inv = inputs.inv_cell_size;
        state.cons.ensure_halo(region, self.halo(), "cons")?;

        let params = &self.params;
        let k_region = region.grow([1, 1, 0]);
        let mut k_turb = Field::new(state.cells(), Staggering::CellCentered, EddyDiff::COUNT, [1, 1, 1]);
        compute_eddy_diffusivity(&k_region, &domain, state, prim, &inv, params, &mut k_turb)?;

        let cons = &state.cons;
        // Total dynamic coefficient of component `c` at cell (i, j, k)
        let coef = |i: i32, j: i32, k: i32, eddy: usize, molec: usize| -> f64 {
            k_turb[(i, j, k, eddy)] + params.molecular(cons[(i, j, k, 0)])[molec]
        };
        let top = domain.hi[2];
        let bottom = domain.lo[2];

        // Scalars: ∇·(κ ∇φ) with φ the primitive of component n
        let ncons = cons.ncomp();
        rhs.cons.for_each_mut(region, 1..ncons, |i, j, k, n, s| {
            let (eh, ev, m) = coefficient_components(n);
            let p = n - 1;
            let flux = |i0: i32, j0: i32, k0: i32, i1: i32, j1: i32, k1: i32, c: usize, inv_d: f64| {
                0.5 * (coef(i0, j0, k0, c, m) + coef(i1, j1, k1, c, m))
                    * (prim[(i1, j1, k1, p)] - prim[(i0, j0, k0, p)])
                    * inv_d
            };
            let fx = flux(i, j, k, i + 1, j, k, eh, inv[0]) - flux(i - 1, j, k, i, j, k, eh, inv[0]);
            let fy = flux(i, j, k, i, j + 1, k, eh, inv[1]) - flux(i, j - 1, k, i, j, k, eh, inv[1]);
            let hi = if k < top { flux(i, j, k, i, j, k + 1, ev, inv[2]) } else { 0.0 };
            let lo = if k > bottom { flux(i, j, k - 1, i, j, k, ev, inv[2]) } else { 0.0 };
            *s += fx * inv[0] + fy * inv[1] + (hi - lo) * inv[2];
        });

        // Momentum: ∇·(μ ∇u) on each staggered component
        let vel = CellVelocity::from_state(state);
        let mom_coef = |i: i32, j: i32, k: i32, c: usize| coef(i, j, k, c, 0);
        let laplacian = |q: &Field, dir: Direction, i: i32, j: i32, k: i32| -> f64 {
            let stag = dir.offset();
            // coefficient at the staggered point of q
            let at_point = |i: i32, j: i32, k: i32, c: usize| {
                0.5 * (mom_coef(i, j, k, c) + mom_coef(i - stag.0, j - stag.1, k - stag.2, c))
            };
            // coefficient between q(i, j, k) and q(i + e)
            let between = |i: i32, j: i32, k: i32, e: (i32, i32, i32), c: usize| {
                if e == stag {
                    mom_coef(i, j, k, c)
                } else {
                    0.5 * (at_point(i, j, k, c) + at_point(i + e.0, j + e.1, k + e.2, c))
                }
            };
            let diff = |i: i32, j: i32, k: i32, e: (i32, i32, i32), c: usize| {
                between(i, j, k, e, c) * (q[(i + e.0, j + e.1, k + e.2)] - q[(i, j, k)])
            };
            let h = EddyDiff::MomH.index();
            let v = EddyDiff::MomV.index();
            let fx = diff(i, j, k, (1, 0, 0), h) - diff(i - 1, j, k, (1, 0, 0), h);
            let fy = diff(i, j, k, (0, 1, 0), h) - diff(i, j - 1, k, (0, 1, 0), h);
            let kmax = if dir == Direction::Z { top + 1 } else { top };
            let zhi = if k < kmax { diff(i, j, k, (0, 0, 1), v) } else { 0.0 };
            let zlo = if k > bottom { diff(i, j, k - 1, (0, 0, 1), v) } else { 0.0 };
            fx * inv[0] * inv[0] + fy * inv[1] * inv[1] + (zhi - zlo) * inv[2] * inv[2]
        };
        rhs.xmom.for_each_mut(&region.surrounding_nodes(Direction::X), 0..1, |i, j, k, _, s| {
            *s += laplacian(&vel.u, Direction::X, i, j, k);
        });
        rhs.ymom.for_each_mut(&region.surrounding_nodes(Direction::Y), 0..1, |i, j, k, _, s| {
            *s += laplacian(&vel.v, Direction::Y, i, j, k);
        });
        rhs.zmom.for_each_mut(&region.surrounding_nodes(Direction::Z), 0..1, |i, j, k, _, s| {
            if k > bottom && k <= top {
                *s += laplacian(&vel.w, Direction::Z, i, j, k);
            }
        });

        // Turbulence sources
        let qke = ConsVar::RhoQKE.index();
        if params.pbl_type == PblType::Mynn25 && ncons > qke {
            rhs.cons.for_each_mut(region, qke..qke + 1, |i, j, k, _, s| {
                *s += qke_source_term(
                    i,
                    j,
                    k,
                    &vel.u,
                    &vel.v,
                    cons,
                    prim,
                    &k_turb,
                    &inv,
                    &domain,
                    params.pbl.b1,
                    params.theta_ref,
                );
            });
        }
        let ke = ConsVar::RhoKE.index();
        if params.les_type == LesType::Deardorff && ncons > ke {
            rhs.cons.for_each_mut(region, ke..ke + 1, |i, j, k, _, s| {
                let strain = vel.strain_sq(i, j, k, &inv);
                *s += ke_source_term(
                    i,
                    j,
                    k,
                    strain,
                    cons,
                    prim,
                    &k_turb,
                    &inv,
                    &domain,
                    params.ce,
                    params.theta_ref,
                );
            });
        }
        Ok(())
    }
}
