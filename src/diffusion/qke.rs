//! Source terms of the prognostic turbulence variables.

use crate::constants::GRAVITY;
use crate::field::Field;
use crate::state::ConsVar;
use crate::types::IndexBox;

use super::eddy::{EddyDiff, vertical_derivative};

/// Source of ρ·QKE at cell `(i, j, k)` for the MYNN 2.5 closure.
///
/// Sum of buoyancy production, shear production and dissipation:
///
/// ```text
/// S = −2 g/θ̄ K_θv ∂θ/∂z + K_mv ((∂u/∂z)² + (∂v/∂z)²) − 2 ρ q³ / (B₁ l)
/// ```
///
/// with `q = √QKE`. Vertical differences are centred in the interior and
/// one-sided in the lowest and highest layers of `domain`. `uvel` and
/// `vvel` are face velocities; `k_turb` holds non-negative dynamic
/// diffusivities.
#[allow(clippy::too_many_arguments)]
pub fn qke_source_term(
    i: i32,
    j: i32,
    k: i32,
    uvel: &Field,
    vvel: &Field,
    cell_data: &Field,
    cell_prim: &Field,
    k_turb: &Field,
    inv_cell_size: &[f64; 3],
    domain: &IndexBox,
    pbl_b1: f64,
    theta_mean: f64,
) -> f64 {
    let dz_inv = inv_cell_size[2];
    let theta = ConsVar::RhoTheta.index() - 1;
    let dthetadz = vertical_derivative(cell_prim, theta, i, j, k, dz_inv, domain);
    let (dudz, dvdz) = if k >= domain.hi[2] {
        (
            0.5 * (uvel[(i, j, k)] - uvel[(i, j, k - 1)] + uvel[(i + 1, j, k)] - uvel[(i + 1, j, k - 1)]) * dz_inv,
            0.5 * (vvel[(i, j, k)] - vvel[(i, j, k - 1)] + vvel[(i, j + 1, k)] - vvel[(i, j + 1, k - 1)]) * dz_inv,
        )
    } else if k <= domain.lo[2] {
        (
            0.5 * (uvel[(i, j, k + 1)] - uvel[(i, j, k)] + uvel[(i + 1, j, k + 1)] - uvel[(i + 1, j, k)]) * dz_inv,
            0.5 * (vvel[(i, j, k + 1)] - vvel[(i, j, k)] + vvel[(i, j + 1, k + 1)] - vvel[(i, j + 1, k)]) * dz_inv,
        )
    } else {
        (
            0.25 * (uvel[(i, j, k + 1)] - uvel[(i, j, k - 1)] + uvel[(i + 1, j, k + 1)] - uvel[(i + 1, j, k - 1)])
                * dz_inv,
            0.25 * (vvel[(i, j, k + 1)] - vvel[(i, j, k - 1)] + vvel[(i, j + 1, k + 1)] - vvel[(i, j + 1, k - 1)])
                * dz_inv,
        )
    };

    let mut source = -2.0 * GRAVITY / theta_mean * k_turb[(i, j, k, EddyDiff::ThetaV.index())] * dthetadz;
    source += k_turb[(i, j, k, EddyDiff::MomV.index())] * (dudz * dudz + dvdz * dvdz);

    let qke = cell_prim[(i, j, k, ConsVar::RhoQKE.index() - 1)];
    let l = k_turb[(i, j, k, EddyDiff::Lengthscale.index())];
    if qke.abs() > 0.0 && l > 0.0 {
        source -= 2.0 * cell_data[(i, j, k, ConsVar::Rho.index())] * qke.max(0.0).powf(1.5) / (pbl_b1 * l);
    }
    source
}

/// Source of ρ·e at cell `(i, j, k)` for the Deardorff closure.
///
/// ```text
/// S = 2 K_m S_mn S_mn − g/θ_ref K_θ ∂θ/∂z − C_ε ρ e^{3/2} / l
/// ```
///
/// `strain_sq` is `S_mn S_mn` at the cell centre.
#[allow(clippy::too_many_arguments)]
pub fn ke_source_term(
    i: i32,
    j: i32,
    k: i32,
    strain_sq: f64,
    cell_data: &Field,
    cell_prim: &Field,
    k_turb: &Field,
    inv_cell_size: &[f64; 3],
    domain: &IndexBox,
    ce: f64,
    theta_ref: f64,
) -> f64 {
    let theta = ConsVar::RhoTheta.index() - 1;
    let dthetadz = vertical_derivative(cell_prim, theta, i, j, k, inv_cell_size[2], domain);
    let production = 2.0 * k_turb[(i, j, k, EddyDiff::MomH.index())] * strain_sq;
    let buoyancy = -GRAVITY / theta_ref * k_turb[(i, j, k, EddyDiff::ThetaV.index())] * dthetadz;
    let e = cell_prim[(i, j, k, ConsVar::RhoKE.index() - 1)].max(0.0);
    let l = k_turb[(i, j, k, EddyDiff::Lengthscale.index())];
    let dissipation = if l > 0.0 {
        ce * cell_data[(i, j, k, ConsVar::Rho.index())] * e.powf(1.5) / l
    } else {
        0.0
    };
    production + buoyancy - dissipation
}
