//! Contravariant vertical mass flux Ω.
//!
//! ```text
//! Ω = ρw − ρu·h_xi − ρv·h_eta
//! ```
//!
//! The horizontal momenta live on x/y-faces and are averaged onto the z-face
//! from the two adjacent layers. At the bottom and top faces only the single
//! layer inside the domain is used, which is the slip-wall closure of the
//! lower boundary.

use crate::error::Result;
use crate::field::Field;
use crate::types::{IndexBox, Staggering};

use super::terrain::TerrainMetrics;

#[inline]
fn horizontal_momentum_at_kface(i: i32, j: i32, k: i32, rho_u: &Field, rho_v: &Field) -> (f64, f64) {
    let vb = rho_u.valid_box();
    let klo = (k - 1).max(vb.lo[2]);
    let khi = k.min(vb.hi[2]);
    let ru = 0.25 * (rho_u[(i, j, klo)] + rho_u[(i + 1, j, klo)] + rho_u[(i, j, khi)] + rho_u[(i + 1, j, khi)]);
    let rv = 0.25 * (rho_v[(i, j, klo)] + rho_v[(i, j + 1, klo)] + rho_v[(i, j, khi)] + rho_v[(i, j + 1, khi)]);
    (ru, rv)
}

/// Ω at the z-face `(i, j, k)` from the Cartesian vertical momentum `rho_w`.
#[inline]
pub fn omega_from_w(
    i: i32,
    j: i32,
    k: i32,
    rho_w: f64,
    rho_u: &Field,
    rho_v: &Field,
    metrics: &TerrainMetrics,
) -> f64 {
    let (ru, rv) = horizontal_momentum_at_kface(i, j, k, rho_u, rho_v);
    rho_w - ru * metrics.h_xi_at_kface(i, j, k) - rv * metrics.h_eta_at_kface(i, j, k)
}

/// Cartesian vertical momentum at the z-face `(i, j, k)` from Ω.
///
/// At `k == 0` with `omega = ρ z_t` this is the no-penetration condition of
/// a slip wall moving with the terrain.
#[inline]
pub fn w_from_omega(
    i: i32,
    j: i32,
    k: i32,
    omega: f64,
    rho_u: &Field,
    rho_v: &Field,
    metrics: &TerrainMetrics,
) -> f64 {
    let (ru, rv) = horizontal_momentum_at_kface(i, j, k, rho_u, rho_v);
    omega + ru * metrics.h_xi_at_kface(i, j, k) + rv * metrics.h_eta_at_kface(i, j, k)
}

/// Fill `omega` on the z-faces of `cells` and one ring of horizontal ghost
/// faces (as far as the halo of `omega` allows).
///
/// Without terrain Ω is just ρw.
pub fn compute_omega(
    cells: &IndexBox,
    rho_u: &Field,
    rho_v: &Field,
    rho_w: &Field,
    metrics: Option<&TerrainMetrics>,
    omega: &mut Field,
) -> Result<()> {
    let ng = omega.nghost();
    let columns = cells.grow([ng[0].min(1), ng[1].min(1), 0]);
    let faces = columns.convert(Staggering::ZFace);
    rho_w.ensure_contains(&faces, "rho_w")?;
    omega.ensure_contains(&faces, "omega")?;
    match metrics {
        None => {
            omega.for_each_mut(&faces, 0..1, |i, j, k, _, v| *v = rho_w[(i, j, k)]);
        }
        Some(m) => {
            rho_u.ensure_contains(&columns.convert(Staggering::XFace), "rho_u")?;
            rho_v.ensure_contains(&columns.convert(Staggering::YFace), "rho_v")?;
            omega.for_each_mut(&faces, 0..1, |i, j, k, _, v| {
                *v = omega_from_w(i, j, k, rho_w[(i, j, k)], rho_u, rho_v, m);
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Geometry;
    use crate::vertical::UniformStretching;

    fn setup(slope: f64) -> (Geometry, TerrainMetrics, Field, Field, Field) {
        let geom = Geometry::uniform([4, 3, 5], [100.0, 100.0, 100.0]);
        let m = TerrainMetrics::from_surface(&geom, [1, 1, 1], &UniformStretching, move |x, _| slope * x);
        let ru = Field::filled(geom.domain, Staggering::XFace, 1, [1, 1, 1], 10.0);
        let rv = Field::filled(geom.domain, Staggering::YFace, 1, [1, 1, 1], 0.0);
        let rw = Field::filled(geom.domain, Staggering::ZFace, 1, [1, 1, 1], 0.5);
        (geom, m, ru, rv, rw)
    }

    #[test]
    fn test_flat_omega_equals_rho_w() {
        let (geom, m, ru, rv, rw) = setup(0.0);
        let mut om = Field::new(geom.domain, Staggering::ZFace, 1, [1, 1, 1]);
        compute_omega(&geom.domain, &ru, &rv, &rw, Some(&m), &mut om).unwrap();
        for (i, j, k) in geom.domain.convert(Staggering::ZFace).iter() {
            assert!((om[(i, j, k)] - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_omega_w_round_trip_on_slope() {
        let (_geom, m, ru, rv, _rw) = setup(0.05);
        for k in 0..=5 {
            let om = omega_from_w(1, 1, k, 0.7, &ru, &rv, &m);
            let w = w_from_omega(1, 1, k, om, &ru, &rv, &m);
            assert!((w - 0.7).abs() < 1e-12);
        }
        // Flow along the surface has no contravariant vertical flux
        let h_xi = m.h_xi_at_kface(1, 1, 0);
        let om = omega_from_w(1, 1, 0, 10.0 * h_xi, &ru, &rv, &m);
        assert!(om.abs() < 1e-12);
    }
}
