//! Stage update without acoustic substepping.
//!
//! With static terrain every component is advanced additively,
//! `new = old + dt · F`. On moving terrain the conserved quantity is the
//! Jacobian-weighted value, so the update is
//!
//! ```text
//! J_new · new = J_old · old + dt · F
//! ```
//!
//! with `F` already multiplied by the Jacobian (see
//! [`DycoreRhs::with_moving_terrain`](crate::rhs::DycoreRhs::with_moving_terrain)).
//! Horizontal momentum uses `h_zeta` at its face, vertical momentum the
//! z-face Jacobian on every face above the ground. Vertical momentum on the
//! bottom face is not integrated: it follows from the updated horizontal
//! momentum and the grid speed through the slip-wall condition Ω = ρ z_t.

use crate::error::{Result, SolverError};
use crate::field::Field;
use crate::state::StateVector;
use crate::types::{Direction, IndexBox};
use crate::vertical::{TerrainMetrics, w_from_omega};

/// Terrain geometry at both ends of a moving-terrain stage.
#[derive(Clone, Copy, Debug)]
pub struct TerrainStep<'a> {
    pub old: &'a TerrainMetrics,
    pub new: &'a TerrainMetrics,
    /// Grid speed at z-faces over the stage.
    pub z_t: &'a Field,
}

/// Advance `old` by `dt` with the frozen tendency `tendency` into `new`.
///
/// Only valid cells and faces are written; ghost cells are left for the
/// boundary filler.
pub fn no_substep_update(
    old: &StateVector,
    tendency: &StateVector,
    dt: f64,
    terrain: Option<&TerrainStep<'_>>,
    new: &mut StateVector,
) -> Result<()> {
    if old.cells() != new.cells() || old.ncons() != new.ncons() {
        return Err(SolverError::shape_mismatch(
            "stage state",
            format!("{} x{}", old.cells(), old.ncons()),
            format!("{} x{}", new.cells(), new.ncons()),
        ));
    }
    let cells = old.cells();
    let ncons = old.ncons();
    let xf = cells.surrounding_nodes(Direction::X);
    let yf = cells.surrounding_nodes(Direction::Y);
    let zf = cells.surrounding_nodes(Direction::Z);

    match terrain {
        None => {
            let (o, f) = (&old.cons, &tendency.cons);
            new.cons.for_each_mut(&cells, 0..ncons, |i, j, k, n, v| {
                *v = o[(i, j, k, n)] + dt * f[(i, j, k, n)];
            });
            additive(&old.xmom, &tendency.xmom, dt, &xf, &mut new.xmom);
            additive(&old.ymom, &tendency.ymom, dt, &yf, &mut new.ymom);
            additive(&old.zmom, &tendency.zmom, dt, &zf, &mut new.zmom);
        }
        Some(step) => {
            let (m_old, m_new) = (step.old, step.new);
            let (dj_old, dj_new) = (m_old.detj(), m_new.detj());
            let (o, f) = (&old.cons, &tendency.cons);
            new.cons.for_each_mut(&cells, 0..ncons, |i, j, k, n, v| {
                *v = (dj_old[(i, j, k)] * o[(i, j, k, n)] + dt * f[(i, j, k, n)]) / dj_new[(i, j, k)];
            });
            let (o, f) = (&old.xmom, &tendency.xmom);
            new.xmom.for_each_mut(&xf, 0..1, |i, j, k, _, v| {
                *v = (m_old.h_zeta_at_iface(i, j, k) * o[(i, j, k)] + dt * f[(i, j, k)])
                    / m_new.h_zeta_at_iface(i, j, k);
            });
            let (o, f) = (&old.ymom, &tendency.ymom);
            new.ymom.for_each_mut(&yf, 0..1, |i, j, k, _, v| {
                *v = (m_old.h_zeta_at_jface(i, j, k) * o[(i, j, k)] + dt * f[(i, j, k)])
                    / m_new.h_zeta_at_jface(i, j, k);
            });

            // Every face above the ground integrates, the lid included
            let (o, f) = (&old.zmom, &tendency.zmom);
            let bottom = cells.lo[2];
            new.zmom.for_each_mut(&zf, 0..1, |i, j, k, _, v| {
                if k > bottom {
                    *v = (m_old.detj_at_kface(i, j, k) * o[(i, j, k)] + dt * f[(i, j, k)])
                        / m_new.detj_at_kface(i, j, k);
                }
            });
            apply_moving_slip_wall(step.z_t, m_new, new)?;
        }
    }
    Ok(())
}

/// Set ρw on the bottom faces of `state` so that Ω = ρ z_t, a slip wall
/// moving with the terrain.
pub(crate) fn apply_moving_slip_wall(z_t: &Field, metrics: &TerrainMetrics, state: &mut StateVector) -> Result<()> {
    let cells = state.cells();
    let zf = cells.surrounding_nodes(Direction::Z);
    let bottom_faces = IndexBox::new(zf.lo, [zf.hi[0], zf.hi[1], cells.lo[2]]);
    z_t.ensure_contains(&bottom_faces, "grid velocity")?;
    let (rho_u, rho_v, cons) = (&state.xmom, &state.ymom, &state.cons);
    state.zmom.for_each_mut(&bottom_faces, 0..1, |i, j, k, _, v| {
        let omega = cons[(i, j, k, 0)] * z_t[(i, j, k)];
        *v = w_from_omega(i, j, k, omega, rho_u, rho_v, metrics);
    });
    Ok(())
}

fn additive(old: &Field, tendency: &Field, dt: f64, region: &IndexBox, new: &mut Field) {
    new.for_each_mut(region, 0..1, |i, j, k, _, v| {
        *v = old[(i, j, k)] + dt * tendency[(i, j, k)];
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Integrable;
    use crate::types::Geometry;
    use crate::vertical::{UniformStretching, grid_velocity, omega_from_w};

    fn filled_state(cells: IndexBox, seed: f64) -> StateVector {
        let mut s = StateVector::new(cells, 3, [1, 1, 1]);
        let fill = |f: &mut Field, c: f64| {
            let g = f.grown_box();
            f.for_each_mut(&g, 0..f.ncomp(), |i, j, k, n, v| {
                *v = c + 0.1 * (i as f64) - 0.2 * (j as f64) + 0.05 * (k as f64) + n as f64
            });
        };
        fill(&mut s.cons, seed);
        fill(&mut s.xmom, seed + 1.0);
        fill(&mut s.ymom, seed + 2.0);
        fill(&mut s.zmom, seed + 3.0);
        s
    }

    #[test]
    fn test_static_update_is_additive() {
        let cells = IndexBox::cells(4, 3, 5);
        let old = filled_state(cells, 1.0);
        let f = filled_state(cells, -0.5);
        let mut new = old.zeros_like();
        let dt = 0.37;
        no_substep_update(&old, &f, dt, None, &mut new).unwrap();
        for (i, j, k) in cells.iter() {
            for n in 0..3 {
                assert_eq!(new.cons[(i, j, k, n)], old.cons[(i, j, k, n)] + dt * f.cons[(i, j, k, n)]);
            }
        }
        for (i, j, k) in cells.surrounding_nodes(Direction::Z).iter() {
            assert_eq!(new.zmom[(i, j, k)], old.zmom[(i, j, k)] + dt * f.zmom[(i, j, k)]);
        }
        // ghost cells untouched
        assert_eq!(new.cons[(-1, 0, 0, 0)], 0.0);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let old = filled_state(IndexBox::cells(4, 3, 5), 1.0);
        let f = old.clone();
        let mut new = StateVector::new(IndexBox::cells(4, 3, 4), 3, [1, 1, 1]);
        assert!(no_substep_update(&old, &f, 1.0, None, &mut new).is_err());
    }

    #[test]
    fn test_moving_terrain_preserves_uniform_density() {
        let geom = Geometry::uniform([8, 1, 6], [100.0, 100.0, 100.0]);
        let hill = |t: f64| move |x: f64, _y: f64| 50.0 * t * (-((x - 400.0) / 200.0).powi(2)).exp();
        let m_old = TerrainMetrics::from_surface(&geom, [1, 1, 1], &UniformStretching, hill(0.0));
        let m_new = TerrainMetrics::from_surface(&geom, [1, 1, 1], &UniformStretching, hill(1.0));
        let dt = 1.0;
        let z_t = grid_velocity(&m_old, &m_new, &geom.domain, dt).unwrap();

        let cells = geom.domain;
        let mut old = StateVector::new(cells, 2, [1, 1, 1]);
        old.cons.fill(1.0);
        // Geometric conservation: d(J)/dt = ∂z_t/∂ζ, times ρ = 1
        let mut f = old.zeros_like();
        let dz_inv = geom.inv_cell_size()[2];
        f.cons.for_each_mut(&cells, 0..2, |i, j, k, _, v| {
            *v = (z_t[(i, j, k + 1)] - z_t[(i, j, k)]) * dz_inv;
        });
        let step = TerrainStep {
            old: &m_old,
            new: &m_new,
            z_t: &z_t,
        };
        let mut new = old.zeros_like();
        no_substep_update(&old, &f, dt, Some(&step), &mut new).unwrap();
        for (i, j, k) in cells.iter() {
            assert!((new.cons[(i, j, k, 0)] - 1.0).abs() < 1e-10);
        }
        // at rest on a rising surface the bottom face moves with the ground
        for i in 0..8 {
            let expected = new.cons[(i, 0, 0, 0)] * z_t[(i, 0, 0)];
            assert!((new.zmom[(i, 0, 0)] - expected).abs() < 1e-12);
        }
    }

    /// Bell-shaped hill over both horizontal directions, growing in time.
    fn growing_hill(geom: &Geometry, dt: f64) -> (TerrainMetrics, TerrainMetrics, Field) {
        let hill = |t: f64| {
            move |x: f64, y: f64| 40.0 * (1.0 + t) * (-((x - 400.0) / 250.0).powi(2) - ((y - 300.0) / 200.0).powi(2)).exp()
        };
        let m_old = TerrainMetrics::from_surface(geom, [1, 1, 1], &UniformStretching, hill(0.0));
        let m_new = TerrainMetrics::from_surface(geom, [1, 1, 1], &UniformStretching, hill(dt));
        let z_t = grid_velocity(&m_old, &m_new, &geom.domain, dt).unwrap();
        (m_old, m_new, z_t)
    }

    #[test]
    fn test_bottom_face_follows_sloped_moving_ground() {
        let geom = Geometry::uniform([8, 6, 5], [100.0, 100.0, 100.0]);
        let dt = 0.5;
        let (m_old, m_new, z_t) = growing_hill(&geom, dt);
        let cells = geom.domain;
        let old = filled_state(cells, 3.0);
        let f = filled_state(cells, 0.2);
        let step = TerrainStep {
            old: &m_old,
            new: &m_new,
            z_t: &z_t,
        };
        let mut new = old.zeros_like();
        no_substep_update(&old, &f, dt, Some(&step), &mut new).unwrap();

        let mut slope_flux = 0.0f64;
        for j in 0..6 {
            for i in 0..8 {
                let ru = 0.5 * (new.xmom[(i, j, 0)] + new.xmom[(i + 1, j, 0)]);
                let rv = 0.5 * (new.ymom[(i, j, 0)] + new.ymom[(i, j + 1, 0)]);
                let (h_xi, h_eta) = (m_new.h_xi_at_kface(i, j, 0), m_new.h_eta_at_kface(i, j, 0));
                let rho_zt = new.cons[(i, j, 0, 0)] * z_t[(i, j, 0)];
                let expected = rho_zt + ru * h_xi + rv * h_eta;
                assert!((new.zmom[(i, j, 0)] - expected).abs() < 1e-12 * (1.0 + expected.abs()));
                let omega = omega_from_w(i, j, 0, new.zmom[(i, j, 0)], &new.xmom, &new.ymom, &m_new);
                assert!((omega - rho_zt).abs() < 1e-12 * (1.0 + rho_zt.abs()));
                slope_flux = slope_flux.max((ru * h_xi).abs()).max((rv * h_eta).abs());
            }
        }
        // the horizontal flow crosses the slope, not just the rising ground
        assert!(slope_flux > 1e-3, "{slope_flux}");
    }

    #[test]
    fn test_lid_face_is_jacobian_weighted() {
        let geom = Geometry::uniform([8, 6, 5], [100.0, 100.0, 100.0]);
        let dt = 0.5;
        let (m_old, m_new, z_t) = growing_hill(&geom, dt);
        let cells = geom.domain;
        let old = filled_state(cells, 3.0);
        let f = filled_state(cells, -1.0);
        let step = TerrainStep {
            old: &m_old,
            new: &m_new,
            z_t: &z_t,
        };
        let mut new = old.zeros_like();
        no_substep_update(&old, &f, dt, Some(&step), &mut new).unwrap();

        let top = cells.hi[2] + 1;
        for (i, j, _) in IndexBox::new([0, 0, top], [7, 5, top]).iter() {
            let expected = (m_old.detj_at_kface(i, j, top) * old.zmom[(i, j, top)] + dt * f.zmom[(i, j, top)])
                / m_new.detj_at_kface(i, j, top);
            assert!((new.zmom[(i, j, top)] - expected).abs() < 1e-12 * expected.abs().max(1.0));
            assert!((new.zmom[(i, j, top)] - old.zmom[(i, j, top)]).abs() > 1e-6);
        }
    }
}
