//! Coriolis force on the staggered momentum components.
//!
//! With `f = coriolis_factor · sin φ` and `e = coriolis_factor · cos φ`:
//!
//! ```text
//! ∂(ρu)/∂t += f ρv − e ρw
//! ∂(ρv)/∂t += −f ρu
//! ∂(ρw)/∂t += e ρu
//! ```
//!
//! Momentum from other faces is averaged over the four nearest neighbours.

use crate::error::Result;
use crate::state::StateVector;
use crate::types::{Direction, IndexBox};

/// Rotation parameters, precomputed once per run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coriolis {
    /// `4π / rotational period`
    pub factor: f64,
    pub sinphi: f64,
    pub cosphi: f64,
}

impl Coriolis {
    /// Add the Coriolis tendencies on the faces of `region`.
    pub fn add_tendency(&self, region: &IndexBox, state: &StateVector, rhs: &mut StateVector) -> Result<()> {
        let (ru, rv, rw) = (&state.xmom, &state.ymom, &state.zmom);
        ru.ensure_halo(&region.surrounding_nodes(Direction::X), [1, 1, 1], "rho_u")?;
        rv.ensure_halo(&region.surrounding_nodes(Direction::Y), [1, 1, 1], "rho_v")?;
        rw.ensure_halo(&region.surrounding_nodes(Direction::Z), [1, 1, 1], "rho_w")?;
        let f = self.factor * self.sinphi;
        let e = self.factor * self.cosphi;

        rhs.xmom.for_each_mut(&region.surrounding_nodes(Direction::X), 0..1, |i, j, k, _, s| {
            let v = 0.25 * (rv[(i, j, k)] + rv[(i, j + 1, k)] + rv[(i - 1, j, k)] + rv[(i - 1, j + 1, k)]);
            let w = 0.25 * (rw[(i, j, k)] + rw[(i, j, k + 1)] + rw[(i - 1, j, k)] + rw[(i - 1, j, k + 1)]);
            *s += f * v - e * w;
        });
        rhs.ymom.for_each_mut(&region.surrounding_nodes(Direction::Y), 0..1, |i, j, k, _, s| {
            let u = 0.25 * (ru[(i, j, k)] + ru[(i + 1, j, k)] + ru[(i, j - 1, k)] + ru[(i + 1, j - 1, k)]);
            *s -= f * u;
        });
        let cells = state.cells();
        rhs.zmom.for_each_mut(&region.surrounding_nodes(Direction::Z), 0..1, |i, j, k, _, s| {
            if k > cells.lo[2] && k <= cells.hi[2] {
                let u = 0.25 * (ru[(i, j, k)] + ru[(i + 1, j, k)] + ru[(i, j, k - 1)] + ru[(i + 1, j, k - 1)]);
                *s += e * u;
            }
        });
        Ok(())
    }
}
