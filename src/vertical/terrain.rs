//! Terrain-following height field and its derived Jacobian.

use crate::error::{Result, SolverError};
use crate::field::Field;
use crate::types::{Geometry, Staggering};

use super::metrics::{
    h_eta_at_jface, h_eta_at_kface, h_xi_at_iface, h_xi_at_kface, h_zeta_at_cell_center,
    h_zeta_at_iface, h_zeta_at_jface, h_zeta_at_kface,
};
use super::stretching::{Stretching, UniformStretching};

/// Node heights `z_nd` together with the cell Jacobian `detJ` derived from
/// them.
///
/// The two buffers are private and only ever rebuilt together, so the
/// Jacobian can never drift from the heights it was computed from. Face
/// metrics (`h_zeta`, `h_xi`, `h_eta`) are evaluated on demand from `z_nd`.
///
/// # Example
///
/// ```
/// use dycore_rs::types::Geometry;
/// use dycore_rs::vertical::TerrainMetrics;
///
/// let geom = Geometry::uniform([8, 8, 10], [100.0, 100.0, 50.0]);
/// let metrics = TerrainMetrics::flat(&geom, [2, 2, 1]);
/// assert!((metrics.detj()[(3, 3, 3)] - 1.0).abs() < 1e-12);
/// assert!(metrics.h_xi_at_kface(3, 3, 3).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct TerrainMetrics {
    z_nd: Field,
    detj: Field,
    inv_cell_size: [f64; 3],
}

impl TerrainMetrics {
    /// Flat terrain with uniform levels: `z_nd(i, j, k) = k·dζ`.
    pub fn flat(geom: &Geometry, nghost: [usize; 3]) -> Self {
        let levels = UniformStretching.levels(geom.num_cells()[2], geom.prob_hi()[2]);
        Self::build(geom, nghost, &levels, |_, _| 0.0)
    }

    /// Basic terrain-following heights over the surface `h(x, y)`.
    ///
    /// Node levels come from `stretching`; each level is deformed by
    /// `z = ζ + h (1 - ζ / z_top)` so the surface follows the terrain and
    /// the model top stays flat.
    pub fn from_surface<S, H>(geom: &Geometry, nghost: [usize; 3], stretching: &S, surface: H) -> Self
    where
        S: Stretching + ?Sized,
        H: Fn(f64, f64) -> f64 + Sync + Send,
    {
        let levels = stretching.levels(geom.num_cells()[2], geom.prob_hi()[2]);
        Self::build(geom, nghost, &levels, surface)
    }

    /// Same as [`from_surface`](Self::from_surface) with explicit node levels.
    pub fn from_levels<H>(geom: &Geometry, nghost: [usize; 3], levels: &[f64], surface: H) -> Result<Self>
    where
        H: Fn(f64, f64) -> f64 + Sync + Send,
    {
        let nz = geom.num_cells()[2];
        if levels.len() != nz + 1 || nz == 0 {
            return Err(SolverError::shape_mismatch(
                "z levels",
                format!("{} levels", nz + 1),
                format!("{} levels", levels.len()),
            ));
        }
        Ok(Self::build(geom, nghost, levels, surface))
    }

    /// Adopt an externally computed node height field.
    pub fn from_heights(geom: &Geometry, z_nd: Field) -> Result<Self> {
        if z_nd.location() != Staggering::Node || z_nd.valid_box() != geom.domain.convert(Staggering::Node) {
            return Err(SolverError::shape_mismatch(
                "z_nd",
                format!("node field on {}", geom.domain.convert(Staggering::Node)),
                format!("{} field on {}", z_nd.location(), z_nd.valid_box()),
            ));
        }
        let nghost = z_nd.nghost();
        if nghost.iter().any(|g| *g == 0) {
            return Err(SolverError::HaloTooSmall {
                field: "z_nd",
                needed: [1, 1, 1],
                available: nghost,
            });
        }
        let inv_cell_size = geom.inv_cell_size();
        let detj = Self::jacobian(geom, &z_nd, &inv_cell_size);
        Ok(Self {
            z_nd,
            detj,
            inv_cell_size,
        })
    }

    fn build<H>(geom: &Geometry, nghost: [usize; 3], levels: &[f64], surface: H) -> Self
    where
        H: Fn(f64, f64) -> f64 + Sync + Send,
    {
        let nghost = [nghost[0].max(1), nghost[1].max(1), nghost[2].max(1)];
        let nz = levels.len() as i32 - 1;
        let z_top = levels[levels.len() - 1];
        let level = |k: i32| -> f64 {
            if k < 0 {
                levels[0] + k as f64 * (levels[1] - levels[0])
            } else if k > nz {
                levels[nz as usize]
                    + (k - nz) as f64 * (levels[nz as usize] - levels[nz as usize - 1])
            } else {
                levels[k as usize]
            }
        };

        let mut z_nd = Field::new(geom.domain, Staggering::Node, 1, nghost);
        let grown = z_nd.grown_box();
        z_nd.for_each_mut(&grown, 0..1, |i, j, k, _, z| {
            let zeta = level(k);
            let h = surface(geom.node_coord(0, i), geom.node_coord(1, j));
            *z = zeta + h * (1.0 - zeta / z_top);
        });

        let inv_cell_size = geom.inv_cell_size();
        let detj = Self::jacobian(geom, &z_nd, &inv_cell_size);
        Self {
            z_nd,
            detj,
            inv_cell_size,
        }
    }

    fn jacobian(geom: &Geometry, z_nd: &Field, inv_cell_size: &[f64; 3]) -> Field {
        let nghost = z_nd.nghost();
        let mut detj = Field::new(geom.domain, Staggering::CellCentered, 1, nghost);
        let grown = detj.grown_box();
        detj.for_each_mut(&grown, 0..1, |i, j, k, _, v| {
            *v = h_zeta_at_cell_center(i, j, k, inv_cell_size, z_nd);
        });
        detj
    }

    /// Node heights.
    #[inline]
    pub fn z_nd(&self) -> &Field {
        &self.z_nd
    }

    /// Cell Jacobian.
    #[inline]
    pub fn detj(&self) -> &Field {
        &self.detj
    }

    /// Inverse computational cell sizes the metrics were built with.
    #[inline]
    pub fn inv_cell_size(&self) -> &[f64; 3] {
        &self.inv_cell_size
    }

    #[inline]
    pub fn h_zeta_at_iface(&self, i: i32, j: i32, k: i32) -> f64 {
        h_zeta_at_iface(i, j, k, &self.inv_cell_size, &self.z_nd)
    }

    #[inline]
    pub fn h_zeta_at_jface(&self, i: i32, j: i32, k: i32) -> f64 {
        h_zeta_at_jface(i, j, k, &self.inv_cell_size, &self.z_nd)
    }

    #[inline]
    pub fn h_zeta_at_kface(&self, i: i32, j: i32, k: i32) -> f64 {
        h_zeta_at_kface(i, j, k, &self.inv_cell_size, &self.z_nd)
    }

    #[inline]
    pub fn h_xi_at_kface(&self, i: i32, j: i32, k: i32) -> f64 {
        h_xi_at_kface(i, j, k, &self.inv_cell_size, &self.z_nd)
    }

    #[inline]
    pub fn h_eta_at_kface(&self, i: i32, j: i32, k: i32) -> f64 {
        h_eta_at_kface(i, j, k, &self.inv_cell_size, &self.z_nd)
    }

    #[inline]
    pub fn h_xi_at_iface(&self, i: i32, j: i32, k: i32) -> f64 {
        h_xi_at_iface(i, j, k, &self.inv_cell_size, &self.z_nd)
    }

    #[inline]
    pub fn h_eta_at_jface(&self, i: i32, j: i32, k: i32) -> f64 {
        h_eta_at_jface(i, j, k, &self.inv_cell_size, &self.z_nd)
    }

    /// Jacobian averaged onto the z-face `(i, j, k)`.
    #[inline]
    pub fn detj_at_kface(&self, i: i32, j: i32, k: i32) -> f64 {
        0.5 * (self.detj[(i, j, k - 1)] + self.detj[(i, j, k)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertical::GeometricStretching;

    fn geom() -> Geometry {
        Geometry::uniform([6, 5, 8], [200.0, 200.0, 125.0])
    }

    #[test]
    fn test_flat_terrain_degenerates_to_cartesian() {
        let g = geom();
        let m = TerrainMetrics::flat(&g, [2, 2, 1]);
        for (i, j, k) in g.domain.iter() {
            assert!((m.detj()[(i, j, k)] - 1.0).abs() < 1e-12);
            assert!((m.h_zeta_at_iface(i, j, k) - 1.0).abs() < 1e-12);
            assert!((m.h_zeta_at_jface(i, j, k) - 1.0).abs() < 1e-12);
            assert!(m.h_xi_at_kface(i, j, k).abs() < 1e-12);
            assert!(m.h_eta_at_kface(i, j, k).abs() < 1e-12);
            assert!(m.h_xi_at_iface(i, j, k).abs() < 1e-12);
        }
        assert_eq!(m.z_nd()[(0, 0, 3)], 375.0);
    }

    #[test]
    fn test_linear_ramp_slope() {
        // h = 0.1 x gives ∂z/∂x = 0.1 (1 - z/z_top) on every level
        let g = geom();
        let z_top = g.prob_hi()[2];
        let m = TerrainMetrics::from_surface(&g, [1, 1, 1], &UniformStretching, |x, _| 0.1 * x);
        let k = 4;
        let zeta = k as f64 * 125.0;
        let expected = 0.1 * (1.0 - zeta / z_top);
        assert!((m.h_xi_at_kface(2, 2, k) - expected).abs() < 1e-12);
        assert!(m.h_eta_at_kface(2, 2, k).abs() < 1e-12);
        // Columns are compressed by the surface height
        let h = 0.1 * g.cell_coord(0, 2);
        assert!((m.detj()[(2, 2, 0)] - (1.0 - h / z_top)).abs() < 1e-12);
    }

    #[test]
    fn test_stretched_levels_change_jacobian() {
        let g = geom();
        let m = TerrainMetrics::from_surface(&g, [1, 1, 1], &GeometricStretching { ratio: 1.1 }, |_, _| 0.0);
        assert!(m.detj()[(0, 0, 0)] < 1.0);
        assert!(m.detj()[(0, 0, 7)] > 1.0);
        // Column integral of detJ·dζ is the model top
        let total: f64 = (0..8).map(|k| m.detj()[(0, 0, k)] * 125.0).sum();
        assert!((total - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_levels_rejects_wrong_length() {
        let g = geom();
        assert!(TerrainMetrics::from_levels(&g, [1, 1, 1], &[0.0, 1.0], |_, _| 0.0).is_err());
    }
}
