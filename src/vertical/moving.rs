//! Time-dependent terrain.
//!
//! Moving terrain is described by a surface height `h(x, y, t)`. Every slow
//! step the integrator rebuilds the metrics at the new time and derives the
//! grid speed `z_t` at z-faces from the old and new heights.

use crate::error::Result;
use crate::field::Field;
use crate::types::{Geometry, IndexBox, Staggering};

use super::metrics::z_at_kface;
use super::stretching::Stretching;
use super::terrain::TerrainMetrics;

/// Prescribed surface motion.
///
/// Any `Fn(x, y, t) -> h` closure implements this trait.
pub trait SurfaceMotion: Send + Sync {
    /// Surface height at `(x, y)` and time `t`.
    fn height(&self, x: f64, y: f64, time: f64) -> f64;
}

impl<F> SurfaceMotion for F
where
    F: Fn(f64, f64, f64) -> f64 + Send + Sync,
{
    #[inline]
    fn height(&self, x: f64, y: f64, time: f64) -> f64 {
        self(x, y, time)
    }
}

/// Terrain whose surface follows a [`SurfaceMotion`].
pub struct MovingTerrain<M: SurfaceMotion> {
    motion: M,
    levels: Vec<f64>,
    geom: Geometry,
    nghost: [usize; 3],
}

impl<M: SurfaceMotion> MovingTerrain<M> {
    /// Create moving terrain over the given level distribution.
    pub fn new<S: Stretching + ?Sized>(geom: &Geometry, nghost: [usize; 3], stretching: &S, motion: M) -> Self {
        Self {
            motion,
            levels: stretching.levels(geom.num_cells()[2], geom.prob_hi()[2]),
            geom: *geom,
            nghost,
        }
    }

    /// Metrics of the terrain at `time`.
    pub fn metrics_at(&self, time: f64) -> Result<TerrainMetrics> {
        let motion = &self.motion;
        TerrainMetrics::from_levels(&self.geom, self.nghost, &self.levels, |x, y| {
            motion.height(x, y, time)
        })
    }
}

/// Grid speed `z_t` at z-faces from two height fields `dt` apart.
pub fn grid_velocity(
    old: &TerrainMetrics,
    new: &TerrainMetrics,
    cells: &IndexBox,
    dt: f64,
) -> Result<Field> {
    let nghost = old.z_nd().nghost();
    let mut z_t = Field::new(*cells, Staggering::ZFace, 1, nghost);
    let region = z_t.grown_box();
    new.z_nd().ensure_contains(&region.convert(Staggering::Node), "z_nd")?;
    let inv_dt = 1.0 / dt;
    z_t.for_each_mut(&region, 0..1, |i, j, k, _, v| {
        *v = (z_at_kface(i, j, k, new.z_nd()) - z_at_kface(i, j, k, old.z_nd())) * inv_dt;
    });
    Ok(z_t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertical::UniformStretching;

    #[test]
    fn test_rising_plateau_grid_velocity() {
        let geom = Geometry::uniform([4, 4, 10], [100.0, 100.0, 100.0]);
        let terrain = MovingTerrain::new(&geom, [1, 1, 1], &UniformStretching, |_x: f64, _y: f64, t: f64| 2.0 * t);
        let old = terrain.metrics_at(0.0).unwrap();
        let new = terrain.metrics_at(1.0).unwrap();
        let z_t = grid_velocity(&old, &new, &IndexBox::cells(4, 4, 10), 1.0).unwrap();
        // Surface rises at 2 m/s, the lid stays fixed
        assert!((z_t[(1, 1, 0)] - 2.0).abs() < 1e-12);
        assert!((z_t[(1, 1, 5)] - 1.0).abs() < 1e-12);
        assert!(z_t[(1, 1, 10)].abs() < 1e-12);
    }

    #[test]
    fn test_static_motion_has_zero_speed() {
        let geom = Geometry::uniform([3, 3, 4], [10.0, 10.0, 10.0]);
        let terrain = MovingTerrain::new(&geom, [1, 1, 1], &UniformStretching, |x: f64, _y: f64, _t: f64| 0.01 * x);
        let a = terrain.metrics_at(0.0).unwrap();
        let b = terrain.metrics_at(5.0).unwrap();
        let z_t = grid_velocity(&a, &b, &geom.domain, 5.0).unwrap();
        assert!(z_t.as_slice().iter().all(|v| v.abs() < 1e-14));
    }
}
