//! Flux-divergence advection tendencies for cell-centred variables.
//!
//! Two passes share one set of face mass fluxes:
//!
//! 1. [`advection_src_for_rho_and_theta`] forms the face mass fluxes from
//!    momentum, deposits `fac · flux` into the [`FluxAccumulator`], and
//!    writes the tendencies of ρ and ρθ.
//! 2. [`advection_src_for_scalars`] transports every other scalar with the
//!    fluxes stored in the accumulator, never with the instantaneous
//!    momentum. With acoustic substepping the accumulator holds the
//!    substep-averaged fluxes, so scalars see exactly the mass transport
//!    that moved ρ.
//!
//! Horizontal fluxes are divided by the face map factor and, over terrain,
//! multiplied by `h_zeta` at the face; the vertical flux is Ω (ρw on a flat
//! grid). Divergences are scaled by `mf_m²` horizontally and by `1/detJ`.

use crate::error::{Result, SolverError};
use crate::field::{Field, MapFactors};
use crate::types::{Direction, IndexBox, Staggering};
use crate::vertical::TerrainMetrics;

use super::interpolator::Interpolator;

/// Running sums of face mass fluxes shared by the two advection passes.
///
/// Created zeroed at stage entry, filled by the rho/theta pass and read by
/// the scalar pass of the same stage.
#[derive(Clone, Debug)]
pub struct FluxAccumulator {
    avg_xmom: Field,
    avg_ymom: Field,
    avg_zmom: Field,
}

impl FluxAccumulator {
    /// Zeroed accumulator on the faces of `cells`.
    pub fn new(cells: &IndexBox, nghost: [usize; 3]) -> Self {
        Self {
            avg_xmom: Field::new(*cells, Staggering::XFace, 1, nghost),
            avg_ymom: Field::new(*cells, Staggering::YFace, 1, nghost),
            avg_zmom: Field::new(*cells, Staggering::ZFace, 1, nghost),
        }
    }

    /// Zero all sums.
    pub fn reset(&mut self) {
        self.avg_xmom.fill(0.0);
        self.avg_ymom.fill(0.0);
        self.avg_zmom.fill(0.0);
    }

    /// Accumulated x-face mass flux.
    #[inline]
    pub fn avg_xmom(&self) -> &Field {
        &self.avg_xmom
    }

    /// Accumulated y-face mass flux.
    #[inline]
    pub fn avg_ymom(&self) -> &Field {
        &self.avg_ymom
    }

    /// Accumulated z-face mass flux.
    #[inline]
    pub fn avg_zmom(&self) -> &Field {
        &self.avg_zmom
    }

    fn ensure_covers(&self, region: &IndexBox) -> Result<()> {
        self.avg_xmom.ensure_contains(&region.surrounding_nodes(Direction::X), "avg_xmom")?;
        self.avg_ymom.ensure_contains(&region.surrounding_nodes(Direction::Y), "avg_ymom")?;
        self.avg_zmom.ensure_contains(&region.surrounding_nodes(Direction::Z), "avg_zmom")
    }
}

/// Grid information consumed by the advection kernels.
#[derive(Clone, Copy, Debug)]
pub struct AdvectionGrid<'a> {
    /// 1/dx, 1/dy, 1/dζ
    pub inv_cell_size: [f64; 3],
    /// Terrain metrics; `None` on a flat Cartesian grid.
    pub metrics: Option<&'a TerrainMetrics>,
    /// Map factors; `None` when map projection is off.
    pub map_factors: Option<&'a MapFactors>,
}

impl AdvectionGrid<'_> {
    /// Map factor at cell centre `(i, j)`.
    #[inline]
    pub fn mf_m(&self, i: i32, j: i32) -> f64 {
        self.map_factors.map_or(1.0, |mf| mf.m(i, j))
    }

    /// Map factor at x-face `(i, j)`.
    #[inline]
    pub fn mf_u(&self, i: i32, j: i32) -> f64 {
        self.map_factors.map_or(1.0, |mf| mf.u(i, j))
    }

    /// Map factor at y-face `(i, j)`.
    #[inline]
    pub fn mf_v(&self, i: i32, j: i32) -> f64 {
        self.map_factors.map_or(1.0, |mf| mf.v(i, j))
    }

    /// Mass flux through x-face `(i, j, k)`.
    #[inline]
    pub fn xflux(&self, rho_u: &Field, i: i32, j: i32, k: i32) -> f64 {
        let flux = rho_u[(i, j, k)] / self.mf_u(i, j);
        match self.metrics {
            Some(m) => flux * m.h_zeta_at_iface(i, j, k),
            None => flux,
        }
    }

    /// Mass flux through y-face `(i, j, k)`.
    #[inline]
    pub fn yflux(&self, rho_v: &Field, i: i32, j: i32, k: i32) -> f64 {
        let flux = rho_v[(i, j, k)] / self.mf_v(i, j);
        match self.metrics {
            Some(m) => flux * m.h_zeta_at_jface(i, j, k),
            None => flux,
        }
    }

    /// 1/detJ at cell `(i, j, k)`.
    #[inline]
    pub fn inv_detj(&self, i: i32, j: i32, k: i32) -> f64 {
        match self.metrics {
            Some(m) => 1.0 / m.detj()[(i, j, k)],
            None => 1.0,
        }
    }

    fn ensure_covers(&self, region: &IndexBox) -> Result<()> {
        if let Some(mf) = self.map_factors {
            mf.ensure_covers(region)?;
        }
        if let Some(m) = self.metrics {
            m.detj().ensure_contains(region, "detJ")?;
            m.z_nd().ensure_contains(&region.convert(Staggering::Node), "z_nd")?;
        }
        Ok(())
    }
}

/// Face fluxes of one cell: `[x_lo, x_hi, y_lo, y_hi, z_lo, z_hi]`.
type CellFluxes = [f64; 6];

/// Flux divergence of a cell from its face fluxes and face values.
#[inline(always)]
fn divergence(
    flux: &CellFluxes,
    value: &CellFluxes,
    inv_detj: f64,
    mfsq: f64,
    inv_cell_size: &[f64; 3],
) -> f64 {
    -inv_detj
        * ((flux[1] * value[1] - flux[0] * value[0]) * inv_cell_size[0] * mfsq
            + (flux[3] * value[3] - flux[2] * value[2]) * inv_cell_size[1] * mfsq
            + (flux[5] * value[5] - flux[4] * value[4]) * inv_cell_size[2])
}

/// Face values of primitive component `prim` around cell `(i, j, k)`.
#[inline(always)]
fn face_values(interp: &Interpolator, q: &Field, i: i32, j: i32, k: i32, prim: usize, flux: &CellFluxes) -> CellFluxes {
    let (x_hi, x_lo) = interp.interpolate_in_x(q, i, j, k, prim, flux[1], flux[0]);
    let (y_hi, y_lo) = interp.interpolate_in_y(q, i, j, k, prim, flux[3], flux[2]);
    let z_hi = interp.interpolate_in_z_hi(q, i, j, k, prim, flux[5]);
    let z_lo = interp.interpolate_in_z_lo(q, i, j, k, prim, flux[4]);
    [x_lo, x_hi, y_lo, y_hi, z_lo, z_hi]
}

fn check_common(
    region: &IndexBox,
    cell_prim: &Field,
    interp: &Interpolator,
    grid: &AdvectionGrid<'_>,
    src: &Field,
    ncomp_needed: usize,
) -> Result<()> {
    cell_prim.ensure_halo(region, interp.halo(), "cell_prim")?;
    src.ensure_contains(region, "advection source")?;
    if src.ncomp() < ncomp_needed || cell_prim.ncomp() + 1 < ncomp_needed {
        return Err(SolverError::shape_mismatch(
            "advection source",
            format!("at least {} components", ncomp_needed),
            format!("{} (source) / {} (primitive)", src.ncomp(), cell_prim.ncomp()),
        ));
    }
    grid.ensure_covers(region)
}

/// Advective tendencies of ρ (component 0) and ρθ (component 1).
///
/// `omega` is ρw on a flat grid and Ω over terrain. The face mass fluxes
/// are added into `avg`, weighted by `fac`, on every face of `region`
/// including the high-side faces of its last cells.
#[allow(clippy::too_many_arguments)]
pub fn advection_src_for_rho_and_theta(
    region: &IndexBox,
    fac: f64,
    rho_u: &Field,
    rho_v: &Field,
    omega: &Field,
    cell_prim: &Field,
    interp: &Interpolator,
    grid: &AdvectionGrid<'_>,
    src: &mut Field,
    avg: &mut FluxAccumulator,
) -> Result<()> {
    check_common(region, cell_prim, interp, grid, src, 2)?;
    rho_u.ensure_contains(&region.surrounding_nodes(Direction::X), "rho_u")?;
    rho_v.ensure_contains(&region.surrounding_nodes(Direction::Y), "rho_v")?;
    omega.ensure_contains(&region.surrounding_nodes(Direction::Z), "omega")?;
    avg.ensure_covers(region)?;

    avg.avg_xmom
        .for_each_mut(&region.surrounding_nodes(Direction::X), 0..1, |i, j, k, _, a| {
            *a += fac * grid.xflux(rho_u, i, j, k)
        });
    avg.avg_ymom
        .for_each_mut(&region.surrounding_nodes(Direction::Y), 0..1, |i, j, k, _, a| {
            *a += fac * grid.yflux(rho_v, i, j, k)
        });
    avg.avg_zmom
        .for_each_mut(&region.surrounding_nodes(Direction::Z), 0..1, |i, j, k, _, a| {
            *a += fac * omega[(i, j, k)]
        });

    let inv_cell_size = grid.inv_cell_size;
    src.for_each_mut(region, 0..2, |i, j, k, n, v| {
        let flux = [
            grid.xflux(rho_u, i, j, k),
            grid.xflux(rho_u, i + 1, j, k),
            grid.yflux(rho_v, i, j, k),
            grid.yflux(rho_v, i, j + 1, k),
            omega[(i, j, k)],
            omega[(i, j, k + 1)],
        ];
        let mf = grid.mf_m(i, j);
        let inv_detj = grid.inv_detj(i, j, k);
        let value = if n == 0 {
            [1.0; 6]
        } else {
            face_values(interp, cell_prim, i, j, k, 0, &flux)
        };
        *v = divergence(&flux, &value, inv_detj, mf * mf, &inv_cell_size);
    });
    Ok(())
}

/// Advective tendencies of conserved components `icomp .. icomp + ncomp`.
///
/// The advected primitive of conserved component `n` is component `n - 1`
/// of `cell_prim`. Face mass fluxes come from `avg` only.
#[allow(clippy::too_many_arguments)]
pub fn advection_src_for_scalars(
    region: &IndexBox,
    icomp: usize,
    ncomp: usize,
    avg: &FluxAccumulator,
    cell_prim: &Field,
    interp: &Interpolator,
    grid: &AdvectionGrid<'_>,
    src: &mut Field,
) -> Result<()> {
    if icomp == 0 {
        return Err(SolverError::shape_mismatch(
            "scalar components",
            "first component >= 1",
            "component 0 (density)",
        ));
    }
    check_common(region, cell_prim, interp, grid, src, icomp + ncomp)?;
    avg.ensure_covers(region)?;

    let (ax, ay, az) = (&avg.avg_xmom, &avg.avg_ymom, &avg.avg_zmom);
    let inv_cell_size = grid.inv_cell_size;
    src.for_each_mut(region, icomp..icomp + ncomp, |i, j, k, n, v| {
        let flux = [
            ax[(i, j, k)],
            ax[(i + 1, j, k)],
            ay[(i, j, k)],
            ay[(i, j + 1, k)],
            az[(i, j, k)],
            az[(i, j, k + 1)],
        ];
        let mf = grid.mf_m(i, j);
        let inv_detj = grid.inv_detj(i, j, k);
        let value = face_values(interp, cell_prim, i, j, k, n - 1, &flux);
        *v = divergence(&flux, &value, inv_detj, mf * mf, &inv_cell_size);
    });
    Ok(())
}
