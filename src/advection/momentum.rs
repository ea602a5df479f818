//! Flux-form advection of the staggered momentum components.
//!
//! Each momentum component is treated as a cell quantity of its own shifted
//! grid: ρu lives on x-faces, so its control volume spans cell centres
//! `i - 1` and `i` in x. The transported velocity is reconstructed on the
//! faces of that volume with the same [`Interpolator`] used for scalars and
//! the transporting mass flux is the average of the two neighbouring face
//! mass fluxes.

use crate::error::Result;
use crate::field::Field;
use crate::types::{Direction, IndexBox, Staggering};

use super::interpolator::Interpolator;
use super::source::AdvectionGrid;

/// Velocity on the faces of `dir` from momentum and cell density.
fn face_velocity(mom: &Field, rho: &Field, dir: Direction, region: &IndexBox) -> Field {
    let (di, dj, dk) = dir.offset();
    let mut vel = mom.zeros_like();
    vel.for_each_mut(region, 0..1, |i, j, k, _, v| {
        let rho_face = 0.5 * (rho[(i, j, k)] + rho[(i - di, j - dj, k - dk)]);
        *v = mom[(i, j, k)] / rho_face;
    });
    vel
}

/// Inputs of the momentum advection kernels.
#[derive(Clone, Copy, Debug)]
pub struct MomentumInputs<'a> {
    /// Cell density
    pub rho: &'a Field,
    pub rho_u: &'a Field,
    pub rho_v: &'a Field,
    pub rho_w: &'a Field,
    /// Contravariant vertical mass flux (ρw without terrain)
    pub omega: &'a Field,
}

/// Advective tendencies of ρu, ρv and ρw on the faces of `region`.
///
/// Vertical momentum is only advanced on interior z-faces; the bottom and
/// top faces are set by the boundary condition and receive zero tendency.
pub fn advection_src_for_momentum(
    region: &IndexBox,
    inputs: &MomentumInputs<'_>,
    interp: &Interpolator,
    grid: &AdvectionGrid<'_>,
    src_x: &mut Field,
    src_y: &mut Field,
    src_z: &mut Field,
) -> Result<()> {
    let halo = interp.halo();
    let wide = [halo[0] + 1, halo[1] + 1, 1];
    inputs.rho.ensure_halo(region, wide, "rho")?;
    inputs.rho_u.ensure_halo(&region.surrounding_nodes(Direction::X), wide, "rho_u")?;
    inputs.rho_v.ensure_halo(&region.surrounding_nodes(Direction::Y), wide, "rho_v")?;
    inputs.rho_w.ensure_halo(&region.surrounding_nodes(Direction::Z), wide, "rho_w")?;
    inputs.omega.ensure_halo(&region.surrounding_nodes(Direction::Z), [1, 1, 0], "omega")?;
    src_x.ensure_contains(&region.surrounding_nodes(Direction::X), "xmom source")?;
    src_y.ensure_contains(&region.surrounding_nodes(Direction::Y), "ymom source")?;
    src_z.ensure_contains(&region.surrounding_nodes(Direction::Z), "zmom source")?;

    // Velocities are needed across the full stencil around each face. The
    // vertical stencil of w narrows inside its own valid range.
    let vel_box = |dir: Direction| {
        let dz = if dir == Direction::Z { 0 } else { 1 };
        region.surrounding_nodes(dir).grow([halo[0], halo[1], dz])
    };
    let u = face_velocity(inputs.rho_u, inputs.rho, Direction::X, &vel_box(Direction::X));
    let v = face_velocity(inputs.rho_v, inputs.rho, Direction::Y, &vel_box(Direction::Y));
    let w = face_velocity(inputs.rho_w, inputs.rho, Direction::Z, &vel_box(Direction::Z));

    let [dx_inv, dy_inv, dz_inv] = grid.inv_cell_size;
    let (ru, rv, om) = (inputs.rho_u, inputs.rho_v, inputs.omega);
    let xf = |i: i32, j: i32, k: i32| grid.xflux(ru, i, j, k);
    let yf = |i: i32, j: i32, k: i32| grid.yflux(rv, i, j, k);
    let zf = |i: i32, j: i32, k: i32| om[(i, j, k)];

    let face_scale = |i: i32, j: i32, k: i32, dir: Direction| -> f64 {
        match (grid.metrics, dir) {
            (Some(m), Direction::X) => 1.0 / m.h_zeta_at_iface(i, j, k),
            (Some(m), Direction::Y) => 1.0 / m.h_zeta_at_jface(i, j, k),
            (Some(m), Direction::Z) => 1.0 / m.detj_at_kface(i, j, k),
            (None, _) => 1.0,
        }
    };

    // x-momentum on x-face (i, j, k)
    src_x.for_each_mut(&region.surrounding_nodes(Direction::X), 0..1, |i, j, k, _, s| {
        let mx_hi = 0.5 * (xf(i, j, k) + xf(i + 1, j, k));
        let mx_lo = 0.5 * (xf(i - 1, j, k) + xf(i, j, k));
        let my_hi = 0.5 * (yf(i - 1, j + 1, k) + yf(i, j + 1, k));
        let my_lo = 0.5 * (yf(i - 1, j, k) + yf(i, j, k));
        let mz_hi = 0.5 * (zf(i - 1, j, k + 1) + zf(i, j, k + 1));
        let mz_lo = 0.5 * (zf(i - 1, j, k) + zf(i, j, k));

        let (ux_hi, ux_lo) = interp.interpolate_in_x(&u, i, j, k, 0, mx_hi, mx_lo);
        let (uy_hi, uy_lo) = interp.interpolate_in_y(&u, i, j, k, 0, my_hi, my_lo);
        let uz_hi = interp.interpolate_in_z_hi(&u, i, j, k, 0, mz_hi);
        let uz_lo = interp.interpolate_in_z_lo(&u, i, j, k, 0, mz_lo);

        let mf = grid.mf_u(i, j);
        *s = -face_scale(i, j, k, Direction::X)
            * ((mx_hi * ux_hi - mx_lo * ux_lo) * dx_inv * mf * mf
                + (my_hi * uy_hi - my_lo * uy_lo) * dy_inv * mf * mf
                + (mz_hi * uz_hi - mz_lo * uz_lo) * dz_inv);
    });

    // y-momentum on y-face (i, j, k)
    src_y.for_each_mut(&region.surrounding_nodes(Direction::Y), 0..1, |i, j, k, _, s| {
        let mx_hi = 0.5 * (xf(i + 1, j - 1, k) + xf(i + 1, j, k));
        let mx_lo = 0.5 * (xf(i, j - 1, k) + xf(i, j, k));
        let my_hi = 0.5 * (yf(i, j, k) + yf(i, j + 1, k));
        let my_lo = 0.5 * (yf(i, j - 1, k) + yf(i, j, k));
        let mz_hi = 0.5 * (zf(i, j - 1, k + 1) + zf(i, j, k + 1));
        let mz_lo = 0.5 * (zf(i, j - 1, k) + zf(i, j, k));

        let (vx_hi, vx_lo) = interp.interpolate_in_x(&v, i, j, k, 0, mx_hi, mx_lo);
        let (vy_hi, vy_lo) = interp.interpolate_in_y(&v, i, j, k, 0, my_hi, my_lo);
        let vz_hi = interp.interpolate_in_z_hi(&v, i, j, k, 0, mz_hi);
        let vz_lo = interp.interpolate_in_z_lo(&v, i, j, k, 0, mz_lo);

        let mf = grid.mf_v(i, j);
        *s = -face_scale(i, j, k, Direction::Y)
            * ((mx_hi * vx_hi - mx_lo * vx_lo) * dx_inv * mf * mf
                + (my_hi * vy_hi - my_lo * vy_lo) * dy_inv * mf * mf
                + (mz_hi * vz_hi - mz_lo * vz_lo) * dz_inv);
    });

    // z-momentum on interior z-faces
    let nz_top = inputs.rho.valid_box().hi[2] + 1;
    let nz_bot = inputs.rho.valid_box().lo[2];
    src_z.for_each_mut(&region.surrounding_nodes(Direction::Z), 0..1, |i, j, k, _, s| {
        if k <= nz_bot || k >= nz_top {
            *s = 0.0;
            return;
        }
        let mx_hi = 0.5 * (xf(i + 1, j, k - 1) + xf(i + 1, j, k));
        let mx_lo = 0.5 * (xf(i, j, k - 1) + xf(i, j, k));
        let my_hi = 0.5 * (yf(i, j + 1, k - 1) + yf(i, j + 1, k));
        let my_lo = 0.5 * (yf(i, j, k - 1) + yf(i, j, k));
        let mz_hi = 0.5 * (zf(i, j, k) + zf(i, j, k + 1));
        let mz_lo = 0.5 * (zf(i, j, k - 1) + zf(i, j, k));

        let (wx_hi, wx_lo) = interp.interpolate_in_x(&w, i, j, k, 0, mx_hi, mx_lo);
        let (wy_hi, wy_lo) = interp.interpolate_in_y(&w, i, j, k, 0, my_hi, my_lo);
        let wz_hi = interp.interpolate_in_z_hi(&w, i, j, k, 0, mz_hi);
        let wz_lo = interp.interpolate_in_z_lo(&w, i, j, k, 0, mz_lo);

        let mf = grid.mf_m(i, j);
        *s = -face_scale(i, j, k, Direction::Z)
            * ((mx_hi * wx_hi - mx_lo * wx_lo) * dx_inv * mf * mf
                + (my_hi * wy_hi - my_lo * wy_lo) * dy_inv * mf * mf
                + (mz_hi * wz_hi - mz_lo * wz_lo) * dz_inv);
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advection::AdvectionScheme;
    use crate::field::MapFactors;

    #[test]
    fn test_uniform_flow_has_no_momentum_tendency() {
        let cells = IndexBox::cells(6, 4, 5);
        let ng = [4, 4, 2];
        let rho = Field::filled(cells, Staggering::CellCentered, 1, ng, 1.1);
        let rho_u = Field::filled(cells, Staggering::XFace, 1, ng, 1.1 * 10.0);
        let rho_v = Field::filled(cells, Staggering::YFace, 1, ng, 1.1 * -3.0);
        let rho_w = Field::filled(cells, Staggering::ZFace, 1, ng, 0.0);
        let mf = MapFactors::unity(&cells, [4, 4]);
        let grid = AdvectionGrid {
            inv_cell_size: [0.01, 0.01, 0.02],
            metrics: None,
            map_factors: Some(&mf),
        };
        let inputs = MomentumInputs {
            rho: &rho,
            rho_u: &rho_u,
            rho_v: &rho_v,
            rho_w: &rho_w,
            omega: &rho_w,
        };
        for scheme in AdvectionScheme::ALL {
            let interp = Interpolator::new(scheme, scheme);
            let mut sx = Field::new(cells, Staggering::XFace, 1, [0, 0, 0]);
            let mut sy = Field::new(cells, Staggering::YFace, 1, [0, 0, 0]);
            let mut sz = Field::new(cells, Staggering::ZFace, 1, [0, 0, 0]);
            advection_src_for_momentum(&cells, &inputs, &interp, &grid, &mut sx, &mut sy, &mut sz).unwrap();
            assert!(sx.as_slice().iter().all(|v| v.abs() < 1e-10), "{}", scheme);
            assert!(sy.as_slice().iter().all(|v| v.abs() < 1e-10), "{}", scheme);
            assert!(sz.as_slice().iter().all(|v| v.abs() < 1e-10), "{}", scheme);
        }
    }
}
