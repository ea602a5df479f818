//! Metric terms of the terrain-following transform.
//!
//! All metrics are evaluated from the node-centred height field `z_nd` with
//! the same corner stencils the advection kernels use, so a flux computed at
//! a face and the metric applied to it always see identical heights.
//!
//! With ζ the computational vertical coordinate:
//!
//! ```text
//! h_zeta = ∂z/∂ζ     (vertical stretching, 1 on a flat uniform grid)
//! h_xi   = ∂z/∂x     (terrain slope in x, 0 on a flat grid)
//! h_eta  = ∂z/∂y     (terrain slope in y, 0 on a flat grid)
//! detJ   = h_zeta at the cell centre
//! ```

use crate::field::Field;

/// ∂z/∂ζ at the x-face `(i, j, k)`.
#[inline]
pub fn h_zeta_at_iface(i: i32, j: i32, k: i32, inv_cell_size: &[f64; 3], z_nd: &Field) -> f64 {
    0.5 * inv_cell_size[2]
        * (z_nd[(i, j, k + 1)] + z_nd[(i, j + 1, k + 1)] - z_nd[(i, j, k)] - z_nd[(i, j + 1, k)])
}

/// ∂z/∂ζ at the y-face `(i, j, k)`.
#[inline]
pub fn h_zeta_at_jface(i: i32, j: i32, k: i32, inv_cell_size: &[f64; 3], z_nd: &Field) -> f64 {
    0.5 * inv_cell_size[2]
        * (z_nd[(i, j, k + 1)] + z_nd[(i + 1, j, k + 1)] - z_nd[(i, j, k)] - z_nd[(i + 1, j, k)])
}

/// ∂z/∂ζ at the cell centre `(i, j, k)`.
#[inline]
pub fn h_zeta_at_cell_center(
    i: i32,
    j: i32,
    k: i32,
    inv_cell_size: &[f64; 3],
    z_nd: &Field,
) -> f64 {
    0.25 * inv_cell_size[2]
        * (z_nd[(i, j, k + 1)] + z_nd[(i + 1, j, k + 1)] + z_nd[(i, j + 1, k + 1)]
            + z_nd[(i + 1, j + 1, k + 1)]
            - z_nd[(i, j, k)]
            - z_nd[(i + 1, j, k)]
            - z_nd[(i, j + 1, k)]
            - z_nd[(i + 1, j + 1, k)])
}

/// ∂z/∂ζ at the z-face `(i, j, k)`: mean of the two adjacent cell centres.
#[inline]
pub fn h_zeta_at_kface(i: i32, j: i32, k: i32, inv_cell_size: &[f64; 3], z_nd: &Field) -> f64 {
    0.5 * (h_zeta_at_cell_center(i, j, k - 1, inv_cell_size, z_nd)
        + h_zeta_at_cell_center(i, j, k, inv_cell_size, z_nd))
}

/// Terrain slope ∂z/∂x at the z-face `(i, j, k)`.
#[inline]
pub fn h_xi_at_kface(i: i32, j: i32, k: i32, inv_cell_size: &[f64; 3], z_nd: &Field) -> f64 {
    0.5 * inv_cell_size[0]
        * (z_nd[(i + 1, j, k)] + z_nd[(i + 1, j + 1, k)] - z_nd[(i, j, k)] - z_nd[(i, j + 1, k)])
}

/// Terrain slope ∂z/∂y at the z-face `(i, j, k)`.
#[inline]
pub fn h_eta_at_kface(i: i32, j: i32, k: i32, inv_cell_size: &[f64; 3], z_nd: &Field) -> f64 {
    0.5 * inv_cell_size[1]
        * (z_nd[(i, j + 1, k)] + z_nd[(i + 1, j + 1, k)] - z_nd[(i, j, k)] - z_nd[(i + 1, j, k)])
}

/// Terrain slope ∂z/∂x at the x-face `(i, j, k)`.
#[inline]
pub fn h_xi_at_iface(i: i32, j: i32, k: i32, inv_cell_size: &[f64; 3], z_nd: &Field) -> f64 {
    0.125
        * inv_cell_size[0]
        * (z_nd[(i + 1, j, k)] + z_nd[(i + 1, j + 1, k)] + z_nd[(i + 1, j, k + 1)]
            + z_nd[(i + 1, j + 1, k + 1)]
            - z_nd[(i - 1, j, k)]
            - z_nd[(i - 1, j + 1, k)]
            - z_nd[(i - 1, j, k + 1)]
            - z_nd[(i - 1, j + 1, k + 1)])
}

/// Terrain slope ∂z/∂y at the y-face `(i, j, k)`.
#[inline]
pub fn h_eta_at_jface(i: i32, j: i32, k: i32, inv_cell_size: &[f64; 3], z_nd: &Field) -> f64 {
    0.125
        * inv_cell_size[1]
        * (z_nd[(i, j + 1, k)] + z_nd[(i + 1, j + 1, k)] + z_nd[(i, j + 1, k + 1)]
            + z_nd[(i + 1, j + 1, k + 1)]
            - z_nd[(i, j - 1, k)]
            - z_nd[(i + 1, j - 1, k)]
            - z_nd[(i, j - 1, k + 1)]
            - z_nd[(i + 1, j - 1, k + 1)])
}

/// Height of the z-face centre `(i, j, k)`: mean of its four corner nodes.
#[inline]
pub fn z_at_kface(i: i32, j: i32, k: i32, z_nd: &Field) -> f64 {
    0.25 * (z_nd[(i, j, k)] + z_nd[(i + 1, j, k)] + z_nd[(i, j + 1, k)] + z_nd[(i + 1, j + 1, k)])
}

/// Height of the cell centre `(i, j, k)`.
#[inline]
pub fn z_at_cell_center(i: i32, j: i32, k: i32, z_nd: &Field) -> f64 {
    0.5 * (z_at_kface(i, j, k, z_nd) + z_at_kface(i, j, k + 1, z_nd))
}
