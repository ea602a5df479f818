//! Pressure projection of the momentum for the incompressible mode.
//!
//! Solves the discrete Poisson problem
//!
//! ```text
//! ∇²φ = ∇·(ρu)        ρu ← ρu − ∇φ
//! ```
//!
//! on the cell-centred grid, periodic in x and y with solid walls at the
//! bottom and top. The wall faces are not corrected, so the projected field
//! is discretely divergence free whenever the wall fluxes balance (in
//! particular when they vanish). The 7-point operator is assembled as a
//! sparse matrix and factorised with faer's sparse LU.

use faer::{
    Mat,
    linalg::solvers::Solve,
    sparse::{SparseColMat, Triplet},
};
use log::debug;

use crate::error::{Result, SolverError};
use crate::state::StateVector;
use crate::types::Geometry;
use crate::vertical::TerrainMetrics;

#[inline]
fn wrap(i: i32, n: i32) -> i32 {
    i.rem_euclid(n)
}

/// Discrete divergence of the momentum in every valid cell, column-major in
/// `(i, j, k)`.
pub fn momentum_divergence(state: &StateVector, geom: &Geometry) -> Vec<f64> {
    let cells = state.cells();
    let [nx, ny, nz] = cells.lengths().map(|n| n as i32);
    let [dx_inv, dy_inv, dz_inv] = geom.inv_cell_size();
    let (lo, ru, rv, rw) = (cells.lo, &state.xmom, &state.ymom, &state.zmom);
    let mut div = Vec::with_capacity((nx * ny * nz) as usize);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let (gi, gj, gk) = (lo[0] + i, lo[1] + j, lo[2] + k);
                let ip = lo[0] + wrap(i + 1, nx);
                let jp = lo[1] + wrap(j + 1, ny);
                div.push(
                    dx_inv * (ru[(ip, gj, gk)] - ru[(gi, gj, gk)])
                        + dy_inv * (rv[(gi, jp, gk)] - rv[(gi, gj, gk)])
                        + dz_inv * (rw[(gi, gj, gk + 1)] - rw[(gi, gj, gk)]),
                );
            }
        }
    }
    div
}

/// Sparse Laplacian of the projection on an `nx × ny × nz` grid, with the
/// first row replaced by `φ = 0`.
fn laplacian(dims: [i32; 3], inv_cell_size: [f64; 3]) -> Result<SparseColMat<usize, f64>> {
    let [nx, ny, nz] = dims;
    let n = (nx * ny * nz) as usize;
    let idx = |i: i32, j: i32, k: i32| (i + nx * (j + ny * k)) as usize;
    let [x2, y2, z2] = inv_cell_size.map(|h| h * h);

    let mut entries = Vec::with_capacity(7 * n);
    // φ is defined up to a constant
    entries.push(Triplet::new(0, 0, 1.0));
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let row = idx(i, j, k);
                if row == 0 {
                    continue;
                }
                let mut diag = 0.0;
                let mut couple = |col: usize, c: f64| {
                    if col != row {
                        entries.push(Triplet::new(row, col, c));
                        diag -= c;
                    }
                };
                couple(idx(wrap(i + 1, nx), j, k), x2);
                couple(idx(wrap(i - 1, nx), j, k), x2);
                couple(idx(i, wrap(j + 1, ny), k), y2);
                couple(idx(i, wrap(j - 1, ny), k), y2);
                // walls: no flux through the bottom and top faces
                if k + 1 < nz {
                    couple(idx(i, j, k + 1), z2);
                }
                if k > 0 {
                    couple(idx(i, j, k - 1), z2);
                }
                entries.push(Triplet::new(row, row, diag));
            }
        }
    }
    SparseColMat::try_new_from_triplets(n, n, &entries)
        .map_err(|e| SolverError::Projection(format!("cannot assemble pressure system: {e:?}")))
}

/// Remove the divergent part of the momentum of `state`.
///
/// Fails on terrain-following grids.
pub fn project_momentum(state: &mut StateVector, geom: &Geometry, metrics: Option<&TerrainMetrics>) -> Result<()> {
    if metrics.is_some() {
        return Err(SolverError::Projection(
            "projection is only available on flat grids".to_string(),
        ));
    }
    let cells = state.cells();
    let [nx, ny, nz] = cells.lengths().map(|n| n as i32);
    let n = (nx * ny * nz) as usize;
    let [dx_inv, dy_inv, dz_inv] = geom.inv_cell_size();
    let idx = |i: i32, j: i32, k: i32| (i + nx * (j + ny * k)) as usize;

    let a = laplacian([nx, ny, nz], geom.inv_cell_size())?;
    let lu = a
        .sp_lu()
        .map_err(|e| SolverError::Projection(format!("pressure factorisation failed: {e:?}")))?;

    let div = momentum_divergence(state, geom);
    let mut x = Mat::<f64>::zeros(n, 1);
    for (r, d) in div.iter().enumerate().skip(1) {
        x[(r, 0)] = *d;
    }
    lu.solve_in_place(x.as_mut());
    if (0..n).any(|r| !x[(r, 0)].is_finite()) {
        return Err(SolverError::Projection("singular pressure system".to_string()));
    }
    let phi = |i: i32, j: i32, k: i32| x[(idx(i, j, k), 0)];

    let lo = cells.lo;
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let (gi, gj, gk) = (lo[0] + i, lo[1] + j, lo[2] + k);
                state.xmom[(gi, gj, gk)] -= dx_inv * (phi(i, j, k) - phi(wrap(i - 1, nx), j, k));
                state.ymom[(gi, gj, gk)] -= dy_inv * (phi(i, j, k) - phi(i, wrap(j - 1, ny), k));
                if k > 0 {
                    state.zmom[(gi, gj, gk)] -= dz_inv * (phi(i, j, k) - phi(i, j, k - 1));
                }
            }
        }
        // periodic image faces
        for j in 0..ny {
            let (gj, gk) = (lo[1] + j, lo[2] + k);
            state.xmom[(lo[0] + nx, gj, gk)] = state.xmom[(lo[0], gj, gk)];
        }
        for i in 0..nx {
            let (gi, gk) = (lo[0] + i, lo[2] + k);
            state.ymom[(gi, lo[1] + ny, gk)] = state.ymom[(gi, lo[1], gk)];
        }
    }

    debug!("projected momentum on {n} cells");
    Ok(())
}
