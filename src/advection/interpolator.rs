//! Scheme dispatch for face reconstruction.

use crate::field::Field;
use crate::types::Direction;

use super::scheme::AdvectionScheme;
use super::stencil::{FaceFn, centered_2nd, centered_4th, centered_6th, upwind_3rd, upwind_5th};
use super::weno::{weno3, weno5, wenomzq3, wenoz3, wenoz5};

fn face_fn(scheme: AdvectionScheme) -> FaceFn {
    match scheme {
        AdvectionScheme::Centered2nd => centered_2nd,
        AdvectionScheme::Upwind3rd => upwind_3rd,
        AdvectionScheme::Centered4th => centered_4th,
        AdvectionScheme::Upwind5th => upwind_5th,
        AdvectionScheme::Centered6th => centered_6th,
        AdvectionScheme::Weno3 => weno3,
        AdvectionScheme::WenoZ3 => wenoz3,
        AdvectionScheme::WenoMzq3 => wenomzq3,
        AdvectionScheme::Weno5 => weno5,
        AdvectionScheme::WenoZ5 => wenoz5,
    }
}

/// Gather the `2r` cells around face `(i, j, k)` normal to `dir`.
///
/// Face `f` separates cells `f - 1` and `f`, which land in `s[2]` and
/// `s[3]`. Entries beyond radius `r` are left at zero and never read.
#[inline(always)]
fn gather(q: &Field, i: i32, j: i32, k: i32, n: usize, dir: Direction, r: usize) -> [f64; 6] {
    let (di, dj, dk) = dir.offset();
    let mut s = [0.0; 6];
    for m in (3 - r)..(3 + r) {
        let o = m as i32 - 3;
        s[m] = q[(i + o * di, j + o * dj, k + o * dk, n)];
    }
    s
}

/// Face reconstruction operator for one (horizontal, vertical) scheme pair.
///
/// The scheme is resolved into function pointers once, at construction, so
/// per-cell kernels never branch on the scheme. Vertically the stencil
/// narrows near the bottom and top of the field's valid range: a face with
/// only `r` valid cells on its shorter side uses the scheme's
/// [`reduced`](AdvectionScheme::reduced) form of radius `r`.
///
/// # Example
///
/// ```
/// use dycore_rs::advection::{AdvectionScheme, Interpolator};
/// use dycore_rs::field::Field;
/// use dycore_rs::types::{IndexBox, Staggering};
///
/// let cells = IndexBox::cells(8, 1, 8);
/// let theta = Field::filled(cells, Staggering::CellCentered, 1, [3, 3, 1], 300.0);
///
/// let interp = Interpolator::new(AdvectionScheme::Weno5, AdvectionScheme::Upwind3rd);
/// let (hi, lo) = interp.interpolate_in_x(&theta, 4, 0, 4, 0, 1.0, 1.0);
/// assert_eq!((hi, lo), (300.0, 300.0));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Interpolator {
    horizontal: FaceFn,
    h_radius: usize,
    vertical: [FaceFn; 4],
    v_radius: usize,
    h_scheme: AdvectionScheme,
    v_scheme: AdvectionScheme,
}

impl Interpolator {
    /// Resolve the reconstruction functions for the given schemes.
    pub fn new(horizontal: AdvectionScheme, vertical: AdvectionScheme) -> Self {
        let v_radius = vertical.stencil_radius();
        let vertical_table = [
            centered_2nd,
            face_fn(vertical.reduced(1)),
            face_fn(vertical.reduced(2)),
            face_fn(vertical.reduced(3)),
        ];
        Self {
            horizontal: face_fn(horizontal),
            h_radius: horizontal.stencil_radius(),
            vertical: vertical_table,
            v_radius,
            h_scheme: horizontal,
            v_scheme: vertical,
        }
    }

    /// Horizontal scheme.
    #[inline]
    pub fn horizontal_scheme(&self) -> AdvectionScheme {
        self.h_scheme
    }

    /// Vertical scheme.
    #[inline]
    pub fn vertical_scheme(&self) -> AdvectionScheme {
        self.v_scheme
    }

    /// Ghost cells a cell-centred input needs around the working region.
    ///
    /// Vertically one cell suffices because the stencil narrows at the top
    /// and bottom of the valid range.
    #[inline]
    pub fn halo(&self) -> [usize; 3] {
        [self.h_radius, self.h_radius, 1]
    }

    /// Value on the x-face `i` (between cells `i - 1` and `i`).
    #[inline]
    pub fn face_value_x(&self, q: &Field, i: i32, j: i32, k: i32, n: usize, upw: f64) -> f64 {
        (self.horizontal)(&gather(q, i, j, k, n, Direction::X, self.h_radius), upw)
    }

    /// Value on the y-face `j` (between cells `j - 1` and `j`).
    #[inline]
    pub fn face_value_y(&self, q: &Field, i: i32, j: i32, k: i32, n: usize, upw: f64) -> f64 {
        (self.horizontal)(&gather(q, i, j, k, n, Direction::Y, self.h_radius), upw)
    }

    /// Value on the z-face `k` (between cells `k - 1` and `k`).
    #[inline]
    pub fn face_value_z(&self, q: &Field, i: i32, j: i32, k: i32, n: usize, upw: f64) -> f64 {
        let vb = q.valid_box();
        let avail = (k - vb.lo[2]).min(vb.hi[2] + 1 - k).max(1) as usize;
        let idx = avail.min(3);
        let r = idx.min(self.v_radius);
        (self.vertical[idx])(&gather(q, i, j, k, n, Direction::Z, r), upw)
    }

    /// High and low x-face values of cell `(i, j, k)`.
    ///
    /// `upw_hi` and `upw_lo` are the mass fluxes through those faces.
    #[inline]
    pub fn interpolate_in_x(
        &self,
        q: &Field,
        i: i32,
        j: i32,
        k: i32,
        n: usize,
        upw_hi: f64,
        upw_lo: f64,
    ) -> (f64, f64) {
        (
            self.face_value_x(q, i + 1, j, k, n, upw_hi),
            self.face_value_x(q, i, j, k, n, upw_lo),
        )
    }

    /// High and low y-face values of cell `(i, j, k)`.
    #[inline]
    pub fn interpolate_in_y(
        &self,
        q: &Field,
        i: i32,
        j: i32,
        k: i32,
        n: usize,
        upw_hi: f64,
        upw_lo: f64,
    ) -> (f64, f64) {
        (
            self.face_value_y(q, i, j + 1, k, n, upw_hi),
            self.face_value_y(q, i, j, k, n, upw_lo),
        )
    }

    /// Top z-face value of cell `(i, j, k)`.
    #[inline]
    pub fn interpolate_in_z_hi(&self, q: &Field, i: i32, j: i32, k: i32, n: usize, upw: f64) -> f64 {
        self.face_value_z(q, i, j, k + 1, n, upw)
    }

    /// Bottom z-face value of cell `(i, j, k)`.
    #[inline]
    pub fn interpolate_in_z_lo(&self, q: &Field, i: i32, j: i32, k: i32, n: usize, upw: f64) -> f64 {
        self.face_value_z(q, i, j, k, n, upw)
    }
}
