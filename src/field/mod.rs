//! Ghost-padded multi-component 3-D arrays.
//!
//! A [`Field`] stores `ncomp` components of `f64` on one staggered location
//! of a rectangular index box, surrounded by a per-direction ghost halo.
//! Indices are signed so ghost cells are addressed naturally (`i = -1` is the
//! first ghost cell below the valid region).
//!
//! # Layout
//!
//! `i` is fastest, then `j`, then `k`, then the component `n`. Every
//! `(n, k)` pair is therefore a contiguous plane, which is the unit of work
//! handed to the thread pool by [`Field::for_each_mut`].
//!
//! # Example
//!
//! ```
//! use dycore_rs::field::Field;
//! use dycore_rs::types::{IndexBox, Staggering};
//!
//! let cells = IndexBox::cells(4, 4, 8);
//! let mut rho = Field::new(cells, Staggering::CellCentered, 1, [2, 2, 1]);
//! rho.fill(1.2);
//!
//! // Kernels are pure per-cell closures
//! rho.for_each_mut(&cells, 0..1, |_i, _j, k, _n, v| *v *= 1.0 - 0.01 * k as f64);
//! assert_eq!(rho[(0, 0, 0)], 1.2);
//! assert_eq!(rho[(-2, -2, -1)], 1.2); // ghost cells untouched
//! ```

mod map_factors;

use std::ops::{Index, IndexMut, Range};

use crate::error::{Result, SolverError};
use crate::types::{IndexBox, Staggering};

pub use map_factors::MapFactors;

/// Multi-component ghost-padded 3-D array on a staggered location.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    data: Vec<f64>,
    valid: IndexBox,
    grown: IndexBox,
    nghost: [usize; 3],
    ncomp: usize,
    location: Staggering,
}

impl Field {
    /// Allocate a zero field on `location` for the given cell box.
    ///
    /// `cells` is always the cell-centred box; face and node locations get
    /// the extra high-side index automatically.
    pub fn new(cells: IndexBox, location: Staggering, ncomp: usize, nghost: [usize; 3]) -> Self {
        let valid = cells.convert(location);
        let grown = valid.grow(nghost);
        Self {
            data: vec![0.0; grown.num_points() * ncomp],
            valid,
            grown,
            nghost,
            ncomp,
            location,
        }
    }

    /// Allocate a field with every entry (ghosts included) set to `value`.
    pub fn filled(
        cells: IndexBox,
        location: Staggering,
        ncomp: usize,
        nghost: [usize; 3],
        value: f64,
    ) -> Self {
        let mut f = Self::new(cells, location, ncomp, nghost);
        f.fill(value);
        f
    }

    /// Zero field with the same shape, location and halo.
    pub fn zeros_like(&self) -> Self {
        Self {
            data: vec![0.0; self.data.len()],
            valid: self.valid,
            grown: self.grown,
            nghost: self.nghost,
            ncomp: self.ncomp,
            location: self.location,
        }
    }

    /// Valid (non-ghost) index box in this field's own index space.
    #[inline]
    pub fn valid_box(&self) -> IndexBox {
        self.valid
    }

    /// Valid box plus ghost halo.
    #[inline]
    pub fn grown_box(&self) -> IndexBox {
        self.grown
    }

    /// Ghost cells on each side, per direction.
    #[inline]
    pub fn nghost(&self) -> [usize; 3] {
        self.nghost
    }

    /// Number of components.
    #[inline]
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    /// Staggered location of the data.
    #[inline]
    pub fn location(&self) -> Staggering {
        self.location
    }

    /// Raw storage.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Raw mutable storage.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    #[inline]
    fn plane_len(&self) -> usize {
        self.grown.length(0) * self.grown.length(1)
    }

    #[inline]
    fn offset(&self, i: i32, j: i32, k: i32, n: usize) -> usize {
        debug_assert!(
            self.grown.contains(i, j, k) && n < self.ncomp,
            "index ({}, {}, {}, {}) outside {} with {} components",
            i,
            j,
            k,
            n,
            self.grown,
            self.ncomp
        );
        let g = &self.grown;
        let nx = self.grown.length(0);
        let ny = self.grown.length(1);
        let nz = self.grown.length(2);
        (((n * nz + (k - g.lo[2]) as usize) * ny + (j - g.lo[1]) as usize) * nx)
            + (i - g.lo[0]) as usize
    }

    /// Value at `(i, j, k, n)`.
    #[inline]
    pub fn get(&self, i: i32, j: i32, k: i32, n: usize) -> f64 {
        self.data[self.offset(i, j, k, n)]
    }

    /// Set the value at `(i, j, k, n)`.
    #[inline]
    pub fn set(&mut self, i: i32, j: i32, k: i32, n: usize, value: f64) {
        let idx = self.offset(i, j, k, n);
        self.data[idx] = value;
    }

    /// Set every entry (ghosts included).
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Set every entry of one component (ghosts included).
    pub fn fill_comp(&mut self, n: usize, value: f64) {
        let len = self.grown.num_points();
        self.data[n * len..(n + 1) * len].fill(value);
    }

    /// Whether two fields have identical shape, halo and location.
    pub fn same_layout(&self, other: &Field) -> bool {
        self.valid == other.valid
            && self.grown == other.grown
            && self.ncomp == other.ncomp
            && self.location == other.location
    }

    fn check_layout(&self, other: &Field, name: &'static str) -> Result<()> {
        if self.same_layout(other) {
            Ok(())
        } else {
            Err(SolverError::shape_mismatch(
                name,
                format!("{} {} x{}", self.location, self.grown, self.ncomp),
                format!("{} {} x{}", other.location, other.grown, other.ncomp),
            ))
        }
    }

    /// Copy all data from a field of identical layout.
    pub fn copy_from(&mut self, other: &Field) -> Result<()> {
        self.check_layout(other, "copy source")?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// `self <- c * self`
    pub fn scale(&mut self, c: f64) {
        for v in &mut self.data {
            *v *= c;
        }
    }

    /// `self <- self + c * other` over all entries.
    pub fn axpy(&mut self, c: f64, other: &Field) -> Result<()> {
        self.check_layout(other, "axpy operand")?;
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += c * b;
        }
        Ok(())
    }

    /// Sum of component `n` over `region`.
    pub fn sum(&self, region: &IndexBox, n: usize) -> f64 {
        region.iter().map(|(i, j, k)| self.get(i, j, k, n)).sum()
    }

    /// Largest absolute difference to `other` over `region` and all components.
    pub fn max_abs_diff(&self, other: &Field, region: &IndexBox) -> f64 {
        let mut m: f64 = 0.0;
        for n in 0..self.ncomp.min(other.ncomp) {
            for (i, j, k) in region.iter() {
                m = m.max((self.get(i, j, k, n) - other.get(i, j, k, n)).abs());
            }
        }
        m
    }

    /// Verify that `region` grown by `radius` lies inside the allocation.
    ///
    /// Called once per kernel launch, never per cell.
    pub fn ensure_halo(&self, region: &IndexBox, radius: [usize; 3], name: &'static str) -> Result<()> {
        let needed_box = region.grow(radius);
        if self.grown.contains_box(&needed_box) {
            return Ok(());
        }
        let mut needed = [0usize; 3];
        for d in 0..3 {
            let below = self.valid.lo[d] - needed_box.lo[d];
            let above = needed_box.hi[d] - self.valid.hi[d];
            needed[d] = below.max(above).max(0) as usize;
        }
        Err(SolverError::HaloTooSmall {
            field: name,
            needed,
            available: self.nghost,
        })
    }

    /// Verify that `region` lies inside the allocation.
    #[inline]
    pub fn ensure_contains(&self, region: &IndexBox, name: &'static str) -> Result<()> {
        self.ensure_halo(region, [0; 3], name)
    }

    /// Apply a per-entry kernel over `region` and components `comps`.
    ///
    /// The kernel receives `(i, j, k, n, &mut value)` and must not depend on
    /// the visiting order. With the `parallel` feature the `(n, k)` planes
    /// are distributed over the rayon pool.
    pub fn for_each_mut<F>(&mut self, region: &IndexBox, comps: Range<usize>, f: F)
    where
        F: Fn(i32, i32, i32, usize, &mut f64) + Sync + Send,
    {
        let region = region.intersect(&self.grown);
        if region.is_empty() {
            return;
        }
        let plane_len = self.plane_len();
        let nx = self.grown.length(0);
        let nz = self.grown.length(2);
        let glo = self.grown.lo;
        let comps = comps.start..comps.end.min(self.ncomp);

        let plane = |p: usize, chunk: &mut [f64]| {
            let n = p / nz;
            let k = glo[2] + (p % nz) as i32;
            if !comps.contains(&n) || k < region.lo[2] || k > region.hi[2] {
                return;
            }
            for j in region.lo[1]..=region.hi[1] {
                let row = (j - glo[1]) as usize * nx;
                for i in region.lo[0]..=region.hi[0] {
                    f(i, j, k, n, &mut chunk[row + (i - glo[0]) as usize]);
                }
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.data
                .par_chunks_mut(plane_len)
                .enumerate()
                .for_each(|(p, chunk)| plane(p, chunk));
        }

        #[cfg(not(feature = "parallel"))]
        {
            self.data
                .chunks_mut(plane_len)
                .enumerate()
                .for_each(|(p, chunk)| plane(p, chunk));
        }
    }
}

impl Index<(i32, i32, i32)> for Field {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j, k): (i32, i32, i32)) -> &f64 {
        &self.data[self.offset(i, j, k, 0)]
    }
}

impl IndexMut<(i32, i32, i32)> for Field {
    #[inline]
    fn index_mut(&mut self, (i, j, k): (i32, i32, i32)) -> &mut f64 {
        let idx = self.offset(i, j, k, 0);
        &mut self.data[idx]
    }
}

impl Index<(i32, i32, i32, usize)> for Field {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j, k, n): (i32, i32, i32, usize)) -> &f64 {
        &self.data[self.offset(i, j, k, n)]
    }
}

impl IndexMut<(i32, i32, i32, usize)> for Field {
    #[inline]
    fn index_mut(&mut self, (i, j, k, n): (i32, i32, i32, usize)) -> &mut f64 {
        let idx = self.offset(i, j, k, n);
        &mut self.data[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells() -> IndexBox {
        IndexBox::cells(4, 3, 2)
    }

    #[test]
    fn test_shape_and_halo() {
        let f = Field::new(cells(), Staggering::XFace, 2, [2, 1, 0]);
        assert_eq!(f.valid_box().lengths(), [5, 3, 2]);
        assert_eq!(f.grown_box().lengths(), [9, 5, 2]);
        assert_eq!(f.as_slice().len(), 9 * 5 * 2 * 2);
    }

    #[test]
    fn test_index_ghost_cells() {
        let mut f = Field::new(cells(), Staggering::CellCentered, 2, [1, 1, 1]);
        f[(-1, -1, -1, 1)] = 3.0;
        f[(3, 2, 1)] = 4.0;
        assert_eq!(f.get(-1, -1, -1, 1), 3.0);
        assert_eq!(f.get(3, 2, 1, 0), 4.0);
        assert_eq!(f.get(-1, -1, -1, 0), 0.0);
    }

    #[test]
    fn test_for_each_mut_region_and_components() {
        let mut f = Field::new(cells(), Staggering::CellCentered, 3, [1, 1, 1]);
        let region = IndexBox::new([1, 0, 0], [2, 1, 1]);
        f.for_each_mut(&region, 1..2, |i, j, k, n, v| {
            *v = (100 * n as i32 + 10 * k + j + i) as f64
        });
        assert_eq!(f[(2, 1, 1, 1)], 113.0);
        assert_eq!(f[(0, 0, 0, 1)], 0.0);
        assert_eq!(f[(2, 1, 1, 0)], 0.0);
        assert_eq!(f[(2, 1, 1, 2)], 0.0);
        let touched = f.as_slice().iter().filter(|v| **v != 0.0).count();
        assert_eq!(touched, region.num_points());
    }

    #[test]
    fn test_ensure_halo() {
        let f = Field::new(cells(), Staggering::CellCentered, 1, [2, 2, 1]);
        let region = f.valid_box();
        assert!(f.ensure_halo(&region, [2, 2, 1], "q").is_ok());
        match f.ensure_halo(&region, [3, 2, 1], "q") {
            Err(SolverError::HaloTooSmall {
                field,
                needed,
                available,
            }) => {
                assert_eq!(field, "q");
                assert_eq!(needed, [3, 2, 1]);
                assert_eq!(available, [2, 2, 1]);
            }
            other => panic!("expected halo error, got {:?}", other),
        }
    }

    #[test]
    fn test_axpy_and_layout_check() {
        let mut a = Field::filled(cells(), Staggering::CellCentered, 1, [1, 1, 1], 1.0);
        let b = Field::filled(cells(), Staggering::CellCentered, 1, [1, 1, 1], 2.0);
        a.axpy(0.5, &b).unwrap();
        assert!(a.as_slice().iter().all(|v| *v == 2.0));

        let c = Field::new(cells(), Staggering::ZFace, 1, [1, 1, 1]);
        assert!(matches!(a.axpy(1.0, &c), Err(SolverError::ShapeMismatch { .. })));
    }
}
