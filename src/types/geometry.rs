//! Uniform computational geometry of a single level.

use super::index_box::IndexBox;

/// Problem domain, cell size and physical origin of a block-structured level.
///
/// The vertical cell size is the computational (ζ) spacing; physical heights
/// live in the terrain metrics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    /// Cell-centred index domain.
    pub domain: IndexBox,
    /// (dx, dy, dζ)
    pub cell_size: [f64; 3],
    /// Physical coordinates of the domain's low corner.
    pub prob_lo: [f64; 3],
}

impl Geometry {
    /// Domain of `n` cells with spacing `cell_size`, origin at zero.
    pub fn uniform(n: [usize; 3], cell_size: [f64; 3]) -> Self {
        Self {
            domain: IndexBox::cells(n[0], n[1], n[2]),
            cell_size,
            prob_lo: [0.0; 3],
        }
    }

    /// Inverse cell sizes (1/dx, 1/dy, 1/dζ).
    #[inline]
    pub fn inv_cell_size(&self) -> [f64; 3] {
        [
            1.0 / self.cell_size[0],
            1.0 / self.cell_size[1],
            1.0 / self.cell_size[2],
        ]
    }

    /// Number of cells in each direction.
    #[inline]
    pub fn num_cells(&self) -> [usize; 3] {
        self.domain.lengths()
    }

    /// Physical extent of the domain.
    #[inline]
    pub fn prob_hi(&self) -> [f64; 3] {
        let n = self.num_cells();
        [
            self.prob_lo[0] + n[0] as f64 * self.cell_size[0],
            self.prob_lo[1] + n[1] as f64 * self.cell_size[1],
            self.prob_lo[2] + n[2] as f64 * self.cell_size[2],
        ]
    }

    /// Horizontal coordinate of node `i` (d = 0) or `j` (d = 1).
    #[inline]
    pub fn node_coord(&self, d: usize, idx: i32) -> f64 {
        self.prob_lo[d] + idx as f64 * self.cell_size[d]
    }

    /// Horizontal coordinate of cell centre `i` (d = 0) or `j` (d = 1).
    #[inline]
    pub fn cell_coord(&self, d: usize, idx: i32) -> f64 {
        self.prob_lo[d] + (idx as f64 + 0.5) * self.cell_size[d]
    }
}
