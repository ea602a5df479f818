//! Inclusive 3-D index boxes.
//!
//! An [`IndexBox`] is the integer index space a kernel iterates over. Bounds
//! are inclusive on both ends and may be negative (ghost cells sit below the
//! valid region's low corner).

use std::fmt;

use super::staggering::{Direction, Staggering};

/// Inclusive box of integer indices `lo..=hi` in each direction.
///
/// # Example
///
/// ```
/// use dycore_rs::types::{IndexBox, Staggering};
///
/// let cells = IndexBox::cells(8, 4, 10);
/// assert_eq!(cells.num_points(), 320);
///
/// // The x-faces of those cells have one extra index in x
/// let xfaces = cells.convert(Staggering::XFace);
/// assert_eq!(xfaces.lengths(), [9, 4, 10]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IndexBox {
    /// Low corner (inclusive).
    pub lo: [i32; 3],
    /// High corner (inclusive).
    pub hi: [i32; 3],
}

impl IndexBox {
    /// Create a box from its corners.
    #[inline]
    pub const fn new(lo: [i32; 3], hi: [i32; 3]) -> Self {
        Self { lo, hi }
    }

    /// Cell box `0..nx, 0..ny, 0..nz`.
    #[inline]
    pub const fn cells(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            lo: [0, 0, 0],
            hi: [nx as i32 - 1, ny as i32 - 1, nz as i32 - 1],
        }
    }

    /// Whether the box contains no indices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        (0..3).any(|d| self.hi[d] < self.lo[d])
    }

    /// Number of indices along direction `d`.
    #[inline]
    pub fn length(&self, d: usize) -> usize {
        (self.hi[d] - self.lo[d] + 1).max(0) as usize
    }

    /// Number of indices along each direction.
    #[inline]
    pub fn lengths(&self) -> [usize; 3] {
        [self.length(0), self.length(1), self.length(2)]
    }

    /// Total number of indices.
    #[inline]
    pub fn num_points(&self) -> usize {
        self.length(0) * self.length(1) * self.length(2)
    }

    /// Whether `(i, j, k)` lies inside the box.
    #[inline]
    pub fn contains(&self, i: i32, j: i32, k: i32) -> bool {
        i >= self.lo[0]
            && i <= self.hi[0]
            && j >= self.lo[1]
            && j <= self.hi[1]
            && k >= self.lo[2]
            && k <= self.hi[2]
    }

    /// Whether `other` lies entirely inside the box.
    #[inline]
    pub fn contains_box(&self, other: &IndexBox) -> bool {
        other.is_empty()
            || (0..3).all(|d| other.lo[d] >= self.lo[d] && other.hi[d] <= self.hi[d])
    }

    /// Grow by `n[d]` indices on both sides of each direction.
    #[inline]
    pub fn grow(&self, n: [usize; 3]) -> Self {
        let mut b = *self;
        for d in 0..3 {
            b.lo[d] -= n[d] as i32;
            b.hi[d] += n[d] as i32;
        }
        b
    }

    /// Grow (or shrink, for negative `n`) along one direction only.
    #[inline]
    pub fn grow_dir(&self, dir: Direction, n: i32) -> Self {
        let d = dir.index();
        let mut b = *self;
        b.lo[d] -= n;
        b.hi[d] += n;
        b
    }

    /// Add the high-side node in direction `dir` (cells → faces).
    #[inline]
    pub fn surrounding_nodes(&self, dir: Direction) -> Self {
        let mut b = *self;
        b.hi[dir.index()] += 1;
        b
    }

    /// Convert a cell box to the index space of the given staggering.
    #[inline]
    pub fn convert(&self, location: Staggering) -> Self {
        let nodal = location.nodal();
        let mut b = *self;
        for d in 0..3 {
            if nodal[d] {
                b.hi[d] += 1;
            }
        }
        b
    }

    /// Intersection of two boxes (possibly empty).
    #[inline]
    pub fn intersect(&self, other: &IndexBox) -> Self {
        let mut b = *self;
        for d in 0..3 {
            b.lo[d] = b.lo[d].max(other.lo[d]);
            b.hi[d] = b.hi[d].min(other.hi[d]);
        }
        b
    }

    /// Iterate over all indices, i fastest.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let b = *self;
        let empty = b.is_empty();
        (b.lo[2]..=b.hi[2])
            .flat_map(move |k| (b.lo[1]..=b.hi[1]).map(move |j| (j, k)))
            .flat_map(move |(j, k)| (b.lo[0]..=b.hi[0]).map(move |i| (i, j, k)))
            .filter(move |_| !empty)
    }
}

impl fmt::Display for IndexBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(({}, {}, {}) ({}, {}, {}))",
            self.lo[0], self.lo[1], self.lo[2], self.hi[0], self.hi[1], self.hi[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_and_lengths() {
        let b = IndexBox::cells(3, 4, 5);
        assert_eq!(b.lengths(), [3, 4, 5]);
        assert_eq!(b.num_points(), 60);
        assert!(b.contains(0, 0, 0));
        assert!(b.contains(2, 3, 4));
        assert!(!b.contains(3, 0, 0));
    }

    #[test]
    fn test_grow_and_contains_box() {
        let b = IndexBox::cells(4, 4, 4);
        let g = b.grow([2, 1, 0]);
        assert_eq!(g.lo, [-2, -1, 0]);
        assert_eq!(g.hi, [5, 4, 3]);
        assert!(g.contains_box(&b));
        assert!(!b.contains_box(&g));
    }

    #[test]
    fn test_convert_to_faces() {
        let b = IndexBox::cells(4, 4, 4);
        assert_eq!(b.convert(Staggering::ZFace).hi, [3, 3, 4]);
        assert_eq!(b.convert(Staggering::Node).hi, [4, 4, 4]);
        assert_eq!(b.surrounding_nodes(Direction::Y).hi, [3, 4, 3]);
    }

    #[test]
    fn test_iteration_order() {
        let b = IndexBox::cells(2, 2, 1);
        let pts: Vec<_> = b.iter().collect();
        assert_eq!(pts, vec![(0, 0, 0), (1, 0, 0), (0, 1, 0), (1, 1, 0)]);
    }

    #[test]
    fn test_empty_box() {
        let b = IndexBox::new([0, 0, 0], [-1, 3, 3]);
        assert!(b.is_empty());
        assert_eq!(b.num_points(), 0);
        assert_eq!(b.iter().count(), 0);
    }
}
