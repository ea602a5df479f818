//! Horizontal map-projection factors.

use crate::error::Result;
use crate::types::{IndexBox, Staggering};

use super::Field;

/// Map factors at cell centres (`m`), x-faces (`u`) and y-faces (`v`).
///
/// Stored as single-layer fields (`k = 0`) because projections only vary
/// horizontally.
#[derive(Clone, Debug)]
pub struct MapFactors {
    m: Field,
    u: Field,
    v: Field,
}

impl MapFactors {
    /// Unit map factors (no projection) over the horizontal extent of `cells`.
    pub fn unity(cells: &IndexBox, nghost: [usize; 2]) -> Self {
        Self::from_fn(cells, nghost, |_, _| 1.0)
    }

    /// Map factors from a function of horizontal position in cell units.
    ///
    /// `f(x, y)` receives fractional indices, so cell centres are at
    /// `i + 0.5` and x-faces at `i`.
    pub fn from_fn<F>(cells: &IndexBox, nghost: [usize; 2], f: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        let plane = IndexBox::new([cells.lo[0], cells.lo[1], 0], [cells.hi[0], cells.hi[1], 0]);
        let ng = [nghost[0], nghost[1], 0];
        let mut m = Field::new(plane, Staggering::CellCentered, 1, ng);
        let mut u = Field::new(plane, Staggering::XFace, 1, ng);
        let mut v = Field::new(plane, Staggering::YFace, 1, ng);
        let gm = m.grown_box();
        let gu = u.grown_box();
        let gv = v.grown_box();
        m.for_each_mut(&gm, 0..1, |i, j, _, _, x| *x = f(i as f64 + 0.5, j as f64 + 0.5));
        u.for_each_mut(&gu, 0..1, |i, j, _, _, x| *x = f(i as f64, j as f64 + 0.5));
        v.for_each_mut(&gv, 0..1, |i, j, _, _, x| *x = f(i as f64 + 0.5, j as f64));
        Self { m, u, v }
    }

    /// Map factor at cell centre `(i, j)`.
    #[inline]
    pub fn m(&self, i: i32, j: i32) -> f64 {
        self.m[(i, j, 0)]
    }

    /// Map factor at x-face `(i, j)`.
    #[inline]
    pub fn u(&self, i: i32, j: i32) -> f64 {
        self.u[(i, j, 0)]
    }

    /// Map factor at y-face `(i, j)`.
    #[inline]
    pub fn v(&self, i: i32, j: i32) -> f64 {
        self.v[(i, j, 0)]
    }

    /// Verify coverage of the horizontal extent of `region` (cells) plus the
    /// high-side faces.
    pub fn ensure_covers(&self, region: &IndexBox) -> Result<()> {
        let plane = IndexBox::new([region.lo[0], region.lo[1], 0], [region.hi[0], region.hi[1], 0]);
        self.m.ensure_contains(&plane, "mf_m")?;
        self.u.ensure_contains(&IndexBox::new(plane.lo, [plane.hi[0] + 1, plane.hi[1], 0]), "mf_u")?;
        self.v.ensure_contains(&IndexBox::new(plane.lo, [plane.hi[0], plane.hi[1] + 1, 0]), "mf_v")
    }
}
