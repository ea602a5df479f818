//! Conserved and primitive state.
//!
//! The prognostic state of one level is a [`StateVector`]: a cell-centred
//! field of conserved scalars (ρ, ρθ, ρ·KE, ρ·QKE, ρ·scalar, ρ·q₁, …) and the
//! three staggered momentum components. Primitive variables are derived per
//! stage with [`primitives`] and never stored across stages.

mod base;

use crate::error::{Result, SolverError};
use crate::field::Field;
use crate::time::Integrable;
use crate::types::{IndexBox, Staggering};

pub use base::BaseState;

/// Components of the conserved cell field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ConsVar {
    Rho = 0,
    RhoTheta = 1,
    /// Turbulent kinetic energy of the Deardorff closure.
    RhoKE = 2,
    /// Twice the turbulent kinetic energy of the MYNN closure.
    RhoQKE = 3,
    /// Passive scalar.
    RhoScalar = 4,
    /// Water vapour.
    RhoQ1 = 5,
    /// Cloud water.
    RhoQ2 = 6,
}

impl ConsVar {
    /// Number of conserved components without moisture.
    pub const NUM_DRY: usize = 5;

    /// Number of conserved components with vapour and cloud water.
    pub const NUM_MOIST: usize = 7;

    /// Component index in the conserved field.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Component index of the matching primitive.
    ///
    /// Density has no primitive counterpart.
    #[inline]
    pub const fn prim(self) -> Option<usize> {
        match self {
            ConsVar::Rho => None,
            other => Some(other as usize - 1),
        }
    }
}

/// Conserved cell scalars plus staggered momentum.
#[derive(Clone, Debug)]
pub struct StateVector {
    pub cons: Field,
    pub xmom: Field,
    pub ymom: Field,
    pub zmom: Field,
}

impl StateVector {
    /// Zero state with `ncons` conserved components on `cells`.
    pub fn new(cells: IndexBox, ncons: usize, nghost: [usize; 3]) -> Self {
        Self {
            cons: Field::new(cells, Staggering::CellCentered, ncons, nghost),
            xmom: Field::new(cells, Staggering::XFace, 1, nghost),
            ymom: Field::new(cells, Staggering::YFace, 1, nghost),
            zmom: Field::new(cells, Staggering::ZFace, 1, nghost),
        }
    }

    /// Cell box of the valid region.
    #[inline]
    pub fn cells(&self) -> IndexBox {
        self.cons.valid_box()
    }

    /// Number of conserved components.
    #[inline]
    pub fn ncons(&self) -> usize {
        self.cons.ncomp()
    }

    /// Ghost cells per direction.
    #[inline]
    pub fn nghost(&self) -> [usize; 3] {
        self.cons.nghost()
    }

    /// Copy every buffer from a state of identical layout.
    pub fn copy_from(&mut self, other: &StateVector) -> Result<()> {
        self.cons.copy_from(&other.cons)?;
        self.xmom.copy_from(&other.xmom)?;
        self.ymom.copy_from(&other.ymom)?;
        self.zmom.copy_from(&other.zmom)
    }

    /// Set every entry to zero.
    pub fn clear(&mut self) {
        self.cons.fill(0.0);
        self.xmom.fill(0.0);
        self.ymom.fill(0.0);
        self.zmom.fill(0.0);
    }

    /// Largest absolute difference over the valid region of every buffer.
    pub fn max_abs_diff(&self, other: &StateVector) -> f64 {
        self.cons
            .max_abs_diff(&other.cons, &self.cons.valid_box())
            .max(self.xmom.max_abs_diff(&other.xmom, &self.xmom.valid_box()))
            .max(self.ymom.max_abs_diff(&other.ymom, &self.ymom.valid_box()))
            .max(self.zmom.max_abs_diff(&other.zmom, &self.zmom.valid_box()))
    }

    /// Verify that every buffer has at least `needed` ghost cells.
    pub fn ensure_halo(&self, needed: [usize; 3]) -> Result<()> {
        let available = self.nghost();
        if (0..3).all(|d| available[d] >= needed[d]) {
            Ok(())
        } else {
            Err(SolverError::HaloTooSmall {
                field: "state",
                needed,
                available,
            })
        }
    }
}

impl Integrable for StateVector {
    fn scale(&mut self, c: f64) {
        self.cons.scale(c);
        self.xmom.scale(c);
        self.ymom.scale(c);
        self.zmom.scale(c);
    }

    fn axpy(&mut self, c: f64, other: &Self) -> Result<()> {
        self.cons.axpy(c, &other.cons)?;
        self.xmom.axpy(c, &other.xmom)?;
        self.ymom.axpy(c, &other.ymom)?;
        self.zmom.axpy(c, &other.zmom)
    }

    fn zeros_like(&self) -> Self {
        Self {
            cons: self.cons.zeros_like(),
            xmom: self.xmom.zeros_like(),
            ymom: self.ymom.zeros_like(),
            zmom: self.zmom.zeros_like(),
        }
    }
}

/// Primitive variables of a conserved field, ghosts included.
///
/// Component `n - 1` of the result is `cons[n] / ρ`, so θ is component 0.
pub fn primitives(cons: &Field) -> Field {
    let mut prim = Field::new(
        cons.valid_box(),
        Staggering::CellCentered,
        cons.ncomp().saturating_sub(1).max(1),
        cons.nghost(),
    );
    let grown = prim.grown_box();
    let ncomp = prim.ncomp().min(cons.ncomp().saturating_sub(1));
    prim.for_each_mut(&grown, 0..ncomp, |i, j, k, n, v| {
        *v = cons[(i, j, k, n + 1)] / cons[(i, j, k, 0)];
    });
    prim
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_indices() {
        assert_eq!(ConsVar::Rho.prim(), None);
        assert_eq!(ConsVar::RhoTheta.prim(), Some(0));
        assert_eq!(ConsVar::RhoScalar.prim(), Some(3));
        assert_eq!(ConsVar::RhoQ1.index(), ConsVar::NUM_DRY);
    }

    #[test]
    fn test_primitives_divide_by_density() {
        let cells = IndexBox::cells(3, 2, 2);
        let mut cons = Field::new(cells, Staggering::CellCentered, ConsVar::NUM_DRY, [1, 1, 1]);
        let grown = cons.grown_box();
        cons.for_each_mut(&grown, 0..1, |_, _, k, _, v| *v = 1.0 + 0.1 * k as f64);
        cons.for_each_mut(&grown, 1..ConsVar::NUM_DRY, |_, _, k, n, v| {
            *v = (1.0 + 0.1 * k as f64) * (n as f64 * 100.0)
        });
        let prim = primitives(&cons);
        assert_eq!(prim.ncomp(), ConsVar::NUM_DRY - 1);
        assert!((prim[(-1, -1, -1, 0)] - 100.0).abs() < 1e-12);
        assert!((prim[(2, 1, 1, 3)] - 400.0).abs() < 1e-12);
    }

    #[test]
    fn test_integrable_ops() {
        let cells = IndexBox::cells(2, 2, 2);
        let mut a = StateVector::new(cells, 2, [1, 1, 1]);
        a.cons.fill(1.0);
        a.zmom.fill(2.0);
        let b = a.clone();
        a.scale(2.0);
        a.axpy(-1.0, &b).unwrap();
        assert_eq!(a.max_abs_diff(&b), 0.0);
        assert_eq!(a.zeros_like().cons.as_slice().iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn test_halo_check() {
        let s = StateVector::new(IndexBox::cells(2, 2, 2), 2, [3, 3, 1]);
        assert!(s.ensure_halo([3, 3, 1]).is_ok());
        assert!(matches!(
            s.ensure_halo([4, 4, 1]),
            Err(SolverError::HaloTooSmall { .. })
        ));
    }
}
