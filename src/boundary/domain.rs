//! Physical-domain ghost cells: periodic or zero-gradient.

use std::ops::Range;

use crate::error::Result;
use crate::field::Field;
use crate::state::StateVector;

use super::{BoundaryFill, FAST_CONS_COMPONENTS};

/// Fill the ghost entries of `field` for components `comps`.
///
/// Directions flagged in `periodic` wrap around the valid region (a face
/// field wraps with the cell period, so its last face duplicates the
/// first). All other directions, and z always, copy the nearest valid
/// entry.
pub fn fill_field_ghosts(field: &mut Field, comps: Range<usize>, periodic: [bool; 2]) {
    let valid = field.valid_box();
    let grown = field.grown_box();
    let nodal = field.location().nodal();
    let source = |d: usize, idx: i32| -> i32 {
        if idx >= valid.lo[d] && idx <= valid.hi[d] {
            return idx;
        }
        if d < 2 && periodic[d] {
            let period = valid.length(d) as i32 - i32::from(nodal[d]);
            valid.lo[d] + (idx - valid.lo[d]).rem_euclid(period)
        } else {
            idx.clamp(valid.lo[d], valid.hi[d])
        }
    };

    for n in comps.start..comps.end.min(field.ncomp()) {
        // x ghosts on valid rows
        for k in valid.lo[2]..=valid.hi[2] {
            for j in valid.lo[1]..=valid.hi[1] {
                for i in (grown.lo[0]..valid.lo[0]).chain(valid.hi[0] + 1..=grown.hi[0]) {
                    let v = field.get(source(0, i), j, k, n);
                    field.set(i, j, k, n, v);
                }
            }
        }
        // y ghosts across the full x extent
        for k in valid.lo[2]..=valid.hi[2] {
            for j in (grown.lo[1]..valid.lo[1]).chain(valid.hi[1] + 1..=grown.hi[1]) {
                for i in grown.lo[0]..=grown.hi[0] {
                    let v = field.get(i, source(1, j), k, n);
                    field.set(i, j, k, n, v);
                }
            }
        }
        // z ghosts everywhere
        for k in (grown.lo[2]..valid.lo[2]).chain(valid.hi[2] + 1..=grown.hi[2]) {
            for j in grown.lo[1]..=grown.hi[1] {
                for i in grown.lo[0]..=grown.hi[0] {
                    let v = field.get(i, j, source(2, k), n);
                    field.set(i, j, k, n, v);
                }
            }
        }
    }
}

/// Ghost cells of a single-level domain without coarse-fine interfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DomainBoundary {
    periodic: [bool; 2],
}

impl Default for DomainBoundary {
    fn default() -> Self {
        Self::periodic()
    }
}

impl DomainBoundary {
    /// Periodic in x and y.
    pub fn periodic() -> Self {
        Self {
            periodic: [true, true],
        }
    }

    /// Zero-gradient on every side.
    pub fn open() -> Self {
        Self {
            periodic: [false, false],
        }
    }

    /// Choose periodicity per horizontal direction.
    pub fn with_periodicity(periodic_x: bool, periodic_y: bool) -> Self {
        Self {
            periodic: [periodic_x, periodic_y],
        }
    }

    /// Periodicity flags in x and y.
    pub fn is_periodic(&self) -> [bool; 2] {
        self.periodic
    }
}

impl BoundaryFill for DomainBoundary {
    fn fill(&mut self, state: &mut StateVector, _time: f64, fast_only: bool) -> Result<()> {
        let comps = if fast_only {
            FAST_CONS_COMPONENTS
        } else {
            0..state.ncons()
        };
        fill_field_ghosts(&mut state.cons, comps, self.periodic);
        fill_field_ghosts(&mut state.xmom, 0..1, self.periodic);
        fill_field_ghosts(&mut state.ymom, 0..1, self.periodic);
        fill_field_ghosts(&mut state.zmom, 0..1, self.periodic);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "domain"
    }
}
