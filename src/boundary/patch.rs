//! Time interpolation of coarse-level data into fine-level ghost cells.
//!
//! A coarse level advances by `dt_crse` while the fine level takes several
//! shorter steps. Between the two coarse snapshots the fine ghost cells are
//! filled with
//!
//! ```text
//! q(t) = (1 − f) q_old + f q_new,    f = (t − t0) / (t1 − t0)
//! ```
//!
//! Snapshots are expected on the fine index space already; spatial
//! refinement is left to the caller.

use crate::error::{ConfigError, Result, SolverError};
use crate::field::Field;
use crate::state::StateVector;
use crate::types::IndexBox;

use super::{BoundaryFill, FAST_CONS_COMPONENTS};

/// Slack on the coarse time bracket.
const TIME_EPS: f64 = f32::EPSILON as f64;

#[derive(Clone, Debug)]
struct Snapshots {
    old: StateVector,
    new: StateVector,
    t0: f64,
    t1: f64,
}

/// Fills ghost cells by linear interpolation between two coarse snapshots.
#[derive(Clone, Debug, Default)]
pub struct PatchTimeInterpolator {
    data: Option<Snapshots>,
}

impl PatchTimeInterpolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the coarse state at the start and end of a coarse step.
    pub fn register_coarse_data(&mut self, old: StateVector, t0: f64, new: StateVector, t1: f64) -> Result<()> {
        if !(t1 > t0) {
            return Err(ConfigError::invalid("coarse time step", t1 - t0, "must be positive").into());
        }
        if old.cells() != new.cells() || old.ncons() != new.ncons() || old.nghost() != new.nghost() {
            return Err(SolverError::shape_mismatch(
                "coarse snapshot",
                format!("{} x{}", old.cells(), old.ncons()),
                format!("{} x{}", new.cells(), new.ncons()),
            ));
        }
        self.data = Some(Snapshots { old, new, t0, t1 });
        Ok(())
    }

    /// Time bracket of the registered data, if any.
    pub fn bracket(&self) -> Option<(f64, f64)> {
        self.data.as_ref().map(|d| (d.t0, d.t1))
    }

    /// Weights `(fac_old, fac_new)` for `time`.
    pub fn weights(&self, time: f64) -> Result<(f64, f64)> {
        let data = self.data.as_ref().ok_or(SolverError::MissingCoarseData)?;
        if time < data.t0 - TIME_EPS || time > data.t1 + TIME_EPS {
            return Err(SolverError::TimeOutOfBracket {
                time,
                lo: data.t0,
                hi: data.t1,
            });
        }
        let fac_new = (time - data.t0) / (data.t1 - data.t0);
        Ok((1.0 - fac_new, fac_new))
    }

    fn fill_ghosts(target: &mut Field, old: &Field, new: &Field, comps: std::ops::Range<usize>, w: (f64, f64)) -> Result<()> {
        if !target.same_layout(old) {
            return Err(SolverError::shape_mismatch(
                "fine state",
                format!("{} {}", old.location(), old.grown_box()),
                format!("{} {}", target.location(), target.grown_box()),
            ));
        }
        let valid = target.valid_box();
        let grown = target.grown_box();
        target.for_each_mut(&grown, comps, |i, j, k, n, v| {
            if !valid.contains(i, j, k) {
                *v = w.0 * old[(i, j, k, n)] + w.1 * new[(i, j, k, n)];
            }
        });
        Ok(())
    }

    /// Interpolate the full region of one snapshot field pair into `region` of
    /// `target`, including valid cells.
    pub fn fill_region(&self, target: &mut Field, region: &IndexBox, time: f64, comp: usize) -> Result<()> {
        let w = self.weights(time)?;
        let data = self.data.as_ref().ok_or(SolverError::MissingCoarseData)?;
        let (old, new) = (&data.old.cons, &data.new.cons);
        old.ensure_contains(region, "coarse data")?;
        target.ensure_contains(region, "fine data")?;
        target.for_each_mut(region, comp..comp + 1, |i, j, k, n, v| {
            *v = w.0 * old[(i, j, k, n)] + w.1 * new[(i, j, k, n)];
        });
        Ok(())
    }
}

impl BoundaryFill for PatchTimeInterpolator {
    fn fill(&mut self, state: &mut StateVector, time: f64, fast_only: bool) -> Result<()> {
        let w = self.weights(time)?;
        let data = self.data.as_ref().ok_or(SolverError::MissingCoarseData)?;
        let comps = if fast_only {
            FAST_CONS_COMPONENTS
        } else {
            0..state.ncons()
        };
        Self::fill_ghosts(&mut state.cons, &data.old.cons, &data.new.cons, comps, w)?;
        Self::fill_ghosts(&mut state.xmom, &data.old.xmom, &data.new.xmom, 0..1, w)?;
        Self::fill_ghosts(&mut state.ymom, &data.old.ymom, &data.new.ymom, 0..1, w)?;
        Self::fill_ghosts(&mut state.zmom, &data.old.zmom, &data.new.zmom, 0..1, w)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "coarse-fine time interpolation"
    }
}
