//! Ghost-cell refresh.
//!
//! The integrator never writes ghost cells itself. After every update it
//! hands the state to a [`BoundaryFill`] collaborator, passing
//! `fast_only = true` inside the acoustic loop so only the fast variables
//! (ρ, ρθ and momentum) are refreshed there.
//!
//! # Available fillers
//!
//! | Filler | Description |
//! |--------|-------------|
//! | [`DomainBoundary`] | Periodic or zero-gradient in x/y, zero-gradient in z |
//! | [`PatchTimeInterpolator`] | Linear-in-time data from two coarse snapshots |

mod domain;
mod patch;

pub use domain::{DomainBoundary, fill_field_ghosts};
pub use patch::PatchTimeInterpolator;

use crate::error::Result;
use crate::state::StateVector;

/// Conserved components refreshed when `fast_only` is set.
pub const FAST_CONS_COMPONENTS: std::ops::Range<usize> = 0..2;

/// Refreshes the ghost cells of a state.
pub trait BoundaryFill: Send {
    /// Fill every ghost cell of `state` consistently with `time`.
    ///
    /// With `fast_only` only ρ, ρθ and the momentum buffers need to be
    /// refreshed.
    fn fill(&mut self, state: &mut StateVector, time: f64, fast_only: bool) -> Result<()>;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

impl<B: BoundaryFill + ?Sized> BoundaryFill for Box<B> {
    fn fill(&mut self, state: &mut StateVector, time: f64, fast_only: bool) -> Result<()> {
        (**self).fill(state, time, fast_only)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
