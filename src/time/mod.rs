//! Time integration of the split compressible equations.
//!
//! [`SplitIntegrator`] advances a [`StateVector`](crate::state::StateVector)
//! through three Runge–Kutta stages, either with the full tendency frozen
//! per stage ([`no_substep_update`]) or with acoustic substeps. The
//! incompressible mode projects the momentum after every stage
//! ([`project_momentum`]).

mod integrator;
mod no_substep;
mod projection;
mod split;

pub use integrator::{Integrable, IntegratorInfo};
pub use no_substep::{TerrainStep, no_substep_update};
pub use projection::{momentum_divergence, project_momentum};
pub use split::{RHO_THETA_EXTRAPOLATION, STAGE_FRACTIONS, SplitIntegrator};
