//! Diffusion and turbulence closures.
//!
//! A [`DiffusionClosure`] adds its tendencies into the same slow
//! right-hand-side buffer the advection operators write. The bundled
//! [`TurbulentDiffusion`] combines
//!
//! - molecular transport (`Constant` or `ConstantAlpha` coefficients),
//! - a Smagorinsky or Deardorff LES closure,
//! - a MYNN 2.5 boundary-layer closure with its QKE source term.
//!
//! [`add_numerical_diffusion`] is independent of the closure and damps
//! grid-scale noise of the centred advection schemes.

mod closure;
mod eddy;
mod models;
mod numerical;
mod qke;

pub use closure::{DiffusionClosure, DiffusionInputs, TurbulentDiffusion};
pub use eddy::{EddyDiff, compute_eddy_diffusivity};
pub use models::{DiffusionParams, LesType, MolecDiffType, PblCoefficients, PblType};
pub use numerical::{NUM_DIFF_HALO, add_numerical_diffusion};
pub use qke::{ke_source_term, qke_source_term};
