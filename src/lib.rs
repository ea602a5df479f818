//! # dycore-rs
//!
//! Time-integration and transport kernels for a fully compressible,
//! terrain-following atmospheric model on a staggered structured grid.
//!
//! This crate provides:
//! - Equation of state helpers in terms of ρθ
//! - Terrain metrics, vertical level stretching and moving terrain
//! - Face interpolation (centred, upwind and WENO families)
//! - Two-pass advection of mass, heat and scalars plus momentum advection
//! - Molecular, LES and PBL diffusion closures, numerical diffusion
//! - Fast/slow split Runge–Kutta integration with acoustic substepping
//! - Boundary refresh and coarse–fine time interpolation
//! - Validated configuration loaded from JSON
//!
//! # Example
//!
//! ```
//! use dycore_rs::{
//!     BaseState, ConsVar, DomainBoundary, DycoreRhs, Geometry, MapFactors, SolverConfig,
//!     SolverParams, SplitIntegrator, StateVector,
//! };
//!
//! let geom = Geometry::uniform([8, 4, 10], [1000.0, 1000.0, 200.0]);
//! let config = SolverConfig::from_params(&SolverParams {
//!     use_gravity: true,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let nghost = [2, 2, 1];
//! let base = BaseState::isentropic(&geom, nghost, None, 300.0, 1.0e5);
//! let map_factors = MapFactors::unity(&geom.domain, [2, 2]);
//! let mut state = StateVector::new(geom.domain, ConsVar::NUM_DRY, nghost);
//! base.initialize(&mut state);
//!
//! let rhs = DycoreRhs::new(&config, &geom, &base, &map_factors);
//! let mut bc = DomainBoundary::periodic();
//! SplitIntegrator::new(&config)
//!     .advance(&rhs, &mut bc, &mut state, 0.0, 1.0)
//!     .unwrap();
//! ```

pub mod advection;
pub mod boundary;
pub mod config;
pub mod constants;
pub mod diffusion;
pub mod equations;
pub mod error;
pub mod field;
pub mod rhs;
pub mod state;
pub mod time;
pub mod types;
pub mod vertical;

// Re-export main types for convenience
pub use advection::{AdvectionScheme, FluxAccumulator, Interpolator};
pub use boundary::{BoundaryFill, DomainBoundary, PatchTimeInterpolator};
pub use config::{SolverConfig, SolverParams};
pub use diffusion::{DiffusionClosure, TurbulentDiffusion};
pub use equations::{EquationOfState, MoistureModel};
pub use error::{ConfigError, Result, SolverError};
pub use field::{Field, MapFactors};
pub use rhs::{DycoreRhs, RhsMode};
pub use state::{BaseState, ConsVar, StateVector};
pub use time::{SplitIntegrator, no_substep_update, project_momentum};
pub use types::{Direction, Geometry, IndexBox, Staggering};
pub use vertical::{MovingTerrain, TerrainMetrics};
