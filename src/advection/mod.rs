//! Advection operators and flux-divergence tendencies.
//!
//! # Schemes
//!
//! | Scheme          | Order | Radius | Flux-biased |
//! |-----------------|-------|--------|-------------|
//! | `Centered_2nd`  | 2     | 1      | no          |
//! | `Upwind_3rd`    | 3     | 2      | yes         |
//! | `Centered_4th`  | 4     | 2      | no          |
//! | `Upwind_5th`    | 5     | 3      | yes         |
//! | `Centered_6th`  | 6     | 3      | no          |
//! | `WENO3`, `WENOZ3`, `WENOMZQ3` | 3 | 2 | yes |
//! | `WENO5`, `WENOZ5` | 5   | 3      | yes         |
//!
//! Centred schemes carry no implicit dissipation and are not stable for
//! pure advection on their own; pair them with numerical diffusion.
//!
//! # Example
//!
//! ```
//! use dycore_rs::advection::{
//!     AdvectionGrid, AdvectionScheme, FluxAccumulator, Interpolator,
//!     advection_src_for_rho_and_theta, advection_src_for_scalars,
//! };
//! use dycore_rs::field::{Field, MapFactors};
//! use dycore_rs::types::{IndexBox, Staggering};
//!
//! let cells = IndexBox::cells(10, 1, 4);
//! let ng = [3, 3, 1];
//! let rho_u = Field::filled(cells, Staggering::XFace, 1, ng, 1.0);
//! let rho_v = Field::filled(cells, Staggering::YFace, 1, ng, 0.0);
//! let rho_w = Field::filled(cells, Staggering::ZFace, 1, ng, 0.0);
//! // θ and one passive tracer
//! let prim = Field::filled(cells, Staggering::CellCentered, 2, ng, 300.0);
//! let mf = MapFactors::unity(&cells, [3, 3]);
//!
//! let grid = AdvectionGrid { inv_cell_size: [1.0, 1.0, 1.0], metrics: None, map_factors: Some(&mf) };
//! let interp = Interpolator::new(AdvectionScheme::Weno5, AdvectionScheme::Centered2nd);
//!
//! let mut avg = FluxAccumulator::new(&cells, [0, 0, 0]);
//! let mut src = Field::new(cells, Staggering::CellCentered, 3, [0, 0, 0]);
//! advection_src_for_rho_and_theta(
//!     &cells, 1.0, &rho_u, &rho_v, &rho_w, &prim, &interp, &grid, &mut src, &mut avg,
//! ).unwrap();
//! advection_src_for_scalars(&cells, 2, 1, &avg, &prim, &interp, &grid, &mut src).unwrap();
//!
//! assert!(src.as_slice().iter().all(|v| v.abs() < 1e-12));
//! ```

mod interpolator;
mod momentum;
mod scheme;
mod source;
mod stencil;
mod weno;

pub use interpolator::Interpolator;
pub use momentum::{MomentumInputs, advection_src_for_momentum};
pub use scheme::AdvectionScheme;
pub use source::{
    AdvectionGrid, FluxAccumulator, advection_src_for_rho_and_theta, advection_src_for_scalars,
};
pub use stencil::{FaceFn, centered_2nd, centered_4th, centered_6th, upwind_3rd, upwind_5th};
pub use weno::{weno3, weno5, wenomzq3, wenoz3, wenoz5};
