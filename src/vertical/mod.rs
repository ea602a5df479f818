//! Terrain-following vertical coordinate.
//!
//! Physical heights are stored once, on nodes (`z_nd`). Everything else
//! (the cell Jacobian `detJ`, the face metrics `h_zeta`, `h_xi`, `h_eta`
//! and the contravariant flux Ω) is derived from them.
//!
//! # Basic terrain following
//!
//! Each node level ζ of a flat column is mapped to
//!
//! ```text
//! z = ζ + h(x, y) (1 − ζ / z_top)
//! ```
//!
//! so the lowest level follows the terrain and the top is flat.
//!
//! # Example
//!
//! ```
//! use dycore_rs::types::Geometry;
//! use dycore_rs::vertical::{TerrainMetrics, UniformStretching};
//!
//! let geom = Geometry::uniform([16, 1, 20], [250.0, 250.0, 100.0]);
//! let hill = |x: f64, _y: f64| 200.0 * (-((x - 2000.0) / 500.0).powi(2)).exp();
//! let metrics = TerrainMetrics::from_surface(&geom, [3, 3, 1], &UniformStretching, hill);
//!
//! // Columns over the hill are compressed
//! assert!(metrics.detj()[(8, 0, 0)] < metrics.detj()[(0, 0, 0)]);
//! ```

mod metrics;
mod moving;
mod omega;
mod stretching;
mod terrain;

pub use metrics::{
    h_eta_at_jface, h_eta_at_kface, h_xi_at_iface, h_xi_at_kface, h_zeta_at_cell_center,
    h_zeta_at_iface, h_zeta_at_jface, h_zeta_at_kface, z_at_cell_center, z_at_kface,
};
pub use moving::{MovingTerrain, SurfaceMotion, grid_velocity};
pub use omega::{compute_omega, omega_from_w, w_from_omega};
pub use stretching::{GeometricStretching, Stretching, UniformStretching};
pub use terrain::TerrainMetrics;
