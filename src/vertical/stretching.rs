//! Vertical level distributions for the terrain-following grid.
//!
//! A stretching function places the `n + 1` node levels of a column between
//! the ground (`z = 0`) and the model top (`z = z_top`) for flat terrain.
//! The terrain mapping then deforms those levels over orography.
//!
//! # Available Stretching Functions
//!
//! - [`UniformStretching`]: Equal spacing
//! - [`GeometricStretching`]: Spacing grows by a constant ratio with height
//!
//! # Example
//!
//! ```
//! use dycore_rs::vertical::{GeometricStretching, Stretching, UniformStretching};
//!
//! let uniform = UniformStretching.levels(10, 1000.0);
//! assert_eq!(uniform[1], 100.0);
//!
//! // Fine levels near the ground, coarse aloft
//! let stretched = GeometricStretching { ratio: 1.1 }.levels(10, 1000.0);
//! assert!(stretched[1] < uniform[1]);
//! assert!((stretched[10] - 1000.0).abs() < 1e-9);
//! ```

/// Trait for vertical stretching functions.
///
/// # Implementation Notes
///
/// - The returned vector has length `n_levels + 1` (node levels)
/// - `levels[0] == 0` and `levels[n_levels] == z_top`
/// - Values must be strictly increasing
pub trait Stretching: Send + Sync {
    /// Node heights of a flat-terrain column.
    fn levels(&self, n_levels: usize, z_top: f64) -> Vec<f64>;

    /// Human-readable name for debugging and logging.
    fn name(&self) -> &'static str;

    /// Description of parameters (for diagnostics).
    fn description(&self) -> String {
        self.name().to_string()
    }
}

// =============================================================================
// Uniform Stretching
// =============================================================================

/// Uniform (equal) spacing between ground and model top.
///
/// With `z_top = n·dζ` the physical levels coincide with the computational
/// ones, so flat terrain reproduces the Cartesian grid exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformStretching;

impl Stretching for UniformStretching {
    fn levels(&self, n_levels: usize, z_top: f64) -> Vec<f64> {
        let dz = z_top / n_levels as f64;
        (0..=n_levels).map(|k| k as f64 * dz).collect()
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

// =============================================================================
// Geometric Stretching
// =============================================================================

/// Layer thickness growing by a constant factor per level.
///
/// The first layer thickness is chosen so that the column ends exactly at
/// `z_top`. A ratio of 1 degenerates to [`UniformStretching`].
#[derive(Clone, Copy, Debug)]
pub struct GeometricStretching {
    /// dz(k+1) / dz(k), typically 1.02 to 1.15.
    pub ratio: f64,
}

impl Default for GeometricStretching {
    fn default() -> Self {
        Self { ratio: 1.05 }
    }
}

impl GeometricStretching {
    /// Thickness of the lowest layer.
    pub fn first_layer(&self, n_levels: usize, z_top: f64) -> f64 {
        let r = self.ratio;
        if (r - 1.0).abs() < 1e-12 {
            z_top / n_levels as f64
        } else {
            z_top * (r - 1.0) / (r.powi(n_levels as i32) - 1.0)
        }
    }
}

impl Stretching for GeometricStretching {
    fn levels(&self, n_levels: usize, z_top: f64) -> Vec<f64> {
        let mut dz = self.first_layer(n_levels, z_top);
        let mut z = Vec::with_capacity(n_levels + 1);
        z.push(0.0);
        for k in 0..n_levels {
            z.push(z[k] + dz);
            dz *= self.ratio;
        }
        // Pin the top against round-off
        z[n_levels] = z_top;
        z
    }

    fn name(&self) -> &'static str {
        "geometric"
    }

    fn description(&self) -> String {
        format!("geometric(ratio={})", self.ratio)
    }
}
