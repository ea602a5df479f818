//! Integrator abstractions.
//!
//! [`Integrable`] is the small vector-space interface the integrators need
//! from a state; [`IntegratorInfo`] describes an integrator for logging
//! and diagnostics without naming its state type.
//!
//! # Example
//! ```
//! use dycore_rs::state::StateVector;
//! use dycore_rs::time::Integrable;
//! use dycore_rs::types::IndexBox;
//!
//! let mut u = StateVector::new(IndexBox::cells(4, 1, 2), 2, [1, 1, 1]);
//! u.cons.fill(1.0);
//!
//! let v = u.clone();
//! u.scale(2.0);              // u = 2 u
//! u.axpy(0.5, &v).unwrap();  // u = u + 0.5 v
//! assert_eq!(u.cons[(0, 0, 0, 0)], 2.5);
//! ```

use crate::error::Result;

/// State types that can be advanced by an explicit integrator.
pub trait Integrable: Clone + Send + Sized {
    /// `self <- c * self`
    fn scale(&mut self, c: f64);

    /// `self <- self + c * other`
    ///
    /// Fails when the two operands have different layouts.
    fn axpy(&mut self, c: f64, other: &Self) -> Result<()>;

    /// Zero-initialised value of the same shape.
    fn zeros_like(&self) -> Self {
        let mut result = self.clone();
        result.scale(0.0);
        result
    }
}

/// Non-generic information about a time integrator.
///
/// Dyn-compatible, so callers can log or inspect an integrator without
/// knowing the state it advances.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy for the slow terms.
    fn order(&self) -> usize;

    /// Number of stages.
    fn n_stages(&self) -> usize;

    /// Whether the integrator is strong stability preserving.
    fn is_ssp(&self) -> bool;

    /// Times, relative to the step start, at which each stage's state is
    /// valid.
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}
