//! Error types.
//!
//! Every error surfaced by the dycore is fatal for the run: configuration
//! problems are reported once at startup, everything else aborts the stage
//! that detected it. There is no retry path.

use thiserror::Error;

/// Errors detected while validating the solver configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Advection-type string not in the supported set.
    #[error("unknown advection type '{value}' for {class}")]
    UnknownAdvectionType { class: String, value: String },

    /// Scheme exists but is not available for this variable class.
    #[error("advection type '{value}' is not supported for {class}")]
    UnsupportedAdvectionType { class: String, value: String },

    /// Incompressible projection needs the no-substep path.
    #[error("incompressible = true requires no_substepping = true")]
    IncompressibleRequiresNoSubstepping,

    /// Lagged Δ(ρθ) can only be switched off for moving terrain.
    #[error("use_lagged_delta_rt = false is only allowed with moving terrain")]
    LaggedDeltaRtRequiresMovingTerrain,

    /// Unrecognised closure or model name.
    #[error("unknown {kind} '{value}'")]
    UnknownModel { kind: &'static str, value: String },

    /// Incompatible combination of closures.
    #[error("incompatible options: {0}")]
    Incompatible(String),

    /// Numeric parameter outside its admissible range.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Configuration file could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl ConfigError {
    /// Create an invalid-parameter error.
    pub fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Errors raised by the integrator and its collaborators.
#[derive(Error, Debug)]
pub enum SolverError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A kernel would read outside the allocated halo.
    #[error("halo too small for {field}: stencil needs {needed:?} ghost cells, buffer has {available:?}")]
    HaloTooSmall {
        field: &'static str,
        needed: [usize; 3],
        available: [usize; 3],
    },

    /// Field shapes or locations do not match.
    #[error("shape mismatch for {field}: expected {expected}, got {actual}")]
    ShapeMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// Requested time lies outside the bracket of registered snapshots.
    #[error("time {time} outside interpolation bracket [{lo}, {hi}]")]
    TimeOutOfBracket { time: f64, lo: f64, hi: f64 },

    /// No coarse snapshots registered before a fill was requested.
    #[error("no coarse data registered for time interpolation")]
    MissingCoarseData,

    /// Projection linear solve failed.
    #[error("projection failed: {0}")]
    Projection(String),
}

impl SolverError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(
        field: &'static str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            field,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SolverError>;
