//! Advection scheme selector.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Face reconstruction scheme.
///
/// Fixed per variable class and direction for the whole run. The names
/// accepted by [`FromStr`] are the configuration strings (`"Centered_2nd"`,
/// `"WENO5"`, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AdvectionScheme {
    /// Second-order centred.
    #[default]
    Centered2nd,
    /// Third-order upwind.
    Upwind3rd,
    /// Fourth-order centred.
    Centered4th,
    /// Fifth-order upwind.
    Upwind5th,
    /// Sixth-order centred.
    Centered6th,
    /// Third-order WENO (Jiang-Shu weights).
    Weno3,
    /// Third-order WENO-Z.
    WenoZ3,
    /// Third-order WENO with a quadratic central candidate (Zhu-Qiu type).
    WenoMzq3,
    /// Fifth-order WENO (Jiang-Shu weights).
    Weno5,
    /// Fifth-order WENO-Z.
    WenoZ5,
}

impl AdvectionScheme {
    /// Every scheme, in configuration order.
    pub const ALL: [AdvectionScheme; 10] = [
        AdvectionScheme::Centered2nd,
        AdvectionScheme::Upwind3rd,
        AdvectionScheme::Centered4th,
        AdvectionScheme::Upwind5th,
        AdvectionScheme::Centered6th,
        AdvectionScheme::Weno3,
        AdvectionScheme::WenoZ3,
        AdvectionScheme::WenoMzq3,
        AdvectionScheme::Weno5,
        AdvectionScheme::WenoZ5,
    ];

    /// Configuration string.
    pub const fn name(self) -> &'static str {
        match self {
            AdvectionScheme::Centered2nd => "Centered_2nd",
            AdvectionScheme::Upwind3rd => "Upwind_3rd",
            AdvectionScheme::Centered4th => "Centered_4th",
            AdvectionScheme::Upwind5th => "Upwind_5th",
            AdvectionScheme::Centered6th => "Centered_6th",
            AdvectionScheme::Weno3 => "WENO3",
            AdvectionScheme::WenoZ3 => "WENOZ3",
            AdvectionScheme::WenoMzq3 => "WENOMZQ3",
            AdvectionScheme::Weno5 => "WENO5",
            AdvectionScheme::WenoZ5 => "WENOZ5",
        }
    }

    /// Ghost cells needed on each side of a face.
    pub const fn stencil_radius(self) -> usize {
        match self {
            AdvectionScheme::Centered2nd => 1,
            AdvectionScheme::Upwind3rd
            | AdvectionScheme::Centered4th
            | AdvectionScheme::Weno3
            | AdvectionScheme::WenoZ3
            | AdvectionScheme::WenoMzq3 => 2,
            AdvectionScheme::Upwind5th
            | AdvectionScheme::Centered6th
            | AdvectionScheme::Weno5
            | AdvectionScheme::WenoZ5 => 3,
        }
    }

    /// Formal order of accuracy in smooth regions.
    pub const fn order(self) -> usize {
        match self {
            AdvectionScheme::Centered2nd => 2,
            AdvectionScheme::Upwind3rd
            | AdvectionScheme::Weno3
            | AdvectionScheme::WenoZ3
            | AdvectionScheme::WenoMzq3 => 3,
            AdvectionScheme::Centered4th => 4,
            AdvectionScheme::Upwind5th | AdvectionScheme::Weno5 | AdvectionScheme::WenoZ5 => 5,
            AdvectionScheme::Centered6th => 6,
        }
    }

    /// Whether the reconstruction weights depend on the data.
    pub const fn is_weno(self) -> bool {
        matches!(
            self,
            AdvectionScheme::Weno3
                | AdvectionScheme::WenoZ3
                | AdvectionScheme::WenoMzq3
                | AdvectionScheme::Weno5
                | AdvectionScheme::WenoZ5
        )
    }

    /// Whether the reconstruction uses the sign of the face flux.
    pub const fn is_upwind_biased(self) -> bool {
        !matches!(
            self,
            AdvectionScheme::Centered2nd | AdvectionScheme::Centered4th | AdvectionScheme::Centered6th
        )
    }

    /// Scheme used where only `radius` cells are available on each side.
    ///
    /// Sixth-order centred falls back to fourth then second, the upwind and
    /// WENO families drop to their third-order member then to second-order
    /// centred.
    pub const fn reduced(self, radius: usize) -> AdvectionScheme {
        if radius >= self.stencil_radius() {
            return self;
        }
        if radius <= 1 {
            return AdvectionScheme::Centered2nd;
        }
        match self {
            AdvectionScheme::Centered6th => AdvectionScheme::Centered4th,
            AdvectionScheme::Upwind5th => AdvectionScheme::Upwind3rd,
            AdvectionScheme::Weno5 => AdvectionScheme::Weno3,
            AdvectionScheme::WenoZ5 => AdvectionScheme::WenoZ3,
            other => other,
        }
    }
}

impl fmt::Display for AdvectionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdvectionScheme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdvectionScheme::ALL
            .iter()
            .copied()
            .find(|scheme| scheme.name() == s)
            .ok_or_else(|| ConfigError::UnknownAdvectionType {
                class: "advection".to_string(),
                value: s.to_string(),
            })
    }
}
