//! Physical constants for dry and moist air.
//!
//! SI units throughout. The ratio of specific heats is derived from the
//! dry-air gas constant and heat capacity so that the EOS helpers stay
//! internally consistent when `c_p` is overridden in the configuration.

/// Gas constant for dry air (J/(kg·K)).
pub const R_D: f64 = 287.0;

/// Gas constant for water vapour (J/(kg·K)).
pub const R_V: f64 = 461.505;

/// Specific heat of dry air at constant pressure (J/(kg·K)).
pub const C_P_D: f64 = 1004.5;

/// Specific heat of water vapour at constant pressure (J/(kg·K)).
pub const C_P_V: f64 = 1859.0;

/// Specific heat of dry air at constant volume (J/(kg·K)).
pub const C_V_D: f64 = C_P_D - R_D;

/// Ratio of specific heats c_p / c_v for dry air.
pub const GAMMA: f64 = C_P_D / C_V_D;

/// Inverse of [`GAMMA`].
pub const INV_GAMMA: f64 = 1.0 / GAMMA;

/// Reference surface pressure (Pa).
pub const P_0: f64 = 1.0e5;

/// Inverse of [`P_0`].
pub const INV_P_0: f64 = 1.0 / P_0;

/// Inverse of [`R_D`].
pub const INV_R_D: f64 = 1.0 / R_D;

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Default rotational period of the planet (s).
pub const ROTATIONAL_PERIOD: f64 = 86400.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_is_dry_air_value() {
        assert!((GAMMA - 1.4).abs() < 1e-3);
        assert!((GAMMA * INV_GAMMA - 1.0).abs() < 1e-15);
    }
}
