//! Equation of state for dry and moist air.
//!
//! Maps among density ρ, potential temperature θ, pressure p, temperature T
//! and the Exner function π. All functions are pure and allocation-free so
//! they can be called from inside per-cell kernels.
//!
//! # Relations
//!
//! ```text
//! p = p₀ (R_d ρθ / p₀)^γ
//! π = (p / p₀)^(R_d / c_p)
//! T = p / (R_d ρ)
//! ```
//!
//! The conserved variable is the product ρθ, so the pressure depends on a
//! single field and the acoustic tendencies never need θ separately.
//!
//! # Example
//!
//! ```
//! use dycore_rs::equations::{pressure_given_rhotheta, rhotheta_given_pressure};
//!
//! let p = pressure_given_rhotheta(1.2 * 300.0);
//! let rt = rhotheta_given_pressure(p);
//! assert!((rt / 1.2 - 300.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{
    C_P_D, C_P_V, GAMMA, INV_GAMMA, INV_P_0, INV_R_D, P_0, R_D, R_V,
};

/// Treatment of water vapour in the pressure diagnosis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoistureModel {
    /// Dry air only; the vapour mixing ratio is ignored.
    #[default]
    Dry,
    /// Moist air with vapour-modified gas constant and heat capacity.
    Moist,
    /// Warm-rain model without precipitation (virtual potential temperature).
    WarmNoPrecip,
}

/// Temperature from density and ρθ.
#[inline]
pub fn temperature_given_rho_rhotheta(rho: f64, rhotheta: f64) -> f64 {
    let p = P_0 * (R_D * rhotheta * INV_P_0).powf(GAMMA);
    p / (R_D * rho)
}

/// Potential temperature from density and temperature.
#[inline]
pub fn theta_given_rho_temperature(rho: f64, temperature: f64, rd_over_cp: f64) -> f64 {
    let p = rho * R_D * temperature;
    temperature * (P_0 / p).powf(rd_over_cp)
}

/// Pressure from ρθ for dry air.
#[inline]
pub fn pressure_given_rhotheta(rhotheta: f64) -> f64 {
    P_0 * (R_D * rhotheta * INV_P_0).powf(GAMMA)
}

/// Pressure from ρθ and the vapour mixing ratio `qv`.
///
/// For [`MoistureModel::Dry`] this is identical to
/// [`pressure_given_rhotheta`].
#[inline]
pub fn pressure_given_rhotheta_moist(rhotheta: f64, qv: f64, model: MoistureModel) -> f64 {
    match model {
        MoistureModel::Dry => pressure_given_rhotheta(rhotheta),
        MoistureModel::Moist => {
            let r_t = R_D + qv * R_V;
            let cp_t = C_P_D + qv * C_P_V;
            let gamma_t = cp_t / (cp_t - r_t);
            let rhotheta_t = rhotheta * (1.0 + qv);
            P_0 * (r_t * rhotheta_t * INV_P_0).powf(gamma_t)
        }
        MoistureModel::WarmNoPrecip => {
            let rhotheta_t = rhotheta * (1.0 + (R_V / R_D) * qv);
            P_0 * (R_D * rhotheta_t * INV_P_0).powf(GAMMA)
        }
    }
}

/// Density from potential temperature and pressure.
#[inline]
pub fn rho_given_theta_pressure(theta: f64, p: f64, rd_over_cp: f64) -> f64 {
    P_0.powf(rd_over_cp) * p.powf(INV_GAMMA) / (R_D * theta)
}

/// ∂p/∂ρ at constant θ (squared sound speed).
#[inline]
pub fn dpdrho_given_constant_theta(rho: f64, theta: f64) -> f64 {
    GAMMA * P_0 * (R_D * theta * INV_P_0).powf(GAMMA) * rho.powf(GAMMA - 1.0)
}

/// Exner function from pressure.
#[inline]
pub fn exner_given_pressure(p: f64, rd_over_cp: f64) -> f64 {
    (p * INV_P_0).powf(rd_over_cp)
}

/// Exner function from ρθ.
#[inline]
pub fn exner_given_rhotheta(rhotheta: f64, rd_over_cp: f64) -> f64 {
    (R_D * rhotheta * INV_P_0).powf(GAMMA * rd_over_cp)
}

/// ρθ from pressure; inverse of [`pressure_given_rhotheta`].
#[inline]
pub fn rhotheta_given_pressure(p: f64) -> f64 {
    (p * P_0.powf(GAMMA - 1.0)).powf(INV_GAMMA) * INV_R_D
}

/// Equation-of-state calculator bound to a heat capacity and moisture model.
///
/// Thin wrapper around the free functions for callers that carry the
/// configured `c_p` around instead of passing `R_d / c_p` explicitly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EquationOfState {
    /// R_d / c_p
    pub rd_over_cp: f64,
    /// Moisture treatment for pressure diagnosis
    pub moisture: MoistureModel,
}

impl Default for EquationOfState {
    fn default() -> Self {
        Self::new()
    }
}

impl EquationOfState {
    /// Dry air with the standard heat capacity.
    pub fn new() -> Self {
        Self {
            rd_over_cp: R_D / C_P_D,
            moisture: MoistureModel::Dry,
        }
    }

    /// Create with a custom c_p and moisture model.
    pub fn with_params(c_p: f64, moisture: MoistureModel) -> Self {
        Self {
            rd_over_cp: R_D / c_p,
            moisture,
        }
    }

    /// Pressure from ρθ and vapour mixing ratio.
    #[inline]
    pub fn pressure(&self, rhotheta: f64, qv: f64) -> f64 {
        pressure_given_rhotheta_moist(rhotheta, qv, self.moisture)
    }

    /// Exner function from ρθ.
    #[inline]
    pub fn exner(&self, rhotheta: f64) -> f64 {
        exner_given_rhotheta(rhotheta, self.rd_over_cp)
    }

    /// Density from θ and p.
    #[inline]
    pub fn density(&self, theta: f64, p: f64) -> f64 {
        rho_given_theta_pressure(theta, p, self.rd_over_cp)
    }

    /// Sound speed √(∂p/∂ρ)|θ.
    #[inline]
    pub fn sound_speed(&self, rho: f64, theta: f64) -> f64 {
        dpdrho_given_constant_theta(rho, theta).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RHO: f64 = 1.2;
    const THETA: f64 = 300.0;

    #[test]
    fn test_pressure_round_trip() {
        let p = pressure_given_rhotheta(RHO * THETA);
        let theta = rhotheta_given_pressure(p) / RHO;
        assert!(((theta - THETA) / THETA).abs() < 1e-10);
    }

    #[test]
    fn test_pressure_near_surface_value() {
        // ρθ = 360 kg K/m³ is close to a standard surface state
        let p = pressure_given_rhotheta(RHO * THETA);
        assert!(p > 0.9e5 && p < 1.2e5, "p = {}", p);
    }

    #[test]
    fn test_temperature_theta_consistency() {
        let eos = EquationOfState::new();
        let t = temperature_given_rho_rhotheta(RHO, RHO * THETA);
        let theta = theta_given_rho_temperature(RHO, t, eos.rd_over_cp);
        assert!((theta - THETA).abs() < 1e-8);
    }

    #[test]
    fn test_exner_forms_agree() {
        let rd_over_cp = R_D / C_P_D;
        let p = pressure_given_rhotheta(RHO * THETA);
        let pi_p = exner_given_pressure(p, rd_over_cp);
        let pi_rt = exner_given_rhotheta(RHO * THETA, rd_over_cp);
        assert!((pi_p - pi_rt).abs() < 1e-12);
    }

    #[test]
    fn test_density_given_theta_pressure() {
        let rd_over_cp = R_D / C_P_D;
        let p = pressure_given_rhotheta(RHO * THETA);
        let rho = rho_given_theta_pressure(THETA, p, rd_over_cp);
        assert!((rho - RHO).abs() < 1e-10);
    }

    #[test]
    fn test_sound_speed() {
        let eos = EquationOfState::new();
        let c = eos.sound_speed(RHO, THETA);
        // Adiabatic sound speed for near-surface air
        assert!(c > 330.0 && c < 360.0, "c = {}", c);

        // Finite-difference check of ∂p/∂ρ at constant θ
        let drho = 1e-6;
        let dp = pressure_given_rhotheta((RHO + drho) * THETA)
            - pressure_given_rhotheta((RHO - drho) * THETA);
        let fd = dp / (2.0 * drho);
        assert!((fd - c * c).abs() / fd < 1e-6);
    }

    #[test]
    fn test_dry_models_match() {
        let p_dry = pressure_given_rhotheta(RHO * THETA);
        let p_moist = pressure_given_rhotheta_moist(RHO * THETA, 0.0, MoistureModel::Moist);
        let p_warm = pressure_given_rhotheta_moist(RHO * THETA, 0.0, MoistureModel::WarmNoPrecip);
        assert!((p_dry - p_moist).abs() < 1e-8);
        assert!((p_dry - p_warm).abs() < 1e-8);
    }

    #[test]
    fn test_vapour_raises_pressure() {
        let p_dry = pressure_given_rhotheta(RHO * THETA);
        let p_moist = pressure_given_rhotheta_moist(RHO * THETA, 0.01, MoistureModel::Moist);
        let p_warm = pressure_given_rhotheta_moist(RHO * THETA, 0.01, MoistureModel::WarmNoPrecip);
        assert!(p_moist > p_dry);
        assert!(p_warm > p_dry);
    }
}
