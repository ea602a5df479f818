//! Turbulence and molecular transport model selectors.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Large-eddy simulation closure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LesType {
    /// No subgrid model (DNS).
    #[default]
    None,
    Smagorinsky,
    /// Prognostic subgrid kinetic energy.
    Deardorff,
}

/// Planetary boundary layer closure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PblType {
    #[default]
    None,
    /// Mellor-Yamada-Nakanishi-Niino level 2.5.
    Mynn25,
}

/// Molecular transport model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MolecDiffType {
    #[default]
    None,
    /// Constant dynamic coefficients `ρα`.
    Constant,
    /// Constant kinematic coefficients `α`, multiplied by the local density.
    ConstantAlpha,
}

impl FromStr for LesType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Smagorinsky" => Ok(Self::Smagorinsky),
            "Deardorff" => Ok(Self::Deardorff),
            other => Err(ConfigError::UnknownModel {
                kind: "les_type",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for PblType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "MYNN2.5" => Ok(Self::Mynn25),
            other => Err(ConfigError::UnknownModel {
                kind: "pbl_type",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for MolecDiffType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(Self::None),
            "Constant" => Ok(Self::Constant),
            "ConstantAlpha" => Ok(Self::ConstantAlpha),
            other => Err(ConfigError::UnknownModel {
                kind: "molec_diff_type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::Smagorinsky => "Smagorinsky",
            Self::Deardorff => "Deardorff",
        })
    }
}

impl fmt::Display for PblType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::Mynn25 => "MYNN2.5",
        })
    }
}

impl fmt::Display for MolecDiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "None",
            Self::Constant => "Constant",
            Self::ConstantAlpha => "ConstantAlpha",
        })
    }
}

/// Coefficients of the MYNN level 2.5 closure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PblCoefficients {
    pub a1: f64,
    pub a2: f64,
    pub b1: f64,
    pub b2: f64,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub c4: f64,
    pub c5: f64,
}

impl Default for PblCoefficients {
    fn default() -> Self {
        Self {
            a1: 1.18,
            a2: 0.665,
            b1: 24.0,
            b2: 15.0,
            c1: 0.137,
            c2: 0.75,
            c3: 0.352,
            c4: 0.0,
            c5: 0.2,
        }
    }
}

impl PblCoefficients {
    /// Neutral stability function for momentum.
    #[inline]
    pub fn sm_neutral(&self) -> f64 {
        self.a1 * (1.0 - 3.0 * self.c1 - 6.0 * self.a1 / self.b1)
    }

    /// Neutral stability function for heat.
    #[inline]
    pub fn sh_neutral(&self) -> f64 {
        self.a2 * (1.0 - 6.0 * self.a1 / self.b1)
    }
}

/// Parameters of the diffusion closures, fixed for the run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffusionParams {
    pub les_type: LesType,
    pub pbl_type: PblType,
    pub molec_diff_type: MolecDiffType,
    /// Molecular viscosity μ (kg/(m·s)).
    pub dynamic_viscosity: f64,
    /// Density used to convert dynamic to kinematic coefficients.
    pub rho0_trans: f64,
    /// Thermal diffusivity (m²/s).
    pub alpha_t: f64,
    /// Scalar diffusivity (m²/s).
    pub alpha_c: f64,
    /// Smagorinsky constant.
    pub cs: f64,
    /// Deardorff eddy-viscosity constant.
    pub ck: f64,
    /// Deardorff dissipation constant.
    pub ce: f64,
    /// Deardorff turbulent Prandtl number for kinetic energy.
    pub sigma_k: f64,
    pub pr_t_inv: f64,
    pub sc_t_inv: f64,
    /// Reference potential temperature of the buoyancy terms (K).
    pub theta_ref: f64,
    pub pbl: PblCoefficients,
}

impl Default for DiffusionParams {
    fn default() -> Self {
        Self {
            les_type: LesType::None,
            pbl_type: PblType::None,
            molec_diff_type: MolecDiffType::None,
            dynamic_viscosity: 0.0,
            rho0_trans: 1.0,
            alpha_t: 0.0,
            alpha_c: 0.0,
            cs: 0.0,
            ck: 0.1,
            ce: 0.93,
            sigma_k: 0.5,
            pr_t_inv: 3.0,
            sc_t_inv: 1.0,
            theta_ref: 300.0,
            pbl: PblCoefficients::default(),
        }
    }
}

impl DiffusionParams {
    /// Whether any diffusive transport is switched on.
    pub fn is_active(&self) -> bool {
        self.les_type != LesType::None
            || self.pbl_type != PblType::None
            || self.molec_diff_type != MolecDiffType::None
    }

    /// Dynamic molecular coefficients for momentum, θ and scalars at density `rho`.
    #[inline]
    pub fn molecular(&self, rho: f64) -> [f64; 3] {
        match self.molec_diff_type {
            MolecDiffType::None => [0.0; 3],
            MolecDiffType::Constant => [
                self.dynamic_viscosity,
                self.rho0_trans * self.alpha_t,
                self.rho0_trans * self.alpha_c,
            ],
            MolecDiffType::ConstantAlpha => [
                rho * self.dynamic_viscosity / self.rho0_trans,
                rho * self.alpha_t,
                rho * self.alpha_c,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_names() {
        assert_eq!("Smagorinsky".parse::<LesType>().unwrap(), LesType::Smagorinsky);
        assert_eq!("MYNN2.5".parse::<PblType>().unwrap(), PblType::Mynn25);
        assert_eq!(
            "ConstantAlpha".parse::<MolecDiffType>().unwrap(),
            MolecDiffType::ConstantAlpha
        );
        assert!(matches!(
            "Kolmogorov".parse::<LesType>(),
            Err(ConfigError::UnknownModel { kind: "les_type", .. })
        ));
    }

    #[test]
    fn test_molecular_coefficients() {
        let mut p = DiffusionParams {
            molec_diff_type: MolecDiffType::Constant,
            dynamic_viscosity: 2.0,
            rho0_trans: 1.5,
            alpha_t: 0.1,
            alpha_c: 0.2,
            ..Default::default()
        };
        let c = p.molecular(3.0);
        assert!((c[0] - 2.0).abs() < 1e-15);
        assert!((c[1] - 0.15).abs() < 1e-15);

        p.molec_diff_type = MolecDiffType::ConstantAlpha;
        let c = p.molecular(3.0);
        assert!((c[0] - 4.0).abs() < 1e-15);
        assert!((c[2] - 0.6).abs() < 1e-15);
    }

    #[test]
    fn test_neutral_stability_functions_positive() {
        let c = PblCoefficients::default();
        assert!(c.sm_neutral() > 0.0);
        assert!(c.sh_neutral() > c.sm_neutral());
    }
}
