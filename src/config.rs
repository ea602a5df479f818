//! Solver configuration.
//!
//! [`SolverParams`] is the user-facing input: every field has a default, so
//! a JSON document only needs the options it changes. It is turned into
//! an immutable [`SolverConfig`] by [`SolverConfig::from_params`], which
//! rejects unsupported combinations and precomputes derived constants.
//!
//! # Example
//!
//! ```
//! use dycore_rs::config::{SolverConfig, SolverParams};
//! use dycore_rs::advection::AdvectionScheme;
//!
//! let params = SolverParams::from_json_str(r#"{
//!     "use_gravity": true,
//!     "dycore_horiz_adv_type": "Upwind_5th",
//!     "moistscal_horiz_adv_type": "WENOZ5"
//! }"#).unwrap();
//! let config = SolverConfig::from_params(&params).unwrap();
//!
//! assert_eq!(config.advection.dycore_horiz, AdvectionScheme::Upwind5th);
//! assert_eq!(config.advection.moistscal_vert, AdvectionScheme::Weno3);
//! assert!((config.gravity - 9.81).abs() < 1e-12);
//! ```

use std::f64::consts::PI;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::advection::{AdvectionScheme, Interpolator};
use crate::constants::{C_P_D, GRAVITY, ROTATIONAL_PERIOD};
use crate::diffusion::{DiffusionParams, LesType, MolecDiffType, PblCoefficients, PblType};
use crate::equations::{EquationOfState, MoistureModel};
use crate::error::ConfigError;

/// Whether terrain heights change in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    #[default]
    Static,
    Moving,
}

/// Form of the buoyancy term in the vertical momentum equation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuoyancyType {
    /// `−g (ρ − ρ₀)`
    #[default]
    Density,
    /// `−g ρ₀ (p'/(γ p₀) − θ'/θ₀)`
    PressurePerturbation,
    /// As [`BuoyancyType::PressurePerturbation`] with virtual potential temperature.
    VirtualTheta,
}

impl TryFrom<u8> for BuoyancyType {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Density),
            2 => Ok(Self::PressurePerturbation),
            3 => Ok(Self::VirtualTheta),
            other => Err(ConfigError::invalid("buoyancy_type", f64::from(other), "must be 1, 2 or 3")),
        }
    }
}

/// Raw solver options as read from a configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    pub use_terrain: bool,
    pub terrain_type: TerrainType,
    pub use_map_factors: bool,

    pub no_substepping: bool,
    pub force_stage1_single_substep: bool,
    pub incompressible: bool,
    /// Carry the ρθ offset of the last acoustic substep into the next stage.
    pub use_lagged_delta_rt: bool,
    /// Acoustic substeps in the last RK stage.
    pub n_substeps: usize,

    pub use_gravity: bool,
    /// Specific heat of dry air at constant pressure (J/(kg·K)).
    pub c_p: f64,
    /// 1, 2 or 3, see [`BuoyancyType`].
    pub buoyancy_type: u8,
    pub moisture: MoistureModel,

    pub les_type: String,
    pub pbl_type: String,
    /// Empty selects `Constant` without LES and `None` with LES.
    pub molec_diff_type: String,
    pub dynamic_viscosity: f64,
    pub rho0_trans: f64,
    pub alpha_t: f64,
    pub alpha_c: f64,
    pub cs: f64,
    pub ck: f64,
    pub ce: f64,
    pub sigma_k: f64,
    /// Turbulent Prandtl number.
    pub pr_t: f64,
    /// Turbulent Schmidt number.
    pub sc_t: f64,
    pub theta_ref: f64,
    pub pbl_a1: f64,
    pub pbl_a2: f64,
    pub pbl_b1: f64,
    pub pbl_b2: f64,
    pub pbl_c1: f64,
    pub pbl_c2: f64,
    pub pbl_c3: f64,
    pub pbl_c4: f64,
    pub pbl_c5: f64,

    pub use_coriolis: bool,
    /// Seconds per planetary revolution.
    pub rotational_time_period: f64,
    /// Degrees north.
    pub latitude: f64,

    pub use_num_diff: bool,
    /// Numerical diffusion strength in [0, 1].
    pub num_diff_coeff: f64,

    pub dycore_horiz_adv_type: String,
    pub dycore_vert_adv_type: String,
    pub dryscal_horiz_adv_type: String,
    pub dryscal_vert_adv_type: String,
    pub moistscal_horiz_adv_type: String,
    pub moistscal_vert_adv_type: String,
}

impl Default for SolverParams {
    fn default() -> Self {
        let pbl = PblCoefficients::default();
        Self {
            use_terrain: false,
            terrain_type: TerrainType::Static,
            use_map_factors: false,
            no_substepping: false,
            force_stage1_single_substep: true,
            incompressible: false,
            use_lagged_delta_rt: true,
            n_substeps: 6,
            use_gravity: false,
            c_p: C_P_D,
            buoyancy_type: 1,
            moisture: MoistureModel::Dry,
            les_type: "None".to_string(),
            pbl_type: "None".to_string(),
            molec_diff_type: String::new(),
            dynamic_viscosity: 0.0,
            rho0_trans: 1.0,
            alpha_t: 0.0,
            alpha_c: 0.0,
            cs: 0.0,
            ck: 0.1,
            ce: 0.93,
            sigma_k: 0.5,
            pr_t: 1.0 / 3.0,
            sc_t: 1.0,
            theta_ref: 300.0,
            pbl_a1: pbl.a1,
            pbl_a2: pbl.a2,
            pbl_b1: pbl.b1,
            pbl_b2: pbl.b2,
            pbl_c1: pbl.c1,
            pbl_c2: pbl.c2,
            pbl_c3: pbl.c3,
            pbl_c4: pbl.c4,
            pbl_c5: pbl.c5,
            use_coriolis: false,
            rotational_time_period: ROTATIONAL_PERIOD,
            latitude: 90.0,
            use_num_diff: false,
            num_diff_coeff: 0.0,
            dycore_horiz_adv_type: String::new(),
            dycore_vert_adv_type: String::new(),
            dryscal_horiz_adv_type: String::new(),
            dryscal_vert_adv_type: String::new(),
            moistscal_horiz_adv_type: String::new(),
            moistscal_vert_adv_type: String::new(),
        }
    }
}

impl SolverParams {
    /// Parse parameters from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Read parameters from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_json_str(&content)
    }

    /// Write parameters as pretty-printed JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Load(e.to_string()))?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.as_ref().display())))
    }
}

/// Variable class an advection scheme applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VariableClass {
    Dycore,
    DryScalar,
    MoistScalar,
}

impl VariableClass {
    fn default_scheme(self) -> AdvectionScheme {
        match self {
            Self::MoistScalar => AdvectionScheme::Weno3,
            _ => AdvectionScheme::Centered2nd,
        }
    }
}

/// Advection scheme per variable class and direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvectionChoice {
    pub dycore_horiz: AdvectionScheme,
    pub dycore_vert: AdvectionScheme,
    pub dryscal_horiz: AdvectionScheme,
    pub dryscal_vert: AdvectionScheme,
    pub moistscal_horiz: AdvectionScheme,
    pub moistscal_vert: AdvectionScheme,
}

impl AdvectionChoice {
    /// Interpolator for ρ, ρθ and momentum.
    pub fn dycore(&self) -> Interpolator {
        Interpolator::new(self.dycore_horiz, self.dycore_vert)
    }

    /// Interpolator for dry scalars (KE, QKE, passive scalar).
    pub fn dry_scalar(&self) -> Interpolator {
        Interpolator::new(self.dryscal_horiz, self.dryscal_vert)
    }

    /// Interpolator for moisture variables.
    pub fn moist_scalar(&self) -> Interpolator {
        Interpolator::new(self.moistscal_horiz, self.moistscal_vert)
    }

    /// Widest stencil radius over all classes and directions.
    pub fn max_horizontal_radius(&self) -> usize {
        [self.dycore_horiz, self.dryscal_horiz, self.moistscal_horiz]
            .iter()
            .map(|s| s.stencil_radius())
            .max()
            .unwrap_or(1)
    }

    fn entries(&self) -> [(&'static str, AdvectionScheme); 6] {
        [
            ("dycore_horiz_adv_type", self.dycore_horiz),
            ("dycore_vert_adv_type", self.dycore_vert),
            ("dryscal_horiz_adv_type", self.dryscal_horiz),
            ("dryscal_vert_adv_type", self.dryscal_vert),
            ("moistscal_horiz_adv_type", self.moistscal_horiz),
            ("moistscal_vert_adv_type", self.moistscal_vert),
        ]
    }
}

fn parse_scheme(key: &'static str, value: &str, class: VariableClass) -> Result<(AdvectionScheme, bool), ConfigError> {
    if value.is_empty() {
        return Ok((class.default_scheme(), true));
    }
    let scheme: AdvectionScheme = value.parse().map_err(|_| ConfigError::UnknownAdvectionType {
        class: key.to_string(),
        value: value.to_string(),
    })?;
    if class == VariableClass::Dycore && scheme.is_weno() {
        return Err(ConfigError::UnsupportedAdvectionType {
            class: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok((scheme, false))
}

/// Validated, immutable solver configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    pub use_terrain: bool,
    pub terrain_type: TerrainType,
    pub use_map_factors: bool,

    pub no_substepping: bool,
    pub force_stage1_single_substep: bool,
    pub incompressible: bool,
    pub use_lagged_delta_rt: bool,
    pub n_substeps: usize,

    pub eos: EquationOfState,
    pub c_p: f64,
    /// Zero when gravity is switched off.
    pub gravity: f64,
    pub buoyancy_type: BuoyancyType,

    pub diffusion: DiffusionParams,
    /// `ρ₀ α_T`
    pub rho_alpha_t: f64,
    /// `ρ₀ α_C`
    pub rho_alpha_c: f64,

    pub use_coriolis: bool,
    /// `4π / rotational_time_period`
    pub coriolis_factor: f64,
    pub sinphi: f64,
    pub cosphi: f64,

    pub use_num_diff: bool,
    /// Numerical diffusion strength, already scaled by 2⁻⁶.
    pub num_diff_coeff: f64,

    pub advection: AdvectionChoice,
    defaulted: Vec<&'static str>,
}

impl SolverConfig {
    /// Validate `params` and derive the run constants.
    pub fn from_params(params: &SolverParams) -> Result<Self, ConfigError> {
        let buoyancy_type = BuoyancyType::try_from(params.buoyancy_type)?;

        if params.c_p <= 0.0 {
            return Err(ConfigError::invalid("c_p", params.c_p, "must be positive"));
        }
        if params.incompressible && !params.no_substepping {
            return Err(ConfigError::IncompressibleRequiresNoSubstepping);
        }
        let moving = params.terrain_type == TerrainType::Moving;
        if moving && !params.use_terrain {
            return Err(ConfigError::Incompatible(
                "terrain_type = moving requires use_terrain = true".to_string(),
            ));
        }
        if !params.use_lagged_delta_rt && !moving {
            return Err(ConfigError::LaggedDeltaRtRequiresMovingTerrain);
        }
        if !params.no_substepping && params.n_substeps == 0 {
            return Err(ConfigError::invalid("n_substeps", 0.0, "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&params.num_diff_coeff) {
            return Err(ConfigError::invalid(
                "num_diff_coeff",
                params.num_diff_coeff,
                "must lie in [0, 1]",
            ));
        }
        if params.pr_t <= 0.0 {
            return Err(ConfigError::invalid("pr_t", params.pr_t, "must be positive"));
        }
        if params.sc_t <= 0.0 {
            return Err(ConfigError::invalid("sc_t", params.sc_t, "must be positive"));
        }
        if params.use_coriolis && params.rotational_time_period <= 0.0 {
            return Err(ConfigError::invalid(
                "rotational_time_period",
                params.rotational_time_period,
                "must be positive",
            ));
        }

        let les_type: LesType = params.les_type.parse()?;
        let pbl_type: PblType = params.pbl_type.parse()?;
        let molec_diff_type = if params.molec_diff_type.is_empty() {
            if les_type == LesType::None {
                MolecDiffType::Constant
            } else {
                MolecDiffType::None
            }
        } else {
            params.molec_diff_type.parse()?
        };
        if les_type != LesType::None && molec_diff_type == MolecDiffType::ConstantAlpha {
            return Err(ConfigError::Incompatible(
                "molec_diff_type = ConstantAlpha cannot be combined with an LES closure".to_string(),
            ));
        }
        if molec_diff_type != MolecDiffType::None && params.rho0_trans <= 0.0 {
            return Err(ConfigError::invalid("rho0_trans", params.rho0_trans, "must be positive"));
        }
        if pbl_type != PblType::None && les_type != LesType::None {
            warn!("PBL closure {pbl_type} combined with LES closure {les_type}; both act on the same eddy coefficients");
        }

        let diffusion = DiffusionParams {
            les_type,
            pbl_type,
            molec_diff_type,
            dynamic_viscosity: params.dynamic_viscosity,
            rho0_trans: params.rho0_trans,
            alpha_t: params.alpha_t,
            alpha_c: params.alpha_c,
            cs: params.cs,
            ck: params.ck,
            ce: params.ce,
            sigma_k: params.sigma_k,
            pr_t_inv: 1.0 / params.pr_t,
            sc_t_inv: 1.0 / params.sc_t,
            theta_ref: params.theta_ref,
            pbl: PblCoefficients {
                a1: params.pbl_a1,
                a2: params.pbl_a2,
                b1: params.pbl_b1,
                b2: params.pbl_b2,
                c1: params.pbl_c1,
                c2: params.pbl_c2,
                c3: params.pbl_c3,
                c4: params.pbl_c4,
                c5: params.pbl_c5,
            },
        };

        let mut defaulted = Vec::new();
        let mut scheme = |key: &'static str, value: &str, class: VariableClass| {
            let (s, was_default) = parse_scheme(key, value, class)?;
            if was_default {
                defaulted.push(key);
            }
            Ok::<_, ConfigError>(s)
        };
        let advection = AdvectionChoice {
            dycore_horiz: scheme("dycore_horiz_adv_type", &params.dycore_horiz_adv_type, VariableClass::Dycore)?,
            dycore_vert: scheme("dycore_vert_adv_type", &params.dycore_vert_adv_type, VariableClass::Dycore)?,
            dryscal_horiz: scheme("dryscal_horiz_adv_type", &params.dryscal_horiz_adv_type, VariableClass::DryScalar)?,
            dryscal_vert: scheme("dryscal_vert_adv_type", &params.dryscal_vert_adv_type, VariableClass::DryScalar)?,
            moistscal_horiz: scheme(
                "moistscal_horiz_adv_type",
                &params.moistscal_horiz_adv_type,
                VariableClass::MoistScalar,
            )?,
            moistscal_vert: scheme(
                "moistscal_vert_adv_type",
                &params.moistscal_vert_adv_type,
                VariableClass::MoistScalar,
            )?,
        };

        let latitude = params.latitude.to_radians();
        let config = Self {
            use_terrain: params.use_terrain,
            terrain_type: params.terrain_type,
            use_map_factors: params.use_map_factors,
            no_substepping: params.no_substepping,
            force_stage1_single_substep: params.force_stage1_single_substep,
            incompressible: params.incompressible,
            use_lagged_delta_rt: params.use_lagged_delta_rt,
            n_substeps: params.n_substeps.max(1),
            eos: EquationOfState::with_params(params.c_p, params.moisture),
            c_p: params.c_p,
            gravity: if params.use_gravity { GRAVITY } else { 0.0 },
            buoyancy_type,
            diffusion,
            rho_alpha_t: params.rho0_trans * params.alpha_t,
            rho_alpha_c: params.rho0_trans * params.alpha_c,
            use_coriolis: params.use_coriolis,
            coriolis_factor: 4.0 * PI / params.rotational_time_period,
            sinphi: latitude.sin(),
            cosphi: latitude.cos(),
            use_num_diff: params.use_num_diff,
            num_diff_coeff: params.num_diff_coeff * 0.015625,
            advection,
            defaulted,
        };
        config.summary();
        Ok(config)
    }

    /// Whether terrain moves in time.
    #[inline]
    pub fn is_moving_terrain(&self) -> bool {
        self.use_terrain && self.terrain_type == TerrainType::Moving
    }

    /// `R_d / c_p`
    #[inline]
    pub fn rd_over_cp(&self) -> f64 {
        self.eos.rd_over_cp
    }

    /// Log the selected options.
    pub fn summary(&self) {
        for (key, scheme) in self.advection.entries() {
            if self.defaulted.contains(&key) {
                info!("{key}: using default {scheme}");
            } else {
                info!("{key}: {scheme}");
            }
        }
        if self.no_substepping {
            info!("time integration: three-stage RK without acoustic substepping");
        } else {
            info!(
                "time integration: three-stage RK with {} acoustic substeps (stage 1 single substep: {})",
                self.n_substeps, self.force_stage1_single_substep
            );
        }
        info!(
            "diffusion: les = {}, pbl = {}, molecular = {}",
            self.diffusion.les_type, self.diffusion.pbl_type, self.diffusion.molec_diff_type
        );
        if self.use_terrain {
            info!("terrain: {:?}", self.terrain_type);
        }
        if self.use_map_factors {
            info!("map factors enabled");
        }
        if !self.use_lagged_delta_rt {
            info!("lagged delta(rho theta) disabled across stages");
        }
        if self.incompressible {
            info!("incompressible projection enabled");
        }
    }
}
