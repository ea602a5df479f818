//! Thermodynamic relations for the compressible dynamical core.
//!
//! The conserved thermodynamic variable is ρθ; everything the dycore needs
//! (pressure, Exner function, temperature, sound speed) is a pure function
//! of ρθ and, where moisture matters, the vapour mixing ratio.

mod equation_of_state;

pub use equation_of_state::{
    EquationOfState, MoistureModel, dpdrho_given_constant_theta, exner_given_pressure,
    exner_given_rhotheta, pressure_given_rhotheta, pressure_given_rhotheta_moist,
    rho_given_theta_pressure, rhotheta_given_pressure, temperature_given_rho_rhotheta,
    theta_given_rho_temperature,
};
